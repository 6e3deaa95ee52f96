use crate::lang::source_buffer::SourceLocation;
use std::{
    error::Error,
    fmt::{self, Debug, Display, Formatter},
};

pub type Result<T> = std::result::Result<T, CompilerError>;

/// Classification of everything that can go wrong while compiling or running a program.  The
/// compile time kinds map directly onto the failure modes of the classifier, the parser and the
/// code generator.  All of them are unrecoverable, the first one raised aborts the whole run.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ErrorKind {
    /// A construct's mandatory follow-up atom is missing from the source.
    TruncatedInput,

    /// A token appeared somewhere it is not legal, like a nested : or a stray ;.
    UnexpectedToken,

    /// A referenced name is neither a dictionary entry nor a valid numeral.
    UnknownWord,

    /// A branch target has no matching label in its own definition.
    UnresolvedLabel,

    /// A literal that looked numeric failed base-10 parsing.
    NumericParse,

    /// Something went wrong reading the source or writing the compiled image.
    Io,

    /// A fault raised by the dispatch machine while running a compiled image.
    Execution,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let text = match self {
            ErrorKind::TruncatedInput => "truncated input",
            ErrorKind::UnexpectedToken => "unexpected token",
            ErrorKind::UnknownWord => "unknown word",
            ErrorKind::UnresolvedLabel => "unresolved label",
            ErrorKind::NumericParse => "numeric parse error",
            ErrorKind::Io => "i/o error",
            ErrorKind::Execution => "execution error",
        };

        write!(f, "{}", text)
    }
}

/// Any error that occurs while compiling or executing a program.  Carries the kind of failure, a
/// description naming the offending token and, when known, the location in the original source
/// code where the problem was found.
#[derive(Clone)]
pub struct CompilerError {
    /// The location in the source code the error occurred, if available.
    location: Option<SourceLocation>,

    /// What category of failure this is.
    kind: ErrorKind,

    /// The description of the error.
    error: String,
}

impl Error for CompilerError {}

/// Pretty print the error with its location so the user can find the offending token.
impl Display for CompilerError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{}: {}: {}", location, self.kind, self.error),
            None => write!(f, "{}: {}", self.kind, self.error),
        }
    }
}

impl Debug for CompilerError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl CompilerError {
    /// Create a new CompilerError.
    pub fn new(kind: ErrorKind, location: Option<SourceLocation>, error: String) -> CompilerError {
        CompilerError {
            location,
            kind,
            error,
        }
    }

    /// Create a new CompilerError and wrap it in a Result::Err.
    pub fn new_as_result<T>(
        kind: ErrorKind,
        location: Option<SourceLocation>,
        error: String,
    ) -> Result<T> {
        Err(CompilerError::new(kind, location, error))
    }

    /// What category of failure this is.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// If available, the location in the source code the error occurred.
    pub fn location(&self) -> &Option<SourceLocation> {
        &self.location
    }

    /// The description of the error.
    pub fn error(&self) -> &String {
        &self.error
    }
}

/// Allow for the conversion of a std::io::Error into a CompilerError.
impl From<std::io::Error> for CompilerError {
    fn from(error: std::io::Error) -> CompilerError {
        CompilerError::new(ErrorKind::Io, None, format!("I/O error: {}", error))
    }
}

/// Image encoding and decoding errors are reported as I/O failures of the compiled output.
impl From<postcard::Error> for CompilerError {
    fn from(error: postcard::Error) -> CompilerError {
        CompilerError::new(
            ErrorKind::Io,
            None,
            format!("Image serialization error: {}", error),
        )
    }
}
