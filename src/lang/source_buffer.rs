use core::str::Chars;
use std::fmt::{self, Display, Formatter};

/// The location in the source code where an atom was found.  This structure follows tokens and
/// pending code items through the whole compiler so that errors can point back at the original
/// source text.
///
/// This is a read-only structure.  Use the field accessor methods to get the values.
#[derive(Clone, PartialEq, Eq, PartialOrd, Hash, Debug)]
pub struct SourceLocation {
    /// Either the path to the file or a description of the source code.  Source compiled from an
    /// in memory string will usually use a tag like "\<test\>".
    path: String,

    /// The 1 based line number in the source code.
    line: usize,

    /// The 1 based column number in the source code.
    column: usize,
}

/// Used for error reporting to show where in the source code an error originated.
impl Display for SourceLocation {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(formatter, "{} ({}, {})", self.path, self.line, self.column)
    }
}

impl SourceLocation {
    /// Create a new SourceLocation pointing at the beginning of a source text.
    pub fn new_from_path(path: &str) -> SourceLocation {
        SourceLocation {
            path: path.to_owned(),
            line: 1,
            column: 1,
        }
    }

    /// The path to the source code or a meaningful description of the source code.
    pub fn path(&self) -> &String {
        &self.path
    }

    /// The 1 based line number in the source code.
    pub fn line(&self) -> usize {
        self.line
    }

    /// The 1 based column number in the source code.
    pub fn column(&self) -> usize {
        self.column
    }
}

/// Check if the given character is considered whitespace.
fn is_whitespace(next: &char) -> bool {
    *next == ' ' || *next == '\t' || *next == '\r' || *next == '\n'
}

/// The token source for the compiler.  This acts as a forward only reader over the source code
/// that produces whole whitespace delimited atoms rather than single characters.  As atoms are
/// consumed the location of the cursor in the source is maintained so that every atom can be
/// reported against its original position.
///
/// The SourceBuffer only holds a reference to the source code, the code is not copied.  The source
/// code string is expected to outlive the SourceBuffer.
pub struct SourceBuffer<'a> {
    /// An iterator over the source code being processed.
    chars: Chars<'a>,

    /// The logical location of the cursor in the source code.
    location: SourceLocation,

    /// The current character being processed.  This is used to peek at the next character without
    /// consuming it.
    current: Option<char>,
}

impl<'a> SourceBuffer<'a> {
    /// Create a new SourceBuffer with the path to, or meaningful tag for the source code and the
    /// source code itself.
    pub fn new(path: &str, source: &'a str) -> Self {
        SourceBuffer {
            chars: source.chars(),
            location: SourceLocation::new_from_path(path),
            current: None,
        }
    }

    /// The location the cursor is at in the source code being processed.
    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    /// Extract the next whitespace delimited atom from the source code along with the location it
    /// was found at.  Returns None once the end of the source has been reached.
    pub fn next_atom(&mut self) -> Option<(SourceLocation, String)> {
        self.skip_whitespace();

        self.peek_next()?;

        let location = self.location.clone();
        let mut text = String::new();

        while let Some(next) = self.peek_next() {
            if is_whitespace(&next) {
                break;
            }

            let _ = self.next_char();
            text.push(next);
        }

        Some((location, text))
    }

    /// Skip everything up to and including the end of the current line.  This is how source
    /// comments are implemented, the tokenize driver calls this when it reads a \ atom.
    pub fn skip_line(&mut self) {
        while let Some(next) = self.next_char() {
            if next == '\n' {
                break;
            }
        }
    }

    /// Take a peek at the next character in the source code without consuming it.
    fn peek_next(&mut self) -> Option<char> {
        match self.current {
            Some(_) => self.current,
            None => {
                let next = self.chars.next();

                self.current = next;
                next
            }
        }
    }

    /// Get and consume the next character in the source code.
    fn next_char(&mut self) -> Option<char> {
        let next = match self.current.take() {
            Some(current) => Some(current),
            None => self.chars.next(),
        };

        if let Some(next_char) = next {
            self.increment_location(next_char);
        }

        next
    }

    /// Skip over whitespace in the text.  Stopping only at either the end of the buffer or the
    /// next non-whitespace character.
    fn skip_whitespace(&mut self) {
        while let Some(next) = self.peek_next() {
            if !is_whitespace(&next) {
                break;
            }

            let _ = self.next_char();
        }
    }

    /// Advance one column for regular characters.  Reset the column to 1 and increment the line
    /// for new line characters.
    fn increment_location(&mut self, next: char) {
        if next == '\n' {
            self.location.line += 1;
            self.location.column = 1;
        } else {
            self.location.column += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atoms_are_split_on_any_whitespace() {
        let mut buffer = SourceBuffer::new("<test>", "  : sq\tdup *\n;");
        let mut atoms = Vec::new();

        while let Some((_, atom)) = buffer.next_atom() {
            atoms.push(atom);
        }

        assert_eq!(atoms, vec![":", "sq", "dup", "*", ";"]);
    }

    #[test]
    fn locations_track_lines_and_columns() {
        let mut buffer = SourceBuffer::new("<test>", "one\n  two");

        let (location, _) = buffer.next_atom().unwrap();
        assert_eq!((location.line(), location.column()), (1, 1));

        let (location, _) = buffer.next_atom().unwrap();
        assert_eq!((location.line(), location.column()), (2, 3));
    }

    #[test]
    fn skip_line_consumes_the_rest_of_the_line() {
        let mut buffer = SourceBuffer::new("<test>", "a ignored words\nb");

        let (_, first) = buffer.next_atom().unwrap();
        assert_eq!(first, "a");

        buffer.skip_line();

        let (_, second) = buffer.next_atom().unwrap();
        assert_eq!(second, "b");
        assert!(buffer.next_atom().is_none());
    }
}
