use crate::{
    lang::source_buffer::{SourceBuffer, SourceLocation},
    runtime::error::{self, CompilerError, ErrorKind},
};
use std::{
    fmt::{self, Display, Formatter},
    fs::read_to_string,
};

/// What kind of atom the classifier decided a token is.  Most atoms are generic String tokens,
/// that is either a word reference or a numeral to be sorted out by the code generator.  The rest
/// are the structural markers of the language.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TokenKind {
    /// A generic atom, either a word reference or a numeral.
    String,

    /// The : word that opens a definition.
    Colon,

    /// The ; word that closes a definition.
    Semicolon,

    /// The name of a definition, forced after a Colon.
    Name,

    /// A branch target declaration like .skip: with the trailing delimiter stripped.
    Label,

    /// The branch or 0branch keyword.
    Branch,

    /// The label name an earlier Branch token jumps to, forced after a Branch.
    BranchLabel,

    /// The immediate marker that can trail a Semicolon.
    Immediate,

    /// The ' word.
    Tick,

    /// The ." word.
    PrintQuote,

    /// The raw text following a PrintQuote, not re-classified.
    QuotedText,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let text = match self {
            TokenKind::String => "word or numeral",
            TokenKind::Colon => ":",
            TokenKind::Semicolon => ";",
            TokenKind::Name => "definition name",
            TokenKind::Label => "label",
            TokenKind::Branch => "branch",
            TokenKind::BranchLabel => "branch label",
            TokenKind::Immediate => "immediate",
            TokenKind::Tick => "'",
            TokenKind::PrintQuote => ".\"",
            TokenKind::QuotedText => "quoted text",
        };

        write!(f, "{}", text)
    }
}

/// A classified token.  The token also holds the location in the original source code where it
/// was found so that later stages can report errors against the source text.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Token {
    /// Where in the original source code the atom was found.
    pub location: SourceLocation,

    /// How the classifier categorized the atom.
    pub kind: TokenKind,

    /// The token's text.  For a Label the leading marker character is retained and the trailing
    /// delimiter is stripped, so the source atom .skip: carries the text .skip.
    pub text: String,
}

/// A list of tokens found in the source code.
pub type TokenList = Vec<Token>;

impl Display for Token {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

impl Token {
    /// Create a new token.
    pub fn new(location: SourceLocation, kind: TokenKind, text: String) -> Token {
        Token {
            location,
            kind,
            text,
        }
    }
}

/// Some atoms force the very next atom to be consumed as a dependent token of a specific kind.
/// This is how multi-atom constructs like `: name` and `branch .target` hang together.
enum FollowUp {
    /// The atom after a : is the new definition's name.
    Name,

    /// The atom after a branch or 0branch is the label it jumps to.
    BranchLabel,

    /// The atom after a ' is re-classified as a generic String token.
    TickTarget,

    /// The atom after a ." is taken as raw text with one trailing " delimiter stripped.
    QuotedText,
}

/// Does the atom look like a label declaration?  That is a leading . marker, at least one more
/// character and a trailing : delimiter.
fn is_label(text: &str) -> bool {
    text.len() > 2 && text.starts_with('.') && text.ends_with(':')
}

/// Classify a single atom.  Returns the finished token and, for multi-atom constructs, the kind
/// of follow-up token the next atom must become.
fn classify(location: SourceLocation, text: String) -> (Token, Option<FollowUp>) {
    match text.as_str() {
        _ if is_label(&text) => {
            let label = text[..text.len() - 1].to_string();
            (Token::new(location, TokenKind::Label, label), None)
        }

        ":" => (
            Token::new(location, TokenKind::Colon, text),
            Some(FollowUp::Name),
        ),

        ";" => (Token::new(location, TokenKind::Semicolon, text), None),

        "branch" | "0branch" => (
            Token::new(location, TokenKind::Branch, text),
            Some(FollowUp::BranchLabel),
        ),

        "immediate" => (Token::new(location, TokenKind::Immediate, text), None),

        "'" => (
            Token::new(location, TokenKind::Tick, text),
            Some(FollowUp::TickTarget),
        ),

        ".\"" => (
            Token::new(location, TokenKind::PrintQuote, text),
            Some(FollowUp::QuotedText),
        ),

        _ => (Token::new(location, TokenKind::String, text), None),
    }
}

/// Build the token for a forced follow-up atom.
fn follow_up_token(follow_up: &FollowUp, location: SourceLocation, text: String) -> Token {
    match follow_up {
        FollowUp::Name => Token::new(location, TokenKind::Name, text),
        FollowUp::BranchLabel => Token::new(location, TokenKind::BranchLabel, text),

        // The tick target is not special at this stage, it becomes an ordinary word reference.
        FollowUp::TickTarget => Token::new(location, TokenKind::String, text),

        // The quoted text is taken raw, only the closing " delimiter is dropped.
        FollowUp::QuotedText => {
            let text = match text.strip_suffix('"') {
                Some(stripped) => stripped.to_string(),
                None => text,
            };

            Token::new(location, TokenKind::QuotedText, text)
        }
    }
}

/// What kind of token the follow-up would have become, used for the truncated input diagnostic.
fn follow_up_kind(follow_up: &FollowUp) -> TokenKind {
    match follow_up {
        FollowUp::Name => TokenKind::Name,
        FollowUp::BranchLabel => TokenKind::BranchLabel,
        FollowUp::TickTarget => TokenKind::String,
        FollowUp::QuotedText => TokenKind::QuotedText,
    }
}

/// Tokenize the source code from a string.  Atoms are classified one at a time and comment atoms
/// are consumed here by skipping the rest of their source line.
pub fn tokenize_from_source(path: &str, source: &str) -> error::Result<TokenList> {
    let mut buffer = SourceBuffer::new(path, source);
    let mut token_list = TokenList::new();

    while let Some((location, atom)) = buffer.next_atom() {
        if atom == "\\" {
            buffer.skip_line();
            continue;
        }

        let (token, follow_up) = classify(location, atom);
        let token_text = token.text.clone();
        let token_location = token.location.clone();

        token_list.push(token);

        // Force-consume the next atom if this construct requires one.
        if let Some(follow_up) = follow_up {
            match buffer.next_atom() {
                Some((location, atom)) => {
                    token_list.push(follow_up_token(&follow_up, location, atom));
                }

                None => {
                    return CompilerError::new_as_result(
                        ErrorKind::TruncatedInput,
                        Some(token_location),
                        format!(
                            "The token {} must be followed by a {} but the input ended.",
                            token_text,
                            follow_up_kind(&follow_up)
                        ),
                    );
                }
            }
        }
    }

    Ok(token_list)
}

/// Load the code from a file and then tokenize it.
pub fn tokenize_from_file(path: &str) -> error::Result<TokenList> {
    let source = match read_to_string(path) {
        Ok(source) => source,
        Err(error) => {
            return CompilerError::new_as_result(
                ErrorKind::Io,
                None,
                format!("Could not read file {}: {}", path, error),
            );
        }
    };

    tokenize_from_source(path, &source)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize_from_source("<test>", source)
            .unwrap()
            .iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn colon_forces_a_name() {
        assert_eq!(
            kinds(": sq dup * ;"),
            vec![
                TokenKind::Colon,
                TokenKind::Name,
                TokenKind::String,
                TokenKind::String,
                TokenKind::Semicolon,
            ]
        );
    }

    #[test]
    fn branch_forces_a_branch_label() {
        assert_eq!(
            kinds("0branch .skip"),
            vec![TokenKind::Branch, TokenKind::BranchLabel]
        );
    }

    #[test]
    fn label_keeps_marker_and_drops_delimiter() {
        let tokens = tokenize_from_source("<test>", ".skip:").unwrap();

        assert_eq!(tokens[0].kind, TokenKind::Label);
        assert_eq!(tokens[0].text, ".skip");
    }

    #[test]
    fn tick_target_is_a_generic_string() {
        assert_eq!(kinds("' exit"), vec![TokenKind::Tick, TokenKind::String]);
    }

    #[test]
    fn quoted_text_is_raw_with_delimiter_stripped() {
        let tokens = tokenize_from_source("<test>", ".\" hi\"").unwrap();

        assert_eq!(tokens[1].kind, TokenKind::QuotedText);
        assert_eq!(tokens[1].text, "hi");
    }

    #[test]
    fn comments_skip_to_the_end_of_the_line() {
        assert_eq!(
            kinds("dup \\ : ; all ignored\nswap"),
            vec![TokenKind::String, TokenKind::String]
        );
    }

    #[test]
    fn missing_follow_up_is_truncated_input() {
        let result = tokenize_from_source("<test>", ": ");

        assert_eq!(result.unwrap_err().kind(), ErrorKind::TruncatedInput);
    }
}
