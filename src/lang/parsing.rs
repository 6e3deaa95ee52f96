use crate::{
    lang::{
        source_buffer::SourceLocation,
        tokenizing::{Token, TokenKind},
    },
    runtime::error::{self, CompilerError, ErrorKind},
};
use std::collections::HashMap;

/// A code item recorded by the parser and resolved later by the code generator.  Each item
/// carries the location of the token it came from so that resolution failures can point back at
/// the source.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum PendingItem {
    /// A reference to a named word, or a numeral if no such word exists at resolution time.
    WordRef(SourceLocation, String),

    /// A branch target naming a label local to the owning definition.
    BranchTarget(SourceLocation, String),

    /// A string constant to be interned when the definition is compiled.
    StringLiteral(SourceLocation, String),
}

/// One parsed `: name ... ;` block, or the top level program.  This structure only exists
/// between parsing and code generation, once compiled into a dictionary entry it is discarded.
#[derive(Clone, Debug)]
pub struct WordDefinition {
    /// Where the definition started in the source code.
    pub location: SourceLocation,

    /// The name of the word being defined.  Empty for the top level program.
    pub name: String,

    /// Was the definition closed with a trailing immediate marker?
    pub is_immediate: bool,

    /// Label name to cell offset.  The offset is the count of pending items accumulated before
    /// the label was declared, labels themselves emit no item.  Unique per definition, label
    /// scope never crosses definition boundaries.
    pub labels: HashMap<String, usize>,

    /// The ordered list of code items waiting for the code generator.
    pub pending: Vec<PendingItem>,
}

impl WordDefinition {
    /// Create a new empty definition.
    fn new(location: SourceLocation, name: String) -> WordDefinition {
        WordDefinition {
            location,
            name,
            is_immediate: false,
            labels: HashMap::new(),
            pending: Vec::new(),
        }
    }
}

/// The parsed form of a whole source text.  Definitions are kept in source order, everything
/// found outside of a definition forms the entry point program.
#[derive(Clone, Debug)]
pub struct Program {
    /// All `: ... ;` definitions in source order.
    pub definitions: Vec<WordDefinition>,

    /// The top level code, compiled last into the entry point cell sequence.
    pub entry: WordDefinition,
}

/// Append the item or items a token contributes to the given definition.  Shared between the
/// body of a definition and the top level program, both accept the same code tokens.
fn push_code_token(definition: &mut WordDefinition, token: &Token) -> error::Result<()> {
    match token.kind {
        // The offset recorded is the count of items already accumulated, not counting the label
        // itself.  Forward and backward branches both resolve through this table.
        TokenKind::Label => {
            let offset = definition.pending.len();

            if definition.labels.insert(token.text.clone(), offset).is_some() {
                return CompilerError::new_as_result(
                    ErrorKind::UnexpectedToken,
                    Some(token.location.clone()),
                    format!("The label {} was already declared in this definition.", token.text),
                );
            }
        }

        TokenKind::BranchLabel => {
            definition
                .pending
                .push(PendingItem::BranchTarget(token.location.clone(), token.text.clone()));
        }

        // The branch keyword itself is looked up in the dictionary like any other reference.
        TokenKind::Branch | TokenKind::String => {
            definition
                .pending
                .push(PendingItem::WordRef(token.location.clone(), token.text.clone()));
        }

        // The tick collapses to pushing a literal marker, the captured word follows as an
        // ordinary reference cell consumed by lit.
        TokenKind::Tick => {
            definition
                .pending
                .push(PendingItem::WordRef(token.location.clone(), "lit".to_string()));
        }

        // The print quote itself contributes nothing, its quoted text follow-up carries the
        // whole construct.
        TokenKind::PrintQuote => {}

        TokenKind::QuotedText => {
            definition
                .pending
                .push(PendingItem::StringLiteral(token.location.clone(), token.text.clone()));
            definition
                .pending
                .push(PendingItem::WordRef(token.location.clone(), "prints".to_string()));
        }

        // Colon, Semicolon, Name and Immediate are handled by the definition state machine and
        // never reach this function.
        _ => unreachable!("structural token leaked into code handling"),
    }

    Ok(())
}

/// Group the fully classified token stream into a sequence of word definitions plus the top
/// level program.  This is a single pass with one token of lookahead, used only to check for a
/// trailing immediate marker after each closed definition.
pub fn parse_tokens(path: &str, tokens: &[Token]) -> error::Result<Program> {
    let mut definitions = Vec::new();
    let mut entry = WordDefinition::new(SourceLocation::new_from_path(path), String::new());
    let mut current: Option<WordDefinition> = None;

    let mut index = 0;

    while index < tokens.len() {
        let token = &tokens[index];

        match token.kind {
            TokenKind::Colon => {
                if current.is_some() {
                    return CompilerError::new_as_result(
                        ErrorKind::UnexpectedToken,
                        Some(token.location.clone()),
                        "Found a : inside a definition, definitions can not nest.".to_string(),
                    );
                }

                current = Some(WordDefinition::new(token.location.clone(), String::new()));
            }

            // The classifier only produces a Name directly behind a Colon.
            TokenKind::Name => match current.as_mut() {
                Some(definition) => definition.name = token.text.clone(),
                None => {
                    return CompilerError::new_as_result(
                        ErrorKind::UnexpectedToken,
                        Some(token.location.clone()),
                        format!("The definition name {} appeared outside a definition.", token.text),
                    );
                }
            },

            TokenKind::Semicolon => {
                let mut definition = match current.take() {
                    Some(definition) => definition,
                    None => {
                        return CompilerError::new_as_result(
                            ErrorKind::UnexpectedToken,
                            Some(token.location.clone()),
                            "Found a stray ; outside of a definition.".to_string(),
                        );
                    }
                };

                // Peek for a trailing immediate marker.  If the next token is anything else it
                // is left unconsumed for the next iteration.
                if let Some(next) = tokens.get(index + 1) {
                    if next.kind == TokenKind::Immediate {
                        definition.is_immediate = true;
                        index += 1;
                    }
                }

                definitions.push(definition);
            }

            // Immediate is only consumed by the Semicolon lookahead above, anywhere else it is
            // out of place.
            TokenKind::Immediate => {
                return CompilerError::new_as_result(
                    ErrorKind::UnexpectedToken,
                    Some(token.location.clone()),
                    "The immediate marker is only valid directly after a ;.".to_string(),
                );
            }

            _ => match current.as_mut() {
                Some(definition) => push_code_token(definition, token)?,

                // Code outside of any definition belongs to the top level program.
                None => push_code_token(&mut entry, token)?,
            },
        }

        index += 1;
    }

    if let Some(unclosed) = current {
        return CompilerError::new_as_result(
            ErrorKind::TruncatedInput,
            Some(unclosed.location),
            format!("The definition {} was never closed with a ;.", unclosed.name),
        );
    }

    Ok(Program { definitions, entry })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::tokenizing::tokenize_from_source;

    fn parse(source: &str) -> error::Result<Program> {
        let tokens = tokenize_from_source("<test>", source)?;
        parse_tokens("<test>", &tokens)
    }

    #[test]
    fn label_offsets_count_prior_items_only() {
        let program = parse(": t dup 0branch .skip 1 .skip: ;").unwrap();
        let definition = &program.definitions[0];

        // dup, the 0branch reference, the branch target and the numeral 1 come first.  The code
        // generator later widens this item index into a cell offset.
        assert_eq!(definition.labels[".skip"], 4);
        assert_eq!(definition.pending.len(), 4);
    }

    #[test]
    fn semicolon_consumes_only_a_trailing_immediate() {
        let program = parse(": x foo ; immediate : y foo ;").unwrap();

        assert!(program.definitions[0].is_immediate);
        assert!(!program.definitions[1].is_immediate);
    }

    #[test]
    fn nested_colon_is_rejected() {
        let result = parse(": outer : inner ;");

        assert_eq!(result.unwrap_err().kind(), ErrorKind::UnexpectedToken);
    }

    #[test]
    fn stray_semicolon_is_rejected() {
        let result = parse("dup ;");

        assert_eq!(result.unwrap_err().kind(), ErrorKind::UnexpectedToken);
    }

    #[test]
    fn quoted_text_expands_to_string_and_prints() {
        let program = parse(": greet .\" hi\" ;").unwrap();
        let pending = &program.definitions[0].pending;

        assert_eq!(pending.len(), 2);
        assert!(matches!(&pending[0], PendingItem::StringLiteral(_, text) if text == "hi"));
        assert!(matches!(&pending[1], PendingItem::WordRef(_, name) if name == "prints"));
    }

    #[test]
    fn tick_expands_to_literal_and_its_target() {
        let program = parse(": t ' exit ;").unwrap();
        let pending = &program.definitions[0].pending;

        assert!(matches!(&pending[0], PendingItem::WordRef(_, name) if name == "lit"));
        assert!(matches!(&pending[1], PendingItem::WordRef(_, name) if name == "exit"));
    }

    #[test]
    fn top_level_code_lands_in_the_entry_program() {
        let program = parse(": sq dup ; 3 sq").unwrap();

        assert_eq!(program.definitions.len(), 1);
        assert_eq!(program.entry.pending.len(), 2);
    }
}
