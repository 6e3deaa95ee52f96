use crate::{
    lang::{
        code::{Cell, CellList},
        parsing::{parse_tokens, PendingItem, Program, WordDefinition},
        source_buffer::SourceLocation,
        tokenizing::{tokenize_from_file, tokenize_from_source},
    },
    runtime::{
        built_ins::{register_primitives, Primitive},
        data_structures::{
            dictionary::{Dictionary, ExecToken, WordId},
            string_pool::StringPool,
        },
        error::{self, CompilerError, ErrorKind},
        image::CompiledImage,
    },
};
use log::{debug, trace};

/// Does the text look like a numeral?  Only candidates that pass this check are handed to the
/// integer parser, everything else that failed dictionary lookup is an unknown word.
fn looks_numeric(text: &str) -> bool {
    let mut chars = text.chars();

    match chars.next() {
        Some('-') | Some('+') => chars.next().is_some_and(|next| next.is_ascii_digit()),
        Some(next) => next.is_ascii_digit(),
        None => false,
    }
}

/// The compilation context.  The dictionary and the string pool are fields threaded explicitly
/// through every stage rather than ambient globals, so independent compiler instances never
/// interfere with each other.
///
/// Compilation is strictly two-phase.  The whole token stream is classified and parsed first,
/// then definitions are compiled in source order.  A reference inside definition k therefore
/// only ever resolves against entries created by earlier definitions or the pre-registered
/// native set, which is what gives the language its define before use semantics.
pub struct Compiler {
    /// The append-only registry of every named routine, pre-seeded with the native set.
    dictionary: Dictionary,

    /// The global pool of interned string constants.
    strings: StringPool,

    /// The entry of the built-in literal-push primitive.  The numeral fallback binds against
    /// this directly so a user definition shadowing the name lit can not hijack number
    /// literals.
    lit: WordId,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    /// Create a new compiler with the native word set pre-registered.
    pub fn new() -> Compiler {
        let mut dictionary = Dictionary::new();

        register_primitives(&mut dictionary);

        // Registration order is fixed, the native set always contains lit.
        let lit = dictionary
            .lookup(Primitive::Lit.name())
            .unwrap_or_default();

        Compiler {
            dictionary,
            strings: StringPool::new(),
            lit,
        }
    }

    /// Compile a whole source string into an executable image.  The path is only used to tag
    /// locations in diagnostics.
    pub fn compile_source(self, path: &str, source: &str) -> error::Result<CompiledImage> {
        let tokens = tokenize_from_source(path, source)?;
        let program = parse_tokens(path, &tokens)?;

        self.compile_program(&program)
    }

    /// Read a source file and compile it into an executable image.
    pub fn compile_file(self, path: &str) -> error::Result<CompiledImage> {
        let tokens = tokenize_from_file(path)?;
        let program = parse_tokens(path, &tokens)?;

        self.compile_program(&program)
    }

    /// Compile every parsed definition in source order and then the top level program.  Aborts
    /// on the first error, no partial image is ever produced.
    pub fn compile_program(mut self, program: &Program) -> error::Result<CompiledImage> {
        for definition in &program.definitions {
            trace!("compiling word {}", definition.name);

            let body = self.compile_definition(definition)?;

            let _ = self.dictionary.define(
                definition.name.clone(),
                definition.is_immediate,
                ExecToken::Colon,
                Some(body),
            );
        }

        let entry = self.compile_definition(&program.entry)?;

        debug!(
            "compiled {} definitions, {} dictionary entries, {} string constants",
            program.definitions.len(),
            self.dictionary.len(),
            self.strings.len()
        );

        Ok(CompiledImage {
            dictionary: self.dictionary,
            strings: self.strings,
            entry,
        })
    }

    /// Resolve one definition's pending items into concrete cells.
    ///
    /// References are bound against the dictionary as it exists right now, so later
    /// redefinitions of a name never retroactively alter a body compiled here.  Branch targets
    /// resolve through the definition's own label table only.  The label table records pending
    /// item indices, which this pass widens into cell offsets because a numeral expands into
    /// two cells.
    fn compile_definition(&mut self, definition: &WordDefinition) -> error::Result<CellList> {
        // Every body ends with an implicit exit, the source never writes it.
        let mut pending = definition.pending.clone();

        pending.push(PendingItem::WordRef(
            definition.location.clone(),
            "exit".to_string(),
        ));

        let mut cells = CellList::new();
        let mut item_offsets = Vec::with_capacity(pending.len() + 1);
        let mut branch_fixups: Vec<(usize, SourceLocation, String)> = Vec::new();

        for item in &pending {
            item_offsets.push(cells.len());

            match item {
                PendingItem::WordRef(location, text) => {
                    self.compile_word_ref(&mut cells, location, text)?;
                }

                // Emit a placeholder now and patch it below once every cell offset is known,
                // labels resolve the same whether they were declared before or after the branch.
                PendingItem::BranchTarget(location, label) => {
                    branch_fixups.push((cells.len(), location.clone(), label.clone()));
                    cells.push(Cell::ResolvedBranch(0));
                }

                PendingItem::StringLiteral(_, text) => {
                    let id = self.strings.intern(text.clone());
                    cells.push(Cell::StringRef(id));
                }
            }
        }

        item_offsets.push(cells.len());

        for (cell_index, location, label) in branch_fixups {
            match definition.labels.get(&label) {
                Some(&item_index) => {
                    cells[cell_index] = Cell::ResolvedBranch(item_offsets[item_index]);
                }

                None => {
                    return CompilerError::new_as_result(
                        ErrorKind::UnresolvedLabel,
                        Some(location),
                        format!(
                            "The branch target {} has no matching label in this definition.",
                            label
                        ),
                    );
                }
            }
        }

        Ok(cells)
    }

    /// Resolve a single word reference.  A dictionary hit wins over the numeral fallback, so a
    /// word literally named 42 shadows the number 42.
    fn compile_word_ref(
        &mut self,
        cells: &mut CellList,
        location: &SourceLocation,
        text: &str,
    ) -> error::Result<()> {
        if let Some(id) = self.dictionary.lookup(text) {
            cells.push(Cell::ExecToken(id));
            return Ok(());
        }

        if !looks_numeric(text) {
            return CompilerError::new_as_result(
                ErrorKind::UnknownWord,
                Some(location.clone()),
                format!(
                    "The word {} is neither a dictionary entry nor a valid numeral.",
                    text
                ),
            );
        }

        // Assume a numeral.  The literal-push primitive consumes the value cell behind it.
        let value: i64 = match text.parse() {
            Ok(value) => value,
            Err(parse_error) => {
                return CompilerError::new_as_result(
                    ErrorKind::NumericParse,
                    Some(location.clone()),
                    format!("Could not parse {} as a base-10 integer: {}.", text, parse_error),
                );
            }
        };

        cells.push(Cell::ExecToken(self.lit));
        cells.push(Cell::IntLiteral(value));

        Ok(())
    }
}
