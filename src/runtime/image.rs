use crate::{
    lang::code::{Cell, CellList},
    runtime::{
        data_structures::{dictionary::Dictionary, string_pool::StringPool},
        error,
    },
};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// The self contained compiled form of a program.  Everything a downstream stage needs to lower
/// the program into a runnable dispatch loop, or to run it on the reference machine directly.
///
/// The encoding is lossless.  Decoding the binary form yields a value equal to the one that was
/// encoded.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct CompiledImage {
    /// The final dictionary chain, native entries and colon words with their bodies.
    pub dictionary: Dictionary,

    /// Every interned string constant referenced by the compiled cells.
    pub strings: StringPool,

    /// The entry point cell sequence representing the top level program.
    pub entry: CellList,
}

impl CompiledImage {
    /// Encode the image into its binary form.
    pub fn to_bytes(&self) -> error::Result<Vec<u8>> {
        Ok(postcard::to_allocvec(self)?)
    }

    /// Decode an image from its binary form.
    pub fn from_bytes(bytes: &[u8]) -> error::Result<CompiledImage> {
        Ok(postcard::from_bytes(bytes)?)
    }

    /// Render a human readable listing of the whole image.  Execution tokens are resolved to
    /// the names of the entries they are bound to, which makes shadowing visible, two entries
    /// can share a name while the cells referencing them stay distinct.
    pub fn listing(&self) -> String {
        let mut result = String::new();

        let _ = writeln!(&mut result, "dictionary: {} entries", self.dictionary.len());

        for (id, entry) in self.dictionary.iter() {
            let marker = if entry.is_immediate { "  immediate" } else { "" };

            match &entry.body {
                Some(body) => {
                    let _ = writeln!(
                        &mut result,
                        "{:4}: {:16} colon, {} cells{}",
                        id,
                        entry.name,
                        body.len(),
                        marker
                    );

                    self.list_cells(&mut result, body);
                }

                None => {
                    let _ = writeln!(&mut result, "{:4}: {:16} native{}", id, entry.name, marker);
                }
            }
        }

        let _ = writeln!(&mut result, "strings: {} constants", self.strings.len());

        for (id, text) in self.strings.iter() {
            let _ = writeln!(&mut result, "{:4}: {:?}", id, text);
        }

        let _ = writeln!(&mut result, "entry: {} cells", self.entry.len());
        self.list_cells(&mut result, &self.entry);

        result
    }

    /// Append one body's cells to the listing, one indented line per cell.
    fn list_cells(&self, result: &mut String, cells: &CellList) {
        for (index, cell) in cells.iter().enumerate() {
            let rendered = match cell {
                Cell::ExecToken(id) => format!("exec {}", self.dictionary.entry(*id).name),
                Cell::IntLiteral(value) => format!("int  {}", value),
                Cell::StringRef(id) => format!("str  {:?}", self.strings.get(*id)),
                Cell::ResolvedBranch(offset) => format!("->   {}", offset),
            };

            let _ = writeln!(result, "      {:4}: {}", index, rendered);
        }
    }
}
