use crate::runtime::data_structures::{dictionary::WordId, string_pool::StringId};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// One unit of compiled code.  A compiled colon word owns an ordered, fixed length sequence of
/// cells, its body, and the minimal fetch-execute loop runs exactly one cell per step.
///
/// The classic implementation stores raw routine addresses in the cells and branches through
/// them indirectly.  Here the same indirection is modeled as a tagged variant dispatched through
/// a single match, which keeps the threading model while staying in safe code.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub enum Cell {
    /// A reference to a dictionary entry, native or colon.  The reference was bound at the time
    /// the cell was generated and later redefinitions of the name never alter it.
    ExecToken(WordId),

    /// An integer literal, always generated right behind an ExecToken for the lit primitive
    /// which consumes it.
    IntLiteral(i64),

    /// A reference to an interned string constant.
    StringRef(StringId),

    /// A branch target resolved to a cell offset within the owning body.
    ResolvedBranch(usize),
}

/// A compiled body, or the entry point sequence of the program.
pub type CellList = Vec<Cell>;

/// Print the raw cell for debugging.  The image listing resolves execution tokens and string
/// references to their names, this only shows the stored indices.
impl Display for Cell {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Cell::ExecToken(id) => write!(f, "xt#{}", id),
            Cell::IntLiteral(value) => write!(f, "int {}", value),
            Cell::StringRef(id) => write!(f, "str#{}", id),
            Cell::ResolvedBranch(offset) => write!(f, "-> {}", offset),
        }
    }
}
