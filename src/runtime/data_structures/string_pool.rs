use serde::{Deserialize, Serialize};

/// A stable identifier for an interned string constant.
pub type StringId = usize;

/// The global pool of string constants referenced by compiled cells.
///
/// Interning is by occurrence, not by value.  Two identical literals in two definitions produce
/// two distinct constants, matching how the original emitted one global per literal.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct StringPool {
    strings: Vec<String>,
}

impl StringPool {
    /// Create a new empty pool.
    pub fn new() -> StringPool {
        StringPool::default()
    }

    /// Intern a string constant and return its identity.
    pub fn intern(&mut self, text: String) -> StringId {
        let id = self.strings.len();

        self.strings.push(text);
        id
    }

    /// Get the text of an interned constant.
    pub fn get(&self, id: StringId) -> &str {
        &self.strings[id]
    }

    /// How many constants have been interned.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Is the pool empty?
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Walk the constants in interning order.
    pub fn iter(&self) -> impl Iterator<Item = (StringId, &String)> {
        self.strings.iter().enumerate()
    }
}
