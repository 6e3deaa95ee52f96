use crate::{lang::code::CellList, runtime::built_ins::Primitive};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, ops::Index};

/// A stable identifier for a dictionary entry.  Entries are kept in a growable arena and are
/// never removed or mutated, so an id handed out once stays valid for the whole compile run.
pub type WordId = usize;

/// The runnable behavior behind a dictionary entry.  Native entries name one of the fixed
/// primitive routines, colon entries are interpreted through their compiled body.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub enum ExecToken {
    /// The entry is one of the fixed native routines.
    Native(Primitive),

    /// The entry is a user defined colon word, its body holds the compiled cells.
    Colon,
}

/// A single named routine in the dictionary.  Once created an entry is read-only, references
/// compiled against it are bound to it permanently.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct DictionaryEntry {
    /// The name the entry was defined under.
    pub name: String,

    /// Was the word marked immediate when it was defined?
    pub is_immediate: bool,

    /// The routine reference the dispatch loop jumps through.
    pub exec_token: ExecToken,

    /// The compiled cell sequence, present only for colon words.
    pub body: Option<CellList>,

    /// The previously defined entry, or None for the first entry in the chain.  Entries form a
    /// singly linked chain in definition order, in the arena this is always the next lower id.
    pub previous: Option<WordId>,
}

/// The single registry of all named routines known to the compiler, native and colon alike.
///
/// The dictionary is append-only for the duration of a compile run.  Defining a name that
/// already exists shadows the older entry for every later lookup, but the older entry stays in
/// the arena and every reference already bound to it is unaffected.
#[derive(Clone, Default, Serialize, Deserialize, Debug)]
pub struct Dictionary {
    /// The arena of entries, ordered by definition.
    entries: Vec<DictionaryEntry>,

    /// Name to most recently defined id, this is what makes lookup shadowing O(1).
    index: HashMap<String, WordId>,
}

impl Index<WordId> for Dictionary {
    type Output = DictionaryEntry;

    fn index(&self, id: WordId) -> &DictionaryEntry {
        &self.entries[id]
    }
}

impl Dictionary {
    /// Create a new empty dictionary.
    pub fn new() -> Dictionary {
        Dictionary::default()
    }

    /// Append a new entry to the chain tail and return its id.  The entry's previous reference
    /// is filled in here, the caller never supplies it.
    pub fn define(
        &mut self,
        name: String,
        is_immediate: bool,
        exec_token: ExecToken,
        body: Option<CellList>,
    ) -> WordId {
        let id = self.entries.len();
        let previous = id.checked_sub(1);

        self.entries.push(DictionaryEntry {
            name: name.clone(),
            is_immediate,
            exec_token,
            body,
            previous,
        });

        let _ = self.index.insert(name, id);

        id
    }

    /// Look up a name, returning the most recently defined entry with that name.  Entries that
    /// have been shadowed are never returned here again, they stay reachable only through the
    /// previous chain.
    pub fn lookup(&self, name: &str) -> Option<WordId> {
        self.index.get(name).copied()
    }

    /// Get an entry by id.
    pub fn entry(&self, id: WordId) -> &DictionaryEntry {
        &self.entries[id]
    }

    /// How many entries have been defined.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Is the dictionary empty?
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Walk the entries in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (WordId, &DictionaryEntry)> {
        self.entries.iter().enumerate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::built_ins::Primitive;

    #[test]
    fn lookup_returns_the_newest_entry_with_a_name() {
        let mut dictionary = Dictionary::new();

        let first = dictionary.define("one".to_string(), false, ExecToken::Native(Primitive::Bye), None);
        let second = dictionary.define("one".to_string(), false, ExecToken::Native(Primitive::Foo), None);

        assert_eq!(dictionary.lookup("one"), Some(second));
        assert_eq!(dictionary.entry(first).name, "one");
        assert_eq!(dictionary.entry(second).previous, Some(first));
    }

    #[test]
    fn entries_chain_in_definition_order() {
        let mut dictionary = Dictionary::new();

        let a = dictionary.define("a".to_string(), false, ExecToken::Native(Primitive::Dup), None);
        let b = dictionary.define("b".to_string(), false, ExecToken::Native(Primitive::Drop), None);

        assert_eq!(dictionary.entry(a).previous, None);
        assert_eq!(dictionary.entry(b).previous, Some(a));
    }
}
