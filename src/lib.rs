/// Module for the source level stages, tokenizing and parsing.
pub mod lang;

/// Module for the compiler back half, the dictionary, code generation and the dispatch machine.
pub mod runtime;
