/// Module for reading the original source code as a stream of whitespace delimited atoms.
pub mod source_buffer;

/// Module for classifying the atom stream into typed tokens for further processing.
pub mod tokenizing;

/// Module for grouping the token stream into word definitions and the top level program.
pub mod parsing;

/// Module defining the cells that make up a compiled word body.
pub mod code;
