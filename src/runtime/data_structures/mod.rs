/// Module for the append-only word dictionary shared by the compiler and the dispatch machine.
pub mod dictionary;

/// Module for the pool of interned string constants.
pub mod string_pool;
