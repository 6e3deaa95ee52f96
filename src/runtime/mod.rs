/// Module for the native word set the compiler binds against.
pub mod built_ins;

/// Module for the compiler itself, the stage turning parsed programs into images.
pub mod compiler;

/// Module for the core data structures, the word dictionary and the string pool.
pub mod data_structures;

/// Module for the error type shared across the whole pipeline.
pub mod error;

/// Module for the compiled image, its binary encoding and its listing.
pub mod image;

/// Module for the reference dispatch machine that runs compiled images.
pub mod interpreter;
