use crate::runtime::data_structures::dictionary::{Dictionary, ExecToken};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// The fixed set of native routines the compiler references by name and the dispatch machine
/// executes directly.  The compiler never defines their behavior, it only binds execution
/// tokens against their dictionary entries.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub enum Primitive {
    /// Push the immediately following literal cell's value.
    Lit,

    /// Return from the enclosing colon body, resuming the caller.  With no caller left the
    /// machine halts, which is how the entry sequence terminates.
    Exit,

    /// Unconditionally continue at the resolved target offset in the following cell.
    Branch,

    /// Pop a value, branch to the target in the following cell if it was zero, otherwise skip
    /// over the target cell and fall through.
    ZeroBranch,

    /// Pop an interned string reference and print its text with no added delimiters.
    Prints,

    /// Pop an integer and print it.
    PrintInt,

    /// Pop an interned string reference and print its text.
    PrintStr,

    /// Duplicate the top of the stack.
    Dup,

    /// Discard the top of the stack.
    Drop,

    /// Exchange the two top stack values.
    Swap,

    /// Copy the second stack value to the top.
    Over,

    Add,
    Sub,
    Mul,
    Div,
    Mod,

    /// Pop two values, push -1 if they are equal, 0 otherwise.
    Equals,
    Less,
    Greater,

    /// Pop one value, push -1 if it was zero, 0 otherwise.
    ZeroEquals,

    /// Pop an interned string reference, parse it as a base-10 integer and push the result.
    Number,

    /// Pop two interned string references, push -1 if their texts are equal, 0 otherwise.
    StringEquals,

    /// Pop an interned string reference, push the execution token of the newest dictionary entry
    /// with that name, or -1 if there is none.
    FindWord,

    /// Demo word carried over from the original runtime, pushes 8 and then 7.
    Foo,

    /// Demo word carried over from the original runtime, pops two values and halts with the
    /// second as the exit status.
    Bar,

    /// Halt the machine without advancing.
    Bye,
}

impl Primitive {
    /// The dictionary name the primitive is registered under.
    pub fn name(&self) -> &'static str {
        match self {
            Primitive::Lit => "lit",
            Primitive::Exit => "exit",
            Primitive::Branch => "branch",
            Primitive::ZeroBranch => "0branch",
            Primitive::Prints => "prints",
            Primitive::PrintInt => "print-int",
            Primitive::PrintStr => "print-str",
            Primitive::Dup => "dup",
            Primitive::Drop => "drop",
            Primitive::Swap => "swap",
            Primitive::Over => "over",
            Primitive::Add => "+",
            Primitive::Sub => "-",
            Primitive::Mul => "*",
            Primitive::Div => "/",
            Primitive::Mod => "mod",
            Primitive::Equals => "=",
            Primitive::Less => "<",
            Primitive::Greater => ">",
            Primitive::ZeroEquals => "0=",
            Primitive::Number => "number",
            Primitive::StringEquals => "string=",
            Primitive::FindWord => "find-word",
            Primitive::Foo => "foo",
            Primitive::Bar => "bar",
            Primitive::Bye => "bye",
        }
    }

    /// All primitives in registration order.
    pub fn all() -> &'static [Primitive] {
        &[
            Primitive::Lit,
            Primitive::Exit,
            Primitive::Branch,
            Primitive::ZeroBranch,
            Primitive::Prints,
            Primitive::PrintInt,
            Primitive::PrintStr,
            Primitive::Dup,
            Primitive::Drop,
            Primitive::Swap,
            Primitive::Over,
            Primitive::Add,
            Primitive::Sub,
            Primitive::Mul,
            Primitive::Div,
            Primitive::Mod,
            Primitive::Equals,
            Primitive::Less,
            Primitive::Greater,
            Primitive::ZeroEquals,
            Primitive::Number,
            Primitive::StringEquals,
            Primitive::FindWord,
            Primitive::Foo,
            Primitive::Bar,
            Primitive::Bye,
        ]
    }
}

impl Display for Primitive {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Pre-register the whole native word set with a fresh dictionary.  User definitions land on top
/// of these and may shadow them like any other entry.
pub fn register_primitives(dictionary: &mut Dictionary) {
    for primitive in Primitive::all() {
        let _ = dictionary.define(
            primitive.name().to_string(),
            false,
            ExecToken::Native(*primitive),
            None,
        );
    }
}
