use crate::{
    lang::code::{Cell, CellList},
    runtime::{
        built_ins::Primitive,
        data_structures::{dictionary::ExecToken, dictionary::WordId, string_pool::StringId},
        error::{self, CompilerError, ErrorKind},
        image::CompiledImage,
    },
};
use std::io;

/// A value on the machine's data stack.  The compiled language only knows integers and
/// references to interned string constants.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Value {
    Int(i64),
    Str(StringId),
}

/// Which cell sequence a code pointer lives in.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum BodyRef {
    /// The image's entry point sequence.
    Entry,

    /// The compiled body of a colon word.
    Word(WordId),
}

/// One of the machine's two cursors.  Identifies a cell within a specific body.
#[derive(Clone, Copy, Debug)]
struct CodePointer {
    body: BodyRef,
    index: usize,
}

/// The reference implementation of the threaded dispatch model.
///
/// Two cursors drive execution.  `next` addresses the cell to run, the fetch-execute step loads
/// that cell, advances `next` by one and transfers control to whatever the cell references
/// through a single match.  Interpreting a colon word pushes the current `next` as a return
/// point and restarts at the head of the word's body, `exit` pops the return point back.  With
/// no return point left `exit` halts the machine, which is how the entry sequence terminates.
pub struct Machine<'a> {
    /// The compiled image being executed.
    image: &'a CompiledImage,

    /// The data stack.
    stack: Vec<Value>,

    /// Return points of colon words currently being interpreted.
    return_stack: Vec<CodePointer>,

    /// The address of the next cell to run.
    next: CodePointer,

    /// Set by the halting primitives, stops the fetch-execute loop.
    halted: bool,

    /// The status the program halted with.
    exit_status: i64,
}

/// Shorthand for raising a machine fault.
fn fault<T>(message: String) -> error::Result<T> {
    CompilerError::new_as_result(ErrorKind::Execution, None, message)
}

impl<'a> Machine<'a> {
    /// Create a new machine positioned at the start of the image's entry sequence.
    pub fn new(image: &'a CompiledImage) -> Machine<'a> {
        Machine {
            image,
            stack: Vec::new(),
            return_stack: Vec::new(),
            next: CodePointer {
                body: BodyRef::Entry,
                index: 0,
            },
            halted: false,
            exit_status: 0,
        }
    }

    /// Run the program to completion, writing all output to the given sink.  Returns the exit
    /// status the program halted with.
    pub fn run<W: io::Write>(&mut self, out: &mut W) -> error::Result<i64> {
        while !self.halted {
            self.step(out)?;
        }

        Ok(self.exit_status)
    }

    /// The machine's data stack, useful for inspecting the final state in tests.
    pub fn stack(&self) -> &[Value] {
        &self.stack
    }

    /// One fetch-execute step.  Load the cell at next, advance next by one cell, then dispatch.
    fn step<W: io::Write>(&mut self, out: &mut W) -> error::Result<()> {
        let cell = self.fetch()?;

        match cell {
            Cell::ExecToken(id) => self.execute(id, out)?,

            // Data cells reached directly by the dispatch loop push their value.  This is what
            // makes a string reference ahead of the prints word executable.
            Cell::IntLiteral(value) => self.stack.push(Value::Int(value)),
            Cell::StringRef(id) => self.stack.push(Value::Str(id)),

            // Branch target cells are consumed by the branching primitives and are never
            // dispatched on their own.
            Cell::ResolvedBranch(offset) => {
                return fault(format!("Stray branch target cell to offset {}.", offset));
            }
        }

        Ok(())
    }

    /// Transfer control through an execution token.
    fn execute<W: io::Write>(&mut self, id: WordId, out: &mut W) -> error::Result<()> {
        match self.image.dictionary.entry(id).exec_token {
            ExecToken::Native(primitive) => self.execute_primitive(primitive, out),

            // Push the current next as the return point and restart at the head of the body.
            ExecToken::Colon => {
                self.return_stack.push(self.next);
                self.next = CodePointer {
                    body: BodyRef::Word(id),
                    index: 0,
                };

                Ok(())
            }
        }
    }

    /// The behavior of every native routine, dispatched through one match.
    fn execute_primitive<W: io::Write>(
        &mut self,
        primitive: Primitive,
        out: &mut W,
    ) -> error::Result<()> {
        match primitive {
            Primitive::Lit => match self.fetch()? {
                Cell::IntLiteral(value) => self.stack.push(Value::Int(value)),
                Cell::StringRef(id) => self.stack.push(Value::Str(id)),

                // A ticked word's reference cell, pushed as the numeric execution token the
                // same way find-word reports one.
                Cell::ExecToken(id) => self.stack.push(Value::Int(id as i64)),

                other => return fault(format!("lit found no literal cell, got {}.", other)),
            },

            Primitive::Exit => match self.return_stack.pop() {
                Some(return_point) => self.next = return_point,
                None => self.halted = true,
            },

            Primitive::Branch => {
                let target = self.fetch_branch_target()?;
                self.next.index = target;
            }

            Primitive::ZeroBranch => {
                let target = self.fetch_branch_target()?;

                if self.pop_int()? == 0 {
                    self.next.index = target;
                }
            }

            Primitive::Prints | Primitive::PrintStr => {
                let id = self.pop_str()?;
                write!(out, "{}", self.image.strings.get(id))?;
            }

            Primitive::PrintInt => {
                let value = self.pop_int()?;
                write!(out, " {}", value)?;
            }

            Primitive::Dup => {
                let top = self.pop()?;
                self.stack.push(top);
                self.stack.push(top);
            }

            Primitive::Drop => {
                let _ = self.pop()?;
            }

            Primitive::Swap => {
                let a = self.pop()?;
                let b = self.pop()?;
                self.stack.push(a);
                self.stack.push(b);
            }

            Primitive::Over => {
                let a = self.pop()?;
                let b = self.pop()?;
                self.stack.push(b);
                self.stack.push(a);
                self.stack.push(b);
            }

            Primitive::Add => self.binary_op(|x, y| Ok(x.wrapping_add(y)))?,
            Primitive::Sub => self.binary_op(|x, y| Ok(x.wrapping_sub(y)))?,
            Primitive::Mul => self.binary_op(|x, y| Ok(x.wrapping_mul(y)))?,

            Primitive::Div => self.binary_op(|x, y| {
                if y == 0 {
                    fault("Division by zero.".to_string())
                } else {
                    Ok(x / y)
                }
            })?,

            Primitive::Mod => self.binary_op(|x, y| {
                if y == 0 {
                    fault("Division by zero.".to_string())
                } else {
                    Ok(x % y)
                }
            })?,

            Primitive::Equals => self.binary_op(|x, y| Ok(truth(x == y)))?,
            Primitive::Less => self.binary_op(|x, y| Ok(truth(x < y)))?,
            Primitive::Greater => self.binary_op(|x, y| Ok(truth(x > y)))?,

            Primitive::ZeroEquals => {
                let value = self.pop_int()?;
                self.stack.push(Value::Int(truth(value == 0)));
            }

            Primitive::Number => {
                let id = self.pop_str()?;
                let text = self.image.strings.get(id);

                match text.parse::<i64>() {
                    Ok(value) => self.stack.push(Value::Int(value)),
                    Err(_) => return fault(format!("Could not convert {:?} to a number.", text)),
                }
            }

            Primitive::StringEquals => {
                let b = self.pop_str()?;
                let a = self.pop_str()?;
                let equal = self.image.strings.get(a) == self.image.strings.get(b);

                self.stack.push(Value::Int(truth(equal)));
            }

            Primitive::FindWord => {
                let id = self.pop_str()?;
                let name = self.image.strings.get(id);

                match self.image.dictionary.lookup(name) {
                    Some(word) => self.stack.push(Value::Int(word as i64)),
                    None => self.stack.push(Value::Int(-1)),
                }
            }

            Primitive::Foo => {
                self.stack.push(Value::Int(8));
                self.stack.push(Value::Int(7));
            }

            Primitive::Bar => {
                let _ = self.pop()?;
                self.exit_status = self.pop_int()?;
                self.halted = true;
            }

            Primitive::Bye => self.halted = true,
        }

        Ok(())
    }

    /// Load the cell at next and advance next past it.
    fn fetch(&mut self) -> error::Result<Cell> {
        let body = self.body(self.next.body)?;

        match body.get(self.next.index) {
            Some(cell) => {
                let cell = *cell;

                self.next.index += 1;
                Ok(cell)
            }

            // Can not happen for generated code, every body ends in an exit cell.
            None => fault("The code pointer ran off the end of a body.".to_string()),
        }
    }

    /// Consume the branch target cell following a branching primitive.
    fn fetch_branch_target(&mut self) -> error::Result<usize> {
        match self.fetch()? {
            Cell::ResolvedBranch(target) => Ok(target),
            other => fault(format!("Branch found no target cell, got {}.", other)),
        }
    }

    /// Resolve a body reference to its cell sequence.
    fn body(&self, body: BodyRef) -> error::Result<&'a CellList> {
        match body {
            BodyRef::Entry => Ok(&self.image.entry),

            BodyRef::Word(id) => match &self.image.dictionary.entry(id).body {
                Some(cells) => Ok(cells),
                None => fault(format!(
                    "The native word {} has no body to interpret.",
                    self.image.dictionary.entry(id).name
                )),
            },
        }
    }

    /// Pop any value from the data stack.
    fn pop(&mut self) -> error::Result<Value> {
        match self.stack.pop() {
            Some(value) => Ok(value),
            None => fault("Data stack underflow.".to_string()),
        }
    }

    /// Pop an integer from the data stack.
    fn pop_int(&mut self) -> error::Result<i64> {
        match self.pop()? {
            Value::Int(value) => Ok(value),
            Value::Str(_) => fault("Expected an integer on the stack, found a string.".to_string()),
        }
    }

    /// Pop a string reference from the data stack.
    fn pop_str(&mut self) -> error::Result<StringId> {
        match self.pop()? {
            Value::Str(id) => Ok(id),
            Value::Int(_) => fault("Expected a string on the stack, found an integer.".to_string()),
        }
    }

    /// Pop two integers and push the result of the operation.
    fn binary_op<F>(&mut self, op: F) -> error::Result<()>
    where
        F: FnOnce(i64, i64) -> error::Result<i64>,
    {
        let y = self.pop_int()?;
        let x = self.pop_int()?;

        self.stack.push(Value::Int(op(x, y)?));
        Ok(())
    }
}

/// The language's truth values, -1 for true and 0 for false.
fn truth(value: bool) -> i64 {
    if value { -1 } else { 0 }
}

/// Convenience wrapper, run a compiled image and return its exit status.
pub fn run_image<W: io::Write>(image: &CompiledImage, out: &mut W) -> error::Result<i64> {
    Machine::new(image).run(out)
}
