//! Bytecode construction: the instruction set, the finalized `Executable`,
//! the forward-jump `Promise` mechanism, and the `ExeBuilder` that ties
//! them together for the code generator in [`crate::codegen`].

mod builder;
mod code;
mod codegen;
mod op;
mod promise;

pub use builder::ExeBuilder;
pub use code::{Executable, Instruction, Operand};
pub use codegen::compile;
pub use op::Opcode;
pub use promise::{Promise, PromiseError};
