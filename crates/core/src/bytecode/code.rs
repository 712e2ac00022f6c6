//! `Instruction` and `Executable` (spec §3): the finalized output of a
//! `compile()` call.

use smallvec::SmallVec;

use crate::ast::CodeRange;
use crate::bytecode::op::Opcode;

/// A fully-resolved instruction operand. By the time an [`Executable`] is
/// built every [`crate::bytecode::Promise`] operand has been replaced by
/// the `Int` it resolved to (spec §4.4 "Finalization").
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Int(i64),
    Float(f64),
    /// Interned directly rather than indexed into a side table — see
    /// [`crate::bytecode::builder::ExeBuilder`]'s string interner and
    /// spec §5/§9 ("string lifetime").
    Str(std::rc::Rc<str>),
}

/// One instruction: an opcode, its (possibly empty) operand list, and the
/// source span it was lowered from. Most opcodes carry 0–2 operands, so a
/// `SmallVec` avoids a heap allocation per instruction in the common case.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub opcode: Opcode,
    pub operands: SmallVec<[Operand; 2]>,
    pub range: CodeRange,
}

/// An immutable, indexable instruction vector, plus an owned reference to
/// the source text for diagnostics (spec §3 "Executable"). Every
/// [`Instruction::range`] is a byte span into `source`.
#[derive(Debug, Clone)]
pub struct Executable {
    instructions: Vec<Instruction>,
    source: std::rc::Rc<str>,
}

impl Executable {
    #[must_use]
    pub(crate) fn new(instructions: Vec<Instruction>, source: std::rc::Rc<str>) -> Self {
        Self { instructions, source }
    }

    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// The source text this `Executable` was compiled from, for rendering
    /// diagnostics from an [`Instruction::range`].
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}
