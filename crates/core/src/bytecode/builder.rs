//! `ExeBuilder`: accumulates instructions and patches forward jumps,
//! finalizing into an [`Executable`]. Grounded on the teacher's own
//! `CodeBuilder` (`emit_jump`/`patch_jump`/`emit_jump_to`, a `JumpLabel`
//! newtype over an instruction index) — generalized here to cover every
//! opcode in spec §4.4's table, and to intern string operands into the
//! Executable directly (spec §5/§9) instead of indexing a side table.

use std::collections::HashMap;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::arena::Scratch;
use crate::ast::CodeRange;
use crate::bytecode::code::{Executable, Instruction, Operand};
use crate::bytecode::op::Opcode;
use crate::bytecode::promise::{Promise, PromiseError};
use crate::error::CompileError;

/// An instruction operand as known at emit time: either a resolved literal,
/// or a reference to a not-yet-resolved [`Promise`] living in the scratch arena.
#[derive(Clone)]
enum BuildOperand<'a> {
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    Promise(&'a Promise),
}

struct PendingInstruction<'a> {
    opcode: Opcode,
    operands: SmallVec<[BuildOperand<'a>; 2]>,
    range: CodeRange,
}

pub struct ExeBuilder<'a> {
    scratch: &'a Scratch,
    instructions: Vec<PendingInstruction<'a>>,
    interned: HashMap<String, Rc<str>>,
    retain_spans: bool,
    source: Rc<str>,
}

impl<'a> ExeBuilder<'a> {
    #[must_use]
    pub fn new(scratch: &'a Scratch, retain_spans: bool, source: Rc<str>) -> Self {
        Self { scratch, instructions: Vec::new(), interned: HashMap::new(), retain_spans, source }
    }

    /// Current instruction count — the index the *next* emitted instruction
    /// will occupy, which is exactly what a back-edge or a patched forward
    /// jump needs to target.
    #[must_use]
    pub fn len(&self) -> i64 {
        self.instructions.len() as i64
    }

    /// Allocates a fresh, unresolved forward-jump target in the scratch arena.
    #[must_use]
    pub fn new_promise(&self) -> &'a Promise {
        self.scratch.bump().alloc(Promise::new())
    }

    /// Resolves `promise` to the current instruction index, i.e. "the
    /// instruction about to be emitted next".
    pub fn patch_here(&self, promise: &'a Promise) -> Result<(), CompileError> {
        self.patch(promise, self.len())
    }

    pub fn patch(&self, promise: &'a Promise, target: i64) -> Result<(), CompileError> {
        // A `Conflict` here means the same Promise was resolved twice with
        // different targets — always a code generator bug, so it is folded
        // into the same internal error kind as a never-resolved Promise.
        promise.resolve(target).map_err(|PromiseError::Conflict| CompileError::UnresolvedJumpTarget {
            instruction: self.instructions.len(),
        })
    }

    fn intern(&mut self, s: &str) -> Rc<str> {
        if let Some(existing) = self.interned.get(s) {
            return existing.clone();
        }
        let rc: Rc<str> = Rc::from(s);
        self.interned.insert(s.to_owned(), rc.clone());
        rc
    }

    fn emit(&mut self, opcode: Opcode, operands: SmallVec<[BuildOperand<'a>; 2]>, range: CodeRange) -> i64 {
        let range = if self.retain_spans { range } else { CodeRange::ZERO };
        let index = self.len();
        self.instructions.push(PendingInstruction { opcode, operands, range });
        index
    }

    fn emit_no_operand(&mut self, opcode: Opcode, range: CodeRange) -> i64 {
        self.emit(opcode, SmallVec::new(), range)
    }

    fn emit_one_int(&mut self, opcode: Opcode, value: i64, range: CodeRange) -> i64 {
        let mut operands = SmallVec::new();
        operands.push(BuildOperand::Int(value));
        self.emit(opcode, operands, range)
    }

    pub fn emit_push_int(&mut self, value: i64, range: CodeRange) -> i64 {
        self.emit_one_int(Opcode::PushInt, value, range)
    }

    pub fn emit_push_flt(&mut self, value: f64, range: CodeRange) -> i64 {
        let mut operands = SmallVec::new();
        operands.push(BuildOperand::Float(value));
        self.emit(Opcode::PushFlt, operands, range)
    }

    pub fn emit_push_str(&mut self, value: &str, range: CodeRange) -> i64 {
        let interned = self.intern(value);
        let mut operands = SmallVec::new();
        operands.push(BuildOperand::Str(interned));
        self.emit(Opcode::PushStr, operands, range)
    }

    pub fn emit_push_var(&mut self, name: &str, range: CodeRange) -> i64 {
        let interned = self.intern(name);
        let mut operands = SmallVec::new();
        operands.push(BuildOperand::Str(interned));
        self.emit(Opcode::PushVar, operands, range)
    }

    pub fn emit_push_none(&mut self, range: CodeRange) -> i64 {
        self.emit_no_operand(Opcode::PushNone, range)
    }

    pub fn emit_push_true(&mut self, range: CodeRange) -> i64 {
        self.emit_no_operand(Opcode::PushTrue, range)
    }

    pub fn emit_push_false(&mut self, range: CodeRange) -> i64 {
        self.emit_no_operand(Opcode::PushFalse, range)
    }

    pub fn emit_push_lst(&mut self, hint: i64, range: CodeRange) -> i64 {
        self.emit_one_int(Opcode::PushLst, hint, range)
    }

    pub fn emit_push_map(&mut self, hint: i64, range: CodeRange) -> i64 {
        self.emit_one_int(Opcode::PushMap, hint, range)
    }

    pub fn emit_push_fun(&mut self, entry: &'a Promise, argc: i64, range: CodeRange) -> i64 {
        let mut operands = SmallVec::new();
        operands.push(BuildOperand::Promise(entry));
        operands.push(BuildOperand::Int(argc));
        self.emit(Opcode::PushFun, operands, range)
    }

    pub fn emit_not(&mut self, range: CodeRange) -> i64 {
        self.emit_no_operand(Opcode::Not, range)
    }

    pub fn emit_pos(&mut self, range: CodeRange) -> i64 {
        self.emit_no_operand(Opcode::Pos, range)
    }

    pub fn emit_neg(&mut self, range: CodeRange) -> i64 {
        self.emit_no_operand(Opcode::Neg, range)
    }

    pub fn emit_binary(&mut self, opcode: Opcode, range: CodeRange) -> i64 {
        debug_assert!(matches!(
            opcode,
            Opcode::Add
                | Opcode::Sub
                | Opcode::Mul
                | Opcode::Div
                | Opcode::Eql
                | Opcode::Nql
                | Opcode::Lss
                | Opcode::Leq
                | Opcode::Grt
                | Opcode::Geq
                | Opcode::And
                | Opcode::Or
        ));
        self.emit_no_operand(opcode, range)
    }

    pub fn emit_select(&mut self, range: CodeRange) -> i64 {
        self.emit_no_operand(Opcode::Select, range)
    }

    pub fn emit_insert(&mut self, range: CodeRange) -> i64 {
        self.emit_no_operand(Opcode::Insert, range)
    }

    pub fn emit_insert2(&mut self, range: CodeRange) -> i64 {
        self.emit_no_operand(Opcode::Insert2, range)
    }

    pub fn emit_ass(&mut self, name: &str, range: CodeRange) -> i64 {
        let interned = self.intern(name);
        let mut operands = SmallVec::new();
        operands.push(BuildOperand::Str(interned));
        self.emit(Opcode::Ass, operands, range)
    }

    pub fn emit_pop(&mut self, count: i64, range: CodeRange) -> i64 {
        self.emit_one_int(Opcode::Pop, count, range)
    }

    pub fn emit_jump_to(&mut self, target: i64, range: CodeRange) -> i64 {
        self.emit_one_int(Opcode::Jump, target, range)
    }

    pub fn emit_jump(&mut self, target: &'a Promise, range: CodeRange) -> i64 {
        let mut operands = SmallVec::new();
        operands.push(BuildOperand::Promise(target));
        self.emit(Opcode::Jump, operands, range)
    }

    pub fn emit_jump_if_not_and_pop(&mut self, target: &'a Promise, range: CodeRange) -> i64 {
        let mut operands = SmallVec::new();
        operands.push(BuildOperand::Promise(target));
        self.emit(Opcode::JumpIfNotAndPop, operands, range)
    }

    pub fn emit_jump_if_and_pop_to(&mut self, target: i64, range: CodeRange) -> i64 {
        self.emit_one_int(Opcode::JumpIfAndPop, target, range)
    }

    pub fn emit_call(&mut self, argc: i64, returns: i64, range: CodeRange) -> i64 {
        let mut operands = SmallVec::new();
        operands.push(BuildOperand::Int(argc));
        operands.push(BuildOperand::Int(returns));
        self.emit(Opcode::Call, operands, range)
    }

    pub fn emit_return(&mut self, count: i64, range: CodeRange) -> i64 {
        self.emit_one_int(Opcode::Return, count, range)
    }

    /// Replaces every `Promise` operand with its resolved payload. Any
    /// promise still unresolved at this point is a code generator bug
    /// (spec §4.4 "Finalization").
    pub fn finalize(self) -> Result<Executable, CompileError> {
        let mut finalized = Vec::with_capacity(self.instructions.len());
        for (index, pending) in self.instructions.into_iter().enumerate() {
            let mut operands = SmallVec::with_capacity(pending.operands.len());
            for operand in pending.operands {
                let resolved = match operand {
                    BuildOperand::Int(v) => Operand::Int(v),
                    BuildOperand::Float(v) => Operand::Float(v),
                    BuildOperand::Str(s) => Operand::Str(s),
                    BuildOperand::Promise(p) => {
                        let value =
                            p.read().ok_or(CompileError::UnresolvedJumpTarget { instruction: index })?;
                        Operand::Int(value)
                    }
                };
                operands.push(resolved);
            }
            finalized.push(Instruction { opcode: pending.opcode, operands, range: pending.range });
        }
        Ok(Executable::new(finalized, self.source))
    }
}
