//! `Function` (spec §3): `{ exe_index, argc, captured }` — the entry index
//! of the inlined function body within an [`crate::bytecode::Executable`],
//! its declared arity, and the [`crate::types::Closure`] it closes over.
//! Bodies are inlined into the same instruction stream (spec §4.4
//! "Function definition"), so a `Function` value itself carries no code —
//! only where to jump and which scope to resume lookups from.

use crate::heap::HeapId;

#[derive(Debug, Clone, Copy)]
pub struct FunctionObject {
    pub exe_index: i64,
    pub argc: usize,
    pub captured: HeapId,
}

impl FunctionObject {
    #[must_use]
    pub fn new(exe_index: i64, argc: usize, captured: HeapId) -> Self {
        Self { exe_index, argc, captured }
    }
}
