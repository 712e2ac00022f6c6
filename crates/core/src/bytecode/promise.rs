//! `Promise` (spec §4.5): a write-once cell used to patch forward jump
//! targets. Per §9 ("Forward jumps"), this implementation deliberately uses
//! a genuine cell resolved at finalization rather than back-patching the
//! instruction array directly — the more literal reading of "Promise" as a
//! first-class object with `resolve`/`read` operations, and it keeps
//! "operand kind" (`Int` vs `Promise`) a real distinction the finalizer
//! checks rather than an emit-time fiction.
//!
//! Instances are allocated out of the per-compile [`crate::arena::Scratch`]
//! arena (mirroring the teacher's `CodeBuilder::emit_jump`/`JumpLabel`
//! pattern, generalized from an index newtype to an owned cell) and never
//! outlive the `compile()` call that created them.

use std::cell::Cell;

#[derive(Debug, Eq, PartialEq)]
pub enum PromiseError {
    /// `resolve` was called twice with different payloads.
    Conflict,
}

#[derive(Debug, Default)]
pub struct Promise {
    cell: Cell<Option<i64>>,
}

impl Promise {
    #[must_use]
    pub fn new() -> Self {
        Self { cell: Cell::new(None) }
    }

    /// Resolves the promise to `payload`. Idempotent when called again with
    /// the same payload; a differing re-resolution is a bug (spec §8
    /// "Round-trip / idempotence").
    pub fn resolve(&self, payload: i64) -> Result<(), PromiseError> {
        match self.cell.get() {
            None => {
                self.cell.set(Some(payload));
                Ok(())
            }
            Some(existing) if existing == payload => Ok(()),
            Some(_) => Err(PromiseError::Conflict),
        }
    }

    #[must_use]
    pub fn read(&self) -> Option<i64> {
        self.cell.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_promise_reads_none() {
        let p = Promise::new();
        assert_eq!(p.read(), None);
    }

    #[test]
    fn repeated_resolve_with_same_payload_is_a_no_op() {
        let p = Promise::new();
        p.resolve(42).unwrap();
        p.resolve(42).unwrap();
        assert_eq!(p.read(), Some(42));
    }

    #[test]
    fn resolve_with_a_different_payload_is_an_error() {
        let p = Promise::new();
        p.resolve(1).unwrap();
        assert_eq!(p.resolve(2), Err(PromiseError::Conflict));
    }
}
