//! Scratch allocator for the duration of a single [`crate::compile`] call.
//!
//! The C source acquires a scratch arena on entry to compilation and
//! releases it on every exit path (success or error) so that transient
//! bookkeeping — jump-patch lists, label tables, constant-folding scratch —
//! never leaks into the finished [`crate::bytecode::Executable`]. This is
//! realized here as a plain, call-scoped `bumpalo::Bump` owned by the
//! [`Scratch`] wrapper rather than the thread-local arena some embeddings
//! use for long-lived interpreter state: a compiler invocation has a single
//! entry and a single exit, so there is no reset/reuse cycle to manage.
pub struct Scratch {
    bump: bumpalo::Bump,
}

impl Scratch {
    #[must_use]
    pub fn new() -> Self {
        Self { bump: bumpalo::Bump::new() }
    }

    #[must_use]
    pub fn with_capacity(bytes: usize) -> Self {
        Self { bump: bumpalo::Bump::with_capacity(bytes) }
    }

    #[must_use]
    pub fn bump(&self) -> &bumpalo::Bump {
        &self.bump
    }

    /// Bytes currently reserved from the allocator, exposed for the
    /// `heap_stats`-style diagnostics in spec §8.1.
    #[must_use]
    pub fn allocated_bytes(&self) -> usize {
        self.bump.allocated_bytes()
    }
}

impl Default for Scratch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty_and_grows_on_demand() {
        let scratch = Scratch::new();
        assert_eq!(scratch.allocated_bytes(), 0);
        let slice = scratch.bump().alloc_slice_fill_copy(64, 0u8);
        assert_eq!(slice.len(), 64);
        assert!(scratch.allocated_bytes() >= 64);
    }
}
