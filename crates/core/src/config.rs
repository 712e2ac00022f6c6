//! Compiler configuration (spec §4.4.1, resolved as the program-level entry
//! point's companion type).
//!
//! Grounded on the builder-with-defaults shape used for external-builtin
//! registration in compiler front ends elsewhere in the pack: a small
//! `Config` struct with `with_*` setters consumed once by `compile`, rather
//! than a pile of positional arguments.

/// Tunables accepted by [`crate::compile`].
///
/// `CompilerConfig::default()` reproduces the C source's fixed constants
/// (spans retained, no scratch-capacity hint). There is deliberately no
/// knob here for anything `compile()` itself does not consume: `compile()`
/// performs no static scope resolution and constant-folds no map literals,
/// so a pre-sized initial map length or a set of pre-bound free-variable
/// names would have nothing to attach to in this crate — those are
/// interpreter/embedder concerns (seeding an outermost [`crate::types::Closure`]
/// at run time), not codegen concerns.
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    /// Whether to retain [`crate::ast::CodeRange`] spans in compiled
    /// diagnostics. Disabling this trades precise error locations for a
    /// smaller `Executable` in embeddings that re-derive spans elsewhere.
    pub retain_spans: bool,
    /// Suggested initial byte capacity for the scratch arena (see
    /// [`crate::arena::Scratch`]). `0` defers to `bumpalo`'s own default
    /// growth policy.
    pub scratch_capacity_hint: usize,
}

impl CompilerConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_retain_spans(mut self, retain: bool) -> Self {
        self.retain_spans = retain;
        self
    }

    #[must_use]
    pub fn with_scratch_capacity_hint(mut self, bytes: usize) -> Self {
        self.scratch_capacity_hint = bytes;
        self
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self { retain_spans: true, scratch_capacity_hint: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_retains_spans_with_no_scratch_hint() {
        let cfg = CompilerConfig::default();
        assert!(cfg.retain_spans);
        assert_eq!(cfg.scratch_capacity_hint, 0);
    }

    #[test]
    fn builder_setters_override_defaults() {
        let cfg = CompilerConfig::new().with_retain_spans(false).with_scratch_capacity_hint(4096);
        assert!(!cfg.retain_spans);
        assert_eq!(cfg.scratch_capacity_hint, 4096);
    }
}
