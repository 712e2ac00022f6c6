//! The Error channel (spec §7): every fallible operation in this crate
//! ultimately produces a [`CompileError`], with an `internal`/`user` split
//! standing in for the C source's `Error.internal` flag.

use crate::ast::CodeRange;

/// Errors raised while probing or inserting into a [`crate::types::Map`].
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone, Copy)]
pub enum MapError {
    /// The key type supplies no `hash` capability.
    #[error("key is unhashable")]
    UnhashableKey,
    /// The key type supplies no `compare` capability.
    #[error("key is incomparable")]
    IncomparableKey,
    /// Growth could not allocate the new `mapper`/`keys`/`vals` arrays.
    #[error("out of memory growing map")]
    Oom,
}

/// Errors raised by the heap allocator.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone, Copy)]
pub enum HeapError {
    /// The heap's capacity ceiling (see [`crate::config::CompilerConfig`]) was exhausted.
    #[error("out of memory")]
    Oom,
}

impl From<HeapError> for MapError {
    fn from(_: HeapError) -> Self {
        Self::Oom
    }
}

/// Top-level error returned by [`crate::compile`].
///
/// Variants marked `(internal)` in spec §7 indicate a compiler bug or
/// resource exhaustion, never a malformed program; [`CompileError::is_internal`]
/// exposes that split for callers that want to route the two cases
/// differently (e.g. reporting a bug vs. a diagnostic).
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum CompileError {
    /// Any allocation failure, heap or scratch-arena.
    #[error("out of memory")]
    Oom,

    /// Finalization found a [`crate::bytecode::Promise`] that was never resolved.
    ///
    /// This is always a bug in the code generator, never a user error.
    #[error("unresolved jump target at instruction {instruction}")]
    UnresolvedJumpTarget {
        /// Index of the instruction carrying the unresolved operand.
        instruction: usize,
    },

    /// `break` used outside any enclosing loop.
    #[error("break used outside of a loop")]
    BreakOutsideLoop {
        /// Source span of the offending `break` statement.
        at: CodeRange,
    },

    /// Assignment LHS flattens to `m != 1` targets but the RHS is not a call.
    #[error("cannot destructure {lhs_count} targets from a non-call expression")]
    TupleArityMismatch {
        /// Number of targets on the left-hand side.
        lhs_count: usize,
        /// Source span of the assignment.
        at: CodeRange,
    },

    /// An assignment target is neither an identifier nor an index expression.
    #[error("invalid assignment target")]
    InvalidAssignmentTarget {
        /// Source span of the offending target.
        at: CodeRange,
    },

    /// A flattened tuple LHS or RHS exceeded the static arity bound.
    #[error("tuple arity {found} exceeds the maximum of {max}")]
    TuplePairTooLarge {
        /// Arity actually encountered.
        found: usize,
        /// The implementation's static bound (spec requires `max >= 32`).
        max: usize,
        /// Source span of the assignment.
        at: CodeRange,
    },

    /// A map-literal key evaluated at compile time had no `hash` capability.
    #[error("unhashable key in map literal")]
    UnhashableKey {
        /// Source span of the offending key expression.
        at: CodeRange,
    },

    /// A map-literal key evaluated at compile time had no `compare` capability.
    #[error("incomparable key in map literal")]
    IncomparableKey {
        /// Source span of the offending key expression.
        at: CodeRange,
    },
}

impl CompileError {
    /// Distinguishes implementation bugs / resource exhaustion from user errors.
    ///
    /// Mirrors the C source's `Error.internal` flag (spec §6, §7): `true` here
    /// means "this is not a reportable mistake in the compiled program", `false`
    /// means the message is meant for the end user.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Oom | Self::UnresolvedJumpTarget { .. })
    }
}

impl From<HeapError> for CompileError {
    fn from(_: HeapError) -> Self {
        Self::Oom
    }
}

impl From<MapError> for CompileError {
    fn from(err: MapError) -> Self {
        match err {
            MapError::Oom => Self::Oom,
            // Compile-time map-literal keys only ever come from constant folding of
            // hashable atomic literals in this implementation, so these arms are not
            // reachable from `compile()` today; kept so `MapError` can still convert
            // cleanly if that changes.
            MapError::UnhashableKey => Self::UnhashableKey { at: CodeRange::ZERO },
            MapError::IncomparableKey => Self::IncomparableKey { at: CodeRange::ZERO },
        }
    }
}

pub type CompileResult<T> = Result<T, CompileError>;
