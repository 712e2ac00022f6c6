//! The managed heap (spec §4.1): typed allocation backing composite objects
//! (`List`, `Map`, `Closure`, `Function`). Atomic values (`None`, `Bool`,
//! `Int`, `Float`, `Str`) never touch the heap — they live inline in
//! [`crate::value::Value`], which is what spec §9 ("Global statics") calls
//! out as the idiomatic substitute for the C source's `STATIC`-flag
//! singletons.
//!
//! Grounded on the slot-indexed arena in the teacher's own heap module
//! (`HeapId(usize)`, a dense `Vec` of slots, a free list of reclaimed
//! indices) rather than a raw-pointer design: Rust's ownership model makes
//! raw object pointers an anti-pattern here, so the heap hands out opaque
//! `Copy` indices instead.

use crate::error::HeapError;
use crate::types::{Closure, FunctionObject, List, Map};

/// An opaque handle to a composite object living on the [`Heap`].
///
/// Never dereferenced directly — every access goes through `Heap::get`/`get_mut`,
/// mirroring the C source's rule that an object pointer is only ever valid
/// while its owning heap is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeapId(usize);

/// The concrete payload stored behind a [`HeapId`].
#[derive(Debug, Clone)]
pub enum HeapObject {
    List(List),
    Map(Map),
    Closure(Closure),
    Function(FunctionObject),
}

impl HeapObject {
    /// Enumerates every outgoing [`HeapId`] this object directly holds
    /// (spec §3 "walk" capability). Does not recurse into those children —
    /// callers that want a transitive closure use [`Heap::reachable_from`].
    pub fn walk(&self, visit: &mut dyn FnMut(HeapId)) {
        match self {
            HeapObject::List(list) => {
                for value in list.items() {
                    if let Some(id) = value.heap_id() {
                        visit(id);
                    }
                }
            }
            HeapObject::Map(map) => {
                for (key, val) in map.entries() {
                    if let Some(id) = key.heap_id() {
                        visit(id);
                    }
                    if let Some(id) = val.heap_id() {
                        visit(id);
                    }
                }
            }
            HeapObject::Closure(closure) => {
                visit(closure.vars_id());
                if let Some(prev) = closure.prev() {
                    visit(prev);
                }
            }
            HeapObject::Function(func) => {
                visit(func.captured);
            }
        }
    }
}

/// A bounded, slot-based arena for composite heap objects.
///
/// `capacity` exists so `OOM` is a real, testable condition (spec's
/// `Heap_Malloc` failing when capacity is exhausted) rather than an
/// unreachable arm; a bare `compile()` call never approaches it in
/// practice, but an embedder squeezing a sandboxed heap can set it low.
#[derive(Debug)]
pub struct Heap {
    slots: Vec<Option<HeapObject>>,
    free: Vec<usize>,
    capacity: usize,
}

impl Heap {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(usize::MAX)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self { slots: Vec::new(), free: Vec::new(), capacity }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Allocates `object`, returning the handle that addresses it.
    pub fn alloc(&mut self, object: HeapObject) -> Result<HeapId, HeapError> {
        if let Some(slot) = self.free.pop() {
            self.slots[slot] = Some(object);
            return Ok(HeapId(slot));
        }
        if self.len() >= self.capacity {
            tracing::debug!(capacity = self.capacity, "heap allocation failed: out of memory");
            return Err(HeapError::Oom);
        }
        let slot = self.slots.len();
        self.slots.push(Some(object));
        Ok(HeapId(slot))
    }

    #[must_use]
    pub fn get(&self, id: HeapId) -> Option<&HeapObject> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    #[must_use]
    pub fn get_mut(&mut self, id: HeapId) -> Option<&mut HeapObject> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Reclaims a slot. The caller is responsible for ensuring nothing else
    /// still reaches `id` — this heap does not collect automatically.
    pub fn free(&mut self, id: HeapId) {
        if let Some(slot) = self.slots.get_mut(id.0) {
            if slot.take().is_some() {
                self.free.push(id.0);
            }
        }
    }

    /// Computes the transitive closure of every `HeapId` reachable from
    /// `roots` via repeated `walk`, for a leak audit (spec §4.1 "Tracing").
    /// This heap never moves or collects objects; `walk` here is read-only.
    #[must_use]
    pub fn reachable_from(&self, roots: &[HeapId]) -> std::collections::HashSet<HeapId> {
        let mut seen: std::collections::HashSet<HeapId> = roots.iter().copied().collect();
        let mut worklist: Vec<HeapId> = roots.to_vec();
        while let Some(id) = worklist.pop() {
            let Some(object) = self.get(id) else { continue };
            let mut children = Vec::new();
            object.walk(&mut |child| children.push(child));
            for child in children {
                if seen.insert(child) {
                    worklist.push(child);
                }
            }
        }
        seen
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::List;
    use crate::value::Value;

    #[test]
    fn alloc_reuses_freed_slots() {
        let mut heap = Heap::new();
        let a = heap.alloc(HeapObject::List(List::new())).unwrap();
        heap.free(a);
        let b = heap.alloc(HeapObject::List(List::new())).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn oom_when_capacity_exhausted() {
        let mut heap = Heap::with_capacity(1);
        heap.alloc(HeapObject::List(List::new())).unwrap();
        let err = heap.alloc(HeapObject::List(List::new())).unwrap_err();
        assert_eq!(err, HeapError::Oom);
    }

    #[test]
    fn reachable_from_follows_list_elements() {
        let mut heap = Heap::new();
        let inner = heap.alloc(HeapObject::List(List::new())).unwrap();
        let mut outer = List::new();
        outer.push(Value::List(inner));
        let outer_id = heap.alloc(HeapObject::List(outer)).unwrap();
        let reachable = heap.reachable_from(&[outer_id]);
        assert!(reachable.contains(&outer_id));
        assert!(reachable.contains(&inner));
        assert_eq!(reachable.len(), 2);
    }
}
