//! `Closure` (spec §4.3): a singly-linked chain of scope [`Map`]s
//! implementing lexical variable lookup, first-mapping-wins from innermost
//! outward. Grounded on the teacher's own `ChainMap` (first-mapping-wins
//! lookup over a stack of maps), adapted from a flat `Vec<Value>` of maps
//! to the spec's explicit `{ vars, prev }` linked-cell shape.

use crate::error::MapError;
use crate::heap::{Heap, HeapId, HeapObject};
use crate::types::Map;
use crate::value::Value;

#[derive(Debug, Clone)]
pub struct Closure {
    vars: HeapId,
    prev: Option<HeapId>,
}

impl Closure {
    #[must_use]
    pub fn new(vars: HeapId, prev: Option<HeapId>) -> Self {
        Self { vars, prev }
    }

    #[must_use]
    pub fn vars_id(&self) -> HeapId {
        self.vars
    }

    #[must_use]
    pub fn prev(&self) -> Option<HeapId> {
        self.prev
    }

    /// Walks from this closure outward through `prev`, returning the first
    /// non-`None` result from `vars.select`. Any hashing/comparison error
    /// aborts the walk immediately (spec §4.3).
    pub fn select(&self, key: &Value, heap: &Heap) -> Result<Option<Value>, MapError> {
        let mut frame = Some(self.clone());
        loop {
            let Some(current) = frame else { return Ok(None) };
            let Some(HeapObject::Map(vars)) = heap.get(current.vars) else {
                return Ok(None);
            };
            if let Some(value) = vars.select(key)? {
                return Ok(Some(value));
            }
            frame = match current.prev {
                Some(id) => match heap.get(id) {
                    Some(HeapObject::Closure(c)) => Some(c.clone()),
                    _ => None,
                },
                Option::None => None,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_scope_shadows_outer_scope() {
        let mut heap = Heap::new();
        let mut outer_vars = Map::new(8);
        outer_vars.insert(Value::Str("x".into()), Value::Int(1)).unwrap();
        outer_vars.insert(Value::Str("y".into()), Value::Int(2)).unwrap();
        let outer_vars_id = heap.alloc(HeapObject::Map(outer_vars)).unwrap();
        let outer_closure = Closure::new(outer_vars_id, None);
        let outer_id = heap.alloc(HeapObject::Closure(outer_closure)).unwrap();

        let mut inner_vars = Map::new(8);
        inner_vars.insert(Value::Str("x".into()), Value::Int(99)).unwrap();
        let inner_vars_id = heap.alloc(HeapObject::Map(inner_vars)).unwrap();
        let inner = Closure::new(inner_vars_id, Some(outer_id));

        assert!(matches!(inner.select(&Value::Str("x".into()), &heap).unwrap(), Some(Value::Int(99))));
        assert!(matches!(inner.select(&Value::Str("y".into()), &heap).unwrap(), Some(Value::Int(2))));
        assert!(inner.select(&Value::Str("z".into()), &heap).unwrap().is_none());
    }
}
