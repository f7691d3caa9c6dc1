//! A minimal insertion-ordered string-keyed map.
//!
//! The spec's §9 design note calls for "an ordered mapping keyed by unit
//! name (insertion order preserved for deterministic iteration)". The
//! retrieval pack doesn't carry the `indexmap` crate, so this is the
//! smallest thing that satisfies the requirement: a `Vec` for order plus a
//! `HashMap` index for O(1) lookup.

use std::collections::HashMap;

use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Default)]
pub struct OrderedMap<V> {
    order: Vec<String>,
    index: HashMap<String, usize>,
    values: Vec<V>,
}

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        Self { order: Vec::new(), index: HashMap::new(), values: Vec::new() }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        if let Some(&i) = self.index.get(&key) {
            self.values[i] = value;
        } else {
            self.index.insert(key.clone(), self.values.len());
            self.order.push(key);
            self.values.push(value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.index.get(key).map(|&i| &self.values[i])
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.index.get(key).copied().map(move |i| &mut self.values[i])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn entry_or_insert_with(&mut self, key: &str, default: impl FnOnce() -> V) -> &mut V {
        if !self.index.contains_key(key) {
            self.insert(key.to_string(), default());
        }
        self.get_mut(key).unwrap()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.order.iter().map(move |k| (k.as_str(), self.get(k).unwrap()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Serializes as a JSON object in insertion order, regardless of whether
/// the active `serde_json` build carries the `preserve_order` feature.
impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}
