// Copyright 2024 Saptak Santra
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Hash multimap with insertion-ordered values per key

use ahash::AHashMap;
use smallvec::SmallVec;
use std::borrow::Borrow;
use std::hash::Hash;

/// Most keys hold a handful of values; spill to the heap beyond that
const INLINE_VALUES: usize = 4;

/// Multimap keeping values for each key in insertion order
#[derive(Debug, Clone)]
pub struct MultiMap<K, V> {
    entries: AHashMap<K, SmallVec<[V; INLINE_VALUES]>>,
    len: usize,
}

impl<K: Eq + Hash, V: PartialEq> MultiMap<K, V> {
    pub fn new() -> Self {
        Self {
            entries: AHashMap::new(),
            len: 0,
        }
    }

    /// Append a value under `key`
    pub fn insert(&mut self, key: K, value: V) {
        self.entries.entry(key).or_default().push(value);
        self.len += 1;
    }

    /// Values under `key`, oldest first
    pub fn get<Q>(&self, key: &Q) -> &[V]
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    pub fn contains_value<Q>(&self, key: &Q, value: &V) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).contains(value)
    }

    /// Remove one value under `key`. Returns whether it was present.
    pub fn remove<Q>(&mut self, key: &Q, value: &V) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(values) = self.entries.get_mut(key) else {
            return false;
        };
        let Some(index) = values.iter().position(|v| v == value) else {
            return false;
        };

        values.remove(index);
        self.len -= 1;
        if values.is_empty() {
            self.entries.remove(key);
        }
        true
    }

    /// Remove every value under `key`
    pub fn remove_key<Q>(&mut self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let removed = self.entries.remove(key).map(|v| v.len()).unwrap_or(0);
        self.len -= removed;
        removed
    }

    /// Total number of values
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn key_count(&self) -> usize {
        self.entries.len()
    }

    /// Iterate every `(key, value)` pair; per-key order is insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries
            .iter()
            .flat_map(|(k, values)| values.iter().map(move |v| (k, v)))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.len = 0;
    }
}

impl<K: Eq + Hash, V: PartialEq> Default for MultiMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_keep_insertion_order() {
        let mut map = MultiMap::new();
        map.insert("enemy".to_string(), 3);
        map.insert("enemy".to_string(), 1);
        map.insert("enemy".to_string(), 2);
        assert_eq!(map.get("enemy"), &[3, 1, 2]);
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_remove_single_value() {
        let mut map = MultiMap::new();
        map.insert("a", 1);
        map.insert("a", 2);
        assert!(map.remove("a", &1));
        assert!(!map.remove("a", &1));
        assert_eq!(map.get("a"), &[2]);
        assert!(map.remove("a", &2));
        assert!(!map.contains("a"));
        assert!(map.is_empty());
    }

    #[test]
    fn test_remove_key() {
        let mut map = MultiMap::new();
        map.insert("a", 1);
        map.insert("a", 2);
        map.insert("b", 3);
        assert_eq!(map.remove_key("a"), 2);
        assert_eq!(map.len(), 1);
        assert_eq!(map.key_count(), 1);
        assert!(map.contains_value("b", &3));
    }

    #[test]
    fn test_missing_key_is_empty_slice() {
        let map: MultiMap<&str, u32> = MultiMap::new();
        assert!(map.get("nothing").is_empty());
    }
}
