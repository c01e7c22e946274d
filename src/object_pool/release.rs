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

//! Release (eviction) selection policies.
//!
//! The pool computes the candidate set (unused, unlocked, not vetoed) and a
//! filter only decides which candidates go. Filters never see objects that
//! are in use or locked.

use super::object::{ObjectId, PooledObject};

/// Chooses which release candidates to evict
pub trait ReleaseFilter<T> {
    /// `candidates` are in registration order. `expire_cutoff` is the pool
    /// clock reading at or before which an object counts as expired, `None`
    /// when the pool never expires objects.
    fn select(
        &mut self,
        candidates: &[&PooledObject<T>],
        to_release_count: usize,
        expire_cutoff: Option<f64>,
    ) -> Vec<ObjectId>;
}

impl<T, F> ReleaseFilter<T> for F
where
    F: FnMut(&[&PooledObject<T>], usize, Option<f64>) -> Vec<ObjectId>,
{
    fn select(
        &mut self,
        candidates: &[&PooledObject<T>],
        to_release_count: usize,
        expire_cutoff: Option<f64>,
    ) -> Vec<ObjectId> {
        self(candidates, to_release_count, expire_cutoff)
    }
}

/// Expired objects first, then lowest priority, then least recently used.
///
/// Expired evictions count toward `to_release_count`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultReleaseFilter;

impl<T> ReleaseFilter<T> for DefaultReleaseFilter {
    fn select(
        &mut self,
        candidates: &[&PooledObject<T>],
        to_release_count: usize,
        expire_cutoff: Option<f64>,
    ) -> Vec<ObjectId> {
        let mut selected = Vec::new();
        let mut remaining: Vec<&PooledObject<T>> = Vec::with_capacity(candidates.len());

        match expire_cutoff {
            Some(cutoff) => {
                for &candidate in candidates {
                    if candidate.last_use_time() <= cutoff {
                        selected.push(candidate.id());
                    } else {
                        remaining.push(candidate);
                    }
                }
            }
            None => remaining.extend_from_slice(candidates),
        }

        let to_release_count = to_release_count.saturating_sub(selected.len());
        if to_release_count == 0 {
            return selected;
        }

        // Stable sort keeps registration order among exact ties
        remaining.sort_by(|a, b| {
            a.priority()
                .cmp(&b.priority())
                .then(a.last_use_time().total_cmp(&b.last_use_time()))
        });
        selected.extend(remaining.iter().take(to_release_count).map(|c| c.id()));
        selected
    }
}

/// Least recently used first, ignoring priority and expiry
#[derive(Debug, Clone, Copy, Default)]
pub struct OldestFirstFilter;

impl<T> ReleaseFilter<T> for OldestFirstFilter {
    fn select(
        &mut self,
        candidates: &[&PooledObject<T>],
        to_release_count: usize,
        _expire_cutoff: Option<f64>,
    ) -> Vec<ObjectId> {
        let mut sorted = candidates.to_vec();
        sorted.sort_by(|a, b| a.last_use_time().total_cmp(&b.last_use_time()));
        sorted
            .iter()
            .take(to_release_count)
            .map(|c| c.id())
            .collect()
    }
}
