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

//! Pooled object wrapper and identifiers.

use serde::Serialize;
use slotmap::new_key_type;

new_key_type! {
    /// Pooled object identity backed by slotmap's generational keys.
    ///
    /// A released object's id never matches whatever later reuses its slot.
    pub struct ObjectId;
}

/// Lifecycle hooks for resources held by an [`ObjectPool`](super::ObjectPool).
///
/// Every hook has a no-op default; implement only what the resource needs.
pub trait Poolable: 'static {
    /// Called each time the object is checked out
    fn on_spawn(&mut self) {}

    /// Called each time the object is checked back in
    fn on_unspawn(&mut self) {}

    /// Extra veto on eviction, checked alongside lock and spawn count
    fn custom_can_release(&self) -> bool {
        true
    }

    /// Called once when the pool drops the object
    fn release(&mut self, _is_shutdown: bool) {}
}

/// Pool-owned wrapper around a caller-supplied resource
#[derive(Debug)]
pub struct PooledObject<T> {
    id: ObjectId,
    name: String,
    target: T,
    locked: bool,
    priority: i32,
    last_use_time: f64,
    spawn_count: u32,
    /// Registration order, used as the last tie-break on release
    pub(crate) sequence: u64,
}

impl<T: Poolable> PooledObject<T> {
    pub(crate) fn new(
        id: ObjectId,
        name: String,
        target: T,
        spawned: bool,
        now: f64,
        sequence: u64,
    ) -> Self {
        let mut object = Self {
            id,
            name,
            target,
            locked: false,
            priority: 0,
            last_use_time: now,
            spawn_count: 0,
            sequence,
        };
        if spawned {
            object.spawn(now);
        }
        object
    }

    pub fn custom_can_release(&self) -> bool {
        self.target.custom_can_release()
    }

    /// Unused, unlocked and not vetoed by the resource
    pub fn is_release_candidate(&self) -> bool {
        !self.is_in_use() && !self.locked && self.custom_can_release()
    }

    pub(crate) fn spawn(&mut self, now: f64) {
        self.spawn_count += 1;
        self.last_use_time = now;
        self.target.on_spawn();
    }

    /// Caller checks `spawn_count > 0` first
    pub(crate) fn unspawn(&mut self, now: f64) {
        self.target.on_unspawn();
        self.last_use_time = now;
        self.spawn_count -= 1;
    }

    pub(crate) fn release(mut self, is_shutdown: bool) -> T {
        self.target.release(is_shutdown);
        self.target
    }

    pub fn info(&self) -> ObjectInfo {
        ObjectInfo {
            name: self.name.clone(),
            locked: self.locked,
            custom_can_release_flag: self.custom_can_release(),
            priority: self.priority,
            last_use_time: self.last_use_time,
            spawn_count: self.spawn_count,
        }
    }
}

impl<T> PooledObject<T> {
    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Pool clock reading of the last spawn or unspawn
    pub fn last_use_time(&self) -> f64 {
        self.last_use_time
    }

    pub fn spawn_count(&self) -> u32 {
        self.spawn_count
    }

    pub fn is_in_use(&self) -> bool {
        self.spawn_count > 0
    }

    pub(crate) fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    pub(crate) fn set_priority(&mut self, priority: i32) {
        self.priority = priority;
    }
}

/// Snapshot of a pooled object for diagnostics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectInfo {
    pub name: String,
    pub locked: bool,
    pub custom_can_release_flag: bool,
    pub priority: i32,
    pub last_use_time: f64,
    pub spawn_count: u32,
}

impl ObjectInfo {
    pub fn is_in_use(&self) -> bool {
        self.spawn_count > 0
    }
}
