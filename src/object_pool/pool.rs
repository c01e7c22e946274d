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

//! Named, typed object pool with spawn/unspawn and eviction policy.

use ahash::AHashSet;
use serde::Serialize;
use slotmap::SlotMap;
use std::any::{Any, TypeId};

#[cfg(feature = "profiling")]
use tracing::info_span;

use super::config::{validate_seconds, PoolConfig};
use super::object::{ObjectId, ObjectInfo, PooledObject, Poolable};
use super::release::{DefaultReleaseFilter, ReleaseFilter};
use crate::error::{CoreError, Result};
use crate::multi_map::MultiMap;

/// Object pool for one resource type.
///
/// Time inside the pool is its own clock, advanced by the real elapsed
/// seconds passed to [`update`](Self::update). `last_use_time` and expiry are
/// measured against that clock.
pub struct ObjectPool<T: Poolable> {
    name: String,
    allow_multi_spawn: bool,
    auto_release_interval: f32,
    capacity: usize,
    expire_time: f32,
    priority: i32,

    objects: SlotMap<ObjectId, PooledObject<T>>,
    /// Name index; per-name order is registration order
    names: MultiMap<String, ObjectId>,

    now: f64,
    auto_release_time: f32,
    next_sequence: u64,
}

impl<T: Poolable> ObjectPool<T> {
    /// Create a pool from validated parameters
    pub fn new(config: PoolConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            name: config.name,
            allow_multi_spawn: config.allow_multi_spawn,
            auto_release_interval: config.auto_release_interval,
            capacity: config.capacity,
            expire_time: config.expire_time,
            priority: config.priority,
            objects: SlotMap::with_key(),
            names: MultiMap::new(),
            now: 0.0,
            auto_release_time: 0.0,
            next_sequence: 0,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn object_type(&self) -> TypeId {
        TypeId::of::<T>()
    }

    pub fn object_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    pub fn allow_multi_spawn(&self) -> bool {
        self.allow_multi_spawn
    }

    pub fn count(&self) -> usize {
        self.objects.len()
    }

    /// Number of objects currently eligible for eviction
    pub fn can_release_count(&self) -> usize {
        self.objects
            .values()
            .filter(|o| o.is_release_candidate())
            .count()
    }

    pub fn auto_release_interval(&self) -> f32 {
        self.auto_release_interval
    }

    pub fn set_auto_release_interval(&mut self, seconds: f32) -> Result<()> {
        validate_seconds("auto release interval", seconds)?;
        self.auto_release_interval = seconds;
        Ok(())
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Changing capacity runs a release pass immediately
    pub fn set_capacity(&mut self, capacity: usize) -> Result<()> {
        if self.capacity == capacity {
            return Ok(());
        }
        self.capacity = capacity;
        self.release().map(|_| ())
    }

    pub fn expire_time(&self) -> f32 {
        self.expire_time
    }

    /// Changing expire time runs a release pass immediately
    pub fn set_expire_time(&mut self, seconds: f32) -> Result<()> {
        validate_seconds("expire time", seconds)?;
        if self.expire_time == seconds {
            return Ok(());
        }
        self.expire_time = seconds;
        self.release().map(|_| ())
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn set_pool_priority(&mut self, priority: i32) {
        self.priority = priority;
    }

    /// Current reading of the pool clock, in seconds
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Add a resource. With `spawned`, it starts checked out.
    ///
    /// Runs a release pass afterwards, which may evict the new object itself
    /// when the pool is over capacity.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        target: T,
        spawned: bool,
    ) -> Result<ObjectId> {
        let name = name.into();
        let now = self.now;
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        let id = self.objects.insert_with_key(|id| {
            PooledObject::new(id, name.clone(), target, spawned, now, sequence)
        });
        self.names.insert(name, id);

        self.release()?;
        Ok(id)
    }

    /// Whether any object named `name` can be spawned
    pub fn can_spawn(&self, name: &str) -> bool {
        self.find_spawnable(name).is_some()
    }

    /// Check out the first spawnable object named `name`
    pub fn spawn(&mut self, name: &str) -> Option<ObjectId> {
        let id = self.find_spawnable(name)?;
        let now = self.now;
        self.objects.get_mut(id)?.spawn(now);
        Some(id)
    }

    fn find_spawnable(&self, name: &str) -> Option<ObjectId> {
        self.names.get(name).iter().copied().find(|&id| {
            self.objects
                .get(id)
                .is_some_and(|o| self.allow_multi_spawn || !o.is_in_use())
        })
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&PooledObject<T>> {
        self.objects.get(id)
    }

    /// The resource behind `id`
    pub fn target(&self, id: ObjectId) -> Option<&T> {
        self.objects.get(id).map(|o| o.target())
    }

    pub fn target_mut(&mut self, id: ObjectId) -> Option<&mut T> {
        self.objects.get_mut(id).map(|o| o.target_mut())
    }

    /// Check an object back in
    pub fn unspawn(&mut self, id: ObjectId) -> Result<()> {
        let now = self.now;
        let object = self.object_mut(id)?;
        if !object.is_in_use() {
            return Err(CoreError::InvalidState(format!(
                "Object '{}' spawn count is less than 0",
                object.name()
            )));
        }
        object.unspawn(now);
        let idle = !object.is_in_use();

        if idle && self.count() > self.capacity {
            self.release()?;
        }
        Ok(())
    }

    pub fn set_locked(&mut self, id: ObjectId, locked: bool) -> Result<()> {
        self.object_mut(id)?.set_locked(locked);
        Ok(())
    }

    pub fn set_priority(&mut self, id: ObjectId, priority: i32) -> Result<()> {
        self.object_mut(id)?.set_priority(priority);
        Ok(())
    }

    fn object_mut(&mut self, id: ObjectId) -> Result<&mut PooledObject<T>> {
        let pool = &self.name;
        self.objects
            .get_mut(id)
            .ok_or_else(|| CoreError::NotFound(format!("object {id:?} in pool '{pool}'")))
    }

    /// Evict down to capacity with the default policy
    pub fn release(&mut self) -> Result<usize> {
        let count = self.count().saturating_sub(self.capacity);
        self.release_count_with_filter(count, &mut DefaultReleaseFilter)
    }

    /// Evict `to_release_count` objects (plus every expired one)
    pub fn release_count(&mut self, to_release_count: usize) -> Result<usize> {
        self.release_count_with_filter(to_release_count, &mut DefaultReleaseFilter)
    }

    /// Evict down to capacity with a custom policy
    pub fn release_with_filter<F: ReleaseFilter<T>>(&mut self, filter: &mut F) -> Result<usize> {
        let count = self.count().saturating_sub(self.capacity);
        self.release_count_with_filter(count, filter)
    }

    /// Let `filter` pick among release candidates and evict its choices.
    ///
    /// A filter choosing anything outside the candidate set, or the same
    /// object twice, is an `InvalidState` error and nothing is evicted.
    pub fn release_count_with_filter<F: ReleaseFilter<T>>(
        &mut self,
        to_release_count: usize,
        filter: &mut F,
    ) -> Result<usize> {
        #[cfg(feature = "profiling")]
        let _span =
            info_span!("object_pool.release", pool = %self.name, to_release_count).entered();

        self.auto_release_time = 0.0;

        let expire_cutoff =
            (self.expire_time < f32::MAX).then(|| self.now - self.expire_time as f64);
        let candidates = self.candidates();
        if candidates.is_empty() {
            return Ok(0);
        }

        let selected = filter.select(&candidates, to_release_count, expire_cutoff);
        let candidate_ids: AHashSet<ObjectId> = candidates.iter().map(|c| c.id()).collect();
        drop(candidates);

        let mut seen = AHashSet::with_capacity(selected.len());
        for id in &selected {
            if !candidate_ids.contains(id) || !seen.insert(*id) {
                return Err(CoreError::InvalidState(format!(
                    "Release filter of pool '{}' selected {id:?}, which is not a release candidate",
                    self.name
                )));
            }
        }

        for &id in &selected {
            self.release_object(id, false)?;
        }
        if !selected.is_empty() {
            tracing::debug!(
                pool = %self.name,
                released = selected.len(),
                remaining = self.count(),
                "released objects"
            );
        }
        Ok(selected.len())
    }

    /// Evict every release candidate regardless of capacity and expiry
    pub fn release_all_unused(&mut self) -> Result<usize> {
        self.auto_release_time = 0.0;
        let ids: Vec<ObjectId> = self.candidates().iter().map(|c| c.id()).collect();
        for &id in &ids {
            self.release_object(id, false)?;
        }
        Ok(ids.len())
    }

    /// Release candidates in registration order
    fn candidates(&self) -> Vec<&PooledObject<T>> {
        let mut candidates: Vec<&PooledObject<T>> = self
            .objects
            .values()
            .filter(|o| o.is_release_candidate())
            .collect();
        candidates.sort_by_key(|o| o.sequence);
        candidates
    }

    fn release_object(&mut self, id: ObjectId, is_shutdown: bool) -> Result<T> {
        let object = self.objects.remove(id).ok_or_else(|| {
            CoreError::InvalidState(format!(
                "Object {id:?} selected for release is missing from pool '{}'",
                self.name
            ))
        })?;
        self.names.remove(object.name(), &id);
        Ok(object.release(is_shutdown))
    }

    /// Advance the pool clock and run the periodic release pass
    pub fn update(&mut self, _elapse_seconds: f32, real_elapse_seconds: f32) -> Result<()> {
        self.now += real_elapse_seconds as f64;
        self.auto_release_time += real_elapse_seconds;
        if self.auto_release_time < self.auto_release_interval {
            return Ok(());
        }
        self.release().map(|_| ())
    }

    /// Release every object, in use or locked or not
    pub fn shutdown(&mut self) {
        let count = self.objects.len();
        for (_, object) in self.objects.drain() {
            object.release(true);
        }
        self.names.clear();
        if count > 0 {
            tracing::debug!(pool = %self.name, released = count, "pool shut down");
        }
    }

    pub fn object_infos(&self) -> Vec<ObjectInfo> {
        let mut objects: Vec<&PooledObject<T>> = self.objects.values().collect();
        objects.sort_by_key(|o| o.sequence);
        objects.iter().map(|o| o.info()).collect()
    }

    pub fn info(&self) -> PoolInfo {
        PoolInfo {
            name: self.name.clone(),
            object_type: self.object_type_name(),
            allow_multi_spawn: self.allow_multi_spawn,
            auto_release_interval: self.auto_release_interval,
            capacity: self.capacity,
            expire_time: self.expire_time,
            priority: self.priority,
            count: self.count(),
            can_release_count: self.can_release_count(),
        }
    }
}

/// Statistics snapshot of a pool
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolInfo {
    pub name: String,
    pub object_type: &'static str,
    pub allow_multi_spawn: bool,
    pub auto_release_interval: f32,
    pub capacity: usize,
    pub expire_time: f32,
    pub priority: i32,
    pub count: usize,
    pub can_release_count: usize,
}

/// Type-erased view of a pool, for the pool manager
pub trait ObjectPoolBase: Any {
    fn pool_name(&self) -> &str;
    fn pool_priority(&self) -> i32;
    fn pool_info(&self) -> PoolInfo;
    fn release_pass(&mut self) -> Result<usize>;
    fn release_unused(&mut self) -> Result<usize>;
    fn tick(&mut self, elapse_seconds: f32, real_elapse_seconds: f32) -> Result<()>;
    fn shutdown_pool(&mut self);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Poolable> ObjectPoolBase for ObjectPool<T> {
    fn pool_name(&self) -> &str {
        &self.name
    }

    fn pool_priority(&self) -> i32 {
        self.priority
    }

    fn pool_info(&self) -> PoolInfo {
        self.info()
    }

    fn release_pass(&mut self) -> Result<usize> {
        self.release()
    }

    fn release_unused(&mut self) -> Result<usize> {
        self.release_all_unused()
    }

    fn tick(&mut self, elapse_seconds: f32, real_elapse_seconds: f32) -> Result<()> {
        #[cfg(feature = "profiling")]
        let _span = info_span!("object_pool.update", pool = %self.name).entered();
        self.update(elapse_seconds, real_elapse_seconds)
    }

    fn shutdown_pool(&mut self) {
        self.shutdown();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Sprite {
        released: Rc<RefCell<Vec<String>>>,
        label: &'static str,
        veto: bool,
    }

    impl Poolable for Sprite {
        fn custom_can_release(&self) -> bool {
            !self.veto
        }
        fn release(&mut self, is_shutdown: bool) {
            let tag = if is_shutdown { "shutdown" } else { "evict" };
            self.released.borrow_mut().push(format!("{tag} {}", self.label));
        }
    }

    fn sprite(log: &Rc<RefCell<Vec<String>>>, label: &'static str) -> Sprite {
        Sprite {
            released: log.clone(),
            label,
            veto: false,
        }
    }

    fn pool(config: PoolConfig) -> ObjectPool<Sprite> {
        ObjectPool::new(config).unwrap()
    }

    #[test]
    fn test_single_spawn_symmetry() {
        let log = Rc::default();
        let mut pool = pool(PoolConfig::new("sprites"));
        pool.register("tree", sprite(&log, "t"), false).unwrap();

        assert!(pool.can_spawn("tree"));
        let id = pool.spawn("tree").unwrap();
        assert_eq!(pool.get(id).unwrap().spawn_count(), 1);
        assert!(!pool.can_spawn("tree"));
        assert!(pool.spawn("tree").is_none());

        pool.unspawn(id).unwrap();
        assert_eq!(pool.get(id).unwrap().spawn_count(), 0);
        assert!(pool.can_spawn("tree"));
    }

    #[test]
    fn test_multi_spawn_allows_overlapping_spawns() {
        let log = Rc::default();
        let mut pool = pool(PoolConfig::new("sprites").with_multi_spawn(true));
        pool.register("tree", sprite(&log, "t"), false).unwrap();
        let a = pool.spawn("tree").unwrap();
        let b = pool.spawn("tree").unwrap();
        assert_eq!(a, b);
        assert_eq!(pool.get(a).unwrap().spawn_count(), 2);
    }

    #[test]
    fn test_spawn_matches_name_exactly() {
        let log = Rc::default();
        let mut pool = pool(PoolConfig::new("sprites"));
        pool.register("", sprite(&log, "anon"), false).unwrap();
        assert!(!pool.can_spawn("tree"));
        assert!(pool.can_spawn(""));
    }

    #[test]
    fn test_unspawn_unknown_and_idle() {
        let log = Rc::default();
        let mut pool = pool(PoolConfig::new("sprites"));
        let id = pool.register("tree", sprite(&log, "t"), false).unwrap();
        assert!(matches!(pool.unspawn(id), Err(CoreError::InvalidState(_))));

        pool.shutdown();
        assert!(matches!(pool.unspawn(id), Err(CoreError::NotFound(_))));
        assert!(matches!(pool.set_locked(id, true), Err(CoreError::NotFound(_))));
        assert!(matches!(pool.set_priority(id, 3), Err(CoreError::NotFound(_))));
    }

    #[test]
    fn test_release_evicts_lowest_priority_over_capacity() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut pool = pool(PoolConfig::new("sprites"));
        let a = pool.register("a", sprite(&log, "a"), false).unwrap();
        let b = pool.register("b", sprite(&log, "b"), false).unwrap();
        let c = pool.register("c", sprite(&log, "c"), false).unwrap();
        pool.set_priority(a, 10).unwrap();
        pool.set_priority(b, 1).unwrap();
        pool.set_priority(c, 5).unwrap();

        pool.set_capacity(2).unwrap();
        assert_eq!(pool.count(), 2);
        assert!(!pool.contains(b));
        assert_eq!(*log.borrow(), vec!["evict b"]);
    }

    #[test]
    fn test_release_never_touches_locked_or_in_use() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut pool = pool(PoolConfig::new("sprites"));
        let locked = pool.register("a", sprite(&log, "a"), false).unwrap();
        let spawned = pool.register("b", sprite(&log, "b"), true).unwrap();
        let mut vetoed = sprite(&log, "c");
        vetoed.veto = true;
        let vetoed = pool.register("c", vetoed, false).unwrap();
        pool.set_locked(locked, true).unwrap();

        pool.set_capacity(0).unwrap();
        assert_eq!(pool.release_all_unused().unwrap(), 0);
        assert!(pool.contains(locked));
        assert!(pool.contains(spawned));
        assert!(pool.contains(vetoed));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_expired_evicted_before_lower_priority() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut pool = pool(PoolConfig::new("sprites"));
        let old = pool.register("old", sprite(&log, "old"), false).unwrap();
        pool.set_priority(old, 5).unwrap();

        pool.update(10.0, 10.0).unwrap();
        let fresh = pool.register("fresh", sprite(&log, "fresh"), false).unwrap();
        pool.set_priority(fresh, -5).unwrap();

        pool.expire_time = 5.0;
        assert_eq!(pool.release_count(1).unwrap(), 1);
        assert!(!pool.contains(old));
        assert!(pool.contains(fresh));
    }

    #[test]
    fn test_expired_evicted_regardless_of_count() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut pool = pool(PoolConfig::new("sprites"));
        pool.register("a", sprite(&log, "a"), false).unwrap();
        pool.register("b", sprite(&log, "b"), false).unwrap();
        pool.update(3.0, 3.0).unwrap();

        pool.set_expire_time(1.0).unwrap();
        assert_eq!(pool.count(), 0);
    }

    #[test]
    fn test_equal_priority_prefers_least_recently_used() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut pool = pool(PoolConfig::new("sprites"));
        let first = pool.register("a", sprite(&log, "a"), false).unwrap();
        pool.update(1.0, 1.0).unwrap();
        let second = pool.register("b", sprite(&log, "b"), false).unwrap();

        pool.release_count(1).unwrap();
        assert!(!pool.contains(first));
        assert!(pool.contains(second));
    }

    #[test]
    fn test_auto_release_on_interval() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut pool = pool(PoolConfig::new("sprites").with_auto_release_interval(1.0));
        pool.register("a", sprite(&log, "a"), false).unwrap();
        pool.register("b", sprite(&log, "b"), false).unwrap();
        pool.capacity = 1;

        pool.update(0.5, 0.5).unwrap();
        assert_eq!(pool.count(), 2);
        pool.update(0.5, 0.5).unwrap();
        assert_eq!(pool.count(), 1);
    }

    #[test]
    fn test_auto_release_uses_real_time() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut pool = pool(PoolConfig::new("sprites").with_auto_release_interval(1.0));
        pool.register("a", sprite(&log, "a"), false).unwrap();
        pool.register("b", sprite(&log, "b"), false).unwrap();
        pool.capacity = 1;

        // Logical time paused, real time keeps going
        pool.update(0.0, 1.0).unwrap();
        assert_eq!(pool.count(), 1);
    }

    #[test]
    fn test_custom_filter_cannot_pick_in_use_object() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut pool = pool(PoolConfig::new("sprites"));
        let busy = pool.register("a", sprite(&log, "a"), true).unwrap();
        pool.register("b", sprite(&log, "b"), false).unwrap();

        let mut rogue = |_: &[&PooledObject<Sprite>], _: usize, _: Option<f64>| -> Vec<ObjectId> {
            vec![busy]
        };
        let err = pool.release_count_with_filter(1, &mut rogue).unwrap_err();
        assert!(matches!(err, CoreError::InvalidState(_)));
        assert_eq!(pool.count(), 2);
    }

    #[test]
    fn test_custom_filter_replaces_policy() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut pool = pool(PoolConfig::new("sprites"));
        let a = pool.register("a", sprite(&log, "a"), false).unwrap();
        let b = pool.register("b", sprite(&log, "b"), false).unwrap();
        pool.set_priority(a, -100).unwrap();

        // Highest priority first, the opposite of the default
        let mut filter = |c: &[&PooledObject<Sprite>], n: usize, _: Option<f64>| -> Vec<ObjectId> {
            let mut sorted = c.to_vec();
            sorted.sort_by_key(|o| std::cmp::Reverse(o.priority()));
            sorted.iter().take(n).map(|o| o.id()).collect()
        };
        pool.release_count_with_filter(1, &mut filter).unwrap();
        assert!(pool.contains(a));
        assert!(!pool.contains(b));
    }

    #[test]
    fn test_shutdown_releases_everything() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut pool = pool(PoolConfig::new("sprites"));
        let a = pool.register("a", sprite(&log, "a"), true).unwrap();
        pool.set_locked(a, true).unwrap();
        pool.register("b", sprite(&log, "b"), false).unwrap();

        pool.shutdown();
        assert_eq!(pool.count(), 0);
        let mut released = log.borrow().clone();
        released.sort();
        assert_eq!(released, vec!["shutdown a", "shutdown b"]);
    }

    #[test]
    fn test_unspawn_over_capacity_triggers_release() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut pool = pool(PoolConfig::new("sprites").with_capacity(1));
        let a = pool.register("a", sprite(&log, "a"), true).unwrap();
        let b = pool.register("b", sprite(&log, "b"), true).unwrap();
        assert_eq!(pool.count(), 2);

        pool.unspawn(a).unwrap();
        assert_eq!(pool.count(), 1);
        assert!(pool.contains(b));
    }

    #[test]
    fn test_negative_expire_time_rejected() {
        let mut pool = pool(PoolConfig::new("sprites"));
        assert!(matches!(
            pool.set_expire_time(-1.0),
            Err(CoreError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_info_reports_counts() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut pool = pool(PoolConfig::new("sprites").with_priority(7));
        pool.register("a", sprite(&log, "a"), true).unwrap();
        pool.register("b", sprite(&log, "b"), false).unwrap();
        let info = pool.info();
        assert_eq!(info.count, 2);
        assert_eq!(info.can_release_count, 1);
        assert_eq!(info.priority, 7);
        assert_eq!(pool.object_infos()[0].name, "a");
        assert!(pool.object_infos()[0].is_in_use());
    }

    #[test]
    fn test_oldest_first_filter_ignores_priority() {
        use crate::object_pool::release::OldestFirstFilter;

        let log = Rc::new(RefCell::new(Vec::new()));
        let mut pool = pool(PoolConfig::new("sprites"));
        let a = pool.register("a", sprite(&log, "a"), false).unwrap();
        pool.set_priority(a, 10).unwrap();
        pool.update(0.0, 1.0).unwrap();
        let b = pool.register("b", sprite(&log, "b"), false).unwrap();
        pool.update(0.0, 1.0).unwrap();
        let c = pool.register("c", sprite(&log, "c"), false).unwrap();

        // Shrink without the default pass so the filter sees the overflow
        pool.capacity = 2;
        let released = pool.release_with_filter(&mut OldestFirstFilter).unwrap();

        assert_eq!(released, 1);
        assert_eq!(pool.count(), 2);
        assert!(!pool.contains(a));
        assert!(pool.contains(b) && pool.contains(c));
        assert_eq!(*log.borrow(), vec!["evict a".to_string()]);
    }
}
