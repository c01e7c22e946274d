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

//! Pool registry owning every object pool

use ahash::AHashMap;
use std::any::{Any, TypeId};

use super::config::PoolConfig;
use super::object::Poolable;
use super::pool::{ObjectPool, ObjectPoolBase, PoolInfo};
use crate::error::{CoreError, Result};
use crate::module::Module;

/// Pools are keyed by resource type and name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PoolKey {
    type_id: TypeId,
    name: String,
}

impl PoolKey {
    fn of<T: 'static>(name: &str) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: name.to_string(),
        }
    }
}

/// Creates, ticks and tears down object pools
pub struct ObjectPoolManager {
    pools: AHashMap<PoolKey, Box<dyn ObjectPoolBase>>,
}

impl ObjectPoolManager {
    pub const PRIORITY: i32 = 90;

    pub fn new() -> Self {
        Self {
            pools: AHashMap::new(),
        }
    }

    /// Number of pools
    pub fn count(&self) -> usize {
        self.pools.len()
    }

    pub fn has_pool<T: Poolable>(&self, name: &str) -> bool {
        self.pools.contains_key(&PoolKey::of::<T>(name))
    }

    /// Pool allowing one outstanding spawn per object
    pub fn create_single_spawn_pool<T: Poolable>(
        &mut self,
        config: PoolConfig,
    ) -> Result<&mut ObjectPool<T>> {
        self.create_pool(config.with_multi_spawn(false))
    }

    /// Pool allowing any number of outstanding spawns per object
    pub fn create_multi_spawn_pool<T: Poolable>(
        &mut self,
        config: PoolConfig,
    ) -> Result<&mut ObjectPool<T>> {
        self.create_pool(config.with_multi_spawn(true))
    }

    /// Create a pool as described by `config`
    pub fn create_pool<T: Poolable>(&mut self, config: PoolConfig) -> Result<&mut ObjectPool<T>> {
        let key = PoolKey::of::<T>(&config.name);
        if self.pools.contains_key(&key) {
            return Err(CoreError::InvalidState(format!(
                "Object pool '{}' of {} already exists",
                config.name,
                std::any::type_name::<T>()
            )));
        }

        let pool = ObjectPool::<T>::new(config)?;
        tracing::info!(
            pool = pool.name(),
            object_type = pool.object_type_name(),
            multi_spawn = pool.allow_multi_spawn(),
            capacity = pool.capacity(),
            "created object pool"
        );

        self.pools
            .entry(key)
            .or_insert(Box::new(pool))
            .as_any_mut()
            .downcast_mut::<ObjectPool<T>>()
            .ok_or_else(|| CoreError::InvalidState("Object pool type mismatch".to_string()))
    }

    pub fn pool<T: Poolable>(&self, name: &str) -> Option<&ObjectPool<T>> {
        self.pools
            .get(&PoolKey::of::<T>(name))
            .and_then(|p| p.as_any().downcast_ref::<ObjectPool<T>>())
    }

    pub fn pool_mut<T: Poolable>(&mut self, name: &str) -> Option<&mut ObjectPool<T>> {
        self.pools
            .get_mut(&PoolKey::of::<T>(name))
            .and_then(|p| p.as_any_mut().downcast_mut::<ObjectPool<T>>())
    }

    /// Shut a pool down and drop it. Returns whether it existed.
    pub fn destroy_pool<T: Poolable>(&mut self, name: &str) -> bool {
        match self.pools.remove(&PoolKey::of::<T>(name)) {
            Some(mut pool) => {
                pool.shutdown_pool();
                tracing::info!(pool = name, "destroyed object pool");
                true
            }
            None => false,
        }
    }

    /// Run the default release pass on every pool, highest priority first
    pub fn release(&mut self) -> Result<usize> {
        let mut released = 0;
        for pool in self.pools_by_priority_mut() {
            released += pool.release_pass()?;
        }
        Ok(released)
    }

    /// Evict every unused object from every pool
    pub fn release_all_unused(&mut self) -> Result<usize> {
        let mut released = 0;
        for pool in self.pools_by_priority_mut() {
            released += pool.release_unused()?;
        }
        Ok(released)
    }

    /// Pool statistics, highest priority first
    pub fn pool_infos(&self) -> Vec<PoolInfo> {
        let mut infos: Vec<PoolInfo> = self.pools.values().map(|p| p.pool_info()).collect();
        infos.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.name.cmp(&b.name)));
        infos
    }

    fn pools_by_priority_mut(&mut self) -> Vec<&mut Box<dyn ObjectPoolBase>> {
        let mut pools: Vec<&mut Box<dyn ObjectPoolBase>> = self.pools.values_mut().collect();
        pools.sort_by(|a, b| {
            b.pool_priority()
                .cmp(&a.pool_priority())
                .then_with(|| a.pool_name().cmp(b.pool_name()))
        });
        pools
    }
}

impl Default for ObjectPoolManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Module for ObjectPoolManager {
    fn name(&self) -> &str {
        "ObjectPoolManager"
    }

    fn priority(&self) -> i32 {
        Self::PRIORITY
    }

    fn update(&mut self, elapse_seconds: f32, real_elapse_seconds: f32) -> Result<()> {
        for pool in self.pools.values_mut() {
            pool.tick(elapse_seconds, real_elapse_seconds)?;
        }
        Ok(())
    }

    /// Pools are independent, so teardown order between them is unspecified
    fn shutdown(&mut self) {
        for pool in self.pools.values_mut() {
            pool.shutdown_pool();
        }
        self.pools.clear();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
