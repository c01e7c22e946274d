//! Object pooling with capacity, expiry and priority driven eviction.
//!
//! - [`ObjectPool`] - one named pool of a resource type
//! - [`ObjectPoolManager`] - registry module creating and ticking pools
//! - [`ReleaseFilter`] - pluggable eviction selection over the safe candidate set
//!
//! # Examples
//!
//! ```
//! use archetype_core::object_pool::{ObjectPoolManager, PoolConfig, Poolable};
//!
//! struct Enemy;
//! impl Poolable for Enemy {}
//!
//! let mut pools = ObjectPoolManager::new();
//! let pool = pools
//!     .create_single_spawn_pool::<Enemy>(PoolConfig::new("enemies").with_capacity(2))
//!     .unwrap();
//!
//! pool.register("orc", Enemy, false).unwrap();
//! let orc = pool.spawn("orc").unwrap();
//! assert!(!pool.can_spawn("orc"));
//! pool.unspawn(orc).unwrap();
//! ```

pub mod config;
pub mod manager;
pub mod object;
pub mod pool;
pub mod release;

pub use config::PoolConfig;
pub use manager::ObjectPoolManager;
pub use object::{ObjectId, ObjectInfo, PooledObject, Poolable};
pub use pool::{ObjectPool, ObjectPoolBase, PoolInfo};
pub use release::{DefaultReleaseFilter, OldestFirstFilter, ReleaseFilter};
