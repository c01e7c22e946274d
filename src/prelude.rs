//! Convenient re-exports of commonly used types.
//!
//! The prelude can be imported with:
//! ```
//! use archetype_core::prelude::*;
//! ```

pub use crate::download::{
    DownloadConfig, DownloadEvent, DownloadEventKind, DownloadEventSubscriber, DownloadManager,
    DownloadOptions, DownloadRequest, DownloadTransport, SignalSink,
};
pub use crate::error::{CoreError, Result};
pub use crate::module::{Module, ModuleRegistry};
pub use crate::object_pool::{
    ObjectId, ObjectPool, ObjectPoolManager, PoolConfig, Poolable, ReleaseFilter,
};
pub use crate::task::{StartTaskStatus, Task, TaskAgent, TaskPool, TaskStatus};
pub use crate::time::Time;
