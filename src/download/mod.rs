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

//! Resumable file downloads on top of the task pool.
//!
//! Bytes are written to `<path>.download` and renamed to `<path>` once the
//! transport reports completion. A leftover staging file from an earlier
//! run is resumed with a ranged request.
//!
//! ```
//! use archetype_core::download::{DownloadConfig, DownloadManager};
//!
//! let mut downloads = DownloadManager::new(DownloadConfig::default()).unwrap();
//! // No agent yet: downloads cannot be queued
//! assert!(downloads.add_download("cache/a.bin", "https://example.com/a.bin").is_err());
//! ```

pub mod agent;
pub mod config;
pub mod counter;
pub mod event;
pub mod manager;
pub mod task;
pub mod transport;

pub use agent::{DownloadAgent, TIMEOUT_MESSAGE};
pub use config::DownloadConfig;
pub use counter::DownloadCounter;
pub use event::{
    CallbackSubscriber, DownloadEvent, DownloadEventInfo, DownloadEventKind,
    DownloadEventSubscriber, RecordingSubscriber,
};
pub use manager::DownloadManager;
pub use task::{staging_path_for, DownloadOptions, DownloadProgress, DownloadTask, STAGING_SUFFIX};
pub use transport::{DownloadRequest, DownloadTransport, SignalSink, TransportSignal};
