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

//! Download lifecycle events and their subscribers

use parking_lot::Mutex;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use super::task::DownloadTask;
use crate::error::Result;
use crate::task::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DownloadEventKind {
    Start,
    Update,
    Success,
    Failure,
}

/// Fields shared by every download event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadEventInfo {
    pub serial_id: u32,
    pub tag: Option<String>,
    pub download_path: PathBuf,
    pub download_uri: String,
    /// `start_length + downloaded_length` when the event was raised
    pub current_length: u64,
    pub user_data: Option<String>,
}

impl DownloadEventInfo {
    pub(crate) fn of(task: &DownloadTask) -> Self {
        Self {
            serial_id: task.serial_id(),
            tag: task.tag().map(str::to_string),
            download_path: task.download_path().to_path_buf(),
            download_uri: task.download_uri().to_string(),
            current_length: task.progress().current_length(),
            user_data: task.user_data().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DownloadEvent {
    Start(DownloadEventInfo),
    Update {
        info: DownloadEventInfo,
        delta_length: u64,
    },
    Success(DownloadEventInfo),
    Failure {
        info: DownloadEventInfo,
        error_message: String,
    },
}

impl DownloadEvent {
    pub fn kind(&self) -> DownloadEventKind {
        match self {
            DownloadEvent::Start(_) => DownloadEventKind::Start,
            DownloadEvent::Update { .. } => DownloadEventKind::Update,
            DownloadEvent::Success(_) => DownloadEventKind::Success,
            DownloadEvent::Failure { .. } => DownloadEventKind::Failure,
        }
    }

    pub fn info(&self) -> &DownloadEventInfo {
        match self {
            DownloadEvent::Start(info) | DownloadEvent::Success(info) => info,
            DownloadEvent::Update { info, .. } | DownloadEvent::Failure { info, .. } => info,
        }
    }

    pub fn serial_id(&self) -> u32 {
        self.info().serial_id
    }
}

/// Receives download events on the ticking thread
pub trait DownloadEventSubscriber {
    fn on_event(&mut self, event: &DownloadEvent) -> Result<()>;

    fn name(&self) -> &str {
        "UnnamedSubscriber"
    }

    fn can_handle(&self, _kind: DownloadEventKind) -> bool {
        true
    }
}

type DownloadCallback = Box<dyn FnMut(&DownloadEvent) -> Result<()>>;

/// Closure subscriber restricted to a set of event kinds
pub struct CallbackSubscriber {
    kinds: Vec<DownloadEventKind>,
    callback: DownloadCallback,
}

impl CallbackSubscriber {
    pub fn new<F>(kinds: &[DownloadEventKind], callback: F) -> Self
    where
        F: FnMut(&DownloadEvent) -> Result<()> + 'static,
    {
        Self {
            kinds: kinds.to_vec(),
            callback: Box::new(callback),
        }
    }

    pub fn on_failure<F>(callback: F) -> Self
    where
        F: FnMut(&DownloadEvent) -> Result<()> + 'static,
    {
        Self::new(&[DownloadEventKind::Failure], callback)
    }
}

impl DownloadEventSubscriber for CallbackSubscriber {
    fn on_event(&mut self, event: &DownloadEvent) -> Result<()> {
        (self.callback)(event)
    }

    fn name(&self) -> &str {
        "CallbackSubscriber"
    }

    fn can_handle(&self, kind: DownloadEventKind) -> bool {
        self.kinds.contains(&kind)
    }
}

/// Keeps every event it sees; clones share the same log
#[derive(Debug, Clone, Default)]
pub struct RecordingSubscriber {
    events: Arc<Mutex<Vec<DownloadEvent>>>,
}

impl RecordingSubscriber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DownloadEvent> {
        self.events.lock().clone()
    }

    pub fn kinds(&self) -> Vec<DownloadEventKind> {
        self.events.lock().iter().map(DownloadEvent::kind).collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl DownloadEventSubscriber for RecordingSubscriber {
    fn on_event(&mut self, event: &DownloadEvent) -> Result<()> {
        self.events.lock().push(event.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "RecordingSubscriber"
    }
}
