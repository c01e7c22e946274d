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

//! Download task and its byte accounting

use serde::Serialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::task::{next_serial_id, Task, TaskStatus};

/// Suffix of the staging file written next to the destination
pub const STAGING_SUFFIX: &str = ".download";

/// Optional per-download settings
#[derive(Debug, Clone, Default)]
pub struct DownloadOptions {
    pub tag: Option<String>,
    pub priority: i32,
    pub user_data: Option<String>,
}

impl DownloadOptions {
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_user_data(mut self, user_data: impl Into<String>) -> Self {
        self.user_data = Some(user_data.into());
        self
    }
}

/// Byte accounting of one download.
///
/// At every durable checkpoint `saved_length == start_length + downloaded_length`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DownloadProgress {
    /// Size of the staging file when the request started
    pub start_length: u64,
    /// Bytes reported by the transport during this request
    pub downloaded_length: u64,
    /// Bytes written to the staging file, including `start_length`
    pub saved_length: u64,
}

impl DownloadProgress {
    pub fn current_length(&self) -> u64 {
        self.start_length + self.downloaded_length
    }

    pub fn is_consistent(&self) -> bool {
        self.saved_length == self.current_length()
    }
}

/// File retrieval task
#[derive(Debug, Clone)]
pub struct DownloadTask {
    serial_id: u32,
    tag: Option<String>,
    priority: i32,
    pub(crate) status: TaskStatus,
    download_path: PathBuf,
    download_uri: String,
    flush_size: usize,
    timeout: f32,
    user_data: Option<String>,
    pub(crate) progress: DownloadProgress,
}

impl DownloadTask {
    pub fn new(
        download_path: impl Into<PathBuf>,
        download_uri: impl Into<String>,
        options: DownloadOptions,
        flush_size: usize,
        timeout: f32,
    ) -> Self {
        Self {
            serial_id: next_serial_id(),
            tag: options.tag,
            priority: options.priority,
            status: TaskStatus::Todo,
            download_path: download_path.into(),
            download_uri: download_uri.into(),
            flush_size,
            timeout,
            user_data: options.user_data,
            progress: DownloadProgress::default(),
        }
    }

    pub fn download_path(&self) -> &Path {
        &self.download_path
    }

    /// `<download_path>.download`
    pub fn staging_path(&self) -> PathBuf {
        staging_path_for(&self.download_path)
    }

    pub fn download_uri(&self) -> &str {
        &self.download_uri
    }

    pub fn flush_size(&self) -> usize {
        self.flush_size
    }

    pub fn timeout(&self) -> f32 {
        self.timeout
    }

    pub fn user_data(&self) -> Option<&str> {
        self.user_data.as_deref()
    }

    pub fn progress(&self) -> DownloadProgress {
        self.progress
    }
}

pub fn staging_path_for(download_path: &Path) -> PathBuf {
    let mut staging = OsString::from(download_path.as_os_str());
    staging.push(STAGING_SUFFIX);
    PathBuf::from(staging)
}

impl Task for DownloadTask {
    fn serial_id(&self) -> u32 {
        self.serial_id
    }

    fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn status(&self) -> TaskStatus {
        self.status
    }

    fn is_done(&self) -> bool {
        self.status.is_terminal()
    }

    fn description(&self) -> Option<String> {
        Some(self.download_uri.clone())
    }
}
