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

//! Task identity, status and the agent contract

use serde::Serialize;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::error::Result;

static NEXT_SERIAL_ID: AtomicU32 = AtomicU32::new(0);

/// Next process-wide task serial id; the first is 0
pub fn next_serial_id() -> u32 {
    NEXT_SERIAL_ID.fetch_add(1, Ordering::Relaxed)
}

/// Lifecycle of a task: Todo -> Doing -> Done | Error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TaskStatus {
    Todo,
    Doing,
    Done,
    Error,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Done | TaskStatus::Error)
    }
}

/// Result of handing a task to an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartTaskStatus {
    /// Finished synchronously; the agent is freed and the task dropped
    Done,
    /// Accepted and in flight
    CanResume,
    /// Cannot run yet; the task stays queued
    HasToWait,
    /// Failed synchronously; the failure has already been reported
    UnknownError,
}

/// Unit of queued work
pub trait Task: 'static {
    /// Unique handle, assigned at construction
    fn serial_id(&self) -> u32;

    fn tag(&self) -> Option<&str> {
        None
    }

    /// Higher runs first
    fn priority(&self) -> i32 {
        0
    }

    fn status(&self) -> TaskStatus;

    /// Set once the task reached a terminal status
    fn is_done(&self) -> bool;

    fn description(&self) -> Option<String> {
        None
    }
}

/// Stateful worker running at most one task at a time
pub trait TaskAgent<T: Task> {
    /// Called once when the agent joins a pool
    fn initialize(&mut self) -> Result<()> {
        Ok(())
    }

    /// Take ownership of `task` and begin working on it
    fn start(&mut self, task: T) -> StartTaskStatus;

    /// Per-tick progress. Errors are fatal invariant violations.
    fn update(&mut self, elapse_seconds: f32, real_elapse_seconds: f32) -> Result<()>;

    /// Task currently bound to this agent
    fn task(&self) -> Option<&T>;

    /// Abort in-flight work and hand the task back
    fn reset(&mut self) -> Option<T>;

    fn shutdown(&mut self) {}
}

/// Snapshot of a task's place in a pool
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskInfo {
    pub serial_id: u32,
    pub tag: Option<String>,
    pub priority: i32,
    pub status: TaskStatus,
    pub description: Option<String>,
}

impl TaskInfo {
    pub(crate) fn of<T: Task>(task: &T, status: TaskStatus) -> Self {
        Self {
            serial_id: task.serial_id(),
            tag: task.tag().map(str::to_string),
            priority: task.priority(),
            status,
            description: task.description(),
        }
    }
}
