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

//! Generic task scheduling.
//!
//! A [`TaskPool`] owns a priority queue of [`Task`]s and a fixed set of
//! [`TaskAgent`]s. Each tick it advances running agents, reaps finished
//! tasks and hands the highest-priority waiting task to the next free agent.

pub mod base;
pub mod pool;

pub use base::{next_serial_id, StartTaskStatus, Task, TaskAgent, TaskInfo, TaskStatus};
pub use pool::TaskPool;
