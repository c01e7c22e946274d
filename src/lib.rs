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

//! Archetype Core - runtime services for tick-driven games
//!
//! Object pools with a priority/expiry eviction policy, a priority task
//! scheduler with a resumable download manager built on it, and a module
//! registry that ticks and tears them down in priority order.

pub mod download;
pub mod error;
pub mod module;
pub mod multi_map;
pub mod object_pool;
pub mod prelude;
pub mod task;
pub mod time;

pub use error::*;
pub use module::{Module, ModuleRegistry};
pub use multi_map::MultiMap;
pub use time::{FrameTime, Time};
