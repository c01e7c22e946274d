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

//! Error types

use std::fmt;

/// Core error type
#[derive(Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Null, empty or out-of-range input to a public API
    InvalidArgument(String),

    /// Operation would break an invariant (programmer error)
    InvalidState(String),

    /// Target, pool, module or task not found
    NotFound(String),

    /// Task-level failure that no subscriber handled
    OperationFailed(String),

    /// IO error (file operations, etc.)
    Io(String),

    /// Configuration could not be parsed
    Config(String),
}

impl CoreError {
    /// Programmer errors and broken invariants are never recoverable
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CoreError::InvalidArgument(_) | CoreError::InvalidState(_) | CoreError::NotFound(_)
        )
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::InvalidArgument(msg) => write!(f, "Invalid argument: {msg}"),
            CoreError::InvalidState(msg) => write!(f, "Invalid state: {msg}"),
            CoreError::NotFound(msg) => write!(f, "Not found: {msg}"),
            CoreError::OperationFailed(msg) => write!(f, "Operation failed: {msg}"),
            CoreError::Io(msg) => write!(f, "IO error: {msg}"),
            CoreError::Config(msg) => write!(f, "Config error: {msg}"),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        CoreError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Config(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, CoreError>;
