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

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::object_pool::config::reject_negative_counts;

/// Download manager settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Bytes buffered before the staging file is flushed
    pub flush_size: usize,
    /// Real seconds without any transport signal before a task fails
    pub timeout: f32,
    /// Seconds between speed recomputations
    pub update_interval: f32,
    /// Seconds of history kept for the speed window
    pub record_interval: f32,
}

impl DownloadConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        reject_negative_counts(&value, &["flush_size"])?;
        let config: Self = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.flush_size == 0 {
            return Err(CoreError::InvalidArgument("flush size must be positive".into()));
        }
        if self.timeout.is_nan() || self.timeout <= 0.0 {
            return Err(CoreError::InvalidArgument(format!(
                "timeout is invalid: {}",
                self.timeout
            )));
        }
        positive_interval("update interval", self.update_interval)?;
        positive_interval("record interval", self.record_interval)
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            flush_size: 1024 * 1024,
            timeout: 30.0,
            update_interval: 1.0,
            record_interval: 10.0,
        }
    }
}

pub(crate) fn positive_interval(what: &str, seconds: f32) -> Result<()> {
    if seconds.is_nan() || seconds <= 0.0 {
        return Err(CoreError::InvalidArgument(format!(
            "{what} is invalid: {seconds}"
        )));
    }
    Ok(())
}
