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

//! Object pool creation parameters.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Parameters for creating an object pool.
///
/// `f32::MAX` for `auto_release_interval` or `expire_time` means "never".
///
/// ```
/// use archetype_core::object_pool::PoolConfig;
///
/// let config = PoolConfig::from_json(r#"{ "name": "bullets", "capacity": 64 }"#).unwrap();
/// assert_eq!(config.capacity, 64);
/// assert!(!config.allow_multi_spawn);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub name: String,
    pub allow_multi_spawn: bool,
    pub auto_release_interval: f32,
    pub capacity: usize,
    pub expire_time: f32,
    pub priority: i32,
}

impl PoolConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_multi_spawn(mut self, allow: bool) -> Self {
        self.allow_multi_spawn = allow;
        self
    }

    pub fn with_auto_release_interval(mut self, seconds: f32) -> Self {
        self.auto_release_interval = seconds;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_expire_time(mut self, seconds: f32) -> Self {
        self.expire_time = seconds;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Parse from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        reject_negative_counts(&value, &["capacity"])?;
        let config: Self = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_seconds("auto release interval", self.auto_release_interval)?;
        validate_seconds("expire time", self.expire_time)
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            allow_multi_spawn: false,
            auto_release_interval: f32::MAX,
            capacity: usize::MAX,
            expire_time: f32::MAX,
            priority: 0,
        }
    }
}

/// Unsigned count fields given as negative JSON integers are bad arguments,
/// not malformed documents
pub(crate) fn reject_negative_counts(value: &serde_json::Value, fields: &[&str]) -> Result<()> {
    for field in fields {
        let count = value.get(field).and_then(|v| v.as_i64());
        if let Some(count) = count.filter(|&c| c < 0) {
            return Err(CoreError::InvalidArgument(format!("{field} is invalid: {count}")));
        }
    }
    Ok(())
}

pub(crate) fn validate_seconds(what: &str, seconds: f32) -> Result<()> {
    if seconds.is_nan() || seconds < 0.0 {
        return Err(CoreError::InvalidArgument(format!(
            "{what} is invalid: {seconds}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_never_expire() {
        let config = PoolConfig::new("fx");
        assert_eq!(config.capacity, usize::MAX);
        assert_eq!(config.expire_time, f32::MAX);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_negative_expire_time_rejected() {
        let config = PoolConfig::new("fx").with_expire_time(-1.0);
        assert!(matches!(
            config.validate(),
            Err(CoreError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_negative_capacity_rejected() {
        let err = PoolConfig::from_json(r#"{ "capacity": -1 }"#).unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument(_)));
    }

    #[test]
    fn test_malformed_capacity_is_config_error() {
        let err = PoolConfig::from_json(r#"{ "capacity": "lots" }"#).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn test_json_negative_interval_rejected() {
        let err = PoolConfig::from_json(r#"{ "auto_release_interval": -0.5 }"#).unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument(_)));
    }
}
