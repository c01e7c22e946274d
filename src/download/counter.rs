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

//! Rolling-window download speed

use std::collections::VecDeque;

use super::config::positive_interval;
use crate::error::Result;

#[derive(Debug, Clone, Copy)]
struct CounterNode {
    delta_length: u64,
    elapse_seconds: f32,
}

/// Bytes per second over the last `record_interval` seconds, recomputed
/// every `update_interval` seconds.
#[derive(Debug, Clone)]
pub struct DownloadCounter {
    nodes: VecDeque<CounterNode>,
    update_interval: f32,
    record_interval: f32,
    current_speed: f32,
    accumulator: f32,
    time_left: f32,
}

impl DownloadCounter {
    pub fn new(update_interval: f32, record_interval: f32) -> Result<Self> {
        positive_interval("update interval", update_interval)?;
        positive_interval("record interval", record_interval)?;
        Ok(Self {
            nodes: VecDeque::new(),
            update_interval,
            record_interval,
            current_speed: 0.0,
            accumulator: 0.0,
            time_left: 0.0,
        })
    }

    pub fn update_interval(&self) -> f32 {
        self.update_interval
    }

    /// Changing the interval resets the counter
    pub fn set_update_interval(&mut self, seconds: f32) -> Result<()> {
        positive_interval("update interval", seconds)?;
        self.update_interval = seconds;
        self.reset();
        Ok(())
    }

    pub fn record_interval(&self) -> f32 {
        self.record_interval
    }

    /// Changing the interval resets the counter
    pub fn set_record_interval(&mut self, seconds: f32) -> Result<()> {
        positive_interval("record interval", seconds)?;
        self.record_interval = seconds;
        self.reset();
        Ok(())
    }

    /// Bytes per second
    pub fn current_speed(&self) -> f32 {
        self.current_speed
    }

    pub fn reset(&mut self) {
        self.nodes.clear();
        self.current_speed = 0.0;
        self.accumulator = 0.0;
        self.time_left = 0.0;
    }

    /// Deltas landing within `update_interval` of the newest node are merged
    pub fn record_delta_length(&mut self, delta_length: u64) {
        if delta_length == 0 {
            return;
        }

        if let Some(last) = self.nodes.back_mut() {
            if last.elapse_seconds < self.update_interval {
                last.delta_length += delta_length;
                return;
            }
        }

        self.nodes.push_back(CounterNode {
            delta_length,
            elapse_seconds: 0.0,
        });
    }

    pub fn update(&mut self, _elapse_seconds: f32, real_elapse_seconds: f32) {
        if self.nodes.is_empty() {
            return;
        }

        self.accumulator = (self.accumulator + real_elapse_seconds).min(self.record_interval);
        self.time_left -= real_elapse_seconds;
        for node in self.nodes.iter_mut() {
            node.elapse_seconds += real_elapse_seconds;
        }

        while self
            .nodes
            .front()
            .is_some_and(|node| node.elapse_seconds >= self.record_interval)
        {
            self.nodes.pop_front();
        }

        if self.nodes.is_empty() {
            self.reset();
            return;
        }

        if self.time_left <= 0.0 {
            let total: u64 = self.nodes.iter().map(|node| node.delta_length).sum();
            self.current_speed = if self.accumulator > 0.0 {
                total as f32 / self.accumulator
            } else {
                0.0
            };
            self.time_left += self.update_interval;
        }
    }
}

impl Default for DownloadCounter {
    fn default() -> Self {
        Self {
            nodes: VecDeque::new(),
            update_interval: 1.0,
            record_interval: 10.0,
            current_speed: 0.0,
            accumulator: 0.0,
            time_left: 0.0,
        }
    }
}
