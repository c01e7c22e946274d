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

//! Task pool: a priority queue of waiting tasks dispatched to a fixed set of
//! agents.
//!
//! A task value lives either in the waiting queue or inside exactly one
//! agent. Moving it between the two is the only way it changes place, so a
//! task can never be processed twice.

use rustc_hash::FxHashMap;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::ops::Bound;

#[cfg(feature = "profiling")]
use tracing::info_span;

use super::base::{StartTaskStatus, Task, TaskAgent, TaskInfo, TaskStatus};
use crate::error::{CoreError, Result};

/// Queue order: highest priority first, then lowest serial id
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct WaitingKey {
    priority: Reverse<i32>,
    serial_id: u32,
}

impl WaitingKey {
    fn of<T: Task>(task: &T) -> Self {
        Self {
            priority: Reverse(task.priority()),
            serial_id: task.serial_id(),
        }
    }
}

/// Dispatches queued tasks across a set of agents
pub struct TaskPool<T: Task> {
    agents: Vec<Box<dyn TaskAgent<T>>>,
    /// Indices into `agents`, used as a stack
    free_agents: Vec<usize>,
    /// Indices into `agents`, in start order
    working_agents: Vec<usize>,
    waiting: BTreeMap<WaitingKey, T>,
    waiting_index: FxHashMap<u32, WaitingKey>,
    paused: bool,
}

impl<T: Task> TaskPool<T> {
    pub fn new() -> Self {
        Self {
            agents: Vec::new(),
            free_agents: Vec::new(),
            working_agents: Vec::new(),
            waiting: BTreeMap::new(),
            waiting_index: FxHashMap::default(),
            paused: false,
        }
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    /// A paused pool neither ticks agents nor dispatches tasks
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn total_agent_count(&self) -> usize {
        self.agents.len()
    }

    pub fn free_agent_count(&self) -> usize {
        self.free_agents.len()
    }

    pub fn working_agent_count(&self) -> usize {
        self.working_agents.len()
    }

    pub fn waiting_task_count(&self) -> usize {
        self.waiting.len()
    }

    /// Add a worker and immediately offer it waiting tasks
    pub fn add_agent(&mut self, mut agent: Box<dyn TaskAgent<T>>) -> Result<()> {
        agent.initialize()?;
        self.agents.push(agent);
        self.free_agents.push(self.agents.len() - 1);
        self.process_waiting_tasks()
    }

    /// Queue a task and immediately try to dispatch. Returns its serial id.
    pub fn add_task(&mut self, task: T) -> Result<u32> {
        let serial_id = task.serial_id();
        if self.contains_task(serial_id) {
            return Err(CoreError::InvalidState(format!(
                "Task {serial_id} is already in the pool"
            )));
        }

        self.enqueue(task);
        self.process_waiting_tasks()?;
        Ok(serial_id)
    }

    fn enqueue(&mut self, task: T) {
        let key = WaitingKey::of(&task);
        self.waiting_index.insert(key.serial_id, key);
        self.waiting.insert(key, task);
    }

    pub fn contains_task(&self, serial_id: u32) -> bool {
        self.waiting_index.contains_key(&serial_id) || self.working_position(serial_id).is_some()
    }

    fn working_position(&self, serial_id: u32) -> Option<usize> {
        self.working_agents.iter().position(|&agent| {
            self.agents[agent]
                .task()
                .is_some_and(|t| t.serial_id() == serial_id)
        })
    }

    /// Remove a task wherever it is; a running task's agent is reset
    pub fn remove_task(&mut self, serial_id: u32) -> Option<T> {
        if let Some(key) = self.waiting_index.remove(&serial_id) {
            return self.waiting.remove(&key);
        }

        let position = self.working_position(serial_id)?;
        self.reclaim_working(position)
    }

    /// Remove every task carrying `tag`
    pub fn remove_tasks(&mut self, tag: &str) -> Vec<T> {
        let serial_ids: Vec<u32> = self
            .all_tasks()
            .filter(|(t, _)| t.tag() == Some(tag))
            .map(|(t, _)| t.serial_id())
            .collect();
        serial_ids
            .into_iter()
            .filter_map(|id| self.remove_task(id))
            .collect()
    }

    pub fn remove_all_tasks(&mut self) -> Vec<T> {
        let mut removed = Vec::with_capacity(self.waiting.len() + self.working_agents.len());
        self.waiting_index.clear();
        removed.extend(std::mem::take(&mut self.waiting).into_values());
        while !self.working_agents.is_empty() {
            if let Some(task) = self.reclaim_working(0) {
                removed.push(task);
            }
        }
        removed
    }

    fn reclaim_working(&mut self, position: usize) -> Option<T> {
        let agent = self.working_agents.remove(position);
        let task = self.agents[agent].reset();
        self.free_agents.push(agent);
        if let Some(task) = &task {
            tracing::debug!(serial_id = task.serial_id(), "reclaimed running task");
        }
        task
    }

    /// Borrow a queued or running task
    pub fn task(&self, serial_id: u32) -> Option<&T> {
        self.all_tasks()
            .map(|(t, _)| t)
            .find(|t| t.serial_id() == serial_id)
    }

    pub fn task_info(&self, serial_id: u32) -> Option<TaskInfo> {
        self.all_tasks()
            .find(|(t, _)| t.serial_id() == serial_id)
            .map(|(t, status)| TaskInfo::of(t, status))
    }

    pub fn task_infos(&self, tag: &str) -> Vec<TaskInfo> {
        self.all_tasks()
            .filter(|(t, _)| t.tag() == Some(tag))
            .map(|(t, status)| TaskInfo::of(t, status))
            .collect()
    }

    /// Running tasks first (in start order), then waiting tasks in queue order
    pub fn all_task_infos(&self) -> Vec<TaskInfo> {
        self.all_tasks()
            .map(|(t, status)| TaskInfo::of(t, status))
            .collect()
    }

    fn all_tasks(&self) -> impl Iterator<Item = (&T, TaskStatus)> + '_ {
        let working = self.working_agents.iter().filter_map(|&agent| {
            self.agents[agent].task().map(|t| {
                let status = if t.status().is_terminal() {
                    t.status()
                } else {
                    TaskStatus::Doing
                };
                (t, status)
            })
        });
        let waiting = self.waiting.values().map(|t| (t, TaskStatus::Todo));
        working.chain(waiting)
    }

    /// Tick running agents, reap finished tasks, then dispatch waiting tasks
    pub fn update(&mut self, elapse_seconds: f32, real_elapse_seconds: f32) -> Result<()> {
        if self.paused {
            return Ok(());
        }

        #[cfg(feature = "profiling")]
        let _span = info_span!(
            "task_pool.update",
            working = self.working_agents.len(),
            waiting = self.waiting.len()
        )
        .entered();

        self.process_running_tasks(elapse_seconds, real_elapse_seconds)?;
        self.process_waiting_tasks()
    }

    fn process_running_tasks(
        &mut self,
        elapse_seconds: f32,
        real_elapse_seconds: f32,
    ) -> Result<()> {
        let mut position = 0;
        while position < self.working_agents.len() {
            let agent = &mut self.agents[self.working_agents[position]];
            if !agent.task().is_some_and(|t| t.is_done()) {
                agent.update(elapse_seconds, real_elapse_seconds)?;
            }

            if agent.task().map_or(true, |t| t.is_done()) {
                let agent = self.working_agents.remove(position);
                if let Some(task) = self.agents[agent].reset() {
                    tracing::debug!(
                        serial_id = task.serial_id(),
                        status = ?task.status(),
                        "task finished"
                    );
                }
                self.free_agents.push(agent);
                continue;
            }
            position += 1;
        }
        Ok(())
    }

    fn process_waiting_tasks(&mut self) -> Result<()> {
        if self.paused || self.free_agents.is_empty() || self.waiting.is_empty() {
            return Ok(());
        }

        // Tasks put back with HasToWait keep their key, so an exclusive cursor
        // visits each waiting task at most once per pass.
        let mut cursor: Option<WaitingKey> = None;
        while !self.free_agents.is_empty() {
            let next = match cursor {
                None => self.waiting.keys().next(),
                Some(last) => self
                    .waiting
                    .range((Bound::Excluded(last), Bound::Unbounded))
                    .next()
                    .map(|(key, _)| key),
            };
            let Some(&key) = next else {
                break;
            };
            cursor = Some(key);

            let Some(task) = self.waiting.remove(&key) else {
                break;
            };
            self.waiting_index.remove(&key.serial_id);
            let Some(agent) = self.free_agents.pop() else {
                self.enqueue(task);
                break;
            };

            match self.agents[agent].start(task) {
                StartTaskStatus::CanResume => {
                    tracing::debug!(serial_id = key.serial_id, agent, "dispatched task");
                    self.working_agents.push(agent);
                }
                StartTaskStatus::HasToWait => {
                    let task = self.agents[agent].reset().ok_or_else(|| {
                        CoreError::InvalidState(format!(
                            "Agent lost task {} while asking it to wait",
                            key.serial_id
                        ))
                    })?;
                    self.free_agents.push(agent);
                    self.enqueue(task);
                }
                StartTaskStatus::Done | StartTaskStatus::UnknownError => {
                    self.agents[agent].reset();
                    self.free_agents.push(agent);
                }
            }
        }
        Ok(())
    }

    /// Drop every task and shut every agent down
    pub fn shutdown(&mut self) {
        self.remove_all_tasks();
        for agent in self.agents.iter_mut() {
            agent.shutdown();
        }
        self.agents.clear();
        self.free_agents.clear();
        self.working_agents.clear();
    }
}

impl<T: Task> Default for TaskPool<T> {
    fn default() -> Self {
        Self::new()
    }
}
