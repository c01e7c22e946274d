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

use crossbeam::channel::{unbounded, Receiver, Sender};
use std::any::Any;
use std::path::{Path, PathBuf};

#[cfg(feature = "profiling")]
use tracing::info_span;

use super::agent::DownloadAgent;
use super::config::DownloadConfig;
use super::counter::DownloadCounter;
use super::event::{DownloadEvent, DownloadEventSubscriber};
use super::task::{DownloadOptions, DownloadProgress, DownloadTask};
use super::transport::DownloadTransport;
use crate::error::{CoreError, Result};
use crate::module::Module;
use crate::task::{TaskInfo, TaskPool};

/// Download module: a [`TaskPool`] of [`DownloadAgent`]s plus a speed counter
pub struct DownloadManager {
    pool: TaskPool<DownloadTask>,
    counter: DownloadCounter,
    flush_size: usize,
    timeout: f32,
    event_sender: Sender<DownloadEvent>,
    event_receiver: Receiver<DownloadEvent>,
    subscribers: Vec<Box<dyn DownloadEventSubscriber>>,
}

impl DownloadManager {
    pub const PRIORITY: i32 = 5;

    pub fn new(config: DownloadConfig) -> Result<Self> {
        config.validate()?;
        let (event_sender, event_receiver) = unbounded();
        Ok(Self {
            pool: TaskPool::new(),
            counter: DownloadCounter::new(config.update_interval, config.record_interval)?,
            flush_size: config.flush_size,
            timeout: config.timeout,
            event_sender,
            event_receiver,
            subscribers: Vec::new(),
        })
    }

    pub fn paused(&self) -> bool {
        self.pool.paused()
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.pool.set_paused(paused);
    }

    pub fn total_agent_count(&self) -> usize {
        self.pool.total_agent_count()
    }

    pub fn free_agent_count(&self) -> usize {
        self.pool.free_agent_count()
    }

    pub fn working_agent_count(&self) -> usize {
        self.pool.working_agent_count()
    }

    pub fn waiting_task_count(&self) -> usize {
        self.pool.waiting_task_count()
    }

    pub fn flush_size(&self) -> usize {
        self.flush_size
    }

    /// Applies to downloads added afterwards
    pub fn set_flush_size(&mut self, flush_size: usize) -> Result<()> {
        if flush_size == 0 {
            return Err(CoreError::InvalidArgument("flush size must be positive".into()));
        }
        self.flush_size = flush_size;
        Ok(())
    }

    pub fn timeout(&self) -> f32 {
        self.timeout
    }

    /// Applies to downloads added afterwards
    pub fn set_timeout(&mut self, timeout: f32) -> Result<()> {
        if timeout.is_nan() || timeout <= 0.0 {
            return Err(CoreError::InvalidArgument(format!("timeout is invalid: {timeout}")));
        }
        self.timeout = timeout;
        Ok(())
    }

    /// Bytes per second over the counter's record window
    pub fn current_speed(&self) -> f32 {
        self.counter.current_speed()
    }

    pub fn counter(&self) -> &DownloadCounter {
        &self.counter
    }

    pub fn counter_mut(&mut self) -> &mut DownloadCounter {
        &mut self.counter
    }

    pub fn subscribe<S: DownloadEventSubscriber + 'static>(&mut self, subscriber: S) {
        tracing::debug!(subscriber = subscriber.name(), "download subscriber added");
        self.subscribers.push(Box::new(subscriber));
    }

    /// Add a transport-backed agent; waiting downloads start right away
    pub fn add_agent(&mut self, transport: Box<dyn DownloadTransport>) -> Result<()> {
        let agent = DownloadAgent::new(transport, self.event_sender.clone());
        self.pool.add_agent(Box::new(agent))?;
        self.dispatch_events()
    }

    pub fn add_download(
        &mut self,
        download_path: impl AsRef<Path>,
        download_uri: &str,
    ) -> Result<u32> {
        self.add_download_with(download_path, download_uri, DownloadOptions::default())
    }

    /// Queue a download. Returns its serial id.
    pub fn add_download_with(
        &mut self,
        download_path: impl AsRef<Path>,
        download_uri: &str,
        options: DownloadOptions,
    ) -> Result<u32> {
        let download_path = download_path.as_ref();
        if download_path.as_os_str().is_empty() {
            return Err(CoreError::InvalidArgument("Download path is invalid".into()));
        }
        if download_uri.is_empty() {
            return Err(CoreError::InvalidArgument("Download uri is invalid".into()));
        }
        if self.pool.total_agent_count() == 0 {
            return Err(CoreError::InvalidState(
                "You must add download agent first".into(),
            ));
        }

        let task = DownloadTask::new(
            PathBuf::from(download_path),
            download_uri,
            options,
            self.flush_size,
            self.timeout,
        );
        let serial_id = self.pool.add_task(task)?;
        self.dispatch_events()?;
        Ok(serial_id)
    }

    pub fn remove_download(&mut self, serial_id: u32) -> bool {
        self.pool.remove_task(serial_id).is_some()
    }

    pub fn remove_downloads(&mut self, tag: &str) -> usize {
        self.pool.remove_tasks(tag).len()
    }

    pub fn remove_all_downloads(&mut self) -> usize {
        self.pool.remove_all_tasks().len()
    }

    pub fn download_info(&self, serial_id: u32) -> Option<TaskInfo> {
        self.pool.task_info(serial_id)
    }

    pub fn download_infos(&self, tag: &str) -> Vec<TaskInfo> {
        self.pool.task_infos(tag)
    }

    pub fn all_download_infos(&self) -> Vec<TaskInfo> {
        self.pool.all_task_infos()
    }

    pub fn download_progress(&self, serial_id: u32) -> Option<DownloadProgress> {
        self.pool.task(serial_id).map(DownloadTask::progress)
    }

    /// Deliver queued agent events; an unhandled failure aborts the tick
    fn dispatch_events(&mut self) -> Result<()> {
        while let Ok(event) = self.event_receiver.try_recv() {
            if let DownloadEvent::Update { delta_length, .. } = &event {
                self.counter.record_delta_length(*delta_length);
            }

            let kind = event.kind();
            let mut handled = false;
            for subscriber in self.subscribers.iter_mut() {
                if subscriber.can_handle(kind) {
                    subscriber.on_event(&event)?;
                    handled = true;
                }
            }

            if let DownloadEvent::Failure {
                info,
                error_message,
            } = &event
            {
                if !handled {
                    return Err(CoreError::OperationFailed(format!(
                        "Download '{}' to '{}' failed: {}",
                        info.download_uri,
                        info.download_path.display(),
                        error_message
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Module for DownloadManager {
    fn name(&self) -> &str {
        "DownloadManager"
    }

    fn priority(&self) -> i32 {
        Self::PRIORITY
    }

    fn update(&mut self, elapse_seconds: f32, real_elapse_seconds: f32) -> Result<()> {
        #[cfg(feature = "profiling")]
        let _span = info_span!("download_manager.update").entered();

        self.pool.update(elapse_seconds, real_elapse_seconds)?;
        self.dispatch_events()?;
        self.counter.update(elapse_seconds, real_elapse_seconds);
        Ok(())
    }

    fn shutdown(&mut self) {
        self.pool.shutdown();
        while self.event_receiver.try_recv().is_ok() {}
        self.subscribers.clear();
        self.counter.reset();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
