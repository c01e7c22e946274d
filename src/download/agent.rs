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

//! Download agent: drives one [`DownloadTask`] at a time through a
//! [`DownloadTransport`], persisting bytes to `<path>.download` and
//! renaming it into place on completion.

use crossbeam::channel::{unbounded, Receiver, Sender};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use super::event::{DownloadEvent, DownloadEventInfo};
use super::task::DownloadTask;
use super::transport::{DownloadRequest, DownloadTransport, SignalSink, TransportSignal};
use crate::error::{CoreError, Result};
use crate::task::{StartTaskStatus, Task, TaskAgent, TaskStatus};

pub const TIMEOUT_MESSAGE: &str = "Timeout";

pub struct DownloadAgent {
    transport: Box<dyn DownloadTransport>,
    signal_sender: Sender<(u64, TransportSignal)>,
    signal_receiver: Receiver<(u64, TransportSignal)>,
    /// Stamp of the request currently accepted; bumped whenever one is abandoned
    ticket: u64,
    events: Sender<DownloadEvent>,
    task: Option<DownloadTask>,
    file: Option<BufWriter<File>>,
    wait_flush_size: usize,
    wait_time: f32,
}

impl DownloadAgent {
    pub fn new(transport: Box<dyn DownloadTransport>, events: Sender<DownloadEvent>) -> Self {
        let (signal_sender, signal_receiver) = unbounded();
        Self {
            transport,
            signal_sender,
            signal_receiver,
            ticket: 0,
            events,
            task: None,
            file: None,
            wait_flush_size: 0,
            wait_time: 0.0,
        }
    }

    /// Real seconds since the last transport signal
    pub fn wait_time(&self) -> f32 {
        self.wait_time
    }

    fn emit(&self, event: DownloadEvent) {
        // A dropped receiver means the manager is gone; nothing left to notify.
        let _ = self.events.send(event);
    }

    fn is_doing(&self) -> bool {
        self.task
            .as_ref()
            .is_some_and(|task| task.status == TaskStatus::Doing)
    }

    fn open_staging(staging: &Path) -> io::Result<(File, u64)> {
        if staging.exists() {
            let file = OpenOptions::new().append(true).open(staging)?;
            let length = file.metadata()?.len();
            return Ok((file, length));
        }

        if let Some(parent) = staging.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok((File::create(staging)?, 0))
    }

    fn begin(&mut self) -> Result<()> {
        let Some(task) = self.task.as_mut() else {
            return Err(CoreError::InvalidState("Task is invalid".into()));
        };

        let (file, start_length) = Self::open_staging(&task.staging_path())?;
        task.progress.start_length = start_length;
        task.progress.saved_length = start_length;
        task.progress.downloaded_length = 0;
        self.file = Some(BufWriter::with_capacity(task.flush_size(), file));

        let request = DownloadRequest {
            uri: task.download_uri().to_string(),
            from_position: (start_length > 0).then_some(start_length),
            user_data: task.user_data().map(str::to_string),
            sink: SignalSink::new(self.ticket, self.signal_sender.clone()),
        };
        tracing::debug!(
            serial_id = task.serial_id(),
            uri = %request.uri,
            from_position = ?request.from_position,
            "download started"
        );
        let info = DownloadEventInfo::of(task);
        self.emit(DownloadEvent::Start(info));
        self.transport.download(request)
    }

    fn on_bytes(&mut self, data: Vec<u8>) {
        self.wait_time = 0.0;
        let Some(file) = self.file.as_mut() else {
            return;
        };
        if let Err(err) = file.write_all(&data) {
            self.fail(false, err.to_string());
            return;
        }

        let Some(task) = self.task.as_mut() else {
            return;
        };
        task.progress.saved_length += data.len() as u64;
        self.wait_flush_size += data.len();
        if self.wait_flush_size >= task.flush_size() {
            self.wait_flush_size = 0;
            if let Err(err) = file.flush() {
                self.fail(false, err.to_string());
            }
        }
    }

    fn on_length(&mut self, delta_length: u64) {
        self.wait_time = 0.0;
        let Some(task) = self.task.as_mut() else {
            return;
        };
        task.progress.downloaded_length += delta_length;
        let info = DownloadEventInfo::of(task);
        self.emit(DownloadEvent::Update { info, delta_length });
    }

    fn on_complete(&mut self, length: u64) -> Result<()> {
        self.wait_time = 0.0;
        let Some(task) = self.task.as_mut() else {
            return Ok(());
        };
        task.progress.downloaded_length = length;
        if !task.progress.is_consistent() {
            return Err(CoreError::InvalidState(format!(
                "Internal download error: saved {} bytes but expected {}",
                task.progress.saved_length,
                task.progress.current_length()
            )));
        }

        self.transport.reset();
        if let Err(err) = self.close_file() {
            self.fail(false, err.to_string());
            return Ok(());
        }

        if let Err(err) = Self::promote(self.task.as_ref()) {
            self.fail(false, err.to_string());
            return Ok(());
        }

        let Some(task) = self.task.as_mut() else {
            return Ok(());
        };
        task.status = TaskStatus::Done;
        tracing::info!(
            serial_id = task.serial_id(),
            path = %task.download_path().display(),
            length = task.progress.current_length(),
            "download complete"
        );
        let info = DownloadEventInfo::of(task);
        self.emit(DownloadEvent::Success(info));
        Ok(())
    }

    /// Replace any existing destination with the staging file
    fn promote(task: Option<&DownloadTask>) -> io::Result<()> {
        let Some(task) = task else {
            return Ok(());
        };
        let destination = task.download_path();
        if destination.exists() {
            fs::remove_file(destination)?;
        }
        fs::rename(task.staging_path(), destination)
    }

    fn fail(&mut self, delete_downloading: bool, message: String) {
        self.transport.reset();
        let _ = self.close_file();

        let Some(task) = self.task.as_mut() else {
            return;
        };
        if delete_downloading {
            if let Err(err) = fs::remove_file(task.staging_path()) {
                tracing::warn!(
                    serial_id = task.serial_id(),
                    error = %err,
                    "failed to delete staging file"
                );
            }
        }
        task.status = TaskStatus::Error;
        tracing::warn!(serial_id = task.serial_id(), error = %message, "download failed");
        let info = DownloadEventInfo::of(task);
        self.emit(DownloadEvent::Failure {
            info,
            error_message: message,
        });
    }

    fn close_file(&mut self) -> io::Result<()> {
        self.wait_flush_size = 0;
        match self.file.take() {
            Some(mut file) => file.flush(),
            None => Ok(()),
        }
    }

    fn handle_signal(&mut self, signal: TransportSignal) -> Result<()> {
        match signal {
            TransportSignal::Bytes(data) => self.on_bytes(data),
            TransportSignal::Length(delta_length) => self.on_length(delta_length),
            TransportSignal::Complete(length) => self.on_complete(length)?,
            TransportSignal::Error {
                delete_downloading,
                message,
            } => self.fail(delete_downloading, message),
        }
        Ok(())
    }

    /// Abandon the current request and forget its pending signals
    fn abandon_request(&mut self) {
        self.transport.reset();
        self.ticket += 1;
        while self.signal_receiver.try_recv().is_ok() {}
        let _ = self.close_file();
        self.wait_time = 0.0;
    }
}

impl TaskAgent<DownloadTask> for DownloadAgent {
    fn start(&mut self, mut task: DownloadTask) -> StartTaskStatus {
        self.abandon_request();
        task.status = TaskStatus::Doing;
        self.task = Some(task);

        match self.begin() {
            Ok(()) => StartTaskStatus::CanResume,
            Err(err) => {
                self.fail(false, err.to_string());
                StartTaskStatus::UnknownError
            }
        }
    }

    fn update(&mut self, _elapse_seconds: f32, real_elapse_seconds: f32) -> Result<()> {
        while let Ok((ticket, signal)) = self.signal_receiver.try_recv() {
            if ticket != self.ticket || !self.is_doing() {
                continue;
            }
            self.handle_signal(signal)?;
        }

        if !self.is_doing() {
            return Ok(());
        }

        self.wait_time += real_elapse_seconds;
        let timeout = self.task.as_ref().map_or(f32::MAX, DownloadTask::timeout);
        if self.wait_time >= timeout {
            self.fail(false, TIMEOUT_MESSAGE.to_string());
        }
        Ok(())
    }

    fn task(&self) -> Option<&DownloadTask> {
        self.task.as_ref()
    }

    fn reset(&mut self) -> Option<DownloadTask> {
        self.abandon_request();
        self.task.take()
    }

    fn shutdown(&mut self) {
        self.abandon_request();
        self.task = None;
        self.transport.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::event::DownloadEventKind;
    use crate::download::task::DownloadOptions;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Default)]
    struct Shared {
        requests: Vec<(String, Option<u64>, bool)>,
        sink: Option<SignalSink>,
        resets: usize,
    }

    #[derive(Clone, Default)]
    struct MemoryTransport {
        shared: Arc<Mutex<Shared>>,
    }

    impl MemoryTransport {
        fn sink(&self) -> SignalSink {
            self.shared.lock().sink.clone().unwrap()
        }
    }

    impl DownloadTransport for MemoryTransport {
        fn download(&mut self, request: DownloadRequest) -> Result<()> {
            let mut shared = self.shared.lock();
            let ranged = request.is_ranged();
            shared.requests.push((request.uri, request.from_position, ranged));
            shared.sink = Some(request.sink);
            Ok(())
        }

        fn reset(&mut self) {
            self.shared.lock().resets += 1;
        }
    }

    fn agent() -> (DownloadAgent, MemoryTransport, Receiver<DownloadEvent>) {
        let transport = MemoryTransport::default();
        let (tx, rx) = unbounded();
        (DownloadAgent::new(Box::new(transport.clone()), tx), transport, rx)
    }

    fn task(path: &Path, timeout: f32) -> DownloadTask {
        DownloadTask::new(path, "mem://file", DownloadOptions::default(), 4, timeout)
    }

    fn kinds(rx: &Receiver<DownloadEvent>) -> Vec<DownloadEventKind> {
        rx.try_iter().map(|e| e.kind()).collect()
    }

    #[test]
    fn test_complete_download_renames_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("file.bin");
        let (mut agent, transport, rx) = agent();

        assert_eq!(agent.start(task(&path, 30.0)), StartTaskStatus::CanResume);
        let sink = transport.sink();
        sink.bytes(b"hello ".to_vec());
        sink.length(6);
        sink.bytes(b"world".to_vec());
        sink.length(5);
        sink.complete(11);
        agent.update(0.1, 0.1).unwrap();

        assert!(agent.task().unwrap().is_done());
        assert_eq!(agent.task().unwrap().status(), TaskStatus::Done);
        assert_eq!(fs::read(&path).unwrap(), b"hello world");
        assert!(!path.with_extension("bin.download").exists());
        assert_eq!(
            kinds(&rx),
            vec![
                DownloadEventKind::Start,
                DownloadEventKind::Update,
                DownloadEventKind::Update,
                DownloadEventKind::Success
            ]
        );
    }

    #[test]
    fn test_resume_issues_ranged_request() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.bin");
        fs::write(dir.path().join("file.bin.download"), b"0123456789").unwrap();
        let (mut agent, transport, _rx) = agent();

        agent.start(task(&path, 30.0));
        assert_eq!(
            transport.shared.lock().requests,
            vec![("mem://file".to_string(), Some(10), true)]
        );

        let sink = transport.sink();
        sink.bytes(b"abc".to_vec());
        sink.length(3);
        sink.complete(3);
        agent.update(0.1, 0.1).unwrap();

        assert_eq!(agent.task().unwrap().progress().current_length(), 13);
        assert_eq!(fs::read(&path).unwrap(), b"0123456789abc");
    }

    #[test]
    fn test_fresh_start_requests_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let (mut agent, transport, _rx) = agent();

        agent.start(task(&dir.path().join("file.bin"), 30.0));
        assert_eq!(
            transport.shared.lock().requests,
            vec![("mem://file".to_string(), None, false)]
        );
    }

    #[test]
    fn test_bytes_reach_disk_once_flush_size_is_crossed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.bin");
        let staging = dir.path().join("file.bin.download");
        let (mut agent, transport, _rx) = agent();

        agent.start(task(&path, 30.0));
        let sink = transport.sink();
        sink.bytes(b"abc".to_vec());
        agent.update(0.1, 0.1).unwrap();
        assert_eq!(fs::metadata(&staging).unwrap().len(), 0);
        assert_eq!(agent.task().unwrap().progress().saved_length, 3);

        sink.bytes(b"def".to_vec());
        agent.update(0.1, 0.1).unwrap();
        assert_eq!(fs::metadata(&staging).unwrap().len(), 6);
        assert_eq!(fs::read(&staging).unwrap(), b"abcdef");
    }

    #[test]
    fn test_existing_destination_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.bin");
        fs::write(&path, b"stale").unwrap();
        let (mut agent, transport, _rx) = agent();

        agent.start(task(&path, 30.0));
        let sink = transport.sink();
        sink.bytes(b"new".to_vec());
        sink.complete(3);
        agent.update(0.1, 0.1).unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"new");
    }

    #[test]
    fn test_length_mismatch_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.bin");
        let (mut agent, transport, _rx) = agent();

        agent.start(task(&path, 30.0));
        let sink = transport.sink();
        sink.bytes(b"abc".to_vec());
        sink.complete(5);
        let err = agent.update(0.1, 0.1).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_watchdog_raises_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.bin");
        let (mut agent, transport, rx) = agent();

        agent.start(task(&path, 1.0));
        agent.update(0.6, 0.6).unwrap();
        assert_eq!(agent.task().unwrap().status(), TaskStatus::Doing);
        agent.update(0.6, 0.6).unwrap();
        assert_eq!(agent.task().unwrap().status(), TaskStatus::Error);

        let failure = rx
            .try_iter()
            .find(|e| e.kind() == DownloadEventKind::Failure)
            .unwrap();
        assert!(matches!(
            failure,
            DownloadEvent::Failure { ref error_message, .. } if error_message == TIMEOUT_MESSAGE
        ));
        assert!(transport.shared.lock().resets >= 1);
    }

    #[test]
    fn test_signals_reset_watchdog() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.bin");
        let (mut agent, transport, _rx) = agent();

        agent.start(task(&path, 1.0));
        agent.update(0.8, 0.8).unwrap();
        transport.sink().length(1);
        agent.update(0.5, 0.5).unwrap();
        assert_eq!(agent.task().unwrap().status(), TaskStatus::Doing);
        assert_eq!(agent.wait_time(), 0.5);
    }

    #[test]
    fn test_transport_error_deletes_staging_when_asked() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.bin");
        let (mut agent, transport, rx) = agent();

        agent.start(task(&path, 30.0));
        let staging = agent.task().unwrap().staging_path();
        assert!(staging.exists());
        transport.sink().error(true, "404");
        agent.update(0.1, 0.1).unwrap();

        assert_eq!(agent.task().unwrap().status(), TaskStatus::Error);
        assert!(!staging.exists());
        assert_eq!(kinds(&rx).last(), Some(&DownloadEventKind::Failure));
    }

    #[test]
    fn test_failed_staging_delete_still_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let (mut agent, transport, rx) = agent();

        agent.start(task(&dir.path().join("file.bin"), 30.0));
        fs::remove_file(agent.task().unwrap().staging_path()).unwrap();
        transport.sink().error(true, "gone");
        agent.update(0.1, 0.1).unwrap();

        assert_eq!(agent.task().unwrap().status(), TaskStatus::Error);
        let failure = rx.try_iter().last().unwrap();
        assert!(matches!(
            failure,
            DownloadEvent::Failure { ref error_message, .. } if error_message == "gone"
        ));
    }

    #[test]
    fn test_signals_from_abandoned_request_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let (mut agent, transport, _rx) = agent();

        agent.start(task(&dir.path().join("a.bin"), 30.0));
        let stale = transport.sink();
        agent.reset();

        agent.start(task(&dir.path().join("b.bin"), 30.0));
        stale.bytes(b"zzz".to_vec());
        stale.complete(3);
        agent.update(0.1, 0.1).unwrap();

        let task = agent.task().unwrap();
        assert_eq!(task.status(), TaskStatus::Doing);
        assert_eq!(task.progress().saved_length, 0);
    }
}
