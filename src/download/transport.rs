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

//! Boundary between a download agent and the transport moving the bytes.
//!
//! Transports may run on any thread. They never call back into the agent;
//! they push [`TransportSignal`]s through a [`SignalSink`] and the agent
//! drains them once per tick on the owning thread.

use crossbeam::channel::Sender;

use crate::error::Result;

/// Progress reported by a transport
#[derive(Debug, Clone, PartialEq)]
pub enum TransportSignal {
    /// Payload chunk to append to the staging file
    Bytes(Vec<u8>),
    /// Number of bytes received since the previous `Length`
    Length(u64),
    /// Request finished; total bytes received by this request
    Complete(u64),
    /// Request failed
    Error {
        delete_downloading: bool,
        message: String,
    },
}

/// Cloneable, `Send` handle a transport uses to report progress.
///
/// Each request gets a sink stamped with its own ticket; signals from a
/// request the agent already abandoned are discarded on arrival.
#[derive(Debug, Clone)]
pub struct SignalSink {
    ticket: u64,
    sender: Sender<(u64, TransportSignal)>,
}

impl SignalSink {
    pub(crate) fn new(ticket: u64, sender: Sender<(u64, TransportSignal)>) -> Self {
        Self { ticket, sender }
    }

    /// Returns false once the agent is gone
    pub fn send(&self, signal: TransportSignal) -> bool {
        self.sender.send((self.ticket, signal)).is_ok()
    }

    pub fn bytes(&self, data: impl Into<Vec<u8>>) -> bool {
        self.send(TransportSignal::Bytes(data.into()))
    }

    pub fn length(&self, delta_length: u64) -> bool {
        self.send(TransportSignal::Length(delta_length))
    }

    pub fn complete(&self, length: u64) -> bool {
        self.send(TransportSignal::Complete(length))
    }

    pub fn error(&self, delete_downloading: bool, message: impl Into<String>) -> bool {
        self.send(TransportSignal::Error {
            delete_downloading,
            message: message.into(),
        })
    }
}

/// One retrieval handed to a transport
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub uri: String,
    /// Resume offset; `None` requests the whole resource
    pub from_position: Option<u64>,
    pub user_data: Option<String>,
    pub sink: SignalSink,
}

impl DownloadRequest {
    pub fn is_ranged(&self) -> bool {
        self.from_position.is_some()
    }
}

/// Side-effecting helper bound 1:1 to a download agent
pub trait DownloadTransport {
    /// Begin a request. An error fails the task immediately.
    fn download(&mut self, request: DownloadRequest) -> Result<()>;

    /// Abandon the current request, if any
    fn reset(&mut self);

    fn shutdown(&mut self) {}
}
