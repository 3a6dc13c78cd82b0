// Copyright 2025 Lablup Inc. and Jeongkyu Shin
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

//! The channel abstraction a session drives.

use async_trait::async_trait;

use super::error::ShellError;

/// One of the two output streams of an interactive channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

impl OutputStream {
    pub const ALL: [OutputStream; 2] = [OutputStream::Stdout, OutputStream::Stderr];

    /// Label used in drain headers.
    pub fn label(self) -> &'static str {
        match self {
            OutputStream::Stdout => "STDOUT",
            OutputStream::Stderr => "STDERR",
        }
    }
}

/// A connected transport plus its interactive shell channel.
///
/// `ready` and `read` never wait for the network: they only look at bytes
/// that have already arrived.
#[async_trait]
pub trait RemoteShell: Send {
    /// Write `data` to the channel as one send.
    async fn send(&mut self, data: &[u8]) -> Result<(), ShellError>;

    /// Number of bytes currently buffered on `stream`.
    fn buffered(&self, stream: OutputStream) -> usize;

    /// Whether `stream` has buffered bytes.
    fn ready(&self, stream: OutputStream) -> bool {
        self.buffered(stream) > 0
    }

    /// Take up to `max` buffered bytes from `stream`. Returns an empty
    /// vector when nothing is buffered.
    fn read(&mut self, stream: OutputStream, max: usize) -> Result<Vec<u8>, ShellError>;

    /// Takes the transport failure recorded since the last call, if any.
    /// A cleanly closed channel is not a failure.
    fn take_failure(&mut self) -> Option<ShellError>;

    /// Close the shell channel.
    async fn close_channel(&mut self) -> Result<(), ShellError>;

    /// Close the underlying transport.
    async fn disconnect(&mut self) -> Result<(), ShellError>;
}
