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

//! Interactive shell channel over russh.
//!
//! A russh [`Channel`] must be polled to receive data, so each shell owns a
//! background pump task. The pump moves incoming stdout/stderr bytes into
//! shared buffers and performs writes and close requests on behalf of the
//! session. Readers only look at the buffers and never wait.

use async_trait::async_trait;
use russh::client::Msg;
use russh::{Channel, ChannelMsg};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::session::{OutputStream, RemoteShell, ShellError};

use super::tokio_client::Client;

/// SSH extended data type code for stderr
const SSH_EXTENDED_DATA_STDERR: u32 = 1;

/// Capacity of the request queue between a shell and its pump
const REQUEST_QUEUE_SIZE: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
enum ChannelState {
    Open,
    Closed,
    Failed(String),
}

#[derive(Debug)]
struct ShellBuffers {
    stdout: VecDeque<u8>,
    stderr: VecDeque<u8>,
    state: ChannelState,
}

impl ShellBuffers {
    fn new() -> Self {
        Self {
            stdout: VecDeque::new(),
            stderr: VecDeque::new(),
            state: ChannelState::Open,
        }
    }

    fn stream(&mut self, stream: OutputStream) -> &mut VecDeque<u8> {
        match stream {
            OutputStream::Stdout => &mut self.stdout,
            OutputStream::Stderr => &mut self.stderr,
        }
    }

    fn close(&mut self) {
        if self.state == ChannelState::Open {
            self.state = ChannelState::Closed;
        }
    }

    fn fail(&mut self, reason: String) {
        self.state = ChannelState::Failed(reason);
    }

    fn take_failure(&mut self) -> Option<String> {
        match std::mem::replace(&mut self.state, ChannelState::Closed) {
            ChannelState::Failed(reason) => Some(reason),
            other => {
                self.state = other;
                None
            }
        }
    }

    /// Apply one event from the channel. Returns `false` once the channel
    /// is gone.
    fn route(&mut self, host: &str, msg: Option<ChannelMsg>) -> bool {
        match msg {
            Some(ChannelMsg::Data { ref data }) => {
                self.stdout.extend(data.iter());
            }
            Some(ChannelMsg::ExtendedData { ref data, ext }) => {
                if ext == SSH_EXTENDED_DATA_STDERR {
                    self.stderr.extend(data.iter());
                }
            }
            Some(ChannelMsg::Eof) => {
                tracing::debug!("Received EOF from {}", host);
            }
            Some(ChannelMsg::ExitStatus { exit_status }) => {
                tracing::debug!("Shell on {} exited with status {}", host, exit_status);
            }
            Some(ChannelMsg::Close) => {
                tracing::debug!("Shell channel to {} closed", host);
                self.close();
                return false;
            }
            None => {
                tracing::debug!("Connection to {} dropped without closing the channel", host);
                if self.state == ChannelState::Open {
                    self.fail("connection lost".to_string());
                }
                return false;
            }
            Some(_) => {}
        }
        true
    }
}

type SharedBuffers = Arc<Mutex<ShellBuffers>>;

fn lock(buffers: &SharedBuffers) -> MutexGuard<'_, ShellBuffers> {
    buffers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

enum ShellRequest {
    Data(Vec<u8>, oneshot::Sender<Result<(), ShellError>>),
    Close(oneshot::Sender<Result<(), ShellError>>),
}

/// Live interactive shell on one host.
pub struct SshShell {
    host: String,
    client: Client,
    buffers: SharedBuffers,
    requests: mpsc::Sender<ShellRequest>,
    pump: Option<JoinHandle<()>>,
}

impl SshShell {
    /// Start pumping `channel`. The shell takes ownership of both the
    /// channel and the connection it belongs to.
    pub fn spawn(host: String, client: Client, channel: Channel<Msg>) -> Self {
        let buffers = Arc::new(Mutex::new(ShellBuffers::new()));
        let (requests, receiver) = mpsc::channel(REQUEST_QUEUE_SIZE);
        let pump = tokio::spawn(pump(host.clone(), channel, buffers.clone(), receiver));

        Self {
            host,
            client,
            buffers,
            requests,
            pump: Some(pump),
        }
    }

    async fn request(
        &self,
        make: impl FnOnce(oneshot::Sender<Result<(), ShellError>>) -> ShellRequest,
    ) -> Result<(), ShellError> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(make(reply))
            .await
            .map_err(|_| ShellError::Closed)?;
        response.await.map_err(|_| ShellError::Closed)?
    }
}

#[async_trait]
impl RemoteShell for SshShell {
    async fn send(&mut self, data: &[u8]) -> Result<(), ShellError> {
        let data = data.to_vec();
        self.request(|reply| ShellRequest::Data(data, reply)).await
    }

    fn buffered(&self, stream: OutputStream) -> usize {
        lock(&self.buffers).stream(stream).len()
    }

    fn read(&mut self, stream: OutputStream, max: usize) -> Result<Vec<u8>, ShellError> {
        let mut buffers = lock(&self.buffers);
        let buffer = buffers.stream(stream);
        let count = max.min(buffer.len());
        Ok(buffer.drain(..count).collect())
    }

    fn take_failure(&mut self) -> Option<ShellError> {
        lock(&self.buffers).take_failure().map(ShellError::Failed)
    }

    async fn close_channel(&mut self) -> Result<(), ShellError> {
        let result = match self.request(ShellRequest::Close).await {
            // Already closed by the remote side
            Err(ShellError::Closed) => Ok(()),
            other => other,
        };
        if let Some(pump) = self.pump.take() {
            if let Err(e) = pump.await {
                tracing::debug!("Shell pump for {} ended abnormally: {}", self.host, e);
            }
        }
        result
    }

    async fn disconnect(&mut self) -> Result<(), ShellError> {
        if self.client.is_closed() {
            return Ok(());
        }
        self.client
            .disconnect()
            .await
            .map_err(|e| ShellError::Failed(e.to_string()))
    }
}

impl Drop for SshShell {
    fn drop(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
    }
}

async fn pump(
    host: String,
    mut channel: Channel<Msg>,
    buffers: SharedBuffers,
    mut requests: mpsc::Receiver<ShellRequest>,
) {
    loop {
        tokio::select! {
            msg = channel.wait() => {
                if !lock(&buffers).route(&host, msg) {
                    break;
                }
            }

            request = requests.recv() => {
                match request {
                    Some(ShellRequest::Data(data, reply)) => {
                        // Send failures are not recorded in the channel state.
                        let result = channel
                            .data(data.as_slice())
                            .await
                            .map_err(|e| ShellError::Failed(e.to_string()));
                        let _ = reply.send(result);
                    }
                    Some(ShellRequest::Close(reply)) => {
                        let result = channel
                            .close()
                            .await
                            .map_err(|e| ShellError::Failed(e.to_string()));
                        lock(&buffers).close();
                        let _ = reply.send(result);
                        break;
                    }
                    None => break,
                }
            }
        }
    }
}
