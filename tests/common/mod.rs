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

//! In-memory transport shared by the integration tests.

#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use simulssh::session::{
    ConnectionParams, ConnectionResolver, Connector, OutputStream, RemoteShell, SessionManager,
    ShellError,
};

/// What one mock host has seen and what it has queued for reading.
#[derive(Debug, Default)]
pub struct MockHost {
    pub sent: Vec<Vec<u8>>,
    pub stdout: VecDeque<u8>,
    pub stderr: VecDeque<u8>,
    pub reads: usize,
    pub fail_send: bool,
    pub failure: Option<String>,
    pub channel_closed: bool,
    pub disconnected: bool,
}

/// Hosts known to the mock connector plus an ordered log of teardown calls.
#[derive(Default)]
pub struct MockNetwork {
    pub hosts: Mutex<HashMap<String, Arc<Mutex<MockHost>>>>,
    pub unreachable: Mutex<HashSet<String>>,
    pub connects: Mutex<Vec<ConnectionParams>>,
    pub events: Arc<Mutex<Vec<String>>>,
}

impl MockNetwork {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn make_unreachable(&self, host: &str) {
        self.unreachable.lock().unwrap().insert(host.to_string());
    }

    pub fn host(&self, host: &str) -> Arc<Mutex<MockHost>> {
        self.hosts
            .lock()
            .unwrap()
            .get(host)
            .cloned()
            .unwrap_or_else(|| panic!("{host} was never connected"))
    }

    /// Queue output as if the remote shell had printed it.
    pub fn push_stdout(&self, host: &str, data: &[u8]) {
        self.host(host).lock().unwrap().stdout.extend(data);
    }

    pub fn push_stderr(&self, host: &str, data: &[u8]) {
        self.host(host).lock().unwrap().stderr.extend(data);
    }

    /// Everything written to `host`, one entry per send.
    pub fn sent(&self, host: &str) -> Vec<String> {
        self.host(host)
            .lock()
            .unwrap()
            .sent
            .iter()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .collect()
    }

    pub fn reads(&self, host: &str) -> usize {
        self.host(host).lock().unwrap().reads
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn connect_count(&self) -> usize {
        self.connects.lock().unwrap().len()
    }
}

pub struct MockConnector {
    pub network: Arc<MockNetwork>,
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, params: &ConnectionParams) -> Result<Box<dyn RemoteShell>> {
        self.network.connects.lock().unwrap().push(params.clone());

        if self
            .network
            .unreachable
            .lock()
            .unwrap()
            .contains(&params.hostname)
        {
            anyhow::bail!("No route to host {}", params.resolved_host);
        }

        let state = Arc::new(Mutex::new(MockHost::default()));
        self.network
            .hosts
            .lock()
            .unwrap()
            .insert(params.hostname.clone(), state.clone());

        Ok(Box::new(MockShell {
            host: params.hostname.clone(),
            state,
            events: self.network.events.clone(),
        }))
    }
}

pub struct MockShell {
    host: String,
    state: Arc<Mutex<MockHost>>,
    events: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl RemoteShell for MockShell {
    async fn send(&mut self, data: &[u8]) -> Result<(), ShellError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_send || state.channel_closed {
            return Err(ShellError::Closed);
        }
        state.sent.push(data.to_vec());
        Ok(())
    }

    fn buffered(&self, stream: OutputStream) -> usize {
        let state = self.state.lock().unwrap();
        match stream {
            OutputStream::Stdout => state.stdout.len(),
            OutputStream::Stderr => state.stderr.len(),
        }
    }

    fn read(&mut self, stream: OutputStream, max: usize) -> Result<Vec<u8>, ShellError> {
        let mut state = self.state.lock().unwrap();
        state.reads += 1;
        let buffer = match stream {
            OutputStream::Stdout => &mut state.stdout,
            OutputStream::Stderr => &mut state.stderr,
        };
        let count = max.min(buffer.len());
        Ok(buffer.drain(..count).collect())
    }

    fn take_failure(&mut self) -> Option<ShellError> {
        self.state.lock().unwrap().failure.take().map(ShellError::Failed)
    }

    async fn close_channel(&mut self) -> Result<(), ShellError> {
        self.state.lock().unwrap().channel_closed = true;
        self.events
            .lock()
            .unwrap()
            .push(format!("close_channel {}", self.host));
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), ShellError> {
        self.state.lock().unwrap().disconnected = true;
        self.events
            .lock()
            .unwrap()
            .push(format!("disconnect {}", self.host));
        Ok(())
    }
}

pub fn manager(network: &Arc<MockNetwork>) -> SessionManager {
    manager_with_resolver(network, ConnectionResolver::default())
}

pub fn manager_with_resolver(
    network: &Arc<MockNetwork>,
    resolver: ConnectionResolver,
) -> SessionManager {
    SessionManager::new(
        resolver,
        Arc::new(MockConnector {
            network: network.clone(),
        }),
    )
}

/// A manager with every host in `hosts` connected and active.
pub async fn connected(hosts: &[&str]) -> (SessionManager, Arc<MockNetwork>) {
    let network = MockNetwork::new();
    let mut manager = manager(&network);
    for host in hosts {
        manager.connect(host).await.unwrap();
    }
    (manager, network)
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
