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

//! Session registry, active set and group registry.
//!
//! [`SessionManager`] owns one [`Session`] per connected host. The active set
//! and the groups only hold host identifiers. Every mutation validates all of
//! its arguments first and leaves the state untouched when any is unknown.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Write};
use std::sync::Arc;

use super::connector::Connector;
use super::error::SessionError;
use super::params::ConnectionParams;
use super::resolver::ConnectionResolver;
use super::shell::{OutputStream, RemoteShell};

/// Largest chunk taken from a stream per read during a drain.
pub const DRAIN_CHUNK_SIZE: usize = 1024;

/// One host's live connection and interactive channel.
pub struct Session {
    params: ConnectionParams,
    shell: Box<dyn RemoteShell>,
}

impl Session {
    pub fn new(params: ConnectionParams, shell: Box<dyn RemoteShell>) -> Self {
        Self { params, shell }
    }

    pub fn params(&self) -> &ConnectionParams {
        &self.params
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Outcome of a broadcast. Every active host is attempted.
#[derive(Debug, Default)]
pub struct BroadcastReport {
    pub delivered: Vec<String>,
    pub failures: Vec<SessionError>,
}

/// Outcome of a drain.
#[derive(Debug, Default)]
pub struct DrainReport {
    /// Hosts that had at least one byte ready
    pub hosts_with_output: Vec<String>,
    pub bytes: usize,
    pub failures: Vec<SessionError>,
}

/// Owner of every session plus the operator's host selections.
pub struct SessionManager {
    resolver: ConnectionResolver,
    connector: Arc<dyn Connector>,
    sessions: BTreeMap<String, Session>,
    active: BTreeSet<String>,
    groups: BTreeMap<String, BTreeSet<String>>,
}

impl SessionManager {
    pub fn new(resolver: ConnectionResolver, connector: Arc<dyn Connector>) -> Self {
        Self {
            resolver,
            connector,
            sessions: BTreeMap::new(),
            active: BTreeSet::new(),
            groups: BTreeMap::new(),
        }
    }

    /// Resolve `host`, open its shell and register it as active.
    ///
    /// Connecting an already registered host does nothing.
    pub async fn connect(&mut self, host: &str) -> Result<(), SessionError> {
        if self.sessions.contains_key(host) {
            tracing::debug!("{} is already connected", host);
            return Ok(());
        }

        let params = self.resolver.resolve(host);
        let shell = self
            .connector
            .connect(&params)
            .await
            .map_err(|source| SessionError::Connection {
                host: host.to_string(),
                source,
            })?;

        self.sessions
            .insert(host.to_string(), Session::new(params, shell));
        self.active.insert(host.to_string());
        Ok(())
    }

    pub fn is_connected(&self, host: &str) -> bool {
        self.sessions.contains_key(host)
    }

    /// Every registered host, sorted.
    pub fn hosts(&self) -> impl Iterator<Item = &str> {
        self.sessions.keys().map(String::as_str)
    }

    pub fn session(&self, host: &str) -> Option<&Session> {
        self.sessions.get(host)
    }

    /// Active hosts, sorted.
    pub fn active_hosts(&self) -> Vec<&str> {
        self.active.iter().map(String::as_str).collect()
    }

    pub fn is_group(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    /// Check every host against the registry. Unknown names are reported
    /// once each, in the order given.
    fn validate<S: AsRef<str>>(&self, hosts: &[S]) -> Result<BTreeSet<String>, SessionError> {
        let mut unknown: Vec<String> = Vec::new();
        let mut valid = BTreeSet::new();

        for host in hosts {
            let host = host.as_ref();
            if self.sessions.contains_key(host) {
                valid.insert(host.to_string());
            } else if !unknown.iter().any(|h| h == host) {
                unknown.push(host.to_string());
            }
        }

        if unknown.is_empty() {
            Ok(valid)
        } else {
            Err(SessionError::InvalidHost(unknown))
        }
    }

    /// Make every registered host active.
    pub fn switch_all(&mut self) {
        self.active = self.sessions.keys().cloned().collect();
    }

    /// Make the members of group `name` the active set.
    pub fn switch_to_group(&mut self, name: &str) -> Result<(), SessionError> {
        let members = self
            .groups
            .get(name)
            .ok_or_else(|| SessionError::InvalidGroup(name.to_string()))?;
        self.active = members.clone();
        Ok(())
    }

    /// Replace the active set with exactly `hosts`.
    pub fn switch_to<S: AsRef<str>>(&mut self, hosts: &[S]) -> Result<(), SessionError> {
        self.active = self.validate(hosts)?;
        Ok(())
    }

    pub fn add<S: AsRef<str>>(&mut self, hosts: &[S]) -> Result<(), SessionError> {
        let hosts = self.validate(hosts)?;
        self.active.extend(hosts);
        Ok(())
    }

    /// Deactivate `hosts`. Their sessions stay open.
    pub fn remove<S: AsRef<str>>(&mut self, hosts: &[S]) -> Result<(), SessionError> {
        let hosts = self.validate(hosts)?;
        self.active.retain(|host| !hosts.contains(host));
        Ok(())
    }

    /// Create or overwrite group `name`.
    pub fn define_group<S: AsRef<str>>(
        &mut self,
        name: &str,
        hosts: &[S],
    ) -> Result<(), SessionError> {
        let members = self.validate(hosts)?;
        if self.groups.insert(name.to_string(), members).is_some() {
            tracing::debug!("Group {} redefined", name);
        }
        Ok(())
    }

    /// Groups sorted by name, members sorted.
    pub fn list_groups(&self) -> Vec<(&str, Vec<&str>)> {
        self.groups
            .iter()
            .map(|(name, members)| {
                (
                    name.as_str(),
                    members.iter().map(String::as_str).collect(),
                )
            })
            .collect()
    }

    /// Send `command` plus a newline to every active host.
    pub async fn broadcast(&mut self, command: &str) -> BroadcastReport {
        let line = format!("{command}\n");
        let mut report = BroadcastReport::default();

        for host in &self.active {
            let Some(session) = self.sessions.get_mut(host) else {
                continue;
            };
            match session.shell.send(line.as_bytes()).await {
                Ok(()) => report.delivered.push(host.clone()),
                Err(source) => {
                    tracing::warn!("Failed to send command to {}: {}", host, source);
                    report.failures.push(SessionError::Send {
                        host: host.clone(),
                        source,
                    });
                }
            }
        }

        report
    }

    /// Write whatever output the active hosts have produced so far.
    ///
    /// Each stream that has data gets a `***STDOUT from HOST***` or
    /// `***STDERR from HOST***` header followed by the raw bytes. Silent
    /// streams produce nothing. Only the bytes buffered when a stream is
    /// reached are taken, so a host that keeps printing cannot stall it.
    pub fn drain<W: Write>(&mut self, out: &mut W) -> io::Result<DrainReport> {
        let mut report = DrainReport::default();

        for host in &self.active {
            let Some(session) = self.sessions.get_mut(host) else {
                continue;
            };

            let mut produced = false;
            let mut failure = None;

            for stream in OutputStream::ALL {
                // Output arriving during the drain waits for the next one.
                let pending = session.shell.buffered(stream);
                if pending == 0 {
                    continue;
                }
                writeln!(out, "***{} from {}***", stream.label(), host)?;
                produced = true;

                let mut remaining = pending;
                let mut last_byte = None;
                while remaining > 0 {
                    match session.shell.read(stream, DRAIN_CHUNK_SIZE.min(remaining)) {
                        Ok(chunk) if chunk.is_empty() => break,
                        Ok(chunk) => {
                            out.write_all(&chunk)?;
                            remaining = remaining.saturating_sub(chunk.len());
                            report.bytes += chunk.len();
                            last_byte = chunk.last().copied();
                        }
                        Err(source) => {
                            failure = Some(source);
                            break;
                        }
                    }
                }
                if last_byte.is_some_and(|b| b != b'\n') {
                    writeln!(out)?;
                }
                if failure.is_some() {
                    break;
                }
            }

            if produced {
                report.hosts_with_output.push(host.clone());
            }

            if let Some(source) = failure.or_else(|| session.shell.take_failure()) {
                tracing::warn!("Failed to read from {}: {}", host, source);
                report.failures.push(SessionError::Read {
                    host: host.clone(),
                    source,
                });
            }
        }

        out.flush()?;
        Ok(report)
    }

    /// Close every channel, then every transport, across all registered
    /// hosts. The registry is empty afterwards.
    pub async fn close_all(&mut self) -> Vec<SessionError> {
        let mut failures = Vec::new();

        for (host, session) in self.sessions.iter_mut() {
            if let Err(source) = session.shell.close_channel().await {
                failures.push(SessionError::Close {
                    host: host.clone(),
                    source,
                });
            }
        }

        for (host, session) in self.sessions.iter_mut() {
            if let Err(source) = session.shell.disconnect().await {
                failures.push(SessionError::Close {
                    host: host.clone(),
                    source,
                });
            }
        }

        for failure in &failures {
            tracing::debug!("{}", failure);
        }

        self.sessions.clear();
        self.active.clear();
        failures
    }
}
