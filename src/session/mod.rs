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

//! Multi-host interactive session management.
//!
//! Hosts are resolved through [`ConnectionResolver`], opened by a
//! [`Connector`] and kept in a [`SessionManager`], which broadcasts input to
//! the active hosts and drains their buffered output.

pub mod connector;
pub mod error;
pub mod manager;
pub mod params;
pub mod resolver;
pub mod shell;

pub use connector::{Connector, SshConnectOptions, SshConnector};
pub use error::{SessionError, ShellError};
pub use manager::{BroadcastReport, DrainReport, Session, SessionManager, DRAIN_CHUNK_SIZE};
pub use params::{ConnectionDefaults, ConnectionParams, DEFAULT_SSH_PORT};
pub use resolver::ConnectionResolver;
pub use shell::{OutputStream, RemoteShell};
