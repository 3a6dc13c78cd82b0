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

//! Error types for session management.

use thiserror::Error;

/// Failure of a single interactive shell channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShellError {
    /// The remote side closed the channel, or it was closed locally
    #[error("channel closed")]
    Closed,
    /// The channel or its transport reported an error
    #[error("{0}")]
    Failed(String),
}

/// Errors reported by [`SessionManager`](super::SessionManager) operations.
///
/// `Connection` is fatal during startup. Every other variant is recoverable:
/// registries are left unchanged and the operator may re-issue the command.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to connect to {host}: {source:#}")]
    Connection {
        host: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Invalid host(s): {}", .0.join(", "))]
    InvalidHost(Vec<String>),

    #[error("Invalid group: {0}")]
    InvalidGroup(String),

    #[error("Failed to send command to {host}: {source}")]
    Send {
        host: String,
        #[source]
        source: ShellError,
    },

    #[error("Failed to read from {host}: {source}")]
    Read {
        host: String,
        #[source]
        source: ShellError,
    },

    #[error("Failed to close session on {host}: {source}")]
    Close {
        host: String,
        #[source]
        source: ShellError,
    },
}

impl SessionError {
    /// Host the error refers to, when it concerns a single host.
    pub fn host(&self) -> Option<&str> {
        match self {
            Self::Connection { host, .. }
            | Self::Send { host, .. }
            | Self::Read { host, .. }
            | Self::Close { host, .. } => Some(host),
            Self::InvalidHost(_) | Self::InvalidGroup(_) => None,
        }
    }
}
