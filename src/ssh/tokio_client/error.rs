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

//! Error type for the SSH client wrapper.

use std::io;
use thiserror::Error;

/// Failures raised while connecting, authenticating or talking to a remote host.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("Key authentication failed")]
    KeyAuthFailed,
    #[error("Unable to load key, bad password or invalid key: {0}")]
    KeyInvalid(#[source] russh::keys::Error),
    #[error("Wrong password")]
    PasswordWrong,
    #[error("Invalid address was provided: {0}")]
    AddressInvalid(#[source] io::Error),
    #[error("SSH protocol error: {0}")]
    SshError(#[from] russh::Error),
    #[error("Host key verification failed for {0}")]
    ServerCheckFailed(String),
    #[error("Host key for {0} has changed; refusing to connect")]
    ServerKeyChanged(String),
    #[error("Failed to connect to SSH agent")]
    AgentConnectionFailed,
    #[error("Failed to request identities from SSH agent")]
    AgentRequestIdentitiesFailed,
    #[error("SSH agent has no identities")]
    AgentNoIdentities,
    #[error("SSH agent authentication failed")]
    AgentAuthenticationFailed,
    #[error("Failed to start ProxyCommand '{command}': {source}")]
    ProxyCommandFailed {
        command: String,
        #[source]
        source: io::Error,
    },
}
