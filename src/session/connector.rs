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

//! Opening interactive shells.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

use crate::ssh::known_hosts::{get_check_method, StrictHostKeyChecking};
use crate::ssh::proxy::ProxyCommandStream;
use crate::ssh::shell::SshShell;
use crate::ssh::tokio_client::{self, AuthMethod, Client};
use crate::ssh::{AuthContext, SecretCache};

use super::params::ConnectionParams;
use super::shell::RemoteShell;

/// Terminal type requested for every shell.
pub const TERM_TYPE: &str = "vt100";
/// PTY size requested for every shell. It is never resized.
pub const TERM_WIDTH: u32 = 80;
pub const TERM_HEIGHT: u32 = 24;

/// Opens an authenticated interactive shell for resolved parameters.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, params: &ConnectionParams) -> Result<Box<dyn RemoteShell>>;
}

/// Run-wide SSH options shared by every connection.
#[derive(Debug, Clone)]
pub struct SshConnectOptions {
    pub use_agent: bool,
    pub use_password: bool,
    pub strict_host_key_checking: StrictHostKeyChecking,
    /// `None` waits for as long as the connect takes
    pub connect_timeout: Option<Duration>,
    /// `None` disables keepalive messages
    pub server_alive_interval: Option<Duration>,
}

impl Default for SshConnectOptions {
    fn default() -> Self {
        Self {
            use_agent: false,
            use_password: false,
            strict_host_key_checking: StrictHostKeyChecking::default(),
            connect_timeout: Some(Duration::from_secs(30)),
            server_alive_interval: None,
        }
    }
}

/// [`Connector`] backed by russh.
#[derive(Debug, Clone, Default)]
pub struct SshConnector {
    options: SshConnectOptions,
    secrets: SecretCache,
}

impl SshConnector {
    pub fn new(options: SshConnectOptions) -> Self {
        Self {
            options,
            secrets: SecretCache::new(),
        }
    }

    /// Pick the authentication method for `params`. Any password or
    /// passphrase prompt happens here, at most once per run.
    fn auth_method(&self, params: &ConnectionParams) -> Result<AuthMethod> {
        AuthContext::new(params.effective_user(), params.resolved_host.clone())
            .with_key_path(params.identity_file.clone())
            .with_agent(self.options.use_agent)
            .with_password(self.options.use_password)
            .with_secrets(self.secrets.clone())
            .determine_method()
    }

    fn client_config(&self) -> tokio_client::Config {
        tokio_client::Config {
            keepalive_interval: self.options.server_alive_interval,
            ..Default::default()
        }
    }

    async fn open_client(&self, params: &ConnectionParams, auth: AuthMethod) -> Result<Client> {
        let username = params.effective_user();
        let port = params.effective_port();
        let check = get_check_method(self.options.strict_host_key_checking);
        let config = self.client_config();

        let client = match &params.proxy_command {
            Some(command) => {
                tracing::debug!("Connecting to {} through ProxyCommand: {}", params.hostname, command);
                let stream = ProxyCommandStream::spawn(command).map_err(|source| {
                    tokio_client::Error::ProxyCommandFailed {
                        command: command.clone(),
                        source,
                    }
                })?;
                Client::connect_stream(
                    stream,
                    &params.resolved_host,
                    port,
                    &username,
                    auth,
                    check,
                    config,
                )
                .await?
            }
            None => {
                Client::connect_with_config(
                    &params.resolved_host,
                    port,
                    &username,
                    auth,
                    check,
                    config,
                )
                .await?
            }
        };

        Ok(client)
    }
}

#[async_trait]
impl Connector for SshConnector {
    async fn connect(&self, params: &ConnectionParams) -> Result<Box<dyn RemoteShell>> {
        // Prompts must not eat into the connect timeout.
        let auth = self.auth_method(params)?;

        let client = match self.options.connect_timeout {
            Some(limit) => tokio::time::timeout(limit, self.open_client(params, auth))
                .await
                .with_context(|| {
                    format!("Connection timed out after {} seconds", limit.as_secs())
                })??,
            None => self.open_client(params, auth).await?,
        };

        tracing::info!(
            "Connected to {} as {}",
            client.get_connection_address(),
            client.get_connection_username()
        );

        let channel = match client
            .request_interactive_shell(TERM_TYPE, TERM_WIDTH, TERM_HEIGHT)
            .await
        {
            Ok(channel) => channel,
            Err(e) => {
                let _ = client.disconnect().await;
                return Err(e).context("Failed to open interactive shell");
            }
        };

        Ok(Box::new(SshShell::spawn(
            params.hostname.clone(),
            client,
            channel,
        )))
    }
}
