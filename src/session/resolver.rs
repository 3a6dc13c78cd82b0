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

//! Host identifier to connection parameter resolution.

use crate::config::expand_tilde;
use crate::ssh::ssh_config::SshConfig;

use super::params::{ConnectionDefaults, ConnectionParams};

/// Looks host identifiers up in the ssh config and overlays what it finds
/// onto the run-wide defaults.
#[derive(Debug, Clone, Default)]
pub struct ConnectionResolver {
    ssh_config: SshConfig,
    defaults: ConnectionDefaults,
}

impl ConnectionResolver {
    pub fn new(ssh_config: SshConfig, defaults: ConnectionDefaults) -> Self {
        Self {
            ssh_config,
            defaults,
        }
    }

    /// Resolve `host`. Never fails: a host absent from the ssh config gets
    /// the defaults and its identifier as the address.
    pub fn resolve(&self, host: &str) -> ConnectionParams {
        let entry = self.ssh_config.find_host_config(host);
        let mut params = ConnectionParams::new(host);

        if let Some(hostname) = entry.hostname.as_deref() {
            params.resolved_host = expand_tokens(hostname, host, host, None, None);
        }
        params.username = entry.user.or_else(|| self.defaults.user.clone());
        params.port = entry.port.or(self.defaults.port);
        params.identity_file = entry
            .identity_files
            .first()
            .map(|path| expand_tilde(path))
            .or_else(|| self.defaults.identity_file.as_deref().map(expand_tilde));

        params.proxy_command = entry
            .proxy_command
            .filter(|command| !command.eq_ignore_ascii_case("none"))
            .map(|command| {
                let user = params.effective_user();
                expand_tokens(
                    &command,
                    &params.resolved_host,
                    host,
                    Some(params.effective_port()),
                    Some(&user),
                )
            });

        tracing::debug!(
            "Resolved {} to {}:{} (user: {:?}, proxy: {:?})",
            host,
            params.resolved_host,
            params.effective_port(),
            params.username,
            params.proxy_command
        );

        params
    }
}

/// Expand `%h`, `%n`, `%p`, `%r` and `%%`. Unknown tokens are left as they are.
fn expand_tokens(
    template: &str,
    host: &str,
    alias: &str,
    port: Option<u16>,
    user: Option<&str>,
) -> String {
    let mut result = String::with_capacity(template.len());
    let mut chars = template.chars();

    while let Some(c) = chars.next() {
        if c != '%' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('%') => result.push('%'),
            Some('h') => result.push_str(host),
            Some('n') => result.push_str(alias),
            Some('p') => match port {
                Some(port) => result.push_str(&port.to_string()),
                None => result.push_str("%p"),
            },
            Some('r') => match user {
                Some(user) => result.push_str(user),
                None => result.push_str("%r"),
            },
            Some(other) => {
                result.push('%');
                result.push(other);
            }
            None => result.push('%'),
        }
    }

    result
}
