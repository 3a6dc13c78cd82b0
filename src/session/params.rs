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

//! Resolved connection parameters.

use std::path::PathBuf;

/// Default SSH port.
pub const DEFAULT_SSH_PORT: u16 = 22;

/// Fallback values applied when the ssh config has no entry for a host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionDefaults {
    pub user: Option<String>,
    pub port: Option<u16>,
    pub identity_file: Option<PathBuf>,
}

/// Everything needed to open a session to one host.
///
/// Produced once per host at connect time and not modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    /// Host identifier as given by the operator
    pub hostname: String,
    /// Address actually connected to (`HostName`, or the identifier itself)
    pub resolved_host: String,
    pub username: Option<String>,
    pub port: Option<u16>,
    pub proxy_command: Option<String>,
    pub identity_file: Option<PathBuf>,
}

impl ConnectionParams {
    /// Parameters for a host with no configuration at all.
    pub fn new(hostname: impl Into<String>) -> Self {
        let hostname = hostname.into();
        Self {
            resolved_host: hostname.clone(),
            hostname,
            username: None,
            port: None,
            proxy_command: None,
            identity_file: None,
        }
    }

    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_SSH_PORT)
    }

    /// Login name, falling back to the local user.
    pub fn effective_user(&self) -> String {
        self.username
            .clone()
            .unwrap_or_else(crate::config::get_current_username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_identifier_as_address() {
        let params = ConnectionParams::new("web1");
        assert_eq!(params.hostname, "web1");
        assert_eq!(params.resolved_host, "web1");
        assert_eq!(params.effective_port(), 22);
        assert!(params.proxy_command.is_none());
    }

    #[test]
    fn test_effective_user_prefers_configured_name() {
        let mut params = ConnectionParams::new("web1");
        params.username = Some("deploy".to_string());
        assert_eq!(params.effective_user(), "deploy");
    }
}
