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

//! Host configuration resolution
//!
//! Blocks are consulted in file order. For each option the first obtained
//! value is used, the same rule `ssh` follows.

use super::pattern::matches_host_pattern;
use super::types::SshHostConfig;

/// Merge every block that applies to `hostname` into one configuration
pub(super) fn find_host_config(hosts: &[SshHostConfig], hostname: &str) -> SshHostConfig {
    let mut merged = SshHostConfig::default();

    for host in hosts {
        let applies =
            host.host_patterns.is_empty() || matches_host_pattern(hostname, &host.host_patterns);
        if !applies {
            continue;
        }

        tracing::trace!(
            "Host block at line {} applies to {}",
            host.line_number,
            hostname
        );
        merge_first_wins(&mut merged, host);
    }

    merged
}

fn merge_first_wins(target: &mut SshHostConfig, source: &SshHostConfig) {
    if target.hostname.is_none() {
        target.hostname.clone_from(&source.hostname);
    }
    if target.user.is_none() {
        target.user.clone_from(&source.user);
    }
    if target.port.is_none() {
        target.port = source.port;
    }
    if target.proxy_command.is_none() {
        target.proxy_command.clone_from(&source.proxy_command);
    }
    target
        .identity_files
        .extend(source.identity_files.iter().cloned());
}
