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

//! SSH configuration parsing functionality
//!
//! Converts the text format into a list of `Host` blocks. Options that appear
//! before the first `Host` line form an implicit block matching every host.
//! Unsupported keywords are ignored.

use super::types::SshHostConfig;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Parse SSH configuration content
pub(super) fn parse(content: &str) -> Result<Vec<SshHostConfig>> {
    let mut hosts = Vec::new();
    let mut current = SshHostConfig::default();

    for (index, raw_line) in content.lines().enumerate() {
        let line_number = index + 1;
        let line = raw_line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((keyword, value)) = split_keyword(line) else {
            continue;
        };

        match keyword.as_str() {
            "host" => {
                let patterns: Vec<String> = value.split_whitespace().map(str::to_string).collect();
                if patterns.is_empty() {
                    anyhow::bail!(
                        "Host directive requires at least one pattern at line {line_number}"
                    );
                }
                let finished = std::mem::replace(
                    &mut current,
                    SshHostConfig {
                        host_patterns: patterns,
                        line_number,
                        ..Default::default()
                    },
                );
                if !finished.host_patterns.is_empty() || !finished.is_empty() {
                    hosts.push(finished);
                }
            }
            "match" => {
                tracing::debug!("Match blocks are not supported, ignoring line {line_number}");
            }
            _ => parse_option(&mut current, &keyword, value, line_number)
                .with_context(|| format!("Error at line {line_number}: {line}"))?,
        }
    }

    if !current.host_patterns.is_empty() || !current.is_empty() {
        hosts.push(current);
    }

    Ok(hosts)
}

/// Split a line into a lowercase keyword and the raw remainder.
///
/// Both `Keyword value` and `Keyword=value` forms are accepted.
fn split_keyword(line: &str) -> Option<(String, &str)> {
    let end = line
        .find(|c: char| c.is_whitespace() || c == '=')
        .unwrap_or(line.len());
    let keyword = &line[..end];
    if keyword.is_empty() {
        return None;
    }

    let mut rest = line[end..].trim_start();
    if let Some(stripped) = rest.strip_prefix('=') {
        rest = stripped.trim_start();
    }
    Some((keyword.to_ascii_lowercase(), rest.trim_end()))
}

fn first_arg<'a>(value: &'a str, keyword: &str, line_number: usize) -> Result<&'a str> {
    let arg = value.split_whitespace().next().map(strip_quotes);
    match arg {
        Some(arg) if !arg.is_empty() => Ok(arg),
        _ => anyhow::bail!("{keyword} requires a value at line {line_number}"),
    }
}

fn strip_quotes(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(s)
}

/// Parse a configuration option for a host block.
///
/// Within a block the first value given for a keyword is kept, matching
/// OpenSSH. `IdentityFile` accumulates.
pub(super) fn parse_option(
    host: &mut SshHostConfig,
    keyword: &str,
    value: &str,
    line_number: usize,
) -> Result<()> {
    match keyword {
        "hostname" => {
            let arg = first_arg(value, "HostName", line_number)?;
            host.hostname.get_or_insert_with(|| arg.to_string());
        }
        "user" => {
            let arg = first_arg(value, "User", line_number)?;
            host.user.get_or_insert_with(|| arg.to_string());
        }
        "port" => {
            let arg = first_arg(value, "Port", line_number)?;
            let port: u16 = arg
                .parse()
                .with_context(|| format!("Invalid port '{arg}' at line {line_number}"))?;
            if port == 0 {
                anyhow::bail!("Port must be between 1 and 65535 at line {line_number}");
            }
            host.port.get_or_insert(port);
        }
        "proxycommand" => {
            if value.is_empty() {
                anyhow::bail!("ProxyCommand requires a value at line {line_number}");
            }
            host.proxy_command.get_or_insert_with(|| value.to_string());
        }
        "identityfile" => {
            let arg = first_arg(value, "IdentityFile", line_number)?;
            host.identity_files.push(PathBuf::from(arg));
        }
        _ => {
            tracing::trace!("Ignoring unsupported option '{keyword}' at line {line_number}");
        }
    }

    Ok(())
}
