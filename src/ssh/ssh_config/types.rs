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

//! Core data structures for SSH configuration

use std::path::PathBuf;

/// Options collected from one `Host` block, or the merged result of a lookup.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SshHostConfig {
    /// Patterns from the `Host` line (empty for the implicit global block)
    pub host_patterns: Vec<String>,
    pub hostname: Option<String>,
    pub user: Option<String>,
    pub port: Option<u16>,
    pub proxy_command: Option<String>,
    pub identity_files: Vec<PathBuf>,
    /// Line of the `Host` keyword that opened this block
    pub line_number: usize,
}

impl SshHostConfig {
    /// True when no option was set by any matching block.
    pub fn is_empty(&self) -> bool {
        self.hostname.is_none()
            && self.user.is_none()
            && self.port.is_none()
            && self.proxy_command.is_none()
            && self.identity_files.is_empty()
    }
}
