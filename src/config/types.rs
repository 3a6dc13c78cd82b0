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

//! Configuration type definitions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Main configuration structure.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,

    /// Where command history is kept between runs.
    #[serde(default)]
    pub history_file: Option<String>,

    /// Groups defined right after startup, name to member hosts.
    #[serde(default)]
    pub groups: BTreeMap<String, Vec<String>>,
}

/// Connection defaults applied to every host.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Defaults {
    pub user: Option<String>,
    pub port: Option<u16>,
    pub ssh_key: Option<String>,
    /// Connect timeout in seconds. 0 waits indefinitely.
    pub connect_timeout: Option<u64>,
    /// SSH keepalive interval in seconds. 0 disables keepalive.
    pub server_alive_interval: Option<u64>,
    /// `yes`, `accept-new` or `no`
    pub strict_host_key_checking: Option<String>,
}
