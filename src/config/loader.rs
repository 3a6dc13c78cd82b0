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

//! Configuration loading.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

use crate::ssh::known_hosts::StrictHostKeyChecking;

use super::types::Config;
use super::utils::expand_tilde;

/// Connect timeout used when neither the CLI nor the config sets one.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// History file used when neither the CLI nor the config sets one.
pub const DEFAULT_HISTORY_FILE: &str = "~/.simulssh_history";

impl Config {
    /// Default configuration path (`~/.config/simulssh/config.yaml` on Linux).
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "simulssh").map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Load configuration from a file. A missing file yields the defaults.
    pub async fn load(path: &Path) -> Result<Self> {
        let expanded_path = expand_tilde(path);

        if !fs::try_exists(&expanded_path).await.unwrap_or(false) {
            tracing::debug!(
                "Config file not found at {:?}, using defaults",
                expanded_path
            );
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&expanded_path).await.with_context(|| {
            format!(
                "Failed to read configuration file at {}",
                expanded_path.display()
            )
        })?;

        Self::parse(&content).with_context(|| {
            format!(
                "Failed to parse YAML configuration file at {}. Please check the YAML syntax is valid.",
                expanded_path.display()
            )
        })
    }

    /// Load from `path` when given, otherwise from the default location.
    pub async fn load_with_priority(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path).await,
            None => match Self::default_path() {
                Some(default_path) => Self::load(&default_path).await,
                None => {
                    tracing::debug!("Unable to determine config directory, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Connect timeout, `None` meaning unbounded.
    pub fn connect_timeout(&self, cli_override: Option<u64>) -> Option<Duration> {
        let secs = cli_override
            .or(self.defaults.connect_timeout)
            .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS);
        (secs > 0).then(|| Duration::from_secs(secs))
    }

    /// Keepalive interval, `None` meaning disabled.
    pub fn server_alive_interval(&self) -> Option<Duration> {
        self.defaults
            .server_alive_interval
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs)
    }

    pub fn strict_host_key_checking(
        &self,
        cli_override: Option<StrictHostKeyChecking>,
    ) -> Result<StrictHostKeyChecking> {
        if let Some(mode) = cli_override {
            return Ok(mode);
        }
        match self.defaults.strict_host_key_checking.as_deref() {
            Some(value) => value
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))
                .context("Invalid strict_host_key_checking in configuration"),
            None => Ok(StrictHostKeyChecking::default()),
        }
    }

    pub fn history_path(&self, cli_override: Option<&Path>) -> PathBuf {
        let path = cli_override
            .map(Path::to_path_buf)
            .or_else(|| self.history_file.as_deref().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_HISTORY_FILE));
        expand_tilde(&path)
    }

    /// Identity file from the config, with `~` expanded.
    pub fn ssh_key(&self) -> Option<PathBuf> {
        self.defaults
            .ssh_key
            .as_deref()
            .map(|key| expand_tilde(Path::new(key)))
    }
}
