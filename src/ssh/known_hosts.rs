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

use super::tokio_client::ServerCheckMethod;
use directories::BaseDirs;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Get the default known_hosts file path
pub fn get_default_known_hosts_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().join(".ssh").join("known_hosts"))
}

/// Create a ServerCheckMethod based on strict host key checking mode
pub fn get_check_method(strict_mode: StrictHostKeyChecking) -> ServerCheckMethod {
    match strict_mode {
        StrictHostKeyChecking::Yes => {
            if let Some(known_hosts_path) = get_default_known_hosts_path() {
                if !known_hosts_path.exists() {
                    tracing::warn!(
                        "Known hosts file not found at {:?}; every host key will be rejected",
                        known_hosts_path
                    );
                }
            }
            ServerCheckMethod::DefaultKnownHostsFile
        }
        StrictHostKeyChecking::AcceptNew => {
            if let Some(ssh_dir) = get_default_known_hosts_path()
                .as_deref()
                .and_then(|path| path.parent())
            {
                if let Err(e) = std::fs::create_dir_all(ssh_dir) {
                    tracing::warn!("Could not create {:?}: {}", ssh_dir, e);
                }
            }
            tracing::debug!("Host key checking in accept-new mode");
            ServerCheckMethod::AcceptNew
        }
        StrictHostKeyChecking::No => {
            tracing::warn!(
                "Host key checking disabled: every presented host key is trusted automatically"
            );
            ServerCheckMethod::NoCheck
        }
    }
}

/// Mode for host key checking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrictHostKeyChecking {
    /// Always verify host keys (fail on unknown/changed)
    #[default]
    Yes,
    /// Never verify host keys (accept all)
    No,
    /// Verify known hosts, add new ones automatically (TOFU)
    AcceptNew,
}

impl FromStr for StrictHostKeyChecking {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yes" | "true" => Ok(Self::Yes),
            "no" | "false" | "off" => Ok(Self::No),
            "accept-new" | "tofu" => Ok(Self::AcceptNew),
            other => Err(format!(
                "invalid host key checking mode '{other}' (expected yes, accept-new or no)"
            )),
        }
    }
}

impl fmt::Display for StrictHostKeyChecking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yes => write!(f, "yes"),
            Self::No => write!(f, "no"),
            Self::AcceptNew => write!(f, "accept-new"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_host_key_checking_from_str() {
        assert_eq!(
            StrictHostKeyChecking::from_str("yes").unwrap(),
            StrictHostKeyChecking::Yes
        );
        assert_eq!(
            StrictHostKeyChecking::from_str("TRUE").unwrap(),
            StrictHostKeyChecking::Yes
        );
        assert_eq!(
            StrictHostKeyChecking::from_str("no").unwrap(),
            StrictHostKeyChecking::No
        );
        assert_eq!(
            StrictHostKeyChecking::from_str("accept-new").unwrap(),
            StrictHostKeyChecking::AcceptNew
        );
        assert_eq!(
            StrictHostKeyChecking::from_str("tofu").unwrap(),
            StrictHostKeyChecking::AcceptNew
        );
        assert!(StrictHostKeyChecking::from_str("invalid").is_err());
    }

    #[test]
    fn test_strict_host_key_checking_default_requires_verification() {
        assert_eq!(StrictHostKeyChecking::default(), StrictHostKeyChecking::Yes);
    }

    #[test]
    fn test_display_round_trips_through_from_str() {
        for mode in [
            StrictHostKeyChecking::Yes,
            StrictHostKeyChecking::No,
            StrictHostKeyChecking::AcceptNew,
        ] {
            assert_eq!(mode.to_string().parse::<StrictHostKeyChecking>(), Ok(mode));
        }
    }

    #[test]
    fn test_get_check_method() {
        assert!(matches!(
            get_check_method(StrictHostKeyChecking::No),
            ServerCheckMethod::NoCheck
        ));
        assert!(matches!(
            get_check_method(StrictHostKeyChecking::Yes),
            ServerCheckMethod::DefaultKnownHostsFile
        ));
        assert!(matches!(
            get_check_method(StrictHostKeyChecking::AcceptNew),
            ServerCheckMethod::AcceptNew
        ));
    }
}
