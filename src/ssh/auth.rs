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

//! Authentication method selection for interactive sessions.
//!
//! Every host in a run is authenticated with the same preferences; this
//! module turns those preferences plus the per-host identity file from the
//! ssh config into a concrete [`AuthMethod`]. Passwords and passphrases are
//! asked for once per run and reused through a [`SecretCache`].

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use zeroize::Zeroizing;

use super::tokio_client::AuthMethod;

/// Key files tried, in order, when no identity is configured.
const DEFAULT_KEY_NAMES: [&str; 3] = ["id_ed25519", "id_ecdsa", "id_rsa"];

/// Cache key for the run-wide password.
const PASSWORD_SECRET: &str = "password";

/// Secrets typed at a prompt, shared by every connection of a run.
#[derive(Clone, Default)]
pub struct SecretCache {
    secrets: Arc<Mutex<HashMap<String, Zeroizing<String>>>>,
}

impl SecretCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the secret stored under `key`, calling `prompt` only when
    /// nothing is stored yet.
    pub fn get_or_prompt(
        &self,
        key: &str,
        prompt: impl FnOnce() -> Result<String>,
    ) -> Result<Zeroizing<String>> {
        let mut secrets = self
            .secrets
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(secret) = secrets.get(key) {
            return Ok(secret.clone());
        }
        let secret = Zeroizing::new(prompt()?);
        secrets.insert(key.to_string(), secret.clone());
        Ok(secret)
    }
}

impl fmt::Debug for SecretCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretCache").finish_non_exhaustive()
    }
}

/// Context for determining SSH authentication method.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Optional path to SSH key file
    pub key_path: Option<PathBuf>,
    /// Whether to use SSH agent for authentication
    pub use_agent: bool,
    /// Whether to use password authentication
    pub use_password: bool,
    /// Username for authentication prompts
    pub username: String,
    /// Host for authentication prompts
    pub host: String,
    /// Secrets already typed during this run
    pub secrets: SecretCache,
}

impl AuthContext {
    /// Create a new authentication context.
    pub fn new(username: String, host: String) -> Self {
        Self {
            key_path: None,
            use_agent: false,
            use_password: false,
            username,
            host,
            secrets: SecretCache::default(),
        }
    }

    /// Reuse secrets prompted for by earlier connections.
    pub fn with_secrets(mut self, secrets: SecretCache) -> Self {
        self.secrets = secrets;
        self
    }

    /// Set the SSH key file path.
    pub fn with_key_path(mut self, key_path: Option<PathBuf>) -> Self {
        self.key_path = key_path;
        self
    }

    /// Enable SSH agent authentication.
    pub fn with_agent(mut self, use_agent: bool) -> Self {
        self.use_agent = use_agent;
        self
    }

    /// Enable password authentication.
    pub fn with_password(mut self, use_password: bool) -> Self {
        self.use_password = use_password;
        self
    }

    /// Determine the appropriate authentication method based on the context.
    ///
    /// Priority:
    /// 1. Password authentication (if explicitly requested)
    /// 2. SSH agent (if explicitly requested and available)
    /// 3. Specified key file (CLI, YAML config or ssh config IdentityFile)
    /// 4. SSH agent auto-detection (SSH_AUTH_SOCK set)
    /// 5. Default key locations (~/.ssh/id_ed25519, ~/.ssh/id_ecdsa, ~/.ssh/id_rsa)
    ///
    /// # Errors
    ///
    /// Returns an error if no method is available, a key file cannot be read,
    /// or a password/passphrase prompt fails.
    pub fn determine_method(&self) -> Result<AuthMethod> {
        if self.use_password {
            return self.password_auth();
        }

        if self.use_agent {
            if let Some(auth) = self.agent_auth()? {
                return Ok(auth);
            }
        }

        if let Some(ref key_path) = self.key_path {
            return self.key_file_auth(key_path);
        }

        #[cfg(not(target_os = "windows"))]
        if std::env::var("SSH_AUTH_SOCK").is_ok() {
            tracing::debug!("SSH_AUTH_SOCK is set, using SSH agent for {}", self.host);
            return Ok(AuthMethod::Agent);
        }

        self.default_key_auth()
    }

    fn password_auth(&self) -> Result<AuthMethod> {
        tracing::debug!("Using password authentication for {}", self.host);
        let password = self.secrets.get_or_prompt(PASSWORD_SECRET, || {
            rpassword::prompt_password(format!("Enter password for {}: ", self.username))
                .with_context(|| "Failed to read password")
        })?;
        Ok(AuthMethod::with_password(&password))
    }

    #[cfg(not(target_os = "windows"))]
    fn agent_auth(&self) -> Result<Option<AuthMethod>> {
        if std::env::var("SSH_AUTH_SOCK").is_ok() {
            tracing::debug!("Using SSH agent for authentication");
            return Ok(Some(AuthMethod::Agent));
        }
        tracing::warn!("SSH agent requested but SSH_AUTH_SOCK environment variable not set");
        Ok(None)
    }

    #[cfg(target_os = "windows")]
    fn agent_auth(&self) -> Result<Option<AuthMethod>> {
        anyhow::bail!("SSH agent authentication is not supported on Windows");
    }

    fn default_key_auth(&self) -> Result<AuthMethod> {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        let ssh_dir = Path::new(&home).join(".ssh");

        for name in DEFAULT_KEY_NAMES {
            let default_key = ssh_dir.join(name);
            if default_key.exists() {
                tracing::debug!("Using default key: {:?}", default_key);
                return self.key_file_auth(&default_key);
            }
        }

        anyhow::bail!(
            "No authentication method available for {}@{}.\n\
             Tried the SSH agent (SSH_AUTH_SOCK not set) and the default key files \
             (~/.ssh/id_ed25519, ~/.ssh/id_ecdsa, ~/.ssh/id_rsa).\n\
             Use -P for password authentication or -i to name a key file.",
            self.username,
            self.host
        )
    }

    /// Build key file authentication, prompting for a passphrase when the
    /// key is encrypted and none was typed for it yet.
    fn key_file_auth(&self, key_path: &Path) -> Result<AuthMethod> {
        tracing::debug!("Authenticating with key: {:?}", key_path);

        let key_contents = std::fs::read_to_string(key_path)
            .with_context(|| format!("Failed to read SSH key file: {key_path:?}"))?;

        let passphrase = if is_encrypted_key(&key_contents) {
            let cache_key = format!("passphrase:{}", key_path.display());
            Some(self.secrets.get_or_prompt(&cache_key, || {
                tracing::debug!("Detected encrypted SSH key, prompting for passphrase");
                rpassword::prompt_password(format!("Enter passphrase for key {key_path:?}: "))
                    .with_context(|| "Failed to read passphrase")
            })?)
        } else {
            None
        };

        Ok(AuthMethod::with_key_file(
            key_path,
            passphrase.as_ref().map(|p| p.as_str()),
        ))
    }
}

fn is_encrypted_key(contents: &str) -> bool {
    contents.contains("ENCRYPTED") || contents.contains("Proc-Type: 4,ENCRYPTED")
}
