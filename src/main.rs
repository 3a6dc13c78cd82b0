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


use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;

use simulssh::{
    cli::Cli,
    commands::interactive::InteractiveCommand,
    config::Config,
    session::{ConnectionDefaults, ConnectionResolver, SshConnectOptions, SshConnector},
    ssh::ssh_config::SshConfig,
    utils::init_logging,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config = Config::load_with_priority(cli.config.as_deref()).await?;

    let ssh_config = match cli.ssh_config {
        Some(ref path) => SshConfig::load_from_file(path)
            .await
            .with_context(|| format!("Failed to load SSH config from {path:?}"))?,
        None => SshConfig::load_default().await.unwrap_or_else(|e| {
            tracing::warn!("Ignoring unreadable SSH config: {:#}", e);
            SshConfig::new()
        }),
    };

    let defaults = ConnectionDefaults {
        user: cli.user.clone().or_else(|| config.defaults.user.clone()),
        port: config.defaults.port,
        identity_file: cli.identity.clone().or_else(|| config.ssh_key()),
    };

    let options = SshConnectOptions {
        use_agent: cli.use_agent,
        use_password: cli.password,
        strict_host_key_checking: config.strict_host_key_checking(cli.strict_host_key_checking)?,
        connect_timeout: config.connect_timeout(cli.connect_timeout),
        server_alive_interval: config.server_alive_interval(),
    };
    tracing::debug!("Connection options: {:?}", options);

    let history_file = config.history_path(cli.history_file.as_deref());

    let command = InteractiveCommand {
        hosts: cli.hosts,
        resolver: ConnectionResolver::new(ssh_config, defaults),
        connector: Arc::new(SshConnector::new(options)),
        config,
        history_file,
    };

    let result = command.execute().await?;
    tracing::info!(
        "Session ended after {:?}: {} command(s) on {} host(s)",
        result.duration,
        result.commands_executed,
        result.hosts_connected
    );

    Ok(())
}
