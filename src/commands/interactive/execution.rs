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

//! Startup, input loop and teardown of an interactive session

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use rustyline::config::Configurer;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::collections::HashSet;
use std::io;

use crate::session::SessionManager;

use super::commands::dispatch;
use super::types::{Command, InteractiveCommand, InteractiveResult, LoopControl};
use super::utils::push_notification_count;

const MAX_HISTORY_SIZE: usize = 1000;
const PROMPT: &str = "> ";

impl InteractiveCommand {
    /// Connect to every host, wait for the operator, then run commands
    /// until `quit` or end of input.
    pub async fn execute(self) -> Result<InteractiveResult> {
        let start_time = std::time::Instant::now();
        let notifications = push_notification_count(self.hosts.len());

        let mut manager = SessionManager::new(self.resolver, self.connector);

        println!("Sending {notifications} push notifications.");

        let mut seen = HashSet::new();
        for host in &self.hosts {
            if !seen.insert(host.as_str()) {
                tracing::warn!("{} was given more than once, connecting once", host);
                continue;
            }
            if let Err(e) = manager.connect(host).await {
                eprintln!("✗ {}", e.to_string().red());
                for failure in manager.close_all().await {
                    tracing::warn!("{}", failure);
                }
                return Err(e.into());
            }
            println!("✓ Connected to {}", host.green());
        }
        let hosts_connected = seen.len();

        for (name, members) in &self.config.groups {
            if let Err(e) = manager.define_group(name, members) {
                tracing::warn!("Skipping configured group {}: {}", name, e);
            }
        }

        let mut rl = DefaultEditor::new().context("Failed to initialise line editor")?;
        rl.set_max_history_size(MAX_HISTORY_SIZE)?;
        if self.history_file.exists() {
            if let Err(e) = rl.load_history(&self.history_file) {
                tracing::debug!("Could not load history from {:?}: {}", self.history_file, e);
            }
        }

        let confirmation =
            format!("Hit return when all {notifications} push notifications have been accepted.");
        match rl.readline(&confirmation) {
            Ok(_) => {}
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
                println!("Quitting.");
                manager.close_all().await;
                return Ok(InteractiveResult {
                    duration: start_time.elapsed(),
                    commands_executed: 0,
                    hosts_connected,
                });
            }
            Err(e) => {
                manager.close_all().await;
                return Err(e).context("Failed to read confirmation");
            }
        }

        let commands_executed = run_loop(&mut rl, &mut manager).await;

        if let Err(e) = rl.save_history(&self.history_file) {
            tracing::debug!("Could not save history to {:?}: {}", self.history_file, e);
        }

        Ok(InteractiveResult {
            duration: start_time.elapsed(),
            commands_executed: commands_executed?,
            hosts_connected,
        })
    }
}

/// Read and dispatch commands until the operator quits. Returns the number
/// of commands run.
async fn run_loop(rl: &mut DefaultEditor, manager: &mut SessionManager) -> Result<usize> {
    let mut out = io::stdout();
    let mut commands_executed = 0;

    loop {
        let command = match rl.readline(PROMPT) {
            Ok(line) => {
                let Some(command) = Command::parse(&line) else {
                    continue;
                };
                if let Err(e) = rl.add_history_entry(line.as_str()) {
                    tracing::debug!("Failed to record history entry: {}", e);
                }
                command
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("^D");
                Command::Quit
            }
            Err(e) => {
                manager.close_all().await;
                return Err(e).context("Failed to read command");
            }
        };

        commands_executed += 1;
        match dispatch(manager, command, &mut out).await {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Quit) => return Ok(commands_executed),
            Err(e) => {
                manager.close_all().await;
                return Err(e).context("Failed to write command output");
            }
        }
    }
}
