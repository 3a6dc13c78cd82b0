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

//! Core types for the interactive command loop

use std::path::PathBuf;
use std::sync::Arc;
use tokio::time::Duration;

use crate::config::Config;
use crate::session::{Connector, ConnectionResolver};

/// Target of a `switch` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchTarget {
    /// `switch all`
    All,
    /// A group name or a list of hosts. Which one is decided against the
    /// group registry when the command runs.
    Named(Vec<String>),
}

/// One line of operator input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Hosts,
    Switch(SwitchTarget),
    Add(Vec<String>),
    Remove(Vec<String>),
    Group { name: String, hosts: Vec<String> },
    Groups,
    Exec(String),
    Recv,
    Help,
    Quit,
    /// Unknown command word, or too few arguments
    Invalid,
}

impl Command {
    /// Parse an input line. Blank lines yield `None`.
    ///
    /// `exec` keeps everything after the command word as typed, apart from
    /// surrounding whitespace.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim_start()),
            None => (line, ""),
        };
        if name.is_empty() {
            return None;
        }

        let args: Vec<String> = rest.split_whitespace().map(str::to_string).collect();

        let command = match name {
            "hosts" => Self::Hosts,
            "switch" if args.first().is_some_and(|a| a == "all") => {
                Self::Switch(SwitchTarget::All)
            }
            "switch" if !args.is_empty() => Self::Switch(SwitchTarget::Named(args)),
            "add" if !args.is_empty() => Self::Add(args),
            "rm" if !args.is_empty() => Self::Remove(args),
            "group" if args.len() > 1 => {
                let mut args = args.into_iter();
                let name = args.next().unwrap_or_default();
                Self::Group {
                    name,
                    hosts: args.collect(),
                }
            }
            "groups" => Self::Groups,
            "exec" => Self::Exec(rest.to_string()),
            "recv" => Self::Recv,
            "help" => Self::Help,
            "quit" => Self::Quit,
            _ => Self::Invalid,
        };
        Some(command)
    }
}

/// Whether the loop keeps reading input after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Quit,
}

/// Interactive session configuration
pub struct InteractiveCommand {
    /// Hosts named on the command line, in order
    pub hosts: Vec<String>,
    pub resolver: ConnectionResolver,
    pub connector: Arc<dyn Connector>,
    pub config: Config,
    pub history_file: PathBuf,
}

/// Result of an interactive session
#[derive(Debug)]
pub struct InteractiveResult {
    pub duration: Duration,
    pub commands_executed: usize,
    pub hosts_connected: usize,
}
