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

//! Command dispatch for the interactive loop

use std::io::{self, Write};

use crate::session::{SessionError, SessionManager};

use super::types::{Command, LoopControl, SwitchTarget};
use super::utils::join_hosts;

pub const HELP_TEXT: &str = "\
command: command description.

add: add hosts to the active hosts.
exec: run a shell command on all active hosts.
group: group hosts together under a name. The first argument is the group name, the rest are the hosts in that group.
groups: print the list of groups.
help: print this help.
hosts: print the active hosts.
quit: close all connections and quit.
recv: print the stdout and stderr received so far from all active hosts.
rm: remove hosts from the active hosts.
switch: make a list of hosts (or a group) the active hosts, then print them. Also accepts \"all\".";

fn print_active<W: Write>(manager: &SessionManager, out: &mut W) -> io::Result<()> {
    writeln!(out, "Active hosts: {}.", join_hosts(manager.active_hosts()))
}

/// Report a rejected host list. The names only go to the debug log.
fn print_invalid_hosts<W: Write>(err: &SessionError, out: &mut W) -> io::Result<()> {
    tracing::debug!("{}", err);
    writeln!(out, "Invalid host(s).")
}

/// Run one parsed command against `manager`, writing user-facing output to
/// `out`.
pub async fn dispatch<W: Write + Send>(
    manager: &mut SessionManager,
    command: Command,
    out: &mut W,
) -> io::Result<LoopControl> {
    match command {
        Command::Hosts => print_active(manager, out)?,

        Command::Switch(SwitchTarget::All) => {
            manager.switch_all();
            writeln!(
                out,
                "Active hosts set to all: {}.",
                join_hosts(manager.active_hosts())
            )?;
        }

        Command::Switch(SwitchTarget::Named(args)) => {
            let first = args.first().map(String::as_str).unwrap_or_default();
            if manager.is_group(first) {
                if args.len() > 1 {
                    tracing::debug!("Ignoring extra arguments after group {}", first);
                }
                match manager.switch_to_group(first) {
                    Ok(()) => writeln!(
                        out,
                        "Active hosts set to {}: {}.",
                        first,
                        join_hosts(manager.active_hosts())
                    )?,
                    Err(err) => {
                        tracing::debug!("{}", err);
                        writeln!(out, "Invalid switch.")?;
                    }
                }
            } else {
                match manager.switch_to(&args) {
                    Ok(()) => print_active(manager, out)?,
                    Err(err) => {
                        tracing::debug!("{}", err);
                        writeln!(out, "Invalid switch.")?;
                    }
                }
            }
        }

        Command::Add(hosts) => match manager.add(&hosts) {
            Ok(()) => print_active(manager, out)?,
            Err(err) => print_invalid_hosts(&err, out)?,
        },

        Command::Remove(hosts) => match manager.remove(&hosts) {
            Ok(()) => print_active(manager, out)?,
            Err(err) => print_invalid_hosts(&err, out)?,
        },

        Command::Group { name, hosts } => match manager.define_group(&name, &hosts) {
            Ok(()) => {
                let members = manager
                    .list_groups()
                    .into_iter()
                    .find(|(group, _)| *group == name)
                    .map(|(_, members)| join_hosts(members))
                    .unwrap_or_default();
                writeln!(out, "Created group \"{name}\" with hosts {members}.")?;
            }
            Err(err) => print_invalid_hosts(&err, out)?,
        },

        Command::Groups => {
            let groups = manager.list_groups();
            if groups.is_empty() {
                writeln!(out, "No groups.")?;
            }
            for (name, members) in groups {
                writeln!(out, "{}: {}", name, join_hosts(members))?;
            }
        }

        Command::Exec(command) => {
            writeln!(out, "Running command \"{command}\".")?;
            let report = manager.broadcast(&command).await;
            tracing::debug!(
                "Command delivered to {} host(s), {} failure(s)",
                report.delivered.len(),
                report.failures.len()
            );
            for failure in &report.failures {
                writeln!(out, "{failure}")?;
            }
        }

        Command::Recv => {
            let report = manager.drain(out)?;
            for failure in &report.failures {
                writeln!(out, "{failure}")?;
            }
        }

        Command::Help => writeln!(out, "{HELP_TEXT}")?,

        Command::Quit => {
            writeln!(out, "Quitting.")?;
            out.flush()?;
            for failure in manager.close_all().await {
                tracing::warn!("{}", failure);
            }
            return Ok(LoopControl::Quit);
        }

        Command::Invalid => writeln!(out, "Invalid command.")?,
    }

    out.flush()?;
    Ok(LoopControl::Continue)
}
