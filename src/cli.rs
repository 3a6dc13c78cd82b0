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


use clap::Parser;
use std::path::PathBuf;

use crate::ssh::known_hosts::StrictHostKeyChecking;

#[derive(Parser, Debug)]
#[command(
    name = "simulssh",
    version,
    about = "Open interactive shells on many hosts at once and broadcast commands to them",
    long_about = "simulssh connects to every host given on the command line, opens one interactive shell on each,\nand then reads commands from a prompt. Commands select which hosts are active, group hosts under a name,\nsend a shell command to all active hosts (exec) and print the output collected so far (recv).\nType 'help' at the prompt for the full command list.",
    after_help = "EXAMPLES:\n  Connect to three hosts:          simulssh web1 web2 db1\n  Use another ssh config:          simulssh -F ./ssh_config staging1 staging2\n  Learn unknown host keys:         simulssh --strict-host-key-checking accept-new web1 web2"
)]
pub struct Cli {
    #[arg(
        required = true,
        num_args = 1..,
        help = "Hosts to connect to, as names or ssh config aliases"
    )]
    pub hosts: Vec<String>,

    #[arg(
        short = 'F',
        long = "ssh-config",
        help = "Alternative SSH configuration file [default: ~/.ssh/config]"
    )]
    pub ssh_config: Option<PathBuf>,

    #[arg(
        long,
        help = "Configuration file path [default: ~/.config/simulssh/config.yaml]"
    )]
    pub config: Option<PathBuf>,

    #[arg(short = 'l', long, help = "Default login name for hosts without a User entry")]
    pub user: Option<String>,

    #[arg(
        short = 'i',
        long,
        help = "SSH private key file path (prompts for passphrase if encrypted)\nFalls back to default keys (~/.ssh/id_ed25519, ~/.ssh/id_rsa, etc.) if not specified"
    )]
    pub identity: Option<PathBuf>,

    #[arg(
        short = 'A',
        long,
        help = "Use SSH agent for authentication (Unix/Linux/macOS only)\nAuto-detected when SSH_AUTH_SOCK is set"
    )]
    pub use_agent: bool,

    #[arg(
        short = 'P',
        long,
        help = "Use password authentication (will prompt for password)"
    )]
    pub password: bool,

    #[arg(
        long,
        help = "Host key checking mode (yes/no/accept-new) [default: yes]\n  yes        - Strict checking against known_hosts\n  no         - Accept all host keys (insecure)\n  accept-new - Accept new hosts, reject changed keys"
    )]
    pub strict_host_key_checking: Option<StrictHostKeyChecking>,

    #[arg(
        long,
        value_name = "SECONDS",
        help = "Connect timeout in seconds, 0 waits indefinitely [default: 30]"
    )]
    pub connect_timeout: Option<u64>,

    #[arg(long, help = "Command history file [default: ~/.simulssh_history]")]
    pub history_file: Option<PathBuf>,

    #[arg(
        short = 'v',
        long,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv, -vvv)"
    )]
    pub verbose: u8,
}
