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

//! Tests for the interactive command grammar and dispatch

mod common;

use common::{connected, strings};
use simulssh::commands::interactive::{dispatch, Command, LoopControl, HELP_TEXT};
use simulssh::session::SessionManager;

/// Parse and dispatch each line, returning everything written.
async fn run(manager: &mut SessionManager, lines: &[&str]) -> String {
    let mut out = Vec::new();
    for line in lines {
        if let Some(command) = Command::parse(line) {
            dispatch(manager, command, &mut out).await.unwrap();
        }
    }
    String::from_utf8(out).unwrap()
}

#[tokio::test]
async fn test_group_switch_exec_recv_scenario() {
    let (mut manager, network) = connected(&["h1", "h2"]).await;
    assert_eq!(manager.active_hosts(), vec!["h1", "h2"]);

    let output = run(&mut manager, &["group web h1", "switch web", "exec echo hi"]).await;
    assert_eq!(
        output,
        "Created group \"web\" with hosts h1.\n\
         Active hosts set to web: h1.\n\
         Running command \"echo hi\".\n"
    );
    assert_eq!(manager.active_hosts(), vec!["h1"]);
    assert_eq!(network.sent("h1"), vec!["echo hi\n"]);
    assert!(network.sent("h2").is_empty());

    network.push_stdout("h1", b"hi\n");
    network.push_stdout("h2", b"not shown\n");
    let output = run(&mut manager, &["recv"]).await;
    assert_eq!(output, "***STDOUT from h1***\nhi\n");
    assert_eq!(network.reads("h2"), 0);
}

#[tokio::test]
async fn test_rm_unknown_host() {
    let (mut manager, _) = connected(&["h1", "h2"]).await;

    let output = run(&mut manager, &["rm h3"]).await;

    assert_eq!(output, "Invalid host(s).\n");
    assert_eq!(manager.active_hosts(), vec!["h1", "h2"]);
}

#[tokio::test]
async fn test_active_set_messages() {
    let (mut manager, _) = connected(&["a", "b", "c"]).await;

    let output = run(
        &mut manager,
        &["switch a", "add c", "hosts", "rm a", "switch all", "switch a zz"],
    )
    .await;

    assert_eq!(
        output,
        "Active hosts: a.\n\
         Active hosts: a, c.\n\
         Active hosts: a, c.\n\
         Active hosts: c.\n\
         Active hosts set to all: a, b, c.\n\
         Invalid switch.\n"
    );
}

#[tokio::test]
async fn test_switch_prefers_group_over_hosts() {
    let (mut manager, _) = connected(&["a", "b"]).await;

    let output = run(&mut manager, &["group b a", "switch b a b"]).await;

    assert!(output.ends_with("Active hosts set to b: a.\n"));
    assert_eq!(manager.active_hosts(), vec!["a"]);
}

#[tokio::test]
async fn test_groups_listing() {
    let (mut manager, _) = connected(&["a", "b"]).await;

    assert_eq!(run(&mut manager, &["groups"]).await, "No groups.\n");

    let output = run(
        &mut manager,
        &["group web b a", "group db a", "group bad zz", "groups"],
    )
    .await;
    assert_eq!(
        output,
        "Created group \"web\" with hosts a, b.\n\
         Created group \"db\" with hosts a.\n\
         Invalid host(s).\n\
         db: a\n\
         web: a, b\n"
    );
}

#[tokio::test]
async fn test_invalid_commands() {
    let (mut manager, _) = connected(&["a"]).await;

    let output = run(&mut manager, &["frobnicate", "add", "group web", "", "switch"]).await;

    assert_eq!(output, "Invalid command.\n".repeat(4));
    assert_eq!(manager.active_hosts(), vec!["a"]);
}

#[tokio::test]
async fn test_exec_reports_failed_hosts() {
    let (mut manager, network) = connected(&["a", "b"]).await;
    network.host("b").lock().unwrap().fail_send = true;

    let output = run(&mut manager, &["exec ls  -l"]).await;

    assert_eq!(
        output,
        "Running command \"ls  -l\".\nFailed to send command to b: channel closed\n"
    );
    assert_eq!(network.sent("a"), vec!["ls  -l\n"]);
}

#[tokio::test]
async fn test_help() {
    let (mut manager, _) = connected(&["a"]).await;
    let output = run(&mut manager, &["help"]).await;
    assert_eq!(output, format!("{HELP_TEXT}\n"));
    for command in ["add", "exec", "group", "groups", "hosts", "quit", "recv", "rm", "switch"] {
        assert!(HELP_TEXT.contains(&format!("\n{command}: ")), "{command}");
    }
}

#[tokio::test]
async fn test_quit_closes_every_session() {
    let (mut manager, network) = connected(&["a", "b"]).await;
    manager.switch_to(&strings(&["a"])).unwrap();

    let mut out = Vec::new();
    let control = dispatch(&mut manager, Command::Quit, &mut out)
        .await
        .unwrap();

    assert_eq!(control, LoopControl::Quit);
    assert_eq!(String::from_utf8(out).unwrap(), "Quitting.\n");
    assert!(network.host("a").lock().unwrap().disconnected);
    assert!(network.host("b").lock().unwrap().disconnected);
    assert_eq!(manager.hosts().count(), 0);
}

#[tokio::test]
async fn test_other_commands_continue_the_loop() {
    let (mut manager, _) = connected(&["a"]).await;
    let mut out = Vec::new();
    for command in [Command::Hosts, Command::Recv, Command::Invalid, Command::Help] {
        assert_eq!(
            dispatch(&mut manager, command, &mut out).await.unwrap(),
            LoopControl::Continue
        );
    }
}
