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

//! Tests for the session registry, active set and group registry

mod common;

use std::time::{Duration, Instant};

use common::{connected, manager, manager_with_resolver, strings, MockNetwork};
use simulssh::session::{
    ConnectionDefaults, ConnectionResolver, SessionError, ShellError, DRAIN_CHUNK_SIZE,
};
use simulssh::ssh::ssh_config::SshConfig;

#[tokio::test]
async fn test_connected_hosts_start_active() {
    let (manager, network) = connected(&["h1", "h2"]).await;

    assert_eq!(manager.active_hosts(), vec!["h1", "h2"]);
    assert_eq!(manager.hosts().collect::<Vec<_>>(), vec!["h1", "h2"]);
    assert_eq!(network.connect_count(), 2);
}

#[tokio::test]
async fn test_connecting_twice_opens_one_session() {
    let (mut manager, network) = connected(&["h1"]).await;
    manager.connect("h1").await.unwrap();

    assert_eq!(network.connect_count(), 1);
    assert_eq!(manager.hosts().count(), 1);
}

#[tokio::test]
async fn test_connection_failure_is_reported_and_registers_nothing() {
    let network = MockNetwork::new();
    network.make_unreachable("down");
    let mut manager = manager(&network);

    manager.connect("up").await.unwrap();
    let err = manager.connect("down").await.unwrap_err();

    assert!(matches!(err, SessionError::Connection { ref host, .. } if host == "down"));
    assert!(err.to_string().contains("No route to host down"));
    assert!(!manager.is_connected("down"));
    assert_eq!(manager.active_hosts(), vec!["up"]);
}

#[tokio::test]
async fn test_connect_uses_resolved_parameters() {
    let ssh_config = SshConfig::parse(
        "Host web\n  HostName 10.1.2.3\n  User deploy\n  Port 2200\n  ProxyCommand ssh -W %h:%p jump\n",
    )
    .unwrap();
    let resolver = ConnectionResolver::new(ssh_config, ConnectionDefaults::default());
    let network = MockNetwork::new();
    let mut manager = manager_with_resolver(&network, resolver);

    manager.connect("web").await.unwrap();

    let params = network.connects.lock().unwrap()[0].clone();
    assert_eq!(params.hostname, "web");
    assert_eq!(params.resolved_host, "10.1.2.3");
    assert_eq!(params.username.as_deref(), Some("deploy"));
    assert_eq!(params.port, Some(2200));
    assert_eq!(params.proxy_command.as_deref(), Some("ssh -W 10.1.2.3:2200 jump"));
    assert_eq!(manager.session("web").unwrap().params(), &params);
}

#[tokio::test]
async fn test_switch_to_replaces_active_set() {
    let (mut manager, _) = connected(&["a", "b", "c"]).await;

    manager.switch_to(&["a"]).unwrap();
    manager.switch_to(&["b"]).unwrap();
    assert_eq!(manager.active_hosts(), vec!["b"]);

    manager.switch_all();
    assert_eq!(manager.active_hosts(), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_add_then_remove_restores_active_set() {
    let (mut manager, _) = connected(&["a", "b", "c"]).await;
    manager.switch_to(&["a"]).unwrap();
    let before = strings(&manager.active_hosts());

    manager.add(&["b", "c"]).unwrap();
    assert_eq!(manager.active_hosts(), vec!["a", "b", "c"]);
    manager.remove(&["b", "c"]).unwrap();

    assert_eq!(strings(&manager.active_hosts()), before);
}

#[tokio::test]
async fn test_unknown_host_leaves_everything_unchanged() {
    let (mut manager, _) = connected(&["a", "b"]).await;
    manager.define_group("g", &["a"]).unwrap();
    manager.switch_to(&["b"]).unwrap();

    let results = [
        manager.switch_to(&["a", "zz"]),
        manager.add(&["zz"]),
        manager.remove(&["b", "zz"]),
        manager.define_group("g", &["b", "zz"]),
        manager.define_group("other", &["zz"]),
    ];

    for result in results {
        match result {
            Err(SessionError::InvalidHost(hosts)) => assert_eq!(hosts, vec!["zz"]),
            other => panic!("expected InvalidHost, got {other:?}"),
        }
    }
    assert_eq!(manager.active_hosts(), vec!["b"]);
    assert_eq!(manager.list_groups(), vec![("g", vec!["a"])]);
    assert_eq!(manager.hosts().collect::<Vec<_>>(), vec!["a", "b"]);
}

#[tokio::test]
async fn test_group_is_copied_into_active_set() {
    let (mut manager, _) = connected(&["a", "b", "c"]).await;

    manager.define_group("g", &["a", "b"]).unwrap();
    manager.switch_to_group("g").unwrap();
    assert_eq!(manager.active_hosts(), vec!["a", "b"]);

    manager.add(&["c"]).unwrap();
    manager.remove(&["a"]).unwrap();
    assert_eq!(manager.list_groups(), vec![("g", vec!["a", "b"])]);
}

#[tokio::test]
async fn test_redefining_a_group_overwrites_it() {
    let (mut manager, _) = connected(&["a", "b"]).await;
    manager.define_group("g", &["a"]).unwrap();
    manager.define_group("g", &["b"]).unwrap();
    assert_eq!(manager.list_groups(), vec![("g", vec!["b"])]);
}

#[tokio::test]
async fn test_switch_to_unknown_group() {
    let (mut manager, _) = connected(&["a"]).await;
    let err = manager.switch_to_group("nope").unwrap_err();
    assert!(matches!(err, SessionError::InvalidGroup(ref name) if name == "nope"));
    assert_eq!(manager.active_hosts(), vec!["a"]);
}

#[tokio::test]
async fn test_list_groups_is_sorted() {
    let (mut manager, _) = connected(&["a", "b"]).await;
    assert!(manager.list_groups().is_empty());

    manager.define_group("zeta", &["b", "a"]).unwrap();
    manager.define_group("alpha", &["b"]).unwrap();

    assert_eq!(
        manager.list_groups(),
        vec![("alpha", vec!["b"]), ("zeta", vec!["a", "b"])]
    );
}

#[tokio::test]
async fn test_removed_host_keeps_its_session() {
    let (mut manager, network) = connected(&["a", "b"]).await;
    manager.remove(&["a"]).unwrap();

    assert!(manager.is_connected("a"));
    assert!(!network.host("a").lock().unwrap().channel_closed);

    manager.add(&["a"]).unwrap();
    assert_eq!(manager.active_hosts(), vec!["a", "b"]);
}

#[tokio::test]
async fn test_broadcast_reaches_only_active_hosts() {
    let (mut manager, network) = connected(&["h1", "h2"]).await;
    manager.switch_to(&["h1"]).unwrap();

    let report = manager.broadcast("echo hi").await;

    assert_eq!(report.delivered, vec!["h1"]);
    assert!(report.failures.is_empty());
    assert_eq!(network.sent("h1"), vec!["echo hi\n"]);
    assert!(network.sent("h2").is_empty());
}

#[tokio::test]
async fn test_broadcast_attempts_every_host_despite_failures() {
    let (mut manager, network) = connected(&["h1", "h2", "h3"]).await;
    network.host("h1").lock().unwrap().fail_send = true;

    let report = manager.broadcast("uptime").await;

    assert_eq!(report.delivered, vec!["h2", "h3"]);
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        &report.failures[0],
        SessionError::Send { host, source: ShellError::Closed } if host == "h1"
    ));
    assert_eq!(network.sent("h2"), vec!["uptime\n"]);
    assert_eq!(network.sent("h3"), vec!["uptime\n"]);
}

#[tokio::test]
async fn test_drain_only_visits_active_hosts() {
    let (mut manager, network) = connected(&["h1", "h2"]).await;
    network.push_stdout("h1", b"from h1\n");
    network.push_stdout("h2", b"from h2\n");
    manager.remove(&["h2"]).unwrap();

    let mut out = Vec::new();
    let report = manager.drain(&mut out).unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "***STDOUT from h1***\nfrom h1\n"
    );
    assert_eq!(report.hosts_with_output, vec!["h1"]);
    assert_eq!(network.reads("h2"), 0);
    assert_eq!(network.host("h2").lock().unwrap().stdout.len(), 8);
}

#[tokio::test]
async fn test_drain_of_silent_hosts_reads_nothing_and_returns_promptly() {
    let (mut manager, network) = connected(&["h1", "h2"]).await;

    let started = Instant::now();
    let mut out = Vec::new();
    let report = manager.drain(&mut out).unwrap();

    assert!(started.elapsed() < Duration::from_secs(1));
    assert!(out.is_empty());
    assert_eq!(report.bytes, 0);
    assert_eq!(network.reads("h1"), 0);
    assert_eq!(network.reads("h2"), 0);
}

#[tokio::test]
async fn test_drain_is_a_snapshot() {
    let (mut manager, network) = connected(&["h1"]).await;
    network.push_stdout("h1", &vec![b'a'; DRAIN_CHUNK_SIZE + 1]);

    let mut out = Vec::new();
    manager.drain(&mut out).unwrap();
    assert_eq!(network.reads("h1"), 2);

    let mut again = Vec::new();
    manager.drain(&mut again).unwrap();
    assert!(again.is_empty());

    network.push_stderr("h1", b"late\n");
    let mut late = Vec::new();
    manager.drain(&mut late).unwrap();
    assert_eq!(
        String::from_utf8(late).unwrap(),
        "***STDERR from h1***\nlate\n"
    );
}

#[tokio::test]
async fn test_drain_reports_failed_channels_and_continues() {
    let (mut manager, network) = connected(&["h1", "h2"]).await;
    network.host("h1").lock().unwrap().failure = Some("connection reset".to_string());
    network.push_stdout("h2", b"ok\n");

    let mut out = Vec::new();
    let report = manager.drain(&mut out).unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), "***STDOUT from h2***\nok\n");
    assert_eq!(report.failures.len(), 1);
    assert_eq!(
        report.failures[0].to_string(),
        "Failed to read from h1: connection reset"
    );

    let mut again = Vec::new();
    let report = manager.drain(&mut again).unwrap();
    assert!(report.failures.is_empty());
}

#[tokio::test]
async fn test_close_all_closes_channels_before_transports() {
    let (mut manager, network) = connected(&["a", "b", "c"]).await;
    manager.switch_to(&["a"]).unwrap();

    let failures = manager.close_all().await;

    assert!(failures.is_empty());
    assert_eq!(
        network.events(),
        vec![
            "close_channel a",
            "close_channel b",
            "close_channel c",
            "disconnect a",
            "disconnect b",
            "disconnect c",
        ]
    );
    assert_eq!(manager.hosts().count(), 0);
    assert!(manager.active_hosts().is_empty());
}
