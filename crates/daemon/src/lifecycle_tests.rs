// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use pulse_adapters::FakeNotifyAdapter;

fn unreachable_durable() -> Config {
    let mut config = Config::default();
    config.bus.backend = Backend::Durable;
    config.broker.url = "nats://127.0.0.1:1".to_string();
    config.broker.connect_attempts = 1;
    config.broker.connect_timeout = Duration::from_millis(500);
    config
}

#[tokio::test]
async fn durable_failure_falls_back_to_in_process() {
    let (bus, backend) = build_bus(&unreachable_durable()).await;

    assert_eq!(backend, Backend::InProcess);
    assert!(bus.stats().broker.is_none());
    bus.shutdown().await.unwrap();
}

#[tokio::test]
async fn startup_registers_handlers_and_announces_itself() {
    let daemon = startup_with(Config::default(), Arc::new(FakeNotifyAdapter::new()))
        .await
        .unwrap();

    assert_eq!(daemon.backend, Backend::InProcess);
    assert!(daemon.bus.stats().total_handlers > 0);

    for _ in 0..100 {
        if daemon.handlers.metrics.count("system.startup") == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(daemon.handlers.metrics.count("system.startup"), 1);
}

#[tokio::test]
async fn shutdown_publishes_before_closing() {
    let daemon = startup_with(Config::default(), Arc::new(FakeNotifyAdapter::new()))
        .await
        .unwrap();
    let mut sub = daemon.bus.subscribe("system").unwrap();

    daemon.shutdown().await.unwrap();

    let event = sub.recv().await.unwrap();
    assert_eq!(event.event_type, "system.shutdown");
    assert!(sub.recv().await.is_none());

    // A second shutdown is harmless
    daemon.shutdown().await.unwrap();
}

#[tokio::test]
async fn startup_reads_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pulse.toml");
    std::fs::write(&path, "source = \"billing\"\n").unwrap();

    let daemon = startup(&DaemonConfig {
        config_path: path,
        log_path: dir.path().join("pulsed.log"),
        stats_interval: DEFAULT_STATS_INTERVAL,
    })
    .await
    .unwrap();

    assert_eq!(daemon.config.source, "billing");
    daemon.shutdown().await.unwrap();
}

#[test]
fn log_dir_of_bare_filename_is_cwd() {
    assert_eq!(log_dir(Path::new("pulsed.log")).unwrap(), Path::new("."));
    assert_eq!(
        log_dir(Path::new("/var/log/pulsed.log")).unwrap(),
        Path::new("/var/log")
    );
}
