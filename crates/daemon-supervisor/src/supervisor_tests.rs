// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use super::*;

fn no_op_watches() -> (watch::Receiver<bool>, watch::Receiver<bool>) {
    let (_l2_tx, l2_rx) = watch::channel(false);
    let (_l3_tx, l3_rx) = watch::channel(false);
    (l2_rx, l3_rx)
}

#[tokio::test]
async fn request_restart_before_run_does_not_panic() {
    let cancel = CancellationToken::new();
    let (supervisor, _health_rx) = Supervisor::new(SupervisorConfig::default(), cancel);
    supervisor.request_restart().await;
}

#[tokio::test]
async fn missing_usb_device_publishes_l0_failure_and_does_not_mask_it() {
    let cancel = CancellationToken::new();
    let config = SupervisorConfig {
        usb_device_path: Some(PathBuf::from("/nonexistent/knx-usb-device-path")),
        ..SupervisorConfig::default()
    };
    let (supervisor, mut health_rx) = Supervisor::new(config, cancel.clone());
    let (l2_rx, l3_rx) = no_op_watches();

    let handle = tokio::spawn(supervisor.run(l2_rx, l3_rx));

    health_rx
        .wait_for(|snapshot| !snapshot.layers.l0_usb_present)
        .await
        .expect("health channel closed before L0 failure was published");

    cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(1), handle).await;

    assert!(!health_rx.borrow().layers.l0_usb_present);
}

#[tokio::test]
async fn successful_daemon_run_publishes_running_then_starting_on_exit() {
    let cancel = CancellationToken::new();
    let config = SupervisorConfig {
        daemon_binary: PathBuf::from("true"),
        ..SupervisorConfig::default()
    };
    let (supervisor, mut health_rx) = Supervisor::new(config, cancel.clone());
    let (l2_rx, l3_rx) = no_op_watches();

    let handle = tokio::spawn(supervisor.run(l2_rx, l3_rx));

    health_rx
        .wait_for(|snapshot| snapshot.status == SupervisorStatus::Running)
        .await
        .expect("health channel closed before Running was published");

    cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
}

#[tokio::test(start_paused = true)]
async fn crashing_daemon_eventually_exhausts_restart_budget() {
    // Backoff delays are real tokio sleeps; pausing virtual time lets eight
    // restart cycles settle without the test taking minutes of wall clock.
    let cancel = CancellationToken::new();
    let config = SupervisorConfig {
        daemon_binary: PathBuf::from("false"),
        ..SupervisorConfig::default()
    };
    let (supervisor, mut health_rx) = Supervisor::new(config, cancel.clone());
    let (l2_rx, l3_rx) = no_op_watches();

    let handle = tokio::spawn(supervisor.run(l2_rx, l3_rx));

    let waited = tokio::time::timeout(
        Duration::from_secs(120),
        health_rx.wait_for(|snapshot| snapshot.status == SupervisorStatus::Degraded),
    )
    .await;

    cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;

    assert!(waited.is_ok(), "supervisor never reached Degraded");
}
