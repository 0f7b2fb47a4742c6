// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Owns the KNX daemon subprocess: spawn, liveness-monitor, restart with
//! bounded backoff, surface the four-layer health model (§4.3).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::process::Command;
use tokio::sync::{watch, Mutex, Notify};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::backoff::RestartBackoff;
use crate::health::{HealthLayers, HealthSnapshot, SupervisorStatus};
use crate::process::is_process_alive;

#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    pub daemon_binary: PathBuf,
    pub daemon_args: Vec<String>,
    /// Device node whose presence gates L0 (e.g. `/dev/ttyUSB0`).
    pub usb_device_path: Option<PathBuf>,
    /// Out-of-process utility invoked to reset the USB interface on
    /// `DEVICE_BUSY` conditions.
    pub reset_utility: Option<PathBuf>,
    /// How often the liveness-poll loop checks process state.
    pub poll_interval: Duration,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            daemon_binary: PathBuf::from("knxd"),
            daemon_args: Vec::new(),
            usb_device_path: None,
            reset_utility: None,
            poll_interval: Duration::from_secs(2),
        }
    }
}

/// Supervises the KNX daemon subprocess's lifecycle.
pub struct Supervisor {
    config: SupervisorConfig,
    backoff: Mutex<RestartBackoff>,
    health_tx: watch::Sender<HealthSnapshot>,
    restart_nudge: Notify,
    cancel: CancellationToken,
}

impl Supervisor {
    pub fn new(
        config: SupervisorConfig,
        cancel: CancellationToken,
    ) -> (Arc<Self>, watch::Receiver<HealthSnapshot>) {
        let initial = HealthSnapshot {
            status: SupervisorStatus::Starting,
            layers: HealthLayers::default(),
            restart_count: 0,
            last_exit_at: None,
        };
        let (health_tx, health_rx) = watch::channel(initial);
        let supervisor = Arc::new(Self {
            config,
            backoff: Mutex::new(RestartBackoff::new()),
            health_tx,
            restart_nudge: Notify::new(),
            cancel,
        });
        (supervisor, health_rx)
    }

    /// External nudge (e.g. `POST /api/v1/system/daemon/restart`): clears
    /// the failure budget and wakes the supervise loop immediately.
    pub async fn request_restart(&self) {
        self.backoff.lock().await.reset();
        self.restart_nudge.notify_one();
    }

    fn usb_present(&self) -> bool {
        match &self.config.usb_device_path {
            Some(path) => path.exists(),
            None => true, // no USB gating configured (e.g. IP-interfaced daemon)
        }
    }

    async fn maybe_reset_usb(&self) {
        if let Some(utility) = &self.config.reset_utility {
            info!(utility = %utility.display(), "resetting USB interface after DEVICE_BUSY");
            if let Err(e) = Command::new(utility).status().await {
                warn!(err = %e, "USB reset utility failed to run");
            }
        }
    }

    async fn publish_health(
        &self,
        status: SupervisorStatus,
        l1: bool,
        l2: bool,
        l3: bool,
        restart_count: u32,
    ) {
        let layers = HealthLayers {
            l0_usb_present: self.usb_present(),
            l1_process_alive: l1,
            l2_socket_accepting: l2,
            l3_bus_traffic_recent: l3,
        };
        let _ = self.health_tx.send(HealthSnapshot {
            status,
            layers,
            restart_count,
            last_exit_at: None,
        });
    }

    /// Run the supervise loop until cancelled.
    ///
    /// `l2_socket` and `l3_traffic` are fed by the daemon client's
    /// connection state and the bridge's last-bus-activity observation
    /// respectively; the supervisor never reaches into either directly
    /// (one-way arrows, per the design notes).
    pub async fn run(
        self: Arc<Self>,
        mut l2_socket: watch::Receiver<bool>,
        mut l3_traffic: watch::Receiver<bool>,
    ) {
        let mut restart_count: u32 = 0;

        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            if !self.usb_present() {
                warn!("USB interface absent, L0 failing; not masking as transient");
                self.publish_health(
                    SupervisorStatus::Starting,
                    false,
                    *l2_socket.borrow(),
                    *l3_traffic.borrow(),
                    restart_count,
                )
                .await;
                tokio::select! {
                    _ = self.cancel.cancelled() => break,
                    _ = tokio::time::sleep(Duration::from_secs(5)) => continue,
                    _ = self.restart_nudge.notified() => continue,
                }
            }

            let spawn_result = Command::new(&self.config.daemon_binary)
                .args(&self.config.daemon_args)
                .kill_on_drop(true)
                .spawn();

            let mut child = match spawn_result {
                Ok(child) => child,
                Err(e) => {
                    warn!(err = %e, "failed to spawn KNX daemon");
                    self.maybe_reset_usb().await;
                    if !self
                        .wait_backoff_or_degrade(
                            restart_count,
                            *l2_socket.borrow(),
                            *l3_traffic.borrow(),
                        )
                        .await
                    {
                        break;
                    }
                    restart_count += 1;
                    continue;
                }
            };

            let pid = child.id();
            info!(?pid, "KNX daemon started");
            self.publish_health(
                SupervisorStatus::Running,
                true,
                *l2_socket.borrow(),
                *l3_traffic.borrow(),
                restart_count,
            )
            .await;
            self.backoff.lock().await.reset();

            loop {
                tokio::select! {
                    _ = self.cancel.cancelled() => {
                        let _ = child.start_kill();
                        return;
                    }
                    status = child.wait() => {
                        let exit_ok = matches!(&status, Ok(s) if s.success());
                        warn!(?status, "KNX daemon exited");
                        if !exit_ok {
                            self.backoff.lock().await.record_failure(Instant::now());
                        }
                        break;
                    }
                    _ = l2_socket.changed() => {
                        self.publish_health(
                            SupervisorStatus::Running,
                            true,
                            *l2_socket.borrow(),
                            *l3_traffic.borrow(),
                            restart_count,
                        )
                        .await;
                    }
                    _ = l3_traffic.changed() => {
                        self.publish_health(
                            SupervisorStatus::Running,
                            true,
                            *l2_socket.borrow(),
                            *l3_traffic.borrow(),
                            restart_count,
                        )
                        .await;
                    }
                    _ = self.restart_nudge.notified() => {
                        let _ = child.start_kill();
                        break;
                    }
                }

                if let Some(pid) = pid {
                    if !is_process_alive(pid) {
                        break;
                    }
                }
            }

            self.publish_health(
                SupervisorStatus::Starting,
                false,
                *l2_socket.borrow(),
                *l3_traffic.borrow(),
                restart_count,
            )
            .await;

            if !self
                .wait_backoff_or_degrade(restart_count, *l2_socket.borrow(), *l3_traffic.borrow())
                .await
            {
                break;
            }
            restart_count += 1;
        }
    }

    /// Sleeps the backoff delay, or publishes `Degraded` and waits for an
    /// external nudge if the failure budget is exhausted. Returns `false`
    /// if the loop should stop (cancelled).
    async fn wait_backoff_or_degrade(&self, restart_count: u32, l2: bool, l3: bool) -> bool {
        let now = Instant::now();
        let exhausted = self.backoff.lock().await.budget_exhausted(now);

        if exhausted {
            warn!("restart budget exhausted in the last 10 minutes, publishing degraded health");
            self.publish_health(SupervisorStatus::Degraded, false, l2, l3, restart_count)
                .await;
            self.health_tx.send_modify(|h| h.last_exit_at = Some(Utc::now()));
            tokio::select! {
                _ = self.cancel.cancelled() => return false,
                _ = self.restart_nudge.notified() => return true,
            }
        }

        let delay = self.backoff.lock().await.next_delay();
        tokio::select! {
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(delay) => true,
            _ = self.restart_nudge.notified() => true,
        }
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
