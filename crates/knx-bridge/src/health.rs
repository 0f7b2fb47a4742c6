// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Publishes a retained bridge health message every `health_interval`
//! (§4.4 "Health reporting"): supervisor layer state, daemon stats, and the
//! ingress backlog size.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use daemon_client::DaemonClient;
use daemon_supervisor::{HealthLayers, HealthSnapshot};
use mqtt_transport::MqttSession;
use mqtt_transport::payload::{BridgeHealthPayload, BridgeStatus, HealthLayersPayload};
use rumqttc::QoS;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::backlog::DroppedCounter;

pub async fn run(
    mqtt: Arc<MqttSession>,
    bridge_id: String,
    daemon: Arc<DaemonClient>,
    supervisor_health: Option<watch::Receiver<HealthSnapshot>>,
    backlog_len: impl Fn() -> usize + Send + 'static,
    dropped: Arc<DroppedCounter>,
    interval: Duration,
    cancel: CancellationToken,
) {
    let topic = mqtt_transport::topic::bridge_health(&bridge_id);
    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = ticker.tick() => {}
        }

        let layers = supervisor_health
            .as_ref()
            .map(|rx| rx.borrow().layers)
            .unwrap_or_default();
        let stats = daemon.stats();
        let connected = daemon.state() == daemon_client::ConnectionState::Connected;
        let status = derive_status(layers, connected);

        let payload = BridgeHealthPayload {
            status,
            layers: HealthLayersPayload {
                l0: layers.l0_usb_present,
                l1: layers.l1_process_alive,
                l2: layers.l2_socket_accepting,
                l3: layers.l3_bus_traffic_recent,
            },
            tx: stats.tx,
            rx: stats.rx,
            errors: stats.errors + dropped.get(),
            backlog: backlog_len(),
            ts: Utc::now(),
        };

        let Ok(bytes) = serde_json::to_vec(&payload) else {
            warn!("failed to serialise bridge health payload");
            continue;
        };
        if let Err(e) = mqtt.publish(&topic, bytes, QoS::AtLeastOnce, true).await {
            warn!(err = %e, "failed to publish bridge health");
        }
    }
}

fn derive_status(layers: HealthLayers, daemon_connected: bool) -> BridgeStatus {
    if !daemon_connected {
        BridgeStatus::Offline
    } else if layers.is_fully_healthy() {
        BridgeStatus::Online
    } else {
        BridgeStatus::Degraded
    }
}

#[cfg(test)]
#[path = "health_tests.rs"]
mod tests;
