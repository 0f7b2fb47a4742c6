// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The KNX bridge (§4.4): binds devices to group addresses, routes
//! telegrams to and from MQTT and the device registry, issues
//! read-on-connect, and publishes health and discovery. This crate is the
//! only one in the workspace that depends on both `daemon-client` and
//! `device-registry` — it is the coordinator the design notes describe as
//! owning one-way arrows to each.

pub mod activity;
pub mod backlog;
pub mod binding_table;
pub mod config;
pub mod datapoint;
pub mod discovery;
pub mod egress;
pub mod health;
pub mod ingress;
pub mod mqtt_command;
pub mod pending_echo;
pub mod read_on_connect;
pub mod relay;

use std::sync::Arc;

use catalogue_store::CatalogueStore;
use daemon_client::{ConnectionState as DaemonConnectionState, DaemonClient};
use daemon_supervisor::HealthSnapshot;
use device_registry::{DeviceRegistry, EgressRequest};
use graylogic_core::AppError;
use mqtt_transport::MqttSession;
use telegram_codec::IndividualAddress;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

pub use config::BridgeConfig;

use crate::activity::BusActivity;
use crate::backlog::Backlog;
use crate::binding_table::BindingTable;
use crate::pending_echo::PendingEchoes;

/// Everything the bridge exposes once running: the binding table (for a
/// future catalogue-mutation rebuild trigger) and the two derived health
/// signals the daemon supervisor needs but must not reach into this crate
/// to compute itself (§9 "one-way arrows + events").
pub struct KnxBridge {
    pub bindings: Arc<BindingTable>,
    pub daemon: Arc<DaemonClient>,
}

impl KnxBridge {
    /// Rebuilds the binding table from `store` and spawns every long-lived
    /// worker task (ingress, egress, relay, health, MQTT command intake,
    /// and the daemon client's own reader/writer loop). Returns once
    /// everything is wired; shutdown is entirely driven by `cancel`.
    #[allow(clippy::too_many_arguments)]
    pub async fn spawn(
        config: BridgeConfig,
        store: CatalogueStore,
        registry: Arc<DeviceRegistry>,
        egress_requests: mpsc::Receiver<EgressRequest>,
        daemon_target: daemon_client::DaemonTarget,
        daemon_source: IndividualAddress,
        mqtt: Arc<MqttSession>,
        mqtt_eventloop: rumqttc::EventLoop,
        supervisor_health: Option<watch::Receiver<HealthSnapshot>>,
        cancel: CancellationToken,
    ) -> Result<(Arc<Self>, watch::Receiver<bool>, watch::Receiver<bool>), AppError> {
        let bindings = Arc::new(BindingTable::new());
        bindings.rebuild(&store).await?;

        let (daemon, daemon_state_rx) = DaemonClient::new(daemon_target, daemon_source, cancel.clone());
        let l2_socket = spawn_l2_watch(daemon_state_rx, cancel.clone());

        let activity = BusActivity::new();
        let l3_traffic = Arc::clone(&activity).watch(config.bus_activity_window, cancel.clone());

        let (backlog, telegrams, dropped) = Backlog::new(config.backlog_capacity);
        let backlog = Arc::new(backlog);
        let echoes = Arc::new(PendingEchoes::new());

        tokio::spawn(ingress::run(
            telegrams,
            Arc::clone(&registry),
            Arc::clone(&bindings),
            store.clone(),
            Arc::clone(&echoes),
        ));
        tokio::spawn(egress::run(
            egress_requests,
            Arc::clone(&daemon),
            Arc::clone(&bindings),
            Arc::clone(&echoes),
        ));
        tokio::spawn(relay::run(Arc::clone(&registry), Arc::clone(&mqtt)));

        let backlog_for_health = backlog_len_probe(Arc::clone(&backlog));
        tokio::spawn(health::run(
            Arc::clone(&mqtt),
            config.bridge_id.clone(),
            Arc::clone(&daemon),
            supervisor_health,
            backlog_for_health,
            Arc::clone(&dropped),
            config.health_interval,
            cancel.clone(),
        ));

        let command_callback = mqtt_command::callback(Arc::clone(&registry), Arc::clone(&mqtt));
        tokio::spawn(Arc::clone(&mqtt).run(mqtt_eventloop, command_callback));

        let rate = config.read_on_connect_rate_per_sec;
        let bindings_for_reconnect = Arc::clone(&bindings);
        let daemon_for_reconnect = Arc::clone(&daemon);
        let on_reconnect: Arc<dyn Fn() + Send + Sync> = Arc::new(move || {
            let bindings = Arc::clone(&bindings_for_reconnect);
            let daemon = Arc::clone(&daemon_for_reconnect);
            tokio::spawn(read_on_connect::run(daemon, bindings, rate));
        });

        let activity_for_telegrams = Arc::clone(&activity);
        let on_telegram: daemon_client::TelegramCallback = Arc::new(move |telegram| {
            activity_for_telegrams.mark();
            backlog.offer(telegram);
        });
        tokio::spawn(Arc::clone(&daemon).run(on_telegram, on_reconnect));

        Ok((Arc::new(Self { bindings, daemon }), l2_socket, l3_traffic))
    }
}

/// Forwards the daemon client's connection state onto a plain `bool` watch
/// channel, the shape `daemon-supervisor::Supervisor::run` expects for its
/// L2 layer — kept here so `daemon-supervisor` never depends on this crate.
fn spawn_l2_watch(
    mut state_rx: watch::Receiver<DaemonConnectionState>,
    cancel: CancellationToken,
) -> watch::Receiver<bool> {
    let connected = matches!(*state_rx.borrow(), DaemonConnectionState::Connected);
    let (tx, rx) = watch::channel(connected);
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => return,
                changed = state_rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    let connected = matches!(*state_rx.borrow(), DaemonConnectionState::Connected);
                    let _ = tx.send(connected);
                }
            }
        }
    });
    rx
}

fn backlog_len_probe(backlog: Arc<Backlog>) -> impl Fn() -> usize + Send + 'static {
    move || backlog.backlog_len_hint()
}
