// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The composition root (§5): wires every crate together, spawns the
//! long-lived workers, serves the HTTP surface, and tears everything down
//! in reverse acquisition order on shutdown: one root `CancellationToken`,
//! `axum::serve(...).with_graceful_shutdown(...)`, and a closer stack for
//! anything that needs an explicit drain.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use catalogue_store::CatalogueStore;
use device_registry::{DeviceRegistry, RegistryEvent};
use graylogic_auth::AuthService;
use graylogic_core::model::Site;
use graylogic_core::RoomScope;
use knx_bridge::{BridgeConfig, KnxBridge};
use mqtt_transport::{MqttConfig, MqttSession};
use scene_engine::SceneEngine;
use state_fanout::{Fanout, WsMessage};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::AppConfig;
use crate::timeseries::{HttpBatchingSink, MetricSample, NullSink, TimeseriesSink};

type Closer = Box<dyn FnOnce() -> Pin<Box<dyn Future<Output = ()> + Send>> + Send>;

/// Distinguishes the three non-zero exit codes `spec.md` §6 assigns:
/// config parsing (1), migration/catalogue-open failure (2), and a fatal
/// dependency unreachable past the startup window (3).
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("configuration error: {0}")]
    Config(#[source] anyhow::Error),
    #[error("catalogue migration failed: {0}")]
    Migration(#[source] anyhow::Error),
    #[error("dependency unreachable: {0}")]
    Dependency(#[source] anyhow::Error),
}

impl RunError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 1,
            Self::Migration(_) => 2,
            Self::Dependency(_) => 3,
        }
    }
}

pub async fn run(config: AppConfig) -> Result<(), RunError> {
    let shutdown = CancellationToken::new();
    let mut closers: Vec<Closer> = Vec::new();

    let store = CatalogueStore::open(&config.catalogue_path)
        .await
        .map_err(|e| RunError::Migration(e.into()))?;
    ensure_site(&store).await.map_err(RunError::Migration)?;
    info!(path = %store.path(), "catalogue opened");

    let jwt_secret = config.jwt_secret().map_err(RunError::Config)?;
    let auth = Arc::new(AuthService::new(store.clone(), jwt_secret));

    let (egress_tx, egress_rx) = mpsc::channel(256);
    let registry = Arc::new(DeviceRegistry::new(store.clone(), egress_tx));
    let scenes = SceneEngine::new(store.clone(), Arc::clone(&registry));
    let fanout = Fanout::new();

    let fanout_cancel = shutdown.child_token();
    tokio::spawn(Arc::clone(&fanout).run(registry.subscribe(), scenes.subscribe(), fanout_cancel.clone()));
    closers.push(Box::new(move || Box::pin(async move { fanout_cancel.cancel() })));

    let timeseries_sink = build_timeseries_sink(&config, shutdown.child_token()).map_err(RunError::Config)?;
    let timeseries_cancel = shutdown.child_token();
    tokio::spawn(run_timeseries_ingest(
        Arc::clone(&registry),
        registry.subscribe(),
        timeseries_sink,
        timeseries_cancel.clone(),
    ));
    closers.push(Box::new(move || Box::pin(async move { timeseries_cancel.cancel() })));

    let mqtt_config = MqttConfig {
        host: config.mqtt.host.clone(),
        port: config.mqtt.port,
        client_id: format!("graylogic-{}", uuid::Uuid::new_v4()),
        username: config.mqtt.username().map_err(RunError::Config)?,
        password: config.mqtt.password().map_err(RunError::Config)?,
        bridge_id: config.mqtt.bridge_id.clone(),
        keep_alive: Duration::from_secs(config.mqtt.keep_alive_secs),
    };
    let (mqtt, mqtt_eventloop, _mqtt_state_rx) = MqttSession::new(mqtt_config, shutdown.child_token());

    let supervisor_config = daemon_supervisor::SupervisorConfig {
        daemon_binary: config.daemon.binary.clone(),
        daemon_args: Vec::new(),
        usb_device_path: config.daemon.usb_device_path.clone(),
        reset_utility: config.daemon.reset_utility.clone(),
        poll_interval: config.poll_interval(),
    };
    let (supervisor, supervisor_health) =
        daemon_supervisor::Supervisor::new(supervisor_config, shutdown.child_token());

    let daemon_target = config.daemon.target().map_err(RunError::Config)?;
    let daemon_source: telegram_codec::IndividualAddress = config
        .daemon
        .source_address
        .parse()
        .map_err(|e| RunError::Config(anyhow::anyhow!("invalid daemon.source_address: {e}")))?;

    let bridge_config = BridgeConfig { bridge_id: config.mqtt.bridge_id.clone(), ..BridgeConfig::default() };
    let (bridge, l2_socket, l3_traffic) = KnxBridge::spawn(
        bridge_config,
        store.clone(),
        Arc::clone(&registry),
        egress_rx,
        daemon_target,
        daemon_source,
        Arc::clone(&mqtt),
        mqtt_eventloop,
        Some(supervisor_health.clone()),
        shutdown.child_token(),
    )
    .await
    .map_err(|e| RunError::Dependency(anyhow::anyhow!(e)))?;

    let supervisor_for_run = Arc::clone(&supervisor);
    tokio::spawn(supervisor_for_run.run(l2_socket, l3_traffic));

    let health_cancel = shutdown.child_token();
    tokio::spawn(forward_health_to_fanout(Arc::clone(&fanout), supervisor_health.clone(), health_cancel.clone()));
    closers.push(Box::new(move || Box::pin(async move { health_cancel.cancel() })));

    let api_state = Arc::new(graylogic_api::ApiState {
        registry,
        scenes,
        fanout,
        store: store.clone(),
        auth,
        bridge_id: config.mqtt.bridge_id.clone(),
        supervisor_health: Some(supervisor_health),
        supervisor: Some(supervisor),
        daemon: Some(Arc::clone(&bridge.daemon)),
    });

    let router = graylogic_api::build_router(api_state);
    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .map_err(|e| RunError::Dependency(anyhow::anyhow!("binding {}: {e}", config.bind_addr)))?;
    info!(addr = %config.bind_addr, "graylogic listening");

    spawn_signal_handler(shutdown.clone());

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown.clone().cancelled_owned())
        .await
        .map_err(|e| RunError::Dependency(anyhow::anyhow!(e)))?;

    shutdown.cancel();
    for closer in closers.into_iter().rev() {
        closer().await;
    }
    Ok(())
}

/// First `SIGTERM`/`SIGINT` cancels `shutdown` so the graceful shutdown path
/// (§5 reverse-order closers, drained after `axum::serve` returns) actually
/// runs; a second signal forces an immediate exit rather than waiting on a
/// shutdown that isn't draining.
fn spawn_signal_handler(shutdown: CancellationToken) {
    tokio::spawn(async move {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()).ok();
        let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt()).ok();

        tokio::select! {
            _ = async {
                if let Some(ref mut s) = sigterm { s.recv().await } else { std::future::pending().await }
            } => {
                info!("received SIGTERM");
            }
            _ = async {
                if let Some(ref mut s) = sigint { s.recv().await } else { std::future::pending().await }
            } => {
                info!("received SIGINT");
            }
        }
        shutdown.cancel();

        tokio::select! {
            _ = async {
                if let Some(ref mut s) = sigterm { s.recv().await } else { std::future::pending().await }
            } => {
                info!("received SIGTERM again, forcing exit");
            }
            _ = async {
                if let Some(ref mut s) = sigint { s.recv().await } else { std::future::pending().await }
            } => {
                info!("received SIGINT again, forcing exit");
            }
        }
        std::process::exit(130);
    });
}

/// A fresh catalogue has no `Site` row yet; give it an inert default rather
/// than forcing an installer wizard before the API comes up at all.
async fn ensure_site(store: &CatalogueStore) -> Result<(), anyhow::Error> {
    if store.get_site().await?.is_some() {
        return Ok(());
    }
    store
        .upsert_site(Site {
            id: uuid::Uuid::new_v4(),
            name: "graylogic".to_owned(),
            timezone: "UTC".to_owned(),
            latitude: None,
            longitude: None,
            mode: "home".to_owned(),
            allowed_modes: vec!["home".to_owned(), "away".to_owned(), "night".to_owned()],
        })
        .await?;
    Ok(())
}

/// Safe to call more than once (e.g. from tests) — uses `try_init`.
pub fn init_tracing(format: crate::config::LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let result = match format {
        crate::config::LogFormat::Json => tracing_subscriber::fmt().with_env_filter(filter).json().try_init(),
        crate::config::LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).try_init(),
    };
    drop(result);
}

pub fn log_fatal(err: &RunError) {
    error!(exit_code = err.exit_code(), "fatal: {err:#}");
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

fn build_timeseries_sink(
    config: &AppConfig,
    cancel: CancellationToken,
) -> Result<Arc<dyn TimeseriesSink>, anyhow::Error> {
    let Some(ts) = &config.timeseries else {
        return Ok(Arc::new(NullSink));
    };
    let token = ts.token()?;
    let client = reqwest::Client::new();
    Ok(HttpBatchingSink::spawn(
        ts.endpoint.clone(),
        token,
        ts.batch_size,
        Duration::from_secs(ts.batch_interval_secs),
        client,
        cancel,
    ))
}

/// Tags every `StateChanged` event with the device's room/domain/protocol
/// and forwards one [`MetricSample`] per capability field (§6 "time-series
/// schema"). A device that vanished between the event firing and this
/// lookup is skipped rather than treated as an error — the sink is
/// explicitly best-effort.
async fn run_timeseries_ingest(
    registry: Arc<DeviceRegistry>,
    mut events: tokio::sync::broadcast::Receiver<RegistryEvent>,
    sink: Arc<dyn TimeseriesSink>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            event = events.recv() => {
                let event = match event {
                    Ok(e) => e,
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => return,
                };
                let RegistryEvent::StateChanged { device_id, room_id, state, ts, .. } = event else {
                    continue;
                };
                let Ok(device) = registry.get(device_id, &RoomScope::All).await else {
                    continue;
                };
                for (field, value) in state {
                    sink.record(MetricSample {
                        device_id,
                        room_id,
                        domain: format!("{:?}", device.domain).to_lowercase(),
                        protocol: format!("{:?}", device.protocol).to_lowercase(),
                        field,
                        value,
                        ts,
                    });
                }
            }
        }
    }
}
