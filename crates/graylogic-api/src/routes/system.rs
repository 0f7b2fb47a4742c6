// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `GET /api/v1/health` (unauthenticated liveness probe) and
//! `GET /api/v1/system/status` (bridge/daemon/MQTT health for the admin
//! dashboard, §4.2 four-layer health model).

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use daemon_supervisor::HealthSnapshot;
use graylogic_core::AppError;
use serde::Serialize;

use crate::auth::CurrentUser;
use crate::state::ApiState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health(State(state): State<Arc<ApiState>>) -> Json<HealthResponse> {
    let status = if state.store.health_check().await.is_ok() { "ok" } else { "degraded" };
    Json(HealthResponse { status })
}

#[derive(Debug, Serialize)]
pub struct DaemonStatus {
    pub connection_state: &'static str,
    pub tx: u64,
    pub rx: u64,
    pub errors: u64,
}

#[derive(Debug, Serialize)]
pub struct SystemStatusResponse {
    pub bridge_id: String,
    pub supervisor: Option<HealthSnapshot>,
    pub daemon: Option<DaemonStatus>,
}

pub async fn system_status(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<SystemStatusResponse>, AppError> {
    let supervisor = state.supervisor_health.as_ref().map(|rx| rx.borrow().clone());
    let daemon = state.daemon.as_ref().map(|d| {
        let stats = d.stats();
        let connection_state = match d.state() {
            daemon_client::ConnectionState::Disconnected => "disconnected",
            daemon_client::ConnectionState::Connecting => "connecting",
            daemon_client::ConnectionState::Connected => "connected",
        };
        DaemonStatus { connection_state, tx: stats.tx, rx: stats.rx, errors: stats.errors }
    });
    Ok(Json(SystemStatusResponse { bridge_id: state.bridge_id.clone(), supervisor, daemon }))
}

/// `POST /api/v1/system/daemon/restart` (§9): the external nudge that
/// clears the supervisor's backoff budget and forces an immediate restart
/// attempt once it has given up and gone `Degraded`.
pub async fn restart_daemon(
    State(state): State<Arc<ApiState>>,
    CurrentUser(_user): CurrentUser,
) -> Result<(), AppError> {
    match &state.supervisor {
        Some(supervisor) => {
            supervisor.request_restart().await;
            Ok(())
        }
        None => Err(AppError::NotConnected),
    }
}
