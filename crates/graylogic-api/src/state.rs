// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`ApiState`]: the axum `State` shared by every handler. Wiring only —
//! this crate owns no business logic of its own beyond request
//! validation, authorisation, and DTO shaping.

use std::sync::Arc;

use catalogue_store::CatalogueStore;
use daemon_client::DaemonClient;
use daemon_supervisor::{HealthSnapshot, Supervisor};
use device_registry::DeviceRegistry;
use graylogic_auth::AuthService;
use scene_engine::SceneEngine;
use state_fanout::Fanout;
use tokio::sync::watch;

#[derive(Clone)]
pub struct ApiState {
    pub registry: Arc<DeviceRegistry>,
    pub scenes: Arc<SceneEngine>,
    pub fanout: Arc<Fanout>,
    pub store: CatalogueStore,
    pub auth: Arc<AuthService>,
    /// This bridge instance's id, echoed on `/api/v1/system/status`.
    pub bridge_id: String,
    /// `None` when no daemon supervisor is running in-process (e.g. a
    /// protocol adapter other than KNX, or a test harness).
    pub supervisor_health: Option<watch::Receiver<HealthSnapshot>>,
    pub supervisor: Option<Arc<Supervisor>>,
    pub daemon: Option<Arc<DaemonClient>>,
}
