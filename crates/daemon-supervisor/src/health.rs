// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use serde::Serialize;

/// The four-layer health surface the supervisor exposes (§4.3). An L0/L1
/// failure is never masked as transient by the daemon client's own
/// reconnect logic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HealthLayers {
    /// USB device present.
    pub l0_usb_present: bool,
    /// Daemon process alive.
    pub l1_process_alive: bool,
    /// Daemon socket accepting connections.
    pub l2_socket_accepting: bool,
    /// Bus traffic observed within the last N seconds.
    pub l3_bus_traffic_recent: bool,
}

impl HealthLayers {
    pub fn is_fully_healthy(&self) -> bool {
        self.l0_usb_present
            && self.l1_process_alive
            && self.l2_socket_accepting
            && self.l3_bus_traffic_recent
    }
}

/// Overall supervisor status, distinct from the per-layer detail in
/// [`HealthLayers`]: `Degraded` specifically means the restart budget has
/// been exhausted and retries have stopped pending an external nudge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SupervisorStatus {
    Starting,
    Running,
    Degraded,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthSnapshot {
    pub status: SupervisorStatus,
    pub layers: HealthLayers,
    pub restart_count: u32,
    pub last_exit_at: Option<DateTime<Utc>>,
}
