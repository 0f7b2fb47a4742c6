// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

/// Bridge-wide tuning knobs (§4.4).
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Identifies this bridge instance on `graylogic/bridge/<id>/health`.
    pub bridge_id: String,
    /// Upper bound on read-on-connect throughput.
    pub read_on_connect_rate_per_sec: u32,
    /// Capacity of the ingress backlog queue (§4.4 edge case).
    pub backlog_capacity: usize,
    pub health_interval: Duration,
    /// Window within which bus traffic must have been observed for the
    /// supervisor's L3 health layer to read healthy (§4.3).
    pub bus_activity_window: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            bridge_id: "knx-bridge-1".to_owned(),
            read_on_connect_rate_per_sec: 20,
            backlog_capacity: 1024,
            health_interval: Duration::from_secs(30),
            bus_activity_window: Duration::from_secs(60),
        }
    }
}
