// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

/// Broker connection parameters (§4.10: credentials come from environment,
/// never the YAML config itself).
#[derive(Debug, Clone)]
pub struct MqttConfig {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Identifies this bridge instance on `graylogic/bridge/<bridge-id>/health`.
    pub bridge_id: String,
    pub keep_alive: Duration,
}

impl MqttConfig {
    pub fn new(host: impl Into<String>, port: u16, bridge_id: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            client_id: format!("graylogic-{}", uuid::Uuid::new_v4()),
            username: None,
            password: None,
            bridge_id: bridge_id.into(),
            keep_alive: Duration::from_secs(20),
        }
    }
}
