// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON payload shapes carried on the topic namespace (§6).

use chrono::{DateTime, Utc};
use graylogic_core::value::{CapabilityValue, StateMap};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatePayload {
    pub device_id: String,
    pub ts: DateTime<Utc>,
    pub state: StateMap,
    pub protocol: String,
    pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandPayload {
    pub id: Uuid,
    pub command: String,
    pub parameters: serde_json::Value,
    pub actor: String,
    pub ts: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AckStage {
    Accepted,
    Applied,
    Rejected,
    Timeout,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckPayload {
    pub command_id: Uuid,
    pub stage: AckStage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub ts: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BridgeStatus {
    Online,
    Degraded,
    Offline,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthLayersPayload {
    pub l0: bool,
    pub l1: bool,
    pub l2: bool,
    pub l3: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeHealthPayload {
    pub status: BridgeStatus,
    pub layers: HealthLayersPayload,
    pub tx: u64,
    pub rx: u64,
    pub errors: u64,
    pub backlog: usize,
    pub ts: DateTime<Utc>,
}

impl BridgeHealthPayload {
    /// The retained LWT payload published on unexpected disconnect.
    pub fn offline(now: DateTime<Utc>) -> Self {
        Self {
            status: BridgeStatus::Offline,
            layers: HealthLayersPayload { l0: false, l1: false, l2: false, l3: false },
            tx: 0,
            rx: 0,
            errors: 0,
            backlog: 0,
            ts: now,
        }
    }
}

/// A value coerced for JSON wire transport where `CapabilityValue`'s
/// `#[serde(untagged)]` shape needs disambiguating context (e.g. MQTT
/// command parameters, which arrive as a bare JSON object).
pub fn coerce_parameter(raw: &serde_json::Value, key: &str) -> Option<CapabilityValue> {
    raw.get(key).and_then(|v| serde_json::from_value(v.clone()).ok())
}

#[cfg(test)]
#[path = "payload_tests.rs"]
mod tests;
