// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Catalogue entities (§3). These are the shapes shared between
//! `catalogue-store`, `device-registry`, `scene-engine` and the HTTP API;
//! the store owns persistence, everyone else only owns behaviour.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ids::Slug;
use crate::value::{Capability, StateMap};

/// Overall operating mode of the site (e.g. `home`, `away`, `night`).
pub type Mode = String;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    pub id: Uuid,
    pub name: String,
    pub timezone: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub mode: Mode,
    pub allowed_modes: Vec<Mode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Area {
    pub id: Uuid,
    pub slug: Slug,
    pub name: String,
    pub area_type: String,
    pub icon: Option<String>,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: Uuid,
    pub area_id: Uuid,
    pub slug: Slug,
    pub name: String,
    pub room_type: String,
    pub capacity_hint: Option<i32>,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceDomain {
    Lighting,
    Blinds,
    Climate,
    Sensor,
    Infrastructure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    Knx,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceHealth {
    Online,
    Degraded,
    Offline,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: Uuid,
    pub slug: Slug,
    pub name: String,
    pub domain: DeviceDomain,
    pub device_type: String,
    pub room_id: Option<Uuid>,
    pub protocol: Protocol,
    /// Arbitrary protocol address map, e.g. `{"switch": "1/1/5"}`.
    pub address: BTreeMap<String, String>,
    pub capabilities: Vec<Capability>,
    pub state: StateMap,
    pub health: DeviceHealth,
    pub config: serde_json::Value,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Device {
    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

/// Direction of data flow for a group-address binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingDirection {
    Read,
    Write,
    Listen,
}

/// The KNX-specific materialisation of a device's `address` map (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupAddressBinding {
    pub id: Uuid,
    pub device_id: Uuid,
    pub capability: Capability,
    /// Textual `main/middle/sub` form, e.g. `1/1/5`.
    pub group_address: String,
    pub datapoint_type: String,
    pub direction: BindingDirection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    pub id: Uuid,
    pub slug: Slug,
    pub name: String,
    pub room_id: Option<Uuid>,
    pub category: Option<String>,
    pub priority: u8,
    pub enabled: bool,
    pub actions: Vec<SceneAction>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneCommandKind {
    On,
    Off,
    Toggle,
    Dim,
    SetLevel,
    SetPosition,
    SetTilt,
    SetSetpoint,
    Stop,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneAction {
    pub id: Uuid,
    pub scene_id: Uuid,
    pub device_id: Uuid,
    pub command: SceneCommandKind,
    pub parameters: serde_json::Value,
    pub delay_ms: u32,
    pub fade_ms: u32,
    pub parallel: bool,
    pub continue_on_error: bool,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Partial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    Api,
    Schedule,
    Automation,
    Panel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneExecution {
    pub id: Uuid,
    pub scene_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub trigger_kind: TriggerKind,
    pub trigger_source: String,
    pub action_count: u32,
    pub success_count: u32,
    pub failure_count: u32,
    pub skipped_count: u32,
    pub status: ExecutionStatus,
    pub duration_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Owner,
    Admin,
    User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub active: bool,
    pub room_access: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub device_info: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Panel {
    pub id: Uuid,
    pub slug: Slug,
    pub name: String,
    pub token_hash: String,
    pub room_access: Vec<Uuid>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Command,
    Login,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    /// A user id (`Some`) or a system-source tag (`None`, see `actor_tag`).
    pub actor_id: Option<Uuid>,
    pub actor_tag: Option<String>,
    pub action: AuditAction,
    pub entity_type: String,
    pub entity_id: String,
    pub details: serde_json::Value,
}

/// Passive observation of a group or individual address (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryRecord {
    pub address: String,
    pub count: u64,
    pub last_seen: DateTime<Utc>,
}
