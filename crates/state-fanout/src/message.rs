// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The wire shape pushed to WebSocket clients (§4.7, §6 `/ws`). Built from
//! `device_registry::RegistryEvent` and `scene_engine::SceneEvent` — the hub
//! never invents its own event content, only decides who receives it.

use chrono::{DateTime, Utc};
use daemon_supervisor::HealthSnapshot;
use device_registry::{AckStage, RegistryEvent};
use graylogic_core::value::StateMap;
use scene_engine::SceneEvent;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    StateChanged { device_id: Uuid, room_id: Option<Uuid>, state: StateMap, source_tag: String, ts: DateTime<Utc> },
    CommandAck { command_id: Uuid, device_id: Uuid, stage: AckStage, error: Option<String>, ts: DateTime<Utc> },
    SceneStarted { execution_id: Uuid, scene_id: Uuid, ts: DateTime<Utc> },
    SceneFinished { execution_id: Uuid, scene_id: Uuid, status: graylogic_core::model::ExecutionStatus, ts: DateTime<Utc> },
    /// Bridge/supervisor health (§6 "health" frame kind). Pushed whenever
    /// the supervisor's `watch::Receiver<HealthSnapshot>` changes, not on
    /// any fixed interval.
    Health { snapshot: HealthSnapshot, ts: DateTime<Utc> },
}

impl WsMessage {
    /// The room this message concerns, if any — used to decide whether a
    /// room-scoped client is authorised to receive it. Scene events carry no
    /// room of their own (a scene may touch many rooms), so they are
    /// delivered only to system-wide-scope clients. Health is site-wide for
    /// the same reason.
    pub fn room_id(&self) -> Option<Uuid> {
        match self {
            Self::StateChanged { room_id, .. } => *room_id,
            Self::CommandAck { .. } | Self::SceneStarted { .. } | Self::SceneFinished { .. } | Self::Health { .. } => {
                None
            }
        }
    }
}

impl From<RegistryEvent> for WsMessage {
    fn from(event: RegistryEvent) -> Self {
        match event {
            RegistryEvent::StateChanged { device_id, room_id, state, source_tag, ts } => {
                Self::StateChanged { device_id, room_id, state, source_tag, ts }
            }
            RegistryEvent::CommandAck { command_id, device_id, stage, error, ts } => {
                Self::CommandAck { command_id, device_id, stage, error, ts }
            }
        }
    }
}

impl From<SceneEvent> for WsMessage {
    fn from(event: SceneEvent) -> Self {
        match event {
            SceneEvent::Started { execution_id, scene_id, ts } => Self::SceneStarted { execution_id, scene_id, ts },
            SceneEvent::Finished { execution_id, scene_id, status, ts } => {
                Self::SceneFinished { execution_id, scene_id, status, ts }
            }
        }
    }
}
