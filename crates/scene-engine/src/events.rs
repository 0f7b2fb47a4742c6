// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The engine's own broadcast, separate from `device_registry::RegistryEvent`
//! (§4.6 "publish a begin event" / "publish a terminal event"). `state-fanout`
//! and the audit log both subscribe to this in addition to the registry's.

use chrono::{DateTime, Utc};
use graylogic_core::model::ExecutionStatus;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    Started { execution_id: Uuid, scene_id: Uuid, ts: DateTime<Utc> },
    Finished { execution_id: Uuid, scene_id: Uuid, status: ExecutionStatus, ts: DateTime<Utc> },
}
