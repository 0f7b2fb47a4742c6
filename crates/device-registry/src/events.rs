// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Events the registry broadcasts for `state-fanout` and the audit log to
//! consume (§4.5, §9 "one-way arrows + events"). Nothing in this crate ever
//! calls back into a subscriber directly.

use chrono::{DateTime, Utc};
use graylogic_core::value::StateMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The stage of a command's two-stage acknowledgement (§4.5, §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AckStage {
    Accepted,
    Applied,
    Rejected,
    Timeout,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegistryEvent {
    /// A device's state map changed, either from a bus echo (bridge ingress)
    /// or a direct `UpdateState` call.
    StateChanged {
        device_id: Uuid,
        room_id: Option<Uuid>,
        state: StateMap,
        source_tag: String,
        ts: DateTime<Utc>,
    },
    /// Stage-2 (or later) of a command's lifecycle. Stage-1 is returned
    /// synchronously from `apply_command` and is not re-broadcast here.
    CommandAck {
        command_id: Uuid,
        device_id: Uuid,
        stage: AckStage,
        error: Option<String>,
        ts: DateTime<Utc>,
    },
}
