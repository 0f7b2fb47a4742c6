// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/api/v1/devices` (§6). Reads go through [`DeviceRegistry`]'s
//! room-scoped cache; commands go through its two-stage router and return
//! only the stage-1 outcome — stage 2 arrives over the WebSocket.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use device_registry::Stage1Outcome;
use graylogic_core::model::{AuditAction, Device};
use graylogic_core::value::DomainCommand;
use graylogic_core::AppError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit;
use crate::auth::CurrentUser;
use crate::state::ApiState;

#[derive(Debug, Serialize)]
pub struct DeviceListResponse {
    pub devices: Vec<Device>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub room_id: Option<Uuid>,
}

pub async fn list_devices(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<DeviceListResponse>, AppError> {
    let devices = match query.room_id {
        Some(room_id) => state.registry.list_by_room(room_id, &user.scope).await?,
        None => state.registry.list_all(&user.scope).await?,
    };
    Ok(Json(DeviceListResponse { devices }))
}

pub async fn get_device(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Device>, AppError> {
    Ok(Json(state.registry.get(id, &user.scope).await?))
}

#[derive(Debug, Deserialize)]
pub struct PatchDeviceRequest {
    pub name: Option<String>,
    /// `Some(None)` clears the room assignment, absent leaves it untouched
    /// — hence the double `Option`, matching the registry's own signature.
    #[serde(default, deserialize_with = "deserialize_double_option")]
    pub room_id: Option<Option<Uuid>>,
}

fn deserialize_double_option<'de, D>(d: D) -> Result<Option<Option<Uuid>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Some(Option::deserialize(d)?))
}

pub async fn patch_device(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<PatchDeviceRequest>,
) -> Result<Json<Device>, AppError> {
    // A device's room assignment is itself room-scoped: a restricted user
    // may only touch devices already within their authorised rooms.
    let existing = state.registry.get(id, &user.scope).await?;
    let updated = state.registry.update_fields(id, body.name, body.room_id).await?;
    audit::record(
        state.store.clone(),
        audit::actor_parts(&user.actor).0,
        audit::actor_parts(&user.actor).1,
        AuditAction::Update,
        "device",
        existing.id.to_string(),
        serde_json::json!({ "name": updated.name, "room_id": updated.room_id }),
    );
    Ok(Json(updated))
}

#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub command: String,
    #[serde(default)]
    pub parameters: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub stage: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// `POST /api/v1/devices/{id}/command` (§6): returns the stage-1 outcome
/// only. Stage 2 (`applied`/`rejected`/`timeout`) is pushed to subscribed
/// WebSocket clients as `command_ack` once the bridge answers.
pub async fn issue_command(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<CommandRequest>,
) -> Result<Json<CommandResponse>, AppError> {
    let command = DomainCommand::from_wire(&body.command, &body.parameters)?;
    let outcome = state.registry.apply_command(id, command, user.actor.clone(), &user.scope).await?;

    let (actor_id, actor_tag) = audit::actor_parts(&user.actor);
    audit::record(
        state.store.clone(),
        actor_id,
        actor_tag,
        AuditAction::Command,
        "device",
        id.to_string(),
        serde_json::json!({ "command": body.command, "parameters": body.parameters }),
    );

    Ok(Json(match outcome {
        Stage1Outcome::Accepted => CommandResponse { stage: "accepted", reason: None },
        Stage1Outcome::Rejected { reason } => {
            CommandResponse { stage: "rejected", reason: Some(reason) }
        }
    }))
}
