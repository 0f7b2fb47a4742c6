// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/api/v1/panels`: wall-mounted/kiosk clients that authenticate with a
//! long-lived opaque token instead of a user login (§4.9). Provisioning is
//! admin-only; the raw token is returned exactly once, at creation time.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use graylogic_core::model::{AuditAction, Panel};
use graylogic_core::{AppError, RoomScope};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit;
use crate::auth::CurrentUser;
use crate::state::ApiState;

fn require_admin(user: &graylogic_auth::AuthContext) -> Result<(), AppError> {
    match user.scope {
        RoomScope::All => Ok(()),
        RoomScope::Rooms(_) => Err(AppError::PermissionDenied),
    }
}

#[derive(Debug, Serialize)]
pub struct PanelListResponse {
    pub panels: Vec<Panel>,
}

pub async fn list_panels(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<PanelListResponse>, AppError> {
    require_admin(&user)?;
    Ok(Json(PanelListResponse { panels: state.store.list_panels().await? }))
}

#[derive(Debug, Deserialize)]
pub struct CreatePanelRequest {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub room_access: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct CreatePanelResponse {
    #[serde(flatten)]
    pub panel: Panel,
    pub token: String,
}

pub async fn create_panel(
    State(state): State<Arc<ApiState>>,
    CurrentUser(admin): CurrentUser,
    Json(body): Json<CreatePanelRequest>,
) -> Result<Json<CreatePanelResponse>, AppError> {
    require_admin(&admin)?;
    let slug = graylogic_core::Slug::new(body.slug).map_err(|e| AppError::Validation(e.to_string()))?;
    let (panel, token) = state.auth.create_panel(body.name, slug, body.room_access).await?;
    let (actor_id, actor_tag) = audit::actor_parts(&admin.actor);
    audit::record(
        state.store.clone(),
        actor_id,
        actor_tag,
        AuditAction::Create,
        "panel",
        panel.id.to_string(),
        serde_json::json!({ "slug": panel.slug.as_str() }),
    );
    Ok(Json(CreatePanelResponse { panel, token }))
}

#[derive(Debug, Deserialize)]
pub struct PatchPanelRequest {
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub room_access: Option<Vec<Uuid>>,
}

pub async fn patch_panel(
    State(state): State<Arc<ApiState>>,
    CurrentUser(admin): CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<PatchPanelRequest>,
) -> Result<Json<Panel>, AppError> {
    require_admin(&admin)?;
    let mut panel = state
        .store
        .get_panel(id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("panel {id} not found")))?;
    if let Some(active) = body.active {
        panel.active = active;
    }
    if let Some(room_access) = body.room_access {
        panel.room_access = room_access;
    }
    state.store.update_panel(panel.clone()).await?;
    let (actor_id, actor_tag) = audit::actor_parts(&admin.actor);
    audit::record(state.store.clone(), actor_id, actor_tag, AuditAction::Update, "panel", id.to_string(), serde_json::json!({}));
    Ok(Json(panel))
}

pub async fn delete_panel(
    State(state): State<Arc<ApiState>>,
    CurrentUser(admin): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<(), AppError> {
    require_admin(&admin)?;
    state.store.delete_panel(id).await?;
    let (actor_id, actor_tag) = audit::actor_parts(&admin.actor);
    audit::record(state.store.clone(), actor_id, actor_tag, AuditAction::Delete, "panel", id.to_string(), serde_json::json!({}));
    Ok(())
}
