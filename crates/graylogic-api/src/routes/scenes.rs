// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/api/v1/scenes` (§6): CRUD over scene programmes plus activation and
//! execution history. Activation hands off to [`SceneEngine`] and returns
//! as soon as the new execution's `pending` row is durable — completion is
//! observed via `GET .../executions` or the `scene_event` WebSocket frame.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use graylogic_core::model::{AuditAction, Scene, SceneAction, SceneExecution, TriggerKind};
use graylogic_core::AppError;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::audit;
use crate::auth::CurrentUser;
use crate::state::ApiState;

#[derive(Debug, Serialize)]
pub struct SceneListResponse {
    pub scenes: Vec<Scene>,
}

pub async fn list_scenes(State(state): State<Arc<ApiState>>) -> Result<Json<SceneListResponse>, AppError> {
    Ok(Json(SceneListResponse { scenes: state.store.list_scenes().await? }))
}

pub async fn get_scene(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Scene>, AppError> {
    state.store.get_scene(id).await?.map(Json).ok_or_else(|| AppError::SceneNotFound(id.to_string()))
}

#[derive(Debug, Deserialize)]
pub struct SceneActionRequest {
    pub device_id: Uuid,
    pub command: graylogic_core::model::SceneCommandKind,
    #[serde(default)]
    pub parameters: serde_json::Value,
    #[serde(default)]
    pub delay_ms: u32,
    #[serde(default)]
    pub fade_ms: u32,
    #[serde(default)]
    pub parallel: bool,
    #[serde(default)]
    pub continue_on_error: bool,
}

#[derive(Debug, Deserialize)]
pub struct PutSceneRequest {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub room_id: Option<Uuid>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "default_priority")]
    pub priority: u8,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub actions: Vec<SceneActionRequest>,
}

fn default_priority() -> u8 {
    50
}
fn default_true() -> bool {
    true
}

fn actions_from_request(scene_id: Uuid, requests: Vec<SceneActionRequest>) -> Vec<SceneAction> {
    requests
        .into_iter()
        .enumerate()
        .map(|(i, a)| SceneAction {
            id: Uuid::new_v4(),
            scene_id,
            device_id: a.device_id,
            command: a.command,
            parameters: a.parameters,
            delay_ms: a.delay_ms,
            fade_ms: a.fade_ms,
            parallel: a.parallel,
            continue_on_error: a.continue_on_error,
            sort_order: i as i32,
        })
        .collect()
}

pub async fn create_scene(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<PutSceneRequest>,
) -> Result<Json<Scene>, AppError> {
    let id = Uuid::new_v4();
    let now = Utc::now();
    let slug = graylogic_core::Slug::new(body.slug).map_err(|e| AppError::Validation(e.to_string()))?;
    let scene = Scene {
        id,
        slug,
        name: body.name,
        room_id: body.room_id,
        category: body.category,
        priority: body.priority,
        enabled: body.enabled,
        actions: actions_from_request(id, body.actions),
        version: 1,
        created_at: now,
        updated_at: now,
    };
    state.store.insert_scene(scene.clone()).await?;
    let (actor_id, actor_tag) = audit::actor_parts(&user.actor);
    audit::record(
        state.store.clone(),
        actor_id,
        actor_tag,
        AuditAction::Create,
        "scene",
        id.to_string(),
        serde_json::json!({ "slug": scene.slug.as_str() }),
    );
    Ok(Json(scene))
}

pub async fn update_scene(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<PutSceneRequest>,
) -> Result<Json<Scene>, AppError> {
    let existing =
        state.store.get_scene(id).await?.ok_or_else(|| AppError::SceneNotFound(id.to_string()))?;
    let scene = Scene {
        id,
        slug: existing.slug,
        name: body.name,
        room_id: body.room_id,
        category: body.category,
        priority: body.priority,
        enabled: body.enabled,
        actions: actions_from_request(id, body.actions),
        version: existing.version,
        created_at: existing.created_at,
        updated_at: Utc::now(),
    };
    state.store.replace_scene(scene.clone()).await?;
    let (actor_id, actor_tag) = audit::actor_parts(&user.actor);
    audit::record(
        state.store.clone(),
        actor_id,
        actor_tag,
        AuditAction::Update,
        "scene",
        id.to_string(),
        serde_json::json!({ "slug": scene.slug.as_str() }),
    );
    Ok(Json(state.store.get_scene(id).await?.unwrap_or(scene)))
}

pub async fn delete_scene(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<(), AppError> {
    state.store.delete_scene(id).await?;
    let (actor_id, actor_tag) = audit::actor_parts(&user.actor);
    audit::record(state.store.clone(), actor_id, actor_tag, AuditAction::Delete, "scene", id.to_string(), serde_json::json!({}));
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct ActivateResponse {
    pub execution_id: Uuid,
}

/// `POST /api/v1/scenes/{id}/activate`. `ErrSceneBusy` (409) if an
/// execution for this scene is already running (§4.6, testable property
/// "idempotent activation").
pub async fn activate_scene(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ActivateResponse>, AppError> {
    let execution_id = state
        .scenes
        .activate(id, TriggerKind::Api, user.actor.clone(), CancellationToken::new())
        .await?;
    Ok(Json(ActivateResponse { execution_id }))
}

#[derive(Debug, Serialize)]
pub struct ExecutionListResponse {
    pub executions: Vec<SceneExecution>,
}

pub async fn list_executions(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ExecutionListResponse>, AppError> {
    Ok(Json(ExecutionListResponse { executions: state.store.list_executions_by_scene(id).await? }))
}
