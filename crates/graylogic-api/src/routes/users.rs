// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/api/v1/users` (§4.9): account management. Restricted to callers whose
//! scope is [`RoomScope::All`] — owners and admins — since a room-scoped
//! `User` role has no business provisioning other accounts.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use graylogic_auth::hash_password;
use graylogic_core::model::{AuditAction, Role, User};
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
pub struct UserListResponse {
    pub users: Vec<User>,
}

pub async fn list_users(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<UserListResponse>, AppError> {
    require_admin(&user)?;
    Ok(Json(UserListResponse { users: state.store.list_users().await? }))
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub room_access: Vec<Uuid>,
}

pub async fn create_user(
    State(state): State<Arc<ApiState>>,
    CurrentUser(admin): CurrentUser,
    Json(body): Json<CreateUserRequest>,
) -> Result<Json<User>, AppError> {
    require_admin(&admin)?;
    let new_user = User {
        id: Uuid::new_v4(),
        username: body.username,
        password_hash: hash_password(&body.password)?,
        role: body.role,
        active: true,
        room_access: body.room_access,
        created_at: Utc::now(),
    };
    state.store.insert_user(new_user.clone()).await?;
    let (actor_id, actor_tag) = audit::actor_parts(&admin.actor);
    audit::record(
        state.store.clone(),
        actor_id,
        actor_tag,
        AuditAction::Create,
        "user",
        new_user.id.to_string(),
        serde_json::json!({ "username": new_user.username }),
    );
    Ok(Json(new_user))
}

#[derive(Debug, Deserialize)]
pub struct PatchUserRequest {
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub room_access: Option<Vec<Uuid>>,
    #[serde(default)]
    pub password: Option<String>,
}

pub async fn patch_user(
    State(state): State<Arc<ApiState>>,
    CurrentUser(admin): CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<PatchUserRequest>,
) -> Result<Json<User>, AppError> {
    require_admin(&admin)?;
    let mut target = state
        .store
        .get_user(id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("user {id} not found")))?;
    if let Some(active) = body.active {
        target.active = active;
    }
    if let Some(role) = body.role {
        target.role = role;
    }
    if let Some(room_access) = body.room_access {
        target.room_access = room_access;
    }
    if let Some(password) = body.password {
        target.password_hash = hash_password(&password)?;
    }
    state.store.update_user(target.clone()).await?;
    let (actor_id, actor_tag) = audit::actor_parts(&admin.actor);
    audit::record(state.store.clone(), actor_id, actor_tag, AuditAction::Update, "user", id.to_string(), serde_json::json!({}));
    Ok(Json(target))
}

pub async fn delete_user(
    State(state): State<Arc<ApiState>>,
    CurrentUser(admin): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<(), AppError> {
    require_admin(&admin)?;
    state.store.delete_user(id).await?;
    let (actor_id, actor_tag) = audit::actor_parts(&admin.actor);
    audit::record(state.store.clone(), actor_id, actor_tag, AuditAction::Delete, "user", id.to_string(), serde_json::json!({}));
    Ok(())
}
