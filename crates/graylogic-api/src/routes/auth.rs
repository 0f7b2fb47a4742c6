// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/api/v1/auth/login` — the only write path reachable with no bearer
//! token (it produces one). See [`crate::auth`] for the middleware that
//! gates everything else.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use graylogic_core::model::{AuditAction, Role, User};
use graylogic_core::AppError;
use serde::{Deserialize, Serialize};

use crate::audit;
use crate::auth::{bearer_token_from_headers, CurrentUser};
use crate::state::ApiState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: uuid::Uuid,
    pub username: String,
    pub role: Role,
}

pub async fn login(
    State(state): State<Arc<ApiState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let (token, user): (String, User) = state.auth.login(&body.username, &body.password).await?;
    audit::record(
        state.store.clone(),
        Some(user.id),
        None,
        AuditAction::Login,
        "user",
        user.id.to_string(),
        serde_json::json!({ "username": user.username }),
    );
    Ok(Json(LoginResponse { token, user_id: user.id, username: user.username, role: user.role }))
}

/// `POST /api/v1/auth/logout`: revokes the session backing the caller's own
/// bearer token. Requires that token to still be present on this request
/// (it was already validated once by [`crate::auth::auth_layer`]).
pub async fn logout(
    State(state): State<Arc<ApiState>>,
    CurrentUser(_user): CurrentUser,
    headers: axum::http::HeaderMap,
) -> Result<(), AppError> {
    let token = bearer_token_from_headers(&headers).ok_or(AppError::Unauthenticated)?;
    state.auth.logout(token).await
}
