// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `GET /api/v1/audit` (§4.8): read access to the append-only audit log.
//! Admin-only — a room-scoped user has no business reading other actors'
//! history, and the log carries no room dimension to filter by.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use graylogic_core::model::AuditEntry;
use graylogic_core::{AppError, RoomScope};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::state::ApiState;

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    200
}

#[derive(Debug, Serialize)]
pub struct AuditListResponse {
    pub entries: Vec<AuditEntry>,
}

pub async fn list_audit(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<AuditQuery>,
) -> Result<Json<AuditListResponse>, AppError> {
    if !matches!(user.scope, RoomScope::All) {
        return Err(AppError::PermissionDenied);
    }
    let entries = state.store.list_audit_entries(query.limit.min(1000)).await?;
    Ok(Json(AuditListResponse { entries }))
}
