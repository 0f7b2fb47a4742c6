// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `GET /api/v1/discovery` (§3): addresses observed on the bus that carry
//! no binding, surfaced so an installer can wire up a `GroupAddressBinding`
//! for them without sniffing the bus by hand.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use graylogic_core::model::DiscoveryRecord;
use graylogic_core::AppError;
use serde::Serialize;

use crate::state::ApiState;

#[derive(Debug, Serialize)]
pub struct DiscoveryListResponse {
    pub records: Vec<DiscoveryRecord>,
}

pub async fn list_discovery(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<DiscoveryListResponse>, AppError> {
    Ok(Json(DiscoveryListResponse { records: state.store.list_discovery_records().await? }))
}
