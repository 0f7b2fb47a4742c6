// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `GET /api/v1/metrics`: a catalogue/activity summary for the admin
//! dashboard. Distinct from `/api/v1/system/status` (bridge/daemon
//! connectivity) — this is inventory and scene-activity counts.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use graylogic_core::AppError;
use serde::Serialize;

use crate::state::ApiState;

#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub device_count: usize,
    pub devices_online: usize,
    pub room_count: usize,
    pub area_count: usize,
    pub scene_count: usize,
    pub scenes_enabled: usize,
}

pub async fn metrics(State(state): State<Arc<ApiState>>) -> Result<Json<MetricsResponse>, AppError> {
    let devices = state.store.list_devices().await?;
    let rooms = state.store.list_rooms().await?;
    let areas = state.store.list_areas().await?;
    let scenes = state.store.list_scenes().await?;

    let devices_online =
        devices.iter().filter(|d| d.health == graylogic_core::model::DeviceHealth::Online).count();
    let scenes_enabled = scenes.iter().filter(|s| s.enabled).count();

    Ok(Json(MetricsResponse {
        device_count: devices.len(),
        devices_online,
        room_count: rooms.len(),
        area_count: areas.len(),
        scene_count: scenes.len(),
        scenes_enabled,
    }))
}
