// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/api/v1/site`, `/api/v1/areas`, `/api/v1/rooms` (§6). Area/room deletion
//! follows the catalogue's unassign-not-cascade rule (I3): deleting a room
//! clears `room_id` on its devices and scenes rather than deleting them,
//! and deleting an area is rejected while it still has rooms.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use graylogic_core::model::{Area, AuditAction, Room, Site};
use graylogic_core::AppError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit;
use crate::auth::CurrentUser;
use crate::state::ApiState;

pub async fn get_site(State(state): State<Arc<ApiState>>) -> Result<Json<Site>, AppError> {
    state
        .store
        .get_site()
        .await?
        .map(Json)
        .ok_or_else(|| AppError::Internal("site record missing".into()))
}

pub async fn update_site(
    State(state): State<Arc<ApiState>>,
    Json(site): Json<Site>,
) -> Result<Json<Site>, AppError> {
    state.store.upsert_site(site.clone()).await?;
    Ok(Json(site))
}

#[derive(Debug, Serialize)]
pub struct AreaListResponse {
    pub areas: Vec<Area>,
}

pub async fn list_areas(State(state): State<Arc<ApiState>>) -> Result<Json<AreaListResponse>, AppError> {
    Ok(Json(AreaListResponse { areas: state.store.list_areas().await? }))
}

#[derive(Debug, Deserialize)]
pub struct AreaRequest {
    pub slug: String,
    pub name: String,
    pub area_type: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
}

pub async fn create_area(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<AreaRequest>,
) -> Result<Json<Area>, AppError> {
    let area = Area {
        id: Uuid::new_v4(),
        slug: graylogic_core::Slug::new(body.slug).map_err(|e| AppError::Validation(e.to_string()))?,
        name: body.name,
        area_type: body.area_type,
        icon: body.icon,
        sort_order: body.sort_order,
    };
    state.store.insert_area(area.clone()).await?;
    let (actor_id, actor_tag) = audit::actor_parts(&user.actor);
    audit::record(state.store.clone(), actor_id, actor_tag, AuditAction::Create, "area", area.id.to_string(), serde_json::json!({}));
    Ok(Json(area))
}

pub async fn update_area(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<AreaRequest>,
) -> Result<Json<Area>, AppError> {
    let existing = state
        .store
        .get_area(id)
        .await?
        .ok_or_else(|| AppError::RoomNotFound(format!("area {id}")))?;
    let area = Area {
        id,
        slug: existing.slug,
        name: body.name,
        area_type: body.area_type,
        icon: body.icon,
        sort_order: body.sort_order,
    };
    state.store.update_area(area.clone()).await?;
    let (actor_id, actor_tag) = audit::actor_parts(&user.actor);
    audit::record(state.store.clone(), actor_id, actor_tag, AuditAction::Update, "area", id.to_string(), serde_json::json!({}));
    Ok(Json(area))
}

pub async fn delete_area(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<(), AppError> {
    state.store.delete_area(id).await?;
    let (actor_id, actor_tag) = audit::actor_parts(&user.actor);
    audit::record(state.store.clone(), actor_id, actor_tag, AuditAction::Delete, "area", id.to_string(), serde_json::json!({}));
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct RoomListResponse {
    pub rooms: Vec<Room>,
}

pub async fn list_rooms(State(state): State<Arc<ApiState>>) -> Result<Json<RoomListResponse>, AppError> {
    Ok(Json(RoomListResponse { rooms: state.store.list_rooms().await? }))
}

#[derive(Debug, Deserialize)]
pub struct RoomRequest {
    pub area_id: Uuid,
    pub slug: String,
    pub name: String,
    pub room_type: String,
    #[serde(default)]
    pub capacity_hint: Option<i32>,
    #[serde(default)]
    pub sort_order: i32,
}

pub async fn create_room(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<RoomRequest>,
) -> Result<Json<Room>, AppError> {
    let room = Room {
        id: Uuid::new_v4(),
        area_id: body.area_id,
        slug: graylogic_core::Slug::new(body.slug).map_err(|e| AppError::Validation(e.to_string()))?,
        name: body.name,
        room_type: body.room_type,
        capacity_hint: body.capacity_hint,
        sort_order: body.sort_order,
    };
    state.store.insert_room(room.clone()).await?;
    let (actor_id, actor_tag) = audit::actor_parts(&user.actor);
    audit::record(state.store.clone(), actor_id, actor_tag, AuditAction::Create, "room", room.id.to_string(), serde_json::json!({}));
    Ok(Json(room))
}

pub async fn update_room(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<RoomRequest>,
) -> Result<Json<Room>, AppError> {
    let existing = state.store.get_room(id).await?.ok_or_else(|| AppError::RoomNotFound(id.to_string()))?;
    let room = Room {
        id,
        area_id: body.area_id,
        slug: existing.slug,
        name: body.name,
        room_type: body.room_type,
        capacity_hint: body.capacity_hint,
        sort_order: body.sort_order,
    };
    state.store.update_room(room.clone()).await?;
    let (actor_id, actor_tag) = audit::actor_parts(&user.actor);
    audit::record(state.store.clone(), actor_id, actor_tag, AuditAction::Update, "room", id.to_string(), serde_json::json!({}));
    Ok(Json(room))
}

/// Unassigns every device and scene in this room before removing the row
/// itself (I3) — handled entirely inside `CatalogueStore::delete_room`.
pub async fn delete_room(
    State(state): State<Arc<ApiState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<(), AppError> {
    state.store.delete_room(id).await?;
    let (actor_id, actor_tag) = audit::actor_parts(&user.actor);
    audit::record(state.store.clone(), actor_id, actor_tag, AuditAction::Delete, "room", id.to_string(), serde_json::json!({}));
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct HierarchyRoom {
    #[serde(flatten)]
    pub room: Room,
    pub device_count: usize,
    pub scene_count: usize,
}

#[derive(Debug, Serialize)]
pub struct HierarchyArea {
    #[serde(flatten)]
    pub area: Area,
    pub rooms: Vec<HierarchyRoom>,
}

#[derive(Debug, Serialize)]
pub struct HierarchyResponse {
    pub site: Option<Site>,
    pub areas: Vec<HierarchyArea>,
}

/// `GET /api/v1/hierarchy`: the joined site/area/room tree a dashboard
/// fetches once on load rather than stitching together three list calls,
/// annotated with device/scene counts per room (§6).
pub async fn get_hierarchy(State(state): State<Arc<ApiState>>) -> Result<Json<HierarchyResponse>, AppError> {
    let site = state.store.get_site().await?;
    let areas = state.store.list_areas().await?;
    let rooms = state.store.list_rooms().await?;
    let devices = state.store.list_devices().await?;
    let scenes = state.store.list_scenes().await?;

    let areas = areas
        .into_iter()
        .map(|area| {
            let rooms = rooms
                .iter()
                .filter(|r| r.area_id == area.id)
                .cloned()
                .map(|room| {
                    let device_count = devices.iter().filter(|d| d.room_id == Some(room.id)).count();
                    let scene_count = scenes.iter().filter(|s| s.room_id == Some(room.id)).count();
                    HierarchyRoom { room, device_count, scene_count }
                })
                .collect();
            HierarchyArea { area, rooms }
        })
        .collect();
    Ok(Json(HierarchyResponse { site, areas }))
}
