// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The HTTP/WebSocket control surface (§6): a thin axum layer over
//! `device-registry`, `scene-engine`, `state-fanout`, `catalogue-store` and
//! `graylogic-auth`. Owns request validation, authorisation and DTO shaping
//! only — no domain logic lives here.

pub mod audit;
pub mod auth;
mod routes;
pub mod state;

use std::sync::Arc;

use axum::middleware;
use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::cors::CorsLayer;

pub use state::ApiState;

/// Assembles the full route table and layers auth/CORS on top: routes
/// first, auth middleware last-before-state so every handler sees a
/// resolved `AuthContext` extension except the explicitly exempted paths
/// in [`auth::is_public`].
pub fn build_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(routes::system::health))
        .route("/api/v1/system/status", get(routes::system::system_status))
        .route("/api/v1/system/daemon/restart", post(routes::system::restart_daemon))
        .route("/api/v1/auth/login", post(routes::auth::login))
        .route("/api/v1/auth/logout", post(routes::auth::logout))
        .route("/api/v1/devices", get(routes::devices::list_devices))
        .route("/api/v1/devices/{id}", get(routes::devices::get_device).patch(routes::devices::patch_device))
        .route("/api/v1/devices/{id}/command", post(routes::devices::issue_command))
        .route("/api/v1/scenes", get(routes::scenes::list_scenes).post(routes::scenes::create_scene))
        .route(
            "/api/v1/scenes/{id}",
            get(routes::scenes::get_scene)
                .patch(routes::scenes::update_scene)
                .delete(routes::scenes::delete_scene),
        )
        .route("/api/v1/scenes/{id}/activate", post(routes::scenes::activate_scene))
        .route("/api/v1/scenes/{id}/executions", get(routes::scenes::list_executions))
        .route("/api/v1/site", get(routes::hierarchy::get_site).put(routes::hierarchy::update_site))
        .route("/api/v1/hierarchy", get(routes::hierarchy::get_hierarchy))
        .route("/api/v1/areas", get(routes::hierarchy::list_areas).post(routes::hierarchy::create_area))
        .route(
            "/api/v1/areas/{id}",
            patch(routes::hierarchy::update_area).delete(routes::hierarchy::delete_area),
        )
        .route("/api/v1/rooms", get(routes::hierarchy::list_rooms).post(routes::hierarchy::create_room))
        .route(
            "/api/v1/rooms/{id}",
            patch(routes::hierarchy::update_room).delete(routes::hierarchy::delete_room),
        )
        .route("/api/v1/users", get(routes::users::list_users).post(routes::users::create_user))
        .route(
            "/api/v1/users/{id}",
            patch(routes::users::patch_user).delete(routes::users::delete_user),
        )
        .route("/api/v1/panels", get(routes::panels::list_panels).post(routes::panels::create_panel))
        .route(
            "/api/v1/panels/{id}",
            patch(routes::panels::patch_panel).delete(routes::panels::delete_panel),
        )
        .route("/api/v1/discovery", get(routes::discovery::list_discovery))
        .route("/api/v1/metrics", get(routes::metrics::metrics))
        .route("/api/v1/audit", get(routes::audit::list_audit))
        .route("/api/v1/ws", get(routes::ws::ws_handler))
        .layer(middleware::from_fn_with_state(state.clone(), auth::auth_layer))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
