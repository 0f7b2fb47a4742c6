// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Integration tests for the HTTP/WebSocket surface.
//!
//! Uses `axum_test::TestServer` — no real TCP needed.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum_test::TestServer;
use catalogue_store::CatalogueStore;
use chrono::Utc;
use device_registry::DeviceRegistry;
use graylogic_api::{build_router, ApiState};
use graylogic_auth::AuthService;
use graylogic_core::model::{Device, DeviceDomain, DeviceHealth, Protocol, Role, User};
use graylogic_core::value::StateMap;
use graylogic_core::Slug;
use scene_engine::SceneEngine;
use serde_json::json;
use state_fanout::Fanout;
use tokio::sync::mpsc;
use uuid::Uuid;

async fn test_state() -> Arc<ApiState> {
    let store = CatalogueStore::open_in_memory().await.expect("open store");
    let (egress_tx, _egress_rx) = mpsc::channel(16);
    let registry = Arc::new(DeviceRegistry::new(store.clone(), egress_tx));
    let scenes = SceneEngine::new(store.clone(), Arc::clone(&registry));
    let fanout = Fanout::new();
    let auth = Arc::new(AuthService::new(store.clone(), "test-secret".to_owned()));

    Arc::new(ApiState {
        registry,
        scenes,
        fanout,
        store,
        auth,
        bridge_id: "test-bridge".to_owned(),
        supervisor_health: None,
        supervisor: None,
        daemon: None,
    })
}

async fn insert_user(state: &ApiState, username: &str, password: &str, role: Role) -> User {
    let user = User {
        id: Uuid::new_v4(),
        username: username.to_owned(),
        password_hash: graylogic_auth::hash_password(password).expect("hash password"),
        role,
        active: true,
        room_access: Vec::new(),
        created_at: Utc::now(),
    };
    state.store.insert_user(user.clone()).await.expect("insert user");
    user
}

async fn insert_device(state: &ApiState, slug: &str) -> Device {
    let mut address = BTreeMap::new();
    address.insert("switch".to_owned(), "1/1/5".to_owned());
    let device = Device {
        id: Uuid::new_v4(),
        slug: Slug::new(slug).expect("valid slug"),
        name: slug.to_owned(),
        domain: DeviceDomain::Lighting,
        device_type: "switch".to_owned(),
        room_id: None,
        protocol: Protocol::Knx,
        address,
        capabilities: Vec::new(),
        state: StateMap::new(),
        health: DeviceHealth::Online,
        config: serde_json::Value::Null,
        version: 1,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    state.store.insert_device(device.clone()).await.expect("insert device");
    device
}

async fn login(server: &TestServer, username: &str, password: &str) -> String {
    let resp = server.post("/api/v1/auth/login").json(&json!({ "username": username, "password": password })).await;
    resp.assert_status_ok();
    let body: serde_json::Value = resp.json();
    body["token"].as_str().expect("token in login response").to_owned()
}

#[tokio::test]
async fn health_is_public_and_reports_ok() {
    let state = test_state().await;
    let server = TestServer::new(build_router(state)).expect("build test server");

    let resp = server.get("/api/v1/health").await;
    resp.assert_status_ok();
    let body: serde_json::Value = resp.json();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn devices_route_requires_authentication() {
    let state = test_state().await;
    let server = TestServer::new(build_router(state)).expect("build test server");

    let resp = server.get("/api/v1/devices").await;
    resp.assert_status(axum::http::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_then_list_devices_succeeds() {
    let state = test_state().await;
    insert_user(&state, "ada", "correct horse", Role::Owner).await;
    insert_device(&state, "hallway-light").await;

    let server = TestServer::new(build_router(Arc::clone(&state))).expect("build test server");
    let token = login(&server, "ada", "correct horse").await;

    let resp = server.get("/api/v1/devices").add_header(axum::http::header::AUTHORIZATION, format!("Bearer {token}").parse().unwrap()).await;
    resp.assert_status_ok();
    let body: serde_json::Value = resp.json();
    let devices = body["devices"].as_array().expect("devices array");
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0]["slug"], "hallway-light");
}

#[tokio::test]
async fn login_with_wrong_password_is_rejected() {
    let state = test_state().await;
    insert_user(&state, "ada", "correct horse", Role::Owner).await;
    let server = TestServer::new(build_router(state)).expect("build test server");

    let resp = server.post("/api/v1/auth/login").json(&json!({ "username": "ada", "password": "wrong" })).await;
    resp.assert_status(axum::http::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn non_admin_cannot_list_users() {
    let state = test_state().await;
    insert_user(&state, "member", "letmein123", Role::User).await;

    let server = TestServer::new(build_router(Arc::clone(&state))).expect("build test server");
    let token = login(&server, "member", "letmein123").await;

    let resp = server.get("/api/v1/users").add_header(axum::http::header::AUTHORIZATION, format!("Bearer {token}").parse().unwrap()).await;
    resp.assert_status(axum::http::StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_can_list_users() {
    let state = test_state().await;
    insert_user(&state, "owner", "correct horse", Role::Owner).await;

    let server = TestServer::new(build_router(Arc::clone(&state))).expect("build test server");
    let token = login(&server, "owner", "correct horse").await;

    let resp = server.get("/api/v1/users").add_header(axum::http::header::AUTHORIZATION, format!("Bearer {token}").parse().unwrap()).await;
    resp.assert_status_ok();
    let body: serde_json::Value = resp.json();
    let users = body["users"].as_array().expect("users array");
    assert_eq!(users.len(), 1);
}

#[tokio::test]
async fn get_unknown_device_returns_404() {
    let state = test_state().await;
    insert_user(&state, "ada", "correct horse", Role::Owner).await;

    let server = TestServer::new(build_router(Arc::clone(&state))).expect("build test server");
    let token = login(&server, "ada", "correct horse").await;

    let resp = server
        .get(&format!("/api/v1/devices/{}", Uuid::new_v4()))
        .add_header(axum::http::header::AUTHORIZATION, format!("Bearer {token}").parse().unwrap())
        .await;
    resp.assert_status(axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn logout_invalidates_the_session_token() {
    let state = test_state().await;
    insert_user(&state, "ada", "correct horse", Role::Owner).await;

    let server = TestServer::new(build_router(Arc::clone(&state))).expect("build test server");
    let token = login(&server, "ada", "correct horse").await;
    let auth_header: axum::http::HeaderValue = format!("Bearer {token}").parse().unwrap();

    let resp = server.post("/api/v1/auth/logout").add_header(axum::http::header::AUTHORIZATION, auth_header.clone()).await;
    resp.assert_status_ok();

    let resp = server.get("/api/v1/devices").add_header(axum::http::header::AUTHORIZATION, auth_header).await;
    resp.assert_status(axum::http::StatusCode::UNAUTHORIZED);
}
