// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::BTreeMap;

use chrono::Utc;
use graylogic_core::ids::Slug;
use graylogic_core::model::*;
use graylogic_core::value::{Capability, CapabilityValue, StateMap};
use uuid::Uuid;

use super::*;
use crate::error::StoreError;

fn area(slug: &str) -> Area {
    Area {
        id: Uuid::new_v4(),
        slug: Slug::new(slug).unwrap(),
        name: slug.to_owned(),
        area_type: "floor".to_owned(),
        icon: None,
        sort_order: 0,
    }
}

fn room(area_id: Uuid, slug: &str) -> Room {
    Room {
        id: Uuid::new_v4(),
        area_id,
        slug: Slug::new(slug).unwrap(),
        name: slug.to_owned(),
        room_type: "living".to_owned(),
        capacity_hint: Some(4),
        sort_order: 0,
    }
}

fn device(room_id: Option<Uuid>, slug: &str) -> Device {
    let mut address = BTreeMap::new();
    address.insert("switch".to_owned(), "1/1/5".to_owned());
    Device {
        id: Uuid::new_v4(),
        slug: Slug::new(slug).unwrap(),
        name: slug.to_owned(),
        domain: DeviceDomain::Lighting,
        device_type: "dimmer".to_owned(),
        room_id,
        protocol: Protocol::Knx,
        address,
        capabilities: vec![Capability::OnOff, Capability::Dim],
        state: BTreeMap::new(),
        health: DeviceHealth::Offline,
        config: serde_json::json!({}),
        version: 1,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn binding(device_id: Uuid) -> GroupAddressBinding {
    GroupAddressBinding {
        id: Uuid::new_v4(),
        device_id,
        capability: Capability::OnOff,
        group_address: "1/1/5".to_owned(),
        datapoint_type: "1.001".to_owned(),
        direction: BindingDirection::Write,
    }
}

fn scene(room_id: Option<Uuid>, slug: &str, device_id: Uuid) -> Scene {
    let now = Utc::now();
    Scene {
        id: Uuid::new_v4(),
        slug: Slug::new(slug).unwrap(),
        name: slug.to_owned(),
        room_id,
        category: Some("evening".to_owned()),
        priority: 50,
        enabled: true,
        actions: vec![SceneAction {
            id: Uuid::new_v4(),
            scene_id: Uuid::nil(),
            device_id,
            command: SceneCommandKind::On,
            parameters: serde_json::json!({}),
            delay_ms: 0,
            fade_ms: 0,
            parallel: false,
            continue_on_error: false,
            sort_order: 0,
        }],
        version: 1,
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn area_room_device_lifecycle() {
    let store = CatalogueStore::open_in_memory().await.unwrap();

    let a = area("ground-floor");
    store.insert_area(a.clone()).await.unwrap();
    let fetched = store.get_area(a.id).await.unwrap().unwrap();
    assert_eq!(fetched.name, "ground-floor");

    let r = room(a.id, "living-room");
    store.insert_room(r.clone()).await.unwrap();

    let d = device(Some(r.id), "light-living");
    store.insert_device(d.clone()).await.unwrap();

    let by_room = store.list_devices_by_room(r.id).await.unwrap();
    assert_eq!(by_room.len(), 1);
    assert_eq!(by_room[0].id, d.id);

    // deleting the room unassigns the device rather than deleting it
    store.delete_room(r.id).await.unwrap();
    let refetched = store.get_device(d.id).await.unwrap().unwrap();
    assert_eq!(refetched.room_id, None);
}

#[tokio::test]
async fn area_delete_rejected_while_it_has_rooms() {
    let store = CatalogueStore::open_in_memory().await.unwrap();
    let a = area("upstairs");
    store.insert_area(a.clone()).await.unwrap();
    store.insert_room(room(a.id, "bedroom")).await.unwrap();

    let err = store.delete_area(a.id).await.unwrap_err();
    assert!(matches!(err, StoreError::HasDependents(_)));
}

#[tokio::test]
async fn device_state_merge_is_additive() {
    let store = CatalogueStore::open_in_memory().await.unwrap();
    let d = device(None, "light-hall");
    store.insert_device(d.clone()).await.unwrap();

    let mut partial = StateMap::new();
    partial.insert("on".to_owned(), CapabilityValue::Bool(true));
    let updated = store.merge_device_state(d.id, partial).await.unwrap();
    assert_eq!(updated.state.get("on"), Some(&CapabilityValue::Bool(true)));

    let mut partial2 = StateMap::new();
    partial2.insert("level".to_owned(), CapabilityValue::Percent(80));
    let updated2 = store.merge_device_state(d.id, partial2).await.unwrap();
    assert_eq!(updated2.state.get("on"), Some(&CapabilityValue::Bool(true)));
    assert_eq!(updated2.state.get("level"), Some(&CapabilityValue::Percent(80)));
}

#[tokio::test]
async fn device_field_update_bumps_version() {
    let store = CatalogueStore::open_in_memory().await.unwrap();
    let d = device(None, "blind-office");
    store.insert_device(d.clone()).await.unwrap();

    store.update_device_fields(d.id, Some("Office Blind".to_owned()), None).await.unwrap();
    let updated = store.get_device(d.id).await.unwrap().unwrap();
    assert_eq!(updated.name, "Office Blind");
    assert_eq!(updated.version, 2);
}

#[tokio::test]
async fn bindings_round_trip_and_rebuild() {
    let store = CatalogueStore::open_in_memory().await.unwrap();
    let d = device(None, "light-kitchen");
    store.insert_device(d.clone()).await.unwrap();
    store.insert_binding(binding(d.id)).await.unwrap();

    let all = store.list_all_bindings().await.unwrap();
    assert_eq!(all.len(), 1);

    let replacement = vec![binding(d.id), binding(d.id)];
    store.replace_bindings_for_device(d.id, replacement).await.unwrap();
    let rebuilt = store.list_bindings_by_device(d.id).await.unwrap();
    assert_eq!(rebuilt.len(), 2);
}

#[tokio::test]
async fn scene_insert_get_and_replace() {
    let store = CatalogueStore::open_in_memory().await.unwrap();
    let d = device(None, "light-den");
    store.insert_device(d.clone()).await.unwrap();

    let mut s = scene(None, "movie-night", d.id);
    store.insert_scene(s.clone()).await.unwrap();

    let fetched = store.get_scene(s.id).await.unwrap().unwrap();
    assert_eq!(fetched.actions.len(), 1);
    assert_eq!(fetched.actions[0].device_id, d.id);

    s.name = "Movie Night".to_owned();
    s.actions[0].fade_ms = 2000;
    store.replace_scene(s.clone()).await.unwrap();

    let refetched = store.get_scene(s.id).await.unwrap().unwrap();
    assert_eq!(refetched.name, "Movie Night");
    assert_eq!(refetched.version, 2);
    assert_eq!(refetched.actions[0].fade_ms, 2000);
}

#[tokio::test]
async fn scene_execution_history_tracks_status() {
    let store = CatalogueStore::open_in_memory().await.unwrap();
    let d = device(None, "light-bath");
    store.insert_device(d.clone()).await.unwrap();
    let s = scene(None, "morning", d.id);
    store.insert_scene(s.clone()).await.unwrap();

    let now = Utc::now();
    let exec = SceneExecution {
        id: Uuid::new_v4(),
        scene_id: s.id,
        started_at: now,
        finished_at: None,
        trigger_kind: TriggerKind::Api,
        trigger_source: "user:owner".to_owned(),
        action_count: 1,
        success_count: 0,
        failure_count: 0,
        skipped_count: 0,
        status: ExecutionStatus::Running,
        duration_ms: None,
    };
    store.insert_execution(exec.clone()).await.unwrap();

    let mut finished = exec.clone();
    finished.status = ExecutionStatus::Completed;
    finished.success_count = 1;
    finished.finished_at = Some(now);
    finished.duration_ms = Some(120);
    store.update_execution(finished).await.unwrap();

    let history = store.list_executions_by_scene(s.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, ExecutionStatus::Completed);
    assert_eq!(history[0].success_count, 1);
}

#[tokio::test]
async fn user_session_and_panel_round_trip() {
    let store = CatalogueStore::open_in_memory().await.unwrap();

    let user = User {
        id: Uuid::new_v4(),
        username: "ada".to_owned(),
        password_hash: "argon2-hash".to_owned(),
        role: Role::Owner,
        active: true,
        room_access: Vec::new(),
        created_at: Utc::now(),
    };
    store.insert_user(user.clone()).await.unwrap();
    let fetched = store.get_user_by_username("ada".to_owned()).await.unwrap().unwrap();
    assert_eq!(fetched.id, user.id);

    let session = Session {
        id: Uuid::new_v4(),
        user_id: user.id,
        token_hash: "tokenhash".to_owned(),
        expires_at: Utc::now(),
        revoked: false,
        device_info: Some("web".to_owned()),
        created_at: Utc::now(),
    };
    store.insert_session(session.clone()).await.unwrap();
    let by_hash = store.get_session_by_token_hash("tokenhash".to_owned()).await.unwrap().unwrap();
    assert!(!by_hash.revoked);

    store.revoke_session(session.id).await.unwrap();
    let panel = Panel {
        id: Uuid::new_v4(),
        slug: Slug::new("front-door").unwrap(),
        name: "Front Door Panel".to_owned(),
        token_hash: "panelhash".to_owned(),
        room_access: Vec::new(),
        active: true,
        created_at: Utc::now(),
    };
    store.insert_panel(panel.clone()).await.unwrap();
    let panels = store.list_panels().await.unwrap();
    assert_eq!(panels.len(), 1);
}

#[tokio::test]
async fn audit_log_is_append_only_history() {
    let store = CatalogueStore::open_in_memory().await.unwrap();
    let entry = AuditEntry {
        id: Uuid::new_v4(),
        created_at: Utc::now(),
        actor_id: None,
        actor_tag: Some("system".to_owned()),
        action: AuditAction::Command,
        entity_type: "device".to_owned(),
        entity_id: "light-living".to_owned(),
        details: serde_json::json!({"command": "on"}),
    };
    store.insert_audit_entry(entry).await.unwrap();
    let entries = store.list_audit_entries(10).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].entity_id, "light-living");
}

#[tokio::test]
async fn discovery_touch_increments_count() {
    let store = CatalogueStore::open_in_memory().await.unwrap();
    store.touch_discovery("1/2/9".to_owned()).await.unwrap();
    store.touch_discovery("1/2/9".to_owned()).await.unwrap();

    let records = store.list_discovery_records().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].count, 2);
}