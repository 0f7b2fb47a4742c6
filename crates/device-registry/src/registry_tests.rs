// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::BTreeMap;
use std::time::Duration;

use catalogue_store::CatalogueStore;
use chrono::Utc;
use graylogic_core::ids::Slug;
use graylogic_core::model::{DeviceDomain, DeviceHealth, Protocol};
use graylogic_core::value::CapabilityValue;

use super::*;

fn sample_device(room_id: Option<Uuid>, health: DeviceHealth) -> Device {
    Device {
        id: Uuid::new_v4(),
        slug: Slug::new("light-registry-test").unwrap(),
        name: "Registry Test Light".to_owned(),
        domain: DeviceDomain::Lighting,
        device_type: "dimmer".to_owned(),
        room_id,
        protocol: Protocol::Knx,
        address: BTreeMap::new(),
        capabilities: vec![Capability::OnOff, Capability::Dim],
        state: StateMap::new(),
        health,
        config: serde_json::json!({}),
        version: 1,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

async fn new_registry() -> (DeviceRegistry, mpsc::Receiver<EgressRequest>) {
    let store = CatalogueStore::open_in_memory().await.unwrap();
    let (egress_tx, egress_rx) = mpsc::channel(8);
    (DeviceRegistry::new(store, egress_tx), egress_rx)
}

#[tokio::test]
async fn get_reports_not_found_for_unknown_device() {
    let (registry, _rx) = new_registry().await;
    let err = registry.get(Uuid::new_v4(), &RoomScope::All).await.unwrap_err();
    assert!(matches!(err, AppError::DeviceNotFound(_)));
}

#[tokio::test]
async fn get_is_denied_outside_the_caller_room_scope() {
    let (registry, _rx) = new_registry().await;
    let room = Uuid::new_v4();
    let device = sample_device(Some(room), DeviceHealth::Online);
    registry.create_device(device.clone()).await.unwrap();

    let scope = RoomScope::Rooms(vec![Uuid::new_v4()]);
    let err = registry.get(device.id, &scope).await.unwrap_err();
    assert!(matches!(err, AppError::PermissionDenied));

    let scope = RoomScope::Rooms(vec![room]);
    assert!(registry.get(device.id, &scope).await.is_ok());
}

#[tokio::test]
async fn update_state_rejects_keys_outside_capabilities() {
    let (registry, _rx) = new_registry().await;
    let device = sample_device(None, DeviceHealth::Online);
    registry.create_device(device.clone()).await.unwrap();

    let mut partial = StateMap::new();
    partial.insert("temperature".to_owned(), CapabilityValue::Celsius(21.0));
    let err = registry.update_state(device.id, partial, "bridge".to_owned()).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn update_state_merges_and_broadcasts() {
    let (registry, _rx) = new_registry().await;
    let device = sample_device(None, DeviceHealth::Online);
    registry.create_device(device.clone()).await.unwrap();
    let mut events = registry.subscribe();

    let mut partial = StateMap::new();
    partial.insert("on".to_owned(), CapabilityValue::Bool(true));
    let updated = registry.update_state(device.id, partial, "bridge".to_owned()).await.unwrap();
    assert_eq!(updated.state.get("on"), Some(&CapabilityValue::Bool(true)));

    let event = events.recv().await.unwrap();
    match event {
        RegistryEvent::StateChanged { device_id, state, .. } => {
            assert_eq!(device_id, device.id);
            assert_eq!(state.get("on"), Some(&CapabilityValue::Bool(true)));
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn apply_command_rejects_offline_device() {
    let (registry, _rx) = new_registry().await;
    let device = sample_device(None, DeviceHealth::Offline);
    registry.create_device(device.clone()).await.unwrap();

    let err = registry
        .apply_command(device.id, DomainCommand::On, "owner".to_owned(), &RoomScope::All)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DeviceOffline(_)));
}

#[tokio::test]
async fn apply_command_resolves_toggle_and_awaits_stage_one() {
    let (registry, mut rx) = new_registry().await;
    let device = sample_device(None, DeviceHealth::Online);
    registry.create_device(device.clone()).await.unwrap();

    let bridge = tokio::spawn(async move {
        let request = rx.recv().await.unwrap();
        assert_eq!(request.command, DomainCommand::On);
        let _ = request.stage1_reply.send(Stage1Outcome::Accepted);
        let _ = request.stage2_reply.send(Stage2Outcome::Applied);
    });

    let outcome = registry
        .apply_command(device.id, DomainCommand::Toggle, "owner".to_owned(), &RoomScope::All)
        .await
        .unwrap();
    assert_eq!(outcome, Stage1Outcome::Accepted);
    bridge.await.unwrap();
}

#[tokio::test]
async fn apply_command_publishes_stage_two_ack() {
    let (registry, mut rx) = new_registry().await;
    let device = sample_device(None, DeviceHealth::Online);
    registry.create_device(device.clone()).await.unwrap();
    let mut events = registry.subscribe();

    tokio::spawn(async move {
        let request = rx.recv().await.unwrap();
        let _ = request.stage1_reply.send(Stage1Outcome::Accepted);
        let _ = request.stage2_reply.send(Stage2Outcome::Applied);
    });

    registry
        .apply_command(device.id, DomainCommand::On, "owner".to_owned(), &RoomScope::All)
        .await
        .unwrap();

    let ack = tokio::time::timeout(Duration::from_secs(1), events.recv()).await.unwrap().unwrap();
    match ack {
        RegistryEvent::CommandAck { stage, .. } => assert_eq!(stage, AckStage::Applied),
        other => panic!("unexpected event: {other:?}"),
    }
}