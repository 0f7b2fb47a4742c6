// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use chrono::Utc;
use device_registry::AckStage;
use uuid::Uuid;

use super::*;

fn state_changed(room_id: Option<Uuid>) -> RegistryEvent {
    RegistryEvent::StateChanged {
        device_id: Uuid::new_v4(),
        room_id,
        state: graylogic_core::value::StateMap::new(),
        source_tag: "bridge".to_owned(),
        ts: Utc::now(),
    }
}

#[tokio::test]
async fn a_system_wide_client_receives_events_for_any_room() {
    let hub = Fanout::new();
    let (_id, mut rx) = hub.subscribe(RoomScope::All).await;

    hub.dispatch(state_changed(Some(Uuid::new_v4())).into()).await;

    let received = tokio::time::timeout(Duration::from_millis(200), rx.recv()).await.unwrap();
    assert!(received.is_some());
}

#[tokio::test]
async fn a_room_scoped_client_does_not_receive_events_for_other_rooms() {
    let hub = Fanout::new();
    let room = Uuid::new_v4();
    let (_id, mut rx) = hub.subscribe(RoomScope::Rooms(vec![room])).await;

    hub.dispatch(state_changed(Some(Uuid::new_v4())).into()).await;
    hub.dispatch(state_changed(Some(room)).into()).await;

    let received = tokio::time::timeout(Duration::from_millis(200), rx.recv()).await.unwrap().unwrap();
    match received {
        WsMessage::StateChanged { room_id, .. } => assert_eq!(room_id, Some(room)),
        other => panic!("unexpected message: {other:?}"),
    }
}

#[tokio::test]
async fn a_command_ack_carries_no_room_and_reaches_only_system_wide_clients() {
    let hub = Fanout::new();
    let (_sys, mut sys_rx) = hub.subscribe(RoomScope::All).await;
    let (_room, mut room_rx) = hub.subscribe(RoomScope::Rooms(vec![Uuid::new_v4()])).await;

    let ack = RegistryEvent::CommandAck {
        command_id: Uuid::new_v4(),
        device_id: Uuid::new_v4(),
        stage: AckStage::Applied,
        error: None,
        ts: Utc::now(),
    };
    hub.dispatch(ack.into()).await;

    assert!(tokio::time::timeout(Duration::from_millis(200), sys_rx.recv()).await.unwrap().is_some());
    assert!(tokio::time::timeout(Duration::from_millis(100), room_rx.recv()).await.is_err());
}

#[tokio::test]
async fn a_client_whose_queue_overflows_is_dropped() {
    let hub = Fanout::new();
    let (id, _rx) = hub.subscribe(RoomScope::All).await;

    for _ in 0..CLIENT_QUEUE_CAPACITY + 1 {
        hub.dispatch(state_changed(None).into()).await;
    }

    assert!(!hub.clients.read().await.contains_key(&id));
}

#[tokio::test]
async fn unsubscribe_removes_the_client() {
    let hub = Fanout::new();
    let (id, _rx) = hub.subscribe(RoomScope::All).await;
    hub.unsubscribe(id).await;
    assert!(!hub.clients.read().await.contains_key(&id));
}