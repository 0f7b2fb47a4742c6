// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::BTreeMap;
use std::time::Duration;

use catalogue_store::CatalogueStore;
use chrono::Utc;
use device_registry::DeviceRegistry;
use graylogic_core::ids::Slug;
use graylogic_core::model::{
    BindingDirection, Device, DeviceDomain, DeviceHealth, GroupAddressBinding, Protocol,
};
use graylogic_core::value::Capability;
use telegram_codec::{Apci, Apdu, GroupAddress, IndividualAddress, Telegram};
use tokio::sync::mpsc;
use uuid::Uuid;

use super::*;

async fn device(store: &CatalogueStore) -> Uuid {
    let id = Uuid::new_v4();
    let d = Device {
        id,
        slug: Slug::new("ingress-test-light").unwrap(),
        name: "Ingress Test Light".to_owned(),
        domain: DeviceDomain::Lighting,
        device_type: "switch".to_owned(),
        room_id: None,
        protocol: Protocol::Knx,
        address: BTreeMap::new(),
        capabilities: vec![Capability::OnOff],
        state: StateMap::new(),
        health: DeviceHealth::Online,
        config: serde_json::json!({}),
        version: 1,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    store.insert_device(d).await.unwrap();
    store
        .insert_binding(GroupAddressBinding {
            id: Uuid::new_v4(),
            device_id: id,
            capability: Capability::OnOff,
            group_address: "1/1/5".to_owned(),
            datapoint_type: "1.001".to_owned(),
            direction: BindingDirection::Write,
        })
        .await
        .unwrap();
    id
}

fn write_telegram(destination: GroupAddress, value: u8) -> Telegram {
    Telegram::new(
        IndividualAddress::new(1, 1, 1).unwrap(),
        destination,
        Apci::Write,
        Apdu::Short(value),
    )
    .unwrap()
}

#[tokio::test]
async fn bound_write_telegram_merges_device_state() {
    let store = CatalogueStore::open_in_memory().await.unwrap();
    let device_id = device(&store).await;
    let (egress_tx, _egress_rx) = mpsc::channel(1);
    let registry = Arc::new(DeviceRegistry::new(store.clone(), egress_tx));
    let bindings = Arc::new(BindingTable::new());
    bindings.rebuild(&store).await.unwrap();
    let echoes = Arc::new(PendingEchoes::new());

    let (tx, rx) = mpsc::channel(4);
    tx.send(write_telegram("1/1/5".parse().unwrap(), 1)).await.unwrap();
    drop(tx);

    run(rx, Arc::clone(&registry), bindings, store, echoes).await;

    let updated = registry.get(device_id, &graylogic_core::RoomScope::All).await.unwrap();
    assert_eq!(updated.state.get("on"), Some(&graylogic_core::value::CapabilityValue::Bool(true)));
}

#[tokio::test]
async fn bound_write_telegram_also_records_discovery() {
    let store = CatalogueStore::open_in_memory().await.unwrap();
    let _device_id = device(&store).await;
    let (egress_tx, _egress_rx) = mpsc::channel(1);
    let registry = Arc::new(DeviceRegistry::new(store.clone(), egress_tx));
    let bindings = Arc::new(BindingTable::new());
    bindings.rebuild(&store).await.unwrap();
    let echoes = Arc::new(PendingEchoes::new());

    let (tx, rx) = mpsc::channel(4);
    tx.send(write_telegram("1/1/5".parse().unwrap(), 1)).await.unwrap();
    drop(tx);

    run(rx, registry, bindings, store.clone(), echoes).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    let records = store.list_discovery_records().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].address, "1/1/5");
}

#[tokio::test]
async fn unbound_telegram_only_records_discovery() {
    let store = CatalogueStore::open_in_memory().await.unwrap();
    let (egress_tx, _egress_rx) = mpsc::channel(1);
    let registry = Arc::new(DeviceRegistry::new(store.clone(), egress_tx));
    let bindings = Arc::new(BindingTable::new());
    bindings.rebuild(&store).await.unwrap();
    let echoes = Arc::new(PendingEchoes::new());

    let (tx, rx) = mpsc::channel(4);
    tx.send(write_telegram("9/1/1".parse().unwrap(), 1)).await.unwrap();
    drop(tx);

    run(rx, registry, bindings, store.clone(), echoes).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    let records = store.list_discovery_records().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].address, "9/1/1");
}