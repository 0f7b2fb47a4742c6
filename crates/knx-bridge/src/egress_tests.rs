// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use catalogue_store::CatalogueStore;
use graylogic_core::model::{BindingDirection, GroupAddressBinding};
use graylogic_core::value::Capability;
use uuid::Uuid;

use super::*;

async fn table_with(device_id: Uuid, capability: Capability, address: &str, dpt: &str) -> BindingTable {
    let store = CatalogueStore::open_in_memory().await.unwrap();
    store
        .insert_binding(GroupAddressBinding {
            id: Uuid::new_v4(),
            device_id,
            capability,
            group_address: address.to_owned(),
            datapoint_type: dpt.to_owned(),
            direction: BindingDirection::Write,
        })
        .await
        .unwrap();
    let table = BindingTable::new();
    table.rebuild(&store).await.unwrap();
    table
}

#[tokio::test]
async fn on_off_encodes_as_a_folded_bool() {
    let device_id = Uuid::new_v4();
    let table = table_with(device_id, Capability::OnOff, "1/1/5", "1.001").await;
    let (apci, address, apdu) = plan(device_id, &DomainCommand::On, &table).unwrap();
    assert_eq!(apci, Apci::Write);
    assert_eq!(address, "1/1/5".parse().unwrap());
    assert_eq!(apdu, Apdu::Short(1));
}

#[tokio::test]
async fn set_level_encodes_as_a_scaled_percent() {
    let device_id = Uuid::new_v4();
    let table = table_with(device_id, Capability::Dim, "1/2/5", "5.001").await;
    let (_, _, apdu) = plan(device_id, &DomainCommand::SetLevel { level: 50 }, &table).unwrap();
    assert_eq!(apdu, Apdu::Long(vec![127]));
}

#[tokio::test]
async fn stop_writes_a_bare_bit_regardless_of_configured_dpt() {
    let device_id = Uuid::new_v4();
    let table = table_with(device_id, Capability::Position, "1/3/5", "5.001").await;
    let (_, _, apdu) = plan(device_id, &DomainCommand::Stop, &table).unwrap();
    assert_eq!(apdu, Apdu::Short(0x01));
}

#[tokio::test]
async fn missing_binding_is_rejected_with_a_reason() {
    let table = BindingTable::new();
    let err = plan(Uuid::new_v4(), &DomainCommand::On, &table).unwrap_err();
    assert!(err.contains("no writable"));
}