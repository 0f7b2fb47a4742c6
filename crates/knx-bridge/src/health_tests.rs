// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use daemon_supervisor::HealthLayers;

use super::*;

#[test]
fn disconnected_daemon_is_always_offline() {
    let layers = HealthLayers {
        l0_usb_present: true,
        l1_process_alive: true,
        l2_socket_accepting: true,
        l3_bus_traffic_recent: true,
    };
    assert_eq!(derive_status(layers, false), BridgeStatus::Offline);
}

#[test]
fn connected_with_all_layers_healthy_is_online() {
    let layers = HealthLayers {
        l0_usb_present: true,
        l1_process_alive: true,
        l2_socket_accepting: true,
        l3_bus_traffic_recent: true,
    };
    assert_eq!(derive_status(layers, true), BridgeStatus::Online);
}

#[test]
fn connected_with_a_degraded_layer_is_degraded() {
    let layers = HealthLayers { l3_bus_traffic_recent: false, ..Default::default() };
    assert_eq!(derive_status(layers, true), BridgeStatus::Degraded);
}