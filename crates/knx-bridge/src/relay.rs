// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Republishes `device-registry` events onto the MQTT topic namespace.
//! This is the single path by which a state change or command
//! acknowledgement reaches MQTT, whether it originated on the bus, via the
//! HTTP API, or via an MQTT-originated command in the first place.

use std::sync::Arc;

use chrono::Utc;
use device_registry::{AckStage, DeviceRegistry, RegistryEvent};
use mqtt_transport::payload::{AckPayload, AckStage as WireAckStage, StatePayload};
use mqtt_transport::{topic, MqttSession};
use rumqttc::QoS;
use tracing::warn;

const PROTOCOL: &str = "knx";

pub async fn run(registry: Arc<DeviceRegistry>, mqtt: Arc<MqttSession>) {
    let mut events = registry.subscribe();
    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "relay lagged behind registry events");
                continue;
            }
            Err(tokio::sync::broadcast::error::RecvError::Closed) => return,
        };

        match event {
            RegistryEvent::StateChanged { device_id, state, .. } => {
                let payload = StatePayload {
                    device_id: device_id.to_string(),
                    ts: Utc::now(),
                    state,
                    protocol: PROTOCOL.to_owned(),
                    address: device_id.to_string(),
                };
                publish_json(&mqtt, topic::state(PROTOCOL, &device_id.to_string()), &payload, false).await;
            }
            RegistryEvent::CommandAck { command_id, device_id, stage, error, .. } => {
                let payload = AckPayload {
                    command_id,
                    stage: wire_stage(stage),
                    error,
                    ts: Utc::now(),
                };
                publish_json(
                    &mqtt,
                    topic::command_ack(PROTOCOL, &device_id.to_string()),
                    &payload,
                    false,
                )
                .await;
            }
        }
    }
}

fn wire_stage(stage: AckStage) -> WireAckStage {
    match stage {
        AckStage::Accepted => WireAckStage::Accepted,
        AckStage::Applied => WireAckStage::Applied,
        AckStage::Rejected => WireAckStage::Rejected,
        AckStage::Timeout => WireAckStage::Timeout,
    }
}

async fn publish_json(mqtt: &MqttSession, topic: String, payload: &impl serde::Serialize, retain: bool) {
    let Ok(bytes) = serde_json::to_vec(payload) else {
        warn!(topic, "failed to serialise relay payload");
        return;
    };
    if let Err(e) = mqtt.publish(&topic, bytes, QoS::AtLeastOnce, retain).await {
        warn!(topic, err = %e, "failed to publish relayed event");
    }
}


#[cfg(test)]
#[path = "relay_tests.rs"]
mod tests;
