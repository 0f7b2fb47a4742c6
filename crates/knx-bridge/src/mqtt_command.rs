// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The MQTT-originated half of egress (§4.4 "Egress", §6): a command
//! published to `graylogic/command/<protocol>/<device-id>` is routed
//! through the same [`device_registry::DeviceRegistry::apply_command`] path
//! as an HTTP command, and its stage-one outcome is published back onto the
//! `/ack` topic immediately (stage two arrives later via [`crate::relay`],
//! which republishes every [`device_registry::RegistryEvent::CommandAck`]
//! regardless of where the command originated).

use std::sync::Arc;

use chrono::Utc;
use device_registry::{DeviceRegistry, Stage1Outcome};
use graylogic_core::value::DomainCommand;
use graylogic_core::{AppError, RoomScope};
use mqtt_transport::payload::{AckPayload, AckStage, CommandPayload};
use mqtt_transport::{topic, CommandCallback, MqttSession};
use rumqttc::QoS;
use tracing::warn;
use uuid::Uuid;

const PROTOCOL: &str = "knx";
const SOURCE_ACTOR: &str = "mqtt";

/// Builds the [`CommandCallback`] handed to [`MqttSession::run`]. Every
/// inbound publish on the command filter is decoded and dispatched onto its
/// own task so a slow or stuck command never blocks the MQTT event loop.
pub fn callback(registry: Arc<DeviceRegistry>, mqtt: Arc<MqttSession>) -> CommandCallback {
    Arc::new(move |topic, payload| {
        let Some((protocol, device_id)) = topic::parse_command_topic(&topic) else {
            return;
        };
        if protocol != PROTOCOL {
            return;
        }
        let Ok(device_id) = device_id.parse::<Uuid>() else {
            warn!(device_id, "mqtt command topic device id is not a UUID");
            return;
        };

        let registry = Arc::clone(&registry);
        let mqtt = Arc::clone(&mqtt);
        tokio::spawn(async move {
            handle(registry, mqtt, device_id, payload).await;
        });
    })
}

async fn handle(registry: Arc<DeviceRegistry>, mqtt: Arc<MqttSession>, device_id: Uuid, payload: Vec<u8>) {
    let command: CommandPayload = match serde_json::from_slice(&payload) {
        Ok(command) => command,
        Err(e) => {
            warn!(err = %e, "malformed mqtt command payload");
            return;
        }
    };

    let outcome = dispatch(&registry, device_id, &command).await;
    publish_ack(&mqtt, device_id, command.id, outcome).await;
}

async fn dispatch(
    registry: &DeviceRegistry,
    device_id: Uuid,
    command: &CommandPayload,
) -> Result<Stage1Outcome, AppError> {
    let domain_command = DomainCommand::from_wire(&command.command, &command.parameters)?;
    registry
        .apply_command(device_id, domain_command, SOURCE_ACTOR.to_owned(), &RoomScope::All)
        .await
}

async fn publish_ack(
    mqtt: &MqttSession,
    device_id: Uuid,
    command_id: Uuid,
    outcome: Result<Stage1Outcome, AppError>,
) {
    let (stage, error) = stage_and_error(outcome);
    let payload = AckPayload { command_id, stage, error, ts: Utc::now() };
    let Ok(bytes) = serde_json::to_vec(&payload) else {
        warn!("failed to serialise mqtt command ack");
        return;
    };
    let ack_topic = topic::command_ack(PROTOCOL, &device_id.to_string());
    if let Err(e) = mqtt.publish(&ack_topic, bytes, QoS::AtLeastOnce, false).await {
        warn!(err = %e, "failed to publish mqtt command ack");
    }
}

fn stage_and_error(outcome: Result<Stage1Outcome, AppError>) -> (AckStage, Option<String>) {
    match outcome {
        Ok(Stage1Outcome::Accepted) => (AckStage::Accepted, None),
        Ok(Stage1Outcome::Rejected { reason }) => (AckStage::Rejected, Some(reason)),
        Err(e) => (AckStage::Rejected, Some(e.to_string())),
    }
}

#[cfg(test)]
#[path = "mqtt_command_tests.rs"]
mod tests;
