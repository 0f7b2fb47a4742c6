// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Consumes [`EgressRequest`]s handed off by `device-registry` and turns
//! them into KNX bus writes (§4.4 "Egress"). This is the one-way arrow back
//! from the registry's channel contract: this crate depends on
//! `device-registry`, never the reverse.

use std::sync::Arc;

use device_registry::{EgressRequest, Stage1Outcome};
use graylogic_core::value::{Capability, CapabilityValue, DomainCommand};
use telegram_codec::{Apci, Apdu, GroupAddress};
use tracing::warn;

use crate::binding_table::BindingTable;
use crate::datapoint;
use crate::pending_echo::PendingEchoes;

pub async fn run(
    mut requests: tokio::sync::mpsc::Receiver<EgressRequest>,
    daemon: Arc<daemon_client::DaemonClient>,
    bindings: Arc<BindingTable>,
    echoes: Arc<PendingEchoes>,
) {
    while let Some(request) = requests.recv().await {
        handle(request, &daemon, &bindings, &echoes).await;
    }
}

async fn handle(
    request: EgressRequest,
    daemon: &Arc<daemon_client::DaemonClient>,
    bindings: &Arc<BindingTable>,
    echoes: &Arc<PendingEchoes>,
) {
    let EgressRequest { device_id, command, fade_ms, stage1_reply, stage2_reply, .. } = request;

    if let Some(fade_ms) = fade_ms {
        // KNX dimming actuators have no standard absolute-value-with-fade
        // telegram; the transition hint is logged for the actuator's own
        // ramp configuration to honour, not re-encoded onto the wire.
        tracing::debug!(device_id = %device_id, fade_ms, "egress command carries a fade hint");
    }

    let (apci, address, apdu) = match plan(device_id, &command, bindings) {
        Ok(plan) => plan,
        Err(reason) => {
            let _ = stage1_reply.send(Stage1Outcome::Rejected { reason });
            return;
        }
    };

    match daemon.send(address, apci, apdu).await {
        Ok(()) => {
            echoes.register(address, stage2_reply);
            let _ = stage1_reply.send(Stage1Outcome::Accepted);
        }
        Err(e) => {
            warn!(device_id = %device_id, err = %e, "egress write failed");
            let _ = stage1_reply.send(Stage1Outcome::Rejected { reason: e.to_string() });
        }
    }
}

/// Resolves the write-direction binding and encodes `command`'s value
/// against its configured datapoint type. `stop` is a control bit rather
/// than a datapoint reading, so it bypasses the configured DPT and writes a
/// bare `1` onto the position binding's address.
fn plan(
    device_id: uuid::Uuid,
    command: &DomainCommand,
    bindings: &BindingTable,
) -> Result<(Apci, GroupAddress, Apdu), String> {
    let capability = command.required_capability();
    let (address, binding) = bindings
        .writable_for(device_id, capability)
        .ok_or_else(|| format!("no writable {capability} binding for device {device_id}"))?;

    if matches!(command, DomainCommand::Stop) {
        return Ok((Apci::Write, address, Apdu::Short(0x01)));
    }

    let value = command_value(command);
    let dpt = datapoint::parse(&binding.datapoint_type).map_err(|e| e.to_string())?;
    let apdu = dpt.encode(&value).map_err(|e| e.to_string())?;
    Ok((Apci::Write, address, apdu))
}

fn command_value(command: &DomainCommand) -> CapabilityValue {
    match command {
        DomainCommand::On => CapabilityValue::Bool(true),
        DomainCommand::Off => CapabilityValue::Bool(false),
        DomainCommand::Toggle => CapabilityValue::Bool(true),
        DomainCommand::Dim { step } => CapabilityValue::Int(*step as i32),
        DomainCommand::SetLevel { level } => CapabilityValue::Percent(*level),
        DomainCommand::SetPosition { position } => CapabilityValue::Percent(*position),
        DomainCommand::SetTilt { tilt } => CapabilityValue::Percent(*tilt),
        DomainCommand::SetSetpoint { celsius } => CapabilityValue::Celsius(*celsius),
        DomainCommand::Stop => CapabilityValue::Bool(true),
    }
}

#[cfg(test)]
#[path = "egress_tests.rs"]
mod tests;
