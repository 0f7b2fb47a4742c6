// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The egress side of the command router: the channel contract between
//! `DeviceRegistry::apply_command` and whichever bridge crate consumes
//! [`EgressRequest`]s (`knx-bridge`, today). The registry never depends on a
//! bridge crate directly — it only owns the sending half of this channel,
//! handed to it at construction (§9 "one-way arrows + events").

use graylogic_core::value::DomainCommand;
use tokio::sync::oneshot;
use uuid::Uuid;

/// The outcome of stage one: syntactically valid, device online, bridge
/// reachable. Returned synchronously from `apply_command`.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage1Outcome {
    Accepted,
    Rejected { reason: String },
}

/// The outcome of stage two: the bridge confirmed the write landed (or a bus
/// echo arrived), or it explicitly rejected, or the registry's own timeout
/// fired first. Delivered asynchronously as a [`crate::events::RegistryEvent::CommandAck`].
#[derive(Debug, Clone, PartialEq)]
pub enum Stage2Outcome {
    Applied,
    Rejected { reason: String },
}

/// One command handed off to the bridge for protocol-specific execution.
pub struct EgressRequest {
    pub command_id: Uuid,
    pub device_id: Uuid,
    pub command: DomainCommand,
    pub actor: String,
    /// Requested transition duration, passed through as a hint (scene
    /// actions carry a `fade_ms`; every other caller leaves it `None`).
    pub fade_ms: Option<u32>,
    /// The bridge must send exactly one reply here, promptly: whether the
    /// write was accepted onto the bus (or rejected outright).
    pub stage1_reply: oneshot::Sender<Stage1Outcome>,
    /// The bridge sends here once it has a final answer (bus echo landed,
    /// or it gives up). If the registry's own ack-timeout elapses first, it
    /// stops listening and publishes `Timeout` itself; a late send here is
    /// simply dropped.
    pub stage2_reply: oneshot::Sender<Stage2Outcome>,
}
