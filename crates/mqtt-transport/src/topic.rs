// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The MQTT topic namespace (§6): `graylogic/...`, `/`-separated, UTF-8.

/// `graylogic/state/<protocol>/<device-id>`.
pub fn state(protocol: &str, device_id: &str) -> String {
    format!("graylogic/state/{protocol}/{device_id}")
}

/// `graylogic/command/<protocol>/<device-id>`.
pub fn command(protocol: &str, device_id: &str) -> String {
    format!("graylogic/command/{protocol}/{device_id}")
}

/// `graylogic/command/<protocol>/<device-id>/ack`.
pub fn command_ack(protocol: &str, device_id: &str) -> String {
    format!("graylogic/command/{protocol}/{device_id}/ack")
}

/// Subscription filter matching every protocol/device command topic.
pub const COMMAND_FILTER: &str = "graylogic/command/+/+";

/// `graylogic/bridge/<bridge-id>/health`.
pub fn bridge_health(bridge_id: &str) -> String {
    format!("graylogic/bridge/{bridge_id}/health")
}

/// `graylogic/system/status`.
pub const SYSTEM_STATUS: &str = "graylogic/system/status";

/// Split a `graylogic/command/<protocol>/<device-id>` topic into its parts.
/// Returns `None` for the `/ack` variant or anything that doesn't fit the
/// shape (the `/ack` topic is one we publish to, never subscribe on).
pub fn parse_command_topic(topic: &str) -> Option<(&str, &str)> {
    let mut parts = topic.split('/');
    match (parts.next(), parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some("graylogic"), Some("command"), Some(protocol), Some(device_id), None) => {
            Some((protocol, device_id))
        }
        _ => None,
    }
}

#[cfg(test)]
#[path = "topic_tests.rs"]
mod tests;
