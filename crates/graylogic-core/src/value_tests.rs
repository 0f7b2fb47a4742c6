// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn on_off_accepts_bool_only() {
    assert!(Capability::OnOff.accepts(&CapabilityValue::Bool(true)));
    assert!(!Capability::OnOff.accepts(&CapabilityValue::Percent(50)));
}

#[test]
fn dim_accepts_percent() {
    assert!(Capability::Dim.accepts(&CapabilityValue::Percent(75)));
}

#[test]
fn toggle_requires_on_off() {
    assert_eq!(DomainCommand::Toggle.required_capability(), Capability::OnOff);
}

#[test]
fn set_level_out_of_range_is_rejected() {
    let err = DomainCommand::SetLevel { level: 150 }.validate();
    assert!(err.is_err());
}

#[test]
fn set_setpoint_in_range_is_accepted() {
    assert!(DomainCommand::SetSetpoint { celsius: 21.5 }.validate().is_ok());
}

#[test]
fn set_setpoint_out_of_range_is_rejected() {
    assert!(DomainCommand::SetSetpoint { celsius: 40.0 }.validate().is_err());
}

#[test]
fn from_wire_merges_command_and_parameters() {
    let parameters = serde_json::json!({"level": 75});
    let command = DomainCommand::from_wire("set_level", &parameters).unwrap();
    assert_eq!(command, DomainCommand::SetLevel { level: 75 });
}

#[test]
fn from_wire_accepts_null_parameters_for_nullary_commands() {
    let command = DomainCommand::from_wire("stop", &serde_json::Value::Null).unwrap();
    assert_eq!(command, DomainCommand::Stop);
}

#[test]
fn from_wire_rejects_non_object_parameters() {
    assert!(DomainCommand::from_wire("on", &serde_json::json!(5)).is_err());
}

#[test]
fn from_wire_rejects_unknown_command() {
    assert!(DomainCommand::from_wire("fly", &serde_json::Value::Null).is_err());
}
