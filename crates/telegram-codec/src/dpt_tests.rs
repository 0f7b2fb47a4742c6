// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn bool1_round_trips() {
    for b in [true, false] {
        let apdu = Dpt::Bool1.encode(&CapabilityValue::Bool(b)).unwrap();
        assert_eq!(Dpt::Bool1.decode(&apdu).unwrap(), CapabilityValue::Bool(b));
    }
}

#[test]
fn bool1_rejects_wrong_shape() {
    assert!(Dpt::Bool1.encode(&CapabilityValue::Percent(1)).is_err());
}

#[test]
fn dim_step_round_trips_both_directions() {
    for step in [-7, -1, 0, 1, 7] {
        let apdu = Dpt::DimStep3.encode(&CapabilityValue::Int(step)).unwrap();
        assert_eq!(Dpt::DimStep3.decode(&apdu).unwrap(), CapabilityValue::Int(step));
    }
}

#[test]
fn dim_step_out_of_range_is_rejected() {
    assert!(Dpt::DimStep3.encode(&CapabilityValue::Int(8)).is_err());
}

#[test]
fn percent_75_produces_documented_byte() {
    // Seed scenario 1: 75% -> floor(75*255/100) = 191 = 0xbf.
    let apdu = Dpt::Percent5_001.encode(&CapabilityValue::Percent(75)).unwrap();
    assert_eq!(apdu, Apdu::Long(vec![0xbf]));
}

#[test]
fn percent_round_trips_across_range() {
    for pct in [0u8, 1, 50, 75, 99, 100] {
        let apdu = Dpt::Percent5_001.encode(&CapabilityValue::Percent(pct)).unwrap();
        assert_eq!(Dpt::Percent5_001.decode(&apdu).unwrap(), CapabilityValue::Percent(pct));
    }
}

#[test]
fn percent_over_100_is_rejected() {
    assert!(Dpt::Percent5_001.encode(&CapabilityValue::Percent(255)).is_err());
}

#[test]
fn signed8_round_trips_negative() {
    let apdu = Dpt::Signed8.encode(&CapabilityValue::Int(-5)).unwrap();
    assert_eq!(Dpt::Signed8.decode(&apdu).unwrap(), CapabilityValue::Int(-5));
}

#[test]
fn float9_round_trips_typical_temperature() {
    let apdu = Dpt::Float9.encode(&CapabilityValue::Celsius(21.5)).unwrap();
    let decoded = Dpt::Float9.decode(&apdu).unwrap();
    match decoded {
        CapabilityValue::Celsius(c) => assert!((c - 21.5).abs() < 0.05),
        other => panic!("unexpected decode {other:?}"),
    }
}

#[test]
fn float9_round_trips_negative_temperature() {
    let apdu = Dpt::Float9.encode(&CapabilityValue::Celsius(-10.0)).unwrap();
    let decoded = Dpt::Float9.decode(&apdu).unwrap();
    match decoded {
        CapabilityValue::Celsius(c) => assert!((c - (-10.0)).abs() < 0.05),
        other => panic!("unexpected decode {other:?}"),
    }
}

#[test]
fn uint16_round_trips() {
    let apdu = Dpt::Uint16.encode(&CapabilityValue::Int(40000)).unwrap();
    assert_eq!(Dpt::Uint16.decode(&apdu).unwrap(), CapabilityValue::Int(40000));
}

#[test]
fn float32_round_trips() {
    let apdu = Dpt::Float32.encode(&CapabilityValue::Celsius(3.25)).unwrap();
    assert_eq!(Dpt::Float32.decode(&apdu).unwrap(), CapabilityValue::Celsius(3.25));
}

#[test]
fn string14_round_trips_and_trims_padding() {
    let apdu = Dpt::String14.encode(&CapabilityValue::Enum("ERROR".to_owned())).unwrap();
    assert_eq!(apdu, Apdu::Long("ERROR\0\0\0\0\0\0\0\0\0".bytes().collect()));
    assert_eq!(
        Dpt::String14.decode(&apdu).unwrap(),
        CapabilityValue::Enum("ERROR".to_owned())
    );
}

#[test]
fn string14_rejects_too_long() {
    let too_long = "a".repeat(15);
    assert!(Dpt::String14.encode(&CapabilityValue::Enum(too_long)).is_err());
}

#[test]
fn wrong_byte_count_is_datapoint_shape_error() {
    let bogus = Apdu::Long(vec![1, 2, 3]);
    let err = Dpt::Percent5_001.decode(&bogus).unwrap_err();
    assert!(matches!(err, AppError::DatapointShape(_)));
}
