// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use telegram_codec::Dpt;

use super::*;

#[test]
fn recognises_every_catalogue_code() {
    assert_eq!(parse("1.001").unwrap(), Dpt::Bool1);
    assert_eq!(parse("3.007").unwrap(), Dpt::DimStep3);
    assert_eq!(parse("5.001").unwrap(), Dpt::Percent5_001);
    assert_eq!(parse("6.010").unwrap(), Dpt::Signed8);
    assert_eq!(parse("9.001").unwrap(), Dpt::Float9);
    assert_eq!(parse("7.001").unwrap(), Dpt::Uint16);
    assert_eq!(parse("14.000").unwrap(), Dpt::Float32);
    assert_eq!(parse("16.000").unwrap(), Dpt::String14);
}

#[test]
fn rejects_unknown_codes() {
    assert!(parse("99.999").is_err());
}