// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use proptest::prelude::*;

use super::*;

#[test]
fn group_address_round_trips_through_u16() {
    let ga = GroupAddress::new(1, 1, 5).unwrap();
    assert_eq!(GroupAddress::from_u16(ga.to_u16()), ga);
}

#[test]
fn group_address_parses_textual_form() {
    let ga: GroupAddress = "1/1/5".parse().unwrap();
    assert_eq!(ga, GroupAddress { main: 1, middle: 1, sub: 5 });
    assert_eq!(ga.to_string(), "1/1/5");
}

#[test]
fn group_address_rejects_malformed_text() {
    assert!("1/1".parse::<GroupAddress>().is_err());
    assert!("a/b/c".parse::<GroupAddress>().is_err());
}

#[test]
fn group_main_over_five_bits_is_rejected() {
    assert!(GroupAddress::new(32, 0, 0).is_err());
}

#[test]
fn individual_address_round_trips_through_u16() {
    let ia = IndividualAddress::new(1, 2, 200).unwrap();
    assert_eq!(IndividualAddress::from_u16(ia.to_u16()), ia);
}

#[test]
fn individual_address_parses_textual_form() {
    let ia: IndividualAddress = "1.2.200".parse().unwrap();
    assert_eq!(ia.to_string(), "1.2.200");
}

proptest! {
    /// `from_u16`/`to_u16` is a bijection over the full 16-bit space: the
    /// 5/3/8-bit field split covers every bit with no overlap or gap.
    #[test]
    fn group_address_bit_packing_is_bijective(raw: u16) {
        prop_assert_eq!(GroupAddress::from_u16(raw).to_u16(), raw);
    }

    #[test]
    fn individual_address_bit_packing_is_bijective(raw: u16) {
        prop_assert_eq!(IndividualAddress::from_u16(raw).to_u16(), raw);
    }
}
