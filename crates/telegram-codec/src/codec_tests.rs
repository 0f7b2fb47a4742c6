// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use bytes::BytesMut;

use super::*;

fn sample_telegram(apdu: Apdu) -> Telegram {
    Telegram::new(
        IndividualAddress::new(1, 1, 1).unwrap(),
        GroupAddress::new(1, 1, 5).unwrap(),
        Apci::Write,
        apdu,
    )
    .unwrap()
}

#[test]
fn short_telegram_round_trips() {
    let telegram = sample_telegram(Apdu::Short(0x01));
    let bytes = encode_telegram(42, &telegram);
    let mut buf = BytesMut::from(&bytes[..]);
    let (message_id, decoded) = try_decode_telegram(&mut buf).unwrap().unwrap();
    assert_eq!(message_id, 42);
    assert_eq!(decoded, telegram);
}

#[test]
fn long_telegram_round_trips() {
    let telegram = sample_telegram(Apdu::Long(vec![0xbf]));
    let bytes = encode_telegram(1, &telegram);
    let mut buf = BytesMut::from(&bytes[..]);
    let (_, decoded) = try_decode_telegram(&mut buf).unwrap().unwrap();
    assert_eq!(decoded, telegram);
}

#[test]
fn dim_set_level_75_percent_produces_documented_byte() {
    // Seed scenario 1: level=75 -> floor(75*255/100) = 191 = 0xbf.
    let telegram = sample_telegram(Apdu::Long(vec![0xbf]));
    let bytes = encode_telegram(1, &telegram);
    // length(2) + message_id(2) + source(2) + destination(2) + apci(1) + data(1)
    assert_eq!(bytes.len(), 10);
    assert_eq!(bytes[bytes.len() - 1], 0xbf);
    assert_eq!(bytes[bytes.len() - 2], Apci::Write.leading_byte());
}
