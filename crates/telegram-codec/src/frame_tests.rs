// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use bytes::{BufMut, BytesMut};

use super::*;

#[test]
fn encode_decode_round_trips() {
    let frame =
        Frame { message_id: 7, source: 0x1101, destination: 0x0805, apdu: vec![0x80, 0xbf] };
    let mut buf = BytesMut::from(&frame.encode()[..]);
    let decoded = Frame::try_decode(&mut buf).unwrap().unwrap();
    assert_eq!(decoded, frame);
    assert!(buf.is_empty());
}

#[test]
fn incomplete_frame_yields_none_without_consuming() {
    let frame = Frame { message_id: 1, source: 1, destination: 2, apdu: vec![0x00] };
    let full = frame.encode();
    let mut buf = BytesMut::from(&full[..full.len() - 1]);
    assert_eq!(Frame::try_decode(&mut buf).unwrap(), None);
    assert_eq!(buf.len(), full.len() - 1);
}

#[test]
fn two_frames_back_to_back_decode_in_order() {
    let a = Frame { message_id: 1, source: 1, destination: 2, apdu: vec![0x00] };
    let b = Frame { message_id: 2, source: 3, destination: 4, apdu: vec![0x80, 0x01] };
    let mut buf = BytesMut::new();
    buf.extend_from_slice(&a.encode());
    buf.extend_from_slice(&b.encode());

    assert_eq!(Frame::try_decode(&mut buf).unwrap(), Some(a));
    assert_eq!(Frame::try_decode(&mut buf).unwrap(), Some(b));
    assert_eq!(Frame::try_decode(&mut buf).unwrap(), None);
}

#[test]
fn body_len_shorter_than_header_is_rejected() {
    let mut buf = BytesMut::new();
    buf.put_u16(2); // shorter than the 6-byte fixed header
    buf.put_u16(0);
    assert!(Frame::try_decode(&mut buf).is_err());
}
