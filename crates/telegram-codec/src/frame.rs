// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire framing: a two-byte big-endian length, a two-byte message-id, a
//! two-byte source address, a two-byte destination address, and the
//! APCI+payload octets (§4.1). The length covers everything that follows
//! the length field itself.

use bytes::{Buf, BufMut, BytesMut};
use graylogic_core::AppError;

const HEADER_LEN: usize = 2 + 2 + 2; // message_id + source + destination

/// A raw, still-unparsed wire frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub message_id: u16,
    pub source: u16,
    pub destination: u16,
    /// The APCI code octet (and any folded data bits) plus extended data.
    pub apdu: Vec<u8>,
}

impl Frame {
    pub fn encode_into(&self, out: &mut BytesMut) {
        let body_len = HEADER_LEN + self.apdu.len();
        out.reserve(2 + body_len);
        out.put_u16(body_len as u16);
        out.put_u16(self.message_id);
        out.put_u16(self.source);
        out.put_u16(self.destination);
        out.extend_from_slice(&self.apdu);
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = BytesMut::new();
        self.encode_into(&mut out);
        out.to_vec()
    }

    /// Try to decode a complete frame from the front of `buf`. Returns
    /// `Ok(None)` if `buf` does not yet hold a complete frame (the caller
    /// should read more bytes and retry); never consumes partial data.
    pub fn try_decode(buf: &mut BytesMut) -> Result<Option<Frame>, AppError> {
        if buf.len() < 2 {
            return Ok(None);
        }
        let body_len = u16::from_be_bytes([buf[0], buf[1]]) as usize;
        if body_len < HEADER_LEN {
            return Err(AppError::DatapointShape(format!(
                "frame body length {body_len} shorter than the fixed header"
            )));
        }
        let total_len = 2 + body_len;
        if buf.len() < total_len {
            return Ok(None);
        }

        let mut frame_buf = buf.split_to(total_len);
        frame_buf.advance(2); // length already consumed above
        let message_id = frame_buf.get_u16();
        let source = frame_buf.get_u16();
        let destination = frame_buf.get_u16();
        let apdu = frame_buf.to_vec();

        Ok(Some(Frame { message_id, source, destination, apdu }))
    }
}

#[cfg(test)]
#[path = "frame_tests.rs"]
mod tests;
