// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Glues [`Frame`] wire bytes to domain [`Telegram`]s.

use bytes::BytesMut;
use graylogic_core::AppError;

use crate::address::{GroupAddress, IndividualAddress};
use crate::apci::Apci;
use crate::frame::Frame;
use crate::telegram::{Apdu, Telegram};

/// Encode a telegram as a complete wire frame.
pub fn encode_telegram(message_id: u16, telegram: &Telegram) -> Vec<u8> {
    let mut apdu_bytes = Vec::with_capacity(2);
    match &telegram.apdu {
        Apdu::Short(value) => apdu_bytes.push(telegram.apci.leading_byte() | value),
        Apdu::Long(data) => {
            apdu_bytes.push(telegram.apci.leading_byte());
            apdu_bytes.extend_from_slice(data);
        }
    }

    let frame = Frame {
        message_id,
        source: telegram.source.to_u16(),
        destination: telegram.destination.to_u16(),
        apdu: apdu_bytes,
    };
    frame.encode()
}

/// Decode the next complete telegram from `buf`, if any.
pub fn try_decode_telegram(
    buf: &mut BytesMut,
) -> Result<Option<(u16, Telegram)>, AppError> {
    let Some(frame) = Frame::try_decode(buf)? else {
        return Ok(None);
    };
    let telegram = telegram_from_frame(&frame)?;
    Ok(Some((frame.message_id, telegram)))
}

fn telegram_from_frame(frame: &Frame) -> Result<Telegram, AppError> {
    if frame.apdu.is_empty() {
        return Err(AppError::DatapointShape("frame carries an empty APDU".to_owned()));
    }
    let leading = frame.apdu[0];
    let apci = Apci::from_code((leading >> 6) & 0b11)?;
    let apdu = if frame.apdu.len() == 1 {
        Apdu::Short(leading & 0x3f)
    } else {
        Apdu::Long(frame.apdu[1..].to_vec())
    };

    Telegram::new(
        IndividualAddress::from_u16(frame.source),
        GroupAddress::from_u16(frame.destination),
        apci,
        apdu,
    )
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
