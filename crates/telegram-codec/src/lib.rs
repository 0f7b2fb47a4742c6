// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parses/emits KNX daemon wire frames and datapoint values (§4.1).
//!
//! Pure functions only: no I/O, no async, `#![forbid(unsafe_code)]`.

#![forbid(unsafe_code)]

pub mod address;
pub mod apci;
pub mod codec;
pub mod dpt;
pub mod frame;
pub mod telegram;

pub use address::{GroupAddress, IndividualAddress};
pub use apci::Apci;
pub use codec::{encode_telegram, try_decode_telegram};
pub use dpt::Dpt;
pub use frame::Frame;
pub use telegram::{Apdu, Telegram};
