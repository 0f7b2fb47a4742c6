// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Maps the catalogue's textual datapoint-type codes (`"5.001"`,
//! `"9.001"`, ...) onto [`Dpt`]. The codec itself stays string-agnostic;
//! this crate is the only thing that knows how the catalogue spells a
//! datapoint type.

use graylogic_core::AppError;
use telegram_codec::Dpt;

pub fn parse(code: &str) -> Result<Dpt, AppError> {
    let major = code.split('.').next().unwrap_or(code);
    match (major, code) {
        ("1", _) => Ok(Dpt::Bool1),
        (_, "3.007") => Ok(Dpt::DimStep3),
        (_, "5.001") => Ok(Dpt::Percent5_001),
        (_, "6.010") => Ok(Dpt::Signed8),
        ("9", _) => Ok(Dpt::Float9),
        (_, "7.001") => Ok(Dpt::Uint16),
        ("14", _) => Ok(Dpt::Float32),
        (_, "16.000") => Ok(Dpt::String14),
        _ => Err(AppError::InvalidArgument(format!("unrecognised datapoint type {code:?}"))),
    }
}

#[cfg(test)]
#[path = "datapoint_tests.rs"]
mod tests;
