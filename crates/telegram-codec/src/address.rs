// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;
use std::str::FromStr;

use graylogic_core::AppError;

/// A KNX group address: the canonical three-level `main(5)/middle(3)/sub(8)`
/// layout, carried on the wire as a 16-bit value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupAddress {
    pub main: u8,
    pub middle: u8,
    pub sub: u8,
}

impl GroupAddress {
    pub fn new(main: u8, middle: u8, sub: u8) -> Result<Self, AppError> {
        if main > 0x1f {
            return Err(AppError::InvalidArgument(format!("group main {main} exceeds 5 bits")));
        }
        if middle > 0x07 {
            return Err(AppError::InvalidArgument(format!(
                "group middle {middle} exceeds 3 bits"
            )));
        }
        Ok(Self { main, middle, sub })
    }

    pub fn from_u16(raw: u16) -> Self {
        let main = ((raw >> 11) & 0x1f) as u8;
        let middle = ((raw >> 8) & 0x07) as u8;
        let sub = (raw & 0xff) as u8;
        Self { main, middle, sub }
    }

    pub fn to_u16(self) -> u16 {
        ((self.main as u16 & 0x1f) << 11) | ((self.middle as u16 & 0x07) << 8) | self.sub as u16
    }
}

impl fmt::Display for GroupAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.main, self.middle, self.sub)
    }
}

impl FromStr for GroupAddress {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();
        let [main, middle, sub] = parts[..] else {
            return Err(AppError::InvalidArgument(format!(
                "group address {s:?} must have the form a/b/c"
            )));
        };
        let parse = |field: &str| {
            field
                .parse::<u8>()
                .map_err(|_| AppError::InvalidArgument(format!("invalid address segment {field:?}")))
        };
        Self::new(parse(main)?, parse(middle)?, parse(sub)?)
    }
}

/// A KNX individual address: `area(4).line(4).device(8)`, the unicast
/// identifier of a single physical device on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndividualAddress {
    pub area: u8,
    pub line: u8,
    pub device: u8,
}

impl IndividualAddress {
    pub fn new(area: u8, line: u8, device: u8) -> Result<Self, AppError> {
        if area > 0x0f {
            return Err(AppError::InvalidArgument(format!("area {area} exceeds 4 bits")));
        }
        if line > 0x0f {
            return Err(AppError::InvalidArgument(format!("line {line} exceeds 4 bits")));
        }
        Ok(Self { area, line, device })
    }

    pub fn from_u16(raw: u16) -> Self {
        let area = ((raw >> 12) & 0x0f) as u8;
        let line = ((raw >> 8) & 0x0f) as u8;
        let device = (raw & 0xff) as u8;
        Self { area, line, device }
    }

    pub fn to_u16(self) -> u16 {
        ((self.area as u16 & 0x0f) << 12) | ((self.line as u16 & 0x0f) << 8) | self.device as u16
    }
}

impl fmt::Display for IndividualAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.area, self.line, self.device)
    }
}

impl FromStr for IndividualAddress {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();
        let [area, line, device] = parts[..] else {
            return Err(AppError::InvalidArgument(format!(
                "individual address {s:?} must have the form a.l.d"
            )));
        };
        let parse = |field: &str| {
            field
                .parse::<u8>()
                .map_err(|_| AppError::InvalidArgument(format!("invalid address segment {field:?}")))
        };
        Self::new(parse(area)?, parse(line)?, parse(device)?)
    }
}

#[cfg(test)]
#[path = "address_tests.rs"]
mod tests;
