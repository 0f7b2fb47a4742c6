// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;

use serde::{Deserialize, Serialize};

/// A stable, externally-addressed identifier (e.g. `light-living`).
///
/// Every catalogue entity keeps a surrogate [`uuid::Uuid`] for foreign keys
/// and a `Slug` for anything a human or an API path touches. The slug is
/// never regenerated once assigned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Build a slug, rejecting anything that would be ambiguous in a URL
    /// path segment or a MQTT topic level.
    pub fn new(raw: impl Into<String>) -> Result<Self, SlugError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(SlugError::Empty);
        }
        if raw.len() > 128 {
            return Err(SlugError::TooLong);
        }
        if !raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(SlugError::InvalidChar);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SlugError {
    #[error("slug must not be empty")]
    Empty,
    #[error("slug must be 128 characters or fewer")]
    TooLong,
    #[error("slug may only contain alphanumerics, '-' and '_'")]
    InvalidChar,
}

#[cfg(test)]
#[path = "ids_tests.rs"]
mod tests;
