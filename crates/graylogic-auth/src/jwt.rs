// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The session JWT: a signed, short-lived envelope around a session id.
//! Possession of a valid signature only proves the token was issued by this
//! server; revocation and expiry are still authoritative via the `Session`
//! row looked up by [`crate::token::hash`] of the raw token (§9 "JWT auth").

use chrono::{DateTime, Utc};
use graylogic_core::model::Role;
use graylogic_core::AppError;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Session id (`Session::id`), not the user id, so a revoked session
    /// invalidates its token without touching any other session the user
    /// holds.
    pub sid: Uuid,
    pub user_id: Uuid,
    pub role: Role,
    pub exp: i64,
}

pub fn encode_session(sid: Uuid, user_id: Uuid, role: Role, expires_at: DateTime<Utc>, secret: &str) -> Result<String, AppError> {
    let claims = Claims { sid, user_id, role, exp: expires_at.timestamp() };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| AppError::Internal(format!("jwt encoding failed: {e}")))
}

pub fn decode_session(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &Validation::default())
        .map(|data| data.claims)
        .map_err(|_| AppError::Unauthenticated)
}

#[cfg(test)]
#[path = "jwt_tests.rs"]
mod tests;
