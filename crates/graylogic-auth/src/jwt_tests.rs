// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use chrono::Duration;

use super::*;

#[test]
fn a_token_round_trips_its_claims() {
    let sid = Uuid::new_v4();
    let user_id = Uuid::new_v4();
    let expires_at = Utc::now() + Duration::hours(1);
    let token = encode_session(sid, user_id, Role::Admin, expires_at, "secret").unwrap();

    let claims = decode_session(&token, "secret").unwrap();
    assert_eq!(claims.sid, sid);
    assert_eq!(claims.user_id, user_id);
    assert_eq!(claims.role, Role::Admin);
}

#[test]
fn a_token_signed_with_a_different_secret_is_rejected() {
    let expires_at = Utc::now() + Duration::hours(1);
    let token = encode_session(Uuid::new_v4(), Uuid::new_v4(), Role::User, expires_at, "secret").unwrap();
    let err = decode_session(&token, "other secret").unwrap_err();
    assert!(matches!(err, AppError::Unauthenticated));
}

#[test]
fn an_expired_token_is_rejected() {
    let expires_at = Utc::now() - Duration::hours(1);
    let token = encode_session(Uuid::new_v4(), Uuid::new_v4(), Role::User, expires_at, "secret").unwrap();
    let err = decode_session(&token, "secret").unwrap_err();
    assert!(matches!(err, AppError::Unauthenticated));
}