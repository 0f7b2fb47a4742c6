// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use super::*;

#[tokio::test]
async fn distinct_rooms_do_not_contend_for_the_same_permits() {
    let limiter = RoomLimiter::new();
    let room_a = Some(Uuid::new_v4());
    let room_b = Some(Uuid::new_v4());

    let mut held = Vec::new();
    for _ in 0..PERMITS_PER_ROOM {
        held.push(limiter.acquire(room_a).await);
    }

    // Room A's pool is exhausted; room B must still be served promptly.
    let acquired = tokio::time::timeout(Duration::from_millis(200), limiter.acquire(room_b)).await;
    assert!(acquired.is_ok());
}

#[tokio::test]
async fn a_released_permit_is_reusable() {
    let limiter = RoomLimiter::new();
    let room = Some(Uuid::new_v4());
    let permit = limiter.acquire(room).await;
    drop(permit);
    let acquired = tokio::time::timeout(Duration::from_millis(200), limiter.acquire(room)).await;
    assert!(acquired.is_ok());
}