// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-room fair-share limiter (§4.6 "a per-room fair-share limit bounds
//! total concurrent action issuance"): a scene with many actions in one room
//! cannot starve actions destined for other rooms, and a room with no
//! explicit id (an unassigned device) shares a single catch-all permit pool.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use uuid::Uuid;

const PERMITS_PER_ROOM: usize = 4;

pub struct RoomLimiter {
    permits_per_room: usize,
    rooms: Mutex<HashMap<Option<Uuid>, Arc<Semaphore>>>,
}

impl RoomLimiter {
    pub fn new() -> Self {
        Self { permits_per_room: PERMITS_PER_ROOM, rooms: Mutex::new(HashMap::new()) }
    }

    /// Acquires one issuance slot for `room_id`, waiting if the room's share
    /// is exhausted. The returned permit releases the slot on drop.
    pub async fn acquire(&self, room_id: Option<Uuid>) -> OwnedSemaphorePermit {
        let semaphore = {
            let mut rooms = self.rooms.lock().await;
            Arc::clone(rooms.entry(room_id).or_insert_with(|| Arc::new(Semaphore::new(self.permits_per_room))))
        };
        match semaphore.acquire_owned().await {
            Ok(permit) => permit,
            // The semaphore is never closed, so this arm is unreachable.
            Err(_) => unreachable!("room issuance semaphore is never closed"),
        }
    }
}

impl Default for RoomLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "limiter_tests.rs"]
mod tests;
