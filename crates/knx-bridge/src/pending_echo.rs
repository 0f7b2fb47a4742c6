// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Correlates an egressed Write with the bus echo that confirms it applied
//! (§4.5: stage two is "eventual applied... when the bridge confirms or the
//! bus echo lands"). If no echo ever arrives, `device-registry`'s own
//! acknowledgement timeout resolves the command as timed out; this map is
//! advisory, not authoritative.

use std::collections::HashMap;
use std::sync::Mutex;

use device_registry::Stage2Outcome;
use telegram_codec::GroupAddress;
use tokio::sync::oneshot;

#[derive(Default)]
pub struct PendingEchoes {
    by_address: Mutex<HashMap<GroupAddress, oneshot::Sender<Stage2Outcome>>>,
}

impl PendingEchoes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, address: GroupAddress, reply: oneshot::Sender<Stage2Outcome>) {
        if let Ok(mut guard) = self.by_address.lock() {
            guard.insert(address, reply);
        }
    }

    /// Resolves and removes the pending echo for `address`, if one is
    /// outstanding.
    pub fn resolve(&self, address: GroupAddress) {
        let reply = self.by_address.lock().ok().and_then(|mut guard| guard.remove(&address));
        if let Some(reply) = reply {
            let _ = reply.send(Stage2Outcome::Applied);
        }
    }
}

#[cfg(test)]
#[path = "pending_echo_tests.rs"]
mod tests;
