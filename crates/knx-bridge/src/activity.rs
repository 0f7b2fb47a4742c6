// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracks recent bus traffic for the supervisor's L3 health layer (§4.3):
//! "bus traffic observed in the last N seconds". `N` is this crate's
//! `BridgeConfig::bus_activity_window`.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

pub struct BusActivity {
    last_seen_ms: AtomicI64,
}

impl BusActivity {
    pub fn new() -> Arc<Self> {
        Arc::new(Self { last_seen_ms: AtomicI64::new(0) })
    }

    /// Records that a telegram was just observed on the bus, bound or not.
    pub fn mark(&self) {
        self.last_seen_ms.store(Utc::now().timestamp_millis(), Ordering::Relaxed);
    }

    fn recent(&self, window: Duration) -> bool {
        let last = self.last_seen_ms.load(Ordering::Relaxed);
        if last == 0 {
            return false;
        }
        let elapsed_ms = Utc::now().timestamp_millis().saturating_sub(last);
        elapsed_ms >= 0 && (elapsed_ms as u64) <= window.as_millis() as u64
    }

    /// Spawns a task that republishes `recent(window)` on a watch channel,
    /// polling at a quarter of `window` (floored at one second), for the
    /// supervisor's L3 layer to consume.
    pub fn watch(self: Arc<Self>, window: Duration, cancel: CancellationToken) -> watch::Receiver<bool> {
        let (tx, rx) = watch::channel(false);
        let poll = (window / 4).max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poll);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = ticker.tick() => {}
                }
                let _ = tx.send(self.recent(window));
            }
        });
        rx
    }
}

#[cfg(test)]
#[path = "activity_tests.rs"]
mod tests;
