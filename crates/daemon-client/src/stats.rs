// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Atomic counters tracking a daemon connection's traffic (§4.2).
#[derive(Debug, Default)]
pub struct DaemonStats {
    tx: AtomicU64,
    rx: AtomicU64,
    errors: AtomicU64,
    last_error_at: Mutex<Option<DateTime<Utc>>>,
}

impl DaemonStats {
    pub fn record_tx(&self) {
        self.tx.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rx(&self) {
        self.rx.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self, at: DateTime<Utc>) {
        self.errors.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut guard) = self.last_error_at.lock() {
            *guard = Some(at);
        }
    }

    pub fn snapshot(&self) -> DaemonStatsSnapshot {
        DaemonStatsSnapshot {
            tx: self.tx.load(Ordering::Relaxed),
            rx: self.rx.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            last_error_at: self.last_error_at.lock().ok().and_then(|g| *g),
        }
    }
}

/// A point-in-time snapshot of [`DaemonStats`], suitable for publication
/// on the bridge health topic.
#[derive(Debug, Clone, Serialize)]
pub struct DaemonStatsSnapshot {
    pub tx: u64,
    pub rx: u64,
    pub errors: u64,
    pub last_error_at: Option<DateTime<Utc>>,
}
