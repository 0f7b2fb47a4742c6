// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The bounded telegram backlog (§4.4 edge case): the daemon client's reader
//! task invokes the ingress callback synchronously, so telegrams are handed
//! off to this queue immediately and processed by an independent async
//! worker. A full queue drops the newest telegram and counts it rather than
//! blocking the reader.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use telegram_codec::Telegram;
use tokio::sync::mpsc;
use tracing::warn;

#[derive(Default)]
pub struct DroppedCounter(AtomicU64);

impl DroppedCounter {
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    fn increment(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }
}

pub struct Backlog {
    sender: mpsc::Sender<Telegram>,
    dropped: Arc<DroppedCounter>,
}

impl Backlog {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Telegram>, Arc<DroppedCounter>) {
        let (sender, receiver) = mpsc::channel(capacity);
        let dropped = Arc::new(DroppedCounter::default());
        (Self { sender, dropped: Arc::clone(&dropped) }, receiver, dropped)
    }

    /// Non-blocking enqueue from the daemon client's synchronous callback.
    pub fn offer(&self, telegram: Telegram) {
        if let Err(mpsc::error::TrySendError::Full(_)) = self.sender.try_send(telegram) {
            self.dropped.increment();
            warn!(dropped = self.dropped.get(), "ingress backlog full, telegram discarded");
        }
    }

    pub fn backlog_len_hint(&self) -> usize {
        self.sender.max_capacity() - self.sender.capacity()
    }
}

#[cfg(test)]
#[path = "backlog_tests.rs"]
mod tests;
