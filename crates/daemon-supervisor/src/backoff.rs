// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The supervisor's fixed restart-backoff schedule (§9 Open Question
//! resolution): base 500 ms, multiplier 2.0, cap 30 s, full jitter, a
//! budget of 8 consecutive failures inside a 10-minute sliding window.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

const BASE: Duration = Duration::from_millis(500);
const CAP: Duration = Duration::from_secs(30);
const MULTIPLIER: f64 = 2.0;
const FAILURE_BUDGET: usize = 8;
const WINDOW: Duration = Duration::from_secs(10 * 60);

/// Tracks restart attempts and decides the next backoff delay, or whether
/// the failure budget for the sliding window has been exhausted.
#[derive(Debug, Default)]
pub struct RestartBackoff {
    attempt: u32,
    failures: VecDeque<Instant>,
}

impl RestartBackoff {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay before the next restart attempt, growing exponentially from
    /// `BASE` and capped at `CAP`, with full jitter applied.
    pub fn next_delay(&mut self) -> Duration {
        let factor = MULTIPLIER.powi(self.attempt as i32);
        let scaled = (BASE.as_millis() as f64 * factor).min(CAP.as_millis() as f64) as u64;
        self.attempt += 1;
        let jitter_ms = rand::random::<u64>() % (scaled + 1);
        Duration::from_millis(jitter_ms)
    }

    /// Record a failed restart attempt at `now`, pruning failures that have
    /// aged out of the sliding window.
    pub fn record_failure(&mut self, now: Instant) {
        self.failures.push_back(now);
        self.prune(now);
    }

    /// Reset attempt count and failure history after a successful restart
    /// or an external nudge.
    pub fn reset(&mut self) {
        self.attempt = 0;
        self.failures.clear();
    }

    /// Whether the failure budget inside the sliding window is exhausted.
    pub fn budget_exhausted(&mut self, now: Instant) -> bool {
        self.prune(now);
        self.failures.len() >= FAILURE_BUDGET
    }

    fn prune(&mut self, now: Instant) {
        while let Some(&front) = self.failures.front() {
            if now.duration_since(front) > WINDOW {
                self.failures.pop_front();
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod tests;
