// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn delay_never_exceeds_cap() {
    let mut backoff = RestartBackoff::new();
    for _ in 0..20 {
        assert!(backoff.next_delay() <= CAP);
    }
}

#[test]
fn delay_grows_across_attempts() {
    // Jitter makes individual delays noisy, but the ceiling each attempt is
    // drawn from should be non-decreasing up to the cap.
    let mut backoff = RestartBackoff::new();
    let first_ceiling = (BASE.as_millis() as f64 * MULTIPLIER.powi(0)) as u64;
    let second_ceiling = (BASE.as_millis() as f64 * MULTIPLIER.powi(1)) as u64;
    assert!(second_ceiling > first_ceiling);
    backoff.next_delay();
    backoff.next_delay();
}

#[test]
fn budget_exhausts_after_eight_failures_in_window() {
    let mut backoff = RestartBackoff::new();
    let now = Instant::now();
    for _ in 0..7 {
        backoff.record_failure(now);
    }
    assert!(!backoff.budget_exhausted(now));
    backoff.record_failure(now);
    assert!(backoff.budget_exhausted(now));
}

#[test]
fn failures_outside_window_are_pruned() {
    let mut backoff = RestartBackoff::new();
    let start = Instant::now();
    for _ in 0..8 {
        backoff.record_failure(start);
    }
    assert!(backoff.budget_exhausted(start));

    let later = start + WINDOW + Duration::from_secs(1);
    assert!(!backoff.budget_exhausted(later));
}

#[test]
fn reset_clears_attempts_and_failures() {
    let mut backoff = RestartBackoff::new();
    let now = Instant::now();
    for _ in 0..8 {
        backoff.record_failure(now);
    }
    backoff.reset();
    assert!(!backoff.budget_exhausted(now));
}
