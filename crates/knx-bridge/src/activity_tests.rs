// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use super::*;

#[test]
fn no_telegram_ever_observed_is_not_recent() {
    let activity = BusActivity::new();
    assert!(!activity.recent(Duration::from_secs(60)));
}

#[test]
fn a_telegram_just_marked_is_recent() {
    let activity = BusActivity::new();
    activity.mark();
    assert!(activity.recent(Duration::from_secs(60)));
}