// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn current_process_is_alive() {
    assert!(is_process_alive(std::process::id()));
}

#[test]
fn pid_zero_is_not_a_child_we_spawned_but_exists() {
    // PID 1 (init) always exists on a running Linux system; used here only
    // to exercise the non-self code path.
    assert!(is_process_alive(1));
}
