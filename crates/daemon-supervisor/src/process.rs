// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use nix::sys::signal;
use nix::unistd::Pid;

/// Checks whether a process with the given PID is alive, by sending the
/// null signal (no actual signal delivered, just existence/permission
/// checked by the kernel).
pub fn is_process_alive(pid: u32) -> bool {
    let Ok(pid_i32) = i32::try_from(pid) else {
        return false;
    };
    signal::kill(Pid::from_raw(pid_i32), None).is_ok()
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
