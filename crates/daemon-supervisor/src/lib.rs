// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Supervises the KNX daemon subprocess lifecycle and surfaces the
//! four-layer health model (§4.3).

pub mod backoff;
pub mod health;
pub mod process;
pub mod supervisor;

pub use backoff::RestartBackoff;
pub use health::{HealthLayers, HealthSnapshot, SupervisorStatus};
pub use supervisor::{Supervisor, SupervisorConfig};
