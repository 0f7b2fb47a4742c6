// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Issues a group read for every readable binding after each (re)connect,
//! rate-limited to avoid a bus storm (§4.4 "Read-on-connect").

use std::sync::Arc;
use std::time::Duration;

use daemon_client::DaemonClient;
use telegram_codec::{Apci, Apdu};
use tracing::warn;

use crate::binding_table::BindingTable;

pub async fn run(daemon: Arc<DaemonClient>, bindings: Arc<BindingTable>, rate_per_sec: u32) {
    let readable = bindings.readable();
    if readable.is_empty() {
        return;
    }
    let period = Duration::from_secs_f64(1.0 / rate_per_sec.max(1) as f64);
    let mut ticker = tokio::time::interval(period);

    for (address, entry) in readable {
        ticker.tick().await;
        if let Err(e) = daemon.send(address, Apci::Read, Apdu::Short(0)).await {
            warn!(device_id = %entry.device_id, address = %address, err = %e, "read-on-connect failed");
        }
    }
}
