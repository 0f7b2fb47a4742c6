// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Passive observation of addresses seen on the bus, bound or not (§4.4).
//! Recording happens off the ingress hot path: a failure here only costs a
//! missed discovery tick, never a dropped state update.

use catalogue_store::CatalogueStore;
use tracing::warn;

pub fn record(store: CatalogueStore, address: String) {
    tokio::spawn(async move {
        if let Err(e) = store.touch_discovery(address.clone()).await {
            warn!(address, err = %e, "failed to record discovery tick");
        }
    });
}
