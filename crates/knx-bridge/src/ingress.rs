// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Drains the backlog queue and turns each telegram into a discovery tick
//! and, for bound addresses, a state update (§4.4 "Ingress").
//!
//! Every telegram advances its destination's discovery record, bound or
//! not; a telegram for an unbound address is discovery-only. A `Read`
//! telegram (someone else on the bus asking) carries no value and is
//! ignored here; only `Write`/`Response` telegrams carry a value worth
//! decoding into device state.

use std::sync::Arc;

use catalogue_store::CatalogueStore;
use device_registry::DeviceRegistry;
use graylogic_core::value::StateMap;
use telegram_codec::{Apci, Telegram};
use tokio::sync::mpsc;
use tracing::warn;

use crate::binding_table::BindingTable;
use crate::datapoint;
use crate::discovery;
use crate::pending_echo::PendingEchoes;

const SOURCE_TAG: &str = "knx-bridge";

pub async fn run(
    mut telegrams: mpsc::Receiver<Telegram>,
    registry: Arc<DeviceRegistry>,
    bindings: Arc<BindingTable>,
    store: CatalogueStore,
    echoes: Arc<PendingEchoes>,
) {
    while let Some(telegram) = telegrams.recv().await {
        let entries = bindings.lookup(telegram.destination);
        if entries.is_empty() {
            discovery::record(store.clone(), telegram.destination.to_string());
            continue;
        }
        discovery::record(store.clone(), telegram.destination.to_string());

        if matches!(telegram.apci, Apci::Write | Apci::Response) {
            for entry in &entries {
                let dpt = match datapoint::parse(&entry.datapoint_type) {
                    Ok(dpt) => dpt,
                    Err(e) => {
                        warn!(device_id = %entry.device_id, err = %e, "unrecognised datapoint type");
                        continue;
                    }
                };
                let value = match dpt.decode(&telegram.apdu) {
                    Ok(value) => value,
                    Err(e) => {
                        warn!(device_id = %entry.device_id, err = %e, "dropping out-of-range telegram");
                        continue;
                    }
                };
                let mut partial = StateMap::new();
                partial.insert(entry.capability.state_key().to_owned(), value);
                if let Err(e) =
                    registry.update_state(entry.device_id, partial, SOURCE_TAG.to_owned()).await
                {
                    warn!(device_id = %entry.device_id, err = %e, "failed to apply ingress state update");
                }
            }
            echoes.resolve(telegram.destination);
        }
    }
}

#[cfg(test)]
#[path = "ingress_tests.rs"]
mod tests;
