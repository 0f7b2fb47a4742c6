// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The in-memory map from group address to the devices bound to it (§4.4).
//! Rebuilt wholesale from the catalogue on start and after any binding
//! mutation; readers never take a lock more expensive than an `Arc` clone.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use catalogue_store::CatalogueStore;
use graylogic_core::model::{BindingDirection, GroupAddressBinding};
use graylogic_core::value::Capability;
use graylogic_core::AppError;
use telegram_codec::GroupAddress;
use uuid::Uuid;

/// One device's binding to a group address.
#[derive(Debug, Clone)]
pub struct BindingEntry {
    pub device_id: Uuid,
    pub capability: Capability,
    pub datapoint_type: String,
    pub direction: BindingDirection,
}

#[derive(Default)]
struct Table {
    by_address: HashMap<GroupAddress, Vec<BindingEntry>>,
}

/// Copy-on-write binding table: a writer builds an entirely new [`Table`]
/// and swaps it in; readers only ever clone the current `Arc`, so a lookup
/// never blocks on a rebuild in progress.
pub struct BindingTable {
    inner: RwLock<Arc<Table>>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self { inner: RwLock::new(Arc::new(Table::default())) }
    }

    /// Reads every binding from the catalogue and replaces the table.
    pub async fn rebuild(&self, store: &CatalogueStore) -> Result<(), AppError> {
        let bindings = store.list_all_bindings().await?;
        let mut by_address: HashMap<GroupAddress, Vec<BindingEntry>> = HashMap::new();
        for binding in bindings {
            let Ok(address) = binding.group_address.parse::<GroupAddress>() else {
                continue;
            };
            by_address.entry(address).or_default().push(entry_from(&binding));
        }
        let table = Arc::new(Table { by_address });
        *self.inner.write().map_err(|_| lock_poisoned())? = table;
        Ok(())
    }

    /// All bindings bound to `address`, if any.
    pub fn lookup(&self, address: GroupAddress) -> Vec<BindingEntry> {
        let table = self.snapshot();
        table.by_address.get(&address).cloned().unwrap_or_default()
    }

    /// Every binding whose direction allows a proactive group read on
    /// connect, in catalogue order.
    pub fn readable(&self) -> Vec<(GroupAddress, BindingEntry)> {
        let table = self.snapshot();
        table
            .by_address
            .iter()
            .flat_map(|(addr, entries)| {
                entries
                    .iter()
                    .filter(|e| e.direction == BindingDirection::Read)
                    .map(move |e| (*addr, e.clone()))
            })
            .collect()
    }

    /// The write-direction binding for `device_id`/`capability`, if any.
    pub fn writable_for(
        &self,
        device_id: Uuid,
        capability: Capability,
    ) -> Option<(GroupAddress, BindingEntry)> {
        let table = self.snapshot();
        table.by_address.iter().find_map(|(addr, entries)| {
            entries
                .iter()
                .find(|e| {
                    e.device_id == device_id
                        && e.capability == capability
                        && e.direction == BindingDirection::Write
                })
                .map(|e| (*addr, e.clone()))
        })
    }

    fn snapshot(&self) -> Arc<Table> {
        match self.inner.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }
}

impl Default for BindingTable {
    fn default() -> Self {
        Self::new()
    }
}

fn entry_from(binding: &GroupAddressBinding) -> BindingEntry {
    BindingEntry {
        device_id: binding.device_id,
        capability: binding.capability,
        datapoint_type: binding.datapoint_type.clone(),
        direction: binding.direction,
    }
}

fn lock_poisoned() -> AppError {
    AppError::Internal("binding table lock poisoned".to_owned())
}

#[cfg(test)]
#[path = "binding_table_tests.rs"]
mod tests;
