// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The read-through cache: one entry per device id, each guarded by its own
//! lock so that readers of device A are never blocked by a write to device
//! B (§4.5). A write-lock on an entry also serialises state updates for that
//! device (§5 ordering guarantee).

use std::collections::HashMap;
use std::sync::Arc;

use catalogue_store::CatalogueStore;
use graylogic_core::model::Device;
use graylogic_core::AppError;
use tokio::sync::RwLock;
use uuid::Uuid;

pub type DeviceHandle = Arc<RwLock<Device>>;

#[derive(Default)]
pub struct DeviceCache {
    entries: RwLock<HashMap<Uuid, DeviceHandle>>,
}

impl DeviceCache {
    pub fn new() -> Self {
        Self { entries: RwLock::new(HashMap::new()) }
    }

    /// Returns the cached handle for `id`, populating it from `store` on a
    /// miss. Two concurrent misses for the same id may both query the store;
    /// the loser's result is discarded in favour of whichever insert runs
    /// first — harmless since both reads are of the same committed row.
    pub async fn get_or_load(
        &self,
        store: &CatalogueStore,
        id: Uuid,
    ) -> Result<DeviceHandle, AppError> {
        if let Some(handle) = self.entries.read().await.get(&id) {
            return Ok(Arc::clone(handle));
        }
        let device = store
            .get_device(id)
            .await?
            .ok_or_else(|| AppError::DeviceNotFound(id.to_string()))?;
        let handle = Arc::new(RwLock::new(device));
        let mut entries = self.entries.write().await;
        let handle = Arc::clone(entries.entry(id).or_insert(handle));
        Ok(handle)
    }

    /// Drops the cached entry for `id`; the next `get_or_load` re-reads the
    /// store. Used after catalogue-level mutations (field updates, deletes).
    pub async fn invalidate(&self, id: Uuid) {
        self.entries.write().await.remove(&id);
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
