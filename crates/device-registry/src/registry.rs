// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`DeviceRegistry`]: the read-through cache plus command router described
//! in §4.5. This is the only thing `graylogic-api` and `scene-engine` talk
//! to for device reads, state mutation and command issuance.

use std::time::Duration;

use catalogue_store::CatalogueStore;
use chrono::Utc;
use graylogic_core::model::{Device, DeviceHealth};
use graylogic_core::value::{Capability, CapabilityValue, DomainCommand, StateMap};
use graylogic_core::{AppError, RoomScope};
use tokio::sync::{broadcast, mpsc, oneshot};
use uuid::Uuid;

use crate::cache::DeviceCache;
use crate::command::{EgressRequest, Stage1Outcome, Stage2Outcome};
use crate::events::{AckStage, RegistryEvent};

/// How long `apply_command` waits for the bridge's stage-1 answer before
/// giving up and reporting `ErrTimeout` to the caller.
const STAGE1_TIMEOUT: Duration = Duration::from_secs(5);

/// The stage-1 → stage-2 acknowledgement window (§5: "per-command
/// acknowledgement default 30 s").
const ACK_TIMEOUT: Duration = Duration::from_secs(30);

const EVENT_CHANNEL_CAPACITY: usize = 1024;

pub struct DeviceRegistry {
    store: CatalogueStore,
    cache: DeviceCache,
    events: broadcast::Sender<RegistryEvent>,
    egress: mpsc::Sender<EgressRequest>,
}

impl DeviceRegistry {
    pub fn new(store: CatalogueStore, egress: mpsc::Sender<EgressRequest>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { store, cache: DeviceCache::new(), events, egress }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.events.subscribe()
    }

    pub async fn get(&self, id: Uuid, scope: &RoomScope) -> Result<Device, AppError> {
        let handle = self.cache.get_or_load(&self.store, id).await?;
        let device = handle.read().await.clone();
        if !scope.allows(device.room_id) {
            return Err(AppError::PermissionDenied);
        }
        Ok(device)
    }

    pub async fn list_by_room(&self, room_id: Uuid, scope: &RoomScope) -> Result<Vec<Device>, AppError> {
        if !scope.allows(Some(room_id)) {
            return Err(AppError::PermissionDenied);
        }
        Ok(self.store.list_devices_by_room(room_id).await?)
    }

    pub async fn list_all(&self, scope: &RoomScope) -> Result<Vec<Device>, AppError> {
        let devices = self.store.list_devices().await?;
        Ok(devices.into_iter().filter(|d| scope.allows(d.room_id)).collect())
    }

    pub async fn create_device(&self, device: Device) -> Result<(), AppError> {
        Ok(self.store.insert_device(device).await?)
    }

    pub async fn update_fields(
        &self,
        id: Uuid,
        name: Option<String>,
        room_id: Option<Option<Uuid>>,
    ) -> Result<Device, AppError> {
        self.store.update_device_fields(id, name, room_id).await?;
        self.cache.invalidate(id).await;
        self.get(id, &RoomScope::All).await
    }

    pub async fn delete_device(&self, id: Uuid) -> Result<(), AppError> {
        self.store.delete_device(id).await?;
        self.cache.invalidate(id).await;
        Ok(())
    }

    /// Atomic merge of `partial` into the device's state map (§4.5, I2):
    /// rejects keys the device's capabilities don't imply, then publishes a
    /// [`RegistryEvent::StateChanged`]. The per-device write lock held across
    /// validate→persist→publish is what gives the ordering guarantee in §5:
    /// two `update_state` calls for the same device are never interleaved,
    /// so observers never see them out of order.
    pub async fn update_state(
        &self,
        id: Uuid,
        partial: StateMap,
        source_tag: String,
    ) -> Result<Device, AppError> {
        let handle = self.cache.get_or_load(&self.store, id).await?;
        let mut guard = handle.write().await;
        validate_partial_state(&guard, &partial)?;
        let merged = self.store.merge_device_state(id, partial).await?;
        *guard = merged.clone();
        drop(guard);

        let _ = self.events.send(RegistryEvent::StateChanged {
            device_id: id,
            room_id: merged.room_id,
            state: merged.state.clone(),
            source_tag,
            ts: Utc::now(),
        });
        Ok(merged)
    }

    pub async fn update_health(&self, id: Uuid, health: DeviceHealth) -> Result<(), AppError> {
        self.store.update_device_health(id, health).await?;
        let handle = self.cache.get_or_load(&self.store, id).await?;
        handle.write().await.health = health;
        Ok(())
    }

    /// Validates the command against capabilities/health/authorisation,
    /// resolves `toggle` against the cached state, then hands the concrete
    /// command to whichever bridge owns the device's protocol via the
    /// egress channel, and awaits stage one (§4.5).
    pub async fn apply_command(
        &self,
        id: Uuid,
        command: DomainCommand,
        actor: String,
        scope: &RoomScope,
    ) -> Result<Stage1Outcome, AppError> {
        self.apply_command_with_fade(id, command, actor, scope, None).await
    }

    /// As [`Self::apply_command`], additionally passing `fade_ms` through to
    /// the bridge as a transition hint (§4.6: scene actions carry a fade
    /// duration alongside their command).
    pub async fn apply_command_with_fade(
        &self,
        id: Uuid,
        command: DomainCommand,
        actor: String,
        scope: &RoomScope,
        fade_ms: Option<u32>,
    ) -> Result<Stage1Outcome, AppError> {
        command.validate().map_err(AppError::Validation)?;

        let handle = self.cache.get_or_load(&self.store, id).await?;
        let device = handle.read().await.clone();

        if !scope.allows(device.room_id) {
            return Err(AppError::PermissionDenied);
        }
        if !device.has_capability(command.required_capability()) {
            return Err(AppError::Validation(format!(
                "device {} does not support this command",
                device.slug
            )));
        }
        if device.health == DeviceHealth::Offline {
            return Err(AppError::DeviceOffline(device.slug.to_string()));
        }

        let resolved = resolve_toggle(&device, command);
        let command_id = Uuid::new_v4();
        let (stage1_tx, stage1_rx) = oneshot::channel();
        let (stage2_tx, stage2_rx) = oneshot::channel();

        let request = EgressRequest {
            command_id,
            device_id: id,
            command: resolved,
            actor,
            fade_ms,
            stage1_reply: stage1_tx,
            stage2_reply: stage2_tx,
        };
        self.egress.send(request).await.map_err(|_| AppError::NotConnected)?;

        let stage1 = match tokio::time::timeout(STAGE1_TIMEOUT, stage1_rx).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => return Err(AppError::NotConnected),
            Err(_) => return Err(AppError::Timeout),
        };

        if stage1 == Stage1Outcome::Accepted {
            let events = self.events.clone();
            tokio::spawn(async move {
                let (stage, error) = match tokio::time::timeout(ACK_TIMEOUT, stage2_rx).await {
                    Ok(Ok(Stage2Outcome::Applied)) => (AckStage::Applied, None),
                    Ok(Ok(Stage2Outcome::Rejected { reason })) => (AckStage::Rejected, Some(reason)),
                    Ok(Err(_)) => {
                        (AckStage::Timeout, Some("bridge closed without a final answer".to_owned()))
                    }
                    Err(_) => (
                        AckStage::Timeout,
                        Some("no confirmation within the acknowledgement window".to_owned()),
                    ),
                };
                let _ = events.send(RegistryEvent::CommandAck {
                    command_id,
                    device_id: id,
                    stage,
                    error,
                    ts: Utc::now(),
                });
            });
        }

        Ok(stage1)
    }
}

fn validate_partial_state(device: &Device, partial: &StateMap) -> Result<(), AppError> {
    for (key, value) in partial {
        let capability = device
            .capabilities
            .iter()
            .copied()
            .find(|c| c.state_key() == key)
            .ok_or_else(|| {
                AppError::Validation(format!("state key {key:?} not implied by device capabilities"))
            })?;
        if !capability.accepts(value) {
            return Err(AppError::DatapointRange(format!(
                "{key}={value:?} is out of range for {capability}"
            )));
        }
    }
    Ok(())
}

/// `toggle` derives its direction from the device's last-known `on` state,
/// falling back to `on` when that state is unknown (§4.5).
fn resolve_toggle(device: &Device, command: DomainCommand) -> DomainCommand {
    if !matches!(command, DomainCommand::Toggle) {
        return command;
    }
    match device.state.get(Capability::OnOff.state_key()).and_then(CapabilityValue::as_bool) {
        Some(true) => DomainCommand::Off,
        _ => DomainCommand::On,
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
