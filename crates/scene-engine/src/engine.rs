// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`SceneEngine`]: executes a scene's action programme against the device
//! registry (§4.6). Activation is fire-and-forget from the caller's point of
//! view — it returns the new execution's id as soon as the run record is
//! durably `pending`, and the run itself proceeds on a spawned task.

use std::collections::HashSet;
use std::sync::Arc;

use catalogue_store::CatalogueStore;
use chrono::Utc;
use device_registry::{DeviceRegistry, Stage1Outcome};
use graylogic_core::model::{ExecutionStatus, Scene, SceneAction, SceneExecution, TriggerKind};
use graylogic_core::value::DomainCommand;
use graylogic_core::{AppError, RoomScope};
use tokio::sync::{broadcast, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::warn;
use uuid::Uuid;

use crate::events::SceneEvent;
use crate::groups::group_actions;
use crate::limiter::RoomLimiter;

const EVENT_CHANNEL_CAPACITY: usize = 256;

pub struct SceneEngine {
    store: CatalogueStore,
    registry: Arc<DeviceRegistry>,
    events: broadcast::Sender<SceneEvent>,
    running: Mutex<HashSet<Uuid>>,
    limiter: RoomLimiter,
}

impl SceneEngine {
    pub fn new(store: CatalogueStore, registry: Arc<DeviceRegistry>) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self { store, registry, events, running: Mutex::new(HashSet::new()), limiter: RoomLimiter::new() })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SceneEvent> {
        self.events.subscribe()
    }

    /// Activates `scene_id`, rejecting with `ErrSceneBusy` if an execution
    /// for this scene is already running (§4.6 "at most one execution per
    /// scene id is active"). Returns the new execution's id once its
    /// `pending` row is durable; the run itself continues in the background
    /// until `cancel` fires or it reaches a terminal status.
    pub async fn activate(
        self: &Arc<Self>,
        scene_id: Uuid,
        trigger_kind: TriggerKind,
        trigger_source: String,
        cancel: CancellationToken,
    ) -> Result<Uuid, AppError> {
        let scene = self
            .store
            .get_scene(scene_id)
            .await?
            .ok_or_else(|| AppError::SceneNotFound(scene_id.to_string()))?;
        if !scene.enabled {
            return Err(AppError::Validation(format!("scene {} is disabled", scene.slug)));
        }

        {
            let mut running = self.running.lock().await;
            if !running.insert(scene_id) {
                return Err(AppError::SceneBusy(scene.slug.to_string()));
            }
        }

        let execution = SceneExecution {
            id: Uuid::new_v4(),
            scene_id,
            started_at: Utc::now(),
            finished_at: None,
            trigger_kind,
            trigger_source,
            action_count: scene.actions.len() as u32,
            success_count: 0,
            failure_count: 0,
            skipped_count: 0,
            status: ExecutionStatus::Pending,
            duration_ms: None,
        };
        self.store.insert_execution(execution.clone()).await?;

        let engine = Arc::clone(self);
        let execution_id = execution.id;
        tokio::spawn(async move {
            engine.run(scene, execution, cancel).await;
        });

        Ok(execution_id)
    }

    async fn run(self: Arc<Self>, scene: Scene, mut execution: SceneExecution, cancel: CancellationToken) {
        execution.status = ExecutionStatus::Running;
        let _ = self.store.update_execution(execution.clone()).await;
        let _ = self.events.send(SceneEvent::Started {
            execution_id: execution.id,
            scene_id: scene.id,
            ts: execution.started_at,
        });

        let mut success_count = 0u32;
        let mut failure_count = 0u32;
        let mut skipped_count = 0u32;
        let mut aborted = false;

        let groups = group_actions(&scene.actions);
        'groups: for group in groups {
            if cancel.is_cancelled() {
                skipped_count += remaining_actions(&group);
                break 'groups;
            }

            // Cancellation only takes effect between groups: a group already
            // in flight runs to completion, but a cancelled execution never
            // counts its outcomes as successes (checked again below).
            let results = self.run_group(&group).await;
            if cancel.is_cancelled() {
                skipped_count += results.len() as u32;
                break 'groups;
            }

            // Tally every result in this group before deciding whether to
            // abort: the group's actions already ran concurrently, so a
            // sibling that already succeeded must be counted as a success
            // even if a later entry in this same `results` vector is the
            // one that aborts the scene.
            let mut abort_after_group = false;
            for (action, outcome) in results {
                match outcome {
                    Ok(()) => success_count += 1,
                    Err(reason) => {
                        failure_count += 1;
                        warn!(scene = %scene.slug, device_id = %action.device_id, %reason, "scene action failed");
                        if !action.continue_on_error {
                            abort_after_group = true;
                        }
                    }
                }
            }
            if abort_after_group {
                aborted = true;
                break 'groups;
            }
        }

        let total_actions = scene.actions.len() as u32;
        let accounted = success_count + failure_count + skipped_count;
        if accounted < total_actions {
            skipped_count += total_actions - accounted;
        }

        execution.status = if aborted {
            ExecutionStatus::Failed
        } else if failure_count > 0 {
            ExecutionStatus::Partial
        } else {
            ExecutionStatus::Completed
        };
        execution.success_count = success_count;
        execution.failure_count = failure_count;
        execution.skipped_count = skipped_count;
        let finished_at = Utc::now();
        execution.finished_at = Some(finished_at);
        execution.duration_ms =
            Some((finished_at - execution.started_at).num_milliseconds().max(0) as u64);

        if let Err(e) = self.store.update_execution(execution.clone()).await {
            warn!(scene = %scene.slug, err = %e, "failed to persist scene execution outcome");
        }
        let _ = self.events.send(SceneEvent::Finished {
            execution_id: execution.id,
            scene_id: scene.id,
            status: execution.status,
            ts: finished_at,
        });

        self.running.lock().await.remove(&scene.id);
    }

    /// Runs one serial group: every action in it sleeps its own `delay_ms`
    /// (relative to the group's start, not to one another) then is issued
    /// concurrently with the rest of the group; the group as a whole awaits
    /// every action's stage-one outcome before returning (§4.6 rule 4).
    async fn run_group<'a>(
        &self,
        group: &[&'a SceneAction],
    ) -> Vec<(&'a SceneAction, Result<(), String>)> {
        let mut handles = Vec::with_capacity(group.len());
        for action in group {
            handles.push(self.issue(action));
        }
        let outcomes = futures_util::future::join_all(handles).await;
        group.iter().copied().zip(outcomes).collect()
    }

    async fn issue(&self, action: &SceneAction) -> Result<(), String> {
        if action.delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(action.delay_ms.into())).await;
        }

        let command_name = serde_json::to_value(action.command)
            .ok()
            .and_then(|v| v.as_str().map(str::to_owned))
            .ok_or_else(|| "unencodable scene action command".to_owned())?;
        let command = DomainCommand::from_wire(&command_name, &action.parameters).map_err(|e| e.to_string())?;

        let _permit = self.device_room(action.device_id).await;

        let outcome = self
            .registry
            .apply_command_with_fade(
                action.device_id,
                command,
                "scene-engine".to_owned(),
                &RoomScope::All,
                Some(action.fade_ms),
            )
            .await
            .map_err(|e| e.to_string())?;

        match outcome {
            Stage1Outcome::Accepted => Ok(()),
            Stage1Outcome::Rejected { reason } => Err(reason),
        }
    }

    async fn device_room(&self, device_id: Uuid) -> tokio::sync::OwnedSemaphorePermit {
        let room_id = self.store.get_device(device_id).await.ok().flatten().and_then(|d| d.room_id);
        self.limiter.acquire(room_id).await
    }
}

fn remaining_actions(group: &[&SceneAction]) -> u32 {
    group.len() as u32
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
