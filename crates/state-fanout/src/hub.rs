// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`Fanout`]: the WebSocket hub (§4.7). This crate does not own any socket
//! itself — `graylogic-api` upgrades the connection and owns the write side;
//! this hub only decides, per connected client, which events it receives.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use device_registry::RegistryEvent;
use graylogic_core::RoomScope;
use scene_engine::SceneEvent;
use tokio::sync::{broadcast, mpsc, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::message::WsMessage;

/// Bound on a client's outbound queue; a client this far behind is
/// considered unresponsive and disconnected (§4.7 "slow clients ... are
/// disconnected to protect the hub").
const CLIENT_QUEUE_CAPACITY: usize = 256;

pub type ClientId = u64;

struct Client {
    scope: RoomScope,
    tx: mpsc::Sender<WsMessage>,
}

#[derive(Default)]
pub struct Fanout {
    clients: RwLock<HashMap<ClientId, Client>>,
    next_id: AtomicU64,
}

impl Fanout {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Registers a new client authorised for `scope`. The returned receiver
    /// yields every subsequent event the client is authorised to see, until
    /// `unsubscribe` is called or the hub drops the sender (shutdown).
    pub async fn subscribe(&self, scope: RoomScope) -> (ClientId, mpsc::Receiver<WsMessage>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(CLIENT_QUEUE_CAPACITY);
        self.clients.write().await.insert(id, Client { scope, tx });
        (id, rx)
    }

    pub async fn unsubscribe(&self, id: ClientId) {
        self.clients.write().await.remove(&id);
    }

    /// Pushes a message from outside the two event streams [`Fanout::run`]
    /// already consumes — e.g. a health snapshot change, which has no
    /// `broadcast` channel of its own.
    pub async fn publish(&self, message: WsMessage) {
        self.dispatch(message).await;
    }

    /// Delivers one message to every authorised, still-connected client.
    /// A client whose queue is full is dropped rather than allowed to back
    /// up the whole hub.
    async fn dispatch(&self, message: WsMessage) {
        let mut stale = Vec::new();
        {
            let clients = self.clients.read().await;
            for (&id, client) in clients.iter() {
                if !client.scope.allows(message.room_id()) {
                    continue;
                }
                if client.tx.try_send(message.clone()).is_err() {
                    stale.push(id);
                }
            }
        }
        if !stale.is_empty() {
            let mut clients = self.clients.write().await;
            for id in stale {
                debug!(client_id = id, "disconnecting slow websocket client");
                clients.remove(&id);
            }
        }
    }

    /// Consumes both event streams for as long as `cancel` is unset, fanning
    /// each out to authorised clients.
    pub async fn run(
        self: Arc<Self>,
        mut registry_events: broadcast::Receiver<RegistryEvent>,
        mut scene_events: broadcast::Receiver<SceneEvent>,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => return,
                event = registry_events.recv() => {
                    match event {
                        Ok(event) => self.dispatch(event.into()).await,
                        Err(broadcast::error::RecvError::Lagged(_)) => continue,
                        Err(broadcast::error::RecvError::Closed) => return,
                    }
                }
                event = scene_events.recv() => {
                    match event {
                        Ok(event) => self.dispatch(event.into()).await,
                        Err(broadcast::error::RecvError::Lagged(_)) => continue,
                        Err(broadcast::error::RecvError::Closed) => return,
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "hub_tests.rs"]
mod tests;
