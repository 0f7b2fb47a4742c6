// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! MQTT session management: connect, auto-reconnect, subscription
//! restoration, LWT (§4, "MQTT transport" row). The reconnect loop follows
//! the same shape as the daemon client's: bounded exponential backoff,
//! resubscribe immediately after every successful (re)connect.

use std::panic::AssertUnwindSafe;
use std::time::Duration;

use chrono::Utc;
use graylogic_core::AppError;
use rumqttc::{AsyncClient, Event, EventLoop, LastWill, MqttOptions, Packet, QoS};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::config::MqttConfig;
use crate::topic;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

const INITIAL_BACKOFF: Duration = Duration::from_millis(200);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Invoked for every command-topic publish received from the broker.
/// Wrapped in `catch_unwind` so a panicking handler can't tear down the
/// event loop (mirrors the daemon client's telegram callback).
pub type CommandCallback = std::sync::Arc<dyn Fn(String, Vec<u8>) + Send + Sync>;

pub struct MqttSession {
    client: AsyncClient,
    config: MqttConfig,
    state_tx: watch::Sender<ConnectionState>,
    cancel: CancellationToken,
}

impl MqttSession {
    /// Build a session and its event loop. The caller must drive
    /// [`MqttSession::run`] to actually connect.
    pub fn new(
        config: MqttConfig,
        cancel: CancellationToken,
    ) -> (std::sync::Arc<Self>, EventLoop, watch::Receiver<ConnectionState>) {
        let mut opts = MqttOptions::new(config.client_id.clone(), config.host.clone(), config.port);
        opts.set_keep_alive(config.keep_alive);
        if let (Some(user), Some(pass)) = (&config.username, &config.password) {
            opts.set_credentials(user.clone(), pass.clone());
        }
        let offline = crate::payload::BridgeHealthPayload::offline(Utc::now());
        let will_payload = serde_json::to_vec(&offline).unwrap_or_default();
        opts.set_last_will(LastWill::new(
            topic::bridge_health(&config.bridge_id),
            will_payload,
            QoS::AtLeastOnce,
            true,
        ));

        let (client, eventloop) = AsyncClient::new(opts, 256);
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        let session = std::sync::Arc::new(Self { client, config, state_tx, cancel });
        (session, eventloop, state_rx)
    }

    pub fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    /// Drive the event loop until cancelled, resubscribing to the command
    /// filter after every successful (re)connect and invoking `on_command`
    /// for every inbound publish.
    pub async fn run(self: std::sync::Arc<Self>, mut eventloop: EventLoop, on_command: CommandCallback) {
        let mut backoff = INITIAL_BACKOFF;

        loop {
            if self.cancel.is_cancelled() {
                break;
            }
            let _ = self.state_tx.send(ConnectionState::Connecting);

            loop {
                let poll = tokio::select! {
                    _ = self.cancel.cancelled() => return,
                    poll = eventloop.poll() => poll,
                };

                match poll {
                    Ok(Event::Incoming(Packet::ConnAck(_))) => {
                        backoff = INITIAL_BACKOFF;
                        let _ = self.state_tx.send(ConnectionState::Connected);
                        if let Err(e) =
                            self.client.subscribe(topic::COMMAND_FILTER, QoS::AtLeastOnce).await
                        {
                            warn!(err = %e, "failed to (re)subscribe to command topics");
                        }
                        debug!(host = %self.config.host, "mqtt connected, subscriptions restored");
                    }
                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        invoke_callback(&on_command, publish.topic, publish.payload.to_vec());
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(err = %e, "mqtt event loop error, reconnecting");
                        let _ = self.state_tx.send(ConnectionState::Disconnected);
                        break;
                    }
                }
            }

            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(jittered(backoff)) => {}
            }
            backoff = (backoff * 2).min(MAX_BACKOFF);
        }
    }

    pub async fn publish(
        &self,
        topic: &str,
        payload: Vec<u8>,
        qos: QoS,
        retain: bool,
    ) -> Result<(), AppError> {
        self.client
            .publish(topic, qos, retain, payload)
            .await
            .map_err(|e| AppError::Broker(format!("mqtt publish failed: {e}")))
    }
}

fn invoke_callback(callback: &CommandCallback, topic: String, payload: Vec<u8>) {
    let callback = callback.clone();
    if std::panic::catch_unwind(AssertUnwindSafe(|| callback(topic, payload))).is_err() {
        error!("mqtt command callback panicked; event loop continues");
    }
}

fn jittered(base: Duration) -> Duration {
    let capped = base.min(MAX_BACKOFF);
    let jitter_ms = rand::random::<u64>() % (capped.as_millis() as u64 + 1);
    Duration::from_millis(jitter_ms).max(Duration::from_millis(1))
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
