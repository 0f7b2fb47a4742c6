// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A persistent session to the KNX daemon: one reader task, one
//! mutex-guarded writer, reconnect with backoff (§4.2).

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::BytesMut;
use chrono::Utc;
use graylogic_core::AppError;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpStream, UnixStream};
use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use telegram_codec::{try_decode_telegram, Apci, Apdu, GroupAddress, IndividualAddress, Telegram};

use crate::stats::{DaemonStats, DaemonStatsSnapshot};
use crate::target::DaemonTarget;

/// Observable connectivity state of a [`DaemonClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Opening handshake opcode for the daemon's group-monitor mode. The daemon
/// echoes the same byte back on success; any other first byte (or a closed
/// connection) fails the handshake.
const GROUP_MONITOR_OPEN: u8 = 0xf0;
const GROUP_MONITOR_ACK: u8 = 0xf0;

const INITIAL_BACKOFF: Duration = Duration::from_millis(200);
const MAX_BACKOFF: Duration = Duration::from_secs(10);

type BoxedReader = Box<dyn AsyncRead + Unpin + Send>;
type BoxedWriter = Box<dyn AsyncWrite + Unpin + Send>;

/// Callback invoked for every telegram decoded off the wire. Invocation is
/// wrapped in `catch_unwind` so a panicking handler cannot tear down the
/// reader task (§4.2).
pub type TelegramCallback = Arc<dyn Fn(Telegram) + Send + Sync>;

/// A persistent connection to one KNX daemon instance.
pub struct DaemonClient {
    target: DaemonTarget,
    /// Individual address this client presents as on the bus.
    source: IndividualAddress,
    writer: Mutex<Option<BoxedWriter>>,
    state_tx: watch::Sender<ConnectionState>,
    stats: DaemonStats,
    message_id: AtomicU64,
    cancel: CancellationToken,
}

impl DaemonClient {
    pub fn new(
        target: DaemonTarget,
        source: IndividualAddress,
        cancel: CancellationToken,
    ) -> (Arc<Self>, watch::Receiver<ConnectionState>) {
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        let client = Arc::new(Self {
            target,
            source,
            writer: Mutex::new(None),
            state_tx,
            stats: DaemonStats::default(),
            message_id: AtomicU64::new(1),
            cancel,
        });
        (client, state_rx)
    }

    pub fn stats(&self) -> DaemonStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    /// Run the reconnect loop until cancelled. `on_telegram` is invoked for
    /// every decoded telegram and `on_reconnect` whenever a new connection
    /// completes its handshake (so the bridge can re-issue group reads).
    pub async fn run(
        self: Arc<Self>,
        on_telegram: TelegramCallback,
        on_reconnect: Arc<dyn Fn() + Send + Sync>,
    ) {
        let mut backoff = INITIAL_BACKOFF;

        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            let _ = self.state_tx.send(ConnectionState::Connecting);
            match self.connect_and_handshake().await {
                Ok((reader, writer)) => {
                    backoff = INITIAL_BACKOFF;
                    *self.writer.lock().await = Some(writer);
                    let _ = self.state_tx.send(ConnectionState::Connected);
                    debug!(target = %self.target, "daemon client connected");
                    on_reconnect();

                    self.read_loop(reader, &on_telegram).await;

                    *self.writer.lock().await = None;
                    let _ = self.state_tx.send(ConnectionState::Disconnected);
                }
                Err(e) => {
                    self.stats.record_error(Utc::now());
                    warn!(target = %self.target, err = %e, "daemon connect failed, retrying");
                    let _ = self.state_tx.send(ConnectionState::Disconnected);
                }
            }

            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(jittered(backoff)) => {}
            }
            backoff = (backoff * 2).min(MAX_BACKOFF);
        }
    }

    async fn connect_and_handshake(&self) -> Result<(BoxedReader, BoxedWriter), AppError> {
        let not_connected = |e: std::io::Error| -> AppError {
            AppError::Broker(format!("daemon connect failed: {e}"))
        };

        let (mut reader, mut writer): (BoxedReader, BoxedWriter) = match &self.target {
            DaemonTarget::Tcp { host, port } => {
                let stream =
                    TcpStream::connect((host.as_str(), *port)).await.map_err(not_connected)?;
                let (r, w) = tokio::io::split(stream);
                (Box::new(r), Box::new(w))
            }
            DaemonTarget::Unix { path } => {
                let stream = UnixStream::connect(path).await.map_err(not_connected)?;
                let (r, w) = tokio::io::split(stream);
                (Box::new(r), Box::new(w))
            }
        };

        writer.write_all(&[GROUP_MONITOR_OPEN]).await.map_err(not_connected)?;
        writer.flush().await.map_err(not_connected)?;

        let mut ack = [0u8; 1];
        reader.read_exact(&mut ack).await.map_err(not_connected)?;
        if ack[0] != GROUP_MONITOR_ACK {
            return Err(AppError::NotConnected);
        }

        Ok((reader, writer))
    }

    async fn read_loop(&self, mut reader: BoxedReader, on_telegram: &TelegramCallback) {
        let mut buf = BytesMut::with_capacity(4096);
        let mut chunk = [0u8; 4096];

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => return,
                result = reader.read(&mut chunk) => {
                    match result {
                        Ok(0) => {
                            debug!("daemon connection closed by peer");
                            return;
                        }
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                        Err(e) => {
                            self.stats.record_error(Utc::now());
                            warn!(err = %e, "daemon read error");
                            return;
                        }
                    }
                }
            }

            loop {
                match try_decode_telegram(&mut buf) {
                    Ok(Some((_message_id, telegram))) => {
                        self.stats.record_rx();
                        invoke_callback(on_telegram, telegram);
                    }
                    Ok(None) => break,
                    Err(e) => {
                        self.stats.record_error(Utc::now());
                        warn!(err = %e, "dropping malformed telegram frame");
                        buf.clear();
                        break;
                    }
                }
            }
        }
    }

    /// Queue a write; returns `ErrNotConnected` if the link is down.
    pub async fn send(
        &self,
        destination: GroupAddress,
        apci: Apci,
        apdu: Apdu,
    ) -> Result<(), AppError> {
        let telegram = Telegram::new(self.source, destination, apci, apdu)?;
        let message_id = self.message_id.fetch_add(1, Ordering::Relaxed) as u16;
        let bytes = telegram_codec::encode_telegram(message_id, &telegram);

        let mut guard = self.writer.lock().await;
        let Some(writer) = guard.as_mut() else {
            return Err(AppError::NotConnected);
        };

        if let Err(e) = writer.write_all(&bytes).await {
            *guard = None;
            let _ = self.state_tx.send(ConnectionState::Disconnected);
            self.stats.record_error(Utc::now());
            return Err(AppError::Broker(format!("daemon write failed: {e}")));
        }
        if let Err(e) = writer.flush().await {
            *guard = None;
            let _ = self.state_tx.send(ConnectionState::Disconnected);
            self.stats.record_error(Utc::now());
            return Err(AppError::Broker(format!("daemon flush failed: {e}")));
        }

        self.stats.record_tx();
        Ok(())
    }
}

fn invoke_callback(callback: &TelegramCallback, telegram: Telegram) {
    let callback = callback.clone();
    if std::panic::catch_unwind(AssertUnwindSafe(|| callback(telegram))).is_err() {
        error!("telegram callback panicked; reader continues");
    }
}

fn jittered(base: Duration) -> Duration {
    let jitter_ms = rand::random::<u64>() % (base.as_millis() as u64 + 1);
    Duration::from_millis(jitter_ms).max(Duration::from_millis(1))
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
