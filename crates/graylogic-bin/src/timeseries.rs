// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! §4.11: fire-and-forget time-series ingest, client-side batched by size
//! or interval (§6 "ingest is fire-and-forget with client-side batching").
//! [`NullSink`] is used when no `timeseries` section is configured — the
//! control plane never requires a cloud dependency to function.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use graylogic_core::value::CapabilityValue;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

/// One `device_metric` sample (§6 "time-series schema").
#[derive(Debug, Clone, Serialize)]
pub struct MetricSample {
    pub device_id: Uuid,
    pub room_id: Option<Uuid>,
    pub domain: String,
    pub protocol: String,
    pub field: String,
    pub value: CapabilityValue,
    pub ts: DateTime<Utc>,
}

pub trait TimeseriesSink: Send + Sync {
    fn record(&self, sample: MetricSample);
}

/// Used when no time-series sink is configured; drops every sample.
pub struct NullSink;

impl TimeseriesSink for NullSink {
    fn record(&self, _sample: MetricSample) {}
}

/// Batches samples in memory and flushes them to an HTTP line-protocol
/// endpoint either when `batch_size` is reached or every `batch_interval`,
/// whichever comes first. A flush failure is logged and dropped — the
/// time-series store is explicitly non-authoritative (§6 persistence row).
pub struct HttpBatchingSink {
    tx: mpsc::Sender<MetricSample>,
}

impl HttpBatchingSink {
    pub fn spawn(
        endpoint: String,
        token: Option<String>,
        batch_size: usize,
        batch_interval: Duration,
        client: reqwest::Client,
        cancel: CancellationToken,
    ) -> Arc<Self> {
        let (tx, rx) = mpsc::channel(batch_size * 4);
        tokio::spawn(run_batcher(rx, endpoint, token, batch_size, batch_interval, client, cancel));
        Arc::new(Self { tx })
    }
}

impl TimeseriesSink for HttpBatchingSink {
    fn record(&self, sample: MetricSample) {
        if self.tx.try_send(sample).is_err() {
            debug!("time-series batch queue full, dropping sample");
        }
    }
}

async fn run_batcher(
    mut rx: mpsc::Receiver<MetricSample>,
    endpoint: String,
    token: Option<String>,
    batch_size: usize,
    batch_interval: Duration,
    client: reqwest::Client,
    cancel: CancellationToken,
) {
    let mut batch = Vec::with_capacity(batch_size);
    let mut ticker = tokio::time::interval(batch_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                flush(&client, &endpoint, &token, &mut batch).await;
                return;
            }
            _ = ticker.tick() => {
                flush(&client, &endpoint, &token, &mut batch).await;
            }
            sample = rx.recv() => {
                match sample {
                    Some(sample) => {
                        batch.push(sample);
                        if batch.len() >= batch_size {
                            flush(&client, &endpoint, &token, &mut batch).await;
                        }
                    }
                    None => {
                        flush(&client, &endpoint, &token, &mut batch).await;
                        return;
                    }
                }
            }
        }
    }
}

async fn flush(
    client: &reqwest::Client,
    endpoint: &str,
    token: &Option<String>,
    batch: &mut Vec<MetricSample>,
) {
    if batch.is_empty() {
        return;
    }
    let mut request = client.post(endpoint).json(&batch);
    if let Some(token) = token {
        request = request.bearer_auth(token);
    }
    if let Err(e) = request.send().await {
        warn!(err = %e, count = batch.len(), "time-series flush failed, dropping batch");
    }
    batch.clear();
}
