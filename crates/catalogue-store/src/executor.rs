// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Async SQLite access via a dedicated background thread (`tokio_rusqlite`):
//! the caller's async task is parked, not blocked, while the single writer
//! serialises the actual I/O. Catalogue writes use parameterised statements
//! throughout (§5 shared-resource policy).

use std::path::Path;

use tokio_rusqlite::Connection;
use tracing::info;

use crate::error::{map_tokio_rusqlite, StoreError, StoreResult};
use crate::migrations;

/// A handle to the catalogue's single embedded relational store, WAL
/// journalling enabled, busy-timeout honoured (§6 persistence).
#[derive(Clone)]
pub struct AsyncDb {
    conn: Connection,
    path: String,
}

impl AsyncDb {
    pub async fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Connection(e.to_string()))?;
        }
        let path_str = path.to_string_lossy().to_string();
        info!(path = %path_str, "opening catalogue store");

        let conn =
            Connection::open(&path_str).await.map_err(|e| StoreError::Connection(e.to_string()))?;

        conn.call(|conn| {
            conn.execute_batch(
                "
                PRAGMA journal_mode = WAL;
                PRAGMA synchronous = NORMAL;
                PRAGMA foreign_keys = ON;
                PRAGMA busy_timeout = 5000;
                ",
            )?;
            Ok(())
        })
        .await
        .map_err(|e: tokio_rusqlite::Error| StoreError::Connection(e.to_string()))?;

        conn.call(|conn| {
            migrations::run_migrations(conn)
                .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
            Ok(())
        })
        .await
        .map_err(|e: tokio_rusqlite::Error| StoreError::Connection(e.to_string()))?;

        Ok(Self { conn, path: path_str })
    }

    /// Open an in-memory store, used by tests.
    #[cfg(any(test, feature = "test-util"))]
    pub async fn open_in_memory() -> StoreResult<Self> {
        let conn =
            Connection::open_in_memory().await.map_err(|e| StoreError::Connection(e.to_string()))?;
        conn.call(|conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            migrations::run_migrations(conn)
                .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
            Ok(())
        })
        .await
        .map_err(|e: tokio_rusqlite::Error| StoreError::Connection(e.to_string()))?;
        Ok(Self { conn, path: ":memory:".to_owned() })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Run `f` on the dedicated SQLite thread. `f` must only touch the
    /// connection: no crypto, no other locks, no network calls.
    pub async fn call<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        map_tokio_rusqlite(self.conn.call(move |conn| Ok(f(conn))).await)
    }

    pub async fn health_check(&self) -> StoreResult<()> {
        self.call(|conn| conn.execute_batch("SELECT 1").map_err(StoreError::from)).await
    }

    pub async fn close(self) -> StoreResult<()> {
        self.conn.close().await.map_err(|e| StoreError::Connection(format!("{e:?}")))
    }
}
