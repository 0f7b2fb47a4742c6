// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use graylogic_core::AppError;

/// The store's own error type, convertible to the control plane's
/// [`AppError`] taxonomy at the crate boundary (§7).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("connection error: {0}")]
    Connection(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("already exists: {0}")]
    AlreadyExists(String),
    #[error("has dependents: {0}")]
    HasDependents(String),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

fn from_tokio_rusqlite(e: tokio_rusqlite::Error) -> StoreError {
    match e {
        tokio_rusqlite::Error::Rusqlite(e) => StoreError::Sqlite(e),
        tokio_rusqlite::Error::Close(_) => StoreError::Connection("connection closed".to_owned()),
        other => StoreError::Connection(other.to_string()),
    }
}

pub(crate) fn map_tokio_rusqlite<T>(r: Result<StoreResult<T>, tokio_rusqlite::Error>) -> StoreResult<T> {
    match r {
        Ok(inner) => inner,
        Err(e) => Err(from_tokio_rusqlite(e)),
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            // Entity-specific not-found mapping happens one layer up (the
            // registry/scene engine know which entity was being looked up);
            // a bare store-level miss on a delete/update target is an
            // internal inconsistency by the time it gets here.
            StoreError::NotFound(msg) => AppError::Internal(format!("row vanished: {msg}")),
            StoreError::AlreadyExists(msg) => AppError::AlreadyExists(msg),
            StoreError::HasDependents(msg) => AppError::HasDependents(msg),
            other => AppError::Store(format!("catalogue-store: {other}")),
        }
    }
}
