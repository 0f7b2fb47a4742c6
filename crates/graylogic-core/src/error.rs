// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

/// The control plane's single error taxonomy. Every public operation that
/// can fail returns (or wraps) one of these variants; the HTTP layer maps
/// each to a status code and a stable string code via [`AppError::code`].
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("device not found: {0}")]
    DeviceNotFound(String),
    #[error("scene not found: {0}")]
    SceneNotFound(String),
    #[error("room not found: {0}")]
    RoomNotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),
    #[error("has dependents: {0}")]
    HasDependents(String),
    #[error("scene busy: {0}")]
    SceneBusy(String),

    #[error("permission denied")]
    PermissionDenied,
    #[error("unauthenticated")]
    Unauthenticated,

    #[error("device offline: {0}")]
    DeviceOffline(String),
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("not connected")]
    NotConnected,
    #[error("datapoint out of range: {0}")]
    DatapointRange(String),
    #[error("datapoint wrong shape: {0}")]
    DatapointShape(String),

    #[error("store error: {0}")]
    Store(String),
    #[error("broker error: {0}")]
    Broker(String),
    #[error("time-series error: {0}")]
    Timeseries(String),

    #[error("operation timed out")]
    Timeout,
    #[error("operation cancelled")]
    Cancelled,

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::InvalidArgument(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::DeviceNotFound(_) | Self::SceneNotFound(_) | Self::RoomNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::AlreadyExists(_) | Self::HasDependents(_) | Self::SceneBusy(_) => {
                StatusCode::CONFLICT
            }
            Self::PermissionDenied => StatusCode::FORBIDDEN,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::DeviceOffline(_) | Self::InvalidState(_) => StatusCode::CONFLICT,
            Self::NotConnected => StatusCode::SERVICE_UNAVAILABLE,
            Self::DatapointRange(_) | Self::DatapointShape(_) => StatusCode::BAD_REQUEST,
            Self::Store(_) | Self::Broker(_) | Self::Timeseries(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Self::Cancelled => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::Validation(_) => "VALIDATION",
            Self::DeviceNotFound(_) => "DEVICE_NOT_FOUND",
            Self::SceneNotFound(_) => "SCENE_NOT_FOUND",
            Self::RoomNotFound(_) => "ROOM_NOT_FOUND",
            Self::AlreadyExists(_) => "ALREADY_EXISTS",
            Self::HasDependents(_) => "HAS_DEPENDENTS",
            Self::SceneBusy(_) => "SCENE_BUSY",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::DeviceOffline(_) => "DEVICE_OFFLINE",
            Self::InvalidState(_) => "INVALID_STATE",
            Self::NotConnected => "NOT_CONNECTED",
            Self::DatapointRange(_) => "DATAPOINT_RANGE",
            Self::DatapointShape(_) => "DATAPOINT_SHAPE",
            Self::Store(_) => "STORE_ERROR",
            Self::Broker(_) => "BROKER_ERROR",
            Self::Timeseries(_) => "TIMESERIES_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::Cancelled => "CANCELLED",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn to_error_body(&self) -> ErrorBody {
        ErrorBody { code: self.code().to_owned(), message: self.to_string() }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Infrastructure causes are not leaked to unauthorised callers: the
        // message is already a context-wrapped, non-sensitive string by the
        // time it reaches this boundary (see the propagation policy).
        let status = self.http_status();
        let body = ErrorResponse { error: self.to_error_body() };
        (status, Json(body)).into_response()
    }
}

/// Top-level error response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// Error body with machine-readable code and human-readable message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
