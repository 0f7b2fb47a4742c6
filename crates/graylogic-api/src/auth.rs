// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bearer-token authentication (§4.9, §9 "Authorisation scope"). Every
//! route but `/api/v1/auth/login` and `/api/v1/health` passes through
//! [`auth_layer`] first, which resolves the bearer token to an
//! [`AuthContext`] and stores it as a request extension; handlers pull it
//! back out with the [`CurrentUser`] extractor — a token validated once,
//! up front, rather than re-derived per handler.

use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use graylogic_auth::AuthContext;
use graylogic_core::AppError;

use crate::state::ApiState;

/// Paths reachable without a bearer token. WebSocket auth is re-validated
/// inside the upgrade handler itself (a query-string token, since browser
/// WebSocket clients cannot set an `Authorization` header).
fn is_public(path: &str) -> bool {
    path == "/api/v1/health" || path == "/api/v1/auth/login" || path == "/api/v1/ws"
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    bearer_token_from_headers(&parts.headers)
}

/// Shared by [`auth_layer`] and handlers (e.g. logout) that need the raw
/// token behind the already-validated [`AuthContext`].
pub fn bearer_token_from_headers(headers: &axum::http::HeaderMap) -> Option<&str> {
    headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?.strip_prefix("Bearer ")
}

pub async fn auth_layer(State(state): State<Arc<ApiState>>, req: Request, next: Next) -> Response {
    let path = req.uri().path().to_owned();
    if is_public(&path) {
        return next.run(req).await;
    }

    let (mut parts, body) = req.into_parts();
    let token = match bearer_token(&parts) {
        Some(t) => t.to_owned(),
        None => return AppError::Unauthenticated.into_response(),
    };

    let context = match state.auth.authenticate_session(&token).await {
        Ok(ctx) => ctx,
        Err(_) => match state.auth.authenticate_panel(&token).await {
            Ok(ctx) => ctx,
            Err(e) => return e.into_response(),
        },
    };

    parts.extensions.insert(context);
    next.run(Request::from_parts(parts, body)).await
}

/// Extracts the [`AuthContext`] the auth layer resolved for this request.
/// Only usable on routes behind [`auth_layer`]; a route exempted from auth
/// has no context to extract and this will 500 rather than silently
/// proceed unauthenticated.
pub struct CurrentUser(pub AuthContext);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| AppError::Unauthenticated.into_response())
    }
}
