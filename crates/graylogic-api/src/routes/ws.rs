// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `WS /api/v1/ws` (§6): state/command-ack/scene-event push. Exempted from
//! [`crate::auth::auth_layer`] (a browser WebSocket client cannot set an
//! `Authorization` header) and instead authenticated here from a `?token=`
//! query parameter, validated before the upgrade is accepted.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::{IntoResponse, Response};
use futures_util::{SinkExt, StreamExt};
use graylogic_core::AppError;
use serde::Deserialize;

use crate::state::ApiState;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub token: Option<String>,
}

pub async fn ws_handler(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    let token = match query.token {
        Some(t) => t,
        None => return AppError::Unauthenticated.into_response(),
    };

    let scope = match state.auth.authenticate_session(&token).await {
        Ok(ctx) => ctx.scope,
        Err(_) => match state.auth.authenticate_panel(&token).await {
            Ok(ctx) => ctx.scope,
            Err(e) => return e.into_response(),
        },
    };

    ws.on_upgrade(move |socket| handle_connection(state, scope, socket))
}

async fn handle_connection(state: Arc<ApiState>, scope: graylogic_core::RoomScope, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (client_id, mut rx) = state.fanout.subscribe(scope).await;

    loop {
        tokio::select! {
            message = rx.recv() => {
                let Some(message) = message else { break };
                let Ok(json) = serde_json::to_string(&message) else { continue };
                if ws_tx.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
            incoming = ws_rx.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(_)) => break,
                }
            }
        }
    }

    state.fanout.unsubscribe(client_id).await;
}
