// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The resolved identity of an authenticated caller, threaded from
//! `graylogic-api`'s auth middleware into every device-registry/scene-engine
//! call (§9 "Authorisation scope").

use graylogic_core::RoomScope;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct AuthContext {
    pub actor: String,
    pub scope: RoomScope,
}

impl AuthContext {
    pub fn user(user_id: Uuid, scope: RoomScope) -> Self {
        Self { actor: user_id.to_string(), scope }
    }

    pub fn panel(panel_id: Uuid, scope: RoomScope) -> Self {
        Self { actor: format!("panel:{panel_id}"), scope }
    }
}
