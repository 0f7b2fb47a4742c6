// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`AuthService`]: login, session/panel token validation, and panel
//! provisioning, all backed by `catalogue-store`.

use std::time::Duration;

use catalogue_store::CatalogueStore;
use chrono::Utc;
use graylogic_core::model::{Panel, Session, User};
use graylogic_core::{AppError, RoomScope};
use uuid::Uuid;

use crate::context::AuthContext;
use crate::{jwt, password, token};

/// §5: sessions default to a 24h lifetime unless configured otherwise.
const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

pub struct AuthService {
    store: CatalogueStore,
    jwt_secret: String,
    session_ttl: Duration,
}

impl AuthService {
    pub fn new(store: CatalogueStore, jwt_secret: String) -> Self {
        Self { store, jwt_secret, session_ttl: DEFAULT_SESSION_TTL }
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Verifies `username`/`password`, rejects inactive accounts, and issues
    /// a fresh session. Returns the signed token the caller presents on
    /// every subsequent request.
    pub async fn login(&self, username: &str, password_attempt: &str) -> Result<(String, User), AppError> {
        let user = self
            .store
            .get_user_by_username(username.to_owned())
            .await?
            .ok_or(AppError::Unauthenticated)?;
        if !user.active {
            return Err(AppError::Unauthenticated);
        }
        if !password::verify(password_attempt, &user.password_hash) {
            return Err(AppError::Unauthenticated);
        }

        let session_id = Uuid::new_v4();
        let expires_at = Utc::now()
            + chrono::Duration::from_std(self.session_ttl).unwrap_or(chrono::Duration::hours(24));
        let jwt = jwt::encode_session(session_id, user.id, user.role, expires_at, &self.jwt_secret)?;

        let session = Session {
            id: session_id,
            user_id: user.id,
            token_hash: token::hash(&jwt),
            expires_at,
            revoked: false,
            device_info: None,
            created_at: Utc::now(),
        };
        self.store.insert_session(session).await?;

        Ok((jwt, user))
    }

    /// Validates a session bearer token: JWT signature and expiry, then the
    /// backing `Session` row's revoked flag (a session can be revoked before
    /// its JWT naturally expires).
    pub async fn authenticate_session(&self, bearer_token: &str) -> Result<AuthContext, AppError> {
        let claims = jwt::decode_session(bearer_token, &self.jwt_secret)?;
        let session = self
            .store
            .get_session_by_token_hash(token::hash(bearer_token))
            .await?
            .ok_or(AppError::Unauthenticated)?;
        if session.revoked || session.expires_at <= Utc::now() {
            return Err(AppError::Unauthenticated);
        }

        let user = self.store.get_user(claims.user_id).await?.ok_or(AppError::Unauthenticated)?;
        if !user.active {
            return Err(AppError::Unauthenticated);
        }

        let scope = RoomScope::for_role(user.role, user.room_access);
        Ok(AuthContext::user(user.id, scope))
    }

    pub async fn logout(&self, bearer_token: &str) -> Result<(), AppError> {
        let claims = jwt::decode_session(bearer_token, &self.jwt_secret)?;
        self.store.revoke_session(claims.sid).await
    }

    /// Validates a panel's long-lived opaque token directly against its
    /// stored hash — panels carry no JWT, since they are provisioned once
    /// and have no login flow to re-issue a token from.
    pub async fn authenticate_panel(&self, bearer_token: &str) -> Result<AuthContext, AppError> {
        let panel = self
            .store
            .get_panel_by_token_hash(token::hash(bearer_token))
            .await?
            .ok_or(AppError::Unauthenticated)?;
        if !panel.active {
            return Err(AppError::Unauthenticated);
        }
        Ok(AuthContext::panel(panel.id, RoomScope::Rooms(panel.room_access)))
    }

    /// Provisions a new panel and returns its one-time raw token; only the
    /// hash is persisted.
    pub async fn create_panel(&self, name: String, slug: graylogic_core::Slug, room_access: Vec<Uuid>) -> Result<(Panel, String), AppError> {
        let raw_token = token::generate();
        let panel = Panel {
            id: Uuid::new_v4(),
            slug,
            name,
            token_hash: token::hash(&raw_token),
            room_access,
            active: true,
            created_at: Utc::now(),
        };
        self.store.insert_panel(panel.clone()).await?;
        Ok((panel, raw_token))
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
