// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! §4.8: an append-only audit record for every mutating request this crate
//! accepts. There is deliberately no update/delete path here (I5) — only
//! [`record`], called once per handler after the mutation it describes has
//! already succeeded.

use catalogue_store::CatalogueStore;
use chrono::Utc;
use graylogic_core::model::AuditAction;
use tracing::warn;
use uuid::Uuid;

/// Fires the insert on a detached task: an audit-log write failing must
/// never fail the request it is describing, only be logged (§7 propagation
/// policy — infrastructure errors are retried/absorbed internally where
/// safe, and a missed audit row is not worth rejecting an already-applied
/// mutation for).
pub fn record(
    store: CatalogueStore,
    actor_id: Option<Uuid>,
    actor_tag: Option<String>,
    action: AuditAction,
    entity_type: &'static str,
    entity_id: String,
    details: serde_json::Value,
) {
    tokio::spawn(async move {
        let entry = graylogic_core::model::AuditEntry {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            actor_id,
            actor_tag,
            action,
            entity_type: entity_type.to_owned(),
            entity_id,
            details,
        };
        if let Err(e) = store.insert_audit_entry(entry).await {
            warn!(err = %e, entity_type, "failed to record audit entry");
        }
    });
}

/// Splits a [`graylogic_auth::AuthContext::actor`] string back into the
/// `(user_id, tag)` shape [`record`] wants: a user actor is a UUID string,
/// a panel or system actor is `panel:<id>`/a bare tag, neither of which
/// parses as a UUID.
pub fn actor_parts(actor: &str) -> (Option<Uuid>, Option<String>) {
    match Uuid::parse_str(actor) {
        Ok(id) => (Some(id), None),
        Err(_) => (None, Some(actor.to_owned())),
    }
}
