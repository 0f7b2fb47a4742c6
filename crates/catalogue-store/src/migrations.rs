// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Embedded, additive-only migrations (§9 design note, I6): every released
//! binary must run against a database that has had *more* additive
//! migrations applied by a newer binary, so new columns are always nullable
//! or defaulted and no migration ever drops or renames a column.

use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::StoreResult;

pub const CURRENT_VERSION: i32 = 1;

pub fn run_migrations(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        ) STRICT",
    )?;

    let current_version: i32 = conn
        .query_row("SELECT COALESCE(MAX(version), 0) FROM migrations", [], |row| row.get(0))
        .unwrap_or(0);

    info!(current_version, target_version = CURRENT_VERSION, "running catalogue migrations");

    if current_version < 1 {
        migrate_v1_initial_schema(conn)?;
        record(conn, 1, "initial_schema")?;
    }

    info!("catalogue migrations complete");
    Ok(())
}

fn record(conn: &Connection, version: i32, name: &str) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO migrations (version, name) VALUES (?1, ?2)",
        rusqlite::params![version, name],
    )?;
    debug!(version, name, "migration applied");
    Ok(())
}

#[cfg(test)]
#[path = "migrations_tests.rs"]
mod tests;

fn migrate_v1_initial_schema(conn: &Connection) -> StoreResult<()> {
    info!("applying migration v1: initial schema");

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS site (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            timezone TEXT NOT NULL,
            latitude REAL,
            longitude REAL,
            mode TEXT NOT NULL DEFAULT 'home',
            allowed_modes TEXT NOT NULL DEFAULT '[\"home\",\"away\",\"night\"]'
        ) STRICT;

        CREATE TABLE IF NOT EXISTS area (
            id TEXT PRIMARY KEY,
            slug TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            area_type TEXT NOT NULL,
            icon TEXT,
            sort_order INTEGER NOT NULL DEFAULT 0
        ) STRICT;

        CREATE TABLE IF NOT EXISTS room (
            id TEXT PRIMARY KEY,
            area_id TEXT NOT NULL REFERENCES area(id) ON DELETE CASCADE,
            slug TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            room_type TEXT NOT NULL,
            capacity_hint INTEGER,
            sort_order INTEGER NOT NULL DEFAULT 0
        ) STRICT;
        CREATE INDEX IF NOT EXISTS idx_room_area_id ON room(area_id);

        CREATE TABLE IF NOT EXISTS device (
            id TEXT PRIMARY KEY,
            slug TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            domain TEXT NOT NULL,
            device_type TEXT NOT NULL,
            room_id TEXT REFERENCES room(id) ON DELETE SET NULL,
            protocol TEXT NOT NULL,
            address TEXT NOT NULL DEFAULT '{}',
            capabilities TEXT NOT NULL DEFAULT '[]',
            state TEXT NOT NULL DEFAULT '{}',
            health TEXT NOT NULL DEFAULT 'offline',
            config TEXT NOT NULL DEFAULT '{}',
            version INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        ) STRICT;
        CREATE INDEX IF NOT EXISTS idx_device_room_id ON device(room_id);
        CREATE INDEX IF NOT EXISTS idx_device_slug ON device(slug);

        CREATE TABLE IF NOT EXISTS group_address_binding (
            id TEXT PRIMARY KEY,
            device_id TEXT NOT NULL REFERENCES device(id) ON DELETE CASCADE,
            capability TEXT NOT NULL,
            group_address TEXT NOT NULL,
            datapoint_type TEXT NOT NULL,
            direction TEXT NOT NULL
        ) STRICT;
        CREATE INDEX IF NOT EXISTS idx_binding_device_id ON group_address_binding(device_id);
        CREATE INDEX IF NOT EXISTS idx_binding_group_address ON group_address_binding(group_address);

        CREATE TABLE IF NOT EXISTS scene (
            id TEXT PRIMARY KEY,
            slug TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            room_id TEXT REFERENCES room(id) ON DELETE SET NULL,
            category TEXT,
            priority INTEGER NOT NULL DEFAULT 50,
            enabled INTEGER NOT NULL DEFAULT 1,
            version INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        ) STRICT;

        CREATE TABLE IF NOT EXISTS scene_action (
            id TEXT PRIMARY KEY,
            scene_id TEXT NOT NULL REFERENCES scene(id) ON DELETE CASCADE,
            device_id TEXT NOT NULL REFERENCES device(id) ON DELETE RESTRICT,
            command TEXT NOT NULL,
            parameters TEXT NOT NULL DEFAULT '{}',
            delay_ms INTEGER NOT NULL DEFAULT 0,
            fade_ms INTEGER NOT NULL DEFAULT 0,
            parallel INTEGER NOT NULL DEFAULT 0,
            continue_on_error INTEGER NOT NULL DEFAULT 0,
            sort_order INTEGER NOT NULL DEFAULT 0
        ) STRICT;
        CREATE INDEX IF NOT EXISTS idx_scene_action_scene_id ON scene_action(scene_id);

        CREATE TABLE IF NOT EXISTS scene_execution (
            id TEXT PRIMARY KEY,
            scene_id TEXT NOT NULL REFERENCES scene(id) ON DELETE CASCADE,
            started_at TEXT NOT NULL,
            finished_at TEXT,
            trigger_kind TEXT NOT NULL,
            trigger_source TEXT NOT NULL,
            action_count INTEGER NOT NULL DEFAULT 0,
            success_count INTEGER NOT NULL DEFAULT 0,
            failure_count INTEGER NOT NULL DEFAULT 0,
            skipped_count INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL,
            duration_ms INTEGER
        ) STRICT;
        CREATE INDEX IF NOT EXISTS idx_scene_execution_scene_id ON scene_execution(scene_id);

        CREATE TABLE IF NOT EXISTS app_user (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL,
            active INTEGER NOT NULL DEFAULT 1,
            room_access TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        ) STRICT;

        CREATE TABLE IF NOT EXISTS session (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES app_user(id) ON DELETE CASCADE,
            token_hash TEXT NOT NULL,
            expires_at TEXT NOT NULL,
            revoked INTEGER NOT NULL DEFAULT 0,
            device_info TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        ) STRICT;
        CREATE INDEX IF NOT EXISTS idx_session_user_id ON session(user_id);

        CREATE TABLE IF NOT EXISTS panel (
            id TEXT PRIMARY KEY,
            slug TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            token_hash TEXT NOT NULL,
            room_access TEXT NOT NULL DEFAULT '[]',
            active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        ) STRICT;

        CREATE TABLE IF NOT EXISTS audit_entry (
            id TEXT PRIMARY KEY,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            actor_id TEXT,
            actor_tag TEXT,
            action TEXT NOT NULL,
            entity_type TEXT NOT NULL,
            entity_id TEXT NOT NULL,
            details TEXT NOT NULL DEFAULT '{}'
        ) STRICT;
        CREATE INDEX IF NOT EXISTS idx_audit_entry_created_at ON audit_entry(created_at);

        CREATE TABLE IF NOT EXISTS discovery_record (
            address TEXT PRIMARY KEY,
            count INTEGER NOT NULL DEFAULT 1,
            last_seen TEXT NOT NULL
        ) STRICT;
        ",
    )?;

    Ok(())
}
