// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use rusqlite::Connection;

use super::*;

#[test]
fn fresh_database_applies_initial_schema() {
    let conn = Connection::open_in_memory().unwrap();
    run_migrations(&conn).unwrap();

    let version: i32 = conn
        .query_row("SELECT MAX(version) FROM migrations", [], |r| r.get(0))
        .unwrap();
    assert_eq!(version, CURRENT_VERSION);

    let table_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'device'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(table_count, 1);
}

#[test]
fn running_migrations_twice_is_a_no_op() {
    let conn = Connection::open_in_memory().unwrap();
    run_migrations(&conn).unwrap();
    run_migrations(&conn).unwrap();

    let applied: i64 =
        conn.query_row("SELECT COUNT(*) FROM migrations", [], |r| r.get(0)).unwrap();
    assert_eq!(applied, 1);
}