//! Connection readiness checks run when a repository is constructed.
//!
//! # Invariants
//! - Repositories only accept connections at the latest schema version.
//! - Every column a repository reads or writes must exist.

use crate::db::migrations::{current_user_version, latest_version};
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::id_allocator::EntityKind;
use rusqlite::Connection;

pub(crate) const USER_COLUMNS: &[&str] = &[
    "user_id",
    "firstname",
    "lastname",
    "date_of_birth",
    "address",
    "balance",
];
pub(crate) const COMPANY_COLUMNS: &[&str] = &["company_id", "name", "location"];
pub(crate) const TRANSACTION_COLUMNS: &[&str] = &[
    "transaction_id",
    "user_id",
    "company_id",
    "number_of_shares",
    "transaction_datetime",
];

pub(crate) fn required_columns(kind: EntityKind) -> &'static [&'static str] {
    match kind {
        EntityKind::User => USER_COLUMNS,
        EntityKind::Company => COMPANY_COLUMNS,
        EntityKind::Transaction => TRANSACTION_COLUMNS,
    }
}

/// Verifies schema version plus the tables/columns of every kind in `kinds`.
pub(crate) fn ensure_connection_ready(conn: &Connection, kinds: &[EntityKind]) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for kind in kinds {
        let table = kind.table();
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in required_columns(*kind) {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
