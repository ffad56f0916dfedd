//! Schema migrations for the tradebook store.
//!
//! # Invariants
//! - Versions are strictly increasing; `PRAGMA user_version` holds the last
//!   one applied.
//! - All pending steps run in one transaction: either every step lands or
//!   the file keeps its previous version.
//! - Migration 1 only uses `CREATE TABLE IF NOT EXISTS`, so files written by
//!   earlier unversioned builds (version 0 with tables present) are adopted.

use crate::db::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    name: &'static str,
    /// Tables created or altered by the step, for diagnostics.
    tables: &'static [&'static str],
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "init",
    tables: &["users", "companies", "transactions"],
    sql: include_str!("0001_init.sql"),
}];

/// Returns the newest schema version this build can write.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Brings the connection's schema up to [`latest_version`].
///
/// # Errors
/// - `DbError::UnsupportedSchemaVersion` when the file is newer than this build.
/// - `DbError::Migration` when a step fails; the transaction is rolled back.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from_version = current_user_version(conn)?;
    let to_version = latest_version();

    if from_version > to_version {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: to_version,
        });
    }
    if from_version == to_version {
        return Ok(());
    }

    info!("event=db_migrate module=db status=start from={from_version} to={to_version}");
    let tx = conn.transaction()?;
    for migration in MIGRATIONS
        .iter()
        .filter(|migration| migration.version > from_version)
    {
        run_step(&tx, migration)?;
    }
    tx.commit()?;

    Ok(())
}

/// Reads the schema version stored in `PRAGMA user_version`.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

fn run_step(conn: &Connection, migration: &Migration) -> DbResult<()> {
    let tables = migration.tables.join(",");
    let outcome = conn.execute_batch(migration.sql).and_then(|()| {
        conn.execute_batch(&format!("PRAGMA user_version = {};", migration.version))
    });

    match outcome {
        Ok(()) => {
            info!(
                "event=db_migrate module=db status=ok version={} name={} tables={tables}",
                migration.version, migration.name
            );
            Ok(())
        }
        Err(source) => {
            error!(
                "event=db_migrate module=db status=error version={} name={} tables={tables} error={source}",
                migration.version, migration.name
            );
            Err(DbError::Migration {
                version: migration.version,
                name: migration.name,
                source,
            })
        }
    }
}
