//! Write scope for allocate-then-insert sequences.
//!
//! # Invariants
//! - On an idle connection the work runs in its own `BEGIN IMMEDIATE`
//!   transaction, so concurrent writers on the same file are serialized.
//! - Inside a caller-owned transaction the work runs under a savepoint; the
//!   caller's transaction decides when (and whether) it commits.
//! - A failed body leaves no partial rows in either mode.

use crate::repo::error::RepoResult;
use log::warn;
use rusqlite::{Connection, Transaction, TransactionBehavior};

const SAVEPOINT_NAME: &str = "tradebook_write";

/// Runs `body` atomically with respect to the connection's current state.
pub(crate) fn in_write_scope<T>(
    conn: &Connection,
    body: impl FnOnce(&Connection) -> RepoResult<T>,
) -> RepoResult<T> {
    if conn.is_autocommit() {
        let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
        let value = body(&tx)?;
        tx.commit()?;
        return Ok(value);
    }

    conn.execute_batch(&format!("SAVEPOINT {SAVEPOINT_NAME};"))?;
    match body(conn) {
        Ok(value) => {
            conn.execute_batch(&format!("RELEASE {SAVEPOINT_NAME};"))?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = conn.execute_batch(&format!(
                "ROLLBACK TO {SAVEPOINT_NAME}; RELEASE {SAVEPOINT_NAME};"
            )) {
                warn!(
                    "event=savepoint_rollback module=repo status=error error={rollback_err}"
                );
            }
            Err(err)
        }
    }
}
