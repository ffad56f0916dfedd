//! Sequential identifier allocation (`U1`, `C1`, `T1`, ...).
//!
//! # Responsibility
//! - Compute the next human-readable id for an entity table.
//!
//! # Invariants
//! - The numeric part is the first run of ASCII digits anywhere in an id;
//!   ids without digits count as zero.
//! - Result is `prefix + (max + 1)`, or `prefix + "1"` for an empty table.
//! - Callers must run allocation and the following insert inside one write
//!   transaction; the scan itself takes no lock.
//! - Query failures propagate; there is no silent fallback id.

use crate::repo::error::{RepoError, RepoResult};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use serde::Serialize;

static ID_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new("[0-9]+").expect("valid id regex"));

/// The three persisted entity tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    User,
    Company,
    Transaction,
}

impl EntityKind {
    pub fn table(self) -> &'static str {
        match self {
            Self::User => "users",
            Self::Company => "companies",
            Self::Transaction => "transactions",
        }
    }

    pub fn id_column(self) -> &'static str {
        match self {
            Self::User => "user_id",
            Self::Company => "company_id",
            Self::Transaction => "transaction_id",
        }
    }

    /// Prefix used by the repositories when allocating ids.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::User => "U",
            Self::Company => "C",
            Self::Transaction => "T",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Company => "company",
            Self::Transaction => "transaction",
        }
    }
}

/// Returns the next id for `kind`'s table using `prefix`.
///
/// # Errors
/// - `RepoError::Db` when the scan statement fails.
/// - `RepoError::InvalidData` when an id's digit run overflows `u64`.
pub fn next_id(conn: &Connection, kind: EntityKind, prefix: &str) -> RepoResult<String> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM {};",
        kind.id_column(),
        kind.table()
    ))?;
    let mut rows = stmt.query([])?;
    let mut max_number = 0_u64;

    while let Some(row) = rows.next()? {
        let number = match row.get_ref(0)? {
            ValueRef::Text(bytes) => extract_id_number(&String::from_utf8_lossy(bytes))?,
            ValueRef::Integer(value) => u64::try_from(value).unwrap_or(0),
            _ => continue,
        };
        max_number = max_number.max(number);
    }

    let next = max_number.checked_add(1).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "id space exhausted in {}.{}",
            kind.table(),
            kind.id_column()
        ))
    })?;
    Ok(format!("{prefix}{next}"))
}

/// Extracts the first run of ASCII digits from `id`, or zero when none.
pub fn extract_id_number(id: &str) -> RepoResult<u64> {
    match ID_DIGITS.find(id) {
        Some(digits) => digits.as_str().parse::<u64>().map_err(|_| {
            RepoError::InvalidData(format!("id `{id}` has an out-of-range numeric part"))
        }),
        None => Ok(0),
    }
}

#[cfg(test)]
mod tests {
    use super::{extract_id_number, EntityKind};
    use crate::repo::error::RepoError;

    #[test]
    fn extracts_digits_after_prefix() {
        assert_eq!(extract_id_number("U1").unwrap(), 1);
        assert_eq!(extract_id_number("C42").unwrap(), 42);
        assert_eq!(extract_id_number("TX007").unwrap(), 7);
    }

    #[test]
    fn uses_first_digit_run_only() {
        assert_eq!(extract_id_number("U12-batch9").unwrap(), 12);
        assert_eq!(extract_id_number("123").unwrap(), 123);
    }

    #[test]
    fn ids_without_digits_count_as_zero() {
        assert_eq!(extract_id_number("legacy").unwrap(), 0);
        assert_eq!(extract_id_number("").unwrap(), 0);
    }

    #[test]
    fn non_ascii_digits_are_ignored() {
        assert_eq!(extract_id_number("U٣").unwrap(), 0);
    }

    #[test]
    fn overflowing_digit_run_is_invalid_data() {
        let err = extract_id_number("U99999999999999999999999").unwrap_err();
        assert!(matches!(err, RepoError::InvalidData(_)));
    }

    #[test]
    fn entity_kinds_map_to_schema_names() {
        assert_eq!(EntityKind::User.table(), "users");
        assert_eq!(EntityKind::Company.id_column(), "company_id");
        assert_eq!(EntityKind::Transaction.prefix(), "T");
    }
}
