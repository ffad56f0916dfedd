//! Repository error model shared by all entity repositories.

use crate::db::DbError;
use crate::model::validation::ValidationError;
use crate::repo::id_allocator::EntityKind;
use log::{debug, error};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from entity persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Input rejected at the repository boundary.
    Validation(ValidationError),
    /// Statement preparation or execution failed in SQLite.
    Db(DbError),
    /// Update or delete targeted an id with no row.
    NotFound { kind: EntityKind, id: String },
    /// Update called with every patch field absent.
    NoFieldsToUpdate(EntityKind),
    /// Persisted data cannot be converted to a valid record.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl RepoError {
    pub(crate) fn not_found(kind: EntityKind, id: &str) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{} not found: {id}", kind.label()),
            Self::NoFieldsToUpdate(kind) => {
                write!(f, "no fields to update for {}", kind.label())
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::NoFieldsToUpdate(_) => None,
            Self::InvalidData(_) => None,
            Self::UninitializedConnection { .. } => None,
            Self::MissingRequiredTable(_) => None,
            Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Emits the outcome of one repository operation.
///
/// Storage failures go to `error!`; semantic outcomes such as not-found or
/// rejected input stay at `debug!`.
pub(crate) fn logged<T>(event: &str, id: &str, result: RepoResult<T>) -> RepoResult<T> {
    match &result {
        Ok(_) => debug!("event={event} module=repo status=ok id={id}"),
        Err(err @ (RepoError::Db(_) | RepoError::InvalidData(_))) => {
            error!("event={event} module=repo status=error id={id} error={err}")
        }
        Err(err) => debug!("event={event} module=repo status=rejected id={id} reason={err}"),
    }
    result
}
