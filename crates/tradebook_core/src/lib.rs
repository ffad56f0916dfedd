//! Core persistence logic for tradebook.
//! Users, companies and share transactions stored in SQLite.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use logging::{
    default_log_level, init_logging, init_stderr_logging, logging_status, LogTarget,
};
pub use model::company::{Company, CompanyId, CompanyPatch, NewCompany};
pub use model::transaction::{
    NewTransaction, Transaction, TransactionId, TransactionPatch, DATETIME_FORMAT,
};
pub use model::user::{NewUser, User, UserId, UserPatch, DATE_FORMAT};
pub use model::validation::ValidationError;
pub use repo::company_repo::{CompanyRepository, SqliteCompanyRepository};
pub use repo::error::{RepoError, RepoResult};
pub use repo::id_allocator::{extract_id_number, next_id, EntityKind};
pub use repo::list_query::ListQuery;
pub use repo::transaction_repo::{SqliteTransactionRepository, TransactionRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
