//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define per-entity data access contracts.
//! - Isolate SQLite query details from callers.
//! - Allocate sequential ids and build partial-update statements.
//!
//! # Invariants
//! - Every value reaches SQLite through a bound parameter.
//! - Repository APIs return semantic errors (`NotFound`, `NoFieldsToUpdate`)
//!   in addition to DB transport errors.

pub mod company_repo;
pub mod error;
pub mod id_allocator;
pub mod list_query;
mod schema_guard;
pub mod transaction_repo;
mod update_builder;
pub mod user_repo;
mod write_scope;
