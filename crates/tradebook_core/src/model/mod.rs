//! Entity records persisted by the tradebook core.
//!
//! # Responsibility
//! - Define the `User`, `Company` and `Transaction` records and their
//!   create/patch inputs.
//! - Enforce boundary limits before anything reaches storage.
//!
//! # Invariants
//! - Every entity is identified by a prefixed sequential id (`U1`, `C1`, `T1`).
//! - Patch inputs use `Option` per field; `None` means "leave unchanged".

pub mod company;
pub mod transaction;
pub mod user;
pub mod validation;
