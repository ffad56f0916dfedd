//! Share transaction record.
//!
//! # Invariants
//! - `number_of_shares` is unconstrained: zero and negative counts are valid.
//! - `user_id` / `company_id` are references only; their existence is not
//!   checked unless the connection enforces foreign keys.
//! - `transaction_datetime` has whole-second precision.

use super::company::CompanyId;
use super::user::UserId;
use super::validation::{check_len, check_opt_len, ValidationError, MAX_ID_CHARS};
use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Text format of `transactions.transaction_datetime`.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Sequential transaction identifier, e.g. `T7`.
pub type TransactionId = String;

/// Persisted transaction row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: TransactionId,
    pub user_id: UserId,
    pub company_id: CompanyId,
    pub number_of_shares: i64,
    pub transaction_datetime: NaiveDateTime,
}

impl Display for Transaction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Transaction {}: User {} -> Company {}, Shares: {}, DateTime: {}",
            self.transaction_id,
            self.user_id,
            self.company_id,
            self.number_of_shares,
            self.transaction_datetime.format(DATETIME_FORMAT)
        )
    }
}

/// Input for creating a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub user_id: UserId,
    pub company_id: CompanyId,
    pub number_of_shares: i64,
    /// `None` stamps the current local time.
    pub transaction_datetime: Option<NaiveDateTime>,
}

impl NewTransaction {
    pub fn new(
        user_id: impl Into<UserId>,
        company_id: impl Into<CompanyId>,
        number_of_shares: i64,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            company_id: company_id.into(),
            number_of_shares,
            transaction_datetime: None,
        }
    }

    pub fn at(mut self, transaction_datetime: NaiveDateTime) -> Self {
        self.transaction_datetime = Some(transaction_datetime);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_len("user_id", &self.user_id, MAX_ID_CHARS)?;
        check_len("company_id", &self.company_id, MAX_ID_CHARS)
    }

    /// Resolves the timestamp to persist, truncated to whole seconds.
    pub fn resolved_datetime(&self) -> NaiveDateTime {
        truncate_to_seconds(
            self.transaction_datetime
                .unwrap_or_else(|| Local::now().naive_local()),
        )
    }
}

/// Partial update for a transaction. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionPatch {
    pub user_id: Option<UserId>,
    pub company_id: Option<CompanyId>,
    pub number_of_shares: Option<i64>,
    pub transaction_datetime: Option<NaiveDateTime>,
}

impl TransactionPatch {
    pub fn is_empty(&self) -> bool {
        self.user_id.is_none()
            && self.company_id.is_none()
            && self.number_of_shares.is_none()
            && self.transaction_datetime.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_opt_len("user_id", self.user_id.as_deref(), MAX_ID_CHARS)?;
        check_opt_len("company_id", self.company_id.as_deref(), MAX_ID_CHARS)
    }
}

pub(crate) fn truncate_to_seconds(value: NaiveDateTime) -> NaiveDateTime {
    value.with_nanosecond(0).unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::{NewTransaction, DATETIME_FORMAT};
    use chrono::{NaiveDateTime, Timelike};

    #[test]
    fn explicit_datetime_is_kept_verbatim() {
        let at = NaiveDateTime::parse_from_str("2024-01-15 10:30:00", DATETIME_FORMAT).unwrap();
        let input = NewTransaction::new("U1", "C1", 100).at(at);
        assert_eq!(input.resolved_datetime(), at);
    }

    #[test]
    fn default_datetime_has_no_subsecond_part() {
        let input = NewTransaction::new("U1", "C1", 100);
        let resolved = input.resolved_datetime();
        assert_eq!(resolved.nanosecond(), 0);
    }
}
