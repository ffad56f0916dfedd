//! User account record.
//!
//! # Invariants
//! - `user_id` follows the `U<n>` format assigned by the id allocator.
//! - `balance` carries at most two decimal places once persisted.

use super::validation::{
    check_len, check_opt_len, normalize_balance, ValidationError, MAX_ADDRESS_CHARS,
    MAX_PERSON_NAME_CHARS,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Text format of `users.date_of_birth`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Sequential user identifier, e.g. `U3`.
pub type UserId = String;

/// Persisted user row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    pub firstname: String,
    pub lastname: String,
    /// Stored as `YYYY-MM-DD`.
    pub date_of_birth: NaiveDate,
    pub address: String,
    pub balance: Decimal,
}

impl Display for User {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} {}, DOB: {}, Address: {}, Balance: ${:.2}",
            self.user_id,
            self.firstname,
            self.lastname,
            self.date_of_birth.format(DATE_FORMAT),
            self.address,
            self.balance
        )
    }
}

/// Input for creating a user. The id is assigned on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub firstname: String,
    pub lastname: String,
    pub date_of_birth: NaiveDate,
    pub address: String,
    pub balance: Decimal,
}

impl NewUser {
    /// Creates input with a zero balance, the column default.
    pub fn new(
        firstname: impl Into<String>,
        lastname: impl Into<String>,
        date_of_birth: NaiveDate,
        address: impl Into<String>,
    ) -> Self {
        Self {
            firstname: firstname.into(),
            lastname: lastname.into(),
            date_of_birth,
            address: address.into(),
            balance: Decimal::ZERO,
        }
    }

    pub fn with_balance(mut self, balance: Decimal) -> Self {
        self.balance = balance;
        self
    }

    /// Checks text limits and returns the balance rounded to cents.
    pub fn validate(&self) -> Result<Decimal, ValidationError> {
        check_len("firstname", &self.firstname, MAX_PERSON_NAME_CHARS)?;
        check_len("lastname", &self.lastname, MAX_PERSON_NAME_CHARS)?;
        check_len("address", &self.address, MAX_ADDRESS_CHARS)?;
        normalize_balance(self.balance)
    }
}

/// Partial update for a user. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
    pub balance: Option<Decimal>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.firstname.is_none()
            && self.lastname.is_none()
            && self.date_of_birth.is_none()
            && self.address.is_none()
            && self.balance.is_none()
    }

    /// Checks present fields and returns the rounded balance, if any.
    pub fn validate(&self) -> Result<Option<Decimal>, ValidationError> {
        check_opt_len(
            "firstname",
            self.firstname.as_deref(),
            MAX_PERSON_NAME_CHARS,
        )?;
        check_opt_len("lastname", self.lastname.as_deref(), MAX_PERSON_NAME_CHARS)?;
        check_opt_len("address", self.address.as_deref(), MAX_ADDRESS_CHARS)?;
        self.balance.map(normalize_balance).transpose()
    }
}
