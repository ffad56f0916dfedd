//! Boundary limits for entity fields.
//!
//! # Invariants
//! - Text limits count characters, not bytes.
//! - Oversized input is rejected, never truncated.
//! - Empty strings are accepted; the schema only requires NOT NULL.

use rust_decimal::Decimal;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Longest identifier accepted anywhere, including foreign-key references.
pub const MAX_ID_CHARS: usize = 19;
pub const MAX_PERSON_NAME_CHARS: usize = 99;
pub const MAX_ADDRESS_CHARS: usize = 499;
pub const MAX_COMPANY_TEXT_CHARS: usize = 199;

/// `NUMERIC(10,2)` leaves eight integer digits.
const BALANCE_LIMIT: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 0);

/// Input rejected before persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Text field longer than its limit.
    TooLong {
        field: &'static str,
        max_chars: usize,
        actual_chars: usize,
    },
    /// Balance does not fit `NUMERIC(10,2)` after rounding.
    BalanceOutOfRange(Decimal),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooLong {
                field,
                max_chars,
                actual_chars,
            } => write!(
                f,
                "field `{field}` is {actual_chars} characters, limit is {max_chars}"
            ),
            Self::BalanceOutOfRange(value) => {
                write!(f, "balance {value} does not fit NUMERIC(10,2)")
            }
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn check_len(
    field: &'static str,
    value: &str,
    max_chars: usize,
) -> Result<(), ValidationError> {
    let actual_chars = value.chars().count();
    if actual_chars > max_chars {
        return Err(ValidationError::TooLong {
            field,
            max_chars,
            actual_chars,
        });
    }
    Ok(())
}

pub(crate) fn check_opt_len(
    field: &'static str,
    value: Option<&str>,
    max_chars: usize,
) -> Result<(), ValidationError> {
    match value {
        Some(value) => check_len(field, value, max_chars),
        None => Ok(()),
    }
}

/// Rounds to two places and checks the `NUMERIC(10,2)` range.
pub(crate) fn normalize_balance(value: Decimal) -> Result<Decimal, ValidationError> {
    let rounded = value.round_dp(2);
    if rounded.abs() >= BALANCE_LIMIT {
        return Err(ValidationError::BalanceOutOfRange(value));
    }
    Ok(rounded)
}
