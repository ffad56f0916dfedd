//! Company record.

use super::validation::{check_len, check_opt_len, ValidationError, MAX_COMPANY_TEXT_CHARS};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Sequential company identifier, e.g. `C2`.
pub type CompanyId = String;

/// Persisted company row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub company_id: CompanyId,
    pub name: String,
    pub location: String,
}

impl Display for Company {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}, Location: {}",
            self.company_id, self.name, self.location
        )
    }
}

/// Input for creating a company.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCompany {
    pub name: String,
    pub location: String,
}

impl NewCompany {
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_len("name", &self.name, MAX_COMPANY_TEXT_CHARS)?;
        check_len("location", &self.location, MAX_COMPANY_TEXT_CHARS)
    }
}

/// Partial update for a company. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyPatch {
    pub name: Option<String>,
    pub location: Option<String>,
}

impl CompanyPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.location.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_opt_len("name", self.name.as_deref(), MAX_COMPANY_TEXT_CHARS)?;
        check_opt_len("location", self.location.as_deref(), MAX_COMPANY_TEXT_CHARS)
    }
}
