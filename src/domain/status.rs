//! Loan status lifecycle
//!
//! A loan's status is a function of its dates and today's date. It is stored
//! alongside the loan but only ever written by [`resolve_status`], at the
//! moment the loan is saved. Reads do not re-evaluate it, so a loan read long
//! after its due date keeps showing `borrowed` until the next write touches
//! it. [`is_overdue`] is the live check for display.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Borrowed,
    Returned,
    Overdue,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Borrowed => "borrowed",
            TransactionStatus::Returned => "returned",
            TransactionStatus::Overdue => "overdue",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "borrowed" => Ok(TransactionStatus::Borrowed),
            "returned" => Ok(TransactionStatus::Returned),
            "overdue" => Ok(TransactionStatus::Overdue),
            other => Err(DomainError::validation(format!(
                "unknown status '{}' (expected borrowed, returned or overdue)",
                other
            ))),
        }
    }
}

/// Compute the status a loan should carry on `today`.
///
/// A return date always wins, whatever it is. Otherwise the loan is overdue
/// only once `today` is strictly past the due date.
pub fn resolve_status(
    date_returned: Option<NaiveDate>,
    due_date: NaiveDate,
    today: NaiveDate,
) -> TransactionStatus {
    if date_returned.is_some() {
        TransactionStatus::Returned
    } else if today > due_date {
        TransactionStatus::Overdue
    } else {
        TransactionStatus::Borrowed
    }
}

/// Live overdue check, independent of what the stored status says unless the
/// loan is already returned.
pub fn is_overdue(stored: TransactionStatus, due_date: NaiveDate, today: NaiveDate) -> bool {
    if stored == TransactionStatus::Returned {
        return false;
    }
    today > due_date
}
