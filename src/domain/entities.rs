//! Records, write payloads and list filters for customers, items and loans

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::status::{TransactionStatus, resolve_status};
use super::validation::{
    ITEM_NAME_MAX_LEN, NAME_MAX_LEN, PHONE_MAX_LEN, optional_text, required_text, validate_email,
};
use super::DomainError;

/// Distinguish a field that was omitted (`None`) from one sent as `null`
/// (`Some(None)`).
fn double_option<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

// ---------------------------------------------------------------------------
// Customers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Customer {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Customer fields as sent by a client. Every field is optional so the same
/// shape serves create, PUT and PATCH; `id` and `created_at` are not
/// accepted and are dropped by serde if sent.
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
pub struct CustomerPayload {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub phone_number: Option<Option<String>>,
}

/// Validated customer fields, ready to persist
#[derive(Debug, Clone, PartialEq)]
pub struct NewCustomer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
}

impl CustomerPayload {
    /// Validate against `base`. With `partial`, omitted fields keep the
    /// stored value; otherwise required fields must be present.
    pub fn resolve(self, base: Option<&Customer>, partial: bool) -> Result<NewCustomer, DomainError> {
        let fallback = if partial { base } else { None };

        let first_name = required_text(
            "first_name",
            self.first_name,
            fallback.map(|c| c.first_name.as_str()),
            Some(NAME_MAX_LEN),
        )?;
        let last_name = required_text(
            "last_name",
            self.last_name,
            fallback.map(|c| c.last_name.as_str()),
            Some(NAME_MAX_LEN),
        )?;
        let email = required_text(
            "email",
            self.email,
            fallback.map(|c| c.email.as_str()),
            None,
        )?;
        validate_email(&email)?;
        let phone_number = optional_text(
            "phone_number",
            self.phone_number,
            base.and_then(|c| c.phone_number.as_deref()),
            Some(PHONE_MAX_LEN),
        )?;

        Ok(NewCustomer {
            first_name,
            last_name,
            email,
            phone_number,
        })
    }
}

#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CustomerFilter {
    /// Terms matched against first name, last name and email
    pub search: Option<String>,
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Item {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
pub struct ItemPayload {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub name: String,
    pub description: Option<String>,
}

impl ItemPayload {
    pub fn resolve(self, base: Option<&Item>, partial: bool) -> Result<NewItem, DomainError> {
        let name = required_text(
            "name",
            self.name,
            if partial { base.map(|i| i.name.as_str()) } else { None },
            Some(ITEM_NAME_MAX_LEN),
        )?;
        let description = optional_text(
            "description",
            self.description,
            base.and_then(|i| i.description.as_deref()),
            None,
        )?;

        Ok(NewItem { name, description })
    }
}

#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ItemFilter {
    /// Terms matched against name and description
    pub search: Option<String>,
}

// ---------------------------------------------------------------------------
// Borrowing transactions
// ---------------------------------------------------------------------------

/// A stored loan together with the display names of its borrower and item
#[derive(Debug, Clone, PartialEq)]
pub struct BorrowingTransaction {
    pub id: i32,
    pub item_id: i32,
    pub borrower_id: i32,
    pub borrower_name: String,
    pub item_name: String,
    pub date_issued: NaiveDate,
    pub due_date: NaiveDate,
    pub date_returned: Option<NaiveDate>,
    /// Status as of the last write; see [`crate::domain::status`]
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

/// Loan fields as sent by a client. `status` is deliberately absent: any
/// value a client sends is discarded during deserialization.
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
pub struct TransactionPayload {
    pub item: Option<i32>,
    pub borrower: Option<i32>,
    pub date_issued: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<NaiveDate>)]
    pub date_returned: Option<Option<NaiveDate>>,
}

/// Loan references and dates with no status attached.
///
/// The only way to obtain something a repository will write is
/// [`TransactionDraft::stamp`], which runs the status resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub item_id: i32,
    pub borrower_id: i32,
    pub date_issued: NaiveDate,
    pub due_date: NaiveDate,
    pub date_returned: Option<NaiveDate>,
}

impl TransactionDraft {
    /// Pre-persist hook: attach the status these dates resolve to on `today`.
    pub fn stamp(self, today: NaiveDate) -> StampedTransaction {
        let status = resolve_status(self.date_returned, self.due_date, today);
        StampedTransaction {
            draft: self,
            status,
        }
    }
}

/// A draft whose status has been resolved. Fields are private so the status
/// cannot be set by hand.
#[derive(Debug, Clone, PartialEq)]
pub struct StampedTransaction {
    draft: TransactionDraft,
    status: TransactionStatus,
}

impl StampedTransaction {
    pub fn draft(&self) -> &TransactionDraft {
        &self.draft
    }

    pub fn status(&self) -> TransactionStatus {
        self.status
    }
}

impl TransactionPayload {
    /// Merge onto `base` and check the write rules that don't need the
    /// database: required fields, and that a return date, once recorded, is
    /// never cleared or moved.
    pub fn resolve(
        self,
        base: Option<&BorrowingTransaction>,
        partial: bool,
    ) -> Result<TransactionDraft, DomainError> {
        fn pick<T: Copy>(
            field: &'static str,
            submitted: Option<T>,
            fallback: Option<T>,
        ) -> Result<T, DomainError> {
            submitted
                .or(fallback)
                .ok_or_else(|| DomainError::validation(format!("{} is required", field)))
        }

        let fallback = if partial { base } else { None };

        let item_id = pick("item", self.item, fallback.map(|t| t.item_id))?;
        let borrower_id = pick("borrower", self.borrower, fallback.map(|t| t.borrower_id))?;
        let date_issued = pick("date_issued", self.date_issued, fallback.map(|t| t.date_issued))?;
        let due_date = pick("due_date", self.due_date, fallback.map(|t| t.due_date))?;

        let stored_return = base.and_then(|t| t.date_returned);
        let date_returned = match self.date_returned {
            None => stored_return,
            Some(submitted) => submitted,
        };

        if let Some(recorded) = stored_return {
            if date_returned != Some(recorded) {
                return Err(DomainError::validation(format!(
                    "date_returned is already recorded as {} and cannot be changed",
                    recorded
                )));
            }
        }

        Ok(TransactionDraft {
            item_id,
            borrower_id,
            date_issued,
            due_date,
            date_returned,
        })
    }
}

#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TransactionFilter {
    /// Stored status, not a live check
    pub status: Option<TransactionStatus>,
    /// Borrower id
    pub borrower: Option<i32>,
    /// Item id
    pub item: Option<i32>,
    /// Terms matched against borrower first/last name and item name
    pub search: Option<String>,
}
