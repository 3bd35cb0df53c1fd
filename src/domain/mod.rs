//! Domain layer - Pure business abstractions
//!
//! Loan status rules, records, validation and repository traits. Nothing in
//! here talks to the database or HTTP directly.

pub mod clock;
pub mod entities;
pub mod errors;
pub mod repositories;
pub mod status;
pub mod validation;

pub use clock::{Clock, FixedClock, SystemClock};
pub use entities::*;
pub use errors::DomainError;
pub use repositories::*;
pub use status::{TransactionStatus, is_overdue, resolve_status};
