//! Services Layer
//!
//! Business logic extracted from HTTP handlers: validation, uniqueness and
//! reference checks, and the loan write path.

pub mod customer_service;
pub mod item_service;
pub mod transaction_service;
