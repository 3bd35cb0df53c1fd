pub mod borrowing_transaction;
pub mod customer;
pub mod item;
