//! Repository trait definitions
//!
//! These traits define the contract for data access.
//! Implementations live in the infrastructure layer.

use async_trait::async_trait;

use super::entities::{
    BorrowingTransaction, Customer, CustomerFilter, Item, ItemFilter, NewCustomer, NewItem,
    StampedTransaction, TransactionFilter,
};
use super::DomainError;

/// Repository trait for Customer entity
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Find customers matching the search terms, ordered by id
    async fn find_all(&self, filter: CustomerFilter) -> Result<Vec<Customer>, DomainError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Customer>, DomainError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Customer>, DomainError>;

    async fn create(&self, customer: NewCustomer) -> Result<Customer, DomainError>;

    /// Overwrite the mutable fields; `created_at` is left alone
    async fn update(&self, id: i32, customer: NewCustomer) -> Result<Customer, DomainError>;

    /// Delete a customer and every loan they hold
    async fn delete(&self, id: i32) -> Result<(), DomainError>;
}

/// Repository trait for Item entity
#[async_trait]
pub trait ItemRepository: Send + Sync {
    async fn find_all(&self, filter: ItemFilter) -> Result<Vec<Item>, DomainError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Item>, DomainError>;

    async fn create(&self, item: NewItem) -> Result<Item, DomainError>;

    async fn update(&self, id: i32, item: NewItem) -> Result<Item, DomainError>;

    /// Delete an item and every loan of it
    async fn delete(&self, id: i32) -> Result<(), DomainError>;
}

/// Repository trait for BorrowingTransaction entity.
///
/// Writes only take a [`StampedTransaction`], so the stored status is always
/// the resolver's output at write time. Reads return the stored status as-is.
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn find_all(
        &self,
        filter: TransactionFilter,
    ) -> Result<Vec<BorrowingTransaction>, DomainError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<BorrowingTransaction>, DomainError>;

    async fn create(&self, loan: StampedTransaction) -> Result<BorrowingTransaction, DomainError>;

    async fn update(
        &self,
        id: i32,
        loan: StampedTransaction,
    ) -> Result<BorrowingTransaction, DomainError>;

    async fn delete(&self, id: i32) -> Result<(), DomainError>;
}
