//! Application state containing repositories and shared resources

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::domain::{Clock, CustomerRepository, ItemRepository, SystemClock, TransactionRepository};
use crate::infrastructure::{
    SeaOrmCustomerRepository, SeaOrmItemRepository, SeaOrmTransactionRepository,
};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    pub customer_repo: Arc<dyn CustomerRepository>,
    pub item_repo: Arc<dyn ItemRepository>,
    pub transaction_repo: Arc<dyn TransactionRepository>,
    /// Supplies "today" for status stamping and `is_overdue`
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Create a new AppState on the system clock
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_clock(db, Arc::new(SystemClock))
    }

    pub fn with_clock(db: DatabaseConnection, clock: Arc<dyn Clock>) -> Self {
        let customer_repo = Arc::new(SeaOrmCustomerRepository::new(db.clone()));
        let item_repo = Arc::new(SeaOrmItemRepository::new(db.clone()));
        let transaction_repo = Arc::new(SeaOrmTransactionRepository::new(db.clone()));

        Self {
            db,
            customer_repo,
            item_repo,
            transaction_repo,
            clock,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}
