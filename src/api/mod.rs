pub mod customer;
pub mod error;
pub mod extract;
pub mod health;
pub mod item;
pub mod transaction;

use axum::{Router, routing::get};

use crate::infrastructure::AppState;

pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Customers
        .route(
            "/customers/",
            get(customer::list_customers).post(customer::create_customer),
        )
        .route(
            "/customers/:id/",
            get(customer::get_customer)
                .put(customer::replace_customer)
                .patch(customer::patch_customer)
                .delete(customer::delete_customer),
        )
        // Items
        .route("/items/", get(item::list_items).post(item::create_item))
        .route(
            "/items/:id/",
            get(item::get_item)
                .put(item::replace_item)
                .patch(item::patch_item)
                .delete(item::delete_item),
        )
        // Borrowing transactions
        .route(
            "/transactions/",
            get(transaction::list_transactions).post(transaction::create_transaction),
        )
        .route("/transactions/overdue/", get(transaction::list_overdue))
        .route("/transactions/active/", get(transaction::list_active))
        .route(
            "/transactions/:id/",
            get(transaction::get_transaction)
                .put(transaction::replace_transaction)
                .patch(transaction::patch_transaction)
                .delete(transaction::delete_transaction),
        )
        .with_state(state)
}
