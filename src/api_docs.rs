use crate::api;
use crate::domain::{Customer, CustomerPayload, Item, ItemPayload, TransactionPayload, TransactionStatus};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        api::customer::list_customers,
        api::customer::create_customer,
        api::customer::get_customer,
        api::customer::replace_customer,
        api::customer::patch_customer,
        api::customer::delete_customer,
        api::item::list_items,
        api::item::create_item,
        api::item::get_item,
        api::item::replace_item,
        api::item::patch_item,
        api::item::delete_item,
        api::transaction::list_transactions,
        api::transaction::list_overdue,
        api::transaction::list_active,
        api::transaction::create_transaction,
        api::transaction::get_transaction,
        api::transaction::replace_transaction,
        api::transaction::patch_transaction,
        api::transaction::delete_transaction,
    ),
    components(
        schemas(
            Customer,
            CustomerPayload,
            Item,
            ItemPayload,
            TransactionPayload,
            TransactionStatus,
            api::transaction::TransactionResponse,
        )
    ),
    tags(
        (name = "loan-tracker", description = "Customers, items and loans")
    )
)]
pub struct ApiDoc;
