use chrono::Duration;

use crate::domain::{CustomerPayload, DomainError, ItemPayload, TransactionPayload};
use crate::infrastructure::AppState;
use crate::services::{customer_service, item_service, transaction_service};

/// Insert a small demo data set through the regular services, so the loans
/// carry statuses stamped by the normal write path. Skips everything if a
/// demo customer already exists.
pub async fn seed_demo_data(state: &AppState) -> Result<(), DomainError> {
    if state
        .customer_repo
        .find_by_email("ada@example.com")
        .await?
        .is_some()
    {
        tracing::info!("Demo data already present, skipping");
        return Ok(());
    }

    // 1. Customers
    let ada = customer_service::create_customer(
        state,
        CustomerPayload {
            first_name: Some("Ada".to_owned()),
            last_name: Some("Lovelace".to_owned()),
            email: Some("ada@example.com".to_owned()),
            phone_number: Some(Some("555-0100".to_owned())),
        },
    )
    .await?;

    let alan = customer_service::create_customer(
        state,
        CustomerPayload {
            first_name: Some("Alan".to_owned()),
            last_name: Some("Turing".to_owned()),
            email: Some("alan@example.com".to_owned()),
            phone_number: None,
        },
    )
    .await?;

    // 2. Items
    let mut items = Vec::new();
    for (name, description) in [
        ("Cordless drill", Some("18V, two batteries")),
        ("Camping tent", Some("Four person")),
        ("Projector", None),
    ] {
        let item = item_service::create_item(
            state,
            ItemPayload {
                name: Some(name.to_owned()),
                description: Some(description.map(str::to_owned)),
            },
        )
        .await?;
        items.push(item);
    }

    // 3. Loans: one late, one on time, one already back
    let today = state.clock.today();
    let loans = [
        (items[0].id, ada.id, today - Duration::days(20), today - Duration::days(5), None),
        (items[1].id, alan.id, today - Duration::days(3), today + Duration::days(11), None),
        (
            items[2].id,
            ada.id,
            today - Duration::days(30),
            today - Duration::days(16),
            Some(today - Duration::days(18)),
        ),
    ];

    for (item, borrower, date_issued, due_date, date_returned) in loans {
        transaction_service::create_transaction(
            state,
            TransactionPayload {
                item: Some(item),
                borrower: Some(borrower),
                date_issued: Some(date_issued),
                due_date: Some(due_date),
                date_returned: Some(date_returned),
            },
        )
        .await?;
    }

    Ok(())
}
