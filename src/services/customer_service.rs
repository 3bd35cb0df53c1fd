//! Customer Service - Pure business logic without HTTP layer

use crate::domain::{Customer, CustomerFilter, CustomerPayload, DomainError};
use crate::infrastructure::AppState;

pub async fn list_customers(
    state: &AppState,
    filter: CustomerFilter,
) -> Result<Vec<Customer>, DomainError> {
    state.customer_repo.find_all(filter).await
}

pub async fn get_customer(state: &AppState, id: i32) -> Result<Customer, DomainError> {
    state
        .customer_repo
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound("Customer"))
}

/// Create a customer. The email must not belong to anyone else.
pub async fn create_customer(
    state: &AppState,
    payload: CustomerPayload,
) -> Result<Customer, DomainError> {
    let customer = payload.resolve(None, false)?;
    ensure_email_free(state, &customer.email, None).await?;

    let saved = state.customer_repo.create(customer).await?;
    tracing::info!("Created customer {} ({})", saved.id, saved.display_name());
    Ok(saved)
}

/// Replace (`partial = false`) or patch a customer
pub async fn update_customer(
    state: &AppState,
    id: i32,
    payload: CustomerPayload,
    partial: bool,
) -> Result<Customer, DomainError> {
    let existing = get_customer(state, id).await?;
    let customer = payload.resolve(Some(&existing), partial)?;

    if customer.email != existing.email {
        ensure_email_free(state, &customer.email, Some(id)).await?;
    }

    state.customer_repo.update(id, customer).await
}

/// Delete a customer together with all of their loans
pub async fn delete_customer(state: &AppState, id: i32) -> Result<(), DomainError> {
    state.customer_repo.delete(id).await
}

async fn ensure_email_free(
    state: &AppState,
    email: &str,
    owner: Option<i32>,
) -> Result<(), DomainError> {
    match state.customer_repo.find_by_email(email).await? {
        Some(other) if Some(other.id) != owner => {
            tracing::warn!("Rejected duplicate customer email {}", email);
            Err(DomainError::validation(
                "a customer with this email already exists",
            ))
        }
        _ => Ok(()),
    }
}
