//! Transaction Service - the loan write path and loan queries
//!
//! Every create, PUT and PATCH funnels through [`save`], which validates the
//! references and stamps the status for today before anything is written.
//! Reads hand back the stored status untouched, so a loan nobody has written
//! to since its due date passed still reads as `borrowed`; callers wanting a
//! live answer use [`crate::domain::is_overdue`].

use crate::domain::{
    BorrowingTransaction, DomainError, TransactionDraft, TransactionFilter, TransactionPayload,
    TransactionStatus,
};
use crate::infrastructure::AppState;

pub async fn list_transactions(
    state: &AppState,
    filter: TransactionFilter,
) -> Result<Vec<BorrowingTransaction>, DomainError> {
    state.transaction_repo.find_all(filter).await
}

/// Loans whose stored status is `overdue`
pub async fn overdue_transactions(
    state: &AppState,
) -> Result<Vec<BorrowingTransaction>, DomainError> {
    list_by_stored_status(state, TransactionStatus::Overdue).await
}

/// Loans whose stored status is `borrowed`
pub async fn active_transactions(
    state: &AppState,
) -> Result<Vec<BorrowingTransaction>, DomainError> {
    list_by_stored_status(state, TransactionStatus::Borrowed).await
}

async fn list_by_stored_status(
    state: &AppState,
    status: TransactionStatus,
) -> Result<Vec<BorrowingTransaction>, DomainError> {
    let filter = TransactionFilter {
        status: Some(status),
        ..Default::default()
    };
    state.transaction_repo.find_all(filter).await
}

pub async fn get_transaction(
    state: &AppState,
    id: i32,
) -> Result<BorrowingTransaction, DomainError> {
    state
        .transaction_repo
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound("Transaction"))
}

pub async fn create_transaction(
    state: &AppState,
    payload: TransactionPayload,
) -> Result<BorrowingTransaction, DomainError> {
    let draft = payload.resolve(None, false)?;
    let saved = save(state, None, draft).await?;

    tracing::info!(
        "Created loan {}: item {} to customer {}, status {}",
        saved.id,
        saved.item_id,
        saved.borrower_id,
        saved.status
    );
    Ok(saved)
}

/// Replace (`partial = false`) or patch a loan. Status is re-resolved even
/// when no date changed.
pub async fn update_transaction(
    state: &AppState,
    id: i32,
    payload: TransactionPayload,
    partial: bool,
) -> Result<BorrowingTransaction, DomainError> {
    let existing = get_transaction(state, id).await?;
    let draft = payload.resolve(Some(&existing), partial)?;
    let saved = save(state, Some(id), draft).await?;

    if saved.status != existing.status {
        tracing::info!(
            "Loan {} moved from {} to {}",
            id,
            existing.status,
            saved.status
        );
    }
    Ok(saved)
}

pub async fn delete_transaction(state: &AppState, id: i32) -> Result<(), DomainError> {
    state.transaction_repo.delete(id).await
}

async fn save(
    state: &AppState,
    id: Option<i32>,
    draft: TransactionDraft,
) -> Result<BorrowingTransaction, DomainError> {
    ensure_references_exist(state, &draft).await?;

    let stamped = draft.stamp(state.clock.today());

    match id {
        None => state.transaction_repo.create(stamped).await,
        Some(id) => state.transaction_repo.update(id, stamped).await,
    }
}

async fn ensure_references_exist(
    state: &AppState,
    draft: &TransactionDraft,
) -> Result<(), DomainError> {
    if state.item_repo.find_by_id(draft.item_id).await?.is_none() {
        return Err(DomainError::validation(format!(
            "item {} does not exist",
            draft.item_id
        )));
    }

    if state
        .customer_repo
        .find_by_id(draft.borrower_id)
        .await?
        .is_none()
    {
        return Err(DomainError::validation(format!(
            "borrower {} does not exist",
            draft.borrower_id
        )));
    }

    Ok(())
}
