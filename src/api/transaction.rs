//! Loan endpoints
//!
//! `status` in every response is the value stored at the last write.
//! `is_overdue` is computed per request against today's date, so the two can
//! disagree for a loan that went past due without being written to since.

use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::{Value, json};
use utoipa::ToSchema;

use super::extract::{ApiJson, ApiPath, ApiQuery};
use crate::domain::{
    BorrowingTransaction, DomainError, TransactionFilter, TransactionPayload, TransactionStatus,
    is_overdue,
};
use crate::infrastructure::AppState;
use crate::services::transaction_service;

#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionResponse {
    pub id: i32,
    pub item: i32,
    pub borrower: i32,
    pub borrower_name: String,
    pub item_name: String,
    pub date_issued: NaiveDate,
    pub due_date: NaiveDate,
    pub date_returned: Option<NaiveDate>,
    pub status: TransactionStatus,
    pub is_overdue: bool,
    pub created_at: DateTime<Utc>,
}

impl TransactionResponse {
    pub fn new(loan: BorrowingTransaction, today: NaiveDate) -> Self {
        Self {
            is_overdue: is_overdue(loan.status, loan.due_date, today),
            id: loan.id,
            item: loan.item_id,
            borrower: loan.borrower_id,
            borrower_name: loan.borrower_name,
            item_name: loan.item_name,
            date_issued: loan.date_issued,
            due_date: loan.due_date,
            date_returned: loan.date_returned,
            status: loan.status,
            created_at: loan.created_at,
        }
    }
}

fn list_response(state: &AppState, loans: Vec<BorrowingTransaction>) -> Json<Value> {
    let today = state.clock.today();
    let transactions: Vec<TransactionResponse> = loans
        .into_iter()
        .map(|loan| TransactionResponse::new(loan, today))
        .collect();

    Json(json!({
        "transactions": transactions,
        "total": transactions.len()
    }))
}

#[utoipa::path(
    get,
    path = "/api/transactions/",
    params(TransactionFilter),
    responses((status = 200, description = "Loans ordered by id"))
)]
pub async fn list_transactions(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<TransactionFilter>,
) -> Result<Json<Value>, DomainError> {
    let loans = transaction_service::list_transactions(&state, filter).await?;
    Ok(list_response(&state, loans))
}

#[utoipa::path(
    get,
    path = "/api/transactions/overdue/",
    responses((status = 200, description = "Loans stored as overdue"))
)]
pub async fn list_overdue(State(state): State<AppState>) -> Result<Json<Value>, DomainError> {
    let loans = transaction_service::overdue_transactions(&state).await?;
    Ok(list_response(&state, loans))
}

#[utoipa::path(
    get,
    path = "/api/transactions/active/",
    responses((status = 200, description = "Loans stored as borrowed"))
)]
pub async fn list_active(State(state): State<AppState>) -> Result<Json<Value>, DomainError> {
    let loans = transaction_service::active_transactions(&state).await?;
    Ok(list_response(&state, loans))
}

#[utoipa::path(
    post,
    path = "/api/transactions/",
    request_body = TransactionPayload,
    responses(
        (status = 201, description = "Loan created with a server-computed status", body = TransactionResponse),
        (status = 400, description = "Missing date or unknown item/borrower")
    )
)]
pub async fn create_transaction(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<TransactionPayload>,
) -> Result<(StatusCode, Json<Value>), DomainError> {
    let loan = transaction_service::create_transaction(&state, payload).await?;
    let transaction = TransactionResponse::new(loan, state.clock.today());

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "transaction": transaction,
            "message": "Transaction created successfully"
        })),
    ))
}

#[utoipa::path(
    get,
    path = "/api/transactions/{id}/",
    params(("id" = i32, Path, description = "Transaction id")),
    responses(
        (status = 200, description = "The loan", body = TransactionResponse),
        (status = 404, description = "No such loan")
    )
)]
pub async fn get_transaction(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<Value>, DomainError> {
    let loan = transaction_service::get_transaction(&state, id).await?;
    let transaction = TransactionResponse::new(loan, state.clock.today());
    Ok(Json(json!({ "transaction": transaction })))
}

#[utoipa::path(
    put,
    path = "/api/transactions/{id}/",
    params(("id" = i32, Path, description = "Transaction id")),
    request_body = TransactionPayload,
    responses(
        (status = 200, description = "Loan replaced and status re-stamped"),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "No such loan")
    )
)]
pub async fn replace_transaction(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<TransactionPayload>,
) -> Result<Json<Value>, DomainError> {
    update(state, id, payload, false).await
}

#[utoipa::path(
    patch,
    path = "/api/transactions/{id}/",
    params(("id" = i32, Path, description = "Transaction id")),
    request_body = TransactionPayload,
    responses(
        (status = 200, description = "Loan updated and status re-stamped"),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "No such loan")
    )
)]
pub async fn patch_transaction(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<TransactionPayload>,
) -> Result<Json<Value>, DomainError> {
    update(state, id, payload, true).await
}

async fn update(
    state: AppState,
    id: i32,
    payload: TransactionPayload,
    partial: bool,
) -> Result<Json<Value>, DomainError> {
    let loan = transaction_service::update_transaction(&state, id, payload, partial).await?;
    let transaction = TransactionResponse::new(loan, state.clock.today());

    Ok(Json(json!({
        "transaction": transaction,
        "message": "Transaction updated successfully"
    })))
}

#[utoipa::path(
    delete,
    path = "/api/transactions/{id}/",
    params(("id" = i32, Path, description = "Transaction id")),
    responses(
        (status = 200, description = "Loan deleted"),
        (status = 404, description = "No such loan")
    )
)]
pub async fn delete_transaction(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<Value>, DomainError> {
    transaction_service::delete_transaction(&state, id).await?;
    Ok(Json(json!({ "message": "Transaction deleted successfully" })))
}
