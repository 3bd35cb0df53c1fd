use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};

use super::extract::{ApiJson, ApiPath, ApiQuery};
use crate::domain::{CustomerFilter, CustomerPayload, DomainError};
use crate::infrastructure::AppState;
use crate::services::customer_service;

#[utoipa::path(
    get,
    path = "/api/customers/",
    params(CustomerFilter),
    responses((status = 200, description = "Customers ordered by id"))
)]
pub async fn list_customers(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<CustomerFilter>,
) -> Result<Json<Value>, DomainError> {
    let customers = customer_service::list_customers(&state, filter).await?;
    Ok(Json(json!({
        "customers": customers,
        "total": customers.len()
    })))
}

#[utoipa::path(
    post,
    path = "/api/customers/",
    request_body = CustomerPayload,
    responses(
        (status = 201, description = "Customer created"),
        (status = 400, description = "Missing field, malformed or duplicate email")
    )
)]
pub async fn create_customer(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CustomerPayload>,
) -> Result<(StatusCode, Json<Value>), DomainError> {
    let customer = customer_service::create_customer(&state, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "customer": customer,
            "message": "Customer created successfully"
        })),
    ))
}

#[utoipa::path(
    get,
    path = "/api/customers/{id}/",
    params(("id" = i32, Path, description = "Customer id")),
    responses(
        (status = 200, description = "The customer"),
        (status = 404, description = "No such customer")
    )
)]
pub async fn get_customer(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<Value>, DomainError> {
    let customer = customer_service::get_customer(&state, id).await?;
    Ok(Json(json!({ "customer": customer })))
}

#[utoipa::path(
    put,
    path = "/api/customers/{id}/",
    params(("id" = i32, Path, description = "Customer id")),
    request_body = CustomerPayload,
    responses(
        (status = 200, description = "Customer replaced"),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "No such customer")
    )
)]
pub async fn replace_customer(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<CustomerPayload>,
) -> Result<Json<Value>, DomainError> {
    update(state, id, payload, false).await
}

#[utoipa::path(
    patch,
    path = "/api/customers/{id}/",
    params(("id" = i32, Path, description = "Customer id")),
    request_body = CustomerPayload,
    responses(
        (status = 200, description = "Customer updated"),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "No such customer")
    )
)]
pub async fn patch_customer(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<CustomerPayload>,
) -> Result<Json<Value>, DomainError> {
    update(state, id, payload, true).await
}

async fn update(
    state: AppState,
    id: i32,
    payload: CustomerPayload,
    partial: bool,
) -> Result<Json<Value>, DomainError> {
    let customer = customer_service::update_customer(&state, id, payload, partial).await?;
    Ok(Json(json!({
        "customer": customer,
        "message": "Customer updated successfully"
    })))
}

#[utoipa::path(
    delete,
    path = "/api/customers/{id}/",
    params(("id" = i32, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Customer and their loans deleted"),
        (status = 404, description = "No such customer")
    )
)]
pub async fn delete_customer(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<Value>, DomainError> {
    customer_service::delete_customer(&state, id).await?;
    Ok(Json(json!({ "message": "Customer deleted successfully" })))
}
