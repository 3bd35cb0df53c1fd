use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};

use super::extract::{ApiJson, ApiPath, ApiQuery};
use crate::domain::{DomainError, ItemFilter, ItemPayload};
use crate::infrastructure::AppState;
use crate::services::item_service;

#[utoipa::path(
    get,
    path = "/api/items/",
    params(ItemFilter),
    responses((status = 200, description = "Items ordered by id"))
)]
pub async fn list_items(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<ItemFilter>,
) -> Result<Json<Value>, DomainError> {
    let items = item_service::list_items(&state, filter).await?;
    Ok(Json(json!({
        "items": items,
        "total": items.len()
    })))
}

#[utoipa::path(
    post,
    path = "/api/items/",
    request_body = ItemPayload,
    responses(
        (status = 201, description = "Item created"),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn create_item(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ItemPayload>,
) -> Result<(StatusCode, Json<Value>), DomainError> {
    let item = item_service::create_item(&state, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "item": item,
            "message": "Item created successfully"
        })),
    ))
}

#[utoipa::path(
    get,
    path = "/api/items/{id}/",
    params(("id" = i32, Path, description = "Item id")),
    responses(
        (status = 200, description = "The item"),
        (status = 404, description = "No such item")
    )
)]
pub async fn get_item(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<Value>, DomainError> {
    let item = item_service::get_item(&state, id).await?;
    Ok(Json(json!({ "item": item })))
}

#[utoipa::path(
    put,
    path = "/api/items/{id}/",
    params(("id" = i32, Path, description = "Item id")),
    request_body = ItemPayload,
    responses(
        (status = 200, description = "Item replaced"),
        (status = 404, description = "No such item")
    )
)]
pub async fn replace_item(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<ItemPayload>,
) -> Result<Json<Value>, DomainError> {
    let item = item_service::update_item(&state, id, payload, false).await?;
    Ok(Json(json!({
        "item": item,
        "message": "Item updated successfully"
    })))
}

#[utoipa::path(
    patch,
    path = "/api/items/{id}/",
    params(("id" = i32, Path, description = "Item id")),
    request_body = ItemPayload,
    responses(
        (status = 200, description = "Item updated"),
        (status = 404, description = "No such item")
    )
)]
pub async fn patch_item(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<ItemPayload>,
) -> Result<Json<Value>, DomainError> {
    let item = item_service::update_item(&state, id, payload, true).await?;
    Ok(Json(json!({
        "item": item,
        "message": "Item updated successfully"
    })))
}

#[utoipa::path(
    delete,
    path = "/api/items/{id}/",
    params(("id" = i32, Path, description = "Item id")),
    responses(
        (status = 200, description = "Item and its loans deleted"),
        (status = 404, description = "No such item")
    )
)]
pub async fn delete_item(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<Value>, DomainError> {
    item_service::delete_item(&state, id).await?;
    Ok(Json(json!({ "message": "Item deleted successfully" })))
}
