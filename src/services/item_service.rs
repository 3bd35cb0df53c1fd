//! Item Service - Pure business logic without HTTP layer

use crate::domain::{DomainError, Item, ItemFilter, ItemPayload};
use crate::infrastructure::AppState;

pub async fn list_items(state: &AppState, filter: ItemFilter) -> Result<Vec<Item>, DomainError> {
    state.item_repo.find_all(filter).await
}

pub async fn get_item(state: &AppState, id: i32) -> Result<Item, DomainError> {
    state
        .item_repo
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound("Item"))
}

pub async fn create_item(state: &AppState, payload: ItemPayload) -> Result<Item, DomainError> {
    let item = payload.resolve(None, false)?;
    let saved = state.item_repo.create(item).await?;
    tracing::info!("Created item {} ({})", saved.id, saved.name);
    Ok(saved)
}

pub async fn update_item(
    state: &AppState,
    id: i32,
    payload: ItemPayload,
    partial: bool,
) -> Result<Item, DomainError> {
    let existing = get_item(state, id).await?;
    let item = payload.resolve(Some(&existing), partial)?;
    state.item_repo.update(id, item).await
}

/// Delete an item together with every loan of it
pub async fn delete_item(state: &AppState, id: i32) -> Result<(), DomainError> {
    state.item_repo.delete(id).await
}
