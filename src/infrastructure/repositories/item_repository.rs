//! SeaORM implementation of ItemRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use super::{contains_term, map_update_error, search_condition};
use crate::domain::{DomainError, Item, ItemFilter, ItemRepository, NewItem};
use crate::models::borrowing_transaction::{self, Entity as TransactionEntity};
use crate::models::item::{ActiveModel, Column, Entity as ItemEntity, Model};

impl From<Model> for Item {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            created_at: model.created_at,
        }
    }
}

/// SeaORM-based implementation of ItemRepository
pub struct SeaOrmItemRepository {
    db: DatabaseConnection,
}

impl SeaOrmItemRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ItemRepository for SeaOrmItemRepository {
    async fn find_all(&self, filter: ItemFilter) -> Result<Vec<Item>, DomainError> {
        let mut query = ItemEntity::find();

        if let Some(search) = filter.search.as_deref() {
            query = query.filter(search_condition(search, |term| {
                Condition::any()
                    .add(contains_term(Column::Name, term))
                    .add(contains_term(Column::Description, term))
            }));
        }

        let items = query.order_by_asc(Column::Id).all(&self.db).await?;
        Ok(items.into_iter().map(Item::from).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Item>, DomainError> {
        let item = ItemEntity::find_by_id(id).one(&self.db).await?;
        Ok(item.map(Item::from))
    }

    async fn create(&self, item: NewItem) -> Result<Item, DomainError> {
        let model = ActiveModel {
            name: Set(item.name),
            description: Set(item.description),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        };

        let saved = model.insert(&self.db).await?;
        Ok(Item::from(saved))
    }

    async fn update(&self, id: i32, item: NewItem) -> Result<Item, DomainError> {
        let existing = ItemEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound("Item"))?;

        let mut active_model: ActiveModel = existing.into();
        active_model.name = Set(item.name);
        active_model.description = Set(item.description);

        let saved = active_model
            .update(&self.db)
            .await
            .map_err(|e| map_update_error(e, "Item", DomainError::from))?;
        Ok(Item::from(saved))
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let txn = self.db.begin().await?;

        let loans = TransactionEntity::delete_many()
            .filter(borrowing_transaction::Column::ItemId.eq(id))
            .exec(&txn)
            .await?;

        let result = ItemEntity::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(DomainError::NotFound("Item"));
        }

        txn.commit().await?;

        tracing::info!("Deleted item {} and {} loan(s)", id, loans.rows_affected);
        Ok(())
    }
}
