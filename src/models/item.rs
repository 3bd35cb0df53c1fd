use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::borrowing_transaction::Entity")]
    BorrowingTransaction,
}

impl Related<super::borrowing_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BorrowingTransaction.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
