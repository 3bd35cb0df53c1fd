//! SeaORM implementation of TransactionRepository

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, QueryTrait, Set,
};

use super::{contains_term, map_foreign_key_violation, map_update_error, search_condition};
use crate::domain::{
    BorrowingTransaction, DomainError, StampedTransaction, TransactionFilter,
    TransactionRepository, TransactionStatus,
};
use crate::models::borrowing_transaction::{
    ActiveModel, Column, Entity as TransactionEntity, Model,
};
use crate::models::customer::{self, Entity as CustomerEntity};
use crate::models::item::{self, Entity as ItemEntity};

const UNKNOWN_REFERENCE: &str = "item or borrower does not exist";

/// Ids bound per `IN (..)` lookup, well under SQLite's variable limit
const ID_BATCH: usize = 500;

/// SeaORM-based implementation of TransactionRepository
pub struct SeaOrmTransactionRepository {
    db: DatabaseConnection,
}

impl SeaOrmTransactionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Attach borrower first names and item names to a batch of loans
    async fn with_names(&self, loans: Vec<Model>) -> Result<Vec<BorrowingTransaction>, DomainError> {
        if loans.is_empty() {
            return Ok(Vec::new());
        }

        let borrower_ids: BTreeSet<i32> = loans.iter().map(|l| l.borrower_id).collect();
        let item_ids: BTreeSet<i32> = loans.iter().map(|l| l.item_id).collect();

        let mut borrower_names: HashMap<i32, String> = HashMap::new();
        for batch in Vec::from_iter(borrower_ids).chunks(ID_BATCH) {
            let customers = CustomerEntity::find()
                .filter(customer::Column::Id.is_in(batch.iter().copied()))
                .all(&self.db)
                .await?;
            borrower_names.extend(customers.into_iter().map(|c| (c.id, c.first_name)));
        }

        let mut item_names: HashMap<i32, String> = HashMap::new();
        for batch in Vec::from_iter(item_ids).chunks(ID_BATCH) {
            let items = ItemEntity::find()
                .filter(item::Column::Id.is_in(batch.iter().copied()))
                .all(&self.db)
                .await?;
            item_names.extend(items.into_iter().map(|i| (i.id, i.name)));
        }

        loans
            .into_iter()
            .map(|loan| {
                let borrower_name = borrower_names
                    .get(&loan.borrower_id)
                    .cloned()
                    .unwrap_or_else(|| "Unknown".to_string());
                let item_name = item_names
                    .get(&loan.item_id)
                    .cloned()
                    .unwrap_or_else(|| "Unknown".to_string());
                to_domain(loan, borrower_name, item_name)
            })
            .collect()
    }

    async fn with_names_one(&self, loan: Model) -> Result<BorrowingTransaction, DomainError> {
        self.with_names(vec![loan])
            .await?
            .pop()
            .ok_or_else(|| DomainError::Internal("loan vanished while loading names".to_string()))
    }
}

fn to_domain(
    loan: Model,
    borrower_name: String,
    item_name: String,
) -> Result<BorrowingTransaction, DomainError> {
    let status: TransactionStatus = loan.status.parse().map_err(|_| {
        DomainError::Internal(format!(
            "loan {} has unknown stored status '{}'",
            loan.id, loan.status
        ))
    })?;

    Ok(BorrowingTransaction {
        id: loan.id,
        item_id: loan.item_id,
        borrower_id: loan.borrower_id,
        borrower_name,
        item_name,
        date_issued: loan.date_issued,
        due_date: loan.due_date,
        date_returned: loan.date_returned,
        status,
        created_at: loan.created_at,
    })
}

#[async_trait]
impl TransactionRepository for SeaOrmTransactionRepository {
    async fn find_all(
        &self,
        filter: TransactionFilter,
    ) -> Result<Vec<BorrowingTransaction>, DomainError> {
        let mut condition = Condition::all();

        // Stored status only; see crate::domain::status
        if let Some(status) = filter.status {
            condition = condition.add(Column::Status.eq(status.as_str()));
        }

        if let Some(borrower_id) = filter.borrower {
            condition = condition.add(Column::BorrowerId.eq(borrower_id));
        }

        if let Some(item_id) = filter.item {
            condition = condition.add(Column::ItemId.eq(item_id));
        }

        if let Some(search) = filter.search.as_deref() {
            condition = condition.add(search_condition(search, |term| {
                let borrowers = CustomerEntity::find()
                    .select_only()
                    .column(customer::Column::Id)
                    .filter(
                        Condition::any()
                            .add(contains_term(customer::Column::FirstName, term))
                            .add(contains_term(customer::Column::LastName, term)),
                    )
                    .into_query();
                let items = ItemEntity::find()
                    .select_only()
                    .column(item::Column::Id)
                    .filter(contains_term(item::Column::Name, term))
                    .into_query();

                Condition::any()
                    .add(Column::BorrowerId.in_subquery(borrowers))
                    .add(Column::ItemId.in_subquery(items))
            }));
        }

        let loans = TransactionEntity::find()
            .filter(condition)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await?;

        self.with_names(loans).await
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<BorrowingTransaction>, DomainError> {
        match TransactionEntity::find_by_id(id).one(&self.db).await? {
            Some(loan) => Ok(Some(self.with_names_one(loan).await?)),
            None => Ok(None),
        }
    }

    async fn create(&self, loan: StampedTransaction) -> Result<BorrowingTransaction, DomainError> {
        let draft = loan.draft();

        let model = ActiveModel {
            item_id: Set(draft.item_id),
            borrower_id: Set(draft.borrower_id),
            date_issued: Set(draft.date_issued),
            due_date: Set(draft.due_date),
            date_returned: Set(draft.date_returned),
            status: Set(loan.status().as_str().to_owned()),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        };

        let saved = model
            .insert(&self.db)
            .await
            .map_err(|e| map_foreign_key_violation(e, UNKNOWN_REFERENCE))?;

        self.with_names_one(saved).await
    }

    async fn update(
        &self,
        id: i32,
        loan: StampedTransaction,
    ) -> Result<BorrowingTransaction, DomainError> {
        let existing = TransactionEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound("Transaction"))?;

        let draft = loan.draft();
        let mut active_model: ActiveModel = existing.into();
        active_model.item_id = Set(draft.item_id);
        active_model.borrower_id = Set(draft.borrower_id);
        active_model.date_issued = Set(draft.date_issued);
        active_model.due_date = Set(draft.due_date);
        active_model.date_returned = Set(draft.date_returned);
        active_model.status = Set(loan.status().as_str().to_owned());

        let saved = active_model.update(&self.db).await.map_err(|e| {
            map_update_error(e, "Transaction", |e| {
                map_foreign_key_violation(e, UNKNOWN_REFERENCE)
            })
        })?;

        self.with_names_one(saved).await
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let result = TransactionEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound("Transaction"));
        }

        Ok(())
    }
}
