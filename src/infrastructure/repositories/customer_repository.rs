//! SeaORM implementation of CustomerRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use super::{contains_term, map_unique_violation, map_update_error, search_condition};
use crate::domain::{Customer, CustomerFilter, CustomerRepository, DomainError, NewCustomer};
use crate::models::borrowing_transaction::{self, Entity as TransactionEntity};
use crate::models::customer::{ActiveModel, Column, Entity as CustomerEntity, Model};

const DUPLICATE_EMAIL: &str = "a customer with this email already exists";

impl From<Model> for Customer {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            phone_number: model.phone_number,
            created_at: model.created_at,
        }
    }
}

/// SeaORM-based implementation of CustomerRepository
pub struct SeaOrmCustomerRepository {
    db: DatabaseConnection,
}

impl SeaOrmCustomerRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CustomerRepository for SeaOrmCustomerRepository {
    async fn find_all(&self, filter: CustomerFilter) -> Result<Vec<Customer>, DomainError> {
        let mut condition = Condition::all();

        if let Some(search) = filter.search.as_deref() {
            condition = condition.add(search_condition(search, |term| {
                Condition::any()
                    .add(contains_term(Column::FirstName, term))
                    .add(contains_term(Column::LastName, term))
                    .add(contains_term(Column::Email, term))
            }));
        }

        let customers = CustomerEntity::find()
            .filter(condition)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await?;

        Ok(customers.into_iter().map(Customer::from).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Customer>, DomainError> {
        let customer = CustomerEntity::find_by_id(id).one(&self.db).await?;
        Ok(customer.map(Customer::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Customer>, DomainError> {
        let customer = CustomerEntity::find()
            .filter(Column::Email.eq(email))
            .one(&self.db)
            .await?;
        Ok(customer.map(Customer::from))
    }

    async fn create(&self, customer: NewCustomer) -> Result<Customer, DomainError> {
        let model = ActiveModel {
            first_name: Set(customer.first_name),
            last_name: Set(customer.last_name),
            email: Set(customer.email),
            phone_number: Set(customer.phone_number),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        };

        let saved = model
            .insert(&self.db)
            .await
            .map_err(|e| map_unique_violation(e, DUPLICATE_EMAIL))?;

        Ok(Customer::from(saved))
    }

    async fn update(&self, id: i32, customer: NewCustomer) -> Result<Customer, DomainError> {
        let existing = CustomerEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound("Customer"))?;

        let mut active_model: ActiveModel = existing.into();
        active_model.first_name = Set(customer.first_name);
        active_model.last_name = Set(customer.last_name);
        active_model.email = Set(customer.email);
        active_model.phone_number = Set(customer.phone_number);

        let saved = active_model.update(&self.db).await.map_err(|e| {
            map_update_error(e, "Customer", |e| map_unique_violation(e, DUPLICATE_EMAIL))
        })?;

        Ok(Customer::from(saved))
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let txn = self.db.begin().await?;

        let loans = TransactionEntity::delete_many()
            .filter(borrowing_transaction::Column::BorrowerId.eq(id))
            .exec(&txn)
            .await?;

        let result = CustomerEntity::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            // Dropping txn rolls back
            return Err(DomainError::NotFound("Customer"));
        }

        txn.commit().await?;

        tracing::info!(
            "Deleted customer {} and {} loan(s)",
            id,
            loans.rows_affected
        );
        Ok(())
    }
}
