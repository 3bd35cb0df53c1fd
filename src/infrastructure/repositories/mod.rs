//! Repository implementations using SeaORM

pub mod customer_repository;
pub mod item_repository;
pub mod transaction_repository;

pub use customer_repository::SeaOrmCustomerRepository;
pub use item_repository::SeaOrmItemRepository;
pub use transaction_repository::SeaOrmTransactionRepository;

use sea_orm::sea_query::{Expr, LikeExpr, SimpleExpr};
use sea_orm::{ColumnTrait, Condition, DbErr, SqlErr};

use crate::domain::validation::search_terms;
use crate::domain::DomainError;

/// AND together one condition per search term; `per_term` decides which
/// columns a single term may match.
pub(crate) fn search_condition(query: &str, per_term: impl Fn(&str) -> Condition) -> Condition {
    search_terms(query)
        .iter()
        .fold(Condition::all(), |cond, term| cond.add(per_term(term.as_str())))
}

/// Literal substring match on `col`. `%`, `_` and backslashes in the term match
/// themselves rather than acting as LIKE wildcards.
pub(crate) fn contains_term<C: ColumnTrait>(col: C, term: &str) -> SimpleExpr {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    let pattern = LikeExpr::new(format!("%{}%", escaped)).escape('\\');
    Expr::col((col.entity_name(), col)).like(pattern)
}

/// A row deleted between the lookup and the write surfaces as
/// `RecordNotUpdated`; report it as missing.
pub(crate) fn map_update_error(
    e: DbErr,
    entity: &'static str,
    otherwise: impl FnOnce(DbErr) -> DomainError,
) -> DomainError {
    match e {
        DbErr::RecordNotUpdated => DomainError::NotFound(entity),
        other => otherwise(other),
    }
}

pub(crate) fn map_unique_violation(e: DbErr, msg: &str) -> DomainError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => DomainError::validation(msg),
        _ => DomainError::from(e),
    }
}

pub(crate) fn map_foreign_key_violation(e: DbErr, msg: &str) -> DomainError {
    match e.sql_err() {
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => DomainError::validation(msg),
        _ => DomainError::from(e),
    }
}
