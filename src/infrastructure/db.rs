use std::str::FromStr;

use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbErr, RuntimeErr, SqlxSqliteConnector, Statement,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

pub async fn init_db(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = connect(database_url).await?;

    // Run migrations manually (simple SQL)
    run_migrations(&db).await?;

    Ok(db)
}

/// Open the pool ourselves so every connection enforces foreign keys.
/// An in-memory database lives only as long as its connection, so it gets a
/// single connection that is never recycled.
async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let to_db_err = |e: sqlx::Error| DbErr::Conn(RuntimeErr::SqlxError(e));

    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(to_db_err)?
        .foreign_keys(true);

    let pool_options = if database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    };

    let pool = pool_options
        .connect_with(options)
        .await
        .map_err(to_db_err)?;

    tracing::debug!("Connected to {}", database_url);
    Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
}

async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Create customers table
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS customers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            phone_number TEXT,
            created_at TEXT NOT NULL
        )
        "#
        .to_owned(),
    ))
    .await?;

    // Create items table
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT,
            created_at TEXT NOT NULL
        )
        "#
        .to_owned(),
    ))
    .await?;

    // Create borrowing_transactions table
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS borrowing_transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            item_id INTEGER NOT NULL,
            borrower_id INTEGER NOT NULL,
            date_issued TEXT NOT NULL,
            due_date TEXT NOT NULL,
            date_returned TEXT,
            status TEXT NOT NULL DEFAULT 'borrowed'
                CHECK (status IN ('borrowed', 'returned', 'overdue')),
            created_at TEXT NOT NULL,
            FOREIGN KEY (item_id) REFERENCES items(id) ON DELETE CASCADE,
            FOREIGN KEY (borrower_id) REFERENCES customers(id) ON DELETE CASCADE
        )
        "#
        .to_owned(),
    ))
    .await?;

    for index in [
        "CREATE INDEX IF NOT EXISTS idx_transactions_item_id ON borrowing_transactions(item_id)",
        "CREATE INDEX IF NOT EXISTS idx_transactions_borrower_id ON borrowing_transactions(borrower_id)",
        "CREATE INDEX IF NOT EXISTS idx_transactions_status ON borrowing_transactions(status)",
    ] {
        db.execute(Statement::from_string(
            db.get_database_backend(),
            index.to_owned(),
        ))
        .await?;
    }

    Ok(())
}
