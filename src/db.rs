use sqlx::{sqlite::{SqlitePoolOptions, SqliteConnectOptions}, SqlitePool};
use std::str::FromStr;

pub async fn init_pool(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let connect_opts = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(connect_opts)
        .await?;

    create_schema(&pool).await?;
    Ok(pool)
}

/// Idempotent; safe to run on every start.
pub async fn create_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            is_email_verified INTEGER NOT NULL DEFAULT 0,
            verification_token TEXT,
            created_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Identity accounts live apart from the profile rows above; the profile
    // shares the account id.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS identities (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            token TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            expires_at TEXT,
            FOREIGN KEY(user_id) REFERENCES identities(id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS businesses (
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            business_type TEXT NOT NULL,
            business_size TEXT,
            industry TEXT NOT NULL,
            business_address TEXT,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now')),
            updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now')),
            FOREIGN KEY(owner_id) REFERENCES users(id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tax_profiles (
            id TEXT PRIMARY KEY,
            business_id TEXT NOT NULL UNIQUE,
            tin_number TEXT NOT NULL,
            vat_registered INTEGER NOT NULL DEFAULT 0,
            fiscal_year_end TEXT NOT NULL,
            bir_registration_date TEXT,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now')),
            updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now')),
            FOREIGN KEY(business_id) REFERENCES businesses(id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bookkeeping_preferences (
            id TEXT PRIMARY KEY,
            business_id TEXT NOT NULL UNIQUE,
            accounting_method TEXT NOT NULL CHECK(accounting_method IN ('cash','accrual')),
            chart_of_accounts TEXT NOT NULL,
            currency_preference TEXT NOT NULL,
            digital_receipts INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now')),
            updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now')),
            FOREIGN KEY(business_id) REFERENCES businesses(id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// In-memory database with the full schema. A single connection, since every
/// SQLite memory connection is a separate database.
pub async fn memory_pool() -> Result<SqlitePool, sqlx::Error> {
    init_pool("sqlite::memory:", 1).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn schema_is_idempotent() {
        let pool = memory_pool().await.unwrap();
        create_schema(&pool).await.unwrap();

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(
            tables,
            vec![
                "bookkeeping_preferences",
                "businesses",
                "identities",
                "sessions",
                "tax_profiles",
                "users",
            ]
        );
    }

    #[tokio::test]
    async fn accounting_method_is_constrained() {
        let pool = memory_pool().await.unwrap();
        sqlx::query("PRAGMA foreign_keys = OFF").execute(&pool).await.unwrap();
        let res = sqlx::query(
            "INSERT INTO bookkeeping_preferences (id, business_id, accounting_method, chart_of_accounts, currency_preference) VALUES ('p1', 'b1', 'hybrid', 'standard', 'PHP')",
        )
        .execute(&pool)
        .await;
        assert!(res.is_err());
    }
}
