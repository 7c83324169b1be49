// File: soundcoin-core/src/test_utils/helpers.rs

use sqlx::{Connection, PgConnection, Pool, Postgres};
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use crate::Error;

const TEST_DB_NAME: &str = "soundcoin_test";

/// Create the test database if it does not exist yet.
pub async fn ensure_test_database_exists() -> Result<(), Error> {
    let admin_url = std::env::var("DATABASE_ADMIN_URL")
        .unwrap_or_else(|_| "postgres://postgres@localhost/postgres".to_string());

    let mut conn = PgConnection::connect(&admin_url).await?;

    let create_db_sql = format!("CREATE DATABASE {TEST_DB_NAME};");
    match sqlx::query(&create_db_sql).execute(&mut conn).await {
        Ok(_) => info!("Created test DB '{TEST_DB_NAME}'."),
        Err(e) => {
            // 42P04 => duplicate_database
            let duplicate = e
                .as_database_error()
                .and_then(|db_err| db_err.code())
                .is_some_and(|code| code == "42P04");
            if !duplicate {
                return Err(Error::Database(e));
            }
        }
    }

    Ok(())
}

/// Pool on `TEST_DATABASE_URL`, falling back to a local `soundcoin_test`.
pub async fn create_test_db_pool() -> Result<Pool<Postgres>, Error> {
    let url = std::env::var("TEST_DATABASE_URL")
        .unwrap_or_else(|_| format!("postgres://postgres@localhost/{TEST_DB_NAME}"));

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await?;

    Ok(pool)
}
