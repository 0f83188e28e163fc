//! Database bootstrap: make sure the target database exists and open the pool.

use crate::error::{AppError, ConfigError};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::ConnectOptions;
use sqlx::PgPool;
use std::str::FromStr;

const MAINTENANCE_DATABASE: &str = "postgres";

fn connect_options(database_url: &str) -> Result<PgConnectOptions, ConfigError> {
    PgConnectOptions::from_str(database_url).map_err(|e| ConfigError::InvalidSetting {
        key: "DATABASE_URL",
        value: e.to_string(),
    })
}

/// Database named by the URL, if any.
fn target_database(opts: &PgConnectOptions) -> Option<String> {
    opts.get_database()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// maintenance `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let opts = connect_options(database_url)?;
    let Some(db_name) = target_database(&opts) else {
        return Ok(());
    };
    if db_name == MAINTENANCE_DATABASE {
        return Ok(());
    }
    let mut conn: sqlx::PgConnection = opts.database(MAINTENANCE_DATABASE).connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, AppError> {
    let opts = connect_options(database_url)?;
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect_with(opts)
        .await?;
    Ok(pool)
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
