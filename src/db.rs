use std::{str::FromStr, time::Duration};

use anyhow::Context;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};
use thiserror::Error;
use tracing::info;

use crate::config::AppConfig;

/// Storage failures the handlers care to tell apart.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated")]
    Duplicate,
    #[error("foreign key constraint violated")]
    ForeignKey,
    #[error(transparent)]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return StoreError::Duplicate;
            }
            if db_err.is_foreign_key_violation() {
                return StoreError::ForeignKey;
            }
        }
        StoreError::Database(err)
    }
}

/// Open the connection pool. Every pooled connection has foreign keys enforced
/// and a bounded lock wait; file databases run in WAL mode.
pub async fn connect(config: &AppConfig) -> anyhow::Result<SqlitePool> {
    let mut options = SqliteConnectOptions::from_str(&config.database_url)
        .with_context(|| format!("parse DATABASE_URL {}", config.database_url))?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(config.busy_timeout_secs));

    let mut pool = SqlitePoolOptions::new();
    if config.is_in_memory() {
        // each connection would otherwise see its own empty database
        pool = pool
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>);
    } else {
        options = options.journal_mode(SqliteJournalMode::Wal);
        pool = pool.max_connections(config.max_connections);
    }

    let db = pool
        .connect_with(options)
        .await
        .context("connect to database")?;
    Ok(db)
}

/// Create tables and constraints. Safe to run on every start.
pub async fn bootstrap(db: &SqlitePool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(db)
        .await
        .context("run schema migrations")?;
    info!("schema ready");
    Ok(())
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let db = connect(&AppConfig::ephemeral("test"))
        .await
        .expect("in-memory pool");
    bootstrap(&db).await.expect("migrations");
    db
}
