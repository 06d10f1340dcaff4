use std::sync::Arc;

use sqlx::SqlitePool;

use crate::{auth::jwt::JwtKeys, config::AppConfig, db};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub keys: JwtKeys,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        Self::from_config(AppConfig::from_env()?).await
    }

    /// Open the pool, bootstrap the schema and derive the signing keys.
    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let db = db::connect(&config).await?;
        db::bootstrap(&db).await?;
        Ok(Self::from_parts(db, Arc::new(config)))
    }

    pub fn from_parts(db: SqlitePool, config: Arc<AppConfig>) -> Self {
        let keys = JwtKeys::new(&config.jwt);
        Self { db, config, keys }
    }
}
