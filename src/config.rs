use std::net::SocketAddr;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub busy_timeout_secs: u64,
    pub jwt: JwtConfig,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://inventory.db".into());
        let jwt = JwtConfig {
            secret: non_blank_secret(std::env::var("JWT_SECRET").ok())
                .context("JWT_SECRET must be set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "inventory-api".into()),
            ttl_minutes: env_parse("JWT_TTL_MINUTES").unwrap_or(3 * 60),
        };
        Ok(Self {
            database_url,
            max_connections: env_parse("DB_MAX_CONNECTIONS").unwrap_or(5),
            busy_timeout_secs: env_parse("DB_BUSY_TIMEOUT_SECS").unwrap_or(5),
            jwt,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_parse("APP_PORT").unwrap_or(8000),
        })
    }

    /// In-memory database and a fixed secret; used by tests and local tooling.
    pub fn ephemeral(secret: &str) -> Self {
        Self {
            database_url: "sqlite::memory:".into(),
            max_connections: 1,
            busy_timeout_secs: 5,
            jwt: JwtConfig {
                secret: secret.into(),
                issuer: "inventory-api".into(),
                ttl_minutes: 3 * 60,
            },
            host: "127.0.0.1".into(),
            port: 0,
        }
    }

    pub fn listen_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }
}

fn non_blank_secret(raw: Option<String>) -> Option<String> {
    raw.filter(|s| !s.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}
