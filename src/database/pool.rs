use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{info, warn};

use super::error::StoreError;
use crate::config::DatabaseConfig;

/// Connect to Postgres when a URL is configured.
///
/// The pool is lazy: no connection is opened until the first query, so an
/// unreachable database shows up in `/health` instead of blocking startup.
pub fn connect_lazy(config: &DatabaseConfig) -> Result<Option<PgPool>, StoreError> {
    let Some(url) = config.url.as_deref() else {
        info!("No database configured; running with in-memory storage only");
        return Ok(None);
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .connect_lazy(url)?;

    info!(
        "Database pool configured for {}",
        config.redacted_url().unwrap_or_else(|| "<unparsable url>".to_string())
    );
    Ok(Some(pool))
}

/// Connectivity as reported by `/health`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseStatus {
    Ok,
    Unavailable,
    Disabled,
}

impl DatabaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseStatus::Ok => "ok",
            DatabaseStatus::Unavailable => "unavailable",
            DatabaseStatus::Disabled => "disabled",
        }
    }
}

/// Ping the pool with `SELECT 1`
pub async fn health_check(pool: Option<&PgPool>) -> DatabaseStatus {
    let Some(pool) = pool else {
        return DatabaseStatus::Disabled;
    };

    match sqlx::query("SELECT 1").execute(pool).await {
        Ok(_) => DatabaseStatus::Ok,
        Err(e) => {
            warn!("Database health check failed: {}", e);
            DatabaseStatus::Unavailable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_url_means_disabled() {
        let config = DatabaseConfig {
            url: None,
            max_connections: 2,
            connect_timeout_secs: 1,
        };
        let pool = connect_lazy(&config).unwrap();
        assert!(pool.is_none());
        assert_eq!(health_check(pool.as_ref()).await, DatabaseStatus::Disabled);
    }
}
