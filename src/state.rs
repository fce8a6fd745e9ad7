//! Shared application state

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

/// Cloned into every handler. All durable state lives in the pool; handlers
/// themselves are stateless between requests.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Self, sqlx::Error> {
        let pool = db::connect(&config.database_url).await?;
        Ok(Self {
            pool,
            config: Arc::new(config),
        })
    }

    /// State over an existing pool (tests)
    pub fn with_pool(pool: SqlitePool, config: Config) -> Self {
        Self {
            pool,
            config: Arc::new(config),
        }
    }
}
