pub mod postgres;
pub mod sqlite;
pub mod trait_def;

#[cfg(test)]
mod store_tests;

pub use postgres::PostgresStorage;
pub use sqlite::SqliteStorage;
pub use trait_def::{BlacklistStore, Storage, StorageError, StorageResult, VisitStore};

use crate::config::{DatabaseBackend, DatabaseConfig};
use anyhow::Result;
use std::sync::Arc;

/// Connect to the configured backend and create the schema if absent
pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn Storage>> {
    let storage: Arc<dyn Storage> = match config.backend {
        DatabaseBackend::Sqlite => {
            tracing::info!("Using SQLite storage: {}", config.url);
            Arc::new(SqliteStorage::new(&config.url, config.max_connections).await?)
        }
        DatabaseBackend::Postgres => {
            tracing::info!("Using PostgreSQL storage: {}", config.url);
            Arc::new(PostgresStorage::new(&config.url, config.max_connections).await?)
        }
    };

    storage.init().await?;
    Ok(storage)
}
