use crate::models::{BlacklistEntry, Visit};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("ip address {0} already blacklisted")]
    Duplicate(String),
    #[error("ip address must not be empty")]
    InvalidInput,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        StorageError::Other(err.into())
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Append-only record of visits
#[async_trait]
pub trait VisitStore: Send + Sync {
    /// Insert a visit; id and timestamp are assigned by the store
    async fn record(&self, ip_address: &str, location: Option<&str>) -> StorageResult<Visit>;

    /// All visits in insertion order
    async fn list_visits(&self) -> Result<Vec<Visit>>;

    /// Visits whose address matches `ip_address` exactly, in insertion order
    async fn list_visits_by_ip(&self, ip_address: &str) -> Result<Vec<Visit>>;

    async fn count_visits(&self) -> Result<i64>;

    async fn count_distinct_ips(&self) -> Result<i64>;

    /// Number of visits per distinct address
    async fn group_counts_by_ip(&self) -> Result<BTreeMap<String, i64>>;
}

/// Set of flagged addresses
#[async_trait]
pub trait BlacklistStore: Send + Sync {
    /// Insert `ip_address`, failing with [`StorageError::Duplicate`] if it is
    /// already present
    async fn add_to_blacklist(&self, ip_address: &str) -> StorageResult<BlacklistEntry>;

    /// All blacklisted addresses in insertion order
    async fn list_blacklist(&self) -> Result<Vec<String>>;

    async fn is_blacklisted(&self, ip_address: &str) -> Result<bool>;
}

#[async_trait]
pub trait Storage: VisitStore + BlacklistStore {
    /// Initialize the storage (create tables if absent)
    async fn init(&self) -> Result<()>;
}
