use crate::models::{BlacklistEntry, Visit};
use crate::storage::{BlacklistStore, Storage, StorageError, StorageResult, VisitStore};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use std::sync::Arc;

pub struct SqliteStorage {
    pool: Arc<SqlitePool>,
}

impl SqliteStorage {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS visits (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ip_address TEXT NOT NULL,
                location TEXT,
                timestamp INTEGER NOT NULL
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_visits_ip_address ON visits(ip_address)")
            .execute(self.pool.as_ref())
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS blacklist (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ip_address TEXT NOT NULL UNIQUE
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }
}

#[async_trait]
impl VisitStore for SqliteStorage {
    async fn record(&self, ip_address: &str, location: Option<&str>) -> StorageResult<Visit> {
        if ip_address.is_empty() {
            return Err(StorageError::InvalidInput);
        }

        let timestamp = chrono::Utc::now().timestamp();

        let visit = sqlx::query_as::<_, Visit>(
            r#"
            INSERT INTO visits (ip_address, location, timestamp)
            VALUES (?, ?, ?)
            RETURNING id, ip_address, location, timestamp
            "#,
        )
        .bind(ip_address)
        .bind(location)
        .bind(timestamp)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(visit)
    }

    async fn list_visits(&self) -> Result<Vec<Visit>> {
        let visits = sqlx::query_as::<_, Visit>(
            r#"
            SELECT id, ip_address, location, timestamp
            FROM visits
            ORDER BY id ASC
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(visits)
    }

    async fn list_visits_by_ip(&self, ip_address: &str) -> Result<Vec<Visit>> {
        let visits = sqlx::query_as::<_, Visit>(
            r#"
            SELECT id, ip_address, location, timestamp
            FROM visits
            WHERE ip_address = ?
            ORDER BY id ASC
            "#,
        )
        .bind(ip_address)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(visits)
    }

    async fn count_visits(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM visits")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn count_distinct_ips(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(DISTINCT ip_address) FROM visits")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn group_counts_by_ip(&self) -> Result<BTreeMap<String, i64>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT ip_address, COUNT(*)
            FROM visits
            GROUP BY ip_address
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().collect())
    }
}

#[async_trait]
impl BlacklistStore for SqliteStorage {
    async fn add_to_blacklist(&self, ip_address: &str) -> StorageResult<BlacklistEntry> {
        if ip_address.is_empty() {
            return Err(StorageError::InvalidInput);
        }

        let entry = sqlx::query_as::<_, BlacklistEntry>(
            r#"
            INSERT INTO blacklist (ip_address)
            VALUES (?)
            ON CONFLICT(ip_address) DO NOTHING
            RETURNING id, ip_address
            "#,
        )
        .bind(ip_address)
        .fetch_optional(self.pool.as_ref())
        .await?;

        entry.ok_or_else(|| StorageError::Duplicate(ip_address.to_string()))
    }

    async fn list_blacklist(&self) -> Result<Vec<String>> {
        let ips = sqlx::query_scalar::<_, String>("SELECT ip_address FROM blacklist ORDER BY id ASC")
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(ips)
    }

    async fn is_blacklisted(&self, ip_address: &str) -> Result<bool> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM blacklist WHERE ip_address = ?",
        )
        .bind(ip_address)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count > 0)
    }
}
