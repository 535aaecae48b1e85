//! Aggregate reporting over stored visits
//!
//! Figures are recomputed from the store on every call.

use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::storage::VisitStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total: i64,
    pub unique_visitors: i64,
}

pub struct ReportEngine<S: ?Sized> {
    store: Arc<S>,
}

impl<S: VisitStore + ?Sized> ReportEngine<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn stats(&self) -> Result<Stats> {
        let total = self.store.count_visits().await?;
        let unique_visitors = self.store.count_distinct_ips().await?;

        Ok(Stats {
            total,
            unique_visitors,
        })
    }

    /// Visit count per distinct address
    pub async fn report(&self) -> Result<BTreeMap<String, i64>> {
        self.store.group_counts_by_ip().await
    }
}

impl<S: ?Sized> Clone for ReportEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}
