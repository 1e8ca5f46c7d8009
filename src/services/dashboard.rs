// Dashboard reads, served through the TTL cache
// Author: kelexine (https://github.com/kelexine)

use crate::cache::{TtlCache, BUDGET_STATUS, DASHBOARD_KEYS, DASHBOARD_STATS, RECENT_TRANSACTIONS};
use crate::client::ApiClient;
use crate::error::Result;
use crate::models::{BudgetStatus, DashboardOverview, DashboardStats, RecentTransaction};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct DashboardService {
    client: ApiClient,
    cache: Arc<TtlCache>,
    ttl: Duration,
    enabled: bool,
}

impl DashboardService {
    pub(crate) fn new(client: ApiClient, cache: Arc<TtlCache>, ttl: Duration, enabled: bool) -> Self {
        Self {
            client,
            cache,
            ttl,
            enabled,
        }
    }

    pub async fn stats(&self) -> Result<DashboardStats> {
        self.cached(DASHBOARD_STATS, || self.client.get("/dashboard/stats/"))
            .await
    }

    pub async fn recent_transactions(&self) -> Result<Vec<RecentTransaction>> {
        self.cached(RECENT_TRANSACTIONS, || {
            self.fetch_list("/dashboard/recent-transactions/")
        })
        .await
    }

    pub async fn budget_status(&self) -> Result<Vec<BudgetStatus>> {
        self.cached(BUDGET_STATUS, || self.fetch_list("/dashboard/budget-status/"))
            .await
    }

    /// Fetch all three dashboard reads concurrently.
    pub async fn overview(&self) -> Result<DashboardOverview> {
        let (stats, recent_transactions, budget_status) = futures::try_join!(
            self.stats(),
            self.recent_transactions(),
            self.budget_status()
        )?;

        Ok(DashboardOverview {
            stats,
            recent_transactions,
            budget_status,
        })
    }

    /// Forget cached dashboard data so the next read goes to the backend.
    pub fn refresh(&self) {
        self.cache.invalidate_many(DASHBOARD_KEYS);
    }

    async fn cached<T, F, Fut>(&self, key: &str, fetch: F) -> Result<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        if !self.enabled {
            return fetch().await;
        }
        self.cache.get_or_try_insert_with(key, self.ttl, fetch).await
    }

    async fn fetch_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let list: Option<Vec<T>> = self.client.get(path).await?;
        Ok(list.unwrap_or_default())
    }
}
