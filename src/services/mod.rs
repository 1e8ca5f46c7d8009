//! Typed per-resource services and the context that owns them.
//!
//! Services translate domain operations into calls on the shared [`ApiClient`].
//! They hold no business rules of their own beyond coercing missing lists to
//! empty ones and, for the dashboard reads, consulting the [`TtlCache`].
//!
//! Author: kelexine (<https://github.com/kelexine>)

mod auth;
mod budgets;
mod categories;
mod dashboard;
mod notifications;
mod reports;
mod transactions;

pub use auth::AuthService;
pub use budgets::BudgetService;
pub use categories::CategoryService;
pub use dashboard::DashboardService;
pub use notifications::NotificationService;
pub use reports::ReportService;
pub use transactions::TransactionService;

use crate::cache::{TtlCache, DASHBOARD_KEYS};
use crate::client::ApiClient;
use crate::config::AppConfig;
use crate::error::Result;
use crate::storage::TokenStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Application-wide service context, built once at startup.
///
/// Everything inside shares one HTTP client, one token store, one session and
/// one response cache.
#[derive(Clone)]
pub struct Services {
    pub client: ApiClient,
    pub cache: Arc<TtlCache>,
    pub auth: AuthService,
    pub transactions: TransactionService,
    pub categories: CategoryService,
    pub budgets: BudgetService,
    pub dashboard: DashboardService,
    pub reports: ReportService,
    pub notifications: NotificationService,
}

impl Services {
    pub fn new(config: &AppConfig, tokens: Arc<dyn TokenStore>) -> Result<Self> {
        Self::with_cache(config, tokens, Arc::new(TtlCache::new()))
    }

    /// Build the context around an existing cache (tests inject one with a manual clock).
    pub fn with_cache(
        config: &AppConfig,
        tokens: Arc<dyn TokenStore>,
        cache: Arc<TtlCache>,
    ) -> Result<Self> {
        let client = ApiClient::new(&config.api, tokens)?;

        let invalidator = DashboardInvalidator {
            cache: config.cache.invalidate_on_write.then(|| cache.clone()),
        };
        let ttl = Duration::from_millis(config.cache.dashboard_ttl_ms);

        Ok(Self {
            auth: AuthService::new(client.clone(), cache.clone()),
            transactions: TransactionService::new(client.clone(), invalidator.clone()),
            categories: CategoryService::new(client.clone(), invalidator.clone()),
            budgets: BudgetService::new(client.clone(), invalidator),
            dashboard: DashboardService::new(
                client.clone(),
                cache.clone(),
                ttl,
                config.cache.enabled,
            ),
            reports: ReportService::new(client.clone()),
            notifications: NotificationService::new(client.clone()),
            client,
            cache,
        })
    }
}

/// Drops cached dashboard aggregates after a successful write, when enabled.
#[derive(Clone)]
pub(crate) struct DashboardInvalidator {
    cache: Option<Arc<TtlCache>>,
}

impl DashboardInvalidator {
    pub(crate) fn after_write(&self, what: &str) {
        if let Some(cache) = &self.cache {
            let dropped = cache.invalidate_many(DASHBOARD_KEYS);
            debug!("{} changed; dropped {} dashboard cache entries", what, dropped);
        }
    }
}
