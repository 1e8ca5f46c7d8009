//! Cache keys, clocks and statistics.

// Author: kelexine (https://github.com/kelexine)

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Cache key for the dashboard totals.
pub const DASHBOARD_STATS: &str = "dashboard-stats";
/// Cache key for the dashboard's recent transactions list.
pub const RECENT_TRANSACTIONS: &str = "recent-transactions";
/// Cache key for per-budget spending status.
pub const BUDGET_STATUS: &str = "budget-status";

/// Every key whose value is derived from transactions or budgets.
pub const DASHBOARD_KEYS: &[&str] = &[DASHBOARD_STATS, RECENT_TRANSACTIONS, BUDGET_STATUS];

/// Source of "now" for expiry decisions, in Unix milliseconds.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Manually advanced clock for deterministic expiry tests.
///
/// Clones share the same underlying time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(start_millis: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(start_millis)),
        }
    }

    pub fn advance(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }

    pub fn set(&self, millis: i64) {
        self.now.store(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Statistics for cache operations.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from a live entry.
    pub hits: u64,
    /// Lookups that found nothing usable.
    pub misses: u64,
    /// Entries dropped because their TTL had elapsed.
    pub expirations: u64,
    /// Entries written.
    pub stores: u64,
    /// Entries removed by explicit invalidation.
    pub invalidations: u64,
}
