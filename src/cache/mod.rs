// Response cache module
// Author: kelexine (https://github.com/kelexine)

pub mod manager;
pub mod models;

pub use manager::TtlCache;
pub use models::{
    CacheStats, Clock, ManualClock, SystemClock, BUDGET_STATUS, DASHBOARD_KEYS, DASHBOARD_STATS,
    RECENT_TRANSACTIONS,
};
