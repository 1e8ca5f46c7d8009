// Wire models for the finance tracker API
// Author: kelexine (https://github.com/kelexine)

pub mod auth;
pub mod budget;
pub mod category;
pub mod dashboard;
pub mod notification;
pub mod report;
pub mod transaction;

pub use auth::{AccessToken, AuthResponse, LoginRequest, RefreshRequest, RegisterRequest, User};
pub use budget::{Budget, BudgetForm, BudgetPeriod, BudgetUpdate};
pub use category::{Category, CategoryForm, CategoryUpdate};
pub use dashboard::{BudgetStatus, DashboardOverview, DashboardStats, RecentTransaction};
pub use notification::{Notification, NotificationType};
pub use report::{CategoryBreakdown, DateRange, ExportFile, IncomeVsExpense, MonthlyTrend, ReportData};
pub use transaction::{Transaction, TransactionFilter, TransactionForm, TransactionType, TransactionUpdate};

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// A page of list results.
///
/// Deserializes from the paginated envelope `{count, next, previous, results}`,
/// from a bare JSON array (unpaginated endpoints), or from `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            count: 0,
            next: None,
            previous: None,
            results: Vec::new(),
        }
    }
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPage<T> {
    Bare(Vec<T>),
    Paginated {
        #[serde(default)]
        count: Option<u64>,
        #[serde(default)]
        next: Option<String>,
        #[serde(default)]
        previous: Option<String>,
        #[serde(default = "Vec::new", deserialize_with = "null_as_empty")]
        results: Vec<T>,
    },
    Null,
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Page<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawPage::deserialize(deserializer)? {
            RawPage::Paginated {
                count,
                next,
                previous,
                results,
            } => Page {
                count: count.unwrap_or(results.len() as u64),
                next,
                previous,
                results,
            },
            RawPage::Bare(results) => Page {
                count: results.len() as u64,
                next: None,
                previous: None,
                results,
            },
            RawPage::Null => Page::default(),
        })
    }
}

/// Treat a JSON `null` list as empty.
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Monetary amounts arrive either as JSON numbers or as decimal strings (`"150.00"`).
pub(crate) fn amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid amount '{}'", s))),
    }
}
