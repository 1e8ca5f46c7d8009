// Dashboard aggregates
// Author: kelexine (https://github.com/kelexine)

use super::TransactionType;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_income: f64,
    pub total_expenses: f64,
    pub net_balance: f64,
    /// Percentage of the summed budget amounts already spent.
    pub budget_utilization: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentTransaction {
    pub id: u64,
    #[serde(deserialize_with = "super::amount")]
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetStatus {
    pub id: u64,
    pub category: String,
    pub budget_amount: f64,
    pub spent_amount: f64,
    pub percentage: f64,
}

impl BudgetStatus {
    pub fn is_exceeded(&self) -> bool {
        self.spent_amount > self.budget_amount
    }

    pub fn remaining(&self) -> f64 {
        self.budget_amount - self.spent_amount
    }
}

/// Everything the dashboard screen shows, fetched together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardOverview {
    pub stats: DashboardStats,
    pub recent_transactions: Vec<RecentTransaction>,
    pub budget_status: Vec<BudgetStatus>,
}
