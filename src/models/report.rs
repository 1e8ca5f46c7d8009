// Report payloads and CSV export
// Author: kelexine (https://github.com/kelexine)

use super::TransactionType;
use bytes::Bytes;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Inclusive date window for reports and exports. Open ends are left to the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(start) = self.start {
            query.push(("start_date", start.to_string()));
        }
        if let Some(end) = self.end {
            query.push(("end_date", end.to_string()));
        }
        query
    }

    /// `transactions_<start>_to_<end>.csv`, with `all` standing in for an open end.
    pub fn export_filename(&self) -> String {
        let bound = |d: Option<NaiveDate>| d.map(|d| d.to_string()).unwrap_or_else(|| "all".to_string());
        format!("transactions_{}_to_{}.csv", bound(self.start), bound(self.end))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    pub total_income: f64,
    pub total_expenses: f64,
    pub net_balance: f64,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub category_breakdown: Vec<CategoryBreakdown>,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub monthly_trends: Vec<MonthlyTrend>,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub income_vs_expenses: Vec<IncomeVsExpense>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub category: String,
    pub amount: f64,
    pub percentage: f64,
    #[serde(rename = "type")]
    pub kind: TransactionType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTrend {
    /// Display label such as `Mar 2024`.
    pub month: String,
    pub income: f64,
    pub expenses: f64,
    pub net: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeVsExpense {
    pub month: String,
    pub income: f64,
    pub expenses: f64,
}

/// A downloaded CSV export and the name it should be saved under.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub filename: String,
    pub bytes: Bytes,
}

impl ExportFile {
    /// Write the export into `dir`, returning the full path.
    pub fn save_in(&self, dir: &Path) -> std::io::Result<PathBuf> {
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}
