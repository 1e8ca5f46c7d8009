// Transaction payloads and list filters
// Author: kelexine (https://github.com/kelexine)

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction of money flow. Categories carry the same classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(format!("unknown transaction type '{}' (expected income or expense)", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: u64,
    /// Category id; `None` once the category was deleted.
    #[serde(default)]
    pub category: Option<u64>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(deserialize_with = "super::amount")]
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(default)]
    pub description: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Amount with sign applied: positive for income, negative for expenses.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }
}

/// Body for creating a transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionForm {
    pub category: u64,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub description: String,
    pub date: NaiveDate,
}

/// Partial update; only present fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransactionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<TransactionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl TransactionUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Server-side list filter for `GET /transactions/`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub category: Option<u64>,
    pub kind: Option<TransactionType>,
    pub amount_min: Option<f64>,
    pub amount_max: Option<f64>,
    pub search: Option<String>,
    pub page: Option<u32>,
}

impl TransactionFilter {
    /// Query parameters for the set fields, in a stable order.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(d) = self.start_date {
            query.push(("start_date", d.to_string()));
        }
        if let Some(d) = self.end_date {
            query.push(("end_date", d.to_string()));
        }
        if let Some(c) = self.category {
            query.push(("category", c.to_string()));
        }
        if let Some(k) = self.kind {
            query.push(("type", k.to_string()));
        }
        if let Some(a) = self.amount_min {
            query.push(("amount_min", a.to_string()));
        }
        if let Some(a) = self.amount_max {
            query.push(("amount_max", a.to_string()));
        }
        if let Some(s) = self.search.as_deref().filter(|s| !s.is_empty()) {
            query.push(("search", s.to_string()));
        }
        if let Some(p) = self.page {
            query.push(("page", p.to_string()));
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_backend_transaction() {
        let tx: Transaction = serde_json::from_value(json!({
            "id": 9,
            "category": 2,
            "category_name": "Groceries",
            "amount": "45.20",
            "type": "expense",
            "description": "Weekly shop",
            "date": "2024-03-02",
            "created_at": "2024-03-02T10:15:00Z",
            "updated_at": "2024-03-02T10:15:00.123456+01:00"
        }))
        .unwrap();

        assert_eq!(tx.kind, TransactionType::Expense);
        assert_eq!(tx.amount, 45.2);
        assert_eq!(tx.signed_amount(), -45.2);
        assert_eq!(tx.date, NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
        assert!(tx.updated_at.is_some());
    }

    #[test]
    fn test_orphaned_category_is_none() {
        let tx: Transaction = serde_json::from_value(json!({
            "id": 1, "category": null, "amount": 10, "type": "income", "date": "2024-01-01"
        }))
        .unwrap();
        assert_eq!(tx.category, None);
        assert_eq!(tx.description, "");
    }

    #[test]
    fn test_filter_query() {
        let filter = TransactionFilter {
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            kind: Some(TransactionType::Income),
            search: Some(String::new()),
            page: Some(2),
            ..Default::default()
        };

        assert_eq!(
            filter.to_query(),
            vec![
                ("start_date", "2024-01-01".to_string()),
                ("type", "income".to_string()),
                ("page", "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_update_serializes_only_present_fields() {
        let update = TransactionUpdate {
            amount: Some(12.5),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({"amount": 12.5}));
        assert!(TransactionUpdate::default().is_empty());
    }

    #[test]
    fn test_type_from_str() {
        assert_eq!("Income".parse::<TransactionType>(), Ok(TransactionType::Income));
        assert!("transfer".parse::<TransactionType>().is_err());
    }
}
