// Transaction CRUD
// Author: kelexine (https://github.com/kelexine)

use super::DashboardInvalidator;
use crate::client::ApiClient;
use crate::error::Result;
use crate::models::{Page, Transaction, TransactionFilter, TransactionForm, TransactionUpdate};

#[derive(Clone)]
pub struct TransactionService {
    client: ApiClient,
    invalidator: DashboardInvalidator,
}

impl TransactionService {
    pub(crate) fn new(client: ApiClient, invalidator: DashboardInvalidator) -> Self {
        Self { client, invalidator }
    }

    pub async fn list(&self, filter: &TransactionFilter) -> Result<Page<Transaction>> {
        self.client
            .get_with_query("/transactions/", &filter.to_query())
            .await
    }

    pub async fn get(&self, id: u64) -> Result<Transaction> {
        self.client.get(&format!("/transactions/{}/", id)).await
    }

    pub async fn create(&self, form: &TransactionForm) -> Result<Transaction> {
        let created = self.client.post("/transactions/", form).await?;
        self.invalidator.after_write("transactions");
        Ok(created)
    }

    pub async fn update(&self, id: u64, update: &TransactionUpdate) -> Result<Transaction> {
        let updated = self
            .client
            .patch(&format!("/transactions/{}/", id), update)
            .await?;
        self.invalidator.after_write("transactions");
        Ok(updated)
    }

    pub async fn delete(&self, id: u64) -> Result<()> {
        self.client.delete(&format!("/transactions/{}/", id)).await?;
        self.invalidator.after_write("transactions");
        Ok(())
    }
}
