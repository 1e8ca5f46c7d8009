// Budget CRUD
// Author: kelexine (https://github.com/kelexine)

use super::DashboardInvalidator;
use crate::client::ApiClient;
use crate::error::Result;
use crate::models::{Budget, BudgetForm, BudgetUpdate, Page};

#[derive(Clone)]
pub struct BudgetService {
    client: ApiClient,
    invalidator: DashboardInvalidator,
}

impl BudgetService {
    pub(crate) fn new(client: ApiClient, invalidator: DashboardInvalidator) -> Self {
        Self { client, invalidator }
    }

    pub async fn list(&self) -> Result<Vec<Budget>> {
        let page: Page<Budget> = self.client.get("/budgets/").await?;
        Ok(page.results)
    }

    pub async fn get(&self, id: u64) -> Result<Budget> {
        self.client.get(&format!("/budgets/{}/", id)).await
    }

    pub async fn create(&self, form: &BudgetForm) -> Result<Budget> {
        let created = self.client.post("/budgets/", form).await?;
        self.invalidator.after_write("budgets");
        Ok(created)
    }

    pub async fn update(&self, id: u64, update: &BudgetUpdate) -> Result<Budget> {
        let updated = self
            .client
            .patch(&format!("/budgets/{}/", id), update)
            .await?;
        self.invalidator.after_write("budgets");
        Ok(updated)
    }

    pub async fn delete(&self, id: u64) -> Result<()> {
        self.client.delete(&format!("/budgets/{}/", id)).await?;
        self.invalidator.after_write("budgets");
        Ok(())
    }
}
