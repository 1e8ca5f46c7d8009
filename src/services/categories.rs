// Category CRUD
// Author: kelexine (https://github.com/kelexine)

use super::DashboardInvalidator;
use crate::client::ApiClient;
use crate::error::Result;
use crate::models::{Category, CategoryForm, CategoryUpdate, Page};

#[derive(Clone)]
pub struct CategoryService {
    client: ApiClient,
    invalidator: DashboardInvalidator,
}

impl CategoryService {
    pub(crate) fn new(client: ApiClient, invalidator: DashboardInvalidator) -> Self {
        Self { client, invalidator }
    }

    pub async fn list(&self) -> Result<Vec<Category>> {
        let page: Page<Category> = self.client.get("/categories/").await?;
        Ok(page.results)
    }

    pub async fn get(&self, id: u64) -> Result<Category> {
        self.client.get(&format!("/categories/{}/", id)).await
    }

    pub async fn create(&self, form: &CategoryForm) -> Result<Category> {
        let created = self.client.post("/categories/", form).await?;
        // Dashboard rows embed category names.
        self.invalidator.after_write("categories");
        Ok(created)
    }

    pub async fn update(&self, id: u64, update: &CategoryUpdate) -> Result<Category> {
        let updated = self
            .client
            .patch(&format!("/categories/{}/", id), update)
            .await?;
        self.invalidator.after_write("categories");
        Ok(updated)
    }

    pub async fn delete(&self, id: u64) -> Result<()> {
        self.client.delete(&format!("/categories/{}/", id)).await?;
        self.invalidator.after_write("categories");
        Ok(())
    }
}
