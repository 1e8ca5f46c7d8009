// Notifications
// Author: kelexine (https://github.com/kelexine)

use crate::client::ApiClient;
use crate::error::Result;
use crate::models::{Notification, Page};

#[derive(Clone)]
pub struct NotificationService {
    client: ApiClient,
}

impl NotificationService {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Page<Notification>> {
        self.client.get("/notifications/").await
    }

    pub async fn mark_read(&self, id: u64) -> Result<()> {
        self.client
            .patch_empty(&format!("/notifications/{}/mark_read/", id))
            .await
    }

    pub async fn mark_all_read(&self) -> Result<()> {
        self.client.patch_empty("/notifications/mark_all_read/").await
    }

    /// Unread notifications on the first page.
    pub async fn unread_count(&self) -> Result<usize> {
        let page = self.list().await?;
        Ok(page.results.iter().filter(|n| !n.is_read).count())
    }
}
