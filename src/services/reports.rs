// Reports and CSV export
// Author: kelexine (https://github.com/kelexine)

use crate::client::ApiClient;
use crate::error::Result;
use crate::models::{DateRange, ExportFile, ReportData};
use tracing::debug;

#[derive(Clone)]
pub struct ReportService {
    client: ApiClient,
}

impl ReportService {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn report(&self, range: &DateRange) -> Result<ReportData> {
        self.client
            .get_with_query("/reports/", &range.to_query())
            .await
    }

    /// Download the transactions in `range` as CSV.
    pub async fn export(&self, range: &DateRange) -> Result<ExportFile> {
        let bytes = self
            .client
            .get_bytes("/reports/export/", &range.to_query())
            .await?;

        let filename = range.export_filename();
        debug!("Exported {} bytes as {}", bytes.len(), filename);
        Ok(ExportFile { filename, bytes })
    }
}
