use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tracing::debug;

use crate::backend::storage::traits::SheetSource;

/// Google Sheets published to the web as CSV
#[derive(Clone)]
pub struct PublishedSheets {
    http: reqwest::Client,
    expense_sheet_url: String,
    booking_sheet_url: String,
}

impl PublishedSheets {
    pub fn new(http: reqwest::Client, expense_sheet_url: &str, booking_sheet_url: &str) -> Self {
        Self {
            http,
            expense_sheet_url: expense_sheet_url.to_string(),
            booking_sheet_url: booking_sheet_url.to_string(),
        }
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        debug!("Fetching published sheet {}", url);
        let response = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("failed to fetch {}", url))?;
        if !response.status().is_success() {
            bail!("sheet request returned {}", response.status());
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl SheetSource for PublishedSheets {
    async fn fetch_expense_sheet(&self) -> Result<String> {
        self.fetch(&self.expense_sheet_url).await
    }

    async fn fetch_booking_sheet(&self) -> Result<String> {
        self.fetch(&self.booking_sheet_url).await
    }
}
