//! Razorpay settlements API client.

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::backend::domain::models::Settlement;
use crate::backend::storage::traits::SettlementSource;

pub const RAZORPAY_API_URL: &str = "https://api.razorpay.com/v1";
const PAGE_SIZE: usize = 100;

#[derive(Debug, Clone)]
pub struct RazorpayCredentials {
    pub key_id: String,
    pub key_secret: String,
}

impl RazorpayCredentials {
    fn basic_auth(&self) -> String {
        format!("Basic {}", STANDARD.encode(format!("{}:{}", self.key_id, self.key_secret)))
    }
}

#[derive(Debug, Deserialize)]
struct SettlementItem {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    amount: Option<i64>,
    #[serde(default)]
    created_at: Option<i64>,
}

impl SettlementItem {
    /// Items without a usable `created_at` cannot be bucketed and are skipped
    fn into_settlement(self) -> Option<Settlement> {
        Some(Settlement {
            created_at: Utc.timestamp_opt(self.created_at?, 0).single()?,
            id: self.id.unwrap_or_default(),
            amount_paise: self.amount.unwrap_or(0),
        })
    }
}

#[derive(Debug, Deserialize)]
struct SettlementPage {
    #[serde(default)]
    items: Vec<SettlementItem>,
}

#[derive(Clone)]
pub struct RazorpayClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Option<RazorpayCredentials>,
}

impl RazorpayClient {
    pub fn new(http: reqwest::Client, base_url: &str, credentials: Option<RazorpayCredentials>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        }
    }
}

#[async_trait]
impl SettlementSource for RazorpayClient {
    async fn list_settlements(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<Settlement>> {
        let credentials = match &self.credentials {
            Some(credentials) => credentials,
            None => {
                warn!("Razorpay credentials not configured, reporting no settlements");
                return Ok(Vec::new());
            }
        };

        let url = format!("{}/settlements", self.base_url);
        let mut settlements = Vec::new();
        let mut skip = 0usize;
        loop {
            let response = self
                .http
                .get(&url)
                .header("Authorization", credentials.basic_auth())
                .query(&[
                    ("count", PAGE_SIZE.to_string()),
                    ("skip", skip.to_string()),
                    ("from", from.timestamp().to_string()),
                    ("to", to.timestamp().to_string()),
                ])
                .send()
                .await
                .context("settlement request failed")?;

            // A rejected page ends the listing with whatever was collected
            if !response.status().is_success() {
                warn!("Razorpay settlements returned {}, stopping at {} items", response.status(), settlements.len());
                break;
            }

            let page: SettlementPage = response.json().await?;
            let count = page.items.len();
            debug!("Fetched {} settlements at offset {}", count, skip);
            settlements.extend(page.items.into_iter().filter_map(SettlementItem::into_settlement));

            if count < PAGE_SIZE {
                break;
            }
            skip += PAGE_SIZE;
        }
        Ok(settlements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_auth_header() {
        let credentials = RazorpayCredentials {
            key_id: "rzp_test".to_string(),
            key_secret: "secret".to_string(),
        };
        assert_eq!(credentials.basic_auth(), "Basic cnpwX3Rlc3Q6c2VjcmV0");
    }

    #[test]
    fn test_settlement_page_tolerates_missing_items() {
        let page: SettlementPage = serde_json::from_str(r#"{"entity":"collection","count":0}"#).unwrap();
        assert!(page.items.is_empty());

        let page: SettlementPage =
            serde_json::from_str(r#"{"items":[{"id":"setl_1","amount":125050,"created_at":1735689600}]}"#).unwrap();
        assert_eq!(page.items[0].amount, Some(125050));
    }

    #[test]
    fn test_items_without_timestamp_are_skipped() {
        let page: SettlementPage = serde_json::from_str(
            r#"{"items":[
                {"id":"setl_1","amount":125050,"created_at":1735689600},
                {"id":"setl_2","amount":9900,"created_at":null},
                {"id":"setl_3","amount":500}
            ]}"#,
        )
        .unwrap();
        assert_eq!(page.items.len(), 3);

        let settlements: Vec<Settlement> = page.items.into_iter().filter_map(SettlementItem::into_settlement).collect();
        assert_eq!(settlements.len(), 1);
        assert_eq!(settlements[0].id, "setl_1");
        assert_eq!(settlements[0].amount_paise, 125050);
    }

    #[tokio::test]
    async fn test_missing_credentials_yield_no_settlements() {
        let client = RazorpayClient::new(reqwest::Client::new(), RAZORPAY_API_URL, None);
        let settlements = client.list_settlements(Utc::now(), Utc::now()).await.unwrap();
        assert!(settlements.is_empty());
    }
}
