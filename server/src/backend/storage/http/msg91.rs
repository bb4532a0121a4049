use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use crate::backend::storage::traits::{GatewayResponse, MessageGateway};

pub const MSG91_BULK_URL: &str = "https://api.msg91.com/api/v5/whatsapp/whatsapp-outbound-message/bulk/";

/// MSG91 WhatsApp outbound API
#[derive(Clone)]
pub struct Msg91Client {
    http: reqwest::Client,
    url: String,
    auth_key: Option<String>,
}

impl Msg91Client {
    pub fn new(http: reqwest::Client, url: &str, auth_key: Option<String>) -> Self {
        Self {
            http,
            url: url.to_string(),
            auth_key: auth_key.filter(|key| !key.trim().is_empty()),
        }
    }
}

#[async_trait]
impl MessageGateway for Msg91Client {
    fn is_configured(&self) -> bool {
        self.auth_key.is_some()
    }

    async fn send_template(&self, payload: &Value) -> Result<GatewayResponse> {
        let auth_key = self
            .auth_key
            .as_deref()
            .context("MSG91 auth key missing")?;

        let response = self
            .http
            .post(&self.url)
            .header("authkey", auth_key)
            .json(payload)
            .send()
            .await
            .context("WhatsApp request failed")?;

        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
        info!("MSG91 responded with {}", status);
        Ok(GatewayResponse { status, body })
    }
}
