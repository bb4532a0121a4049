//! Start-up configuration read from environment variables.
//!
//! Every setting has a default matching the production deployment except the
//! Firestore project, which must be given unless the in-memory backend is
//! selected.

use anyhow::{bail, Context, Result};
use std::net::SocketAddr;

use crate::backend::domain::calendar::DEFAULT_UTC_OFFSET_MINUTES;
use crate::backend::domain::models::ProviderAllowlist;
use crate::backend::domain::profit::ProfitRates;
use crate::backend::domain::report_service::ReportTemplate;
use crate::backend::storage::firestore::{FirestoreAuth, DEFAULT_BASE_URL};
use crate::backend::storage::http::msg91::MSG91_BULK_URL;
use crate::backend::storage::http::razorpay::RAZORPAY_API_URL;
use crate::backend::storage::http::RazorpayCredentials;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3001";
pub const DEFAULT_EXPENSE_SHEET_URL: &str = "https://docs.google.com/spreadsheets/d/e/2PACX-1vSzu4Xj2cluOSQ7-eT9VNvEkZu_3ghcImdSWYTWq2181-0M7OV16a2GN70WcC7DnagsrkZFfDeJioJo/pub?output=csv";
pub const DEFAULT_BOOKING_SHEET_URL: &str = "https://docs.google.com/spreadsheets/d/e/2PACX-1vS1fccKd4_mVt26js0Y5VfBrpcnogvWA_toC6Y4NL8DhP4WEOtlS03pfwBG3Xj1H5oSnBgMZwrS_J5p/pub?output=csv&gid=1162982163";
pub const DEFAULT_ATTENDANCE_API_URL: &str = "http://103.39.132.76:5000/api/insstanto-attendance";

/// Partners whose bookings make up the dashboard figures
pub const DEFAULT_PROVIDER_IDS: [&str; 10] = [
    "mwBcGMWLwDULHIS9hXx7JLuRfCi1",
    "Dmoo33tCx0OU1HMtapISBc9Oeeq2",
    "VxxapfO7l8YM5f6xmFqpThc17eD3",
    "Q0kKYbdOKVbeZsdiLGsJoM5BWQl1",
    "7KlujhUyJbeCTPG6Pty8exlxXuM2",
    "fGLJCCFDEneQZ7ciz71Q29WBgGQ2",
    "MstGdrDCHkZ1KKf0xtZctauIovf2",
    "OgioZJvg0DWWRnqZLj2AUMUljZN2",
    "B1FsSfpqRIPS6Sg0fn3QetCOyAw2",
    "uSZdJdat03froahSdGmPpFWDGhi2",
];

#[derive(Debug, Clone, PartialEq)]
pub enum DataBackend {
    Firestore {
        project_id: String,
        base_url: String,
    },
    /// Empty in-memory store, for local runs without credentials
    Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub cors_origin: String,
    pub data_backend: DataBackend,
    pub firestore_auth: FirestoreAuth,
    pub expense_sheet_url: String,
    pub booking_sheet_url: String,
    pub razorpay_url: String,
    pub razorpay: Option<RazorpayCredentials>,
    pub attendance_api_url: String,
    pub msg91_url: String,
    pub msg91_auth_key: Option<String>,
    pub report_template: ReportTemplate,
    pub provider_ids: ProviderAllowlist,
    pub profit_rates: ProfitRates,
    pub utc_offset_minutes: i32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup; blank values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let bind_addr = or("BIND_ADDR", DEFAULT_BIND_ADDR)
            .parse()
            .context("BIND_ADDR is not a socket address")?;

        let data_backend = match or("DATA_BACKEND", "firestore").to_lowercase().as_str() {
            "memory" => DataBackend::Memory,
            "firestore" => DataBackend::Firestore {
                project_id: get("FIRESTORE_PROJECT_ID")
                    .context("FIRESTORE_PROJECT_ID is required for the firestore backend")?,
                base_url: or("FIRESTORE_BASE_URL", DEFAULT_BASE_URL),
            },
            other => bail!("unknown DATA_BACKEND {:?}, expected firestore or memory", other),
        };

        let firestore_auth = match (get("FIRESTORE_BEARER_TOKEN"), get("FIRESTORE_API_KEY")) {
            (Some(token), _) => FirestoreAuth::Bearer(token),
            (None, Some(key)) => FirestoreAuth::ApiKey(key),
            (None, None) => FirestoreAuth::None,
        };

        let razorpay = match (get("RAZORPAY_KEY_ID"), get("RAZORPAY_KEY_SECRET")) {
            (Some(key_id), Some(key_secret)) => Some(RazorpayCredentials { key_id, key_secret }),
            _ => None,
        };

        let defaults = ReportTemplate::default();
        let report_template = ReportTemplate {
            integrated_number: or("MSG91_INTEGRATED_NUMBER", &defaults.integrated_number),
            template_name: or("WHATSAPP_TEMPLATE", &defaults.template_name),
            namespace: or("WHATSAPP_NAMESPACE", &defaults.namespace),
            language: defaults.language,
            recipients: list(get("WHATSAPP_RECIPIENTS")),
        };

        let provider_ids = match get("PROVIDER_IDS") {
            Some(raw) => list(Some(raw)),
            None => DEFAULT_PROVIDER_IDS.iter().map(|id| id.to_string()).collect(),
        };

        let rates = ProfitRates::default();
        let profit_rates = ProfitRates {
            partner_gst: rate(&get, "PROFIT_PARTNER_GST", rates.partner_gst)?,
            payout_fee: rate(&get, "PROFIT_PAYOUT_FEE", rates.payout_fee)?,
            gateway_fee: rate(&get, "PROFIT_GATEWAY_FEE", rates.gateway_fee)?,
            commission: rate(&get, "PROFIT_COMMISSION", rates.commission)?,
        };

        let utc_offset_minutes = match get("BUSINESS_UTC_OFFSET_MINUTES") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("BUSINESS_UTC_OFFSET_MINUTES {:?} is not a number", raw))?,
            None => DEFAULT_UTC_OFFSET_MINUTES,
        };

        Ok(Self {
            bind_addr,
            cors_origin: or("CORS_ORIGIN", DEFAULT_CORS_ORIGIN),
            data_backend,
            firestore_auth,
            expense_sheet_url: or("EXPENSE_SHEET_URL", DEFAULT_EXPENSE_SHEET_URL),
            booking_sheet_url: or("BOOKING_SHEET_URL", DEFAULT_BOOKING_SHEET_URL),
            razorpay_url: or("RAZORPAY_API_URL", RAZORPAY_API_URL),
            razorpay,
            attendance_api_url: or("ATTENDANCE_API_URL", DEFAULT_ATTENDANCE_API_URL),
            msg91_url: or("MSG91_API_URL", MSG91_BULK_URL),
            msg91_auth_key: get("MSG91_AUTH_KEY"),
            report_template,
            provider_ids: ProviderAllowlist::new(provider_ids),
            profit_rates,
            utc_offset_minutes,
        })
    }
}

/// Comma-separated list, blanks dropped
fn list(raw: Option<String>) -> Vec<String> {
    raw.map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

fn rate(get: &impl Fn(&str) -> Option<String>, key: &str, default: f64) -> Result<f64> {
    match get(key) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{} {:?} is not a fraction", key, raw)),
        None => Ok(default),
    }
}
