use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::backend::domain::models::AttendanceRecord;
use crate::backend::storage::traits::AttendanceSource;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawRecord {
    #[serde(default)]
    employee_id: Value,
    #[serde(default)]
    employee_name: Value,
    #[serde(default)]
    mobile_no: Value,
    #[serde(default)]
    assigned_ward: Value,
    #[serde(default)]
    attendance_date: Value,
    #[serde(default)]
    in_time: Value,
    #[serde(default)]
    out_time: Value,
    #[serde(default)]
    in_address: Value,
    #[serde(default)]
    out_address: Value,
}

#[derive(Debug, Deserialize)]
struct AttendanceEnvelope {
    #[serde(default)]
    status: String,
    #[serde(default)]
    data: Vec<RawRecord>,
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl From<RawRecord> for AttendanceRecord {
    fn from(raw: RawRecord) -> Self {
        let out_time = Some(text(&raw.out_time)).filter(|t| !t.trim().is_empty());
        AttendanceRecord {
            employee_id: raw
                .employee_id
                .as_i64()
                .or_else(|| raw.employee_id.as_str().and_then(|s| s.trim().parse().ok()))
                .unwrap_or(0),
            employee_name: text(&raw.employee_name),
            mobile_no: text(&raw.mobile_no),
            assigned_ward: text(&raw.assigned_ward),
            attendance_date: text(&raw.attendance_date),
            in_time: text(&raw.in_time),
            out_time,
            in_address: text(&raw.in_address),
            out_address: text(&raw.out_address),
        }
    }
}

/// Parse the feed's `{status, data}` envelope
fn parse_attendance(body: &str) -> Result<Vec<AttendanceRecord>> {
    let envelope: AttendanceEnvelope = serde_json::from_str(body).context("malformed attendance response")?;
    if envelope.status != "success" {
        bail!("attendance service reported status '{}'", envelope.status);
    }
    Ok(envelope.data.into_iter().map(AttendanceRecord::from).collect())
}

#[derive(Clone)]
pub struct AttendanceApiClient {
    http: reqwest::Client,
    url: String,
}

impl AttendanceApiClient {
    pub fn new(http: reqwest::Client, url: &str) -> Self {
        Self {
            http,
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl AttendanceSource for AttendanceApiClient {
    async fn fetch_attendance(&self, range: Option<(&str, &str)>) -> Result<Vec<AttendanceRecord>> {
        let mut request = self.http.get(&self.url);
        if let Some((start, end)) = range {
            request = request.query(&[("start", start), ("end", end)]);
        }
        let response = request.send().await.context("attendance request failed")?;
        if !response.status().is_success() {
            bail!("attendance service returned {}", response.status());
        }
        let body = response.text().await?;
        parse_attendance(&body)
    }
}
