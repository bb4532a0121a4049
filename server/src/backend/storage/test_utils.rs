//! Fake gateways and fixtures shared by service and REST tests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::{Arc, Mutex};

use crate::backend::domain::models::{AttendanceRecord, Settlement};
use crate::backend::storage::traits::{
    AttendanceSource, GatewayResponse, MessageGateway, SettlementSource, SheetSource,
};

/// Sheets served from strings; `None` simulates an unreachable sheet
#[derive(Clone, Default)]
pub struct FakeSheets {
    pub expense_csv: Option<String>,
    pub booking_csv: Option<String>,
}

impl FakeSheets {
    pub fn new(expense_csv: &str, booking_csv: &str) -> Self {
        Self {
            expense_csv: Some(expense_csv.to_string()),
            booking_csv: Some(booking_csv.to_string()),
        }
    }
}

#[async_trait]
impl SheetSource for FakeSheets {
    async fn fetch_expense_sheet(&self) -> Result<String> {
        self.expense_csv.clone().ok_or_else(|| anyhow!("expense sheet unavailable"))
    }

    async fn fetch_booking_sheet(&self) -> Result<String> {
        self.booking_csv.clone().ok_or_else(|| anyhow!("booking sheet unavailable"))
    }
}

#[derive(Clone, Default)]
pub struct FakeSettlements {
    pub settlements: Vec<Settlement>,
}

#[async_trait]
impl SettlementSource for FakeSettlements {
    async fn list_settlements(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<Settlement>> {
        Ok(self
            .settlements
            .iter()
            .filter(|s| s.created_at >= from && s.created_at <= to)
            .cloned()
            .collect())
    }
}

#[derive(Clone, Default)]
pub struct FakeAttendance {
    pub records: Vec<AttendanceRecord>,
}

#[async_trait]
impl AttendanceSource for FakeAttendance {
    async fn fetch_attendance(&self, range: Option<(&str, &str)>) -> Result<Vec<AttendanceRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|r| match range {
                Some((start, end)) => r.attendance_date.as_str() >= start && r.attendance_date.as_str() <= end,
                None => true,
            })
            .cloned()
            .collect())
    }
}

/// Message gateway that records payloads and answers with a canned response
#[derive(Clone)]
pub struct RecordingGateway {
    pub configured: bool,
    pub response: GatewayResponse,
    pub sent: Arc<Mutex<Vec<Value>>>,
}

impl RecordingGateway {
    pub fn accepting() -> Self {
        Self {
            configured: true,
            response: GatewayResponse {
                status: 200,
                body: serde_json::json!({ "status": "success", "request_id": "req-1" }),
            },
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::accepting()
        }
    }

    pub fn rejecting(status: u16, body: Value) -> Self {
        Self {
            response: GatewayResponse { status, body },
            ..Self::accepting()
        }
    }

    pub fn sent_payloads(&self) -> Vec<Value> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl MessageGateway for RecordingGateway {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn send_template(&self, payload: &Value) -> Result<GatewayResponse> {
        self.sent
            .lock()
            .map_err(|_| anyhow!("recording lock poisoned"))?
            .push(payload.clone());
        Ok(self.response.clone())
    }
}
