//! # Daily WhatsApp Report
//!
//! Sends the day's marketing metrics to the management group as a WhatsApp
//! template message.
//!
//! ## Key Responsibilities
//!
//! - **Payload building**: fills the `daily_booking_report` template, one
//!   body parameter per metric, in the order the template expects
//! - **Delivery**: posts through the [`MessageGateway`] and passes upstream
//!   rejections back with the provider's response attached
//!
//! The metrics themselves come either from the caller (the dashboard posts
//! what it shows) or from [`report_from_metrics`] for server-side sends.

use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use shared::{MarketingMetrics, ReportValue, WhatsAppReportRequest, WhatsAppReportResponse};

use crate::backend::domain::calendar::BusinessCalendar;
use crate::backend::domain::error::{DashboardError, DashboardResult};
use crate::backend::storage::MessageGateway;

pub const SEND_FAILED: &str = "Failed to send WhatsApp report";

/// Template coordinates registered with the WhatsApp provider
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTemplate {
    pub integrated_number: String,
    pub template_name: String,
    pub namespace: String,
    pub language: String,
    pub recipients: Vec<String>,
}

impl Default for ReportTemplate {
    fn default() -> Self {
        Self {
            integrated_number: "919516600328".to_string(),
            template_name: "daily_booking_report".to_string(),
            namespace: "c4480be9_4f75_4099_a294_ea1c07054ac4".to_string(),
            language: "en".to_string(),
            recipients: Vec::new(),
        }
    }
}

fn text_parameter(value: String) -> Value {
    json!({ "type": "text", "value": value })
}

/// Template body parameters `body_1` to `body_14`
fn body_values(date_label: &str, report: &WhatsAppReportRequest) -> Vec<String> {
    vec![
        date_label.to_string(),
        report.completed_bookings.to_string(),
        report.cancelled_bookings.to_string(),
        report.cleaning.to_string(),
        report.electrical.to_string(),
        report.security.to_string(),
        report.driver.to_string(),
        report.total_booking_amount.to_string(),
        report.net_profit.to_string(),
        format!("{}%", report.margin_percentage),
        report.customer_acquisition_cost.to_string(),
        report.avg_order_value.to_string(),
        report.total_complaints.to_string(),
        report.resolved_complaints.to_string(),
    ]
}

pub fn build_payload(template: &ReportTemplate, date_label: &str, report: &WhatsAppReportRequest) -> Value {
    let mut components = serde_json::Map::new();
    for (index, value) in body_values(date_label, report).into_iter().enumerate() {
        components.insert(format!("body_{}", index + 1), text_parameter(value));
    }

    json!({
        "integrated_number": template.integrated_number,
        "content_type": "template",
        "payload": {
            "messaging_product": "whatsapp",
            "type": "template",
            "template": {
                "name": template.template_name,
                "language": {
                    "code": template.language,
                    "policy": "deterministic",
                },
                "namespace": template.namespace,
                "to_and_components": [{
                    "to": template.recipients,
                    "components": components,
                }],
            },
        },
    })
}

/// Report fields for metrics computed on the server
pub fn report_from_metrics(metrics: &MarketingMetrics) -> WhatsAppReportRequest {
    let categories = &metrics.category_bookings;
    WhatsAppReportRequest {
        completed_bookings: ReportValue::from(metrics.completed_bookings),
        cancelled_bookings: ReportValue::from(metrics.cancelled_bookings),
        total_amount_paid: ReportValue::from(metrics.total_amount_paid),
        net_profit: ReportValue::from(metrics.net_profit),
        margin_percentage: ReportValue::from(metrics.margin_percentage),
        avg_order_value: ReportValue::from(metrics.avg_order_value),
        customer_acquisition_cost: ReportValue::from(metrics.customer_acquisition_cost),
        cleaning: ReportValue::from(categories.cleaning),
        electrical: ReportValue::from(categories.electrical),
        security: ReportValue::from(categories.security),
        driver: ReportValue::from(categories.driver),
        total_complaints: ReportValue::from(metrics.total_complaints),
        resolved_complaints: ReportValue::from(metrics.resolved_complaints),
        total_booking_amount: ReportValue::from(metrics.total_booking_amount),
    }
}

#[derive(Clone)]
pub struct ReportService {
    gateway: Arc<dyn MessageGateway>,
    template: ReportTemplate,
    calendar: BusinessCalendar,
}

impl ReportService {
    pub fn new(gateway: Arc<dyn MessageGateway>, template: ReportTemplate, calendar: BusinessCalendar) -> Self {
        Self {
            gateway,
            template,
            calendar,
        }
    }

    pub async fn send(&self, report: &WhatsAppReportRequest) -> DashboardResult<WhatsAppReportResponse> {
        if !self.gateway.is_configured() {
            error!("WhatsApp report requested but MSG91_AUTH_KEY is not set");
            return Err(DashboardError::NotConfigured("MSG91_AUTH_KEY".to_string()));
        }
        if self.template.recipients.is_empty() {
            error!("WhatsApp report requested but no recipients are configured");
            return Err(DashboardError::NotConfigured("WHATSAPP_RECIPIENTS".to_string()));
        }

        let report_id = Uuid::new_v4();
        let date_label = self.calendar.short_date_label(self.calendar.today());
        let payload = build_payload(&self.template, &date_label, report);
        info!(
            "Sending WhatsApp report {} for {} to {} recipients",
            report_id,
            date_label,
            self.template.recipients.len()
        );

        let response = self.gateway.send_template(&payload).await.map_err(|e| {
            error!("WhatsApp report {} could not be delivered: {:#}", report_id, e);
            DashboardError::storage(SEND_FAILED, e)
        })?;

        if !response.is_success() {
            error!("WhatsApp report {} rejected with status {}", report_id, response.status);
            return Err(DashboardError::Upstream {
                status: response.status,
                message: SEND_FAILED.to_string(),
                details: response.body,
            });
        }

        info!("WhatsApp report {} accepted", report_id);
        Ok(WhatsAppReportResponse {
            success: true,
            message: "WhatsApp report sent successfully".to_string(),
            data: response.body,
        })
    }
}
