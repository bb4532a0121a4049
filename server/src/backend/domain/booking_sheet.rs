//! The published booking ledger kept by the operations team.
//!
//! Columns are looked up by header name. The price column is found by a fuzzy
//! header match ("service" and "pric") and the lead source by a header that
//! trims to "source".

use anyhow::Result;
use chrono::NaiveDate;

use shared::{SheetBooking, SheetDebugInfo};

use crate::backend::domain::calendar::DateRange;
use crate::backend::domain::expense_ledger::{parse_price, read_csv};

const DATE_COLUMN: &str = "Date";
const CUSTOMER_COLUMN: &str = "Customer Name";
const SERVICE_COLUMN: &str = "Service";
const CONTACT_COLUMN: &str = "Contact Info";
const ADDRESS_COLUMN: &str = "Address";
/// Header as spelled in the sheet
const PARTNER_COLUMN: &str = "Patner Name";
const PARTNER_COLUMN_ALT: &str = "Partner Name";
const ARRIVE_COLUMN: &str = "Arrive Time";
const STATUS_COLUMN: &str = "Status";
const FEEDBACK_COLUMN: &str = "Feedback";

/// Parse a ledger date cell.
///
/// `a/b/yyyy` is read day-first when `a > 12` and month-first otherwise,
/// ignoring any time after it. ISO dates and a few spelled-out forms are
/// accepted as well.
pub fn parse_sheet_date(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    let date_part = value.split_whitespace().next()?;

    let parts: Vec<&str> = date_part.split('/').collect();
    if parts.len() == 3
        && parts[0].len() <= 2
        && parts[1].len() <= 2
        && parts[2].len() == 4
        && parts.iter().all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
    {
        let a: u32 = parts[0].parse().ok()?;
        let b: u32 = parts[1].parse().ok()?;
        let year: i32 = parts[2].parse().ok()?;
        return if a > 12 {
            NaiveDate::from_ymd_opt(year, b, a)
        } else {
            NaiveDate::from_ymd_opt(year, a, b)
        };
    }

    const FORMATS: [&str; 9] = [
        "%Y-%m-%d",
        "%Y/%m/%d",
        "%d-%m-%Y",
        "%d-%b-%Y",
        "%d %b %Y",
        "%d %B %Y",
        "%b %d %Y",
        "%b %d, %Y",
        "%B %d, %Y",
    ];
    [value, date_part]
        .iter()
        .find_map(|candidate| {
            FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(candidate, format).ok())
        })
        .or_else(|| {
            // ISO timestamps such as 2025-04-01T10:00:00
            value
                .get(..10)
                .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        })
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookingSheet {
    fields: Vec<String>,
    service_price_index: Option<usize>,
    source_index: Option<usize>,
    rows: Vec<Vec<String>>,
}

impl BookingSheet {
    pub fn parse(text: &str) -> Result<Self> {
        let (fields, rows) = read_csv(text)?;
        let service_price_index = fields.iter().position(|field| {
            let lower = field.to_lowercase();
            lower.contains("service") && lower.contains("pric")
        });
        let source_index = fields
            .iter()
            .position(|field| field.trim().to_lowercase() == "source");
        Ok(Self {
            fields,
            service_price_index,
            source_index,
            rows,
        })
    }

    pub fn debug_info(&self) -> SheetDebugInfo {
        SheetDebugInfo {
            fields: self.fields.clone(),
            service_price_index: self.service_price_index.map(|i| i as i64).unwrap_or(-1),
        }
    }

    fn column(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field == name)
    }

    fn cell(row: &[String], index: Option<usize>) -> String {
        index
            .and_then(|i| row.get(i))
            .cloned()
            .unwrap_or_default()
    }

    /// Rows dated within `range`, in sheet order. Rows with unreadable dates are dropped.
    pub fn bookings_between(&self, range: &DateRange) -> Vec<SheetBooking> {
        let date_col = self.column(DATE_COLUMN);
        let customer_col = self.column(CUSTOMER_COLUMN);
        let service_col = self.column(SERVICE_COLUMN);
        let contact_col = self.column(CONTACT_COLUMN);
        let address_col = self.column(ADDRESS_COLUMN);
        let partner_col = self
            .column(PARTNER_COLUMN)
            .or_else(|| self.column(PARTNER_COLUMN_ALT));
        let arrive_col = self.column(ARRIVE_COLUMN);
        let status_col = self.column(STATUS_COLUMN);
        let feedback_col = self.column(FEEDBACK_COLUMN);

        self.rows
            .iter()
            .enumerate()
            .filter_map(|(index, row)| {
                let raw_date = Self::cell(row, date_col);
                let date = parse_sheet_date(&raw_date)?;
                if !range.contains(date) {
                    return None;
                }
                Some(SheetBooking {
                    id: format!("{}-{}", raw_date, index),
                    booking_date: date.format("%Y-%m-%d").to_string(),
                    customer_name: Self::cell(row, customer_col),
                    service: Self::cell(row, service_col),
                    phone: Self::cell(row, contact_col),
                    address: Self::cell(row, address_col),
                    partner_name: Self::cell(row, partner_col),
                    source: Self::cell(row, self.source_index),
                    amount: parse_price(&Self::cell(row, self.service_price_index)),
                    arrive_time: Self::cell(row, arrive_col),
                    status: Self::cell(row, status_col),
                    feedback: Self::cell(row, feedback_col),
                })
            })
            .collect()
    }
}
