//! Field attendance of a partner, read from the third-party attendance feed.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use csv::QuoteStyle;
use std::cmp::Reverse;
use std::sync::Arc;
use tracing::{error, info};

use shared::{AttendanceKpis, AttendanceRow, PartnerAttendanceResponse};

use crate::backend::domain::commands::partners::PartnerAttendanceQuery;
use crate::backend::domain::error::{DashboardError, DashboardResult};
use crate::backend::domain::export_service::{ExportFile, ExportTable};
use crate::backend::domain::metrics::{paginate, round_to};
use crate::backend::domain::models::AttendanceRecord;
use crate::backend::storage::AttendanceSource;

pub const ATTENDANCE_PAGE_SIZE: u32 = 10;
const TIME_FORMATS: [&str; 4] = ["%H:%M:%S", "%H:%M", "%I:%M:%S %p", "%I:%M %p"];

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(raw, format).ok())
}

/// Hours between check-in and check-out, when both parse
fn hours_worked(record: &AttendanceRecord) -> Option<f64> {
    let day = parse_date(&record.attendance_date)?;
    let start = NaiveDateTime::new(day, parse_time(&record.in_time)?);
    let end = NaiveDateTime::new(day, parse_time(record.out_time.as_deref()?)?);
    Some((end - start).num_seconds() as f64 / 3600.0)
}

pub fn attendance_kpis(records: &[AttendanceRecord]) -> AttendanceKpis {
    let present = records.len();
    let missing_out = records
        .iter()
        .filter(|r| r.out_time.as_deref().map_or(true, |t| t.trim().is_empty()))
        .count();
    let total_hours: f64 = records.iter().filter_map(hours_worked).sum();
    let checked_out = (present - missing_out).max(1);

    AttendanceKpis {
        present,
        missing_out,
        avg_hours: round_to(total_hours / checked_out as f64, 1),
    }
}

fn to_row(record: &AttendanceRecord) -> AttendanceRow {
    AttendanceRow {
        employee_id: record.employee_id,
        employee_name: record.employee_name.clone(),
        mobile_no: record.mobile_no.clone(),
        assigned_ward: record.assigned_ward.clone(),
        attendance_date: record.attendance_date.clone(),
        in_time: record.in_time.clone(),
        out_time: record.out_time.clone(),
        in_address: record.in_address.clone(),
        out_address: record.out_address.clone(),
    }
}

fn flatten_address(address: &str) -> String {
    address.replace(',', " ")
}

#[derive(Clone)]
pub struct AttendanceService {
    source: Arc<dyn AttendanceSource>,
}

impl AttendanceService {
    pub fn new(source: Arc<dyn AttendanceSource>) -> Self {
        Self { source }
    }

    /// Records of the named partner, newest first
    async fn records(&self, query: &PartnerAttendanceQuery) -> DashboardResult<Vec<AttendanceRecord>> {
        let bounds = query
            .range
            .map(|range| (range.from.format("%Y-%m-%d").to_string(), range.to.format("%Y-%m-%d").to_string()));
        let records = self
            .source
            .fetch_attendance(bounds.as_ref().map(|(from, to)| (from.as_str(), to.as_str())))
            .await
            .map_err(|e| {
                error!("Attendance feed request failed: {:#}", e);
                DashboardError::storage("Failed to load attendance", e)
            })?;

        let name = query.name.trim().to_lowercase();
        let mut records: Vec<AttendanceRecord> = records
            .into_iter()
            .filter(|r| r.employee_name.trim().to_lowercase() == name)
            .collect();
        records.sort_by_key(|r| Reverse(parse_date(&r.attendance_date)));
        Ok(records)
    }

    pub async fn attendance(&self, query: &PartnerAttendanceQuery) -> DashboardResult<PartnerAttendanceResponse> {
        info!("Loading attendance of {}", query.name);
        let records = self.records(query).await?;
        let kpis = attendance_kpis(&records);
        let rows: Vec<AttendanceRow> = records.iter().map(to_row).collect();
        let (records, pagination) = paginate(&rows, query.page, ATTENDANCE_PAGE_SIZE);
        Ok(PartnerAttendanceResponse {
            records,
            kpis,
            pagination,
        })
    }

    pub async fn export_csv(&self, query: &PartnerAttendanceQuery) -> DashboardResult<ExportFile> {
        let records = self.records(query).await?;
        let mut table = ExportTable::new(
            "Attendance",
            &["Date", "In Time", "Out Time", "In Address", "Out Address"],
        );
        for record in &records {
            let date = parse_date(&record.attendance_date)
                .map(|d| d.format("%-d/%-m/%Y").to_string())
                .unwrap_or_else(|| record.attendance_date.clone());
            let out_address = if record.out_address.trim().is_empty() {
                "-".to_string()
            } else {
                flatten_address(&record.out_address)
            };
            table.push_row(vec![
                date.into(),
                record.in_time.as_str().into(),
                record.out_time.as_deref().unwrap_or("-").into(),
                flatten_address(&record.in_address).into(),
                out_address.into(),
            ]);
        }

        let bytes = table
            .to_csv(QuoteStyle::Necessary)
            .map_err(|e| DashboardError::storage("Failed to export attendance", e))?;
        Ok(ExportFile::csv(&format!("{}-attendance.csv", query.name.trim()), bytes))
    }
}
