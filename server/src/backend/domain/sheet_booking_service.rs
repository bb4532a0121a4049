//! Bookings recorded in the operations team's published ledger sheet.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info};

use shared::{SheetBooking, SheetBookingStats, SheetBookingTableResponse, SheetBookingsResponse};

use crate::backend::domain::booking_sheet::{parse_sheet_date, BookingSheet};
use crate::backend::domain::calendar::DateRange;
use crate::backend::domain::commands::sheet_bookings::SheetBookingTableQuery;
use crate::backend::domain::error::{DashboardError, DashboardResult};
use crate::backend::domain::metrics::{matches_search, paginate};
use crate::backend::storage::SheetSource;

pub const SHEET_TABLE_PAGE_SIZE: u32 = 10;
const FETCH_FAILED: &str = "Failed to fetch sheet bookings";
const NO_VALUE: &str = "—";

#[derive(Clone)]
pub struct SheetBookingService {
    sheets: Arc<dyn SheetSource>,
}

impl SheetBookingService {
    pub fn new(sheets: Arc<dyn SheetSource>) -> Self {
        Self { sheets }
    }

    async fn load_sheet(&self) -> DashboardResult<BookingSheet> {
        let text = self.sheets.fetch_booking_sheet().await.map_err(|e| {
            error!("Booking sheet fetch failed: {:#}", e);
            DashboardError::storage(FETCH_FAILED, e)
        })?;
        BookingSheet::parse(&text).map_err(|e| {
            error!("Booking sheet is not valid CSV: {:#}", e);
            DashboardError::storage(FETCH_FAILED, e)
        })
    }

    /// Ledger rows dated within `range`, in sheet order, with parser diagnostics
    pub async fn bookings(&self, range: &DateRange) -> DashboardResult<SheetBookingsResponse> {
        info!("Loading sheet bookings {} to {}", range.from, range.to);
        let sheet = self.load_sheet().await?;
        Ok(SheetBookingsResponse {
            debug: sheet.debug_info(),
            data: sheet.bookings_between(range),
        })
    }

    pub async fn stats(&self, range: &DateRange) -> DashboardResult<SheetBookingStats> {
        let sheet = self.load_sheet().await?;
        Ok(summarize(&sheet.bookings_between(range)))
    }

    /// Searchable table, newest booking first
    pub async fn table(&self, query: &SheetBookingTableQuery) -> DashboardResult<SheetBookingTableResponse> {
        let sheet = self.load_sheet().await?;
        let mut bookings: Vec<SheetBooking> = sheet
            .bookings_between(&query.range)
            .into_iter()
            .filter(|b| {
                matches_search(
                    query.search.as_deref(),
                    [b.customer_name.as_str(), b.phone.as_str(), b.service.as_str(), b.source.as_str()],
                )
            })
            .collect();
        bookings.sort_by(|a, b| parse_sheet_date(&b.booking_date).cmp(&parse_sheet_date(&a.booking_date)));

        let (page, pagination) = paginate(&bookings, query.page, SHEET_TABLE_PAGE_SIZE);
        Ok(SheetBookingTableResponse {
            bookings: page,
            pagination,
        })
    }
}

/// Most frequent non-blank value; the earliest seen wins a tie
fn most_common<'a>(values: impl Iterator<Item = &'a str>) -> String {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (position, value) in values.map(str::trim).filter(|v| !v.is_empty()).enumerate() {
        counts.entry(value).or_insert((0, position)).0 += 1;
    }
    counts
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(value, _)| value.to_string())
        .unwrap_or_else(|| NO_VALUE.to_string())
}

pub fn summarize(bookings: &[SheetBooking]) -> SheetBookingStats {
    SheetBookingStats {
        total_bookings: bookings.len(),
        total_revenue: bookings.iter().map(|b| b.amount).sum(),
        top_partner: most_common(bookings.iter().map(|b| b.partner_name.as_str())),
        top_lead_source: most_common(bookings.iter().map(|b| b.source.as_str())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::test_utils::FakeSheets;
    use chrono::NaiveDate;

    const SHEET: &str = "Date,Customer Name,Service,Contact Info,Address,Patner Name,Arrive Time,Status,Feedback,Source,Service Price\n\
        4/2/2025,Asha,Deep Cleaning,98765,Sector 5,Ravi,10:00,Done,,Instagram,1500\n\
        15/04/2025,Vikram,Electrical,91234,Sector 9,Sunil,12:00,Done,,Referral,800\n\
        4/20/2025,Meera,Cleaning,95555,Sector 2,Ravi,18:00,Done,,Instagram,\"₹1,200\"\n\
        5/1/2025,Late,Driver,90000,Sector 1,Anil,09:00,Done,,Google,700\n";

    fn april() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 4, 30).unwrap(),
        )
        .unwrap()
    }

    fn service() -> SheetBookingService {
        SheetBookingService::new(Arc::new(FakeSheets::new("", SHEET)))
    }

    #[tokio::test]
    async fn test_bookings_only_within_range_in_sheet_order() {
        let response = service().bookings(&april()).await.unwrap();
        let names: Vec<&str> = response.data.iter().map(|b| b.customer_name.as_str()).collect();
        assert_eq!(names, vec!["Asha", "Vikram", "Meera"]);
        assert_eq!(response.debug.service_price_index, 10);
    }

    #[tokio::test]
    async fn test_stats_pick_top_partner_and_source() {
        let stats = service().stats(&april()).await.unwrap();
        assert_eq!(stats.total_bookings, 3);
        assert_eq!(stats.total_revenue, 3500.0);
        assert_eq!(stats.top_partner, "Ravi");
        assert_eq!(stats.top_lead_source, "Instagram");
    }

    #[test]
    fn test_empty_stats_use_placeholder() {
        let stats = summarize(&[]);
        assert_eq!(stats.total_bookings, 0);
        assert_eq!(stats.top_partner, "—");
        assert_eq!(stats.top_lead_source, "—");
    }

    #[tokio::test]
    async fn test_table_sorts_newest_first_and_searches() {
        let service = service();
        let all = service
            .table(&SheetBookingTableQuery {
                range: april(),
                search: None,
                page: None,
            })
            .await
            .unwrap();
        let names: Vec<&str> = all.bookings.iter().map(|b| b.customer_name.as_str()).collect();
        assert_eq!(names, vec!["Meera", "Vikram", "Asha"]);

        let referral = service
            .table(&SheetBookingTableQuery {
                range: april(),
                search: Some("referral".to_string()),
                page: None,
            })
            .await
            .unwrap();
        assert_eq!(referral.bookings.len(), 1);
        assert_eq!(referral.pagination.total_items, 1);
    }

    #[tokio::test]
    async fn test_unreachable_sheet_reports_fetch_failure() {
        let service = SheetBookingService::new(Arc::new(FakeSheets::default()));
        let error = service.bookings(&april()).await.unwrap_err();
        assert_eq!(error.to_string(), "Failed to fetch sheet bookings");
    }
}
