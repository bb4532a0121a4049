use shared::{
    AttendanceRequest, CustomerListRequest, DateRangeRequest, PartnerBookingsRequest, PartnerEarningsRequest,
    PartnerListRequest, ReferralListRequest, SheetBookingTableRequest,
};

use crate::backend::domain::calendar::{parse_ymd, BusinessCalendar, DateRange};
use crate::backend::domain::commands::customers::{CustomerListQuery, ReferralQuery};
use crate::backend::domain::commands::partners::{
    PartnerAttendanceQuery, PartnerBookingsQuery, PartnerEarningsQuery, PartnerFuelQuery, PartnerListQuery,
};
use crate::backend::domain::commands::sheet_bookings::SheetBookingTableQuery;
use crate::backend::domain::error::{DashboardError, DashboardResult};

/// Maps query-string DTOs to domain queries
pub struct QueryMapper;

impl QueryMapper {
    /// Both ends are mandatory for the booking ledger. A reversed range is
    /// accepted and matches no rows.
    pub fn required_range(from: Option<&str>, to: Option<&str>) -> DashboardResult<DateRange> {
        let from = from.map(str::trim).filter(|v| !v.is_empty());
        let to = to.map(str::trim).filter(|v| !v.is_empty());
        match (from, to) {
            (Some(from), Some(to)) => Ok(DateRange::filter(parse_ymd(from)?, parse_ymd(to)?)),
            _ => Err(DashboardError::MissingParameter("from & to required".to_string())),
        }
    }

    pub fn range_or(
        calendar: &BusinessCalendar,
        request: &DateRangeRequest,
        default: DateRange,
    ) -> DashboardResult<DateRange> {
        calendar.resolve_range(request.from.as_deref(), request.to.as_deref(), default)
    }

    pub fn sheet_table(dto: SheetBookingTableRequest) -> DashboardResult<SheetBookingTableQuery> {
        Ok(SheetBookingTableQuery {
            range: Self::required_range(dto.from.as_deref(), dto.to.as_deref())?,
            search: dto.search,
            page: dto.page,
        })
    }

    pub fn customer_list(
        calendar: &BusinessCalendar,
        dto: CustomerListRequest,
        default: DateRange,
    ) -> DashboardResult<CustomerListQuery> {
        Ok(CustomerListQuery {
            range: calendar.resolve_range(dto.from.as_deref(), dto.to.as_deref(), default)?,
            search: dto.search,
            bookings: dto.bookings.unwrap_or_default(),
            page: dto.page,
        })
    }

    pub fn referrals(customer_id: String, dto: ReferralListRequest) -> ReferralQuery {
        ReferralQuery {
            customer_id,
            search: dto.search,
            page: dto.page,
        }
    }

    pub fn partner_list(calendar: &BusinessCalendar, dto: PartnerListRequest) -> DashboardResult<PartnerListQuery> {
        Ok(PartnerListQuery {
            joined: calendar.optional_range(dto.from.as_deref(), dto.to.as_deref())?,
            search: dto.search,
            partner_type: dto.partner_type.unwrap_or_default(),
            scope: dto.scope.unwrap_or_default(),
            status: dto.status,
        })
    }

    pub fn partner_bookings(
        calendar: &BusinessCalendar,
        partner_id: String,
        dto: PartnerBookingsRequest,
    ) -> DashboardResult<PartnerBookingsQuery> {
        Ok(PartnerBookingsQuery {
            partner_id,
            range: calendar.optional_range(dto.from.as_deref(), dto.to.as_deref())?,
            search: dto.search,
            status: dto.status,
            page: dto.page,
        })
    }

    pub fn partner_earnings(
        calendar: &BusinessCalendar,
        partner_id: String,
        dto: PartnerEarningsRequest,
    ) -> DashboardResult<PartnerEarningsQuery> {
        Ok(PartnerEarningsQuery {
            partner_id,
            range: calendar.optional_range(dto.from.as_deref(), dto.to.as_deref())?,
            page: dto.page,
            payout_page: dto.payout_page,
            month_offset: dto.month_offset.unwrap_or(0),
        })
    }

    pub fn partner_fuel(
        calendar: &BusinessCalendar,
        partner_id: String,
        dto: DateRangeRequest,
    ) -> DashboardResult<PartnerFuelQuery> {
        Ok(PartnerFuelQuery {
            partner_id,
            range: calendar.optional_range(dto.from.as_deref(), dto.to.as_deref())?,
        })
    }

    /// The attendance feed is keyed by partner name, not id
    pub fn attendance(calendar: &BusinessCalendar, dto: AttendanceRequest) -> DashboardResult<PartnerAttendanceQuery> {
        let name = dto
            .name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| DashboardError::MissingParameter("name required".to_string()))?;
        Ok(PartnerAttendanceQuery {
            name,
            range: calendar.optional_range(dto.from.as_deref(), dto.to.as_deref())?,
            page: dto.page,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shared::BookingCountFilter;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_required_range_needs_both_ends() {
        let error = QueryMapper::required_range(Some("2025-05-01"), None).unwrap_err();
        assert!(matches!(error, DashboardError::MissingParameter(ref m) if m == "from & to required"));
        assert!(matches!(
            QueryMapper::required_range(Some("2025-05-01"), Some("May 2")),
            Err(DashboardError::InvalidInput(_))
        ));

        let range = QueryMapper::required_range(Some("2025-05-01"), Some("2025-05-31")).unwrap();
        assert_eq!(range.to, ymd(2025, 5, 31));

        let reversed = QueryMapper::required_range(Some("2025-04-30"), Some("2025-04-01")).unwrap();
        assert!(!reversed.contains(ymd(2025, 4, 15)));
        assert!(!reversed.contains(ymd(2025, 4, 30)));
    }

    #[test]
    fn test_customer_list_falls_back_per_end() {
        let calendar = BusinessCalendar::default();
        let default = DateRange::new(ymd(2025, 4, 1), ymd(2025, 6, 25)).unwrap();
        let dto = CustomerListRequest {
            from: Some("2025-06-01".to_string()),
            bookings: Some(BookingCountFilter::TwoPlus),
            ..Default::default()
        };

        let query = QueryMapper::customer_list(&calendar, dto, default).unwrap();
        assert_eq!(query.range.from, ymd(2025, 6, 1));
        assert_eq!(query.range.to, ymd(2025, 6, 25));
        assert_eq!(query.bookings, BookingCountFilter::TwoPlus);
    }

    #[test]
    fn test_attendance_requires_name() {
        let calendar = BusinessCalendar::default();
        let missing = QueryMapper::attendance(
            &calendar,
            AttendanceRequest {
                name: Some("  ".to_string()),
                ..Default::default()
            },
        );
        assert!(matches!(missing, Err(DashboardError::MissingParameter(_))));

        let query = QueryMapper::attendance(
            &calendar,
            AttendanceRequest {
                name: Some(" Vishal ".to_string()),
                from: Some("2025-06-01".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(query.name, "Vishal");
        assert!(query.range.is_none());
    }
}
