//! Domain-level query types.
//!
//! These structs are used by services inside the domain layer and are not
//! exposed over the public API. The REST layer maps the query-string DTOs of
//! the `shared` crate to these types, resolving dates on the way.

pub mod sheet_bookings {
    use crate::backend::domain::calendar::DateRange;

    /// Search and page over the booking ledger rows of a date range
    #[derive(Debug, Clone)]
    pub struct SheetBookingTableQuery {
        pub range: DateRange,
        pub search: Option<String>,
        pub page: Option<u32>,
    }
}

pub mod customers {
    use crate::backend::domain::calendar::DateRange;
    use shared::BookingCountFilter;

    #[derive(Debug, Clone)]
    pub struct CustomerListQuery {
        /// Creation-date range of the listed customers
        pub range: DateRange,
        pub search: Option<String>,
        pub bookings: BookingCountFilter,
        pub page: Option<u32>,
    }

    #[derive(Debug, Clone)]
    pub struct ReferralQuery {
        pub customer_id: String,
        pub search: Option<String>,
        pub page: Option<u32>,
    }
}

pub mod partners {
    use crate::backend::domain::calendar::DateRange;
    use shared::{PartnerScope, PartnerTypeFilter};

    #[derive(Debug, Clone, Default)]
    pub struct PartnerListQuery {
        /// Join-date range; every partner when absent
        pub joined: Option<DateRange>,
        pub search: Option<String>,
        pub partner_type: PartnerTypeFilter,
        pub scope: PartnerScope,
        /// Onboarding status name; `None` or `All` lists every status
        pub status: Option<String>,
    }

    #[derive(Debug, Clone)]
    pub struct PartnerBookingsQuery {
        pub partner_id: String,
        pub range: Option<DateRange>,
        pub search: Option<String>,
        pub status: Option<String>,
        pub page: Option<u32>,
    }

    #[derive(Debug, Clone)]
    pub struct PartnerEarningsQuery {
        pub partner_id: String,
        pub range: Option<DateRange>,
        pub page: Option<u32>,
        pub payout_page: Option<u32>,
        /// Months to shift the chart window into the past
        pub month_offset: u32,
    }

    #[derive(Debug, Clone)]
    pub struct PartnerFuelQuery {
        pub partner_id: String,
        pub range: Option<DateRange>,
    }

    #[derive(Debug, Clone)]
    pub struct PartnerAttendanceQuery {
        /// Name the partner is registered under with the attendance provider
        pub name: String,
        pub range: Option<DateRange>,
        pub page: Option<u32>,
    }
}
