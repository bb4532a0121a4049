//! Month-by-month customer acquisition cost.

use chrono::Datelike;
use std::collections::{BTreeMap, HashMap};
use tracing::{error, info};

use shared::{CacSeriesResponse, ChangeDirection, MonthlyCacPoint};

use crate::backend::domain::calendar::{BusinessCalendar, DateRange};
use crate::backend::domain::error::{DashboardError, DashboardResult};
use crate::backend::domain::expense_service::ExpenseService;
use crate::backend::domain::metrics::{change_direction, customer_acquisition_cost, percent_change, round_to};
use crate::backend::domain::models::ProviderAllowlist;
use crate::backend::domain::month_key::YearMonth;
use crate::backend::domain::proration::prorate_monthly_expense_for_range;
use crate::backend::storage::{BookingStorage, Connection};

/// Months before the current one covered by the default range
const DEFAULT_MONTHS_BACK: i32 = 5;

#[derive(Clone)]
pub struct CacService<C: Connection> {
    bookings: C::BookingRepository,
    expenses: ExpenseService,
    allowlist: ProviderAllowlist,
    calendar: BusinessCalendar,
}

impl<C: Connection> CacService<C> {
    pub fn new(connection: &C, expenses: ExpenseService, allowlist: ProviderAllowlist, calendar: BusinessCalendar) -> Self {
        Self {
            bookings: connection.create_booking_repository(),
            expenses,
            allowlist,
            calendar,
        }
    }

    /// First day five months back through today
    pub fn default_range(&self) -> DateRange {
        let today = self.calendar.today();
        let from = self.calendar.current_month().offset(-DEFAULT_MONTHS_BACK).first_day();
        DateRange { from, to: today }
    }

    pub async fn monthly_series(&self, range: &DateRange) -> DashboardResult<CacSeriesResponse> {
        info!("Building CAC series for {} to {}", range.from, range.to);

        let bookings = self
            .bookings
            .list_provider_bookings(self.allowlist.ids(), &self.calendar.window(range))
            .await
            .map_err(|e| {
                error!("CAC booking query failed: {:#}", e);
                DashboardError::storage("Failed to load CAC data", e)
            })?;
        let expense_by_month = self.expenses.ledger_or_empty().await.monthly_totals(range.from.year());

        let mut bookings_per_customer: BTreeMap<YearMonth, HashMap<String, usize>> = BTreeMap::new();
        for booking in bookings.iter().filter(|b| b.status.is_completed()) {
            let (date, customer) = match (booking.date, booking.customer_id.as_ref()) {
                (Some(date), Some(customer)) => (date, customer),
                _ => continue,
            };
            *bookings_per_customer
                .entry(self.calendar.month_of(date))
                .or_default()
                .entry(customer.clone())
                .or_insert(0) += 1;
        }

        let mut data: Vec<MonthlyCacPoint> = Vec::new();
        for month in YearMonth::of(range.from).through(YearMonth::of(range.to)) {
            let marketing_expense = expense_by_month
                .get(&month)
                .map(|total| prorate_monthly_expense_for_range(*total, month, range))
                .unwrap_or(0.0);
            let customers_with_one_booking = bookings_per_customer
                .get(&month)
                .map(|counts| counts.values().filter(|count| **count == 1).count())
                .unwrap_or(0);
            let cac = round_to(customer_acquisition_cost(marketing_expense, customers_with_one_booking), 2);

            let (change_pct, change_dir) = match data.last() {
                Some(previous) => {
                    let change = percent_change(cac, previous.cac);
                    (Some(round_to(change, 1)), change_direction(change))
                }
                None => (None, ChangeDirection::Flat),
            };

            data.push(MonthlyCacPoint {
                key: month.key(),
                month_label: month.label(),
                marketing_expense: round_to(marketing_expense, 2),
                customers_with_one_booking,
                cac,
                change_pct,
                change_dir,
            });
        }

        Ok(CacSeriesResponse { data })
    }
}
