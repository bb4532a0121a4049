//! Dashboard KPI cards.
//!
//! Bookings are scoped to the provider allowlist and the requested date
//! range. Marketing spend is the expense ledger prorated over that range, so
//! the CAC and net P&L of two adjacent ranges add up to those of the
//! combined range.

use chrono::Datelike;
use futures::try_join;
use tracing::{error, info};

use shared::{BookingStats, CategoryBookings};

use crate::backend::domain::booking_aggregate::BookingAggregate;
use crate::backend::domain::calendar::{BusinessCalendar, DateRange};
use crate::backend::domain::category::count_categories;
use crate::backend::domain::error::{DashboardError, DashboardResult};
use crate::backend::domain::expense_ledger::ExpenseLedger;
use crate::backend::domain::expense_service::ExpenseService;
use crate::backend::domain::metrics::{customer_acquisition_cost, percent_change, round_to};
use crate::backend::domain::models::ProviderAllowlist;
use crate::backend::domain::proration::prorated_expense;
use crate::backend::storage::{BookingStorage, Connection, CustomerStorage};

const STATS_FAILED: &str = "Failed to load booking stats";

/// Average rating shown until ratings are collected per booking
const DEFAULT_AVERAGE_RATING: f64 = 5.0;

#[derive(Clone)]
pub struct DashboardService<C: Connection> {
    bookings: C::BookingRepository,
    customers: C::CustomerRepository,
    catalog: C::CatalogRepository,
    expenses: ExpenseService,
    allowlist: ProviderAllowlist,
    calendar: BusinessCalendar,
}

impl<C: Connection> DashboardService<C> {
    pub fn new(connection: &C, expenses: ExpenseService, allowlist: ProviderAllowlist, calendar: BusinessCalendar) -> Self {
        Self {
            bookings: connection.create_booking_repository(),
            customers: connection.create_customer_repository(),
            catalog: connection.create_catalog_repository(),
            expenses,
            allowlist,
            calendar,
        }
    }

    /// Prorated marketing spend of a range. Month labels without a year
    /// belong to the range's starting year.
    fn marketing_expense(ledger: &ExpenseLedger, range: &DateRange) -> f64 {
        prorated_expense(&ledger.monthly_totals(range.from.year()), range)
    }

    pub async fn booking_stats(&self, range: &DateRange) -> DashboardResult<BookingStats> {
        info!("Computing booking stats for {} to {}", range.from, range.to);
        let previous = range.preceding();
        let window = self.calendar.window(range);
        let previous_window = self.calendar.window(&previous);

        let (current_bookings, previous_bookings, new_customers) = try_join!(
            self.bookings.list_provider_bookings(self.allowlist.ids(), &window),
            self.bookings.list_provider_bookings(self.allowlist.ids(), &previous_window),
            self.customers.list_customers_created_between(&window),
        )
        .map_err(|e| {
            error!("Booking stats query failed: {:#}", e);
            DashboardError::storage(STATS_FAILED, e)
        })?;
        let ledger = self.expenses.ledger_or_empty().await;

        let current = BookingAggregate::from_bookings(&current_bookings);
        let before = BookingAggregate::from_bookings(&previous_bookings);

        let expense = Self::marketing_expense(&ledger, range);
        let cac = customer_acquisition_cost(expense, current.customers_with_one_completed);
        let previous_cac = customer_acquisition_cost(
            Self::marketing_expense(&ledger, &previous),
            before.customers_with_one_completed,
        );

        Ok(BookingStats {
            total_bookings: current.total,
            total_bookings_change: 0.0,
            pending_bookings: current.pending,
            confirmed_bookings: current.accepted,
            completed_bookings: current.completed,
            completed_bookings_change: 0.0,
            cancelled_bookings: current.cancelled,
            total_revenue: current.amount_paid,
            total_revenue_change: 0.0,
            net_revenue: current.net_revenue(),
            net_revenue_change: 0.0,
            per_order_value: current.per_order_value(),
            per_order_value_change: 0.0,
            total_customers: new_customers.len(),
            total_customers_change: 0.0,
            average_rating: DEFAULT_AVERAGE_RATING,
            total_ratings_count: 0,
            completion_rate: current.completion_rate(),
            total_offer_amount: current.total_offer_amount(),
            cac: round_to(cac, 2),
            cac_change: round_to(percent_change(cac, previous_cac), 1),
            net_pnl: round_to(current.net_revenue() - expense, 2),
        })
    }

    /// Allowlisted bookings of any status per service category
    pub async fn category_bookings(&self, range: &DateRange) -> DashboardResult<CategoryBookings> {
        info!("Counting category bookings for {} to {}", range.from, range.to);
        let bookings = self
            .bookings
            .list_provider_bookings(self.allowlist.ids(), &self.calendar.window(range))
            .await
            .map_err(|e| {
                error!("Category booking query failed: {:#}", e);
                DashboardError::storage("Failed to load category bookings", e)
            })?;
        Ok(count_categories(&self.catalog, &bookings).await)
    }

    pub async fn pending_bookings(&self) -> anyhow::Result<usize> {
        self.bookings.count_pending_bookings().await
    }
}
