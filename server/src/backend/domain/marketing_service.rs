//! Same-day marketing metrics, the numbers behind the daily WhatsApp report.

use futures::try_join;
use tracing::{error, info};

use shared::MarketingMetrics;

use crate::backend::domain::calendar::BusinessCalendar;
use crate::backend::domain::category::count_categories;
use crate::backend::domain::error::{DashboardError, DashboardResult};
use crate::backend::domain::expense_service::ExpenseService;
use crate::backend::domain::metrics::{customer_acquisition_cost, customers_with_exactly_one, round_to};
use crate::backend::domain::models::ProviderAllowlist;
use crate::backend::domain::profit::{ProfitRates, ProfitSummary};
use crate::backend::storage::{BookingStorage, ComplaintStorage, Connection};

#[derive(Clone)]
pub struct MarketingService<C: Connection> {
    bookings: C::BookingRepository,
    complaints: C::ComplaintRepository,
    catalog: C::CatalogRepository,
    expenses: ExpenseService,
    allowlist: ProviderAllowlist,
    rates: ProfitRates,
    calendar: BusinessCalendar,
}

impl<C: Connection> MarketingService<C> {
    pub fn new(
        connection: &C,
        expenses: ExpenseService,
        allowlist: ProviderAllowlist,
        rates: ProfitRates,
        calendar: BusinessCalendar,
    ) -> Self {
        Self {
            bookings: connection.create_booking_repository(),
            complaints: connection.create_complaint_repository(),
            catalog: connection.create_catalog_repository(),
            expenses,
            allowlist,
            rates,
            calendar,
        }
    }

    /// Metrics for the current business day.
    ///
    /// Booking figures cover allowlisted bookings of every status; the
    /// cancellation count covers all providers.
    pub async fn today(&self) -> DashboardResult<MarketingMetrics> {
        let today = self.calendar.today_range();
        info!("Computing marketing metrics for {}", today.from);
        let window = self.calendar.window(&today);

        let (bookings, all_bookings, complaints) = try_join!(
            self.bookings.list_provider_bookings(self.allowlist.ids(), &window),
            self.bookings.list_bookings_between(&window),
            self.complaints.list_complaints_between(&window),
        )
        .map_err(|e| {
            error!("Marketing metrics query failed: {:#}", e);
            DashboardError::storage("Failed to load marketing metrics", e)
        })?;

        let summary = ProfitSummary::from_bookings(&bookings, &self.rates);
        let daily_expense = self
            .expenses
            .ledger_or_empty()
            .await
            .daily_average_expense(self.calendar.current_month());
        let acquired = customers_with_exactly_one(
            bookings
                .iter()
                .filter(|b| b.status.is_completed())
                .map(|b| b.customer_id.as_deref()),
        );

        Ok(MarketingMetrics {
            completed_bookings: summary.bookings,
            cancelled_bookings: all_bookings.iter().filter(|b| b.status.is_cancelled()).count(),
            total_amount_paid: summary.amount_paid,
            total_booking_amount: summary.total_booking_amount,
            net_profit: round_to(summary.net_profit, 2),
            margin_percentage: round_to(summary.margin_percentage(), 2),
            avg_order_value: round_to(summary.average_order_value(), 2),
            customer_acquisition_cost: round_to(customer_acquisition_cost(daily_expense, acquired), 2),
            category_bookings: count_categories(&self.catalog, &bookings).await,
            total_complaints: complaints.len(),
            resolved_complaints: complaints.iter().filter(|c| c.is_resolved()).count(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::document::{Document, FieldValue};
    use crate::backend::storage::test_utils::FakeSheets;
    use crate::backend::storage::{DocumentConnection, MemoryDocumentStore};
    use chrono::{DateTime, TimeZone, Utc};
    use std::sync::Arc;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 10, 6, 0, 0).unwrap()
    }

    fn booking(id: &str, provider: &str, customer: &str, status: &str) -> Document {
        Document::new("bookings", id)
            .with("provider_id", FieldValue::reference("customer", provider))
            .with("customer_id", FieldValue::reference("customer", customer))
            .with("status", status)
            .with("date", now())
    }

    fn service(documents: Vec<Document>) -> MarketingService<DocumentConnection> {
        let store = MemoryDocumentStore::new().with_documents(documents).unwrap();
        MarketingService::new(
            &DocumentConnection::in_memory(store),
            ExpenseService::new(Arc::new(FakeSheets::new("Month,Total\nApril,3000\n", ""))),
            ProviderAllowlist::new(vec!["p1".to_string()]),
            ProfitRates::default(),
            BusinessCalendar::default().with_fixed_now(now()),
        )
    }

    #[tokio::test]
    async fn test_today_metrics() {
        let documents = vec![
            booking("b1", "p1", "c1", "Service_Completed")
                .with("amount_paid", 1180i64)
                .with("totalservice_price", 1000i64)
                .with("taxAmount", 180i64)
                .with("partner_fare", 500i64),
            booking("b2", "p1", "c2", "Pending").with("totalservice_price", 820i64),
            booking("b3", "p9", "c3", "Cancelled"),
            booking("b4", "p1", "c4", "Booking_Cancelled"),
            Document::new("customer_complain", "k1")
                .with("complaint_status", "Resolved")
                .with("date_of_complaint", now()),
            Document::new("customer_complain", "k2")
                .with("complaint_status", "pending")
                .with("date_of_complaint", now()),
        ];
        let metrics = service(documents).today().await.unwrap();

        assert_eq!(metrics.completed_bookings, 3);
        assert_eq!(metrics.cancelled_bookings, 2);
        assert_eq!(metrics.total_amount_paid, 1180.0);
        assert_eq!(metrics.total_booking_amount, 2000.0);
        assert_eq!(metrics.avg_order_value, 666.67);
        // 3000 / 30 days over the single first-time customer c1
        assert_eq!(metrics.customer_acquisition_cost, 100.0);
        assert_eq!(metrics.total_complaints, 2);
        assert_eq!(metrics.resolved_complaints, 1);
    }

    #[tokio::test]
    async fn test_cac_is_zero_without_completed_bookings() {
        let metrics = service(vec![booking("b1", "p1", "c1", "Pending")]).today().await.unwrap();
        assert_eq!(metrics.customer_acquisition_cost, 0.0);
        assert_eq!(metrics.net_profit, 0.0);
    }
}
