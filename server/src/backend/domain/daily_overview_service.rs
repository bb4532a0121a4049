//! Today's summary card: average daily spend and the partners on duty.

use std::collections::HashMap;
use tracing::{info, warn};

use shared::{DailyOverview, ServiceCount};

use crate::backend::domain::calendar::BusinessCalendar;
use crate::backend::domain::expense_service::ExpenseService;
use crate::backend::domain::models::Customer;
use crate::backend::storage::{AttendanceMarkStorage, CatalogStorage, Connection, CustomerStorage};

const UNKNOWN_PARTNER: &str = "Unknown Partner";
const UNKNOWN_SERVICE: &str = "N/A";

#[derive(Clone)]
pub struct DailyOverviewService<C: Connection> {
    marks: C::AttendanceMarkRepository,
    customers: C::CustomerRepository,
    catalog: C::CatalogRepository,
    expenses: ExpenseService,
    calendar: BusinessCalendar,
}

impl<C: Connection> DailyOverviewService<C> {
    pub fn new(connection: &C, expenses: ExpenseService, calendar: BusinessCalendar) -> Self {
        Self {
            marks: connection.create_attendance_mark_repository(),
            customers: connection.create_customer_repository(),
            catalog: connection.create_catalog_repository(),
            expenses,
            calendar,
        }
    }

    /// `"<partner> — <service>"` for every partner marked present today
    async fn partners_on_duty(&self) -> anyhow::Result<Vec<String>> {
        let window = self.calendar.window(&self.calendar.today_range());
        let marks = self.marks.list_present_marks(&window).await?;

        let partner_ids: Vec<String> = marks.iter().filter_map(|m| m.partner_id.clone()).collect();
        let partners: HashMap<String, Customer> = self
            .customers
            .get_customers(&partner_ids)
            .await?
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();

        let service_ids: Vec<String> = partners
            .values()
            .filter_map(|p| p.partner_service_opt.clone())
            .collect();
        let service_names = if service_ids.is_empty() {
            HashMap::new()
        } else {
            self.catalog.subcategory_names(&service_ids).await?
        };

        Ok(marks
            .iter()
            .map(|mark| {
                let partner = mark.partner_id.as_ref().and_then(|id| partners.get(id));
                let partner_name = partner.and_then(Customer::preferred_name).unwrap_or(UNKNOWN_PARTNER);
                let service_name = partner
                    .and_then(|p| p.partner_service_opt.as_ref())
                    .and_then(|id| service_names.get(id))
                    .map(String::as_str)
                    .unwrap_or(UNKNOWN_SERVICE);
                format!("{} — {}", partner_name, service_name)
            })
            .collect())
    }

    pub async fn overview(&self) -> DailyOverview {
        let today = self.calendar.today();
        info!("Building daily overview for {}", today);

        let daily_average_expense = self
            .expenses
            .ledger_or_empty()
            .await
            .daily_average_expense(self.calendar.current_month());

        let on_duty = match self.partners_on_duty().await {
            Ok(on_duty) => on_duty,
            Err(e) => {
                warn!("Could not load today's attendance: {:#}", e);
                Vec::new()
            }
        };

        DailyOverview {
            date: self.calendar.long_date_label(today),
            daily_average_expense,
            total_bookings: on_duty.len(),
            total_booking_amount: 0.0,
            bookings: Vec::new(),
            services: on_duty
                .into_iter()
                .map(|name| ServiceCount {
                    name,
                    count: 0,
                    amount: 0.0,
                })
                .collect(),
        }
    }
}
