//! Fuel bills partners upload against their bookings.

use chrono::{DateTime, Utc};
use csv::QuoteStyle;
use std::cmp::Reverse;
use tracing::{error, info};

use shared::{BookingFuelExpense, FuelBillRow, PartnerFuelResponse};

use crate::backend::domain::calendar::BusinessCalendar;
use crate::backend::domain::commands::partners::PartnerFuelQuery;
use crate::backend::domain::error::{DashboardError, DashboardResult};
use crate::backend::domain::export_service::{ExportFile, ExportTable};
use crate::backend::domain::models::Booking;
use crate::backend::storage::{BookingStorage, Connection};

const FUEL_HEADERS: [&str; 7] = [
    "Date",
    "Booking ID",
    "Partner Name",
    "Bill #",
    "Amount",
    "Note",
    "Bill Image URL",
];

struct FuelEntry {
    booked_for: DateTime<Utc>,
    expense: BookingFuelExpense,
}

#[derive(Clone)]
pub struct FuelService<C: Connection> {
    bookings: C::BookingRepository,
    calendar: BusinessCalendar,
}

impl<C: Connection> FuelService<C> {
    pub fn new(connection: &C, calendar: BusinessCalendar) -> Self {
        Self {
            bookings: connection.create_booking_repository(),
            calendar,
        }
    }

    fn entry(&self, booking: &Booking) -> FuelEntry {
        let booked_for = booking
            .time_slot
            .or(booking.date)
            .unwrap_or_else(|| self.calendar.now_utc());
        FuelEntry {
            booked_for,
            expense: BookingFuelExpense {
                booking_id: booking.id.clone(),
                booking_date: booked_for.to_rfc3339(),
                partner_name: booking
                    .provider_name
                    .clone()
                    .unwrap_or_else(|| "Unknown Partner".to_string()),
                bills: booking
                    .fuel_bills
                    .iter()
                    .map(|bill| FuelBillRow {
                        bill_number: bill.number,
                        bill_image: bill.image_url.clone(),
                        bill_amount: bill.amount,
                        note: bill.note.clone(),
                    })
                    .collect(),
            },
        }
    }

    /// Bookings carrying at least one fuel bill, latest slot first
    async fn entries(&self, query: &PartnerFuelQuery) -> DashboardResult<Vec<FuelEntry>> {
        let window = query.range.as_ref().map(|range| self.calendar.window(range));
        let bookings = self
            .bookings
            .list_partner_bookings(&query.partner_id, window.as_ref())
            .await
            .map_err(|e| {
                error!("Fuel expense query for partner {} failed: {:#}", query.partner_id, e);
                DashboardError::storage("Failed to load fuel expenses", e)
            })?;

        let mut entries: Vec<FuelEntry> = bookings
            .iter()
            .filter(|b| !b.fuel_bills.is_empty())
            .map(|b| self.entry(b))
            .collect();
        entries.sort_by_key(|e| Reverse(e.booked_for));
        Ok(entries)
    }

    pub async fn expenses(&self, query: &PartnerFuelQuery) -> DashboardResult<PartnerFuelResponse> {
        info!("Loading fuel expenses of partner {}", query.partner_id);
        let expenses: Vec<BookingFuelExpense> = self.entries(query).await?.into_iter().map(|e| e.expense).collect();

        let bills = expenses.iter().flat_map(|e| e.bills.iter());
        let total_expense = bills.clone().map(|b| b.bill_amount).sum();
        let total_bills = bills.count();

        Ok(PartnerFuelResponse {
            expenses,
            total_expense,
            total_bills,
        })
    }

    /// One CSV line per bill
    pub async fn export_csv(&self, query: &PartnerFuelQuery) -> DashboardResult<ExportFile> {
        let entries = self.entries(query).await?;
        let mut table = ExportTable::new("Fuel", &FUEL_HEADERS);
        for entry in &entries {
            let date = self
                .calendar
                .local_date(entry.booked_for)
                .format("%d %b %Y")
                .to_string();
            for bill in &entry.expense.bills {
                table.push_row(vec![
                    date.as_str().into(),
                    entry.expense.booking_id.as_str().into(),
                    entry.expense.partner_name.as_str().into(),
                    (bill.bill_number as usize).into(),
                    bill.bill_amount.into(),
                    bill.note.as_str().into(),
                    bill.bill_image.as_str().into(),
                ]);
            }
        }

        let bytes = table
            .to_csv(QuoteStyle::Necessary)
            .map_err(|e| DashboardError::storage("Failed to export fuel expenses", e))?;
        Ok(ExportFile::csv(&format!("PartnerFuelExpenses_{}.csv", query.partner_id), bytes))
    }
}
