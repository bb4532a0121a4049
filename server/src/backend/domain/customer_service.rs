//! Customer directory, exports and referral tracking.

use chrono::NaiveDate;
use csv::QuoteStyle;
use futures::future::try_join_all;
use futures::try_join;
use std::collections::HashMap;
use tracing::{error, info};

use shared::{
    BookingCountFilter, CustomerListResponse, CustomerReferralsResponse, CustomerRow, ReferralBooking,
    ReferredCustomer,
};

use crate::backend::domain::calendar::{BusinessCalendar, DateRange};
use crate::backend::domain::commands::customers::{CustomerListQuery, ReferralQuery};
use crate::backend::domain::error::{DashboardError, DashboardResult};
use crate::backend::domain::export_service::{ExportFile, ExportTable};
use crate::backend::domain::metrics::{matches_search, paginate};
use crate::backend::domain::models::{Booking, Customer};
use crate::backend::storage::{BookingStorage, Connection, CustomerStorage};

pub const CUSTOMER_PAGE_SIZE: u32 = 20;
pub const REFERRAL_PAGE_SIZE: u32 = 5;
const EXPORT_HEADERS: [&str; 6] = ["ID", "Name", "Email", "Phone", "Bookings", "Created"];
const MISSING: &str = "—";

/// First day of customer records kept by the dashboard
pub fn customer_history_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 4, 1).unwrap_or(NaiveDate::MIN)
}

/// "2plus" means three or more bookings, matching the dashboard filter labels
fn accepts_count(filter: BookingCountFilter, count: usize) -> bool {
    match filter {
        BookingCountFilter::All => true,
        BookingCountFilter::Zero => count == 0,
        BookingCountFilter::One => count == 1,
        BookingCountFilter::Two => count == 2,
        BookingCountFilter::TwoPlus => count >= 3,
    }
}

fn to_row(customer: &Customer, booking_count: usize) -> CustomerRow {
    CustomerRow {
        id: customer.id.clone(),
        uid: customer.uid.clone(),
        display_name: customer.display_name.clone().unwrap_or_default(),
        customer_name: customer.customer_name.clone().unwrap_or_default(),
        email: customer.email.clone().unwrap_or_default(),
        phone: customer.preferred_phone().unwrap_or_default().to_string(),
        booking_count,
        created_time: customer.created_time.map(|t| t.to_rfc3339()),
        referral_by: customer.referral_by.clone(),
    }
}

fn matches_customer(customer: &Customer, search: Option<&str>) -> bool {
    matches_search(
        search,
        [
            customer.customer_name.as_deref(),
            customer.display_name.as_deref(),
            customer.email.as_deref(),
            customer.phone_number.as_deref(),
            customer.contact_no.as_deref(),
            customer.uid.as_deref(),
            customer.referral_by.as_deref(),
        ]
        .into_iter()
        .flatten(),
    )
}

fn matches_referral(customer: &Customer, search: Option<&str>) -> bool {
    matches_search(
        search,
        [
            Some(customer.id.as_str()),
            customer.display_name.as_deref(),
            customer.customer_name.as_deref(),
            customer.email.as_deref(),
            customer.phone_number.as_deref(),
            customer.contact_no.as_deref(),
        ]
        .into_iter()
        .flatten(),
    )
}

fn referral_booking(booking: &Booking) -> ReferralBooking {
    ReferralBooking {
        id: booking.id.clone(),
        status: booking.status.to_string(),
        date: booking.date.map(|d| d.to_rfc3339()),
        amount_paid: booking.amount_paid,
    }
}

fn completed_spend(bookings: &[Booking]) -> f64 {
    bookings
        .iter()
        .filter(|b| b.status.is_completed())
        .map(|b| b.amount_paid)
        .sum()
}

/// Referred customers of one referrer with their bookings
struct Referrals {
    referral_code: Option<String>,
    customers: Vec<(Customer, Vec<Booking>)>,
}

#[derive(Clone)]
pub struct CustomerService<C: Connection> {
    customers: C::CustomerRepository,
    bookings: C::BookingRepository,
    calendar: BusinessCalendar,
}

impl<C: Connection> CustomerService<C> {
    pub fn new(connection: &C, calendar: BusinessCalendar) -> Self {
        Self {
            customers: connection.create_customer_repository(),
            bookings: connection.create_booking_repository(),
            calendar,
        }
    }

    /// Customer history start through today
    pub fn default_range(&self) -> DateRange {
        let today = self.calendar.today();
        DateRange {
            from: customer_history_start().min(today),
            to: today,
        }
    }

    /// Customers created in range with their in-range booking counts, after
    /// search and booking-count filters, newest first
    async fn filtered(&self, query: &CustomerListQuery) -> DashboardResult<Vec<(Customer, usize)>> {
        let window = self.calendar.window(&query.range);
        let (customers, bookings) = try_join!(
            self.customers.list_customers_created_between(&window),
            self.bookings.list_bookings_between(&window),
        )
        .map_err(|e| {
            error!("Customer listing failed: {:#}", e);
            DashboardError::storage("Failed to load customers", e)
        })?;

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for booking in &bookings {
            if let Some(customer_id) = booking.customer_id.as_deref() {
                *counts.entry(customer_id).or_insert(0) += 1;
            }
        }

        Ok(customers
            .into_iter()
            .filter(|c| matches_customer(c, query.search.as_deref()))
            .map(|c| {
                let count = counts.get(c.id.as_str()).copied().unwrap_or(0);
                (c, count)
            })
            .filter(|(_, count)| accepts_count(query.bookings, *count))
            .collect())
    }

    pub async fn list(&self, query: &CustomerListQuery) -> DashboardResult<CustomerListResponse> {
        info!("Listing customers {} to {}", query.range.from, query.range.to);
        let rows: Vec<CustomerRow> = self
            .filtered(query)
            .await?
            .iter()
            .map(|(customer, count)| to_row(customer, *count))
            .collect();
        let (customers, pagination) = paginate(&rows, query.page, CUSTOMER_PAGE_SIZE);
        Ok(CustomerListResponse { customers, pagination })
    }

    fn export_table(&self, customers: &[(Customer, usize)]) -> ExportTable {
        let mut table = ExportTable::new("Customers", &EXPORT_HEADERS);
        for (customer, count) in customers {
            let created = customer
                .created_time
                .map(|t| t.with_timezone(&self.calendar.offset()).format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| MISSING.to_string());
            table.push_row(vec![
                customer.id.as_str().into(),
                customer.display_name.clone().unwrap_or_default().into(),
                customer.email.clone().unwrap_or_default().into(),
                customer.preferred_phone().unwrap_or(MISSING).into(),
                (*count).into(),
                created.into(),
            ]);
        }
        table
    }

    /// Every filtered customer, not just one page
    pub async fn export(&self, query: &CustomerListQuery, format: ExportFormat) -> DashboardResult<ExportFile> {
        let customers = self.filtered(query).await?;
        info!("Exporting {} customers as {:?}", customers.len(), format);
        let table = self.export_table(&customers);
        let render_failed = |e| DashboardError::storage("Failed to export customers", e);
        match format {
            ExportFormat::Csv => Ok(ExportFile::csv(
                "customers.csv",
                table.to_csv(QuoteStyle::Necessary).map_err(render_failed)?,
            )),
            ExportFormat::Xlsx => Ok(ExportFile::xlsx("customers.xlsx", table.to_xlsx().map_err(render_failed)?)),
        }
    }

    async fn referrals_of(&self, customer_id: &str) -> DashboardResult<Referrals> {
        let load_failed = |e| {
            error!("Referral lookup failed: {:#}", e);
            DashboardError::storage("Failed to load referrals", e)
        };

        let referrer = self
            .customers
            .get_customer(customer_id)
            .await
            .map_err(load_failed)?
            .ok_or_else(|| DashboardError::NotFound(format!("Customer {} not found", customer_id)))?;

        let referral_code = match referrer.referral_code {
            Some(code) => code,
            None => {
                return Ok(Referrals {
                    referral_code: None,
                    customers: Vec::new(),
                })
            }
        };

        let referred = self
            .customers
            .list_referred_customers(&referral_code)
            .await
            .map_err(load_failed)?;
        let bookings = try_join_all(referred.iter().map(|c| self.bookings.list_customer_bookings(&c.id)))
            .await
            .map_err(load_failed)?;

        Ok(Referrals {
            referral_code: Some(referral_code),
            customers: referred.into_iter().zip(bookings).collect(),
        })
    }

    pub async fn referrals(&self, query: &ReferralQuery) -> DashboardResult<CustomerReferralsResponse> {
        info!("Loading referrals of customer {}", query.customer_id);
        let referrals = self.referrals_of(&query.customer_id).await?;

        let total_referrals = referrals.customers.len();
        let total_referral_bookings = referrals.customers.iter().map(|(_, b)| b.len()).sum();
        let total_referral_earnings = referrals.customers.iter().map(|(_, b)| completed_spend(b)).sum();

        let rows: Vec<ReferredCustomer> = referrals
            .customers
            .iter()
            .filter(|(c, _)| matches_referral(c, query.search.as_deref()))
            .map(|(customer, bookings)| ReferredCustomer {
                customer: to_row(customer, bookings.len()),
                bookings: bookings.iter().map(referral_booking).collect(),
            })
            .collect();
        let (referrals_page, pagination) = paginate(&rows, query.page, REFERRAL_PAGE_SIZE);

        Ok(CustomerReferralsResponse {
            referral_code: referrals.referral_code,
            total_referrals,
            total_referral_bookings,
            total_referral_earnings,
            referrals: referrals_page,
            pagination,
        })
    }

    /// Workbook of the referred customers matching `query.search`
    pub async fn export_referrals(&self, query: &ReferralQuery) -> DashboardResult<ExportFile> {
        let referrals = self.referrals_of(&query.customer_id).await?;
        let mut table = ExportTable::new(
            "Referrals",
            &[
                "Customer ID",
                "Name",
                "Email",
                "Phone",
                "Joined Date",
                "Total Bookings",
                "Completed Bookings",
                "Total Spent (₹)",
            ],
        );
        for (customer, bookings) in referrals
            .customers
            .iter()
            .filter(|(c, _)| matches_referral(c, query.search.as_deref()))
        {
            let joined = customer
                .created_time
                .map(|t| t.with_timezone(&self.calendar.offset()).format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();
            table.push_row(vec![
                customer.id.as_str().into(),
                customer
                    .display_name
                    .as_deref()
                    .or(customer.customer_name.as_deref())
                    .unwrap_or("")
                    .into(),
                customer.email.clone().unwrap_or_default().into(),
                customer.preferred_phone().unwrap_or("").into(),
                joined.into(),
                bookings.len().into(),
                bookings.iter().filter(|b| b.status.is_completed()).count().into(),
                completed_spend(bookings).into(),
            ]);
        }

        let bytes = table
            .to_xlsx()
            .map_err(|e| DashboardError::storage("Failed to export referrals", e))?;
        Ok(ExportFile::xlsx(&format!("referrals_{}.xlsx", query.customer_id), bytes))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::document::{Document, FieldValue};
    use crate::backend::storage::{DocumentConnection, MemoryDocumentStore};
    use chrono::{DateTime, TimeZone, Utc};
    use std::collections::BTreeMap;

    fn at(month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, month, day, 6, 0, 0).unwrap()
    }

    fn customer(id: &str, name: &str, created: DateTime<Utc>) -> Document {
        let mut roles = BTreeMap::new();
        roles.insert("customer".to_string(), FieldValue::Bool(true));
        Document::new("customer", id)
            .with("userType", roles)
            .with("display_name", name)
            .with("created_time", created)
    }

    fn booking(id: &str, customer: &str, status: &str, day: DateTime<Utc>, paid: i64) -> Document {
        Document::new("bookings", id)
            .with("customer_id", FieldValue::reference("customer", customer))
            .with("status", status)
            .with("date", day)
            .with("amount_paid", paid)
    }

    fn service() -> CustomerService<DocumentConnection> {
        let store = MemoryDocumentStore::new()
            .with_documents(vec![
                customer("c1", "Asha", at(4, 2)).with("referralCode", "ASHA10"),
                customer("c2", "Vikram", at(4, 5)).with("referralBy", "ASHA10").with("phone_number", "98765"),
                customer("c3", "Meera", at(4, 9)).with("referralBy", "ASHA10"),
                customer("c4", "Old", at(3, 1)),
                booking("b1", "c2", "Service_Completed", at(4, 6), 800),
                booking("b2", "c2", "Pending", at(4, 7), 0),
                booking("b3", "c3", "Service_Completed", at(4, 10), 1200),
                booking("b4", "c3", "Service_Completed", at(4, 11), 300),
                booking("b5", "c3", "Service_Completed", at(4, 12), 100),
            ])
            .unwrap();
        CustomerService::new(&DocumentConnection::in_memory(store), BusinessCalendar::default())
    }

    fn april_query(bookings: BookingCountFilter, search: Option<&str>) -> CustomerListQuery {
        CustomerListQuery {
            range: DateRange::new(
                NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 4, 30).unwrap(),
            )
            .unwrap(),
            search: search.map(str::to_string),
            bookings,
            page: None,
        }
    }

    #[tokio::test]
    async fn test_list_newest_first_with_booking_counts() {
        let response = service().list(&april_query(BookingCountFilter::All, None)).await.unwrap();
        let rows: Vec<(&str, usize)> = response
            .customers
            .iter()
            .map(|c| (c.id.as_str(), c.booking_count))
            .collect();
        assert_eq!(rows, vec![("c3", 3), ("c2", 2), ("c1", 0)]);
        assert_eq!(response.pagination.page_size, 20);
    }

    #[tokio::test]
    async fn test_booking_count_and_search_filters() {
        let service = service();
        let three_plus = service.list(&april_query(BookingCountFilter::TwoPlus, None)).await.unwrap();
        assert_eq!(three_plus.customers.len(), 1);
        assert_eq!(three_plus.customers[0].id, "c3");

        let none = service.list(&april_query(BookingCountFilter::Zero, None)).await.unwrap();
        assert_eq!(none.customers[0].id, "c1");

        let by_referrer = service.list(&april_query(BookingCountFilter::All, Some("asha10"))).await.unwrap();
        assert_eq!(by_referrer.customers.len(), 2);

        let by_phone = service.list(&april_query(BookingCountFilter::All, Some("9876"))).await.unwrap();
        assert_eq!(by_phone.customers[0].id, "c2");
    }

    #[tokio::test]
    async fn test_csv_export_has_every_filtered_customer() {
        let file = service()
            .export(&april_query(BookingCountFilter::All, None), ExportFormat::Csv)
            .await
            .unwrap();
        assert_eq!(file.filename, "customers.csv");
        let text = String::from_utf8(file.bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "ID,Name,Email,Phone,Bookings,Created");
        assert_eq!(lines.len(), 4);
        assert!(lines[2].starts_with("c2,Vikram,,98765,2,2025-04-05"));
    }

    #[tokio::test]
    async fn test_referrals_with_totals() {
        let query = ReferralQuery {
            customer_id: "c1".to_string(),
            search: None,
            page: None,
        };
        let response = service().referrals(&query).await.unwrap();

        assert_eq!(response.referral_code.as_deref(), Some("ASHA10"));
        assert_eq!(response.total_referrals, 2);
        assert_eq!(response.total_referral_bookings, 5);
        assert_eq!(response.total_referral_earnings, 2400.0);
        assert_eq!(response.pagination.page_size, 5);
    }

    #[tokio::test]
    async fn test_referrals_of_unknown_customer() {
        let query = ReferralQuery {
            customer_id: "nobody".to_string(),
            search: None,
            page: None,
        };
        let error = service().referrals(&query).await.unwrap_err();
        assert!(matches!(error, DashboardError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_customer_without_code_has_no_referrals() {
        let query = ReferralQuery {
            customer_id: "c2".to_string(),
            search: None,
            page: None,
        };
        let response = service().referrals(&query).await.unwrap();
        assert_eq!(response.referral_code, None);
        assert!(response.referrals.is_empty());
    }
}
