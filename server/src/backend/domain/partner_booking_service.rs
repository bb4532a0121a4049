//! Booking history of a single partner.

use futures::future::join_all;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::{error, info, warn};

use shared::{PartnerBookingRow, PartnerBookingStats, PartnerBookingsResponse};

use crate::backend::domain::calendar::BusinessCalendar;
use crate::backend::domain::commands::partners::PartnerBookingsQuery;
use crate::backend::domain::error::{DashboardError, DashboardResult};
use crate::backend::domain::metrics::{matches_search, paginate};
use crate::backend::domain::models::{Booking, Customer};
use crate::backend::storage::{BookingStorage, CatalogStorage, Connection, CustomerStorage};

pub const PARTNER_BOOKINGS_PAGE_SIZE: u32 = 10;
const UNKNOWN_SERVICE: &str = "Unknown Service";

fn bathroom_count() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?i)(\d+)\s*Bathroom").ok())
        .as_ref()
}

/// Jobs behind a list of service names. "3 Bathroom Cleaning" is three
/// jobs; any other service is one.
pub fn count_jobs(services: &[String]) -> u32 {
    services
        .iter()
        .map(|service| {
            bathroom_count()
                .and_then(|pattern| pattern.captures(service))
                .and_then(|captures| captures[1].parse::<u32>().ok())
                .unwrap_or(1)
        })
        .fold(0, u32::saturating_add)
}

struct Contact {
    name: String,
    phone: String,
}

impl Contact {
    fn of(customer: &Customer) -> Self {
        Self {
            name: customer
                .display_name
                .as_deref()
                .or(customer.customer_name.as_deref())
                .unwrap_or("Unknown")
                .to_string(),
            phone: customer.preferred_phone().unwrap_or("N/A").to_string(),
        }
    }

    fn unknown() -> Self {
        Self {
            name: "Unknown".to_string(),
            phone: "N/A".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct PartnerBookingService<C: Connection> {
    bookings: C::BookingRepository,
    customers: C::CustomerRepository,
    catalog: C::CatalogRepository,
    calendar: BusinessCalendar,
}

impl<C: Connection> PartnerBookingService<C> {
    pub fn new(connection: &C, calendar: BusinessCalendar) -> Self {
        Self {
            bookings: connection.create_booking_repository(),
            customers: connection.create_customer_repository(),
            catalog: connection.create_catalog_repository(),
            calendar,
        }
    }

    async fn services_of(&self, booking: &Booking) -> Vec<String> {
        let mut names = Vec::new();
        for cart in &booking.cart_refs {
            match self.catalog.cart_service_names(cart).await {
                Ok(found) => names.extend(found),
                Err(e) => warn!("Cart lookup for booking {} failed: {:#}", booking.id, e),
            }
        }
        if names.is_empty() {
            names.push(UNKNOWN_SERVICE.to_string());
        }
        names
    }

    async fn contacts(&self, bookings: &[Booking]) -> HashMap<String, Contact> {
        let ids: Vec<String> = bookings.iter().filter_map(|b| b.customer_id.clone()).collect();
        if ids.is_empty() {
            return HashMap::new();
        }
        match self.customers.get_customers(&ids).await {
            Ok(customers) => customers.iter().map(|c| (c.id.clone(), Contact::of(c))).collect(),
            Err(e) => {
                warn!("Customer lookup for partner bookings failed: {:#}", e);
                HashMap::new()
            }
        }
    }

    pub async fn bookings(&self, query: &PartnerBookingsQuery) -> DashboardResult<PartnerBookingsResponse> {
        info!("Loading bookings of partner {}", query.partner_id);
        let window = query.range.as_ref().map(|range| self.calendar.window(range));
        let bookings = self
            .bookings
            .list_partner_bookings(&query.partner_id, window.as_ref())
            .await
            .map_err(|e| {
                error!("Partner booking query failed: {:#}", e);
                DashboardError::storage("Failed to load partner bookings", e)
            })?;

        let services = join_all(bookings.iter().map(|b| self.services_of(b))).await;
        let contacts = self.contacts(&bookings).await;
        let unknown = Contact::unknown();

        let completed: Vec<usize> = (0..bookings.len())
            .filter(|&i| bookings[i].status.is_completed())
            .collect();
        let stats = PartnerBookingStats {
            total: bookings.len(),
            completed: completed.len(),
            pending: bookings.iter().filter(|b| b.status.is_pending()).count(),
            revenue: completed.iter().map(|&i| bookings[i].amount_paid).sum(),
            total_jobs: completed
                .iter()
                .map(|&i| count_jobs(&services[i]))
                .fold(0, u32::saturating_add),
        };

        let status_filter = query
            .status
            .as_deref()
            .map(str::to_lowercase)
            .filter(|s| !s.is_empty() && s.as_str() != "all");

        let rows: Vec<PartnerBookingRow> = bookings
            .iter()
            .zip(services)
            .filter_map(|(booking, services)| {
                let contact = booking
                    .customer_id
                    .as_deref()
                    .and_then(|id| contacts.get(id))
                    .unwrap_or(&unknown);
                let status = booking.status.to_string();

                if let Some(wanted) = &status_filter {
                    if status.to_lowercase() != *wanted {
                        return None;
                    }
                }
                let otp = booking.otp.map(|otp| otp.to_string());
                let joined_services = services.join(" ");
                let searchable = [
                    Some(booking.id.as_str()),
                    Some(status.as_str()),
                    Some(joined_services.as_str()),
                    otp.as_deref(),
                    Some(contact.name.as_str()),
                    Some(contact.phone.as_str()),
                ];
                if !matches_search(query.search.as_deref(), searchable.into_iter().flatten()) {
                    return None;
                }

                Some(PartnerBookingRow {
                    id: booking.id.clone(),
                    status,
                    date: booking.date.map(|d| d.to_rfc3339()),
                    time_slot: booking.time_slot.map(|t| t.to_rfc3339()),
                    services,
                    customer_name: contact.name.clone(),
                    customer_phone: contact.phone.clone(),
                    amount_paid: booking.amount_paid,
                    otp: booking.otp,
                })
            })
            .collect();

        let (bookings, pagination) = paginate(&rows, query.page, PARTNER_BOOKINGS_PAGE_SIZE);
        Ok(PartnerBookingsResponse {
            bookings,
            stats,
            pagination,
        })
    }
}
