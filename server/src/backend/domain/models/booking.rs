use chrono::{DateTime, Utc};
use std::fmt;

/// Lifecycle status of a booking as written by the consumer app.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BookingStatus {
    Pending,
    Accepted,
    ServiceCompleted,
    /// Written as `Booking_Cancelled` by the partner app
    BookingCancelled,
    /// Written as `Cancelled` by older app versions
    Cancelled,
    Other(String),
}

impl BookingStatus {
    /// Status names are matched case-insensitively; unknown names are kept verbatim.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "pending" => BookingStatus::Pending,
            "accepted" | "confirmed" => BookingStatus::Accepted,
            "service_completed" | "completed" => BookingStatus::ServiceCompleted,
            "booking_cancelled" => BookingStatus::BookingCancelled,
            "cancelled" => BookingStatus::Cancelled,
            _ => BookingStatus::Other(raw.trim().to_string()),
        }
    }

    /// Stored spelling, used for equality queries
    pub fn as_str(&self) -> &str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Accepted => "Accepted",
            BookingStatus::ServiceCompleted => "Service_Completed",
            BookingStatus::BookingCancelled => "Booking_Cancelled",
            BookingStatus::Cancelled => "Cancelled",
            BookingStatus::Other(raw) => raw.as_str(),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, BookingStatus::ServiceCompleted)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, BookingStatus::BookingCancelled | BookingStatus::Cancelled)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, BookingStatus::Pending)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One fuel bill uploaded by a partner against a booking
#[derive(Debug, Clone, PartialEq)]
pub struct FuelBill {
    /// 1 for the first bill of an entry, 2 for the second
    pub number: u8,
    pub image_url: String,
    pub amount: f64,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    pub id: String,
    pub status: BookingStatus,
    pub date: Option<DateTime<Utc>>,
    pub time_slot: Option<DateTime<Utc>>,
    pub customer_id: Option<String>,
    pub provider_id: Option<String>,
    pub provider_name: Option<String>,
    pub amount_paid: f64,
    pub wallet_amount_used: f64,
    pub discount_amount: f64,
    pub total_service_price: f64,
    pub tax_amount: f64,
    pub partner_fare: f64,
    pub otp: Option<i64>,
    /// Paths of the `subCategoryCart_id` references
    pub cart_refs: Vec<String>,
    pub fuel_bills: Vec<FuelBill>,
}

impl Booking {
    /// Empty booking with the given id and status, handy for fixtures and decoders
    pub fn new(id: &str, status: BookingStatus) -> Self {
        Self {
            id: id.to_string(),
            status,
            date: None,
            time_slot: None,
            customer_id: None,
            provider_id: None,
            provider_name: None,
            amount_paid: 0.0,
            wallet_amount_used: 0.0,
            discount_amount: 0.0,
            total_service_price: 0.0,
            tax_amount: 0.0,
            partner_fare: 0.0,
            otp: None,
            cart_refs: Vec::new(),
            fuel_bills: Vec::new(),
        }
    }
}
