//! # Storage Traits
//!
//! Abstractions between the domain services and the data sources they read.
//!
//! - [`DocumentStore`] is the raw query interface every document backend
//!   implements (Firestore REST, in-memory).
//! - The `*Storage` traits are typed repositories. They build queries, decode
//!   documents into domain models and hide collection and field names from
//!   the services.
//! - [`Connection`] hands out repositories, so services stay generic over the
//!   backend just like they are over any other storage.
//! - The gateway traits cover the non-document sources: published sheets,
//!   the settlement API, the attendance API and the WhatsApp API.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::backend::domain::calendar::TimeWindow;
use crate::backend::domain::models::{
    AttendanceMark, AttendanceRecord, Booking, Complaint, Customer, KitLoan, Payout, Settlement,
    WalletCredit, WalletOverview,
};
use crate::backend::storage::document::{Document, DocumentQuery};

/// Raw read access to a document database
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Run a single-collection query
    async fn run_query(&self, query: &DocumentQuery) -> Result<Vec<Document>>;

    /// Fetch one document by its `collection/id` path
    async fn get_document(&self, path: &str) -> Result<Option<Document>>;
}

/// Bookings (`bookings` collection)
#[async_trait]
pub trait BookingStorage: Send + Sync {
    /// Bookings of the given providers dated within `window`, any status
    async fn list_provider_bookings(&self, provider_ids: &[String], window: &TimeWindow) -> Result<Vec<Booking>>;

    /// Every booking dated within `window`
    async fn list_bookings_between(&self, window: &TimeWindow) -> Result<Vec<Booking>>;

    /// Bookings assigned to one partner, newest first
    async fn list_partner_bookings(&self, partner_id: &str, window: Option<&TimeWindow>) -> Result<Vec<Booking>>;

    /// Bookings placed by one customer
    async fn list_customer_bookings(&self, customer_id: &str) -> Result<Vec<Booking>>;

    /// Bookings whose `bookingStatus` is still pending
    async fn count_pending_bookings(&self) -> Result<usize>;
}

/// Customer documents, partners included (`customer` collection)
#[async_trait]
pub trait CustomerStorage: Send + Sync {
    async fn get_customer(&self, id: &str) -> Result<Option<Customer>>;

    /// Documents with the given ids; unknown ids are skipped
    async fn get_customers(&self, ids: &[String]) -> Result<Vec<Customer>>;

    /// Customers flagged as such and created within `window`, newest first
    async fn list_customers_created_between(&self, window: &TimeWindow) -> Result<Vec<Customer>>;

    /// Every provider or agency partner, each listed once
    async fn list_partners(&self) -> Result<Vec<Customer>>;

    /// Customers whose `referralBy` equals `referral_code`
    async fn list_referred_customers(&self, referral_code: &str) -> Result<Vec<Customer>>;
}

/// Service catalog lookups (`cart`, `service_subcategories`, categories)
#[async_trait]
pub trait CatalogStorage: Send + Sync {
    /// Category name behind a booking's cart reference: cart, then its
    /// `service_subCategory`, then that document's `name`
    async fn category_name_for_cart(&self, cart_path: &str) -> Result<Option<String>>;

    /// Service names of the cart lines pointing at `cart_path`
    async fn cart_service_names(&self, cart_path: &str) -> Result<Vec<String>>;

    /// Names of `service_subcategories` documents by id
    async fn subcategory_names(&self, ids: &[String]) -> Result<HashMap<String, String>>;
}

/// Partner wallets, payouts and kit loans
#[async_trait]
pub trait WalletStorage: Send + Sync {
    async fn get_wallet_overview(&self, partner_id: &str) -> Result<Option<WalletOverview>>;

    async fn get_kit_loan(&self, partner_id: &str) -> Result<Option<KitLoan>>;

    /// Most recent wallet credits, newest first
    async fn list_wallet_credits(&self, partner_id: &str, limit: u32) -> Result<Vec<WalletCredit>>;

    /// Most recent payouts and deductions, newest first
    async fn list_payouts(&self, partner_id: &str, limit: u32) -> Result<Vec<Payout>>;
}

/// Customer complaints (`customer_complain`)
#[async_trait]
pub trait ComplaintStorage: Send + Sync {
    async fn list_complaints_between(&self, window: &TimeWindow) -> Result<Vec<Complaint>>;

    async fn count_pending_complaints(&self) -> Result<usize>;
}

/// Partner check-ins written by the partner app (`partner_attendence`)
#[async_trait]
pub trait AttendanceMarkStorage: Send + Sync {
    /// Present marks whose start time (or date) falls within `window`
    async fn list_present_marks(&self, window: &TimeWindow) -> Result<Vec<AttendanceMark>>;
}

/// Trait for connection types that can create repositories
///
/// Services are generic over the connection, so the same service code runs
/// against Firestore in production and the in-memory store in tests.
pub trait Connection: Send + Sync + Clone {
    type BookingRepository: BookingStorage;
    type CustomerRepository: CustomerStorage;
    type CatalogRepository: CatalogStorage;
    type WalletRepository: WalletStorage;
    type ComplaintRepository: ComplaintStorage;
    type AttendanceMarkRepository: AttendanceMarkStorage;

    fn create_booking_repository(&self) -> Self::BookingRepository;
    fn create_customer_repository(&self) -> Self::CustomerRepository;
    fn create_catalog_repository(&self) -> Self::CatalogRepository;
    fn create_wallet_repository(&self) -> Self::WalletRepository;
    fn create_complaint_repository(&self) -> Self::ComplaintRepository;
    fn create_attendance_mark_repository(&self) -> Self::AttendanceMarkRepository;
}

/// Published Google Sheets, fetched as CSV text
#[async_trait]
pub trait SheetSource: Send + Sync {
    async fn fetch_expense_sheet(&self) -> Result<String>;
    async fn fetch_booking_sheet(&self) -> Result<String>;
}

/// Payment-gateway settlements
#[async_trait]
pub trait SettlementSource: Send + Sync {
    /// Settlements created within `[from, to]`
    async fn list_settlements(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<Settlement>>;
}

/// Third-party attendance feed for field partners
#[async_trait]
pub trait AttendanceSource: Send + Sync {
    /// Records between two `YYYY-MM-DD` dates, inclusive; everything the
    /// feed holds when no range is given
    async fn fetch_attendance(&self, range: Option<(&str, &str)>) -> Result<Vec<AttendanceRecord>>;
}

/// Outcome of a WhatsApp API call
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

impl GatewayResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// WhatsApp Business messaging provider
#[async_trait]
pub trait MessageGateway: Send + Sync {
    /// Whether an API key is available
    fn is_configured(&self) -> bool;

    /// Post a template message payload
    async fn send_template(&self, payload: &serde_json::Value) -> Result<GatewayResponse>;
}
