//! # IO Module
//!
//! Interface layer between the dashboard front end and the domain services.
//!
//! Handlers translate query strings and JSON bodies into domain queries,
//! call one service and render its result. Business rules stay in the
//! domain layer.
//!
//! ## Key Responsibilities
//!
//! - **API Endpoints**: one axum router per dashboard area
//! - **Request Mapping**: resolving date parameters and filters into domain
//!   query types
//! - **Error Translation**: rendering [`DashboardError`] as a status code and
//!   a `{"error": ...}` body
//! - **Attachments**: serving CSV and XLSX exports as downloads
//!
//! ## Supported Operations
//!
//! - **/api/bookings/sheet**: booking ledger rows, stats and table
//! - **/api/pnl**: twelve-month profit and loss
//! - **/api/dashboard/\***: booking stats, categories, CAC series, daily
//!   overview, expense breakdown
//! - **/api/marketing/today** and **/api/whatsapp**: daily metrics and the
//!   WhatsApp report
//! - **/api/notifications**: pending booking and complaint counts
//! - **/api/customers/\***: customer listing, exports and referrals
//! - **/api/partners/\***: partner listing, top partners and per-partner
//!   bookings, earnings, fuel and attendance
//!
//! [`DashboardError`]: crate::backend::domain::error::DashboardError

pub mod rest;

pub use rest::*;
