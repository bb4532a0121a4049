//! # REST API Interface Layer
//!
//! HTTP endpoints of the operations dashboard.
//! This layer handles:
//! - query string and JSON deserialization into the `shared` DTOs
//! - mapping DTOs to domain queries (dates resolved in business time)
//! - translating domain errors to HTTP status codes
//! - request logging
//!
//! ## Design Principles
//!
//! - **Read Only**: every endpoint reads; exports are generated on the fly
//! - **Consistent Error Format**: failures render as `{"error": "..."}`
//! - **Domain Separation**: pure translation layer without business logic

pub mod errors;
pub mod mappers;

pub mod booking_apis;
pub mod customer_apis;
pub mod dashboard_apis;
pub mod marketing_apis;
pub mod notification_apis;
pub mod partner_apis;
pub mod pnl_apis;
pub mod report_apis;
