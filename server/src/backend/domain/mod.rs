//! # Domain Module
//!
//! Business logic of the operations dashboard.
//!
//! Services here turn booking, customer, partner and wallet documents plus
//! the external feeds (expense and booking sheets, settlements, attendance)
//! into the figures the dashboard shows. They depend on storage only through
//! the `Connection` trait and the gateway traits, so every service runs the
//! same against Firestore or the in-memory store.
//!
//! ## Module Organization
//!
//! - **calendar / month_key**: business timezone, date ranges and the
//!   spreadsheet month-label parser
//! - **metrics / proration / profit**: pure calculations shared by services
//! - **expense_ledger / booking_sheet**: parsers for the published sheets
//! - **booking_aggregate / category**: one parameterized booking aggregation
//!   and the cart → subcategory → category resolver
//! - **\*_service**: one service per dashboard area
//! - **export_service**: CSV and XLSX rendering of tabular exports
//! - **commands**: resolved query types handed from the REST layer
//! - **models**: typed entities decoded at the storage boundary
//!
//! ## Business Rules
//!
//! - Booking figures are scoped to the configured provider allowlist unless
//!   an operation says otherwise
//! - Days and months are counted in the business timezone, not UTC
//! - Marketing spend is prorated by overlapping days when a range cuts
//!   through a ledger month
//! - Divisions with an empty denominator report 0, never NaN

pub mod attendance_service;
pub mod booking_aggregate;
pub mod booking_sheet;
pub mod cac_service;
pub mod calendar;
pub mod category;
pub mod commands;
pub mod customer_service;
pub mod daily_overview_service;
pub mod dashboard_service;
pub mod earnings_service;
pub mod error;
pub mod expense_ledger;
pub mod expense_service;
pub mod export_service;
pub mod fuel_service;
pub mod marketing_service;
pub mod metrics;
pub mod models;
pub mod month_key;
pub mod notification_service;
pub mod partner_booking_service;
pub mod partner_service;
pub mod pnl_service;
pub mod profit;
pub mod proration;
pub mod report_service;
pub mod sheet_booking_service;

pub use attendance_service::AttendanceService;
pub use cac_service::CacService;
pub use calendar::{BusinessCalendar, DateRange};
pub use customer_service::{CustomerService, ExportFormat};
pub use daily_overview_service::DailyOverviewService;
pub use dashboard_service::DashboardService;
pub use earnings_service::EarningsService;
pub use error::{DashboardError, DashboardResult};
pub use expense_service::ExpenseService;
pub use export_service::ExportFile;
pub use fuel_service::FuelService;
pub use marketing_service::MarketingService;
pub use notification_service::NotificationService;
pub use partner_booking_service::PartnerBookingService;
pub use partner_service::PartnerService;
pub use pnl_service::PnlService;
pub use profit::ProfitRates;
pub use report_service::{ReportService, ReportTemplate};
pub use sheet_booking_service::SheetBookingService;
