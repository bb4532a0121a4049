//! # Backend Module
//!
//! Everything behind the dashboard's HTTP API.
//!
//! This module serves as the orchestration layer that brings together:
//! - **Domain**: dashboard metrics, listings and exports
//! - **Storage**: the document store and the external HTTP feeds
//! - **IO**: the REST interface the dashboard front end calls
//!
//! ## Architecture
//!
//! ```text
//! Dashboard front end
//!     ↓
//! IO Layer (axum routers, handlers)
//!     ↓
//! Domain Layer (services, calculations)
//!     ↓
//! Storage Layer (Firestore or in-memory documents, sheets, Razorpay,
//!                attendance API, MSG91)
//! ```
//!
//! ## Key Responsibilities
//!
//! - Build every service once from [`AppConfig`] and share them through
//!   [`AppState`]
//! - Set up the REST router with CORS and request tracing
//! - Keep the provider allowlist, clock and rates explicit instead of global

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::{Context, Result};
use axum::{
    http::{HeaderValue, Method},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::backend::config::{AppConfig, DataBackend};
use crate::backend::domain::calendar::BusinessCalendar;
use crate::backend::domain::models::ProviderAllowlist;
use crate::backend::domain::{
    AttendanceService, CacService, CustomerService, DailyOverviewService, DashboardService, EarningsService,
    ExpenseService, FuelService, MarketingService, NotificationService, PartnerBookingService, PartnerService,
    PnlService, ProfitRates, ReportService, ReportTemplate, SheetBookingService,
};
use crate::backend::storage::firestore::FirestoreRestStore;
use crate::backend::storage::http::{AttendanceApiClient, Msg91Client, PublishedSheets, RazorpayClient};
use crate::backend::storage::{
    AttendanceSource, DocumentConnection, MemoryDocumentStore, MessageGateway, SettlementSource, SheetSource,
};

/// External feeds the services read from or send to
#[derive(Clone)]
pub struct Gateways {
    pub sheets: Arc<dyn SheetSource>,
    pub settlements: Arc<dyn SettlementSource>,
    pub attendance: Arc<dyn AttendanceSource>,
    pub messages: Arc<dyn MessageGateway>,
}

/// Business settings every service is built with
#[derive(Debug, Clone)]
pub struct BusinessSettings {
    pub calendar: BusinessCalendar,
    pub allowlist: ProviderAllowlist,
    pub profit_rates: ProfitRates,
    pub report_template: ReportTemplate,
}

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub calendar: BusinessCalendar,
    pub sheet_booking_service: SheetBookingService,
    pub expense_service: ExpenseService,
    pub pnl_service: PnlService,
    pub dashboard_service: DashboardService<DocumentConnection>,
    pub cac_service: CacService<DocumentConnection>,
    pub daily_overview_service: DailyOverviewService<DocumentConnection>,
    pub marketing_service: MarketingService<DocumentConnection>,
    pub report_service: ReportService,
    pub notification_service: NotificationService<DocumentConnection>,
    pub customer_service: CustomerService<DocumentConnection>,
    pub partner_service: PartnerService<DocumentConnection>,
    pub partner_booking_service: PartnerBookingService<DocumentConnection>,
    pub earnings_service: EarningsService<DocumentConnection>,
    pub fuel_service: FuelService<DocumentConnection>,
    pub attendance_service: AttendanceService,
}

impl AppState {
    pub fn new(connection: &DocumentConnection, gateways: Gateways, settings: BusinessSettings) -> Self {
        let BusinessSettings {
            calendar,
            allowlist,
            profit_rates,
            report_template,
        } = settings;
        let expense_service = ExpenseService::new(Arc::clone(&gateways.sheets));

        Self {
            sheet_booking_service: SheetBookingService::new(Arc::clone(&gateways.sheets)),
            pnl_service: PnlService::new(expense_service.clone(), gateways.settlements, calendar.clone()),
            dashboard_service: DashboardService::new(
                connection,
                expense_service.clone(),
                allowlist.clone(),
                calendar.clone(),
            ),
            cac_service: CacService::new(connection, expense_service.clone(), allowlist.clone(), calendar.clone()),
            daily_overview_service: DailyOverviewService::new(connection, expense_service.clone(), calendar.clone()),
            marketing_service: MarketingService::new(
                connection,
                expense_service.clone(),
                allowlist.clone(),
                profit_rates,
                calendar.clone(),
            ),
            report_service: ReportService::new(gateways.messages, report_template, calendar.clone()),
            notification_service: NotificationService::new(connection),
            customer_service: CustomerService::new(connection, calendar.clone()),
            partner_service: PartnerService::new(connection, allowlist, calendar.clone()),
            partner_booking_service: PartnerBookingService::new(connection, calendar.clone()),
            earnings_service: EarningsService::new(connection, calendar.clone()),
            fuel_service: FuelService::new(connection, calendar.clone()),
            attendance_service: AttendanceService::new(gateways.attendance),
            expense_service,
            calendar,
        }
    }
}

/// Initialize the backend with all required services
pub fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    let http = reqwest::Client::builder()
        .user_agent(concat!("ops-dashboard/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("failed to build HTTP client")?;

    info!("Setting up document store");
    let connection = match &config.data_backend {
        DataBackend::Firestore { project_id, base_url } => {
            info!("Using Firestore project {}", project_id);
            DocumentConnection::new(Arc::new(FirestoreRestStore::new(
                http.clone(),
                base_url,
                project_id,
                config.firestore_auth.clone(),
            )))
        }
        DataBackend::Memory => {
            info!("Using an empty in-memory document store");
            DocumentConnection::in_memory(MemoryDocumentStore::new())
        }
    };

    info!("Setting up external feeds");
    let gateways = Gateways {
        sheets: Arc::new(PublishedSheets::new(
            http.clone(),
            &config.expense_sheet_url,
            &config.booking_sheet_url,
        )),
        settlements: Arc::new(RazorpayClient::new(http.clone(), &config.razorpay_url, config.razorpay.clone())),
        attendance: Arc::new(AttendanceApiClient::new(http.clone(), &config.attendance_api_url)),
        messages: Arc::new(Msg91Client::new(http, &config.msg91_url, config.msg91_auth_key.clone())),
    };

    info!("Setting up domain services");
    let settings = BusinessSettings {
        calendar: BusinessCalendar::from_offset_minutes(config.utc_offset_minutes)?,
        allowlist: config.provider_ids.clone(),
        profit_rates: config.profit_rates,
        report_template: config.report_template.clone(),
    };

    Ok(AppState::new(&connection, gateways, settings))
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, cors_origin: &str) -> Result<Router> {
    let origin = cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("invalid CORS origin {:?}", cors_origin))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let api_routes = Router::new()
        .nest("/bookings", io::rest::booking_apis::router())
        .nest("/pnl", io::rest::pnl_apis::router())
        .nest("/dashboard", io::rest::dashboard_apis::router())
        .nest("/marketing", io::rest::marketing_apis::router())
        .nest("/whatsapp", io::rest::report_apis::router())
        .nest("/notifications", io::rest::notification_apis::router())
        .nest("/customers", io::rest::customer_apis::router())
        .nest("/partners", io::rest::partner_apis::router());

    Ok(Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state))
}
