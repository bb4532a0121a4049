//! Wire types shared between the dashboard API and its clients.
//!
//! Field names serialize in camelCase because the dashboard front end
//! consumes them directly.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Common
// ---------------------------------------------------------------------------

/// Inclusive `YYYY-MM-DD` date range taken from the query string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateRangeRequest {
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Page metadata for in-memory paginated listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// 1-based page number actually served
    pub page: u32,
    pub page_size: u32,
    pub total_items: usize,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Booking ledger sheet
// ---------------------------------------------------------------------------

/// One row of the published booking ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetBooking {
    /// `<raw Date cell>-<row index>`
    pub id: String,
    /// ISO date (`YYYY-MM-DD`)
    pub booking_date: String,
    pub customer_name: String,
    pub service: String,
    pub phone: String,
    pub address: String,
    pub partner_name: String,
    pub source: String,
    pub amount: f64,
    pub arrive_time: String,
    pub status: String,
    pub feedback: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetDebugInfo {
    pub fields: Vec<String>,
    /// Column index of the service price, `-1` when no header matched
    pub service_price_index: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetBookingsResponse {
    pub debug: SheetDebugInfo,
    pub data: Vec<SheetBooking>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetBookingStats {
    pub total_bookings: usize,
    pub total_revenue: f64,
    pub top_partner: String,
    pub top_lead_source: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetBookingTableRequest {
    pub from: Option<String>,
    pub to: Option<String>,
    pub search: Option<String>,
    pub page: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetBookingTableResponse {
    pub bookings: Vec<SheetBooking>,
    pub pagination: PageInfo,
}

// ---------------------------------------------------------------------------
// Profit & loss
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PnlStatus {
    Loss,
    Profit,
}

/// One month of the rolling twelve-month P&L
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PnlMonth {
    /// Display label, e.g. `Jan 2026`
    pub month: String,
    pub expenses: f64,
    pub settlements: f64,
    /// Expenses minus settlements; positive means the month lost money
    #[serde(rename = "netPnL")]
    pub net_pnl: f64,
    pub status: PnlStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PnlResponse {
    pub data: Vec<PnlMonth>,
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingStats {
    pub total_bookings: usize,
    pub total_bookings_change: f64,
    pub pending_bookings: usize,
    pub confirmed_bookings: usize,
    pub completed_bookings: usize,
    pub completed_bookings_change: f64,
    pub cancelled_bookings: usize,
    pub total_revenue: f64,
    pub total_revenue_change: f64,
    pub net_revenue: f64,
    pub net_revenue_change: f64,
    pub per_order_value: f64,
    pub per_order_value_change: f64,
    pub total_customers: usize,
    pub total_customers_change: f64,
    pub average_rating: f64,
    pub total_ratings_count: usize,
    pub completion_rate: f64,
    pub total_offer_amount: f64,
    pub cac: f64,
    pub cac_change: f64,
    #[serde(rename = "netPnL")]
    pub net_pnl: f64,
}

/// Booking counts per service category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryBookings {
    #[serde(rename = "Cleaning")]
    pub cleaning: usize,
    #[serde(rename = "Electrical")]
    pub electrical: usize,
    #[serde(rename = "Security")]
    pub security: usize,
    #[serde(rename = "Driver")]
    pub driver: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeDirection {
    Up,
    Down,
    Flat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyCacPoint {
    /// `YYYY-MM`
    pub key: String,
    pub month_label: String,
    pub marketing_expense: f64,
    pub customers_with_one_booking: usize,
    pub cac: f64,
    /// Month-over-month change in percent; `None` for the first point
    pub change_pct: Option<f64>,
    pub change_dir: ChangeDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacSeriesResponse {
    pub data: Vec<MonthlyCacPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingInfo {
    pub customer: String,
    pub service: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCount {
    pub name: String,
    pub count: usize,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyOverview {
    pub date: String,
    pub daily_average_expense: f64,
    pub total_bookings: usize,
    pub total_booking_amount: f64,
    pub bookings: Vec<BookingInfo>,
    pub services: Vec<ServiceCount>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseBreakdownRequest {
    /// Month label exactly as written in the sheet; latest row when absent
    pub month: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseSlice {
    pub name: String,
    pub value: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseBreakdown {
    pub months: Vec<String>,
    pub selected_month: Option<String>,
    pub total: f64,
    pub slices: Vec<ExpenseSlice>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationCounts {
    pub pending_bookings: usize,
    pub pending_complaints: usize,
    pub total: usize,
}

// ---------------------------------------------------------------------------
// Marketing metrics and the WhatsApp report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketingMetrics {
    pub completed_bookings: usize,
    pub cancelled_bookings: usize,
    pub total_amount_paid: f64,
    pub total_booking_amount: f64,
    pub net_profit: f64,
    pub margin_percentage: f64,
    pub avg_order_value: f64,
    pub customer_acquisition_cost: f64,
    pub category_bookings: CategoryBookings,
    pub total_complaints: usize,
    pub resolved_complaints: usize,
}

/// A report cell as sent by the dashboard: either a number or preformatted text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReportValue {
    Number(serde_json::Number),
    Text(String),
}

impl Default for ReportValue {
    fn default() -> Self {
        ReportValue::Text("0".to_string())
    }
}

impl fmt::Display for ReportValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportValue::Number(n) => write!(f, "{}", n),
            ReportValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for ReportValue {
    fn from(value: f64) -> Self {
        match serde_json::Number::from_f64(value) {
            Some(n) => ReportValue::Number(n),
            None => ReportValue::default(),
        }
    }
}

impl From<usize> for ReportValue {
    fn from(value: usize) -> Self {
        ReportValue::Number(serde_json::Number::from(value as u64))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WhatsAppReportRequest {
    pub completed_bookings: ReportValue,
    pub cancelled_bookings: ReportValue,
    pub total_amount_paid: ReportValue,
    pub net_profit: ReportValue,
    pub margin_percentage: ReportValue,
    pub avg_order_value: ReportValue,
    pub customer_acquisition_cost: ReportValue,
    pub cleaning: ReportValue,
    pub electrical: ReportValue,
    pub security: ReportValue,
    pub driver: ReportValue,
    pub total_complaints: ReportValue,
    pub resolved_complaints: ReportValue,
    pub total_booking_amount: ReportValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhatsAppReportResponse {
    pub success: bool,
    pub message: String,
    pub data: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Customers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingCountFilter {
    #[default]
    #[serde(rename = "all")]
    All,
    #[serde(rename = "0")]
    Zero,
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
    /// Three or more bookings
    #[serde(rename = "2plus")]
    TwoPlus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerListRequest {
    pub from: Option<String>,
    pub to: Option<String>,
    pub search: Option<String>,
    pub bookings: Option<BookingCountFilter>,
    pub page: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRow {
    pub id: String,
    pub uid: Option<String>,
    pub display_name: String,
    pub customer_name: String,
    pub email: String,
    pub phone: String,
    pub booking_count: usize,
    /// RFC 3339
    pub created_time: Option<String>,
    pub referral_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerListResponse {
    pub customers: Vec<CustomerRow>,
    pub pagination: PageInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferralListRequest {
    pub search: Option<String>,
    pub page: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralBooking {
    pub id: String,
    pub status: String,
    pub date: Option<String>,
    pub amount_paid: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferredCustomer {
    pub customer: CustomerRow,
    pub bookings: Vec<ReferralBooking>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerReferralsResponse {
    pub referral_code: Option<String>,
    pub total_referrals: usize,
    pub total_referral_bookings: usize,
    pub total_referral_earnings: f64,
    pub referrals: Vec<ReferredCustomer>,
    pub pagination: PageInfo,
}

// ---------------------------------------------------------------------------
// Partners
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartnerType {
    Provider,
    Agency,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartnerTypeFilter {
    #[default]
    All,
    Provider,
    Agency,
}

/// Whether to list every partner or only the configured allowlist
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartnerScope {
    #[default]
    All,
    Specific,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartnerListRequest {
    pub from: Option<String>,
    pub to: Option<String>,
    pub search: Option<String>,
    #[serde(rename = "type")]
    pub partner_type: Option<PartnerTypeFilter>,
    pub scope: Option<PartnerScope>,
    /// Onboarding status name, `All` for no filter
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerRow {
    pub id: String,
    pub display_name: String,
    pub phone_number: String,
    #[serde(rename = "type")]
    pub partner_type: PartnerType,
    /// RFC 3339
    pub join_date: String,
    pub status: String,
    pub service_opt_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartnerListResponse {
    pub partners: Vec<PartnerRow>,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopPartner {
    pub id: String,
    pub name: String,
    pub completed_bookings: usize,
    pub total_bookings: usize,
    pub avg_rating: f64,
    pub earnings: f64,
    pub pending_payouts: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartnerBookingsRequest {
    pub from: Option<String>,
    pub to: Option<String>,
    pub search: Option<String>,
    /// Booking status (case-insensitive), `all` for no filter
    pub status: Option<String>,
    pub page: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerBookingRow {
    pub id: String,
    pub status: String,
    pub date: Option<String>,
    pub time_slot: Option<String>,
    pub services: Vec<String>,
    pub customer_name: String,
    pub customer_phone: String,
    pub amount_paid: f64,
    pub otp: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerBookingStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub revenue: f64,
    pub total_jobs: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartnerBookingsResponse {
    pub bookings: Vec<PartnerBookingRow>,
    pub stats: PartnerBookingStats,
    pub pagination: PageInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerEarningsRequest {
    pub from: Option<String>,
    pub to: Option<String>,
    pub page: Option<u32>,
    pub payout_page: Option<u32>,
    /// How many months to shift the six-month chart into the past
    pub month_offset: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletCreditRow {
    pub id: String,
    pub amount: f64,
    pub date: String,
    pub booking_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutRow {
    pub id: String,
    pub amount: f64,
    pub date: String,
    pub status: String,
    pub note: String,
    pub deduction_type: String,
    pub payout_ids: Vec<String>,
    pub booking_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyEarning {
    pub month: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerEarningsResponse {
    pub total_earnings_overall: f64,
    pub current_balance: f64,
    pub pending_payouts: f64,
    pub loan_recovered_amount: f64,
    pub net_earnings_overall: f64,
    pub this_month_earnings: f64,
    pub monthly_growth: f64,
    pub filtered_earnings: f64,
    pub filtered_net_earnings: f64,
    pub chart: Vec<MonthlyEarning>,
    pub credits: Vec<WalletCreditRow>,
    pub credits_pagination: PageInfo,
    pub payouts: Vec<PayoutRow>,
    pub payouts_pagination: PageInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelBillRow {
    pub bill_number: u8,
    pub bill_image: String,
    pub bill_amount: f64,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingFuelExpense {
    pub booking_id: String,
    pub booking_date: String,
    pub partner_name: String,
    pub bills: Vec<FuelBillRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerFuelResponse {
    pub expenses: Vec<BookingFuelExpense>,
    pub total_expense: f64,
    pub total_bills: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRequest {
    /// Partner name as registered with the attendance provider
    pub name: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub page: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRow {
    pub employee_id: i64,
    pub employee_name: String,
    pub mobile_no: String,
    pub assigned_ward: String,
    pub attendance_date: String,
    pub in_time: String,
    pub out_time: Option<String>,
    pub in_address: String,
    pub out_address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceKpis {
    pub present: usize,
    pub missing_out: usize,
    pub avg_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartnerAttendanceResponse {
    pub records: Vec<AttendanceRow>,
    pub kpis: AttendanceKpis,
    pub pagination: PageInfo,
}
