//! Clients for the HTTP data sources that are not document databases.

pub mod attendance_api;
pub mod msg91;
pub mod razorpay;
pub mod sheets;

pub use attendance_api::AttendanceApiClient;
pub use msg91::Msg91Client;
pub use razorpay::{RazorpayClient, RazorpayCredentials};
pub use sheets::PublishedSheets;
