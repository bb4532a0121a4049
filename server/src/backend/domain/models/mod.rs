//! Typed domain entities decoded from the document store and the external
//! feeds at the storage boundary.

pub mod activity;
pub mod booking;
pub mod customer;
pub mod partner;
pub mod wallet;

pub use activity::{AttendanceMark, AttendanceRecord, Complaint, Settlement};
pub use booking::{Booking, BookingStatus, FuelBill};
pub use customer::{Customer, UserRoles};
pub use partner::{PartnerStatus, ProviderAllowlist};
pub use wallet::{KitLoan, Payout, WalletCredit, WalletOverview};
