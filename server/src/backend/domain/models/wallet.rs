use chrono::{DateTime, Utc};

/// Running wallet totals for a partner (`Wallet_Overall`)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WalletOverview {
    pub total_earned: f64,
    pub current_balance: f64,
    pub pending_amount: f64,
}

/// Money credited to a partner wallet (`Wallet_In_record`)
#[derive(Debug, Clone, PartialEq)]
pub struct WalletCredit {
    pub id: String,
    pub amount: f64,
    pub credited_at: Option<DateTime<Utc>>,
    pub booking_id: Option<String>,
}

/// Money paid out of a partner wallet (`Wallet_Transaction_record`)
#[derive(Debug, Clone, PartialEq)]
pub struct Payout {
    pub id: String,
    /// Signed amount as stored; some records keep payouts negative
    pub amount: f64,
    pub spent_at: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub note: Option<String>,
    pub deduction_type: Option<String>,
    pub payout_ids: Vec<String>,
    pub booking_id: Option<String>,
}

/// Partner kit loan (`PartnerKitLoan`)
#[derive(Debug, Clone, PartialEq)]
pub struct KitLoan {
    pub id: String,
    pub recovered_amount: f64,
}
