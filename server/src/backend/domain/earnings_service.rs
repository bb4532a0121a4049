//! # Partner Earnings
//!
//! Wallet view of one partner: lifetime totals from `Wallet_Overall`, the
//! most recent wallet credits and payouts, month-over-month growth and a
//! six-month earnings chart.
//!
//! Lifetime totals ignore the requested date range. The range only narrows
//! the credit and payout tables and the "filtered" earnings figures.

use chrono::{DateTime, Utc};
use futures::try_join;
use std::cmp::Reverse;
use tracing::{error, info};

use shared::{MonthlyEarning, PartnerEarningsResponse, PayoutRow, WalletCreditRow};

use crate::backend::domain::calendar::{BusinessCalendar, DateRange};
use crate::backend::domain::commands::partners::PartnerEarningsQuery;
use crate::backend::domain::error::{DashboardError, DashboardResult};
use crate::backend::domain::metrics::{paginate, percent_change, round_to};
use crate::backend::domain::models::{Payout, WalletCredit};
use crate::backend::domain::month_key::YearMonth;
use crate::backend::storage::{Connection, WalletStorage};

pub const EARNINGS_PAGE_SIZE: u32 = 10;
/// Most recent wallet records read per partner
pub const WALLET_RECORD_LIMIT: u32 = 200;
const CHART_MONTHS: i32 = 6;

/// A wallet movement with its effective instant
struct Dated<T> {
    at: DateTime<Utc>,
    record: T,
}

#[derive(Clone)]
pub struct EarningsService<C: Connection> {
    wallets: C::WalletRepository,
    calendar: BusinessCalendar,
}

impl<C: Connection> EarningsService<C> {
    pub fn new(connection: &C, calendar: BusinessCalendar) -> Self {
        Self {
            wallets: connection.create_wallet_repository(),
            calendar,
        }
    }

    fn in_range(&self, at: DateTime<Utc>, range: Option<&DateRange>) -> bool {
        range.map_or(true, |range| range.contains(self.calendar.local_date(at)))
    }

    /// Credits with a positive amount, newest first. Undated credits count as now.
    fn credits(&self, credits: Vec<WalletCredit>) -> Vec<Dated<WalletCredit>> {
        let now = self.calendar.now_utc();
        let mut dated: Vec<Dated<WalletCredit>> = credits
            .into_iter()
            .filter(|c| c.amount > 0.0)
            .map(|record| Dated {
                at: record.credited_at.unwrap_or(now),
                record,
            })
            .collect();
        dated.sort_by_key(|c| Reverse(c.at));
        dated
    }

    /// Non-zero payouts as positive amounts, newest first
    fn payouts(&self, payouts: Vec<Payout>) -> Vec<Dated<Payout>> {
        let now = self.calendar.now_utc();
        let mut dated: Vec<Dated<Payout>> = payouts
            .into_iter()
            .filter(|p| p.amount != 0.0)
            .map(|mut record| {
                record.amount = record.amount.abs();
                Dated {
                    at: record.spent_at.unwrap_or(now),
                    record,
                }
            })
            .collect();
        dated.sort_by_key(|p| Reverse(p.at));
        dated
    }

    fn earned_in(&self, credits: &[Dated<WalletCredit>], month: YearMonth) -> f64 {
        credits
            .iter()
            .filter(|c| self.calendar.month_of(c.at) == month)
            .map(|c| c.record.amount)
            .sum()
    }

    /// Six months ending `month_offset` months before the current one
    fn chart(&self, credits: &[Dated<WalletCredit>], month_offset: u32) -> Vec<MonthlyEarning> {
        let last = self.calendar.current_month().offset(-(month_offset as i32));
        last.offset(1 - CHART_MONTHS)
            .through(last)
            .into_iter()
            .map(|month| MonthlyEarning {
                month: month.label(),
                amount: self.earned_in(credits, month),
            })
            .collect()
    }

    pub async fn earnings(&self, query: &PartnerEarningsQuery) -> DashboardResult<PartnerEarningsResponse> {
        info!("Loading earnings of partner {}", query.partner_id);
        let partner_id = query.partner_id.as_str();

        let (overview, kit_loan, credits, payouts) = try_join!(
            self.wallets.get_wallet_overview(partner_id),
            self.wallets.get_kit_loan(partner_id),
            self.wallets.list_wallet_credits(partner_id, WALLET_RECORD_LIMIT),
            self.wallets.list_payouts(partner_id, WALLET_RECORD_LIMIT),
        )
        .map_err(|e| {
            error!("Earnings query for partner {} failed: {:#}", partner_id, e);
            DashboardError::storage("Failed to load partner earnings", e)
        })?;

        let overview = overview.unwrap_or_default();
        let loan_recovered_amount = kit_loan.map(|loan| loan.recovered_amount).unwrap_or(0.0);
        let credits = self.credits(credits);
        let payouts = self.payouts(payouts);

        let current = self.calendar.current_month();
        let this_month_earnings = self.earned_in(&credits, current);
        let last_month_earnings = self.earned_in(&credits, current.pred());

        let range = query.range.as_ref();
        let filtered_credits: Vec<WalletCreditRow> = credits
            .iter()
            .filter(|c| self.in_range(c.at, range))
            .map(|c| WalletCreditRow {
                id: c.record.id.clone(),
                amount: c.record.amount,
                date: c.at.to_rfc3339(),
                booking_id: c.record.booking_id.clone(),
            })
            .collect();
        let filtered_payouts: Vec<PayoutRow> = payouts
            .iter()
            .filter(|p| self.in_range(p.at, range))
            .map(|p| PayoutRow {
                id: p.record.id.clone(),
                amount: p.record.amount,
                date: p.at.to_rfc3339(),
                status: p.record.status.clone().unwrap_or_else(|| "Completed".to_string()),
                note: p.record.note.clone().unwrap_or_default(),
                deduction_type: p.record.deduction_type.clone().unwrap_or_default(),
                payout_ids: p.record.payout_ids.clone(),
                booking_id: p.record.booking_id.clone(),
            })
            .collect();
        let filtered_earnings: f64 = filtered_credits.iter().map(|c| c.amount).sum();

        let (credits_page, credits_pagination) = paginate(&filtered_credits, query.page, EARNINGS_PAGE_SIZE);
        let (payouts_page, payouts_pagination) = paginate(&filtered_payouts, query.payout_page, EARNINGS_PAGE_SIZE);

        Ok(PartnerEarningsResponse {
            total_earnings_overall: overview.total_earned,
            current_balance: overview.current_balance,
            pending_payouts: overview.pending_amount,
            loan_recovered_amount,
            net_earnings_overall: overview.total_earned + loan_recovered_amount,
            this_month_earnings,
            monthly_growth: round_to(percent_change(this_month_earnings, last_month_earnings), 1),
            filtered_earnings,
            filtered_net_earnings: filtered_earnings + loan_recovered_amount,
            chart: self.chart(&credits, query.month_offset),
            credits: credits_page,
            credits_pagination,
            payouts: payouts_page,
            payouts_pagination,
        })
    }
}
