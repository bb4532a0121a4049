//! Rolling twelve-month profit and loss.
//!
//! Expenses come from the ledger sheet, income from payment-gateway
//! settlements. A month whose expenses exceed or equal its settlements is a
//! loss.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info};

use shared::{PnlMonth, PnlResponse, PnlStatus};

use crate::backend::domain::calendar::BusinessCalendar;
use crate::backend::domain::error::{DashboardError, DashboardResult};
use crate::backend::domain::expense_service::ExpenseService;
use crate::backend::domain::metrics::round_to;
use crate::backend::domain::month_key::YearMonth;
use crate::backend::storage::SettlementSource;

const MONTHS: i32 = 12;

#[derive(Clone)]
pub struct PnlService {
    expenses: ExpenseService,
    settlements: Arc<dyn SettlementSource>,
    calendar: BusinessCalendar,
}

impl PnlService {
    pub fn new(expenses: ExpenseService, settlements: Arc<dyn SettlementSource>, calendar: BusinessCalendar) -> Self {
        Self {
            expenses,
            settlements,
            calendar,
        }
    }

    pub async fn report(&self) -> DashboardResult<PnlResponse> {
        let current = self.calendar.current_month();
        let first = current.offset(-(MONTHS - 1));
        info!("Building P&L for {} to {}", first, current);

        let ledger = self.expenses.ledger().await.map_err(|e| {
            error!("Expense sheet fetch failed: {:#}", e);
            DashboardError::Internal(format!("{:#}", e))
        })?;
        let expense_by_month = ledger.monthly_totals(current.year());

        let from = self.calendar.start_of_day(first.first_day());
        let to = self.calendar.now_utc();
        let settlements = self.settlements.list_settlements(from, to).await.map_err(|e| {
            error!("Settlement listing failed: {:#}", e);
            DashboardError::Internal(format!("{:#}", e))
        })?;

        let mut settlement_by_month: BTreeMap<YearMonth, f64> = BTreeMap::new();
        for settlement in &settlements {
            *settlement_by_month
                .entry(self.calendar.month_of(settlement.created_at))
                .or_insert(0.0) += settlement.amount_rupees();
        }

        let data = first
            .through(current)
            .into_iter()
            .map(|month| {
                let expenses = expense_by_month.get(&month).copied().unwrap_or(0.0);
                let settled = settlement_by_month.get(&month).copied().unwrap_or(0.0);
                let net = expenses - settled;
                PnlMonth {
                    month: month.label(),
                    expenses: round_to(expenses, 2),
                    settlements: round_to(settled, 2),
                    net_pnl: round_to(net, 2),
                    status: if net >= 0.0 { PnlStatus::Loss } else { PnlStatus::Profit },
                }
            })
            .collect();

        Ok(PnlResponse { data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::models::Settlement;
    use crate::backend::storage::test_utils::{FakeSettlements, FakeSheets};
    use chrono::{TimeZone, Utc};

    fn service(settlements: Vec<Settlement>) -> PnlService {
        let sheets = FakeSheets::new("Month,Ads,Total\nMarch,\"5,000\",\"5,000\"\nApril 2026,100,100\nJan 25,1,1\n", "");
        let calendar = BusinessCalendar::default().with_fixed_now(Utc.with_ymd_and_hms(2026, 4, 15, 6, 0, 0).unwrap());
        PnlService::new(
            ExpenseService::new(Arc::new(sheets)),
            Arc::new(FakeSettlements { settlements }),
            calendar,
        )
    }

    fn settlement(id: &str, paise: i64, at: chrono::DateTime<Utc>) -> Settlement {
        Settlement {
            id: id.to_string(),
            amount_paise: paise,
            created_at: at,
        }
    }

    #[tokio::test]
    async fn test_twelve_months_ending_this_month() {
        let report = service(Vec::new()).report().await.unwrap();
        assert_eq!(report.data.len(), 12);
        assert_eq!(report.data[0].month, "May 2025");
        assert_eq!(report.data[11].month, "Apr 2026");
    }

    #[tokio::test]
    async fn test_net_and_status_per_month() {
        let settlements = vec![
            settlement("s1", 250_000, Utc.with_ymd_and_hms(2026, 3, 10, 0, 0, 0).unwrap()),
            settlement("s2", 100_050, Utc.with_ymd_and_hms(2026, 3, 20, 0, 0, 0).unwrap()),
            // 31 Mar 20:00 UTC is already April in IST
            settlement("s3", 50_000, Utc.with_ymd_and_hms(2026, 3, 31, 20, 0, 0).unwrap()),
        ];
        let report = service(settlements).report().await.unwrap();

        let march = &report.data[10];
        assert_eq!(march.month, "Mar 2026");
        assert_eq!(march.expenses, 5000.0);
        assert_eq!(march.settlements, 3500.5);
        assert_eq!(march.net_pnl, 1499.5);
        assert_eq!(march.status, PnlStatus::Loss);

        let april = &report.data[11];
        assert_eq!(april.settlements, 500.0);
        assert_eq!(april.net_pnl, -400.0);
        assert_eq!(april.status, PnlStatus::Profit);

        let empty = &report.data[0];
        assert_eq!(empty.net_pnl, 0.0);
        assert_eq!(empty.status, PnlStatus::Loss);
    }

    #[tokio::test]
    async fn test_unreachable_sheet_fails_the_report() {
        let calendar = BusinessCalendar::default();
        let service = PnlService::new(
            ExpenseService::new(Arc::new(FakeSheets::default())),
            Arc::new(FakeSettlements::default()),
            calendar,
        );
        assert!(service.report().await.is_err());
    }
}
