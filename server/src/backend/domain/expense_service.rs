//! Access to the published monthly expense ledger.

use anyhow::Result;
use std::sync::Arc;
use tracing::warn;

use shared::ExpenseBreakdown;

use crate::backend::domain::error::{DashboardError, DashboardResult};
use crate::backend::domain::expense_ledger::ExpenseLedger;
use crate::backend::storage::SheetSource;

#[derive(Clone)]
pub struct ExpenseService {
    sheets: Arc<dyn SheetSource>,
}

impl ExpenseService {
    pub fn new(sheets: Arc<dyn SheetSource>) -> Self {
        Self { sheets }
    }

    pub async fn ledger(&self) -> Result<ExpenseLedger> {
        let text = self.sheets.fetch_expense_sheet().await?;
        ExpenseLedger::parse(&text)
    }

    /// The ledger, or an empty one when the sheet cannot be read. Metrics
    /// that only use expenses as one input degrade to zero spend.
    pub async fn ledger_or_empty(&self) -> ExpenseLedger {
        match self.ledger().await {
            Ok(ledger) => ledger,
            Err(e) => {
                warn!("Expense sheet unavailable, treating expenses as zero: {:#}", e);
                ExpenseLedger::empty()
            }
        }
    }

    /// Category split of one ledger month
    pub async fn breakdown(&self, month: Option<&str>) -> DashboardResult<ExpenseBreakdown> {
        let ledger = self
            .ledger()
            .await
            .map_err(DashboardError::storage_with("Failed to fetch expense sheet"))?;
        Ok(ledger.breakdown(month))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::test_utils::FakeSheets;

    #[tokio::test]
    async fn test_missing_sheet_degrades_to_empty_ledger() {
        let service = ExpenseService::new(Arc::new(FakeSheets::default()));
        assert_eq!(service.ledger_or_empty().await.latest_total(), 0.0);
        assert!(service.breakdown(None).await.is_err());
    }

    #[tokio::test]
    async fn test_breakdown_of_named_month() {
        let sheets = FakeSheets::new("Month,Fuel,Ads,Total\nJan 25,250,750,1000\nFeb 25,100,100,200\n", "");
        let service = ExpenseService::new(Arc::new(sheets));

        let breakdown = service.breakdown(Some("Jan 25")).await.unwrap();
        assert_eq!(breakdown.total, 1000.0);
        assert_eq!(breakdown.slices[1].percentage, 75.0);
        assert_eq!(breakdown.months, vec!["Jan 25", "Feb 25"]);
    }
}
