use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use super::{customer_ref, query_ordered};
use crate::backend::domain::models::{KitLoan, Payout, WalletCredit, WalletOverview};
use crate::backend::storage::document::{Direction, Document, DocumentQuery, FieldValue};
use crate::backend::storage::traits::{DocumentStore, WalletStorage};

const WALLET_OVERALL: &str = "Wallet_Overall";
const KIT_LOANS: &str = "PartnerKitLoan";
const WALLET_CREDITS: &str = "Wallet_In_record";
const WALLET_PAYOUTS: &str = "Wallet_Transaction_record";

#[derive(Clone)]
pub struct WalletRepository {
    store: Arc<dyn DocumentStore>,
}

impl WalletRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    async fn first_for_partner(&self, collection: &str, field: &str, partner_id: &str) -> Result<Option<Document>> {
        let query = DocumentQuery::collection(collection)
            .where_eq(field, customer_ref(partner_id))
            .limit(1);
        Ok(self.store.run_query(&query).await?.into_iter().next())
    }
}

fn decode_credit(document: &Document) -> WalletCredit {
    WalletCredit {
        id: document.id.clone(),
        amount: document.number("payment_in_wallet"),
        credited_at: document.timestamp("Timestamp"),
        booking_id: document.reference_id("bookingId"),
    }
}

fn decode_payout(document: &Document) -> Payout {
    let payout_ids = document
        .array("payout_id")
        .map(|values| {
            values
                .iter()
                .map(FieldValue::to_display_string)
                .filter(|id| !id.is_empty())
                .collect()
        })
        .unwrap_or_default();

    Payout {
        id: document.id.clone(),
        amount: document.number("PAyment_out_fromWallet"),
        spent_at: document.timestamp("spend_date"),
        status: document.text("PaymentStatus"),
        note: document.text("Note"),
        deduction_type: document.text("DetuctionType"),
        payout_ids,
        booking_id: document.reference_id("bookingId"),
    }
}

#[async_trait]
impl WalletStorage for WalletRepository {
    async fn get_wallet_overview(&self, partner_id: &str) -> Result<Option<WalletOverview>> {
        let document = self
            .first_for_partner(WALLET_OVERALL, "service_partner_id", partner_id)
            .await?;
        Ok(document.map(|d| WalletOverview {
            total_earned: d.number("TotalAmountComeIn_Wallet"),
            current_balance: d.number("total_balance"),
            pending_amount: d.number("pending_amount"),
        }))
    }

    async fn get_kit_loan(&self, partner_id: &str) -> Result<Option<KitLoan>> {
        let document = self.first_for_partner(KIT_LOANS, "partnerId", partner_id).await?;
        Ok(document.map(|d| KitLoan {
            id: d.id.clone(),
            recovered_amount: d.number("loanRecoveredAmount"),
        }))
    }

    async fn list_wallet_credits(&self, partner_id: &str, limit: u32) -> Result<Vec<WalletCredit>> {
        let query = DocumentQuery::collection(WALLET_CREDITS)
            .where_eq("partnerId", customer_ref(partner_id))
            .order_by("Timestamp", Direction::Descending)
            .limit(limit);
        let documents = query_ordered(self.store.as_ref(), &query).await?;
        Ok(documents.iter().map(decode_credit).collect())
    }

    async fn list_payouts(&self, partner_id: &str, limit: u32) -> Result<Vec<Payout>> {
        let query = DocumentQuery::collection(WALLET_PAYOUTS)
            .where_eq("partnerId", customer_ref(partner_id))
            .order_by("spend_date", Direction::Descending)
            .limit(limit);
        let documents = query_ordered(self.store.as_ref(), &query).await?;
        Ok(documents.iter().map(decode_payout).collect())
    }
}
