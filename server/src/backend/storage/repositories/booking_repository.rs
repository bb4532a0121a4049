use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use super::{customer_ref, query_in_chunks, query_ordered};
use crate::backend::domain::calendar::TimeWindow;
use crate::backend::domain::models::{Booking, BookingStatus, FuelBill};
use crate::backend::storage::document::{Direction, Document, DocumentQuery, FieldValue};
use crate::backend::storage::traits::{BookingStorage, DocumentStore};

const BOOKINGS: &str = "bookings";

#[derive(Clone)]
pub struct BookingRepository {
    store: Arc<dyn DocumentStore>,
}

impl BookingRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

fn decode_fuel_bills(document: &Document) -> Vec<FuelBill> {
    let entries = match document.array("partnerFuel") {
        Some(entries) => entries,
        None => return Vec::new(),
    };

    let mut bills = Vec::new();
    for entry in entries {
        let fields = match entry {
            FieldValue::Map(fields) => fields,
            _ => continue,
        };
        let text = |key: &str| fields.get(key).and_then(FieldValue::as_str).unwrap_or("").to_string();
        let amount = |key: &str| fields.get(key).and_then(FieldValue::as_f64);

        for (number, image_key, amount_key, note_key) in [
            (1u8, "FirstBill", "FirstBillAmount", "FirstNote"),
            (2u8, "SecondBill", "SecondBillAmount", "SecondNote"),
        ] {
            let image_url = text(image_key);
            let bill_amount = amount(amount_key).filter(|a| *a != 0.0);
            if image_url.is_empty() && bill_amount.is_none() {
                continue;
            }
            bills.push(FuelBill {
                number,
                image_url,
                amount: bill_amount.unwrap_or(0.0),
                note: text(note_key),
            });
        }
    }
    bills
}

pub(crate) fn decode_booking(document: &Document) -> Booking {
    let status = document
        .text("status")
        .or_else(|| document.text("bookingStatus"))
        .map(|raw| BookingStatus::parse(&raw))
        .unwrap_or_else(|| BookingStatus::Other(String::new()));

    let mut booking = Booking::new(&document.id, status);
    booking.date = document.timestamp("date");
    booking.time_slot = document.timestamp("timeSlot");
    booking.customer_id = document
        .reference_id("customer_id")
        .or_else(|| document.reference_id("customer"));
    booking.provider_id = document.reference_id("provider_id");
    booking.provider_name = document.text("provider_name");
    booking.amount_paid = document.number("amount_paid");
    booking.wallet_amount_used = document.number("walletAmountUsed");
    booking.discount_amount = document.number("discount_amount");
    booking.total_service_price = document.number("totalservice_price");
    booking.tax_amount = document
        .opt_number("taxAmount")
        .filter(|t| *t != 0.0)
        .unwrap_or_else(|| document.number("tax_amount"));
    booking.partner_fare = document.number("partner_fare");
    booking.otp = document.opt_number("otp").map(|otp| otp as i64);
    booking.cart_refs = document.references("subCategoryCart_id");
    booking.fuel_bills = decode_fuel_bills(document);
    booking
}

#[async_trait]
impl BookingStorage for BookingRepository {
    async fn list_provider_bookings(&self, provider_ids: &[String], window: &TimeWindow) -> Result<Vec<Booking>> {
        let query = DocumentQuery::collection(BOOKINGS).where_between("date", window.start, window.end);
        let refs = provider_ids.iter().map(|id| customer_ref(id)).collect();
        let documents = query_in_chunks(self.store.as_ref(), &query, "provider_id", refs).await?;
        Ok(documents.iter().map(decode_booking).collect())
    }

    async fn list_bookings_between(&self, window: &TimeWindow) -> Result<Vec<Booking>> {
        let query = DocumentQuery::collection(BOOKINGS).where_between("date", window.start, window.end);
        let documents = self.store.run_query(&query).await?;
        Ok(documents.iter().map(decode_booking).collect())
    }

    async fn list_partner_bookings(&self, partner_id: &str, window: Option<&TimeWindow>) -> Result<Vec<Booking>> {
        let mut query = DocumentQuery::collection(BOOKINGS).where_eq("provider_id", customer_ref(partner_id));
        if let Some(window) = window {
            query = query.where_between("date", window.start, window.end);
        }
        let query = query.order_by("date", Direction::Descending);
        let documents = query_ordered(self.store.as_ref(), &query).await?;
        Ok(documents.iter().map(decode_booking).collect())
    }

    async fn list_customer_bookings(&self, customer_id: &str) -> Result<Vec<Booking>> {
        let query = DocumentQuery::collection(BOOKINGS).where_eq("customer_id", customer_ref(customer_id));
        let documents = self.store.run_query(&query).await?;
        Ok(documents.iter().map(decode_booking).collect())
    }

    async fn count_pending_bookings(&self) -> Result<usize> {
        let query = DocumentQuery::collection(BOOKINGS).where_eq("bookingStatus", "Pending");
        Ok(self.store.run_query(&query).await?.len())
    }
}
