//! Per-booking profit estimate.
//!
//! ```text
//! booking amount = total service price + tax
//! partner payout = partner fare - partner GST
//! gross revenue  = booking amount - partner payout
//! deductions     = payout fee on payout + gateway fee and commission on booking amount
//! net profit     = gross revenue - deductions
//! ```

use crate::backend::domain::models::Booking;

/// Percentages applied by the profit formula, as fractions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfitRates {
    /// GST withheld from the partner fare
    pub partner_gst: f64,
    /// Transfer fee on the partner payout
    pub payout_fee: f64,
    /// Payment gateway fee on the booking amount
    pub gateway_fee: f64,
    /// Platform commission on the booking amount
    pub commission: f64,
}

impl Default for ProfitRates {
    fn default() -> Self {
        Self {
            partner_gst: 0.06,
            payout_fee: 0.0236,
            gateway_fee: 0.0236,
            commission: 0.05,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BookingProfit {
    pub booking_amount: f64,
    pub partner_payout: f64,
    pub gross_revenue: f64,
    pub deductions: f64,
    pub net_profit: f64,
}

pub fn booking_profit(total_service_price: f64, tax_amount: f64, partner_fare: f64, rates: &ProfitRates) -> BookingProfit {
    let booking_amount = total_service_price + tax_amount;
    let partner_payout = partner_fare - partner_fare * rates.partner_gst;
    let gross_revenue = booking_amount - partner_payout;
    let deductions = partner_payout * rates.payout_fee
        + booking_amount * rates.gateway_fee
        + booking_amount * rates.commission;

    BookingProfit {
        booking_amount,
        partner_payout,
        gross_revenue,
        deductions,
        net_profit: gross_revenue - deductions,
    }
}

/// Running totals over a set of bookings
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProfitSummary {
    pub bookings: usize,
    pub amount_paid: f64,
    pub total_booking_amount: f64,
    pub net_profit: f64,
}

impl ProfitSummary {
    pub fn from_bookings<'a>(bookings: impl IntoIterator<Item = &'a Booking>, rates: &ProfitRates) -> Self {
        let mut summary = Self::default();
        for booking in bookings {
            summary.add(booking, rates);
        }
        summary
    }

    pub fn add(&mut self, booking: &Booking, rates: &ProfitRates) {
        let profit = booking_profit(booking.total_service_price, booking.tax_amount, booking.partner_fare, rates);
        self.bookings += 1;
        self.amount_paid += booking.amount_paid;
        self.total_booking_amount += profit.booking_amount;
        self.net_profit += profit.net_profit;
    }

    /// Net profit as a percentage of the booking amount, 0 without revenue
    pub fn margin_percentage(&self) -> f64 {
        if self.total_booking_amount > 0.0 {
            self.net_profit / self.total_booking_amount * 100.0
        } else {
            0.0
        }
    }

    pub fn average_order_value(&self) -> f64 {
        if self.bookings > 0 {
            self.total_booking_amount / self.bookings as f64
        } else {
            0.0
        }
    }
}
