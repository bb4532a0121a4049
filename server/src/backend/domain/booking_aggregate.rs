//! Status counts and revenue totals over a set of bookings.
//!
//! Every report that needs "how many bookings, how many completed, how much
//! was paid" folds its bookings through [`BookingAggregate`] instead of
//! issuing one query per status.

use crate::backend::domain::metrics::{customers_with_exactly_one, round_to};
use crate::backend::domain::models::{Booking, BookingStatus};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingAggregate {
    pub total: usize,
    pub pending: usize,
    pub accepted: usize,
    pub completed: usize,
    pub cancelled: usize,
    /// Sums over completed bookings only
    pub amount_paid: f64,
    pub wallet_used: f64,
    pub discounts: f64,
    /// Customers with exactly one completed booking in the set
    pub customers_with_one_completed: usize,
}

impl BookingAggregate {
    pub fn from_bookings(bookings: &[Booking]) -> Self {
        let mut aggregate = Self {
            total: bookings.len(),
            ..Self::default()
        };

        for booking in bookings {
            match &booking.status {
                BookingStatus::Pending => aggregate.pending += 1,
                BookingStatus::Accepted => aggregate.accepted += 1,
                BookingStatus::ServiceCompleted => {
                    aggregate.completed += 1;
                    aggregate.amount_paid += booking.amount_paid;
                    aggregate.wallet_used += booking.wallet_amount_used;
                    aggregate.discounts += booking.discount_amount;
                }
                status if status.is_cancelled() => aggregate.cancelled += 1,
                _ => {}
            }
        }

        aggregate.customers_with_one_completed = customers_with_exactly_one(
            bookings
                .iter()
                .filter(|b| b.status.is_completed())
                .map(|b| b.customer_id.as_deref()),
        );
        aggregate
    }

    /// Amount paid less wallet credit and discounts
    pub fn net_revenue(&self) -> f64 {
        self.amount_paid - self.wallet_used - self.discounts
    }

    pub fn total_offer_amount(&self) -> f64 {
        self.wallet_used + self.discounts
    }

    pub fn per_order_value(&self) -> f64 {
        if self.completed > 0 {
            self.amount_paid / self.completed as f64
        } else {
            0.0
        }
    }

    /// Completed share of all bookings in percent, one decimal
    pub fn completion_rate(&self) -> f64 {
        if self.total > 0 {
            round_to(self.completed as f64 / self.total as f64 * 100.0, 1)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booking(id: &str, status: &str, customer: &str, paid: f64) -> Booking {
        let mut booking = Booking::new(id, BookingStatus::parse(status));
        booking.customer_id = Some(customer.to_string());
        booking.amount_paid = paid;
        booking
    }

    #[test]
    fn test_counts_and_revenue_over_completed() {
        let mut discounted = booking("b2", "Service_Completed", "c2", 900.0);
        discounted.wallet_amount_used = 50.0;
        discounted.discount_amount = 100.0;

        let bookings = vec![
            booking("b1", "Service_Completed", "c1", 1000.0),
            discounted,
            booking("b3", "Pending", "c3", 500.0),
            booking("b4", "Accepted", "c3", 0.0),
            booking("b5", "Booking_Cancelled", "c4", 0.0),
            booking("b6", "Cancelled", "c4", 0.0),
        ];
        let aggregate = BookingAggregate::from_bookings(&bookings);

        assert_eq!(aggregate.total, 6);
        assert_eq!(aggregate.pending, 1);
        assert_eq!(aggregate.accepted, 1);
        assert_eq!(aggregate.completed, 2);
        assert_eq!(aggregate.cancelled, 2);
        assert_eq!(aggregate.amount_paid, 1900.0);
        assert_eq!(aggregate.net_revenue(), 1750.0);
        assert_eq!(aggregate.total_offer_amount(), 150.0);
        assert_eq!(aggregate.per_order_value(), 950.0);
        assert_eq!(aggregate.completion_rate(), 33.3);
        assert_eq!(aggregate.customers_with_one_completed, 2);
    }

    #[test]
    fn test_repeat_customers_are_not_counted_as_acquired() {
        let bookings = vec![
            booking("b1", "Service_Completed", "c1", 100.0),
            booking("b2", "Service_Completed", "c1", 100.0),
            booking("b3", "Pending", "c2", 100.0),
        ];
        let aggregate = BookingAggregate::from_bookings(&bookings);
        assert_eq!(aggregate.customers_with_one_completed, 0);
    }

    #[test]
    fn test_empty_set() {
        let aggregate = BookingAggregate::from_bookings(&[]);
        assert_eq!(aggregate.per_order_value(), 0.0);
        assert_eq!(aggregate.completion_rate(), 0.0);
    }
}
