//! Counters behind the header notification bell.

use futures::try_join;
use tracing::error;

use shared::NotificationCounts;

use crate::backend::domain::error::{DashboardError, DashboardResult};
use crate::backend::storage::{BookingStorage, ComplaintStorage, Connection};

#[derive(Clone)]
pub struct NotificationService<C: Connection> {
    bookings: C::BookingRepository,
    complaints: C::ComplaintRepository,
}

impl<C: Connection> NotificationService<C> {
    pub fn new(connection: &C) -> Self {
        Self {
            bookings: connection.create_booking_repository(),
            complaints: connection.create_complaint_repository(),
        }
    }

    pub async fn counts(&self) -> DashboardResult<NotificationCounts> {
        let (pending_bookings, pending_complaints) = try_join!(
            self.bookings.count_pending_bookings(),
            self.complaints.count_pending_complaints(),
        )
        .map_err(|e| {
            error!("Notification count query failed: {:#}", e);
            DashboardError::storage("Failed to load notifications", e)
        })?;

        Ok(NotificationCounts {
            pending_bookings,
            pending_complaints,
            total: pending_bookings + pending_complaints,
        })
    }
}
