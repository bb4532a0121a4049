//! Operations dashboard API: bookings, P&L, marketing, customers and partners.

pub mod backend;
