//! # Storage Module
//!
//! Every data source the dashboard reads from.
//!
//! ## Key Responsibilities
//!
//! - **Document access**: [`DocumentStore`] backends for Firestore (REST) and
//!   an in-memory store for tests and local runs
//! - **Typed repositories**: decode documents into domain models so nothing
//!   above this layer sees raw fields
//! - **External feeds**: published sheets, settlements, attendance and the
//!   WhatsApp API behind small gateway traits
//!
//! The domain layer depends only on the traits in [`traits`]; which backend
//! serves them is decided once in `initialize_backend`.

pub mod connection;
pub mod document;
pub mod firestore;
pub mod http;
pub mod memory;
pub mod repositories;
pub mod traits;

#[cfg(test)]
pub mod test_utils;

pub use connection::DocumentConnection;
pub use memory::MemoryDocumentStore;
pub use traits::*;
