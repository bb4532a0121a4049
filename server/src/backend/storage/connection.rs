use std::sync::Arc;

use crate::backend::storage::memory::MemoryDocumentStore;
use crate::backend::storage::repositories::{
    AttendanceMarkRepository, BookingRepository, CatalogRepository, ComplaintRepository, CustomerRepository,
    WalletRepository,
};
use crate::backend::storage::traits::{Connection, DocumentStore};

/// Connection to a document database, whichever backend serves it
#[derive(Clone)]
pub struct DocumentConnection {
    store: Arc<dyn DocumentStore>,
}

impl DocumentConnection {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Connection backed by an in-memory store
    pub fn in_memory(store: MemoryDocumentStore) -> Self {
        Self::new(Arc::new(store))
    }

    pub fn store(&self) -> Arc<dyn DocumentStore> {
        Arc::clone(&self.store)
    }
}

impl Connection for DocumentConnection {
    type BookingRepository = BookingRepository;
    type CustomerRepository = CustomerRepository;
    type CatalogRepository = CatalogRepository;
    type WalletRepository = WalletRepository;
    type ComplaintRepository = ComplaintRepository;
    type AttendanceMarkRepository = AttendanceMarkRepository;

    fn create_booking_repository(&self) -> Self::BookingRepository {
        BookingRepository::new(self.store())
    }

    fn create_customer_repository(&self) -> Self::CustomerRepository {
        CustomerRepository::new(self.store())
    }

    fn create_catalog_repository(&self) -> Self::CatalogRepository {
        CatalogRepository::new(self.store())
    }

    fn create_wallet_repository(&self) -> Self::WalletRepository {
        WalletRepository::new(self.store())
    }

    fn create_complaint_repository(&self) -> Self::ComplaintRepository {
        ComplaintRepository::new(self.store())
    }

    fn create_attendance_mark_repository(&self) -> Self::AttendanceMarkRepository {
        AttendanceMarkRepository::new(self.store())
    }
}
