//! Service categories shown on the dashboard.

use std::collections::HashMap;
use tracing::warn;

use shared::CategoryBookings;

use crate::backend::domain::models::Booking;
use crate::backend::storage::CatalogStorage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceCategory {
    Cleaning,
    Electrical,
    Security,
    Driver,
}

impl ServiceCategory {
    /// Map a catalog category name onto a dashboard category
    pub fn classify(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        if name.contains("clean") {
            Some(ServiceCategory::Cleaning)
        } else if name.contains("elec") {
            Some(ServiceCategory::Electrical)
        } else if name.contains("security") {
            Some(ServiceCategory::Security)
        } else if name.contains("driver") {
            Some(ServiceCategory::Driver)
        } else {
            None
        }
    }
}

fn record(counts: &mut CategoryBookings, category: ServiceCategory) {
    match category {
        ServiceCategory::Cleaning => counts.cleaning += 1,
        ServiceCategory::Electrical => counts.electrical += 1,
        ServiceCategory::Security => counts.security += 1,
        ServiceCategory::Driver => counts.driver += 1,
    }
}

/// Count bookings per category through their cart reference.
///
/// Each cart is resolved once per call. Bookings without a cart, with an
/// unresolvable cart or with an unknown category are skipped.
pub async fn count_categories<S>(catalog: &S, bookings: &[Booking]) -> CategoryBookings
where
    S: CatalogStorage + ?Sized,
{
    let mut cache: HashMap<String, Option<ServiceCategory>> = HashMap::new();
    let mut counts = CategoryBookings::default();

    for booking in bookings {
        let cart = match booking.cart_refs.first() {
            Some(cart) => cart,
            None => continue,
        };

        let category = match cache.get(cart) {
            Some(category) => *category,
            None => {
                let category = match catalog.category_name_for_cart(cart).await {
                    Ok(name) => name.as_deref().and_then(ServiceCategory::classify),
                    Err(e) => {
                        warn!("Category lookup for booking {} failed: {}", booking.id, e);
                        None
                    }
                };
                cache.insert(cart.clone(), category);
                category
            }
        };

        if let Some(category) = category {
            record(&mut counts, category);
        }
    }
    counts
}
