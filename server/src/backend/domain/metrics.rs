//! Small numeric helpers shared by the reporting services.

use std::collections::HashMap;

use shared::{ChangeDirection, PageInfo};

/// Round half away from zero to `places` decimals
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Relative change in percent. A zero baseline yields 100 when the
/// current value is positive and 0 otherwise.
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        if current > 0.0 {
            100.0
        } else {
            0.0
        }
    } else {
        (current - previous) / previous * 100.0
    }
}

pub fn change_direction(change: f64) -> ChangeDirection {
    if change > 0.0 {
        ChangeDirection::Up
    } else if change < 0.0 {
        ChangeDirection::Down
    } else {
        ChangeDirection::Flat
    }
}

/// Number of distinct customers that appear exactly once
pub fn customers_with_exactly_one<'a>(customer_ids: impl IntoIterator<Item = Option<&'a str>>) -> usize {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for id in customer_ids.into_iter().flatten() {
        *counts.entry(id).or_insert(0) += 1;
    }
    counts.values().filter(|count| **count == 1).count()
}

/// Marketing spend per acquired customer, 0 when nobody was acquired
pub fn customer_acquisition_cost(marketing_expense: f64, acquired_customers: usize) -> f64 {
    if acquired_customers > 0 {
        marketing_expense / acquired_customers as f64
    } else {
        0.0
    }
}

/// Slice one page out of `items`. Pages are 1-based and clamped to the
/// available range.
pub fn paginate<T: Clone>(items: &[T], page: Option<u32>, page_size: u32) -> (Vec<T>, PageInfo) {
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size as usize) as u32;
    let page = page.unwrap_or(1).clamp(1, total_pages.max(1));

    let start = ((page - 1) * page_size) as usize;
    let end = (start + page_size as usize).min(total_items);
    let slice = if start < total_items {
        items[start..end].to_vec()
    } else {
        Vec::new()
    };

    let info = PageInfo {
        page,
        page_size,
        total_items,
        total_pages,
        has_next: page < total_pages,
        has_prev: page > 1,
    };
    (slice, info)
}

/// Case-insensitive substring match over a set of fields; an empty term matches everything
pub fn matches_search<'a>(term: Option<&str>, fields: impl IntoIterator<Item = &'a str>) -> bool {
    let term = match term.map(str::trim).filter(|t| !t.is_empty()) {
        Some(term) => term.to_lowercase(),
        None => return true,
    };
    fields
        .into_iter()
        .any(|field| field.to_lowercase().contains(&term))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_change_with_zero_baseline() {
        assert_eq!(percent_change(50.0, 0.0), 100.0);
        assert_eq!(percent_change(0.0, 0.0), 0.0);
        assert_eq!(percent_change(150.0, 100.0), 50.0);
        assert_eq!(percent_change(50.0, 100.0), -50.0);
    }

    #[test]
    fn test_customers_with_exactly_one() {
        let ids = vec![Some("a"), Some("b"), Some("a"), None, Some("c")];
        assert_eq!(customers_with_exactly_one(ids), 2);
        assert_eq!(customers_with_exactly_one(Vec::<Option<&str>>::new()), 0);
    }

    #[test]
    fn test_cac_is_zero_without_acquired_customers() {
        assert_eq!(customer_acquisition_cost(5000.0, 0), 0.0);
        assert_eq!(customer_acquisition_cost(5000.0, 4), 1250.0);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(12.346, 2), 12.35);
        assert_eq!(round_to(-1.25, 1), -1.3);
        assert_eq!(round_to(7.0, 2), 7.0);
    }

    #[test]
    fn test_paginate_clamps_pages() {
        let items: Vec<u32> = (1..=23).collect();

        let (page, info) = paginate(&items, Some(3), 10);
        assert_eq!(page, vec![21, 22, 23]);
        assert_eq!(info.total_pages, 3);
        assert!(!info.has_next);
        assert!(info.has_prev);

        let (page, info) = paginate(&items, Some(99), 10);
        assert_eq!(info.page, 3);
        assert_eq!(page.len(), 3);

        let (page, info) = paginate(&items, Some(0), 10);
        assert_eq!(info.page, 1);
        assert_eq!(page.first(), Some(&1));
    }

    #[test]
    fn test_paginate_empty() {
        let (page, info) = paginate::<u32>(&[], None, 10);
        assert!(page.is_empty());
        assert_eq!(info.page, 1);
        assert_eq!(info.total_pages, 0);
        assert!(!info.has_next);
    }

    #[test]
    fn test_matches_search() {
        assert!(matches_search(None, ["anything"]));
        assert!(matches_search(Some("  "), ["anything"]));
        assert!(matches_search(Some("ASHA"), ["", "asha verma"]));
        assert!(!matches_search(Some("ravi"), ["asha", "9876"]));
    }
}
