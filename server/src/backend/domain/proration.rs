//! Spreads monthly expense totals over arbitrary reporting ranges.
//!
//! A month's total is divided evenly across its days; a range receives one
//! daily share for every calendar day it shares with the month.

use std::collections::BTreeMap;

use crate::backend::domain::calendar::DateRange;
use crate::backend::domain::month_key::YearMonth;

/// Portion of `month_total` that falls inside `range`
pub fn prorate_monthly_expense_for_range(month_total: f64, month: YearMonth, range: &DateRange) -> f64 {
    let days_in_month = month.days_in_month();
    if days_in_month == 0 {
        return 0.0;
    }
    let overlap = DateRange::month(month).overlap_days(range);
    if overlap <= 0 {
        return 0.0;
    }
    overlap as f64 * month_total / days_in_month as f64
}

/// Sum of every month's prorated share of `range`
pub fn prorated_expense(monthly_totals: &BTreeMap<YearMonth, f64>, range: &DateRange) -> f64 {
    monthly_totals
        .iter()
        .map(|(month, total)| prorate_monthly_expense_for_range(*total, *month, range))
        .sum()
}
