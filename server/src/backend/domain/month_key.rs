//! Calendar months and the parser for the free-text month labels used in the
//! expense ledger ("Jan 26", "January 2026", "2026-01", ...).

use chrono::{Datelike, Months, NaiveDate};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

const MONTH_NAMES: [&str; 12] = [
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december",
];

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Two-digit years below this value land in the 2000s, the rest in the 1900s
pub const TWO_DIGIT_YEAR_PIVOT: i32 = 50;

/// A calendar month, stored as its first day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth(NaiveDate);

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(YearMonth)
    }

    /// Month containing `date`
    pub fn of(date: NaiveDate) -> Self {
        YearMonth(date.with_day(1).unwrap_or(date))
    }

    /// Parse a canonical `YYYY-MM` key
    pub fn parse_key(key: &str) -> Option<Self> {
        let (year, month) = key.trim().split_once('-')?;
        if year.len() != 4 || month.len() != 2 {
            return None;
        }
        Self::new(year.parse().ok()?, month.parse().ok()?)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    pub fn last_day(&self) -> NaiveDate {
        self.succ().first_day().pred_opt().unwrap_or(self.0)
    }

    pub fn days_in_month(&self) -> u32 {
        days_in_month(self.month(), self.year())
    }

    /// Shift by `months`, saturating at the ends of the supported date range
    pub fn offset(&self, months: i32) -> Self {
        let shifted = if months >= 0 {
            self.0.checked_add_months(Months::new(months as u32))
        } else {
            self.0.checked_sub_months(Months::new(months.unsigned_abs()))
        };
        YearMonth(shifted.unwrap_or(self.0))
    }

    pub fn succ(&self) -> Self {
        self.offset(1)
    }

    pub fn pred(&self) -> Self {
        self.offset(-1)
    }

    /// Canonical `YYYY-MM` key
    pub fn key(&self) -> String {
        format!("{:04}-{:02}", self.year(), self.month())
    }

    /// Short display label, e.g. `Jan 2026`
    pub fn label(&self) -> String {
        month_label(self.year(), self.month())
    }

    /// Every month from `self` through `last`, inclusive
    pub fn through(self, last: YearMonth) -> Vec<YearMonth> {
        let mut months = Vec::new();
        let mut cursor = self;
        while cursor <= last {
            months.push(cursor);
            let next = cursor.succ();
            if next == cursor {
                break;
            }
            cursor = next;
        }
        months
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

/// Number of days in a month (1-12); 0 for an invalid month
pub fn days_in_month(month: u32, year: i32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

/// `Jan 2026` style label; empty month name for an invalid month
pub fn month_label(year: i32, month: u32) -> String {
    let name = month
        .checked_sub(1)
        .and_then(|index| MONTH_ABBREVIATIONS.get(index as usize))
        .copied()
        .unwrap_or("");
    format!("{} {}", name, year)
}

/// `YYYY-MM` key of the month containing `date`
pub fn month_key(date: NaiveDate) -> String {
    YearMonth::of(date).key()
}

/// Month number for a full or abbreviated (three letters or more) English month name
pub fn month_from_name(token: &str) -> Option<u32> {
    let lower = token.trim().to_lowercase();
    if lower.len() < 3 || !lower.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    MONTH_NAMES
        .iter()
        .position(|name| name.starts_with(&lower))
        .map(|index| index as u32 + 1)
}

fn separators() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"[\s\-/,'.]+").ok())
        .as_ref()
}

fn iso_month() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^(\d{4})-(\d{2})$").ok())
        .as_ref()
}

/// Parse a ledger month label into a [`YearMonth`].
///
/// Accepted forms: `YYYY-MM`, `<Month> <YY>`, `<Month> <YYYY>` and a bare
/// `<Month>`, which takes `fallback_year`.
pub fn parse_sheet_month(raw: &str, fallback_year: i32) -> Option<YearMonth> {
    let label = raw.trim();
    if label.is_empty() {
        return None;
    }

    if let Some(captures) = iso_month()?.captures(label) {
        let year: i32 = captures.get(1)?.as_str().parse().ok()?;
        let month: u32 = captures.get(2)?.as_str().parse().ok()?;
        return YearMonth::new(year, month);
    }

    let tokens: Vec<&str> = separators()?
        .split(label)
        .filter(|token| !token.is_empty())
        .collect();

    match tokens.as_slice() {
        [name] => YearMonth::new(fallback_year, month_from_name(name)?),
        [name, year] => {
            let month = month_from_name(name)?;
            if !year.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            let year = match year.len() {
                2 => {
                    let short: i32 = year.parse().ok()?;
                    if short < TWO_DIGIT_YEAR_PIVOT {
                        2000 + short
                    } else {
                        1900 + short
                    }
                }
                4 => year.parse().ok()?,
                _ => return None,
            };
            YearMonth::new(year, month)
        }
        _ => None,
    }
}

/// Canonical `YYYY-MM` key for a ledger month label, `None` when unparseable
pub fn parse_sheet_month_to_key(raw: &str, fallback_year: i32) -> Option<String> {
    parse_sheet_month(raw, fallback_year).map(|month| month.key())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso_key_is_returned_as_is() {
        assert_eq!(parse_sheet_month_to_key("2026-01", 2025).as_deref(), Some("2026-01"));
        assert_eq!(parse_sheet_month_to_key(" 2024-12 ", 2025).as_deref(), Some("2024-12"));
    }

    #[test]
    fn test_iso_key_with_invalid_month_is_rejected() {
        assert_eq!(parse_sheet_month_to_key("2026-13", 2025), None);
        assert_eq!(parse_sheet_month_to_key("2026-00", 2025), None);
    }

    #[test]
    fn test_short_month_with_two_digit_year() {
        assert_eq!(parse_sheet_month_to_key("Jan 26", 0).as_deref(), Some("2026-01"));
        assert_eq!(parse_sheet_month_to_key("January 26", 0).as_deref(), Some("2026-01"));
        assert_eq!(parse_sheet_month_to_key("Dec 99", 0).as_deref(), Some("1999-12"));
        assert_eq!(parse_sheet_month_to_key("Mar 49", 0).as_deref(), Some("2049-03"));
        assert_eq!(parse_sheet_month_to_key("Mar 50", 0).as_deref(), Some("1950-03"));
    }

    #[test]
    fn test_month_with_four_digit_year_and_separators() {
        assert_eq!(parse_sheet_month_to_key("January 2026", 2020).as_deref(), Some("2026-01"));
        assert_eq!(parse_sheet_month_to_key("Sept-2025", 2020).as_deref(), Some("2025-09"));
        assert_eq!(parse_sheet_month_to_key("oct'24", 2020).as_deref(), Some("2024-10"));
        assert_eq!(parse_sheet_month_to_key("Nov, 2025", 2020).as_deref(), Some("2025-11"));
    }

    #[test]
    fn test_bare_month_uses_fallback_year() {
        assert_eq!(parse_sheet_month_to_key("April", 2025).as_deref(), Some("2025-04"));
        assert_eq!(parse_sheet_month_to_key("aug", 2024).as_deref(), Some("2024-08"));
    }

    #[test]
    fn test_unparseable_labels() {
        assert_eq!(parse_sheet_month_to_key("", 2025), None);
        assert_eq!(parse_sheet_month_to_key("   ", 2025), None);
        assert_eq!(parse_sheet_month_to_key("Total", 2025), None);
        assert_eq!(parse_sheet_month_to_key("Ja 2025", 2025), None);
        assert_eq!(parse_sheet_month_to_key("Jan 2025 extra", 2025), None);
        assert_eq!(parse_sheet_month_to_key("Jan 123", 2025), None);
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(1, 2024), 31);
        assert_eq!(days_in_month(2, 2024), 29);
        assert_eq!(days_in_month(2, 2023), 28);
        assert_eq!(days_in_month(2, 1900), 28);
        assert_eq!(days_in_month(2, 2000), 29);
        assert_eq!(days_in_month(4, 2024), 30);
        assert_eq!(days_in_month(13, 2024), 0);
    }

    #[test]
    fn test_year_month_navigation() {
        let december = YearMonth::new(2025, 12).unwrap();
        assert_eq!(december.succ().key(), "2026-01");
        assert_eq!(december.pred().key(), "2025-11");
        assert_eq!(december.offset(-11).key(), "2025-01");
        assert_eq!(december.last_day(), NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
        assert_eq!(december.label(), "Dec 2025");
        assert_eq!(YearMonth::parse_key("2025-02").unwrap().days_in_month(), 28);
    }

    #[test]
    fn test_through_spans_year_boundary() {
        let start = YearMonth::new(2025, 11).unwrap();
        let end = YearMonth::new(2026, 2).unwrap();
        let keys: Vec<String> = start.through(end).iter().map(YearMonth::key).collect();
        assert_eq!(keys, vec!["2025-11", "2025-12", "2026-01", "2026-02"]);
    }
}
