//! The published monthly expense ledger.
//!
//! One row per month. The month column is the first header containing
//! "month" and the total column the first header containing "total"; every
//! other numeric column is an expense category.

use anyhow::Result;
use std::collections::BTreeMap;

use shared::{ExpenseBreakdown, ExpenseSlice};

use crate::backend::domain::metrics::round_to;
use crate::backend::domain::month_key::{parse_sheet_month, YearMonth};

/// Parse a money cell such as `₹1,234.50`. `None` when empty or not a number.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != '₹' && *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Money cell with empty or invalid values read as zero
pub fn parse_price(raw: &str) -> f64 {
    parse_amount(raw).unwrap_or(0.0)
}

/// Read a CSV document into its header row and data rows
pub fn read_csv(text: &str) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::None)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok((headers, rows))
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseLedger {
    headers: Vec<String>,
    month_column: Option<usize>,
    total_column: Option<usize>,
    rows: Vec<Vec<String>>,
}

impl ExpenseLedger {
    pub fn parse(text: &str) -> Result<Self> {
        let (headers, rows) = read_csv(text)?;
        let month_column = headers.iter().position(|h| h.to_lowercase().contains("month"));
        let total_column = headers.iter().position(|h| h.to_lowercase().contains("total"));
        Ok(Self {
            headers,
            month_column,
            total_column,
            rows,
        })
    }

    /// A ledger without rows, used when the sheet cannot be read
    pub fn empty() -> Self {
        Self {
            headers: Vec::new(),
            month_column: None,
            total_column: None,
            rows: Vec::new(),
        }
    }

    pub fn has_month_and_total(&self) -> bool {
        self.month_column.is_some() && self.total_column.is_some()
    }

    fn cell<'a>(row: &'a [String], column: Option<usize>) -> &'a str {
        column
            .and_then(|index| row.get(index))
            .map(|cell| cell.trim())
            .unwrap_or("")
    }

    /// Rows with both a month label and a total cell, in sheet order
    fn dated_rows(&self) -> impl Iterator<Item = &Vec<String>> + '_ {
        self.rows.iter().filter(move |row| {
            !Self::cell(row, self.month_column).is_empty() && !Self::cell(row, self.total_column).is_empty()
        })
    }

    /// Positive totals per month. Labels without a year take `fallback_year`;
    /// repeated months are summed.
    pub fn monthly_totals(&self, fallback_year: i32) -> BTreeMap<YearMonth, f64> {
        let mut totals = BTreeMap::new();
        if !self.has_month_and_total() {
            return totals;
        }
        for row in self.dated_rows() {
            let total = parse_price(Self::cell(row, self.total_column));
            if total <= 0.0 {
                continue;
            }
            if let Some(month) = parse_sheet_month(Self::cell(row, self.month_column), fallback_year) {
                *totals.entry(month).or_insert(0.0) += total;
            }
        }
        totals
    }

    /// Total of the last dated row in the sheet
    pub fn latest_total(&self) -> f64 {
        if !self.has_month_and_total() {
            return 0.0;
        }
        self.dated_rows()
            .last()
            .map(|row| parse_price(Self::cell(row, self.total_column)))
            .unwrap_or(0.0)
    }

    /// Latest month's total spread over the days of `month`
    pub fn daily_average_expense(&self, month: YearMonth) -> f64 {
        let days = month.days_in_month();
        if days == 0 {
            return 0.0;
        }
        self.latest_total() / days as f64
    }

    /// Month labels exactly as written, in sheet order
    pub fn month_labels(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| Self::cell(row, self.month_column).to_string())
            .filter(|label| !label.is_empty())
            .collect()
    }

    /// Category split of one month; the latest month when `month` is `None`
    pub fn breakdown(&self, month: Option<&str>) -> ExpenseBreakdown {
        let months = self.month_labels();
        let selected = month
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .or_else(|| months.last().cloned());

        let mut breakdown = ExpenseBreakdown {
            months,
            selected_month: selected.clone(),
            total: 0.0,
            slices: Vec::new(),
        };

        let selected = match selected {
            Some(selected) if self.has_month_and_total() => selected,
            _ => return breakdown,
        };
        let row = match self
            .rows
            .iter()
            .find(|row| Self::cell(row, self.month_column) == selected)
        {
            Some(row) => row,
            None => return breakdown,
        };

        let total = parse_price(Self::cell(row, self.total_column));
        breakdown.total = total;
        for (index, header) in self.headers.iter().enumerate() {
            if Some(index) == self.month_column || Some(index) == self.total_column {
                continue;
            }
            if let Some(value) = parse_amount(Self::cell(row, Some(index))) {
                let percentage = if total != 0.0 {
                    round_to(value / total * 100.0, 1)
                } else {
                    0.0
                };
                breakdown.slices.push(ExpenseSlice {
                    name: header.clone(),
                    value,
                    percentage,
                });
            }
        }
        breakdown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEDGER: &str = "Month,Fuel,Salary Exp,Advertisement Exp,Total\n\
        Jan 25,\"1,000\",\"4,000\",\"5,000\",\"10,000\"\n\
        February,500,3000,,3500\n\
        Feb 25,100,,,100\n\
        March 2025,,,,0\n\
        ,,,,\n\
        2025-04,200,2400,400,3000\n";

    #[test]
    fn test_parse_amount_strips_currency_and_grouping() {
        assert_eq!(parse_amount("₹1,234"), Some(1234.0));
        assert_eq!(parse_amount(" 2,500.75 "), Some(2500.75));
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("n/a"), None);
        assert_eq!(parse_price("₹1,234"), 1234.0);
        assert_eq!(parse_price("abc"), 0.0);
        assert_eq!(parse_price(""), 0.0);
    }

    #[test]
    fn test_monthly_totals_skip_non_positive_and_merge_duplicates() {
        let ledger = ExpenseLedger::parse(LEDGER).unwrap();
        let totals = ledger.monthly_totals(2025);

        assert_eq!(totals.get(&YearMonth::new(2025, 1).unwrap()), Some(&10000.0));
        assert_eq!(totals.get(&YearMonth::new(2025, 2).unwrap()), Some(&3600.0));
        assert_eq!(totals.get(&YearMonth::new(2025, 3).unwrap()), None);
        assert_eq!(totals.get(&YearMonth::new(2025, 4).unwrap()), Some(&3000.0));
    }

    #[test]
    fn test_daily_average_uses_last_dated_row() {
        let ledger = ExpenseLedger::parse(LEDGER).unwrap();
        assert_eq!(ledger.latest_total(), 3000.0);

        let june = YearMonth::new(2025, 6).unwrap();
        assert_eq!(ledger.daily_average_expense(june), 100.0);
    }

    #[test]
    fn test_breakdown_of_selected_month() {
        let ledger = ExpenseLedger::parse(LEDGER).unwrap();
        let breakdown = ledger.breakdown(Some("Jan 25"));

        assert_eq!(breakdown.total, 10000.0);
        assert_eq!(breakdown.slices.len(), 3);
        assert_eq!(breakdown.slices[0].name, "Fuel");
        assert_eq!(breakdown.slices[0].percentage, 10.0);
        assert_eq!(breakdown.slices[2].name, "Advertisement Exp");
        assert_eq!(breakdown.slices[2].percentage, 50.0);
    }

    #[test]
    fn test_breakdown_defaults_to_latest_month() {
        let ledger = ExpenseLedger::parse(LEDGER).unwrap();
        let breakdown = ledger.breakdown(None);

        assert_eq!(breakdown.selected_month.as_deref(), Some("2025-04"));
        assert_eq!(breakdown.months.len(), 5);
        assert_eq!(breakdown.total, 3000.0);
    }

    #[test]
    fn test_ledger_without_expected_columns_is_empty() {
        let ledger = ExpenseLedger::parse("Period,Amount\nJan 25,100\n").unwrap();
        assert!(ledger.monthly_totals(2025).is_empty());
        assert_eq!(ledger.latest_total(), 0.0);
    }
}
