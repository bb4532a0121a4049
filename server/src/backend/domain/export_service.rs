//! Tabular exports for download.
//!
//! Services build an [`ExportTable`] from the rows they already filtered and
//! this module renders it as CSV or as an XLSX workbook. Nothing is written
//! to disk; the REST layer streams the bytes back as an attachment.

use anyhow::{anyhow, Result};
use csv::{QuoteStyle, WriterBuilder};
use rust_xlsxwriter::Workbook;
use std::fmt;

pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";
pub const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, Clone, PartialEq)]
pub enum ExportCell {
    Text(String),
    Number(f64),
}

impl fmt::Display for ExportCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportCell::Text(text) => f.write_str(text),
            ExportCell::Number(number) => write!(f, "{}", number),
        }
    }
}

impl From<&str> for ExportCell {
    fn from(value: &str) -> Self {
        ExportCell::Text(value.to_string())
    }
}

impl From<String> for ExportCell {
    fn from(value: String) -> Self {
        ExportCell::Text(value)
    }
}

impl From<f64> for ExportCell {
    fn from(value: f64) -> Self {
        ExportCell::Number(value)
    }
}

impl From<usize> for ExportCell {
    fn from(value: usize) -> Self {
        ExportCell::Number(value as f64)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportTable {
    pub sheet_name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<ExportCell>>,
}

impl ExportTable {
    pub fn new(sheet_name: &str, headers: &[&str]) -> Self {
        Self {
            sheet_name: sheet_name.to_string(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<ExportCell>) {
        self.rows.push(row);
    }

    pub fn to_csv(&self, quoting: QuoteStyle) -> Result<Vec<u8>> {
        let mut writer = WriterBuilder::new().quote_style(quoting).from_writer(Vec::new());
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(|cell| cell.to_string()))?;
        }
        writer
            .into_inner()
            .map_err(|e| anyhow!("Failed to finish CSV export: {}", e.error()))
    }

    pub fn to_xlsx(&self) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&self.sheet_name)?;

        for (column, header) in self.headers.iter().enumerate() {
            worksheet.write_string(0, column as u16, header)?;
        }
        for (index, row) in self.rows.iter().enumerate() {
            let row_number = (index + 1) as u32;
            for (column, cell) in row.iter().enumerate() {
                match cell {
                    ExportCell::Text(text) => worksheet.write_string(row_number, column as u16, text)?,
                    ExportCell::Number(number) => worksheet.write_number(row_number, column as u16, *number)?,
                };
            }
        }

        Ok(workbook.save_to_buffer()?)
    }
}

/// A rendered export ready to send as an attachment
#[derive(Debug, Clone, PartialEq)]
pub struct ExportFile {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportFile {
    pub fn csv(filename: &str, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.to_string(),
            content_type: CSV_CONTENT_TYPE,
            bytes,
        }
    }

    pub fn xlsx(filename: &str, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.to_string(),
            content_type: XLSX_CONTENT_TYPE,
            bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ExportTable {
        let mut table = ExportTable::new("Customers", &["ID", "Name", "Bookings"]);
        table.push_row(vec!["c1".into(), "Asha, Sector 5".into(), 2usize.into()]);
        table.push_row(vec!["c2".into(), "Ravi".into(), 0usize.into()]);
        table
    }

    #[test]
    fn test_csv_quotes_only_when_needed() {
        let csv = String::from_utf8(table().to_csv(QuoteStyle::Necessary).unwrap()).unwrap();
        assert_eq!(csv, "ID,Name,Bookings\nc1,\"Asha, Sector 5\",2\nc2,Ravi,0\n");
    }

    #[test]
    fn test_csv_can_quote_every_cell() {
        let csv = String::from_utf8(table().to_csv(QuoteStyle::Always).unwrap()).unwrap();
        assert!(csv.starts_with("\"ID\",\"Name\",\"Bookings\"\n\"c1\""));
    }

    #[test]
    fn test_xlsx_is_a_zip_container() {
        let bytes = table().to_xlsx().unwrap();
        assert!(bytes.starts_with(b"PK"));
    }
}
