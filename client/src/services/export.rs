//! CSV export of the displayed bill list

use crate::api::Bill;
use crate::config::{DEFAULT_DATE_FORMAT, EXPORT_FILE_NAME};
use crate::error::Result;
use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

const HEADER: [&str; 5] = ["Name", "Amount", "Due Date", "Category", "Status"];

/// Format a date with a strftime pattern, falling back to the default
/// pattern when `pattern` is malformed.
pub fn format_date(date: NaiveDate, pattern: &str) -> String {
    let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        tracing::warn!("Invalid date format {:?}, using default", pattern);
        return date.format(DEFAULT_DATE_FORMAT).to_string();
    }

    let mut out = String::new();
    if write!(out, "{}", date.format_with_items(items.into_iter())).is_err() {
        return date.format(DEFAULT_DATE_FORMAT).to_string();
    }
    out
}

/// Render bills as CSV, in the order given
pub fn to_csv(bills: &[Bill], date_pattern: &str) -> String {
    let mut csv = String::new();
    csv.push_str(&HEADER.join(","));
    csv.push('\n');

    for bill in bills {
        let row = [
            format!("\"{}\"", bill.name.replace('"', "\"\"")),
            bill.amount.to_string(),
            format_date(bill.due_date, date_pattern),
            bill.category.label().to_string(),
            if bill.paid { "Paid" } else { "Pending" }.to_string(),
        ];
        csv.push_str(&row.join(","));
        csv.push('\n');
    }

    csv
}

/// Write the CSV to `bills_export.csv` inside `dir`
pub async fn write_csv(dir: &Path, bills: &[Bill], date_pattern: &str) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(EXPORT_FILE_NAME);

    tokio::fs::write(&path, to_csv(bills, date_pattern)).await?;

    tracing::info!("Exported {} bills to {:?}", bills.len(), path);
    Ok(path)
}
