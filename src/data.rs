//! Order data loading and date/category filtering
//!
//! Every filter step returns a new table; the input rows are never mutated.

use crate::rfm::OrderRecord;
use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::io::Read;

/// Timestamp layouts accepted for `order_purchase_timestamp`
const TIMESTAMP_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Raw CSV row; unknown columns are ignored
#[derive(Debug, Deserialize)]
struct CsvOrderRow {
    customer_unique_id: String,
    order_id: String,
    #[serde(default)]
    order_purchase_timestamp: Option<String>,
    #[serde(default)]
    payment_value: Option<f64>,
    #[serde(default)]
    product_category_name_english: Option<String>,
}

/// An order record together with the dimensions it can be filtered on
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRow {
    pub record: OrderRecord,
    /// English product category name
    pub category: Option<String>,
}

impl OrderRow {
    fn purchase_date(&self) -> Option<NaiveDate> {
        self.record.order_purchase_timestamp.map(|ts| ts.date())
    }
}

/// Parse a purchase timestamp, accepting a bare date as midnight
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Load order rows from a CSV reader with a header row
///
/// Required columns: `customer_unique_id`, `order_id`. Optional columns:
/// `order_purchase_timestamp`, `payment_value`,
/// `product_category_name_english`. Empty cells load as missing values; an
/// unparseable timestamp is kept as missing so the engine can report it.
pub fn load_orders<R: Read>(reader: R) -> crate::Result<Vec<OrderRow>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (line_num, result) in csv_reader.deserialize().enumerate() {
        let raw: CsvOrderRow =
            result.with_context(|| format!("malformed order row at line {}", line_num + 2))?;

        let timestamp = raw.order_purchase_timestamp.as_deref().and_then(|value| {
            let parsed = parse_timestamp(value);
            if parsed.is_none() {
                tracing::warn!(order_id = %raw.order_id, value, "unparseable purchase timestamp");
            }
            parsed
        });

        rows.push(OrderRow {
            record: OrderRecord {
                customer_unique_id: raw.customer_unique_id,
                order_id: raw.order_id,
                order_purchase_timestamp: timestamp,
                payment_value: raw.payment_value,
            },
            category: raw.product_category_name_english,
        });
    }

    tracing::info!(rows = rows.len(), "loaded order rows");
    Ok(rows)
}

/// Load order rows from a CSV file path
pub fn load_orders_file(path: &str) -> crate::Result<Vec<OrderRow>> {
    let file = std::fs::File::open(path).with_context(|| format!("failed to open '{}'", path))?;
    load_orders(file).with_context(|| format!("failed to read orders from '{}'", path))
}

/// Date range and category selection applied before scoring
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderFilter {
    /// First purchase date to keep (inclusive)
    pub start: Option<NaiveDate>,
    /// Last purchase date to keep (inclusive)
    pub end: Option<NaiveDate>,
    /// Categories to keep, matched case-insensitively; empty keeps all
    pub categories: Vec<String>,
}

impl OrderFilter {
    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none() && self.categories.is_empty()
    }

    /// Rows passing every configured condition, as a new table.
    ///
    /// Rows without a timestamp pass the date condition so that scoring
    /// still reports them.
    pub fn apply(&self, rows: &[OrderRow]) -> Vec<OrderRow> {
        let filtered: Vec<OrderRow> = rows
            .iter()
            .filter(|row| self.matches_date(row) && self.matches_category(row))
            .cloned()
            .collect();

        tracing::debug!(
            before = rows.len(),
            after = filtered.len(),
            "applied order filter"
        );
        filtered
    }

    fn matches_date(&self, row: &OrderRow) -> bool {
        let Some(date) = row.purchase_date() else {
            return true;
        };
        self.start.map_or(true, |start| date >= start) && self.end.map_or(true, |end| date <= end)
    }

    fn matches_category(&self, row: &OrderRow) -> bool {
        if self.categories.is_empty() {
            return true;
        }
        row.category.as_deref().is_some_and(|category| {
            self.categories
                .iter()
                .any(|wanted| wanted.eq_ignore_ascii_case(category))
        })
    }
}

/// Strip filter dimensions, leaving the records the engine consumes
pub fn into_records(rows: Vec<OrderRow>) -> Vec<OrderRecord> {
    rows.into_iter().map(|row| row.record).collect()
}
