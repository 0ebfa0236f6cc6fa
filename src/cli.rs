//! Command-line interface definitions and argument parsing

use crate::data::{parse_timestamp, OrderFilter};
use chrono::{NaiveDate, NaiveDateTime};
use clap::Parser;

/// Customer segmentation CLI using quartile-based RFM scoring
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input CSV file of order rows
    #[arg(short, long, default_value = "all_data.csv")]
    pub input: String,

    /// Reference date for recency (default: latest purchase in the data)
    /// Accepts "YYYY-MM-DD" or "YYYY-MM-DD HH:MM:SS"
    #[arg(long)]
    pub snapshot_date: Option<String>,

    /// Keep orders purchased on or after this date (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<String>,

    /// Keep orders purchased on or before this date (YYYY-MM-DD)
    #[arg(long)]
    pub end_date: Option<String>,

    /// Keep orders in this product category; repeat for several
    #[arg(short, long = "category")]
    pub categories: Vec<String>,

    /// Export the per-customer RFM table to this CSV path
    #[arg(short, long)]
    pub output: Option<String>,

    /// Number of top customers to preview
    #[arg(long, default_value = "5")]
    pub top: usize,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Parse the snapshot date, if one was given
    pub fn snapshot(&self) -> crate::Result<Option<NaiveDateTime>> {
        match self.snapshot_date {
            Some(ref value) => parse_timestamp(value)
                .map(Some)
                .ok_or_else(|| anyhow::anyhow!("Invalid snapshot date: {}", value)),
            None => Ok(None),
        }
    }

    /// Build the order filter from the date range and category options
    pub fn filter(&self) -> crate::Result<OrderFilter> {
        let start = parse_date("start", self.start_date.as_deref())?;
        let end = parse_date("end", self.end_date.as_deref())?;

        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                anyhow::bail!("Start date {} is after end date {}", start, end);
            }
        }

        Ok(OrderFilter {
            start,
            end,
            categories: self.categories.clone(),
        })
    }
}

fn parse_date(which: &str, value: Option<&str>) -> crate::Result<Option<NaiveDate>> {
    value
        .map(|value| {
            NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
                .map_err(|_| anyhow::anyhow!("Invalid {} date: {}", which, value))
        })
        .transpose()
}
