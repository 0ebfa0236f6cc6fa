//! rfmseg: customer segmentation over e-commerce orders using RFM analysis
//!
//! This library computes per-customer Recency, Frequency and Monetary
//! metrics from order rows, scores each metric by quartile across the
//! customer population, and classifies customers into named segments.

pub mod cli;
pub mod data;
pub mod logging;
pub mod quartile;
pub mod report;
pub mod rfm;
pub mod segment;

// Re-export public items for easier access
pub use cli::Args;
pub use data::{into_records, load_orders, load_orders_file, OrderFilter, OrderRow};
pub use report::{render_summary, summarize, top_customers, write_csv_file, SegmentSummary};
pub use rfm::{compute_rfm, CustomerRFM, Metric, OrderRecord, RfmError};
pub use segment::Segment;

/// Common result type used throughout the application
pub type Result<T> = anyhow::Result<T>;
