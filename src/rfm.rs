//! RFM (Recency, Frequency, Monetary) scoring and segmentation
//!
//! Orders are grouped per `customer_unique_id`, each metric is turned into a
//! quartile score across the customer population, and the summed score is
//! mapped onto a [`Segment`].

use crate::quartile::{bucket, distinct_count, quartile_edges, rank_first};
use crate::segment::Segment;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use thiserror::Error;

/// One order line as supplied by the caller
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    /// Identifier stable across repeat purchases by the same customer
    pub customer_unique_id: String,
    pub order_id: String,
    /// Required; a `None` here is reported as [`RfmError::MissingTimestamp`]
    pub order_purchase_timestamp: Option<NaiveDateTime>,
    /// Amount paid on this row; `None` counts as 0, otherwise finite and >= 0
    pub payment_value: Option<f64>,
}

impl OrderRecord {
    pub fn new(
        customer_unique_id: impl Into<String>,
        order_id: impl Into<String>,
        order_purchase_timestamp: NaiveDateTime,
        payment_value: f64,
    ) -> Self {
        Self {
            customer_unique_id: customer_unique_id.into(),
            order_id: order_id.into(),
            order_purchase_timestamp: Some(order_purchase_timestamp),
            payment_value: Some(payment_value),
        }
    }
}

/// Per-customer RFM metrics, scores and segment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerRFM {
    pub customer_unique_id: String,
    /// Whole days between the snapshot and the latest purchase
    pub recency: i64,
    /// Distinct orders placed
    pub frequency: usize,
    /// Total paid across all order rows
    pub monetary: f64,
    pub r_score: u8,
    pub f_score: u8,
    pub m_score: u8,
    /// Scores concatenated in R, F, M order, e.g. "411"
    pub rfm_code: String,
    pub rfm_score: u8,
    pub segment: Segment,
}

/// The three scored metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Recency,
    Frequency,
    Monetary,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Metric::Recency => "recency",
            Metric::Frequency => "frequency",
            Metric::Monetary => "monetary",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RfmError {
    #[error("no order records to analyse")]
    EmptyInput,

    #[error("order {order_id} has no valid purchase timestamp")]
    MissingTimestamp { order_id: String },

    #[error("order {order_id} has invalid payment value {value}")]
    InvalidPayment { order_id: String, value: f64 },

    #[error(
        "{metric} has {distinct} distinct value(s) across {customers} customer(s); \
         cannot form 4 quartile buckets"
    )]
    DegenerateDistribution {
        metric: Metric,
        distinct: usize,
        customers: usize,
    },
}

/// Running aggregate for one customer while grouping
struct CustomerOrders<'a> {
    last_purchase: NaiveDateTime,
    order_ids: HashSet<&'a str>,
    payments: Vec<f64>,
}

impl<'a> CustomerOrders<'a> {
    fn new(order: &'a OrderRecord, purchased_at: NaiveDateTime) -> Self {
        let mut customer = Self {
            last_purchase: purchased_at,
            order_ids: HashSet::new(),
            payments: Vec::new(),
        };
        customer.add(order, purchased_at);
        customer
    }

    fn add(&mut self, order: &'a OrderRecord, purchased_at: NaiveDateTime) {
        self.last_purchase = self.last_purchase.max(purchased_at);
        self.order_ids.insert(order.order_id.as_str());
        self.payments.push(order.payment_value.unwrap_or(0.0));
    }

    fn monetary(&self) -> f64 {
        // Summed in ascending order so the total does not depend on row order
        let mut payments = self.payments.clone();
        payments.sort_by(f64::total_cmp);
        payments.iter().sum()
    }
}

/// Compute RFM metrics, quartile scores and segments for every customer
///
/// # Arguments
/// * `orders` - Order rows; every row must carry a purchase timestamp
/// * `snapshot_date` - Reference instant for recency (default: the latest
///   purchase timestamp in `orders`)
///
/// # Returns
/// * One `CustomerRFM` per distinct `customer_unique_id`, sorted by that id
pub fn compute_rfm(
    orders: &[OrderRecord],
    snapshot_date: Option<NaiveDateTime>,
) -> Result<Vec<CustomerRFM>, RfmError> {
    if orders.is_empty() {
        return Err(RfmError::EmptyInput);
    }

    // BTreeMap keeps customers in id order, which is also the tie-break
    // order for frequency ranking.
    let mut customers: BTreeMap<&str, CustomerOrders<'_>> = BTreeMap::new();
    for order in orders {
        let purchased_at =
            order
                .order_purchase_timestamp
                .ok_or_else(|| RfmError::MissingTimestamp {
                    order_id: order.order_id.clone(),
                })?;

        if let Some(value) = order.payment_value {
            if !value.is_finite() || value < 0.0 {
                return Err(RfmError::InvalidPayment {
                    order_id: order.order_id.clone(),
                    value,
                });
            }
        }

        customers
            .entry(order.customer_unique_id.as_str())
            .and_modify(|customer| customer.add(order, purchased_at))
            .or_insert_with(|| CustomerOrders::new(order, purchased_at));
    }

    let snapshot = match snapshot_date {
        Some(snapshot) => snapshot,
        None => customers
            .values()
            .map(|customer| customer.last_purchase)
            .max()
            .ok_or(RfmError::EmptyInput)?,
    };

    tracing::debug!(
        orders = orders.len(),
        customers = customers.len(),
        %snapshot,
        "grouped orders by customer"
    );

    let recency: Vec<i64> = customers
        .values()
        .map(|customer| (snapshot - customer.last_purchase).num_days())
        .collect();
    let frequency: Vec<usize> = customers
        .values()
        .map(|customer| customer.order_ids.len())
        .collect();
    let monetary: Vec<f64> = customers.values().map(CustomerOrders::monetary).collect();

    let recency_values: Vec<f64> = recency.iter().map(|&days| days as f64).collect();
    let frequency_ranks = rank_first(&frequency.iter().map(|&n| n as f64).collect::<Vec<_>>());

    let r_scores: Vec<u8> = quartile_scores(Metric::Recency, &recency_values)?
        .into_iter()
        .map(|quartile| 5 - quartile)
        .collect();
    let f_scores = quartile_scores(Metric::Frequency, &frequency_ranks)?;
    let m_scores = quartile_scores(Metric::Monetary, &monetary)?;

    let results: Vec<CustomerRFM> = customers
        .keys()
        .enumerate()
        .map(|(i, id)| {
            let rfm_score = r_scores[i] + f_scores[i] + m_scores[i];
            CustomerRFM {
                customer_unique_id: (*id).to_string(),
                recency: recency[i],
                frequency: frequency[i],
                monetary: monetary[i],
                r_score: r_scores[i],
                f_score: f_scores[i],
                m_score: m_scores[i],
                rfm_code: format!("{}{}{}", r_scores[i], f_scores[i], m_scores[i]),
                rfm_score,
                segment: Segment::from_score(rfm_score),
            }
        })
        .collect();

    tracing::debug!(customers = results.len(), "scored RFM segments");

    Ok(results)
}

/// Quartile (1 = lowest values .. 4 = highest values) for each entry
fn quartile_scores(metric: Metric, values: &[f64]) -> Result<Vec<u8>, RfmError> {
    let edges = quartile_edges(values).ok_or_else(|| RfmError::DegenerateDistribution {
        metric,
        distinct: distinct_count(values),
        customers: values.len(),
    })?;

    Ok(values.iter().map(|&value| bucket(value, &edges)).collect())
}
