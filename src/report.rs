//! Segment summaries, customer previews and CSV export of RFM results

use crate::rfm::CustomerRFM;
use crate::segment::Segment;
use anyhow::Context;
use std::cmp::Ordering;
use std::fmt::Write as _;
use std::io::Write;

/// Aggregate view of one segment
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentSummary {
    pub segment: Segment,
    pub customers: usize,
    /// Fraction of all scored customers (0.0..=1.0)
    pub share: f64,
    pub avg_recency: f64,
    pub avg_frequency: f64,
    pub avg_monetary: f64,
}

/// Summarize customers per segment, best tier first
///
/// Every segment is listed, including those with no customers.
pub fn summarize(rows: &[CustomerRFM]) -> Vec<SegmentSummary> {
    let total = rows.len();

    Segment::ALL
        .iter()
        .map(|&segment| {
            let members: Vec<&CustomerRFM> =
                rows.iter().filter(|row| row.segment == segment).collect();
            let customers = members.len();

            SegmentSummary {
                segment,
                customers,
                share: if total == 0 {
                    0.0
                } else {
                    customers as f64 / total as f64
                },
                avg_recency: mean(&members, |row| row.recency as f64),
                avg_frequency: mean(&members, |row| row.frequency as f64),
                avg_monetary: mean(&members, |row| row.monetary),
            }
        })
        .collect()
}

fn mean(members: &[&CustomerRFM], value: impl Fn(&CustomerRFM) -> f64) -> f64 {
    if members.is_empty() {
        return 0.0;
    }
    members.iter().map(|row| value(row)).sum::<f64>() / members.len() as f64
}

/// Render summaries as a fixed-width text table
pub fn render_summary(summaries: &[SegmentSummary]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<20} {:>9} {:>7} {:>11} {:>13} {:>12}",
        "Segment", "Customers", "Share", "Avg Recency", "Avg Frequency", "Avg Monetary"
    );
    for summary in summaries {
        let _ = writeln!(
            out,
            "{:<20} {:>9} {:>6.1}% {:>11.1} {:>13.2} {:>12.2}",
            summary.segment.label(),
            summary.customers,
            summary.share * 100.0,
            summary.avg_recency,
            summary.avg_frequency,
            summary.avg_monetary
        );
    }
    out
}

/// The `n` best customers: highest RFM score, then highest monetary, then id
pub fn top_customers(rows: &[CustomerRFM], n: usize) -> Vec<&CustomerRFM> {
    let mut ranked: Vec<&CustomerRFM> = rows.iter().collect();
    ranked.sort_by(|a, b| {
        b.rfm_score
            .cmp(&a.rfm_score)
            .then_with(|| b.monetary.total_cmp(&a.monetary))
            .then_with(|| a.customer_unique_id.cmp(&b.customer_unique_id))
    });
    ranked.truncate(n);
    ranked
}

/// Write RFM rows as CSV with a header row
pub fn write_csv<W: Write>(rows: &[CustomerRFM], writer: W) -> crate::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer
            .serialize(row)
            .with_context(|| format!("failed to write customer {}", row.customer_unique_id))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write RFM rows to a CSV file, replacing any existing file
pub fn write_csv_file(rows: &[CustomerRFM], path: &str) -> crate::Result<()> {
    let file =
        std::fs::File::create(path).with_context(|| format!("failed to create '{}'", path))?;
    write_csv(rows, file)?;
    tracing::info!(path, rows = rows.len(), "exported RFM table");
    Ok(())
}

/// Ordering helper used when callers want rows grouped by segment
pub fn by_segment(a: &CustomerRFM, b: &CustomerRFM) -> Ordering {
    a.segment
        .cmp(&b.segment)
        .then_with(|| b.rfm_score.cmp(&a.rfm_score))
        .then_with(|| a.customer_unique_id.cmp(&b.customer_unique_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(
        id: &str,
        scores: (u8, u8, u8),
        recency: i64,
        frequency: usize,
        monetary: f64,
    ) -> CustomerRFM {
        let rfm_score = scores.0 + scores.1 + scores.2;
        CustomerRFM {
            customer_unique_id: id.to_string(),
            recency,
            frequency,
            monetary,
            r_score: scores.0,
            f_score: scores.1,
            m_score: scores.2,
            rfm_code: format!("{}{}{}", scores.0, scores.1, scores.2),
            rfm_score,
            segment: Segment::from_score(rfm_score),
        }
    }

    fn create_test_rows() -> Vec<CustomerRFM> {
        vec![
            row("c1", (4, 1, 1), 0, 1, 100.0),
            row("c2", (4, 4, 4), 2, 6, 900.0),
            row("c3", (4, 4, 3), 5, 5, 400.0),
            row("c4", (1, 1, 1), 90, 1, 10.0),
        ]
    }

    #[test]
    fn test_summarize() {
        let summaries = summarize(&create_test_rows());
        assert_eq!(summaries.len(), 5);

        let champions = &summaries[0];
        assert_eq!(champions.segment, Segment::Champions);
        assert_eq!(champions.customers, 2);
        assert!((champions.share - 0.5).abs() < 1e-9);
        assert!((champions.avg_recency - 3.5).abs() < 1e-9);
        assert!((champions.avg_frequency - 5.5).abs() < 1e-9);
        assert!((champions.avg_monetary - 650.0).abs() < 1e-9);

        let loyal = &summaries[1];
        assert_eq!(loyal.customers, 0);
        assert_eq!(loyal.avg_monetary, 0.0);

        assert_eq!(summaries[2].customers, 1);
        assert_eq!(summaries[4].segment, Segment::Lost);
        assert_eq!(summaries[4].customers, 1);
    }

    #[test]
    fn test_summarize_empty() {
        let summaries = summarize(&[]);
        assert_eq!(summaries.len(), 5);
        assert!(summaries.iter().all(|s| s.customers == 0 && s.share == 0.0));
    }

    #[test]
    fn test_render_summary() {
        let text = render_summary(&summarize(&create_test_rows()));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("Segment"));
        assert!(lines[1].starts_with("Champions"));
        assert!(lines[1].contains("50.0%"));
        assert!(lines[4].starts_with("At Risk"));
    }

    #[test]
    fn test_top_customers() {
        let rows = create_test_rows();
        let top: Vec<&str> = top_customers(&rows, 3)
            .into_iter()
            .map(|row| row.customer_unique_id.as_str())
            .collect();
        assert_eq!(top, vec!["c2", "c3", "c1"]);

        assert_eq!(top_customers(&rows, 10).len(), 4);
    }

    #[test]
    fn test_by_segment() {
        let mut rows = create_test_rows();
        rows.sort_by(by_segment);
        let ids: Vec<&str> = rows.iter().map(|r| r.customer_unique_id.as_str()).collect();
        assert_eq!(ids, vec!["c2", "c3", "c1", "c4"]);
    }

    #[test]
    fn test_write_csv() {
        let rows = create_test_rows();
        let mut buffer = Vec::new();
        write_csv(&rows[..2], &mut buffer).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "customer_unique_id,recency,frequency,monetary,r_score,f_score,m_score,rfm_code,rfm_score,segment"
        );
        assert_eq!(lines[1], "c1,0,1,100.0,4,1,1,411,6,Potential Loyalist");
        assert_eq!(lines[2], "c2,2,6,900.0,4,4,4,444,12,Champions");
    }
}
