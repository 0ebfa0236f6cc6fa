//! Quartile bucketing over the empirical distribution of a metric
//!
//! Cut points are the 25th/50th/75th percentiles of the population, computed
//! by linear interpolation between the closest ranks of a sorted copy of the
//! values. Bins are right-closed and the lowest bin includes the minimum.

/// Value at percentile `p` (clamped to `0.0..=1.0`) of an ascending slice.
///
/// Returns `None` for an empty slice.
pub fn quantile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }

    let pos = p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;

    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Number of distinct values in the slice
pub fn distinct_count(values: &[f64]) -> usize {
    let mut sorted = sorted_copy(values);
    sorted.dedup();
    sorted.len()
}

/// Bucket edges `[min, q25, q50, q75, max]` for the given population.
///
/// Returns `None` when fewer than four distinct values exist or when the
/// edges are not strictly increasing, i.e. when four non-empty, well-ordered
/// buckets cannot be formed.
pub fn quartile_edges(values: &[f64]) -> Option<[f64; 5]> {
    if distinct_count(values) < 4 {
        return None;
    }

    let sorted = sorted_copy(values);
    let edges = [
        quantile(&sorted, 0.0)?,
        quantile(&sorted, 0.25)?,
        quantile(&sorted, 0.5)?,
        quantile(&sorted, 0.75)?,
        quantile(&sorted, 1.0)?,
    ];

    if edges.windows(2).all(|pair| pair[0] < pair[1]) {
        Some(edges)
    } else {
        None
    }
}

/// Quartile (1..=4) that `value` falls into, lowest values in quartile 1
pub fn bucket(value: f64, edges: &[f64; 5]) -> u8 {
    1 + edges[1..4].iter().filter(|&&edge| value > edge).count() as u8
}

/// Ordinal ranks 1..=n, ties broken by position in the slice
pub fn rank_first(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    // sort_by is stable, so equal values keep their original order
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    for (rank, idx) in order.into_iter().enumerate() {
        ranks[idx] = (rank + 1) as f64;
    }
    ranks
}

fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantile_interpolates_between_ranks() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&sorted, 0.0), Some(1.0));
        assert_eq!(quantile(&sorted, 0.25), Some(1.75));
        assert_eq!(quantile(&sorted, 0.5), Some(2.5));
        assert_eq!(quantile(&sorted, 0.75), Some(3.25));
        assert_eq!(quantile(&sorted, 1.0), Some(4.0));
        assert_eq!(quantile(&[], 0.5), None);
        assert_eq!(quantile(&[7.0], 0.3), Some(7.0));
    }

    #[test]
    fn test_quartile_edges() {
        let edges = quartile_edges(&[40.0, 10.0, 30.0, 20.0]).unwrap();
        assert_eq!(edges, [10.0, 17.5, 25.0, 32.5, 40.0]);
    }

    #[test]
    fn test_quartile_edges_degenerate() {
        // Too few distinct values
        assert!(quartile_edges(&[1.0, 1.0, 2.0, 3.0]).is_none());
        assert!(quartile_edges(&[5.0; 10]).is_none());
        assert!(quartile_edges(&[]).is_none());

        // Four distinct values, but q25 collapses onto the minimum
        assert!(quartile_edges(&[0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 2.0, 3.0]).is_none());
    }

    #[test]
    fn test_bucket_is_right_closed() {
        let edges = [0.0, 10.0, 20.0, 30.0, 40.0];
        assert_eq!(bucket(0.0, &edges), 1);
        assert_eq!(bucket(10.0, &edges), 1);
        assert_eq!(bucket(10.5, &edges), 2);
        assert_eq!(bucket(20.0, &edges), 2);
        assert_eq!(bucket(25.0, &edges), 3);
        assert_eq!(bucket(30.0, &edges), 3);
        assert_eq!(bucket(40.0, &edges), 4);
    }

    #[test]
    fn test_every_bucket_is_populated() {
        let values: Vec<f64> = (1..=12).map(f64::from).collect();
        let edges = quartile_edges(&values).unwrap();

        let mut counts = [0usize; 4];
        for &v in &values {
            counts[(bucket(v, &edges) - 1) as usize] += 1;
        }
        assert_eq!(counts, [3, 3, 3, 3]);
    }

    #[test]
    fn test_tied_values_can_leave_a_bucket_empty() {
        let values = [0.0, 5.0, 5.0, 10.0, 10.0, 15.0];
        let edges = quartile_edges(&values).unwrap();
        assert_eq!(edges, [0.0, 5.0, 7.5, 10.0, 15.0]);

        let buckets: Vec<u8> = values.iter().map(|&v| bucket(v, &edges)).collect();
        assert_eq!(buckets, vec![1, 1, 1, 3, 3, 4]);
    }

    #[test]
    fn test_rank_first_breaks_ties_by_position() {
        assert_eq!(rank_first(&[1.0, 1.0, 1.0, 4.0]), vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(rank_first(&[3.0, 1.0, 3.0, 2.0]), vec![3.0, 1.0, 4.0, 2.0]);
        assert!(rank_first(&[]).is_empty());
    }

    #[test]
    fn test_distinct_count() {
        assert_eq!(distinct_count(&[1.0, 1.0, 2.0, 3.0, 3.0]), 3);
        assert_eq!(distinct_count(&[]), 0);
    }
}
