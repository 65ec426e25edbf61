//! Fixed-width entropy histogram.

use serde::{Deserialize, Serialize};

/// Bucket width used by the batch harness when none is configured.
pub const DEFAULT_BUCKET_WIDTH: f64 = 0.001;
/// Bucket count used by the batch harness when none is configured.
pub const DEFAULT_NUM_BUCKETS: usize = 61;

/// Histogram over `[0, bucket_width * n_buckets)`.
///
/// Values outside the range are counted as overflow and not bucketed, so
/// `bucket sum + overflow == samples recorded` always holds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    bucket_width: f64,
    counts: Vec<u64>,
    overflow: u64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new(DEFAULT_BUCKET_WIDTH, DEFAULT_NUM_BUCKETS)
    }
}

impl Histogram {
    /// Create an empty histogram. Callers validate `bucket_width > 0`.
    pub fn new(bucket_width: f64, n_buckets: usize) -> Self {
        Self {
            bucket_width,
            counts: vec![0; n_buckets],
            overflow: 0,
        }
    }

    /// Bucket for `value`, or `None` if it falls outside the range.
    pub fn bucket_index(&self, value: f64) -> Option<usize> {
        if !value.is_finite() || value < 0.0 {
            return None;
        }
        let index = (value / self.bucket_width).floor();
        if index < self.counts.len() as f64 {
            Some(index as usize)
        } else {
            None
        }
    }

    /// Count one sample. Returns false if it overflowed the range.
    pub fn record(&mut self, value: f64) -> bool {
        match self.bucket_index(value) {
            Some(index) => {
                self.counts[index] += 1;
                true
            }
            None => {
                self.overflow += 1;
                false
            }
        }
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn bucket_width(&self) -> f64 {
        self.bucket_width
    }

    /// Exclusive upper bound of the bucketed range.
    pub fn upper_bound(&self) -> f64 {
        self.bucket_width * self.counts.len() as f64
    }

    /// Samples that fell outside the range.
    pub fn overflow(&self) -> u64 {
        self.overflow
    }

    /// Samples that landed in a bucket.
    pub fn in_range(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Every sample recorded, bucketed or not.
    pub fn total(&self) -> u64 {
        self.in_range() + self.overflow
    }

    /// Space-separated, right-aligned bucket counts on one line.
    pub fn format_counts(&self) -> String {
        self.counts
            .iter()
            .map(|c| format!("{:5}", c))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_index() {
        let hist = Histogram::new(0.1, 5);
        assert_eq!(hist.bucket_index(0.0), Some(0));
        assert_eq!(hist.bucket_index(0.05), Some(0));
        assert_eq!(hist.bucket_index(0.25), Some(2));
        assert_eq!(hist.bucket_index(0.49), Some(4));
        assert_eq!(hist.bucket_index(0.5), None);
        assert_eq!(hist.bucket_index(-0.01), None);
        assert_eq!(hist.bucket_index(f64::NAN), None);
    }

    #[test]
    fn test_counts_and_overflow_add_up() {
        let mut hist = Histogram::new(0.25, 2);
        for value in [0.0, 0.1, 0.3, 0.75, 1.0, 0.2] {
            hist.record(value);
        }
        assert_eq!(hist.counts(), &[3, 1]);
        assert_eq!(hist.overflow(), 2);
        assert_eq!(hist.total(), 6);
        assert_eq!(hist.upper_bound(), 0.5);
    }

    #[test]
    fn test_last_bucket_edge_overflows() {
        // Index == n_buckets is outside the array.
        let mut hist = Histogram::new(1.0, 3);
        assert!(hist.record(2.999));
        assert!(!hist.record(3.0));
    }

    #[test]
    fn test_format_counts() {
        let mut hist = Histogram::new(0.5, 2);
        hist.record(0.1);
        assert_eq!(hist.format_counts(), "    1     0");
    }
}
