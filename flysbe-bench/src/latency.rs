//! Latency measurement utilities.

use hdrhistogram::{CreationError, Histogram};
use std::time::{Duration, Instant};

/// Latency statistics.
#[derive(Debug, Clone)]
pub struct LatencyStats {
    /// Minimum latency.
    pub min: Duration,
    /// Maximum latency.
    pub max: Duration,
    /// Mean latency.
    pub mean: Duration,
    /// Median latency (p50).
    pub median: Duration,
    /// 99th percentile latency.
    pub p99: Duration,
    /// 99.9th percentile latency.
    pub p999: Duration,
    /// Sample count.
    pub count: u64,
}

/// Collects latency samples into a nanosecond histogram.
///
/// Values are kept to three significant digits. A collector from
/// [`new`](Self::new) grows as larger samples arrive; one from
/// [`with_bounds`](Self::with_bounds) clamps samples to its highest value.
pub struct LatencyCollector {
    histogram: Histogram<u64>,
    bounded: bool,
}

impl LatencyCollector {
    /// Creates a new latency collector.
    ///
    /// # Errors
    /// Returns the histogram creation error.
    pub fn new() -> Result<Self, CreationError> {
        Ok(Self {
            histogram: Histogram::new(3)?,
            bounded: false,
        })
    }

    /// Creates a collector tracking up to `highest` without resizing.
    ///
    /// # Errors
    /// Returns the histogram creation error for an unusable range.
    pub fn with_bounds(highest: Duration) -> Result<Self, CreationError> {
        Ok(Self {
            histogram: Histogram::new_with_bounds(1, nanos(highest).max(2), 3)?,
            bounded: true,
        })
    }

    /// Records a latency sample.
    pub fn record(&mut self, latency: Duration) {
        let value = nanos(latency);
        if self.bounded || self.histogram.record(value).is_err() {
            self.histogram.saturating_record(value);
        }
    }

    /// Measures the latency of a function.
    pub fn measure<F, T>(&mut self, f: F) -> T
    where
        F: FnOnce() -> T,
    {
        let start = Instant::now();
        let result = f();
        self.record(start.elapsed());
        result
    }

    /// Computes statistics from collected samples.
    #[must_use]
    pub fn stats(&self) -> Option<LatencyStats> {
        if self.histogram.is_empty() {
            return None;
        }
        let h = &self.histogram;
        Some(LatencyStats {
            min: Duration::from_nanos(h.min()),
            max: Duration::from_nanos(h.max()),
            mean: Duration::from_nanos(h.mean() as u64),
            median: Duration::from_nanos(h.value_at_quantile(0.5)),
            p99: Duration::from_nanos(h.value_at_quantile(0.99)),
            p999: Duration::from_nanos(h.value_at_quantile(0.999)),
            count: h.len(),
        })
    }

    /// Clears all samples.
    pub fn clear(&mut self) {
        self.histogram.reset();
    }

    /// Returns the number of samples.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.histogram.len()
    }

    /// Returns true if no samples have been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.histogram.is_empty()
    }
}

fn nanos(latency: Duration) -> u64 {
    u64::try_from(latency.as_nanos()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_stats() {
        let mut collector = LatencyCollector::new().unwrap();

        for i in 1..=100 {
            collector.record(Duration::from_nanos(i * 100));
        }

        let stats = collector.stats().unwrap();
        assert_eq!(stats.count, 100);
        assert_eq!(stats.min, Duration::from_nanos(100));
        assert!(stats.max >= Duration::from_nanos(10_000));
        assert!(stats.max < Duration::from_nanos(10_016));
        assert!(stats.median >= Duration::from_nanos(5_000));
        assert!(stats.median < Duration::from_nanos(5_100));
        assert!(stats.p99 <= stats.p999);
    }

    #[test]
    fn test_measure() {
        let mut collector = LatencyCollector::new().unwrap();

        let result = collector.measure(|| 42);
        assert_eq!(result, 42);
        assert_eq!(collector.len(), 1);
    }

    #[test]
    fn test_empty_and_clear() {
        let mut collector = LatencyCollector::with_bounds(Duration::from_secs(1)).unwrap();
        assert!(collector.stats().is_none());
        collector.record(Duration::from_micros(3));
        assert!(!collector.is_empty());
        collector.clear();
        assert!(collector.is_empty());
    }

    #[test]
    fn test_growing_collector_keeps_large_samples() {
        let mut collector = LatencyCollector::new().unwrap();
        collector.record(Duration::from_micros(1));
        collector.record(Duration::from_secs(5));
        let stats = collector.stats().unwrap();
        assert_eq!(stats.count, 2);
        assert!(stats.max >= Duration::from_secs(5));
        assert!(stats.max < Duration::from_millis(5_010));
    }

    #[test]
    fn test_out_of_range_sample_saturates() {
        let mut collector = LatencyCollector::with_bounds(Duration::from_micros(10)).unwrap();
        collector.record(Duration::from_secs(5));
        assert_eq!(collector.len(), 1);
        let stats = collector.stats().unwrap();
        assert!(stats.max < Duration::from_micros(11));
    }
}
