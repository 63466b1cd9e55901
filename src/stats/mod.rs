//! Latency samples and descriptive statistics
//!
//! Provides sample collection, unit normalization, and percentile
//! calculation over one sampling run.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{BenchError, BenchResult};

/// Unit of a server-reported duration field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DurationUnit {
    /// Nanoseconds
    Ns,
    /// Milliseconds
    Ms,
    /// Seconds
    S,
}

impl DurationUnit {
    /// Convert a raw value in this unit to milliseconds.
    pub fn to_millis(self, value: f64) -> f64 {
        match self {
            DurationUnit::Ns => value / 1_000_000.0,
            DurationUnit::Ms => value,
            DurationUnit::S => value * 1000.0,
        }
    }
}

/// How the duration samples were measured.
///
/// Server-reported numbers exclude network and serialization overhead;
/// client-measured numbers include it. The two are not comparable, so the
/// strategy travels with the samples and appears in the report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MeasurementStrategy {
    /// The measured side timed itself and returned the elapsed time.
    ServerReported,
    /// The caller timed the call boundary.
    ClientMeasured,
}

impl MeasurementStrategy {
    pub fn name(self) -> &'static str {
        match self {
            MeasurementStrategy::ServerReported => "server-reported",
            MeasurementStrategy::ClientMeasured => "client-measured",
        }
    }
}

impl std::fmt::Display for MeasurementStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Ordered collection of valid latency samples from one run.
///
/// Append-only; every element is a finite, strictly positive duration in
/// milliseconds. Collection order is kept for display only.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SampleSet {
    strategy: MeasurementStrategy,
    samples_ms: Vec<f64>,
}

impl SampleSet {
    /// Create an empty set for the given measurement strategy.
    pub fn new(strategy: MeasurementStrategy) -> Self {
        Self {
            strategy,
            samples_ms: Vec::new(),
        }
    }

    /// Append a sample in milliseconds.
    ///
    /// Returns false without recording anything if the value is
    /// non-positive or not finite; failed invocations must never leak a
    /// sentinel into the statistics.
    pub fn push(&mut self, latency_ms: f64) -> bool {
        if !latency_ms.is_finite() || latency_ms <= 0.0 {
            return false;
        }
        self.samples_ms.push(latency_ms);
        true
    }

    pub fn strategy(&self) -> MeasurementStrategy {
        self.strategy
    }

    pub fn samples_ms(&self) -> &[f64] {
        &self.samples_ms
    }

    pub fn len(&self) -> usize {
        self.samples_ms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples_ms.is_empty()
    }
}

/// Descriptive statistics over one SampleSet, in milliseconds.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SummaryReport {
    pub strategy: MeasurementStrategy,
    pub count: usize,
    pub mean_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub median_ms: f64,
    pub p99_ms: f64,
}

impl SummaryReport {
    /// Compute statistics over the collected samples.
    ///
    /// Fails with `EmptySampleSet` when no valid samples were collected.
    pub fn from_samples(set: &SampleSet) -> BenchResult<Self> {
        if set.is_empty() {
            return Err(BenchError::EmptySampleSet);
        }

        let mut sorted = set.samples_ms().to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let sum: f64 = sorted.iter().sum();

        Ok(Self {
            strategy: set.strategy(),
            count: sorted.len(),
            mean_ms: sum / sorted.len() as f64,
            min_ms: sorted[0],
            max_ms: sorted[sorted.len() - 1],
            median_ms: percentile(&sorted, 50.0),
            p99_ms: percentile(&sorted, 99.0),
        })
    }
}

/// Calculate percentile value from sorted array
///
/// Uses linear interpolation between the two nearest ranks, so results are
/// reproducible across implementations.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }

    let idx = (p / 100.0) * (sorted.len() - 1) as f64;
    let lower = idx.floor() as usize;
    let upper = idx.ceil() as usize;
    let fraction = idx - lower as f64;

    if upper >= sorted.len() {
        sorted[sorted.len() - 1]
    } else {
        sorted[lower] * (1.0 - fraction) + sorted[upper] * fraction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_of(values: &[f64]) -> SampleSet {
        let mut set = SampleSet::new(MeasurementStrategy::ServerReported);
        for v in values {
            assert!(set.push(*v));
        }
        set
    }

    #[test]
    fn test_unit_normalization() {
        assert!((DurationUnit::Ns.to_millis(1_000_000.0) - 1.0).abs() < 1e-12);
        assert!((DurationUnit::S.to_millis(1.5) - 1500.0).abs() < 1e-12);
        assert_eq!(DurationUnit::Ms.to_millis(42.0), 42.0);
    }

    #[test]
    fn test_push_rejects_invalid_samples() {
        let mut set = SampleSet::new(MeasurementStrategy::ClientMeasured);
        assert!(!set.push(0.0));
        assert!(!set.push(-1.0));
        assert!(!set.push(f64::NAN));
        assert!(!set.push(f64::INFINITY));
        assert!(set.is_empty());

        assert!(set.push(0.001));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_empty_set_is_an_error() {
        let set = SampleSet::new(MeasurementStrategy::ServerReported);
        let err = SummaryReport::from_samples(&set).unwrap_err();
        assert!(matches!(err, BenchError::EmptySampleSet));
    }

    #[test]
    fn test_identical_samples() {
        let set = set_of(&[42.0; 100]);
        let report = SummaryReport::from_samples(&set).unwrap();

        assert_eq!(report.count, 100);
        assert!((report.mean_ms - 42.0).abs() < 1e-9);
        assert!((report.median_ms - 42.0).abs() < 1e-9);
        assert!((report.p99_ms - 42.0).abs() < 1e-9);
        assert_eq!(report.min_ms, 42.0);
        assert_eq!(report.max_ms, 42.0);
    }

    #[test]
    fn test_one_to_hundred_anchors() {
        let values: Vec<f64> = (1..=100).map(|x| x as f64).collect();
        let report = SummaryReport::from_samples(&set_of(&values)).unwrap();

        assert!((report.p99_ms - 99.01).abs() < 1e-9);
        assert!((report.median_ms - 50.5).abs() < 1e-9);
        assert_eq!(report.min_ms, 1.0);
        assert_eq!(report.max_ms, 100.0);
        assert!((report.mean_ms - 50.5).abs() < 1e-9);
    }

    #[test]
    fn test_median_odd_count() {
        let report = SummaryReport::from_samples(&set_of(&[5.0, 1.0, 3.0, 2.0, 4.0])).unwrap();
        assert!((report.median_ms - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_ordering_invariants() {
        let values = [12.7, 3.4, 99.2, 54.0, 8.8, 41.3, 27.1];
        let report = SummaryReport::from_samples(&set_of(&values)).unwrap();

        assert!(report.min_ms <= report.median_ms);
        assert!(report.median_ms <= report.max_ms);
        assert!(report.min_ms <= report.mean_ms);
        assert!(report.mean_ms <= report.max_ms);
        assert!(report.min_ms > 0.0);
    }

    #[test]
    fn test_single_sample() {
        let report = SummaryReport::from_samples(&set_of(&[7.5])).unwrap();
        assert_eq!(report.count, 1);
        assert_eq!(report.mean_ms, 7.5);
        assert_eq!(report.median_ms, 7.5);
        assert_eq!(report.p99_ms, 7.5);
    }

    #[test]
    fn test_strategy_travels_with_report() {
        let mut set = SampleSet::new(MeasurementStrategy::ClientMeasured);
        set.push(1.0);
        let report = SummaryReport::from_samples(&set).unwrap();
        assert_eq!(report.strategy, MeasurementStrategy::ClientMeasured);
        assert_eq!(report.strategy.name(), "client-measured");
    }
}
