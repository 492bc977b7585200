//! Scoring filters against datasets of `(clean, noisy)` signal pairs.
//!
//! This is the thin layer a benchmark driver sits on: it runs
//! [`SignalProcessor::measure`] over a dataset and aggregates the quality
//! metrics. Report formatting and dataset generation live elsewhere.

use std::time::Duration;

use tracing::{info, warn};

use crate::metrics::{correlation, mse, snr};
use crate::processor::{Signal, SignalProcessor};

/// Smallest mean MSE entering the quality index.
const MSE_FLOOR: f64 = 1e-10;

/// Mean and population standard deviation of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Summary {
    pub mean: f64,
    pub std: f64,
}

impl Summary {
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Self {
            mean,
            std: variance.sqrt(),
        }
    }
}

/// Per-pair scores of one filter over a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    pub algorithm: String,
    pub snr: Vec<f64>,
    pub mse: Vec<f64>,
    pub correlation: Vec<f64>,
    pub elapsed: Vec<Duration>,
}

impl EvaluationReport {
    fn new(algorithm: String, capacity: usize) -> Self {
        Self {
            algorithm,
            snr: Vec::with_capacity(capacity),
            mse: Vec::with_capacity(capacity),
            correlation: Vec::with_capacity(capacity),
            elapsed: Vec::with_capacity(capacity),
        }
    }

    pub fn snr_summary(&self) -> Summary {
        Summary::from_values(&self.snr)
    }

    pub fn mse_summary(&self) -> Summary {
        Summary::from_values(&self.mse)
    }

    pub fn correlation_summary(&self) -> Summary {
        Summary::from_values(&self.correlation)
    }

    /// Execution time statistics in microseconds.
    pub fn elapsed_summary(&self) -> Summary {
        let micros: Vec<f64> = self
            .elapsed
            .iter()
            .map(|d| d.as_secs_f64() * 1e6)
            .collect();
        Summary::from_values(&micros)
    }

    /// Combined score: mean SNR plus mean correlation minus `log10` of mean MSE.
    ///
    /// The MSE is floored at `1e-10` so a perfect filter scores finitely.
    pub fn quality_index(&self) -> f64 {
        self.snr_summary().mean + self.correlation_summary().mean
            - self.mse_summary().mean.max(MSE_FLOOR).log10()
    }
}

/// Differences between two evaluated filters. Positive differences and
/// ratios above one favour the first filter, except `speed_ratio`, where
/// values below one mean the first filter is faster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparison {
    pub snr_difference: f64,
    /// Second filter's mean MSE over the first's. A perfect first filter
    /// gives infinity, or 1.0 when both are perfect.
    pub mse_ratio: f64,
    pub correlation_difference: f64,
    /// First filter's mean execution time over the second's, with the same
    /// zero-denominator rule as `mse_ratio`
    pub speed_ratio: f64,
    pub quality_index_difference: f64,
}

/// Runs `filter` over every noisy signal and scores it against the clean one.
///
/// Pairs whose lengths differ, or that are empty, are skipped with a warning.
pub fn evaluate(
    filter: &mut dyn SignalProcessor,
    dataset: &[(Signal, Signal)],
) -> EvaluationReport {
    let mut report = EvaluationReport::new(filter.name(), dataset.len());

    for (index, (clean, noisy)) in dataset.iter().enumerate() {
        if clean.len() != noisy.len() || clean.is_empty() {
            warn!(
                index,
                clean_len = clean.len(),
                noisy_len = noisy.len(),
                "skipping unusable dataset pair"
            );
            continue;
        }

        let (filtered, elapsed) = filter.measure(noisy);
        report.snr.push(snr(clean, &filtered));
        report.mse.push(mse(clean, &filtered));
        report.correlation.push(correlation(clean, &filtered));
        report.elapsed.push(elapsed);
    }

    info!(
        algorithm = %report.algorithm,
        pairs = report.snr.len(),
        mean_snr = report.snr_summary().mean,
        "evaluation finished"
    );
    report
}

/// Evaluates both filters on the same dataset and compares their means.
pub fn compare(
    first: &mut dyn SignalProcessor,
    second: &mut dyn SignalProcessor,
    dataset: &[(Signal, Signal)],
) -> Comparison {
    let a = evaluate(first, dataset);
    let b = evaluate(second, dataset);

    Comparison {
        snr_difference: a.snr_summary().mean - b.snr_summary().mean,
        mse_ratio: ratio(b.mse_summary().mean, a.mse_summary().mean),
        correlation_difference: a.correlation_summary().mean - b.correlation_summary().mean,
        speed_ratio: ratio(a.elapsed_summary().mean, b.elapsed_summary().mean),
        quality_index_difference: a.quality_index() - b.quality_index(),
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else if numerator > 0.0 {
        f64::INFINITY
    } else {
        1.0
    }
}
