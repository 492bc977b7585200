//! The contract shared by every filter in the crate, plus the order-statistic
//! helpers several filters build on.

use std::time::{Duration, Instant};

/// A uniformly sampled real signal. The index is the time axis.
pub type Signal = Vec<f64>;

/// Common interface implemented by every denoising algorithm.
///
/// `process` takes `&mut self`: the adaptive predictor carries its weights
/// from one call to the next.
pub trait SignalProcessor {
    /// Filters `input` and returns a fresh signal of the same length.
    ///
    /// An empty input yields an empty output. The input is never modified.
    fn process(&mut self, input: &[f64]) -> Signal;

    /// Human-readable identifier embedding the filter parameters,
    /// e.g. `MedianFilter_5`. Meant for reports, not for equality checks.
    fn name(&self) -> String;

    /// Runs [`process`](Self::process) under a monotonic timer.
    ///
    /// Timing is best-effort: unrelated work on the same machine can inflate it.
    fn measure(&mut self, input: &[f64]) -> (Signal, Duration) {
        let start = Instant::now();
        let output = self.process(input);
        (output, start.elapsed())
    }
}

impl<P: SignalProcessor + ?Sized> SignalProcessor for Box<P> {
    fn process(&mut self, input: &[f64]) -> Signal {
        (**self).process(input)
    }

    fn name(&self) -> String {
        (**self).name()
    }
}

/// Median of a set of values; the mean of the two middle values for even
/// counts and `0.0` for an empty slice.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Median absolute deviation of `values` around `center`.
pub fn mad(values: &[f64], center: f64) -> f64 {
    let deviations: Vec<f64> = values.iter().map(|v| (v - center).abs()).collect();
    median(&deviations)
}

/// Mean absolute deviation of `values` around `center`, `0.0` when empty.
pub fn mean_absolute_deviation(values: &[f64], center: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|v| (v - center).abs()).sum::<f64>() / values.len() as f64
}

/// Linear interpolation through `(x1, y1)` and `(x2, y2)` evaluated at `x`.
///
/// Coincident abscissae return `y1`.
pub fn linear_interpolate(x1: f64, y1: f64, x2: f64, y2: f64, x: f64) -> f64 {
    if (x2 - x1).abs() < 1e-10 {
        return y1;
    }
    y1 + (y2 - y1) * (x - x1) / (x2 - x1)
}

/// Bounds `[start, end)` of the window of `window_size` samples centred on
/// `index`, clipped to a signal of length `len`.
pub(crate) fn clipped_window(index: usize, window_size: usize, len: usize) -> (usize, usize) {
    let half = window_size / 2;
    (index.saturating_sub(half), (index + half + 1).min(len))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    struct Identity;

    impl SignalProcessor for Identity {
        fn process(&mut self, input: &[f64]) -> Signal {
            input.to_vec()
        }

        fn name(&self) -> String {
            "Identity".to_string()
        }
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median(&[]), 0.0);
    }

    #[test]
    fn test_mad_and_mean_deviation() {
        let values = [0.0, 0.0, 10.0, 0.0, 0.0];
        assert_eq!(mad(&values, 0.0), 0.0);
        assert_abs_diff_eq!(mean_absolute_deviation(&values, 0.0), 2.0, epsilon = 1e-12);
        assert_eq!(mad(&[1.0, 2.0, 3.0, 4.0, 100.0], 3.0), 1.0);
    }

    #[test]
    fn test_linear_interpolate() {
        assert_abs_diff_eq!(linear_interpolate(0.0, 0.0, 4.0, 8.0, 1.0), 2.0, epsilon = 1e-12);
        assert_eq!(linear_interpolate(2.0, 5.0, 2.0, 9.0, 2.0), 5.0);
    }

    #[test]
    fn test_clipped_window() {
        assert_eq!(clipped_window(0, 5, 10), (0, 3));
        assert_eq!(clipped_window(5, 5, 10), (3, 8));
        assert_eq!(clipped_window(9, 5, 10), (7, 10));
    }

    #[test]
    fn test_measure_wraps_process() {
        let mut identity = Identity;
        let (output, _elapsed) = identity.measure(&[1.0, 2.0]);
        assert_eq!(output, vec![1.0, 2.0]);

        let mut boxed: Box<dyn SignalProcessor> = Box::new(Identity);
        assert_eq!(boxed.name(), "Identity");
        assert_eq!(boxed.process(&[]), Vec::<f64>::new());
    }
}
