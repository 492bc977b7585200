//! Outlier detection and replacement.
//!
//! Processing is two-stage: a detection method produces an [`OutlierMask`],
//! then an interpolation method rebuilds the flagged samples from the
//! unflagged ones. Both stages are chosen independently in [`OutlierConfig`].

use std::fmt;

use tracing::trace;

use crate::error::{validate_window, DenoiseError, Result};
use crate::processor::{
    clipped_window, linear_interpolate, mad, mean_absolute_deviation, median, Signal,
    SignalProcessor,
};

/// `true` where a sample was flagged as an outlier.
pub type OutlierMask = Vec<bool>;

/// Number of preceding samples used by autoregressive interpolation.
pub const AR_ORDER: usize = 5;

/// Cap on the half-width of the neighbourhood used by median interpolation.
const MEDIAN_NEIGHBOUR_CAP: usize = 5;

/// How outliers are flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DetectionMethod {
    /// Deviation from the local median in units of local MAD
    #[default]
    MadBased,
    /// Global z-score
    Statistical,
    /// Deviation from the local mean (centre excluded) in units of local std
    AdaptiveThreshold,
}

/// How flagged samples are replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InterpolationMethod {
    /// Straight line between the nearest unflagged neighbours
    #[default]
    Linear,
    /// Accepted for compatibility; behaves like `Linear`
    Spline,
    /// Median of nearby unflagged samples
    MedianBased,
    /// Inverse-distance weighted mean of preceding unflagged samples
    Autoregressive,
}

impl fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DetectionMethod::MadBased => "MAD",
            DetectionMethod::Statistical => "Statistical",
            DetectionMethod::AdaptiveThreshold => "Adaptive",
        })
    }
}

impl fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InterpolationMethod::Linear => "Linear",
            InterpolationMethod::Spline => "Spline",
            InterpolationMethod::MedianBased => "Median",
            InterpolationMethod::Autoregressive => "AR",
        })
    }
}

/// Parameters of the outlier detector.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OutlierConfig {
    pub detection: DetectionMethod,
    pub interpolation: InterpolationMethod,
    /// Detection threshold in MADs or standard deviations, must be positive
    pub threshold: f64,
    /// Analysis window, positive and odd
    pub window_size: usize,
}

impl OutlierConfig {
    /// Creates a validated MAD + linear configuration.
    pub fn new(threshold: f64, window_size: usize) -> Result<Self> {
        let config = Self {
            detection: DetectionMethod::MadBased,
            interpolation: InterpolationMethod::Linear,
            threshold,
            window_size,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_detection(mut self, detection: DetectionMethod) -> Self {
        self.detection = detection;
        self
    }

    pub fn with_interpolation(mut self, interpolation: InterpolationMethod) -> Self {
        self.interpolation = interpolation;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.threshold > 0.0) {
            return Err(DenoiseError::config(format!(
                "Threshold must be positive, got {}",
                self.threshold
            )));
        }
        validate_window(self.window_size, "Outlier window size")
    }
}

impl Default for OutlierConfig {
    fn default() -> Self {
        Self {
            detection: DetectionMethod::MadBased,
            interpolation: InterpolationMethod::Linear,
            threshold: 3.0,
            window_size: 11,
        }
    }
}

/// Detects impulsive outliers and replaces them by interpolation.
///
/// # Example
///
/// ```rust
/// use impulse_denoise::{OutlierConfig, OutlierDetector, SignalProcessor};
///
/// let mut detector = OutlierDetector::new(OutlierConfig::new(3.0, 5).unwrap()).unwrap();
/// let data = [0.0, 0.0, 0.0, 10.0, 0.0, 0.0, 0.0];
/// assert_eq!(detector.detect(&data), vec![false, false, false, true, false, false, false]);
/// assert_eq!(detector.process(&data), vec![0.0; 7]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OutlierDetector {
    config: OutlierConfig,
}

impl OutlierDetector {
    pub fn new(config: OutlierConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Replaces all parameters; the old configuration survives a failed call.
    pub fn set_parameters(&mut self, config: OutlierConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn config(&self) -> &OutlierConfig {
        &self.config
    }

    /// Flags outliers with the configured detection method.
    pub fn detect(&self, input: &[f64]) -> OutlierMask {
        match self.config.detection {
            DetectionMethod::MadBased => self.detect_mad(input),
            DetectionMethod::Statistical => self.detect_statistical(input),
            DetectionMethod::AdaptiveThreshold => self.detect_adaptive(input),
        }
    }

    /// Rebuilds flagged samples with the configured interpolation method.
    ///
    /// `mask` must hold one flag per input sample; any other length is rejected.
    pub fn interpolate(&self, input: &[f64], mask: &[bool]) -> Result<Signal> {
        if mask.len() != input.len() {
            return Err(DenoiseError::config(format!(
                "Outlier mask has {} flags for {} samples",
                mask.len(),
                input.len()
            )));
        }
        Ok(self.rebuild(input, mask))
    }

    fn rebuild(&self, input: &[f64], mask: &[bool]) -> Signal {
        match self.config.interpolation {
            InterpolationMethod::Linear | InterpolationMethod::Spline => {
                interpolate_linear(input, mask)
            }
            InterpolationMethod::MedianBased => self.interpolate_median(input, mask),
            InterpolationMethod::Autoregressive => interpolate_autoregressive(input, mask),
        }
    }

    fn detect_mad(&self, input: &[f64]) -> OutlierMask {
        let threshold = self.config.threshold;
        (0..input.len())
            .map(|i| {
                let (start, end) = clipped_window(i, self.config.window_size, input.len());
                let window = &input[start..end];
                if window.len() < 3 {
                    return false;
                }

                let med = median(window);
                // Plateaus give a zero MAD; fall back to the mean deviation
                let mut scale = mad(window, med);
                if scale == 0.0 {
                    scale = mean_absolute_deviation(window, med);
                }

                scale > 0.0 && (input[i] - med).abs() > threshold * scale
            })
            .collect()
    }

    fn detect_statistical(&self, input: &[f64]) -> OutlierMask {
        let mut mask = vec![false; input.len()];
        if input.is_empty() {
            return mask;
        }

        let n = input.len() as f64;
        let mean = input.iter().sum::<f64>() / n;
        let stddev = (input.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
        if stddev == 0.0 {
            return mask;
        }

        for (flag, &value) in mask.iter_mut().zip(input) {
            *flag = (value - mean).abs() / stddev > self.config.threshold;
        }
        mask
    }

    fn detect_adaptive(&self, input: &[f64]) -> OutlierMask {
        let threshold = self.config.threshold;
        (0..input.len())
            .map(|i| {
                let (start, end) = clipped_window(i, self.config.window_size, input.len());
                let neighbours: Vec<f64> = (start..end)
                    .filter(|&j| j != i)
                    .map(|j| input[j])
                    .collect();
                if neighbours.is_empty() {
                    return false;
                }

                let count = neighbours.len() as f64;
                let local_mean = neighbours.iter().sum::<f64>() / count;
                let local_std = (neighbours
                    .iter()
                    .map(|v| (v - local_mean).powi(2))
                    .sum::<f64>()
                    / count)
                    .sqrt();

                let limit = if local_std == 0.0 {
                    threshold
                } else {
                    threshold * local_std
                };
                (input[i] - local_mean).abs() > limit
            })
            .collect()
    }

    fn interpolate_median(&self, input: &[f64], mask: &[bool]) -> Signal {
        let half = (self.config.window_size / 2).min(MEDIAN_NEIGHBOUR_CAP);
        let mut result = input.to_vec();

        for (i, &flagged) in mask.iter().enumerate() {
            if !flagged {
                continue;
            }
            let start = i.saturating_sub(half);
            let end = (i + half + 1).min(input.len());
            let neighbours: Vec<f64> = (start..end)
                .filter(|&j| j != i && !mask[j])
                .map(|j| input[j])
                .collect();
            if !neighbours.is_empty() {
                result[i] = median(&neighbours);
            }
        }

        result
    }
}

impl SignalProcessor for OutlierDetector {
    fn process(&mut self, input: &[f64]) -> Signal {
        trace!(filter = %self.name(), len = input.len(), "processing");
        if input.is_empty() {
            return Vec::new();
        }
        let mask = self.detect(input);
        self.rebuild(input, &mask)
    }

    fn name(&self) -> String {
        format!(
            "OutlierDetection_{}_{}_{}_{}",
            self.config.detection,
            self.config.interpolation,
            (self.config.threshold * 100.0) as i64,
            self.config.window_size
        )
    }
}

/// Nearest unflagged indices to the left and right of `index`, searching the
/// whole signal.
fn nearest_normal(mask: &[bool], index: usize) -> (Option<usize>, Option<usize>) {
    let left = (0..index).rev().find(|&j| !mask[j]);
    let right = (index + 1..mask.len()).find(|&j| !mask[j]);
    (left, right)
}

fn linear_estimate(input: &[f64], mask: &[bool], index: usize) -> f64 {
    match nearest_normal(mask, index) {
        (Some(l), Some(r)) => {
            linear_interpolate(l as f64, input[l], r as f64, input[r], index as f64)
        }
        (Some(l), None) => input[l],
        (None, Some(r)) => input[r],
        (None, None) => input[index],
    }
}

fn interpolate_linear(input: &[f64], mask: &[bool]) -> Signal {
    input
        .iter()
        .zip(mask)
        .enumerate()
        .map(|(i, (&value, &flagged))| {
            if flagged {
                linear_estimate(input, mask, i)
            } else {
                value
            }
        })
        .collect()
}

/// Left-to-right fold: each flagged sample is predicted from the already
/// resolved output, so results depend on processing order.
fn interpolate_autoregressive(input: &[f64], mask: &[bool]) -> Signal {
    let mut result = input.to_vec();

    for i in 0..result.len() {
        if !mask[i] {
            continue;
        }

        let (sum, weight_sum) = (1..=AR_ORDER.min(i))
            .filter(|&lag| !mask[i - lag])
            .fold((0.0, 0.0), |(sum, weights), lag| {
                let weight = 1.0 / lag as f64;
                (sum + weight * result[i - lag], weights + weight)
            });

        result[i] = if weight_sum > 0.0 {
            sum / weight_sum
        } else {
            linear_estimate(input, mask, i)
        };
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn detector(
        detection: DetectionMethod,
        interpolation: InterpolationMethod,
        threshold: f64,
        window_size: usize,
    ) -> OutlierDetector {
        let config = OutlierConfig::new(threshold, window_size)
            .unwrap()
            .with_detection(detection)
            .with_interpolation(interpolation);
        OutlierDetector::new(config).unwrap()
    }

    #[test]
    fn test_mad_flags_isolated_spike() {
        let mut d = detector(DetectionMethod::MadBased, InterpolationMethod::Linear, 3.0, 5);
        let data = [0.0, 0.0, 0.0, 10.0, 0.0, 0.0, 0.0];
        let mask = d.detect(&data);
        assert_eq!(mask, vec![false, false, false, true, false, false, false]);
        assert_eq!(d.process(&data), vec![0.0; 7]);
    }

    #[test]
    fn test_mad_skips_short_windows() {
        let d = detector(DetectionMethod::MadBased, InterpolationMethod::Linear, 1.0, 1);
        assert_eq!(d.detect(&[0.0, 100.0, 0.0]), vec![false; 3]);
    }

    #[test]
    fn test_mad_on_alternating_background() {
        let d = detector(DetectionMethod::MadBased, InterpolationMethod::Linear, 3.0, 7);
        let data = [1.0, 2.0, 1.0, 2.0, 1.0, 20.0, 2.0, 1.0, 2.0, 1.0, 2.0];
        let mask = d.detect(&data);
        assert!(mask[5]);
        assert_eq!(mask.iter().filter(|&&f| f).count(), 1);
    }

    #[test]
    fn test_statistical_detection() {
        let d = detector(DetectionMethod::Statistical, InterpolationMethod::Linear, 2.0, 5);
        let mut data = vec![0.0; 20];
        data[10] = 50.0;
        let mask = d.detect(&data);
        assert!(mask[10]);
        assert_eq!(mask.iter().filter(|&&f| f).count(), 1);

        assert_eq!(d.detect(&[4.0; 6]), vec![false; 6]);
        assert!(d.detect(&[]).is_empty());
    }

    #[test]
    fn test_adaptive_detection_excludes_centre() {
        let d = detector(
            DetectionMethod::AdaptiveThreshold,
            InterpolationMethod::Linear,
            2.0,
            5,
        );
        // Flat neighbourhood: local std is zero and the flat threshold applies
        let mask = d.detect(&[1.0, 1.0, 4.0, 1.0, 1.0]);
        assert_eq!(mask, vec![false, false, true, false, false]);

        let mask = d.detect(&[1.0, 1.0, 2.5, 1.0, 1.0]);
        assert_eq!(mask, vec![false; 5]);
    }

    #[test]
    fn test_linear_interpolation_between_anchors() {
        let mask = [false, true, true, false];
        let output = interpolate_linear(&[0.0, 99.0, 99.0, 3.0], &mask);
        assert_abs_diff_eq!(output[1], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(output[2], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_linear_interpolation_one_sided_and_none() {
        assert_eq!(
            interpolate_linear(&[5.0, 99.0, 99.0], &[false, true, true]),
            vec![5.0, 5.0, 5.0]
        );
        assert_eq!(
            interpolate_linear(&[99.0, 7.0], &[true, false]),
            vec![7.0, 7.0]
        );
        assert_eq!(interpolate_linear(&[1.0, 2.0], &[true, true]), vec![1.0, 2.0]);
    }

    #[test]
    fn test_median_interpolation() {
        let d = detector(DetectionMethod::MadBased, InterpolationMethod::MedianBased, 3.0, 5);
        let data = [1.0, 2.0, 50.0, 4.0, 9.0];
        let mask = [false, false, true, false, false];
        // Neighbours 1, 2, 4, 9 -> median 3
        assert_eq!(d.interpolate(&data, &mask).unwrap(), vec![1.0, 2.0, 3.0, 4.0, 9.0]);

        let lonely = d.interpolate(&[7.0, 8.0], &[true, true]).unwrap();
        assert_eq!(lonely, vec![7.0, 8.0]);
    }

    #[test]
    fn test_median_interpolation_window_cap() {
        let d = detector(DetectionMethod::MadBased, InterpolationMethod::MedianBased, 3.0, 31);
        let mut data = vec![100.0; 20];
        data[10] = -5.0;
        let mut mask = vec![true; 20];
        // Only samples further than 5 away are unflagged, so nothing is used
        mask[0] = false;
        mask[19] = false;
        assert_eq!(d.interpolate(&data, &mask).unwrap()[10], -5.0);
    }

    #[test]
    fn test_autoregressive_weighting() {
        let data = [1.0, 2.0, 4.0, 99.0];
        let mask = [false, false, false, true];
        let output = interpolate_autoregressive(&data, &mask);
        // (4/1 + 2/2 + 1/3) / (1 + 1/2 + 1/3)
        let expected = (4.0 + 1.0 + 1.0 / 3.0) / (1.0 + 0.5 + 1.0 / 3.0);
        assert_abs_diff_eq!(output[3], expected, epsilon = 1e-12);
    }

    #[test]
    fn test_autoregressive_falls_back_to_linear() {
        let output = interpolate_autoregressive(&[99.0, 4.0, 6.0], &[true, false, false]);
        assert_eq!(output, vec![4.0, 4.0, 6.0]);
    }

    #[test]
    fn test_interpolate_rejects_mismatched_mask() {
        for interpolation in [
            InterpolationMethod::Linear,
            InterpolationMethod::Spline,
            InterpolationMethod::MedianBased,
            InterpolationMethod::Autoregressive,
        ] {
            let d = detector(DetectionMethod::MadBased, interpolation, 3.0, 5);
            let data = [1.0, 2.0, 3.0];
            assert!(matches!(
                d.interpolate(&data, &[false, true]),
                Err(DenoiseError::InvalidConfiguration(_))
            ));
            assert!(d.interpolate(&data, &[false, true, false, true]).is_err());
            assert_eq!(d.interpolate(&data, &[false; 3]).unwrap(), data.to_vec());
        }
    }

    #[test]
    fn test_spline_behaves_like_linear() {
        let data = [0.0, 0.0, 0.0, 10.0, 0.0, 2.0, 0.0];
        let mut linear = detector(DetectionMethod::MadBased, InterpolationMethod::Linear, 3.0, 5);
        let mut spline = detector(DetectionMethod::MadBased, InterpolationMethod::Spline, 3.0, 5);
        assert_eq!(linear.process(&data), spline.process(&data));
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(OutlierConfig::new(0.0, 5).is_err());
        assert!(OutlierConfig::new(-1.0, 5).is_err());
        assert!(OutlierConfig::new(3.0, 4).is_err());
        assert!(OutlierConfig::new(3.0, 0).is_err());

        let mut d = OutlierDetector::default();
        let bad = OutlierConfig {
            threshold: 0.0,
            ..OutlierConfig::default()
        };
        assert!(d.set_parameters(bad).is_err());
        assert_eq!(d.config().threshold, 3.0);
    }

    #[test]
    fn test_name() {
        let d = detector(
            DetectionMethod::AdaptiveThreshold,
            InterpolationMethod::Autoregressive,
            2.5,
            7,
        );
        assert_eq!(d.name(), "OutlierDetection_Adaptive_AR_250_7");
        assert_eq!(OutlierDetector::default().name(), "OutlierDetection_MAD_Linear_300_11");
    }
}
