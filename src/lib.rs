//! # Impulse Denoise
//!
//! Interchangeable filters for suppressing impulsive noise in one-dimensional,
//! uniformly sampled real signals, together with the metrics used to score them.
//!
//! Every filter implements [`SignalProcessor`], so a benchmark driver can hold a
//! heterogeneous bank of `Box<dyn SignalProcessor>` and score each one with
//! [`snr`], [`mse`] and [`correlation`].
//!
//! ## Filters
//!
//! - [`MedianFilter`]: sliding-window median with edge replication
//! - [`AdaptiveFilter`] (a.k.a. [`WienerFilter`]): online LMS or RLS predictor
//! - [`MorphologicalFilter`]: erosion, dilation, opening and closing
//! - [`OutlierDetector`]: pluggable detection plus interpolation of outliers
//! - [`SavitzkyGolayFilter`]: least-squares polynomial smoothing
//!
//! ## Example
//!
//! ```rust
//! use impulse_denoise::{snr, MedianFilter, SignalProcessor};
//!
//! let clean = vec![1.0, 1.0, 1.0, 1.0, 1.0, 1.0];
//! let noisy = vec![1.0, 1.0, 9.0, 1.0, 1.0, 1.0];
//!
//! let mut filter = MedianFilter::new(3).expect("Invalid parameters");
//! let (filtered, _elapsed) = filter.measure(&noisy);
//! assert_eq!(snr(&clean, &filtered), 100.0);
//! ```

mod adaptive;
mod coefficients;
mod csv_utils;
mod error;
pub mod evaluation;
mod median;
mod metrics;
mod morphology;
mod outlier;
mod processor;
mod savgol;

pub use adaptive::{AdaptiveConfig, AdaptiveFilter, AdaptiveStrategy, WienerFilter};
pub use coefficients::{compute_coefficients, gauss_eliminate};
pub use csv_utils::{read_signal, read_signal_column, read_signal_column_by_index, write_signal};
pub use error::{DenoiseError, Result};
pub use median::MedianFilter;
pub use metrics::{correlation, mse, snr, SNR_NOISELESS};
pub use morphology::{MorphOperation, MorphologicalFilter};
pub use outlier::{
    DetectionMethod, InterpolationMethod, OutlierConfig, OutlierDetector, OutlierMask, AR_ORDER,
};
pub use processor::{linear_interpolate, mad, mean_absolute_deviation, median, Signal, SignalProcessor};
pub use savgol::{FilterConfig, SavitzkyGolayFilter};

/// Builds the filter bank used by the reference comparison: one representative
/// of each algorithm with its customary parameters.
///
/// # Example
///
/// ```rust
/// let bank = impulse_denoise::default_filter_bank().unwrap();
/// assert_eq!(bank.len(), 5);
/// ```
pub fn default_filter_bank() -> Result<Vec<Box<dyn SignalProcessor>>> {
    Ok(vec![
        Box::new(MedianFilter::new(7)?),
        Box::new(AdaptiveFilter::with_parameters(8, 0.01, 0.99)?),
        Box::new(MorphologicalFilter::new(MorphOperation::Opening, 5)?),
        Box::new(OutlierDetector::new(OutlierConfig::new(3.0, 11)?)?),
        Box::new(SavitzkyGolayFilter::new(11, 3)?),
    ])
}

/// Applies a 5-point median filter, the usual first choice for isolated spikes.
///
/// # Example
///
/// ```rust
/// use impulse_denoise::despike;
///
/// let cleaned = despike(&[1.0, 1.0, 50.0, 1.0, 1.0]);
/// assert_eq!(cleaned, vec![1.0; 5]);
/// ```
pub fn despike(data: &[f64]) -> Signal {
    MedianFilter::default().process(data)
}
