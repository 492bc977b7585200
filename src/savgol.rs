use tracing::trace;

use crate::coefficients::compute_coefficients;
use crate::error::{validate_window, DenoiseError, Result};
use crate::processor::{Signal, SignalProcessor};

/// Configuration for the Savitzky-Golay filter.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilterConfig {
    /// Size of the filter window (must be odd)
    pub window_size: usize,
    /// Order of the polynomial to fit
    pub poly_order: usize,
}

impl FilterConfig {
    /// Creates a new filter configuration with validation
    pub fn new(window_size: usize, poly_order: usize) -> Result<Self> {
        let config = Self {
            window_size,
            poly_order,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_window(self.window_size, "Savitzky-Golay window size")?;
        if self.poly_order >= self.window_size {
            return Err(DenoiseError::config(format!(
                "Polynomial order {} must be less than window size {}",
                self.poly_order, self.window_size
            )));
        }
        Ok(())
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            window_size: 11,
            poly_order: 3,
        }
    }
}

/// A Savitzky-Golay smoothing filter.
///
/// Taps are derived once per configuration and cached; filtering is a plain
/// convolution in which samples outside the signal are read by reflection
/// about the first and last sample.
#[derive(Debug, Clone, PartialEq)]
pub struct SavitzkyGolayFilter {
    config: FilterConfig,
    coefficients: Vec<f64>,
}

impl SavitzkyGolayFilter {
    /// Creates a new Savitzky-Golay filter with the specified parameters.
    ///
    /// # Arguments
    ///
    /// * `window_size` - Size of the filter window (must be odd)
    /// * `poly_order` - Order of the polynomial to fit (must be < window_size)
    ///
    /// # Example
    ///
    /// ```rust
    /// use impulse_denoise::{SavitzkyGolayFilter, SignalProcessor};
    ///
    /// let mut filter = SavitzkyGolayFilter::new(5, 2).expect("Valid parameters");
    /// let smoothed = filter.process(&[1.0, 2.0, 3.0, 4.0, 5.0, 4.0, 3.0, 2.0, 1.0]);
    /// assert_eq!(smoothed.len(), 9);
    /// ```
    pub fn new(window_size: usize, poly_order: usize) -> Result<Self> {
        Self::with_config(FilterConfig::new(window_size, poly_order)?)
    }

    /// Creates a filter with custom configuration
    pub fn with_config(config: FilterConfig) -> Result<Self> {
        config.validate()?;
        let coefficients = compute_coefficients(config.window_size, config.poly_order)?;
        Ok(Self {
            config,
            coefficients,
        })
    }

    /// Recomputes the taps for new parameters.
    ///
    /// If validation or the solve fails, the filter keeps its previous
    /// configuration and taps.
    pub fn set_parameters(&mut self, window_size: usize, poly_order: usize) -> Result<()> {
        let config = FilterConfig::new(window_size, poly_order)?;
        let coefficients = compute_coefficients(window_size, poly_order)?;
        self.config = config;
        self.coefficients = coefficients;
        Ok(())
    }

    /// Returns the filter configuration
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Cached convolution taps, from offset `-half` to `+half`.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    fn filtered_value(&self, data: &[f64], center: usize) -> f64 {
        let half = (self.config.window_size / 2) as isize;
        self.coefficients
            .iter()
            .enumerate()
            .map(|(j, &coeff)| {
                let idx = center as isize - half + j as isize;
                coeff * reflected_value(data, idx)
            })
            .sum()
    }
}

impl SignalProcessor for SavitzkyGolayFilter {
    fn process(&mut self, input: &[f64]) -> Signal {
        trace!(filter = %self.name(), len = input.len(), "processing");
        (0..input.len())
            .map(|i| self.filtered_value(input, i))
            .collect()
    }

    fn name(&self) -> String {
        format!(
            "SavgolFilter_{}_{}",
            self.config.window_size, self.config.poly_order
        )
    }
}

/// Reads `data[index]`, reflecting out-of-range indices about the end samples.
///
/// Negative indices map to `-index`; indices at or past the end map to
/// `2 * len - 2 - index`. Signals shorter than half a window can reflect out
/// of range again, in which case the first sample is used.
fn reflected_value(data: &[f64], index: isize) -> f64 {
    let n = data.len() as isize;
    let mut idx = if index < 0 { -index } else { index };
    if idx >= n {
        idx = 2 * n - 2 - idx;
    }
    if (0..n).contains(&idx) {
        data[idx as usize]
    } else {
        data[0]
    }
}
