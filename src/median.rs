use tracing::trace;

use crate::error::{validate_window, Result};
use crate::processor::{median, Signal, SignalProcessor};

/// Sliding-window median filter for impulsive noise.
///
/// Windows that run past either end of the signal are padded by repeating the
/// boundary sample until they hold exactly `window_size` values, so edge
/// outputs are medians of replicated data rather than of a shortened window.
#[derive(Debug, Clone, PartialEq)]
pub struct MedianFilter {
    window_size: usize,
}

impl MedianFilter {
    /// Creates a median filter; `window_size` must be positive and odd.
    ///
    /// # Example
    ///
    /// ```rust
    /// use impulse_denoise::{MedianFilter, SignalProcessor};
    ///
    /// let mut filter = MedianFilter::new(3).expect("valid window");
    /// assert_eq!(filter.process(&[1.0, 2.0, 100.0, 2.0, 1.0]), vec![1.0, 2.0, 2.0, 2.0, 1.0]);
    /// ```
    pub fn new(window_size: usize) -> Result<Self> {
        validate_window(window_size, "Median window size")?;
        Ok(Self { window_size })
    }

    /// Replaces the window size, keeping the old one if the new value is invalid.
    pub fn set_window_size(&mut self, window_size: usize) -> Result<()> {
        validate_window(window_size, "Median window size")?;
        self.window_size = window_size;
        Ok(())
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    fn window_median(&self, input: &[f64], index: usize) -> f64 {
        let half = self.window_size / 2;
        let n = input.len();

        let mut window = Vec::with_capacity(self.window_size);
        // Left padding: positions before the first sample
        let left_pad = half.saturating_sub(index);
        window.extend(std::iter::repeat(input[0]).take(left_pad));

        let start = index.saturating_sub(half);
        let end = (index + half + 1).min(n);
        window.extend_from_slice(&input[start..end]);

        // Right padding: positions past the last sample
        let right_pad = (index + half + 1).saturating_sub(n);
        window.extend(std::iter::repeat(input[n - 1]).take(right_pad));

        median(&window)
    }
}

impl Default for MedianFilter {
    fn default() -> Self {
        Self { window_size: 5 }
    }
}

impl SignalProcessor for MedianFilter {
    fn process(&mut self, input: &[f64]) -> Signal {
        trace!(filter = %self.name(), len = input.len(), "processing");
        (0..input.len()).map(|i| self.window_median(input, i)).collect()
    }

    fn name(&self) -> String {
        format!("MedianFilter_{}", self.window_size)
    }
}
