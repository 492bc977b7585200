//! Grey-scale morphological filtering of 1-D signals.
//!
//! Opening removes positive spikes narrower than the structuring element,
//! closing removes negative ones. Positions of the element that fall outside
//! the signal are skipped rather than padded.

use std::fmt;

use tracing::trace;

use crate::error::{DenoiseError, Result};
use crate::processor::{Signal, SignalProcessor};

/// Morphological operation applied by [`MorphologicalFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MorphOperation {
    /// Erosion followed by dilation
    #[default]
    Opening,
    /// Dilation followed by erosion
    Closing,
    /// Windowed minimum
    Erosion,
    /// Windowed maximum
    Dilation,
}

impl fmt::Display for MorphOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MorphOperation::Opening => "Opening",
            MorphOperation::Closing => "Closing",
            MorphOperation::Erosion => "Erosion",
            MorphOperation::Dilation => "Dilation",
        };
        f.write_str(name)
    }
}

/// Morphological filter over a structuring element of additive offsets.
#[derive(Debug, Clone, PartialEq)]
pub struct MorphologicalFilter {
    operation: MorphOperation,
    element: Vec<f64>,
}

impl MorphologicalFilter {
    /// Creates a filter with a flat (all-zero) element of `element_size` positions.
    pub fn new(operation: MorphOperation, element_size: usize) -> Result<Self> {
        Ok(Self {
            operation,
            element: flat_element(element_size)?,
        })
    }

    /// Creates a filter with an explicit structuring element.
    pub fn with_element(operation: MorphOperation, element: Vec<f64>) -> Result<Self> {
        validate_element(&element)?;
        Ok(Self { operation, element })
    }

    pub fn set_operation(&mut self, operation: MorphOperation) {
        self.operation = operation;
    }

    /// Replaces the structuring element; an empty element is rejected and the
    /// current one kept.
    pub fn set_structuring_element(&mut self, element: Vec<f64>) -> Result<()> {
        validate_element(&element)?;
        self.element = element;
        Ok(())
    }

    pub fn operation(&self) -> MorphOperation {
        self.operation
    }

    pub fn structuring_element(&self) -> &[f64] {
        &self.element
    }

    /// Windowed minimum of `input[i - half + j] - element[j]`.
    pub fn erode(&self, input: &[f64]) -> Signal {
        self.extremum(input, |value, offset| value - offset, f64::min)
    }

    /// Windowed maximum of `input[i - half + j] + element[j]`.
    pub fn dilate(&self, input: &[f64]) -> Signal {
        self.extremum(input, |value, offset| value + offset, f64::max)
    }

    /// Erosion then dilation with the same element.
    pub fn open(&self, input: &[f64]) -> Signal {
        self.dilate(&self.erode(input))
    }

    /// Dilation then erosion with the same element.
    pub fn close(&self, input: &[f64]) -> Signal {
        self.erode(&self.dilate(input))
    }

    fn extremum(
        &self,
        input: &[f64],
        shift: impl Fn(f64, f64) -> f64,
        pick: impl Fn(f64, f64) -> f64,
    ) -> Signal {
        let n = input.len() as isize;
        let half = (self.element.len() / 2) as isize;

        (0..input.len())
            .map(|i| {
                self.element
                    .iter()
                    .enumerate()
                    .filter_map(|(j, &offset)| {
                        let idx = i as isize - half + j as isize;
                        (0..n)
                            .contains(&idx)
                            .then(|| shift(input[idx as usize], offset))
                    })
                    .reduce(&pick)
                    // No in-bounds position: keep the sample itself
                    .unwrap_or(input[i])
            })
            .collect()
    }
}

impl Default for MorphologicalFilter {
    fn default() -> Self {
        Self {
            operation: MorphOperation::Opening,
            element: vec![0.0; 5],
        }
    }
}

impl SignalProcessor for MorphologicalFilter {
    fn process(&mut self, input: &[f64]) -> Signal {
        trace!(filter = %self.name(), len = input.len(), "processing");
        match self.operation {
            MorphOperation::Erosion => self.erode(input),
            MorphOperation::Dilation => self.dilate(input),
            MorphOperation::Opening => self.open(input),
            MorphOperation::Closing => self.close(input),
        }
    }

    fn name(&self) -> String {
        format!("MorphologicalFilter_{}_{}", self.operation, self.element.len())
    }
}

fn flat_element(size: usize) -> Result<Vec<f64>> {
    if size == 0 {
        return Err(DenoiseError::config("Structuring element size must be positive"));
    }
    Ok(vec![0.0; size])
}

fn validate_element(element: &[f64]) -> Result<()> {
    if element.is_empty() {
        return Err(DenoiseError::config("Structuring element cannot be empty"));
    }
    Ok(())
}
