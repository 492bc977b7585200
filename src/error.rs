use thiserror::Error;

/// Error types for filter construction and the I/O boundary.
#[derive(Debug, Error)]
pub enum DenoiseError {
    /// A parameter invariant was violated at construction or reconfiguration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// The least-squares system behind a filter could not be solved
    #[error("Numerical error: {0}")]
    NumericalError(String),
    /// Underlying file I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A CSV record could not be read or written
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl DenoiseError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        DenoiseError::InvalidConfiguration(msg.into())
    }
}

/// Result type for denoising operations
pub type Result<T> = std::result::Result<T, DenoiseError>;

/// Checks that a window size is positive and odd.
pub(crate) fn validate_window(window_size: usize, what: &str) -> Result<()> {
    if window_size == 0 || window_size % 2 == 0 {
        return Err(DenoiseError::config(format!(
            "{} must be positive and odd, got {}",
            what, window_size
        )));
    }
    Ok(())
}
