//! Online adaptive predictor ("Wiener" filter) with selectable LMS or RLS
//! coefficient updates.
//!
//! Unlike the other filters, this one is stateful: the weight vector adapts
//! sample by sample and the adapted weights carry over into the next call to
//! [`SignalProcessor::process`]. Two calls on the same input therefore
//! generally return different outputs. Call [`AdaptiveFilter::reset`] to start
//! from fresh weights.

use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use crate::error::{DenoiseError, Result};
use crate::processor::{Signal, SignalProcessor};

/// Scale of the random perturbation used for initial weights.
const INITIAL_WEIGHT_SCALE: f64 = 0.001;

/// Regularization for the initial inverse correlation matrix, `P = I / delta`.
const RLS_DELTA: f64 = 0.001;

/// Coefficient update rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AdaptiveStrategy {
    /// Least mean squares gradient step
    #[default]
    Lms,
    /// Recursive least squares with an inverse correlation matrix
    Rls,
}

/// Parameters of the adaptive filter.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdaptiveConfig {
    /// Number of weights (delay line length), must be positive
    pub order: usize,
    /// LMS step size, in (0, 1)
    pub mu: f64,
    /// RLS forgetting factor, in (0, 1]
    pub lambda: f64,
    /// Update rule used by `process`
    pub strategy: AdaptiveStrategy,
    /// Seed for the initial weight perturbation; `None` draws from entropy
    pub seed: Option<u64>,
}

impl AdaptiveConfig {
    /// Creates a validated LMS configuration without a fixed seed.
    pub fn new(order: usize, mu: f64, lambda: f64) -> Result<Self> {
        let config = Self {
            order,
            mu,
            lambda,
            strategy: AdaptiveStrategy::Lms,
            seed: None,
        };
        config.validate()?;
        Ok(config)
    }

    /// Selects the coefficient update rule
    pub fn with_strategy(mut self, strategy: AdaptiveStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Makes the initial weights reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks every parameter invariant.
    pub fn validate(&self) -> Result<()> {
        validate_parameters(self.order, self.mu, self.lambda)
    }
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            order: 10,
            mu: 0.01,
            lambda: 0.99,
            strategy: AdaptiveStrategy::Lms,
            seed: None,
        }
    }
}

fn validate_parameters(order: usize, mu: f64, lambda: f64) -> Result<()> {
    if order == 0 {
        return Err(DenoiseError::config("Filter order must be positive"));
    }
    if !(mu > 0.0 && mu < 1.0) {
        return Err(DenoiseError::config(format!(
            "Adaptation step mu must be in (0, 1), got {}",
            mu
        )));
    }
    if !(lambda > 0.0 && lambda <= 1.0) {
        return Err(DenoiseError::config(format!(
            "Forgetting factor lambda must be in (0, 1], got {}",
            lambda
        )));
    }
    Ok(())
}

/// Adaptive predictive filter.
#[derive(Debug, Clone)]
pub struct AdaptiveFilter {
    config: AdaptiveConfig,
    weights: DVector<f64>,
}

/// Domain name for the adaptive predictor.
pub type WienerFilter = AdaptiveFilter;

impl AdaptiveFilter {
    /// Creates a filter from a configuration, validating it first.
    ///
    /// # Example
    ///
    /// ```rust
    /// use impulse_denoise::{AdaptiveConfig, AdaptiveFilter, SignalProcessor};
    ///
    /// let config = AdaptiveConfig::new(8, 0.01, 0.99).unwrap().with_seed(7);
    /// let mut filter = AdaptiveFilter::new(config).unwrap();
    /// assert_eq!(filter.process(&[1.0, 2.0, 3.0]).len(), 3);
    /// ```
    pub fn new(config: AdaptiveConfig) -> Result<Self> {
        config.validate()?;
        let weights = initial_weights(&config);
        Ok(Self { config, weights })
    }

    /// Shorthand for an unseeded LMS filter.
    pub fn with_parameters(order: usize, mu: f64, lambda: f64) -> Result<Self> {
        Self::new(AdaptiveConfig::new(order, mu, lambda)?)
    }

    /// Replaces order, step size and forgetting factor, then resets the weights.
    ///
    /// On error the filter keeps its previous parameters and weights.
    pub fn set_parameters(&mut self, order: usize, mu: f64, lambda: f64) -> Result<()> {
        validate_parameters(order, mu, lambda)?;
        self.config.order = order;
        self.config.mu = mu;
        self.config.lambda = lambda;
        self.reset();
        Ok(())
    }

    /// Switches the update rule and resets the weights.
    pub fn set_strategy(&mut self, strategy: AdaptiveStrategy) {
        self.config.strategy = strategy;
        self.reset();
    }

    /// Discards adapted weights and draws fresh initial ones.
    ///
    /// With a seed configured, the new weights equal those of a newly
    /// constructed filter.
    pub fn reset(&mut self) {
        self.weights = initial_weights(&self.config);
    }

    pub fn config(&self) -> &AdaptiveConfig {
        &self.config
    }

    /// Current weight vector, newest tap first.
    pub fn weights(&self) -> &[f64] {
        self.weights.as_slice()
    }

    fn process_lms(&mut self, input: &[f64]) -> Signal {
        let mu = self.config.mu;
        let mut delay = DVector::<f64>::zeros(self.config.order);
        let mut output = Vec::with_capacity(input.len());

        for n in 0..input.len() {
            push_delay(&mut delay, input[n]);
            let y = self.weights.dot(&delay);

            let error = lms_target(input, n) - y;
            self.weights.axpy(mu * error, &delay, 1.0);

            output.push(y);
        }

        output
    }

    fn process_rls(&mut self, input: &[f64]) -> Signal {
        let order = self.config.order;
        let lambda = self.config.lambda;
        let mut p = DMatrix::<f64>::identity(order, order) / RLS_DELTA;
        let mut delay = DVector::<f64>::zeros(order);
        let mut output = Vec::with_capacity(input.len());

        for n in 0..input.len() {
            push_delay(&mut delay, input[n]);
            let y = self.weights.dot(&delay);
            let error = rls_target(input, n) - y;

            let px = &p * &delay;
            let denominator = lambda + delay.dot(&px);
            let gain = px / denominator;

            self.weights += &gain * error;

            let xtp = delay.transpose() * &p;
            p = (&p - &gain * xtp) / lambda;

            output.push(y);
        }

        output
    }
}

impl Default for AdaptiveFilter {
    fn default() -> Self {
        let config = AdaptiveConfig::default();
        let weights = initial_weights(&config);
        Self { config, weights }
    }
}

impl SignalProcessor for AdaptiveFilter {
    fn process(&mut self, input: &[f64]) -> Signal {
        trace!(filter = %self.name(), len = input.len(), "processing");
        if input.is_empty() {
            return Vec::new();
        }
        match self.config.strategy {
            AdaptiveStrategy::Lms => self.process_lms(input),
            AdaptiveStrategy::Rls => self.process_rls(input),
        }
    }

    fn name(&self) -> String {
        let base = format!(
            "WienerFilter_{}_{}_{}",
            self.config.order,
            (self.config.mu * 1000.0) as i64,
            (self.config.lambda * 1000.0) as i64
        );
        match self.config.strategy {
            AdaptiveStrategy::Lms => base,
            AdaptiveStrategy::Rls => base + "_RLS",
        }
    }
}

fn initial_weights(config: &AdaptiveConfig) -> DVector<f64> {
    debug!(order = config.order, seed = ?config.seed, "initializing adaptive weights");
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    DVector::from_iterator(
        config.order,
        (0..config.order).map(|_| INITIAL_WEIGHT_SCALE * (rng.gen::<f64>() - 0.5)),
    )
}

/// Shifts the delay line by one and stores `sample` as the newest entry.
fn push_delay(delay: &mut DVector<f64>, sample: f64) {
    for i in (1..delay.len()).rev() {
        delay[i] = delay[i - 1];
    }
    delay[0] = sample;
}

/// Desired value for the LMS update: the mean of the two raw neighbours.
///
/// The first sample is its own target; the last sample stands in for its
/// missing right neighbour.
fn lms_target(input: &[f64], n: usize) -> f64 {
    if n == 0 {
        return input[0];
    }
    let next = input.get(n + 1).copied().unwrap_or(input[n]);
    0.5 * (input[n - 1] + next)
}

/// Desired value for the RLS update: a centred 5-point mean away from the
/// edges, the raw sample near them.
fn rls_target(input: &[f64], n: usize) -> f64 {
    if n > 2 && n + 2 < input.len() {
        input[n - 2..=n + 2].iter().sum::<f64>() / 5.0
    } else {
        input[n]
    }
}
