//! # AnnealingOptions
//!
//! The `AnnealingOptions` struct holds the configuration of a coupled
//! annealing run: how many chains cooperate, how many iterations they share,
//! and how the two temperatures start and evolve.
//!
//! ## Example
//!
//! ```rust
//! use coupled_anneal::options::{AnnealingOptions, LogLevel};
//!
//! // Defaults: 4 chains, 1,000,000 iterations
//! let default_options = AnnealingOptions::default();
//! assert_eq!(default_options.get_num_chains(), 4);
//!
//! // Custom configuration through the builder
//! let options = AnnealingOptions::builder()
//!     .num_chains(2)
//!     .max_iterations(1000)
//!     .log_level(LogLevel::Minimal)
//!     .seed(7)
//!     .build();
//! assert!(options.validate().is_ok());
//! ```
//!
//! ## Fields
//!
//! - `num_chains`: Number of coupled chains, one worker thread each.
//! - `max_iterations`: Iteration budget shared by all chains.
//! - `tgen_initial` / `tgen_schedule`: Starting generation temperature and its
//!   geometric decay factor per scheduler update.
//! - `tacc_initial` / `tacc_schedule`: Starting acceptance temperature and the
//!   relative step by which it is raised or lowered per update.
//! - `desired_variance`: Target variance of the chains' acceptance probabilities.
//! - `seed`: Base seed for the per-chain generators; entropy when absent.
//! - `log_level`: How much the run reports through `tracing`.

use crate::error::{AnnealError, Result};

const DEFAULT_NUM_CHAINS: usize = 4;
const DEFAULT_MAX_ITERATIONS: usize = 1_000_000;
const DEFAULT_TGEN_INITIAL: f64 = 0.01;
const DEFAULT_TGEN_SCHEDULE: f64 = 0.99999;
const DEFAULT_TACC_INITIAL: f64 = 0.9;
const DEFAULT_TACC_SCHEDULE: f64 = 0.01;
const DEFAULT_DESIRED_VARIANCE: f64 = 0.99;

/// How much a run reports.
///
/// - `Verbose`: start and finish at info level, every scheduler update at debug level.
/// - `Minimal`: start and finish only.
/// - `None`: nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LogLevel {
    Verbose,
    Minimal,
    None,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnnealingOptions {
    num_chains: usize,
    max_iterations: usize,
    tgen_initial: f64,
    tgen_schedule: f64,
    tacc_initial: f64,
    tacc_schedule: f64,
    desired_variance: f64,
    seed: Option<u64>,
    log_level: LogLevel,
}

impl AnnealingOptions {
    /// Creates options with the given chain count and iteration budget and
    /// default temperatures.
    pub fn new(num_chains: usize, max_iterations: usize, log_level: LogLevel) -> Self {
        Self {
            num_chains,
            max_iterations,
            log_level,
            ..Self::default()
        }
    }

    /// Checks every field against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns `AnnealError::Configuration` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.num_chains == 0 {
            return Err(AnnealError::Configuration(
                "Number of chains must be at least 1".to_string(),
            ));
        }
        if !(self.tgen_initial.is_finite() && self.tgen_initial > 0.0) {
            return Err(AnnealError::Configuration(
                "Initial generation temperature must be positive".to_string(),
            ));
        }
        if !(self.tgen_schedule > 0.0 && self.tgen_schedule <= 1.0) {
            return Err(AnnealError::Configuration(
                "Generation schedule must be in (0, 1]".to_string(),
            ));
        }
        if !(self.tacc_initial.is_finite() && self.tacc_initial > 0.0) {
            return Err(AnnealError::Configuration(
                "Initial acceptance temperature must be positive".to_string(),
            ));
        }
        if !(self.tacc_schedule > 0.0 && self.tacc_schedule <= 1.0) {
            return Err(AnnealError::Configuration(
                "Acceptance schedule must be in (0, 1]".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.desired_variance) {
            return Err(AnnealError::Configuration(
                "Desired variance must be in [0, 1]".to_string(),
            ));
        }
        Ok(())
    }

    pub fn get_num_chains(&self) -> usize {
        self.num_chains
    }

    pub fn get_max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn get_tgen_initial(&self) -> f64 {
        self.tgen_initial
    }

    pub fn get_tgen_schedule(&self) -> f64 {
        self.tgen_schedule
    }

    pub fn get_tacc_initial(&self) -> f64 {
        self.tacc_initial
    }

    pub fn get_tacc_schedule(&self) -> f64 {
        self.tacc_schedule
    }

    pub fn get_desired_variance(&self) -> f64 {
        self.desired_variance
    }

    pub fn get_seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn get_log_level(&self) -> LogLevel {
        self.log_level
    }

    /// Sets the number of chains.
    pub fn set_num_chains(&mut self, num_chains: usize) {
        self.num_chains = num_chains;
    }

    /// Sets the shared iteration budget.
    pub fn set_max_iterations(&mut self, max_iterations: usize) {
        self.max_iterations = max_iterations;
    }

    pub fn set_tgen_initial(&mut self, tgen_initial: f64) {
        self.tgen_initial = tgen_initial;
    }

    pub fn set_tgen_schedule(&mut self, tgen_schedule: f64) {
        self.tgen_schedule = tgen_schedule;
    }

    pub fn set_tacc_initial(&mut self, tacc_initial: f64) {
        self.tacc_initial = tacc_initial;
    }

    pub fn set_tacc_schedule(&mut self, tacc_schedule: f64) {
        self.tacc_schedule = tacc_schedule;
    }

    pub fn set_desired_variance(&mut self, desired_variance: f64) {
        self.desired_variance = desired_variance;
    }

    /// Sets or clears the base seed.
    pub fn set_seed(&mut self, seed: Option<u64>) {
        self.seed = seed;
    }

    /// Sets the log level.
    pub fn set_log_level(&mut self, log_level: LogLevel) {
        self.log_level = log_level;
    }

    /// Returns a builder for creating an `AnnealingOptions` instance.
    ///
    /// # Example
    ///
    /// ```rust
    /// use coupled_anneal::options::{AnnealingOptions, LogLevel};
    ///
    /// let options = AnnealingOptions::builder()
    ///     .num_chains(8)
    ///     .max_iterations(50_000)
    ///     .tgen_initial(0.05)
    ///     .tgen_schedule(0.9999)
    ///     .tacc_initial(1.0)
    ///     .tacc_schedule(0.02)
    ///     .desired_variance(0.9)
    ///     .log_level(LogLevel::None)
    ///     .build();
    /// assert_eq!(options.get_num_chains(), 8);
    /// ```
    pub fn builder() -> AnnealingOptionsBuilder {
        AnnealingOptionsBuilder::default()
    }
}

impl Default for AnnealingOptions {
    fn default() -> Self {
        Self {
            num_chains: DEFAULT_NUM_CHAINS,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tgen_initial: DEFAULT_TGEN_INITIAL,
            tgen_schedule: DEFAULT_TGEN_SCHEDULE,
            tacc_initial: DEFAULT_TACC_INITIAL,
            tacc_schedule: DEFAULT_TACC_SCHEDULE,
            desired_variance: DEFAULT_DESIRED_VARIANCE,
            seed: None,
            log_level: LogLevel::None,
        }
    }
}

/// Builder for `AnnealingOptions`.
///
/// Unset fields fall back to the defaults of `AnnealingOptions::default()`.
#[derive(Debug, Clone, Default)]
pub struct AnnealingOptionsBuilder {
    num_chains: Option<usize>,
    max_iterations: Option<usize>,
    tgen_initial: Option<f64>,
    tgen_schedule: Option<f64>,
    tacc_initial: Option<f64>,
    tacc_schedule: Option<f64>,
    desired_variance: Option<f64>,
    seed: Option<u64>,
    log_level: Option<LogLevel>,
}

impl AnnealingOptionsBuilder {
    pub fn num_chains(mut self, value: usize) -> Self {
        self.num_chains = Some(value);
        self
    }

    pub fn max_iterations(mut self, value: usize) -> Self {
        self.max_iterations = Some(value);
        self
    }

    pub fn tgen_initial(mut self, value: f64) -> Self {
        self.tgen_initial = Some(value);
        self
    }

    pub fn tgen_schedule(mut self, value: f64) -> Self {
        self.tgen_schedule = Some(value);
        self
    }

    pub fn tacc_initial(mut self, value: f64) -> Self {
        self.tacc_initial = Some(value);
        self
    }

    pub fn tacc_schedule(mut self, value: f64) -> Self {
        self.tacc_schedule = Some(value);
        self
    }

    pub fn desired_variance(mut self, value: f64) -> Self {
        self.desired_variance = Some(value);
        self
    }

    pub fn seed(mut self, value: u64) -> Self {
        self.seed = Some(value);
        self
    }

    pub fn log_level(mut self, value: LogLevel) -> Self {
        self.log_level = Some(value);
        self
    }

    /// Builds the `AnnealingOptions` instance. Validation happens when a run starts.
    pub fn build(self) -> AnnealingOptions {
        AnnealingOptions {
            num_chains: self.num_chains.unwrap_or(DEFAULT_NUM_CHAINS),
            max_iterations: self.max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS),
            tgen_initial: self.tgen_initial.unwrap_or(DEFAULT_TGEN_INITIAL),
            tgen_schedule: self.tgen_schedule.unwrap_or(DEFAULT_TGEN_SCHEDULE),
            tacc_initial: self.tacc_initial.unwrap_or(DEFAULT_TACC_INITIAL),
            tacc_schedule: self.tacc_schedule.unwrap_or(DEFAULT_TACC_SCHEDULE),
            desired_variance: self.desired_variance.unwrap_or(DEFAULT_DESIRED_VARIANCE),
            seed: self.seed,
            log_level: self.log_level.unwrap_or(LogLevel::None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let options = AnnealingOptions::default();
        assert!(options.validate().is_ok());
        assert_eq!(options.get_max_iterations(), 1_000_000);
        assert_eq!(options.get_tgen_initial(), 0.01);
        assert_eq!(options.get_tacc_initial(), 0.9);
        assert_eq!(options.get_desired_variance(), 0.99);
        assert_eq!(options.get_seed(), None);
    }

    #[test]
    fn test_builder_matches_default() {
        assert_eq!(AnnealingOptions::builder().build(), AnnealingOptions::default());
    }

    #[test]
    fn test_new_keeps_default_temperatures() {
        let options = AnnealingOptions::new(2, 10, LogLevel::Minimal);
        assert_eq!(options.get_num_chains(), 2);
        assert_eq!(options.get_max_iterations(), 10);
        assert_eq!(options.get_log_level(), LogLevel::Minimal);
        assert_eq!(options.get_tgen_schedule(), 0.99999);
    }

    #[test]
    fn test_zero_iterations_is_valid() {
        let options = AnnealingOptions::builder().max_iterations(0).build();
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_single_chain_is_valid() {
        let options = AnnealingOptions::builder().num_chains(1).build();
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let cases = [
            AnnealingOptions::builder().num_chains(0).build(),
            AnnealingOptions::builder().tgen_initial(0.0).build(),
            AnnealingOptions::builder().tgen_initial(f64::NAN).build(),
            AnnealingOptions::builder().tgen_schedule(0.0).build(),
            AnnealingOptions::builder().tgen_schedule(1.5).build(),
            AnnealingOptions::builder().tacc_initial(-1.0).build(),
            AnnealingOptions::builder().tacc_schedule(0.0).build(),
            AnnealingOptions::builder().desired_variance(1.01).build(),
            AnnealingOptions::builder().desired_variance(f64::NAN).build(),
        ];

        for options in cases.iter() {
            match options.validate() {
                Err(AnnealError::Configuration(_)) => {}
                other => panic!("Expected Configuration error for {:?}, got {:?}", options, other),
            }
        }
    }

    #[test]
    fn test_setters() {
        let mut options = AnnealingOptions::default();
        options.set_num_chains(6);
        options.set_max_iterations(123);
        options.set_seed(Some(5));
        options.set_log_level(LogLevel::Verbose);
        options.set_desired_variance(0.5);

        assert_eq!(options.get_num_chains(), 6);
        assert_eq!(options.get_max_iterations(), 123);
        assert_eq!(options.get_seed(), Some(5));
        assert_eq!(options.get_log_level(), LogLevel::Verbose);
        assert_eq!(options.get_desired_variance(), 0.5);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_round_trip() {
        let options = AnnealingOptions::builder()
            .num_chains(3)
            .seed(11)
            .log_level(LogLevel::Minimal)
            .build();
        let json = serde_json::to_string(&options).unwrap();
        let restored: AnnealingOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, options);
    }
}
