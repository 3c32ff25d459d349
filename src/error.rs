//! # Error Types
//!
//! This module defines the error type shared by every part of the optimizer.
//! Configuration problems are reported before any worker starts; failures of
//! the caller-supplied objective or step functions surface as a failed run.
//!
//! ## Examples
//!
//! Using the `Result` type:
//!
//! ```rust
//! use coupled_anneal::error::{AnnealError, Result};
//!
//! fn check_dimension(point: &[f64], expected: usize) -> Result<()> {
//!     if point.len() != expected {
//!         return Err(AnnealError::DimensionMismatch {
//!             expected,
//!             actual: point.len(),
//!         });
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_dimension(&[0.0, 1.0], 2).is_ok());
//! assert!(check_dimension(&[0.0], 2).is_err());
//! ```
//!
//! Using the `ResultExt` trait to add context to errors:
//!
//! ```rust
//! use coupled_anneal::error::{Result, ResultExt};
//!
//! fn parse_bound(raw: &str) -> Result<f64> {
//!     raw.parse::<f64>().context("Failed to parse domain bound")
//! }
//!
//! assert!(parse_bound("500.0").is_ok());
//! assert!(parse_bound("five hundred").is_err());
//! ```
//!
//! Using the `OptionExt` trait to convert `Option` to `Result`:
//!
//! ```rust
//! use coupled_anneal::error::{AnnealError, OptionExt};
//!
//! fn lowest(costs: &[f64]) -> coupled_anneal::error::Result<f64> {
//!     costs
//!         .iter()
//!         .copied()
//!         .reduce(f64::min)
//!         .ok_or_else_anneal(|| AnnealError::EmptyPopulation)
//! }
//!
//! assert_eq!(lowest(&[3.0, 1.0]).unwrap(), 1.0);
//! ```

use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Represents errors that can occur while configuring or running the annealer.
#[derive(Error, Debug)]
pub enum AnnealError {
    /// An invalid configuration value was supplied.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A point does not have the dimensionality the run was started with.
    #[error("Dimension mismatch: expected {expected} coordinates, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The population has no chains to operate on.
    #[error("Empty population error: Cannot operate on an empty population")]
    EmptyPopulation,

    /// NaN or infinity where a finite value is required.
    #[error("Invalid numeric value: {0}")]
    InvalidNumericValue(String),

    /// The objective function failed to evaluate a point.
    #[error("Objective evaluation error: {0}")]
    Objective(String),

    /// The step function failed to propose a candidate.
    #[error("Step proposal error: {0}")]
    Step(String),

    /// The shared population lock was poisoned by a panicking worker.
    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),

    /// A worker panicked; the panic was caught and the run aborted.
    #[error("Worker for chain {chain_id} panicked: {message}")]
    WorkerPanicked { chain_id: usize, message: String },

    /// The worker thread pool could not be created.
    #[error("Thread pool error: {0}")]
    ThreadPool(String),

    /// Error that occurs when an I/O operation fails.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A generic error with a custom message.
    #[error("{0}")]
    Other(String),
}

impl From<rayon::ThreadPoolBuildError> for AnnealError {
    fn from(error: rayon::ThreadPoolBuildError) -> Self {
        AnnealError::ThreadPool(error.to_string())
    }
}

/// A specialized Result type for annealing operations.
pub type Result<T> = std::result::Result<T, AnnealError>;

/// Extension trait for Result to add context to errors.
///
/// ## Examples
///
/// ```rust
/// use coupled_anneal::error::ResultExt;
/// use std::fs::File;
///
/// fn open_report(path: &str) -> coupled_anneal::error::Result<()> {
///     File::open(path).context("Failed to open timing report")?;
///     Ok(())
/// }
/// ```
pub trait ResultExt<T, E> {
    /// Converts the error to an `AnnealError::Other` prefixed with `context`.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E>
where
    E: StdError + Send + Sync + 'static,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| AnnealError::Other(format!("{}: {}", context, e)))
    }
}

/// Extension trait for Option to convert to Result with a custom error.
pub trait OptionExt<T> {
    /// Converts an `Option<T>` to a `Result<T, AnnealError>` using `err_fn`
    /// to build the error.
    fn ok_or_else_anneal<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> AnnealError;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_else_anneal<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> AnnealError,
    {
        self.ok_or_else(err_fn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_mismatch_message() {
        let err = AnnealError::DimensionMismatch {
            expected: 10,
            actual: 3,
        };
        assert_eq!(
            err.to_string(),
            "Dimension mismatch: expected 10 coordinates, got 3"
        );
    }

    #[test]
    fn test_worker_panicked_message() {
        let err = AnnealError::WorkerPanicked {
            chain_id: 2,
            message: "observer failed".to_string(),
        };
        assert_eq!(err.to_string(), "Worker for chain 2 panicked: observer failed");
    }

    #[test]
    fn test_io_error_converts() {
        fn fails() -> Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))?;
            Ok(())
        }

        match fails() {
            Err(AnnealError::Io(e)) => assert_eq!(e.to_string(), "disk full"),
            other => panic!("Expected Io error, got {:?}", other),
        }
    }

    #[test]
    fn test_context_wraps_message() {
        let parsed: std::result::Result<f64, _> = "abc".parse::<f64>();
        let err = parsed.context("Failed to parse").unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse: "));
    }

    #[test]
    fn test_option_ext() {
        let none: Option<usize> = None;
        assert!(matches!(
            none.ok_or_else_anneal(|| AnnealError::EmptyPopulation),
            Err(AnnealError::EmptyPopulation)
        ));
        assert_eq!(Some(3).ok_or_else_anneal(|| AnnealError::EmptyPopulation).unwrap(), 3);
    }
}
