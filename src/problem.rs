//! # Problem Capabilities
//!
//! The annealer knows nothing about the function it minimizes. Callers bind
//! three capabilities once, at construction time:
//!
//! - [`Objective`]: maps a point to its cost.
//! - [`StepFunction`]: proposes a candidate near the current point, with a
//!   spread controlled by the generation temperature.
//! - [`ProgressObserver`] (optional): notified whenever a chain improves on
//!   its best cost.
//!
//! Objective and step functions run outside of any lock and are called from
//! several workers at once, so implementations must be `Send + Sync`. The
//! step function receives the calling worker's own random number generator,
//! which keeps the chains' random streams independent.
//!
//! ## Example
//!
//! ```rust
//! use coupled_anneal::problem::{Objective, StepFunction};
//! use coupled_anneal::rng::RandomNumberGenerator;
//! use coupled_anneal::error::Result;
//!
//! struct Sphere;
//!
//! impl Objective for Sphere {
//!     fn evaluate(&self, point: &[f64]) -> Result<f64> {
//!         Ok(point.iter().map(|x| x * x).sum())
//!     }
//! }
//!
//! struct UniformStep;
//!
//! impl StepFunction for UniformStep {
//!     fn propose(
//!         &self,
//!         current: &[f64],
//!         tgen: f64,
//!         rng: &mut RandomNumberGenerator,
//!     ) -> Result<Vec<f64>> {
//!         Ok(current.iter().map(|x| x + rng.gen_range(-tgen, tgen)).collect())
//!     }
//! }
//!
//! let mut rng = RandomNumberGenerator::from_seed(1);
//! let candidate = UniformStep.propose(&[1.0, 2.0], 0.1, &mut rng).unwrap();
//! assert_eq!(candidate.len(), 2);
//! assert!(Sphere.evaluate(&candidate).unwrap() > 0.0);
//! ```

use crate::error::Result;
use crate::rng::RandomNumberGenerator;

/// The function being minimized.
pub trait Objective: Send + Sync {
    /// Returns the cost of `point`.
    ///
    /// Must be deterministic for a given point. An error aborts the run.
    fn evaluate(&self, point: &[f64]) -> Result<f64>;
}

/// Generates candidate points from the current one.
pub trait StepFunction: Send + Sync {
    /// Proposes a candidate derived from `current`.
    ///
    /// `tgen` is the current generation temperature; implementations should
    /// shrink the spread of their proposals as it decays. The returned point
    /// must have the same length as `current`.
    fn propose(
        &self,
        current: &[f64],
        tgen: f64,
        rng: &mut RandomNumberGenerator,
    ) -> Result<Vec<f64>>;
}

/// A chain-best improvement, as reported to a [`ProgressObserver`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProgressUpdate {
    /// The chain's new best cost.
    pub cost: f64,
    /// Generation temperature at the time of the improvement.
    pub tgen: f64,
    /// Acceptance temperature at the time of the improvement.
    pub tacc: f64,
    /// Index of the improving chain.
    pub chain_id: usize,
    /// Global iteration index within the shared budget.
    pub iteration: usize,
}

/// Receives chain-best improvements.
///
/// Called synchronously while the population lock is held, so
/// implementations must return promptly.
pub trait ProgressObserver: Send + Sync {
    fn on_improvement(&self, update: &ProgressUpdate);
}

impl<F> ProgressObserver for F
where
    F: Fn(&ProgressUpdate) + Send + Sync,
{
    fn on_improvement(&self, update: &ProgressUpdate) {
        self(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_closure_observer() {
        let seen = Mutex::new(Vec::new());
        let observer = |update: &ProgressUpdate| seen.lock().unwrap().push(update.chain_id);

        let update = ProgressUpdate {
            cost: 1.0,
            tgen: 0.1,
            tacc: 0.9,
            chain_id: 3,
            iteration: 17,
        };
        observer.on_improvement(&update);
        observer.on_improvement(&ProgressUpdate {
            chain_id: 5,
            ..update
        });

        assert_eq!(*seen.lock().unwrap(), vec![3, 5]);
    }
}
