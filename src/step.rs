//! Ready-made step functions.

use std::f64::consts::PI;

use crate::error::{AnnealError, Result};
use crate::problem::StepFunction;
use crate::rng::RandomNumberGenerator;

/// Heavy-tailed Cauchy proposal: every coordinate moves by
/// `tgen * tan(pi * (u - 0.5))` with `u` uniform in `[0, 1)`.
///
/// With a wrap period `p`, each coordinate is reduced with a truncated
/// remainder, which keeps it in the open interval `(-p, p)`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CauchyStep {
    wrap_period: Option<f64>,
}

impl CauchyStep {
    /// Creates an unbounded Cauchy step.
    pub fn new() -> Self {
        Self { wrap_period: None }
    }

    /// Creates a Cauchy step whose coordinates are wrapped into `(-period, period)`.
    ///
    /// # Errors
    ///
    /// Returns an error if `period` is not a positive finite number.
    pub fn wrapped(period: f64) -> Result<Self> {
        if !period.is_finite() || period <= 0.0 {
            return Err(AnnealError::Configuration(
                "Wrap period must be a positive finite number".to_string(),
            ));
        }
        Ok(Self {
            wrap_period: Some(period),
        })
    }

    pub fn wrap_period(&self) -> Option<f64> {
        self.wrap_period
    }
}

impl StepFunction for CauchyStep {
    fn propose(
        &self,
        current: &[f64],
        tgen: f64,
        rng: &mut RandomNumberGenerator,
    ) -> Result<Vec<f64>> {
        let candidate = current
            .iter()
            .map(|&x| {
                let moved = x + tgen * (PI * (rng.uniform() - 0.5)).tan();
                match self.wrap_period {
                    Some(period) => moved % period,
                    None => moved,
                }
            })
            .collect();
        Ok(candidate)
    }
}

/// Returns the current point unchanged. Useful for deterministic runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IdentityStep;

impl StepFunction for IdentityStep {
    fn propose(
        &self,
        current: &[f64],
        _tgen: f64,
        _rng: &mut RandomNumberGenerator,
    ) -> Result<Vec<f64>> {
        Ok(current.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_stays_in_period() {
        let step = CauchyStep::wrapped(1.0).unwrap();
        let mut rng = RandomNumberGenerator::from_seed(9);
        let mut point = vec![0.5; 10];

        for _ in 0..500 {
            point = step.propose(&point, 5.0, &mut rng).unwrap();
            assert_eq!(point.len(), 10);
            assert!(point.iter().all(|x| x.abs() < 1.0));
        }
    }

    #[test]
    fn test_wrapped_rejects_bad_period() {
        assert!(CauchyStep::wrapped(0.0).is_err());
        assert!(CauchyStep::wrapped(-2.0).is_err());
        assert!(CauchyStep::wrapped(f64::NAN).is_err());
    }

    #[test]
    fn test_spread_shrinks_with_tgen() {
        let step = CauchyStep::new();
        let mut hot_rng = RandomNumberGenerator::from_seed(5);
        let mut cold_rng = RandomNumberGenerator::from_seed(5);
        let origin = [0.0; 4];

        let hot = step.propose(&origin, 1.0, &mut hot_rng).unwrap();
        let cold = step.propose(&origin, 1e-3, &mut cold_rng).unwrap();

        // Same draws, so every coordinate scales linearly with tgen.
        for (h, c) in hot.iter().zip(cold.iter()) {
            assert!((h * 1e-3 - c).abs() < 1e-9);
        }
    }

    #[test]
    fn test_identity_step() {
        let mut rng = RandomNumberGenerator::new();
        let point = [1.0, -2.0, 3.5];
        assert_eq!(IdentityStep.propose(&point, 10.0, &mut rng).unwrap(), point.to_vec());
    }
}
