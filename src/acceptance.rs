//! # Acceptance Controller
//!
//! Decides whether a candidate replaces a chain's current point. Improvements
//! are always taken. A worse candidate is taken with probability
//!
//! ```text
//! exp((current_cost - max_cost) / tacc) / gamma
//! ```
//!
//! where `max_cost` is the highest current cost in the population and
//! `gamma` is the coupling term computed by the temperature scheduler. Because
//! `gamma` sums over every chain, a chain's willingness to climb depends on
//! where the rest of the population sits: chains already at the top of the
//! cost range climb most readily.
//!
//! Candidates with a NaN cost are treated as `+inf`, and a non-finite
//! candidate is never accepted.

use crate::rng::RandomNumberGenerator;
use crate::schedule::ParameterSnapshot;

/// Outcome of one acceptance test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The candidate is strictly better than the chain's current cost.
    Improvement,
    /// The candidate is not better but passed the coupled probability test.
    Uphill,
    /// The chain stays where it is.
    Rejected,
}

impl Decision {
    pub fn is_accepted(self) -> bool {
        !matches!(self, Decision::Rejected)
    }
}

/// Maps NaN to `+inf` so it orders after every real cost.
pub fn sanitize_cost(cost: f64) -> f64 {
    if cost.is_nan() {
        f64::INFINITY
    } else {
        cost
    }
}

/// Probability of accepting a worse candidate for a chain at `current_cost`.
pub fn acceptance_probability(current_cost: f64, max_cost: f64, tacc: f64, gamma: f64) -> f64 {
    ((current_cost - max_cost) / tacc).exp() / gamma
}

/// Stateless acceptance rule shared by all workers.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptanceController;

impl AcceptanceController {
    /// Applies the acceptance rule.
    ///
    /// `draw` supplies the uniform `[0, 1)` sample and is only called when
    /// the candidate is not an improvement.
    pub fn decide<D>(
        candidate_cost: f64,
        current_cost: f64,
        params: &ParameterSnapshot,
        draw: D,
    ) -> Decision
    where
        D: FnOnce() -> f64,
    {
        let candidate_cost = sanitize_cost(candidate_cost);
        if !candidate_cost.is_finite() {
            return Decision::Rejected;
        }
        if candidate_cost < current_cost {
            return Decision::Improvement;
        }

        let probability =
            acceptance_probability(current_cost, params.max_cost, params.tacc, params.gamma);
        if probability > draw() {
            Decision::Uphill
        } else {
            Decision::Rejected
        }
    }

    /// Applies the acceptance rule, drawing from the worker's own generator.
    pub fn decide_with_rng(
        candidate_cost: f64,
        current_cost: f64,
        params: &ParameterSnapshot,
        rng: &mut RandomNumberGenerator,
    ) -> Decision {
        Self::decide(candidate_cost, current_cost, params, || rng.uniform())
    }
}
