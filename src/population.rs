//! # Population
//!
//! The fixed-size, ordered collection of chains. Chain indices are stable for
//! the whole run. The annealer keeps the population behind its single shared
//! lock; every method here that takes `&mut self` is therefore only ever
//! reached by a worker holding that lock.

use crate::chain::ChainState;
use crate::error::{AnnealError, OptionExt, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    chains: Vec<ChainState>,
}

impl Population {
    /// Creates `num_chains` chains, all starting on `initial_point`.
    ///
    /// # Errors
    ///
    /// Returns `EmptyPopulation` if `num_chains` is zero and
    /// `InvalidNumericValue` if `initial_cost` is not finite.
    pub fn new(num_chains: usize, initial_point: &[f64], initial_cost: f64) -> Result<Self> {
        if num_chains == 0 {
            return Err(AnnealError::EmptyPopulation);
        }
        if !initial_cost.is_finite() {
            return Err(AnnealError::InvalidNumericValue(format!(
                "Initial cost must be finite, got {}",
                initial_cost
            )));
        }

        let chains = (0..num_chains)
            .map(|id| ChainState::new(id, initial_point.to_vec(), initial_cost))
            .collect();
        Ok(Self { chains })
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Number of coordinates of every point in the population.
    pub fn dimension(&self) -> usize {
        self.chains.first().map_or(0, ChainState::dimension)
    }

    pub fn chains(&self) -> &[ChainState] {
        &self.chains
    }

    pub fn chain(&self, index: usize) -> Option<&ChainState> {
        self.chains.get(index)
    }

    /// Current cost of chain `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn cost_of(&self, index: usize) -> f64 {
        self.chains[index].current_cost()
    }

    /// Current costs of all chains, in chain order.
    pub fn costs(&self) -> impl Iterator<Item = f64> + '_ {
        self.chains.iter().map(ChainState::current_cost)
    }

    /// The highest current cost across the population.
    pub fn max_cost(&self) -> f64 {
        self.costs().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Moves chain `index` to the candidate. Returns `true` if the chain's
    /// best improved.
    ///
    /// # Errors
    ///
    /// Fails if `index` is out of range or the candidate has the wrong
    /// dimension.
    pub fn mutate(&mut self, index: usize, candidate: Vec<f64>, cost: f64) -> Result<bool> {
        let dimension = self.dimension();
        if candidate.len() != dimension {
            return Err(AnnealError::DimensionMismatch {
                expected: dimension,
                actual: candidate.len(),
            });
        }
        let chain = self.chains.get_mut(index).ok_or_else_anneal(|| {
            AnnealError::Other(format!("Chain index {} out of range", index))
        })?;
        Ok(chain.replace(candidate, cost))
    }

    /// The chain holding the lowest best cost. Ties go to the lowest index.
    pub fn global_best(&self) -> Result<&ChainState> {
        self.chains
            .iter()
            .reduce(|best, chain| {
                if chain.best_cost() < best.best_cost() {
                    chain
                } else {
                    best
                }
            })
            .ok_or_else_anneal(|| AnnealError::EmptyPopulation)
    }
}
