//! # Temperature Scheduler
//!
//! The scheduler owns the two temperatures of the run:
//!
//! - the generation temperature `tgen`, handed to the step function, which
//!   decays geometrically on every update;
//! - the acceptance temperature `tacc`, which is steered so that the variance
//!   of the chains' acceptance probabilities stays near a target.
//!
//! On every update it also recomputes the coupling term `gamma` and the
//! population's maximum cost, which the acceptance rule reads until the next
//! update. Updates are applied under the population lock; workers read the
//! published values lock-free through [`SharedParameters`].

use std::sync::atomic::{AtomicU64, Ordering};

use crate::options::AnnealingOptions;
use crate::population::Population;

/// The parameter values the acceptance rule and step function need.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParameterSnapshot {
    pub tgen: f64,
    pub tacc: f64,
    pub gamma: f64,
    pub max_cost: f64,
}

/// Population-wide statistics behind one scheduler update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CouplingStatistics {
    /// Highest current cost in the population.
    pub max_cost: f64,
    /// `sum_k exp((cost_k - max_cost) / tacc)`.
    pub gamma: f64,
    /// `sum_k exp(2 (cost_k - max_cost) / tacc)`.
    pub sum_a: f64,
    /// Variance of the per-chain acceptance probabilities.
    pub prob_variance: f64,
}

impl CouplingStatistics {
    /// Computes the coupling statistics of `population` at temperature `tacc`.
    pub fn compute(population: &Population, tacc: f64) -> Self {
        let m = population.len() as f64;
        let max_cost = population.max_cost();

        let (gamma, sum_a) = population.costs().fold((0.0, 0.0), |(gamma, sum_a), cost| {
            let scaled = (cost - max_cost) / tacc;
            (gamma + scaled.exp(), sum_a + (2.0 * scaled).exp())
        });
        let prob_variance = (m * (sum_a / (gamma * gamma)) - 1.0) / (m * m);

        Self {
            max_cost,
            gamma,
            sum_a,
            prob_variance,
        }
    }
}

/// Direction in which an update moved the acceptance temperature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaccAdjustment {
    /// Observed variance exceeded the target: `tacc` grew.
    Raised,
    /// Observed variance was at or below the target: `tacc` shrank.
    Lowered,
}

/// Record of one applied scheduler update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduleUpdate {
    pub statistics: CouplingStatistics,
    pub adjustment: TaccAdjustment,
    pub tgen: f64,
    pub tacc: f64,
}

/// Annealing parameters shared by the whole population.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnealingParameters {
    tgen: f64,
    tacc: f64,
    tgen_schedule: f64,
    tacc_schedule: f64,
    desired_variance: f64,
    gamma: f64,
    max_cost: f64,
    updates: usize,
}

impl AnnealingParameters {
    /// Initial parameters for a population of `num_chains` chains that all
    /// start at `initial_cost`. With identical costs the coupling term is
    /// exactly the number of chains.
    pub fn new(options: &AnnealingOptions, num_chains: usize, initial_cost: f64) -> Self {
        Self {
            tgen: options.get_tgen_initial(),
            tacc: options.get_tacc_initial(),
            tgen_schedule: options.get_tgen_schedule(),
            tacc_schedule: options.get_tacc_schedule(),
            desired_variance: options.get_desired_variance(),
            gamma: num_chains as f64,
            max_cost: initial_cost,
            updates: 0,
        }
    }

    pub fn tgen(&self) -> f64 {
        self.tgen
    }

    pub fn tacc(&self) -> f64 {
        self.tacc
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn max_cost(&self) -> f64 {
        self.max_cost
    }

    /// Number of updates applied so far.
    pub fn updates(&self) -> usize {
        self.updates
    }

    pub fn snapshot(&self) -> ParameterSnapshot {
        ParameterSnapshot {
            tgen: self.tgen,
            tacc: self.tacc,
            gamma: self.gamma,
            max_cost: self.max_cost,
        }
    }

    /// Recomputes the coupling statistics and adapts both temperatures.
    ///
    /// `tacc` stays within `[f64::MIN_POSITIVE, f64::MAX]`.
    pub fn update(&mut self, population: &Population) -> ScheduleUpdate {
        let statistics = CouplingStatistics::compute(population, self.tacc);
        self.gamma = statistics.gamma;
        self.max_cost = statistics.max_cost;

        let adjustment = if statistics.prob_variance > self.desired_variance {
            self.tacc += self.tacc_schedule * self.tacc;
            TaccAdjustment::Raised
        } else {
            self.tacc -= self.tacc_schedule * self.tacc;
            TaccAdjustment::Lowered
        };
        self.tacc = self.tacc.clamp(f64::MIN_POSITIVE, f64::MAX);
        self.tgen *= self.tgen_schedule;
        self.updates += 1;

        ScheduleUpdate {
            statistics,
            adjustment,
            tgen: self.tgen,
            tacc: self.tacc,
        }
    }
}

/// Lock-free mirror of the latest [`ParameterSnapshot`].
///
/// Written only by the worker holding the population lock. Each field is
/// read atomically on its own, so a reader racing a publish may see a mix of
/// old and new fields; the acceptance rule tolerates that staleness.
#[derive(Debug)]
pub struct SharedParameters {
    tgen: AtomicU64,
    tacc: AtomicU64,
    gamma: AtomicU64,
    max_cost: AtomicU64,
}

impl SharedParameters {
    pub fn new(snapshot: ParameterSnapshot) -> Self {
        Self {
            tgen: AtomicU64::new(snapshot.tgen.to_bits()),
            tacc: AtomicU64::new(snapshot.tacc.to_bits()),
            gamma: AtomicU64::new(snapshot.gamma.to_bits()),
            max_cost: AtomicU64::new(snapshot.max_cost.to_bits()),
        }
    }

    pub fn publish(&self, snapshot: ParameterSnapshot) {
        self.tgen.store(snapshot.tgen.to_bits(), Ordering::Release);
        self.tacc.store(snapshot.tacc.to_bits(), Ordering::Release);
        self.gamma.store(snapshot.gamma.to_bits(), Ordering::Release);
        self.max_cost
            .store(snapshot.max_cost.to_bits(), Ordering::Release);
    }

    pub fn load(&self) -> ParameterSnapshot {
        ParameterSnapshot {
            tgen: f64::from_bits(self.tgen.load(Ordering::Acquire)),
            tacc: f64::from_bits(self.tacc.load(Ordering::Acquire)),
            gamma: f64::from_bits(self.gamma.load(Ordering::Acquire)),
            max_cost: f64::from_bits(self.max_cost.load(Ordering::Acquire)),
        }
    }
}
