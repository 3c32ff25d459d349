//! # CoupledAnnealer
//!
//! Runs Coupled Simulated Annealing: `m` chains, one worker thread each,
//! minimize a shared objective while reading a common coupling term.
//!
//! Each iteration a worker proposes a candidate from its chain's current
//! point, evaluates it, and runs the acceptance rule. Proposal and evaluation
//! happen outside of any lock. Accepted moves are written to the population
//! under the single shared lock, and right after its accept/reject step the
//! worker *tries* to take that lock without blocking; if it succeeds it runs
//! the temperature scheduler. The number of scheduler updates per pass over
//! the population therefore depends on thread timing: it can be zero, one or
//! several.
//!
//! The iteration budget is shared: chain `i` runs a contiguous block of the
//! global iteration indices. There is no early stopping.
//!
//! Workers are broadcast onto a pool of exactly `m` threads, so every chain
//! has its own thread for the whole run. A worker that fails or panics raises
//! a shared abort flag and its siblings stop at their next iteration.
//!
//! ## Example
//!
//! ```rust
//! use coupled_anneal::{
//!     annealer::CoupledAnnealer,
//!     error::Result,
//!     options::AnnealingOptions,
//!     problem::Objective,
//!     step::CauchyStep,
//! };
//!
//! struct Sphere;
//!
//! impl Objective for Sphere {
//!     fn evaluate(&self, point: &[f64]) -> Result<f64> {
//!         Ok(point.iter().map(|x| x * x).sum())
//!     }
//! }
//!
//! let annealer = CoupledAnnealer::new(Sphere, CauchyStep::new());
//! let options = AnnealingOptions::builder()
//!     .num_chains(2)
//!     .max_iterations(2_000)
//!     .tgen_initial(0.5)
//!     .seed(3)
//!     .build();
//!
//! let result = annealer.minimize_from(&options, &[1.0, -2.0]).unwrap();
//! assert!(result.cost <= 5.0);
//! ```

use std::any::Any;
use std::cell::RefCell;
use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, TryLockError};
use std::time::{Duration, Instant};

use thread_local::ThreadLocal;
use tracing::{debug, info, warn};

use crate::acceptance::{sanitize_cost, AcceptanceController};
use crate::diagnostics::{OperationCategory, OperationTimings};
use crate::error::{AnnealError, Result};
use crate::options::{AnnealingOptions, LogLevel};
use crate::population::Population;
use crate::problem::{Objective, ProgressObserver, ProgressUpdate, StepFunction};
use crate::rng::RandomNumberGenerator;
use crate::schedule::{AnnealingParameters, SharedParameters};

/// Per-chain outcome of a run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChainSummary {
    pub chain_id: usize,
    pub best_cost: f64,
    pub final_cost: f64,
    pub iterations: usize,
    pub accepted_moves: usize,
    pub improvements: usize,
}

/// Outcome of a run. `point` and `cost` are the best over all chains.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnnealingResult {
    /// Best point found by any chain.
    pub point: Vec<f64>,
    /// Cost of `point`; the minimum of the chains' best costs.
    pub cost: f64,
    /// Chain that found `point`.
    pub chain_id: usize,
    /// Iterations executed across all chains.
    pub iterations: usize,
    pub accepted_moves: usize,
    pub improvements: usize,
    /// Number of temperature scheduler updates applied.
    pub parameter_updates: usize,
    pub final_tgen: f64,
    pub final_tacc: f64,
    pub chains: Vec<ChainSummary>,
    pub timings: OperationTimings,
    pub elapsed: Duration,
}

/// State guarded by the single run-wide lock.
struct SharedState {
    population: Population,
    parameters: AnnealingParameters,
}

/// Per-worker counters, returned when the worker finishes.
#[derive(Debug, Default)]
struct ChainStats {
    iterations: usize,
    accepted_moves: usize,
    improvements: usize,
}

/// Everything the workers of one run share.
struct RunContext<'a> {
    options: &'a AnnealingOptions,
    initial_point: &'a [f64],
    initial_cost: f64,
    state: Mutex<SharedState>,
    parameters: SharedParameters,
    abort: AtomicBool,
    timings: ThreadLocal<RefCell<OperationTimings>>,
}

impl RunContext<'_> {
    fn lock(&self) -> Result<MutexGuard<'_, SharedState>> {
        self.state
            .lock()
            .map_err(|e| AnnealError::LockPoisoned(e.to_string()))
    }

    fn record(&self, category: OperationCategory, elapsed: Duration) {
        self.timings
            .get_or_default()
            .borrow_mut()
            .record(category, elapsed);
    }
}

/// Contiguous block of global iteration indices owned by `chain_id`.
///
/// The first `max_iterations % num_chains` chains run one extra iteration.
pub fn iteration_block(chain_id: usize, num_chains: usize, max_iterations: usize) -> Range<usize> {
    let base = max_iterations / num_chains;
    let extra = max_iterations % num_chains;
    let start = chain_id * base + chain_id.min(extra);
    let len = base + usize::from(chain_id < extra);
    start..start + len
}

/// Coupled Simulated Annealing over an objective and a step function.
pub struct CoupledAnnealer<O, S>
where
    O: Objective,
    S: StepFunction,
{
    objective: O,
    step: S,
    progress: Option<Box<dyn ProgressObserver>>,
    dimension: Option<usize>,
}

impl<O, S> CoupledAnnealer<O, S>
where
    O: Objective,
    S: StepFunction,
{
    /// Creates an annealer without a progress observer. The dimension is
    /// taken from the initial point of each run.
    pub fn new(objective: O, step: S) -> Self {
        Self {
            objective,
            step,
            progress: None,
            dimension: None,
        }
    }

    /// Returns a builder for configuring an annealer.
    pub fn builder() -> CoupledAnnealerBuilder<O, S> {
        CoupledAnnealerBuilder::new()
    }

    /// Installs an observer notified on every chain-best improvement.
    pub fn with_progress<P>(mut self, observer: P) -> Self
    where
        P: ProgressObserver + 'static,
    {
        self.progress = Some(Box::new(observer));
        self
    }

    /// Declares the number of coordinates every initial point must have.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = Some(dimension);
        self
    }

    /// Evaluates `initial_point` and then runs [`minimize`](Self::minimize) from it.
    pub fn minimize_from(
        &self,
        options: &AnnealingOptions,
        initial_point: &[f64],
    ) -> Result<AnnealingResult> {
        self.check_dimension(initial_point)?;
        let initial_cost = sanitize_cost(self.objective.evaluate(initial_point)?);
        self.minimize(options, initial_point, initial_cost)
    }

    /// Minimizes the objective starting every chain at `initial_point`, whose
    /// cost the caller has already computed.
    ///
    /// # Errors
    ///
    /// Fails before any worker starts if the options are invalid, the point
    /// has the wrong dimension, or `initial_cost` is not finite. During the
    /// run, the first error raised by the step or objective function stops
    /// all workers and is returned. A panicking worker (for example a
    /// panicking progress observer) is reported as `WorkerPanicked` rather
    /// than as the `LockPoisoned` errors its siblings may run into.
    pub fn minimize(
        &self,
        options: &AnnealingOptions,
        initial_point: &[f64],
        initial_cost: f64,
    ) -> Result<AnnealingResult> {
        options.validate()?;
        self.check_dimension(initial_point)?;

        let num_chains = options.get_num_chains();
        let population = Population::new(num_chains, initial_point, initial_cost)?;
        let parameters = AnnealingParameters::new(options, num_chains, initial_cost);

        if options.get_log_level() != LogLevel::None {
            info!(
                chains = num_chains,
                dimension = initial_point.len(),
                max_iterations = options.get_max_iterations(),
                initial_cost,
                "starting coupled annealing"
            );
        }

        let context = RunContext {
            options,
            initial_point,
            initial_cost,
            parameters: SharedParameters::new(parameters.snapshot()),
            state: Mutex::new(SharedState {
                population,
                parameters,
            }),
            abort: AtomicBool::new(false),
            timings: ThreadLocal::new(),
        };

        let started = Instant::now();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_chains)
            .thread_name(|index| format!("csa-chain-{}", index))
            .build()?;

        // One job per pool thread; thread `i` runs chain `i`.
        let outcomes: Vec<Result<ChainStats>> = pool.broadcast(|worker| {
            let chain_id = worker.index();
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                self.run_chain(&context, chain_id)
            }))
            .unwrap_or_else(|payload| {
                Err(AnnealError::WorkerPanicked {
                    chain_id,
                    message: panic_message(&*payload),
                })
            });
            if outcome.is_err() {
                context.abort.store(true, Ordering::Relaxed);
            }
            outcome
        });
        let elapsed = started.elapsed();

        let mut stats = Vec::with_capacity(num_chains);
        let mut failure: Option<AnnealError> = None;
        for outcome in outcomes {
            match outcome {
                Ok(chain_stats) => stats.push(chain_stats),
                // A poisoned lock only echoes a panic in another worker.
                Err(e) => {
                    if matches!(failure, None | Some(AnnealError::LockPoisoned(_))) {
                        failure = Some(e);
                    }
                }
            }
        }
        if let Some(e) = failure {
            warn!(error = %e, "coupled annealing run failed");
            return Err(e);
        }

        let timings = context
            .timings
            .into_iter()
            .fold(OperationTimings::default(), |mut merged, cell| {
                merged.merge(&cell.into_inner());
                merged
            });
        let shared = context
            .state
            .into_inner()
            .map_err(|e| AnnealError::LockPoisoned(e.to_string()))?;

        let result = Self::collect_result(shared, stats, timings, elapsed)?;
        if options.get_log_level() != LogLevel::None {
            info!(
                best_cost = result.cost,
                chain = result.chain_id,
                iterations = result.iterations,
                parameter_updates = result.parameter_updates,
                elapsed = ?elapsed,
                "coupled annealing finished"
            );
        }
        Ok(result)
    }

    fn check_dimension(&self, point: &[f64]) -> Result<()> {
        match self.dimension {
            Some(expected) if expected != point.len() => Err(AnnealError::DimensionMismatch {
                expected,
                actual: point.len(),
            }),
            _ if point.is_empty() => Err(AnnealError::Configuration(
                "Initial point must have at least one coordinate".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// The worker loop for one chain.
    fn run_chain(&self, context: &RunContext<'_>, chain_id: usize) -> Result<ChainStats> {
        let options = context.options;
        let dimension = context.initial_point.len();
        let mut rng = RandomNumberGenerator::for_chain(options.get_seed(), chain_id);
        let mut stats = ChainStats::default();

        // Only this worker writes its chain, so it can keep a private copy of
        // the chain's current position instead of reading it under the lock.
        let mut current_point = context.initial_point.to_vec();
        let mut current_cost = context.initial_cost;

        let block = iteration_block(
            chain_id,
            options.get_num_chains(),
            options.get_max_iterations(),
        );
        for iteration in block {
            if context.abort.load(Ordering::Relaxed) {
                break;
            }
            let params = context.parameters.load();

            let started = Instant::now();
            let candidate = self.step.propose(&current_point, params.tgen, &mut rng)?;
            context.record(OperationCategory::Proposal, started.elapsed());
            if candidate.len() != dimension {
                return Err(AnnealError::DimensionMismatch {
                    expected: dimension,
                    actual: candidate.len(),
                });
            }

            let started = Instant::now();
            let cost = sanitize_cost(self.objective.evaluate(&candidate)?);
            context.record(OperationCategory::Evaluation, started.elapsed());

            let decision =
                AcceptanceController::decide_with_rng(cost, current_cost, &params, &mut rng);
            if decision.is_accepted() {
                let mut shared = context.lock()?;
                let improved = shared.population.mutate(chain_id, candidate.clone(), cost)?;
                if improved {
                    stats.improvements += 1;
                    if let Some(observer) = &self.progress {
                        observer.on_improvement(&ProgressUpdate {
                            cost,
                            tgen: shared.parameters.tgen(),
                            tacc: shared.parameters.tacc(),
                            chain_id,
                            iteration,
                        });
                    }
                }
                drop(shared);

                stats.accepted_moves += 1;
                current_point = candidate;
                current_cost = cost;
            }

            self.try_update_schedule(context)?;
            stats.iterations += 1;
        }

        Ok(stats)
    }

    /// Runs the temperature scheduler if the lock is free right now.
    ///
    /// Returns whether an update was applied.
    fn try_update_schedule(&self, context: &RunContext<'_>) -> Result<bool> {
        let mut shared = match context.state.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => return Ok(false),
            Err(TryLockError::Poisoned(e)) => {
                return Err(AnnealError::LockPoisoned(e.to_string()))
            }
        };

        let started = Instant::now();
        let SharedState {
            population,
            parameters,
        } = &mut *shared;
        let update = parameters.update(population);
        context.parameters.publish(parameters.snapshot());
        drop(shared);
        context.record(OperationCategory::ParameterUpdate, started.elapsed());

        if context.options.get_log_level() == LogLevel::Verbose {
            debug!(
                max_cost = update.statistics.max_cost,
                gamma = update.statistics.gamma,
                prob_variance = update.statistics.prob_variance,
                adjustment = ?update.adjustment,
                tgen = update.tgen,
                tacc = update.tacc,
                "temperature update"
            );
        }
        Ok(true)
    }

    fn collect_result(
        shared: SharedState,
        stats: Vec<ChainStats>,
        timings: OperationTimings,
        elapsed: Duration,
    ) -> Result<AnnealingResult> {
        let SharedState {
            population,
            parameters,
        } = shared;
        let best = population.global_best()?;
        let point = best.best_point().to_vec();
        let cost = best.best_cost();
        let chain_id = best.id();

        let chains: Vec<ChainSummary> = population
            .chains()
            .iter()
            .zip(stats.iter())
            .map(|(chain, chain_stats)| ChainSummary {
                chain_id: chain.id(),
                best_cost: chain.best_cost(),
                final_cost: chain.current_cost(),
                iterations: chain_stats.iterations,
                accepted_moves: chain_stats.accepted_moves,
                improvements: chain_stats.improvements,
            })
            .collect();

        Ok(AnnealingResult {
            point,
            cost,
            chain_id,
            iterations: stats.iter().map(|s| s.iterations).sum(),
            accepted_moves: stats.iter().map(|s| s.accepted_moves).sum(),
            improvements: stats.iter().map(|s| s.improvements).sum(),
            parameter_updates: parameters.updates(),
            final_tgen: parameters.tgen(),
            final_tacc: parameters.tacc(),
            chains,
            timings,
            elapsed,
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Builder for [`CoupledAnnealer`].
pub struct CoupledAnnealerBuilder<O, S>
where
    O: Objective,
    S: StepFunction,
{
    objective: Option<O>,
    step: Option<S>,
    progress: Option<Box<dyn ProgressObserver>>,
    dimension: Option<usize>,
}

impl<O, S> CoupledAnnealerBuilder<O, S>
where
    O: Objective,
    S: StepFunction,
{
    pub fn new() -> Self {
        Self {
            objective: None,
            step: None,
            progress: None,
            dimension: None,
        }
    }

    pub fn with_objective(mut self, objective: O) -> Self {
        self.objective = Some(objective);
        self
    }

    pub fn with_step(mut self, step: S) -> Self {
        self.step = Some(step);
        self
    }

    pub fn with_progress<P>(mut self, observer: P) -> Self
    where
        P: ProgressObserver + 'static,
    {
        self.progress = Some(Box::new(observer));
        self
    }

    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = Some(dimension);
        self
    }

    pub fn build(self) -> Result<CoupledAnnealer<O, S>> {
        let objective = self
            .objective
            .ok_or_else(|| AnnealError::Configuration("Objective not specified".to_string()))?;
        let step = self
            .step
            .ok_or_else(|| AnnealError::Configuration("Step function not specified".to_string()))?;

        Ok(CoupledAnnealer {
            objective,
            step,
            progress: self.progress,
            dimension: self.dimension,
        })
    }
}

impl<O, S> Default for CoupledAnnealerBuilder<O, S>
where
    O: Objective,
    S: StepFunction,
{
    fn default() -> Self {
        Self::new()
    }
}
