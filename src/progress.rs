//! Built-in progress observers.

use tracing::info;

use crate::problem::{ProgressObserver, ProgressUpdate};

/// Logs every chain-best improvement at info level.
///
/// ```rust
/// use coupled_anneal::progress::TracingProgress;
/// use coupled_anneal::problem::{ProgressObserver, ProgressUpdate};
///
/// TracingProgress.on_improvement(&ProgressUpdate {
///     cost: 12.5,
///     tgen: 0.01,
///     tacc: 0.9,
///     chain_id: 0,
///     iteration: 42,
/// });
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressObserver for TracingProgress {
    fn on_improvement(&self, update: &ProgressUpdate) {
        info!(
            best_cost = update.cost,
            tgen = update.tgen,
            tacc = update.tacc,
            chain = update.chain_id,
            iteration = update.iteration,
            "chain improved"
        );
    }
}
