pub mod acceptance;
pub mod annealer;
pub mod chain;
pub mod diagnostics;
pub mod error;
pub mod options;
pub mod population;
pub mod problem;
pub mod progress;
pub mod rng;
pub mod schedule;
pub mod step;

// Re-export commonly used types for convenience
pub use annealer::{AnnealingResult, ChainSummary, CoupledAnnealer, CoupledAnnealerBuilder};
pub use error::{AnnealError, OptionExt, Result, ResultExt};
pub use options::{AnnealingOptions, LogLevel};
pub use problem::{Objective, ProgressObserver, ProgressUpdate, StepFunction};
