//! # Diagnostics
//!
//! Wall-clock time and call counts per operation category. Each worker
//! accumulates into its own `OperationTimings`; the annealer merges them once
//! the parallel region has finished, so no counter is ever shared between
//! threads while a run is in progress.
//!
//! ```rust
//! use std::time::Duration;
//! use coupled_anneal::diagnostics::{OperationCategory, OperationTimings};
//!
//! let mut timings = OperationTimings::default();
//! timings.record(OperationCategory::Evaluation, Duration::from_micros(40));
//! timings.record(OperationCategory::Evaluation, Duration::from_micros(2));
//!
//! let mut csv = Vec::new();
//! timings.to_csv(&mut csv).unwrap();
//! let csv = String::from_utf8(csv).unwrap();
//! assert!(csv.contains("fx,42,2"));
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use crate::error::Result;

/// The operations the annealer times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OperationCategory {
    /// Calls to the step function.
    Proposal,
    /// Calls to the objective function.
    Evaluation,
    /// Temperature scheduler updates.
    ParameterUpdate,
}

impl OperationCategory {
    pub const ALL: [OperationCategory; 3] = [
        OperationCategory::Evaluation,
        OperationCategory::Proposal,
        OperationCategory::ParameterUpdate,
    ];

    /// Row label used in the CSV export.
    pub fn label(self) -> &'static str {
        match self {
            OperationCategory::Proposal => "step",
            OperationCategory::Evaluation => "fx",
            OperationCategory::ParameterUpdate => "parameter updates",
        }
    }
}

/// Accumulated time and number of calls for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OperationTotals {
    pub total: Duration,
    pub count: u64,
}

impl OperationTotals {
    fn add(&mut self, other: &OperationTotals) {
        self.total += other.total;
        self.count += other.count;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OperationTimings {
    proposal: OperationTotals,
    evaluation: OperationTotals,
    parameter_update: OperationTotals,
}

impl OperationTimings {
    pub fn record(&mut self, category: OperationCategory, elapsed: Duration) {
        let totals = self.totals_mut(category);
        totals.total += elapsed;
        totals.count += 1;
    }

    pub fn totals(&self, category: OperationCategory) -> OperationTotals {
        match category {
            OperationCategory::Proposal => self.proposal,
            OperationCategory::Evaluation => self.evaluation,
            OperationCategory::ParameterUpdate => self.parameter_update,
        }
    }

    fn totals_mut(&mut self, category: OperationCategory) -> &mut OperationTotals {
        match category {
            OperationCategory::Proposal => &mut self.proposal,
            OperationCategory::Evaluation => &mut self.evaluation,
            OperationCategory::ParameterUpdate => &mut self.parameter_update,
        }
    }

    /// Adds another worker's totals into these.
    pub fn merge(&mut self, other: &OperationTimings) {
        self.proposal.add(&other.proposal);
        self.evaluation.add(&other.evaluation);
        self.parameter_update.add(&other.parameter_update);
    }

    /// `(category, total time, count)` rows in export order.
    pub fn rows(&self) -> Vec<(OperationCategory, Duration, u64)> {
        OperationCategory::ALL
            .iter()
            .map(|&category| {
                let totals = self.totals(category);
                (category, totals.total, totals.count)
            })
            .collect()
    }

    /// Writes the table as CSV with times in microseconds.
    pub fn to_csv<W: Write>(&self, mut writer: W) -> Result<()> {
        writeln!(writer, "Operation,Total Time (microseconds),Count")?;
        for (category, total, count) in self.rows() {
            writeln!(writer, "{},{},{}", category.label(), total.as_micros(), count)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Writes the CSV table to `path`, replacing any existing file.
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.to_csv(BufWriter::new(file))
    }
}
