//! Settings that control how a comparison runs and how it is reported.

use crate::error::SetupError;
use crate::graph::ComparisonGraph;
use algcomp_core::{CellFormat, Mode};
use std::time::Duration;

/// Configuration options for [`Comparison`](crate::comparison::Comparison).
#[derive(Debug, Clone)]
pub struct ComparisonConfig {
    // =========================================================================
    // Execution
    // =========================================================================

    /// Number of units evaluated concurrently. Default: 1 (serial).
    pub workers: usize,

    /// Per-unit time limit. `None` (the default) means no limit.
    ///
    /// The unit's cancellation token expires at the limit; algorithms that
    /// poll it stop early and the unit is recorded as timed out.
    pub unit_timeout: Option<Duration>,

    /// Extra time an overdue unit gets before it is abandoned.
    ///
    /// Only applies when `unit_timeout` is set. Default: 1 second.
    pub abandon_grace: Duration,

    /// Reference graph estimated graphs are scored against.
    pub comparison_graph: ComparisonGraph,

    /// Drop pairings whose algorithm cannot handle the simulation's data
    /// type instead of only warning about them. Default: false.
    pub skip_type_mismatches: bool,

    // =========================================================================
    // Reporting
    // =========================================================================

    /// Aggregation modes to tabulate, in order.
    pub modes: Vec<Mode>,

    /// Order table rows by descending utility.
    pub sort_by_utility: bool,

    /// Append a utility column.
    pub show_utilities: bool,

    /// Prepend a 1-based algorithm index column.
    pub show_algorithm_indices: bool,

    /// Prepend a 1-based simulation index column.
    pub show_simulation_indices: bool,

    /// Render tables tab-delimited instead of space-aligned.
    pub tab_delimited: bool,

    /// Decimal places for numeric cells.
    pub precision: usize,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            unit_timeout: None,
            abandon_grace: Duration::from_secs(1),
            comparison_graph: ComparisonGraph::TrueDag,
            skip_type_mismatches: false,
            modes: vec![Mode::Average, Mode::StandardDeviation],
            sort_by_utility: false,
            show_utilities: false,
            show_algorithm_indices: false,
            show_simulation_indices: false,
            tab_delimited: false,
            precision: 2,
        }
    }
}

impl ComparisonConfig {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Builder methods
    // =========================================================================

    /// Set the number of concurrent workers.
    pub fn workers(mut self, workers: usize) -> Self {
        assert!(workers > 0, "workers must be > 0");
        self.workers = workers;
        self
    }

    /// Set the per-unit timeout.
    pub fn unit_timeout(mut self, timeout: Duration) -> Self {
        assert!(!timeout.is_zero(), "unit_timeout must be > 0");
        self.unit_timeout = Some(timeout);
        self
    }

    /// Set the abandonment grace period.
    pub fn abandon_grace(mut self, grace: Duration) -> Self {
        self.abandon_grace = grace;
        self
    }

    pub fn comparison_graph(mut self, graph: ComparisonGraph) -> Self {
        self.comparison_graph = graph;
        self
    }

    pub fn skip_type_mismatches(mut self, skip: bool) -> Self {
        self.skip_type_mismatches = skip;
        self
    }

    /// Set the aggregation modes to report.
    pub fn modes(mut self, modes: Vec<Mode>) -> Self {
        assert!(!modes.is_empty(), "modes must not be empty");
        self.modes = modes;
        self
    }

    pub fn sort_by_utility(mut self, sort: bool) -> Self {
        self.sort_by_utility = sort;
        self
    }

    pub fn show_utilities(mut self, show: bool) -> Self {
        self.show_utilities = show;
        self
    }

    pub fn show_algorithm_indices(mut self, show: bool) -> Self {
        self.show_algorithm_indices = show;
        self
    }

    pub fn show_simulation_indices(mut self, show: bool) -> Self {
        self.show_simulation_indices = show;
        self
    }

    pub fn tab_delimited(mut self, tab: bool) -> Self {
        self.tab_delimited = tab;
        self
    }

    /// Set the decimal precision of numeric cells.
    pub fn precision(mut self, precision: usize) -> Self {
        assert!(precision <= 10, "precision must be <= 10");
        self.precision = precision;
        self
    }

    /// Cell format derived from `precision`.
    pub fn cell_format(&self) -> CellFormat {
        CellFormat::new(self.precision)
    }

    /// Check fields that may have been set directly rather than through
    /// the builder.
    pub fn validate(&self) -> Result<(), SetupError> {
        if self.workers == 0 {
            return Err(SetupError::InvalidConfig("workers must be > 0".into()));
        }
        if self.unit_timeout.is_some_and(|t| t.is_zero()) {
            return Err(SetupError::InvalidConfig("unit_timeout must be > 0".into()));
        }
        if self.modes.is_empty() {
            return Err(SetupError::InvalidConfig("modes must not be empty".into()));
        }
        if self.precision > 10 {
            return Err(SetupError::InvalidConfig("precision must be <= 10".into()));
        }
        Ok(())
    }
}
