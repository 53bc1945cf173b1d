//! Plug-in interfaces for algorithms, simulations and statistics.
//!
//! The engine treats every implementation as a black box. Implementations
//! must be `Send + Sync`: a single instance is shared by every configuration
//! expanded from it and called from worker threads.

use crate::cancel::CancelToken;
use crate::data::{DataSet, DataType};
use crate::error::{panic_message, SearchError, SimulationError, StatisticError};
use crate::graph::Graph;
use algcomp_core::Parameters;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::warn;

/// A structure-learning algorithm.
pub trait Algorithm: Send + Sync {
    /// Estimate a graph from `data`.
    ///
    /// Long-running implementations should call `cancel.check()?`
    /// periodically so that timed-out units stop promptly.
    fn search(
        &self,
        data: &DataSet,
        parameters: &Parameters,
        cancel: &CancelToken,
    ) -> Result<Graph, SearchError>;

    /// Human-readable description, without parameter values.
    fn description(&self) -> String;

    /// Kind of data the algorithm accepts.
    fn data_type(&self) -> DataType;

    /// Names of the parameters the algorithm reads.
    fn parameters(&self) -> Vec<String>;
}

/// A generator of (true graph, dataset) pairs.
pub trait Simulation: Send + Sync {
    /// Produce one `(true graph, dataset)` pair per run (`numRuns`).
    fn create_data(&self, parameters: &Parameters) -> Result<Vec<(Graph, DataSet)>, SimulationError>;

    fn description(&self) -> String;

    fn data_type(&self) -> DataType;

    fn parameters(&self) -> Vec<String>;
}

/// Clock a timing statistic reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clock {
    Wall,
    /// CPU time of the worker thread running the search.
    Cpu,
}

/// How the engine fills a statistic's cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatisticKind {
    /// Evaluated by [`Statistic::value`] on each graph pair.
    Measured,
    /// Taken from the search's measured time, in seconds.
    Timing(Clock),
    /// Shows the value of the named parameter instead of a measurement.
    ParameterColumn(String),
}

/// A score comparing an estimated graph against the reference graph.
pub trait Statistic: Send + Sync {
    /// Column heading.
    fn abbreviation(&self) -> String;

    fn description(&self) -> String;

    /// Score `estimated` against `reference`.
    fn value(
        &self,
        reference: &Graph,
        estimated: &Graph,
        data: Option<&DataSet>,
    ) -> Result<f64, StatisticError>;

    /// Map a raw value onto [0, 1], higher being better.
    fn norm_value(&self, value: f64) -> f64;

    fn kind(&self) -> StatisticKind {
        StatisticKind::Measured
    }
}

/// `statistic.norm_value(value)`, or `None` if it panics.
pub(crate) fn guarded_norm_value(statistic: &dyn Statistic, value: f64) -> Option<f64> {
    match panic::catch_unwind(AssertUnwindSafe(|| statistic.norm_value(value))) {
        Ok(normalized) => Some(normalized),
        Err(payload) => {
            warn!(
                statistic = %statistic.abbreviation(),
                panic = %panic_message(payload.as_ref()),
                "normalization panicked; term left out of utility"
            );
            None
        }
    }
}

/// Ordered statistics with their utility weights.
#[derive(Clone, Default)]
pub struct Statistics {
    entries: Vec<(Arc<dyn Statistic>, f64)>,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a statistic with weight 0 (shown but not part of the utility).
    pub fn add(&mut self, statistic: impl Statistic + 'static) {
        self.entries.push((Arc::new(statistic), 0.0));
    }

    /// Add a statistic with a utility weight.
    pub fn add_weighted(&mut self, statistic: impl Statistic + 'static, weight: f64) {
        assert!(weight.is_finite() && weight >= 0.0, "weight must be finite and >= 0");
        self.entries.push((Arc::new(statistic), weight));
    }

    /// Add an already shared statistic.
    pub fn push(&mut self, statistic: Arc<dyn Statistic>, weight: f64) {
        assert!(weight.is_finite() && weight >= 0.0, "weight must be finite and >= 0");
        self.entries.push((statistic, weight));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&dyn Statistic> {
        self.entries.get(index).map(|(s, _)| s.as_ref())
    }

    pub fn weight(&self, index: usize) -> f64 {
        self.entries.get(index).map_or(0.0, |(_, w)| *w)
    }

    /// `(statistic, weight)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&dyn Statistic, f64)> {
        self.entries.iter().map(|(s, w)| (s.as_ref(), *w))
    }

    /// Whether any statistic contributes to the utility.
    pub fn has_weights(&self) -> bool {
        self.entries.iter().any(|(_, w)| *w != 0.0)
    }
}

impl fmt::Debug for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(s, w)| (s.abbreviation(), *w)))
            .finish()
    }
}
