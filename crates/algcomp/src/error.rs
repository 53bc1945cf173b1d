//! Error types for comparisons.
//!
//! Only [`SetupError`] aborts a comparison, and only before any unit is
//! scheduled. Everything raised while units run is recorded against the
//! unit or cell it came from.

use algcomp_core::ParameterError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Fatal problems detected before scheduling.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("no algorithms were provided")]
    NoAlgorithms,

    #[error("no simulations were provided")]
    NoSimulations,

    #[error("invalid parameters: {0}")]
    Parameters(#[from] ParameterError),

    #[error("could not read parameter file {path}: {source}")]
    ParameterFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse parameter file {path}: {source}")]
    ParameterJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed parameter '{0}', expected name=value[,value...]")]
    ParameterSyntax(String),

    #[error("simulation '{description}' failed: {source}")]
    Simulation {
        description: String,
        #[source]
        source: SimulationError,
    },

    #[error("simulation '{description}' produced {found} datasets, expected {expected}")]
    TooFewDatasets {
        description: String,
        expected: usize,
        found: usize,
    },

    #[error("simulations disagree on the number of runs ({first} vs {other} for '{description}')")]
    InconsistentRuns {
        description: String,
        first: usize,
        other: usize,
    },

    #[error("numRuns must be at least 1")]
    NoRuns,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unknown {kind} '{name}'")]
    UnknownPlugin { kind: &'static str, name: String },

    #[error("could not start generation pool: {0}")]
    WorkerPool(String),
}

/// Failure reported by an algorithm's search.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    #[error("{0}")]
    Failed(String),

    #[error("search cancelled")]
    Cancelled,

    #[error(transparent)]
    Parameter(#[from] ParameterError),
}

/// Failure reported by a simulation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("{0}")]
    Failed(String),

    #[error(transparent)]
    Parameter(#[from] ParameterError),
}

/// Failure evaluating one statistic on one graph pair.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatisticError {
    #[error("statistic requires data but none was supplied")]
    MissingData,

    #[error("{0}")]
    Failed(String),

    #[error("statistic panicked: {0}")]
    Panicked(String),
}

/// Why a unit produced no estimated graph.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnitError {
    #[error("search failed: {0}")]
    Search(#[from] SearchError),

    #[error("unit panicked: {0}")]
    Panicked(String),

    #[error("unit timed out after {after:?}")]
    TimedOut { after: Duration },

    #[error("unit abandoned after {after:?} without returning")]
    Abandoned { after: Duration },

    #[error("unit never started: {0}")]
    NotStarted(String),
}

/// Result type for comparison setup.
pub type Result<T> = std::result::Result<T, SetupError>;

/// Best-effort message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
