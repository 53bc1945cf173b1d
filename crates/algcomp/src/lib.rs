//! Comparison engine for structure-learning algorithms.
//!
//! Runs every algorithm on data from every simulation over a swept
//! parameter space, scores each run with pluggable statistics, and reduces
//! the scores into ranked summary tables.
//!
//! # Modules
//!
//! - [`capability`]: the `Algorithm`, `Simulation` and `Statistic` traits
//! - [`wrappers`]: binding capabilities to concrete parameter values
//! - [`pairing`]: the algorithm × simulation evaluation matrix
//! - [`runner`]: parallel execution of units with timeouts and isolation
//! - [`aggregator`]: per-mode statistic tables and utilities
//! - [`report`], [`output`]: table assembly and rendering
//! - [`checkpoint`]: incremental CSV log of finished units
//! - [`registry`]: named plugin factories
//! - [`algorithms`], [`synthetic`], [`statistics`]: reference plugins
//!
//! # Quick Start
//!
//! ```no_run
//! use algcomp::{
//!     algorithms::CorrelationSearch, statistics::{AdjacencyPrecision, AdjacencyRecall},
//!     synthetic::LinearGaussianSimulation, Comparison, ComparisonConfig,
//! };
//! use algcomp_core::Parameters;
//!
//! let mut parameters = Parameters::with_defaults();
//! parameters.set_values("alpha", vec![0.01.into(), 0.05.into()]).unwrap();
//!
//! let results = Comparison::new(parameters)
//!     .config(ComparisonConfig::new().workers(4).show_utilities(true))
//!     .algorithm(CorrelationSearch)
//!     .simulation(LinearGaussianSimulation)
//!     .statistic(AdjacencyPrecision, 1.0)
//!     .statistic(AdjacencyRecall, 1.0)
//!     .run(|progress, unit| println!("{:.0}% - {}", progress * 100.0, unit))
//!     .unwrap();
//!
//! algcomp::output::write_report(&results, &mut std::io::stdout()).unwrap();
//! ```

pub mod aggregator;
pub mod algorithms;
pub mod cancel;
pub mod capability;
pub mod checkpoint;
mod clock;
pub mod comparison;
pub mod config;
pub mod data;
pub mod error;
pub mod graph;
pub mod output;
pub mod pairing;
pub mod registry;
pub mod report;
pub mod runner;
pub mod statistics;
pub mod synthetic;
pub mod tensor;
pub mod wrappers;

pub use algcomp_core::{CellValue, Mode, ParamValue, Parameters};
pub use cancel::CancelToken;
pub use capability::{Algorithm, Clock, Simulation, Statistic, StatisticKind, Statistics};
pub use comparison::{Comparison, ComparisonResults};
pub use config::ComparisonConfig;
pub use data::{DataSet, DataType, VariableType};
pub use error::{Result, SearchError, SetupError, SimulationError, StatisticError, UnitError};
pub use graph::{ComparisonGraph, Endpoint, Graph, GraphType};
pub use registry::Registry;
pub use runner::{UnitRecord, UnitSink, UnitStatus};
