//! Core computation for algorithm comparisons.
//!
//! This crate holds the pieces of a comparison that are pure functions of
//! their inputs: expanding swept parameters into concrete combinations,
//! reducing per-run statistic values under an aggregation mode, combining
//! statistics into a weighted utility, and formatting table cells. It knows
//! nothing about graphs, data, threads or files; the `algcomp` crate builds
//! the evaluation engine on top of it.
//!
//! # Usage
//!
//! ```
//! use algcomp_core::{CombinationGenerator, Mode};
//!
//! let combos: Vec<Vec<usize>> = CombinationGenerator::new(&[2, 3]).collect();
//! assert_eq!(combos.len(), 6);
//!
//! let runs = [Some(1.0), Some(2.0), None, Some(3.0), Some(4.0)];
//! assert_eq!(Mode::Median.reduce_runs(&runs), Some(2.5));
//! ```

pub mod aggregate;
pub mod combination;
pub mod formatting;
pub mod parameters;
pub mod utility;

pub use aggregate::{CellValue, Mode};
pub use combination::CombinationGenerator;
pub use formatting::CellFormat;
pub use parameters::{ParamValue, ParameterError, Parameters};
pub use utility::{sort_by_utility, utility};
