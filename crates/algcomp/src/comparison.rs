//! Orchestration of a full comparison.
//!
//! ```text
//! parameters ─► expansion ─► pairings ─► datasets ─► units ─► tensor
//!                                                               │
//!              report ◄─ ranking ◄─ utilities ◄─ tables ◄───────┘
//! ```
//!
//! Expansion, dataset generation and unit execution run strictly one after
//! another. Generation is parallel across simulation configurations and unit
//! execution across units; expansion is sequential.

use crate::aggregator::{Aggregator, StatTable};
use crate::capability::{Algorithm, Simulation, Statistic, Statistics};
use crate::config::ComparisonConfig;
use crate::error::{Result, SetupError};
use crate::graph::GraphType;
use crate::pairing::{build_pairings, Pairing};
use crate::report::{assemble, ReportOptions, ReportTable};
use crate::runner::{Scheduler, UnitSink, UnitStatus};
use crate::tensor::ResultTensor;
use crate::wrappers::{expand_algorithm, expand_simulation, AlgorithmConfig, SimulationConfig};
use algcomp_core::{sort_by_utility, Mode, ParamValue, Parameters};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

// =============================================================================
// Parameter input
// =============================================================================

/// Load base parameters from a JSON object of `name: value` or
/// `name: [values...]` entries.
pub fn load_parameters(path: &Path) -> Result<Parameters> {
    let text = std::fs::read_to_string(path).map_err(|source| SetupError::ParameterFile {
        path: path.to_path_buf(),
        source,
    })?;
    let entries: indexmap::IndexMap<String, serde_json::Value> =
        serde_json::from_str(&text).map_err(|source| SetupError::ParameterJson {
            path: path.to_path_buf(),
            source,
        })?;

    let mut parameters = Parameters::new();
    for (name, value) in entries {
        let values = match value {
            serde_json::Value::Array(items) => items,
            other => vec![other],
        };
        let parsed = values
            .into_iter()
            .map(|v| {
                serde_json::from_value::<ParamValue>(v).map_err(|source| SetupError::ParameterJson {
                    path: path.to_path_buf(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        parameters.set_values(&name, parsed)?;
    }
    Ok(parameters)
}

/// Parse `name=v1,v2,...` into a name and its candidate values.
pub fn parse_parameter_arg(arg: &str) -> Result<(String, Vec<ParamValue>)> {
    let (name, values) = arg
        .split_once('=')
        .ok_or_else(|| SetupError::ParameterSyntax(arg.to_string()))?;
    let name = name.trim();
    if name.is_empty() || values.trim().is_empty() {
        return Err(SetupError::ParameterSyntax(arg.to_string()));
    }
    Ok((name.to_string(), values.split(',').map(ParamValue::parse).collect()))
}

/// Apply `name=v1,v2` arguments on top of `parameters`.
pub fn apply_parameter_args<S: AsRef<str>>(parameters: &mut Parameters, args: &[S]) -> Result<()> {
    for arg in args {
        let (name, values) = parse_parameter_arg(arg.as_ref())?;
        parameters.set_values(&name, values)?;
    }
    Ok(())
}

// =============================================================================
// Comparison
// =============================================================================

/// A comparison of algorithms over simulations.
pub struct Comparison {
    parameters: Parameters,
    algorithms: Vec<Arc<dyn Algorithm>>,
    simulations: Vec<Arc<dyn Simulation>>,
    statistics: Statistics,
    config: ComparisonConfig,
    sink: Option<Arc<dyn UnitSink>>,
}

impl Comparison {
    /// Start a comparison over base `parameters`.
    pub fn new(parameters: Parameters) -> Self {
        Self {
            parameters,
            algorithms: Vec::new(),
            simulations: Vec::new(),
            statistics: Statistics::new(),
            config: ComparisonConfig::default(),
            sink: None,
        }
    }

    pub fn config(mut self, config: ComparisonConfig) -> Self {
        self.config = config;
        self
    }

    pub fn algorithm(self, algorithm: impl Algorithm + 'static) -> Self {
        self.add_algorithm(Arc::new(algorithm))
    }

    pub fn add_algorithm(mut self, algorithm: Arc<dyn Algorithm>) -> Self {
        self.algorithms.push(algorithm);
        self
    }

    pub fn simulation(self, simulation: impl Simulation + 'static) -> Self {
        self.add_simulation(Arc::new(simulation))
    }

    pub fn add_simulation(mut self, simulation: Arc<dyn Simulation>) -> Self {
        self.simulations.push(simulation);
        self
    }

    /// Add a statistic with its utility weight.
    pub fn statistic(mut self, statistic: impl Statistic + 'static, weight: f64) -> Self {
        self.statistics.add_weighted(statistic, weight);
        self
    }

    pub fn statistics(mut self, statistics: Statistics) -> Self {
        self.statistics = statistics;
        self
    }

    /// Forward every finished unit to `sink`.
    pub fn with_sink(mut self, sink: Arc<dyn UnitSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Expand, generate, execute, aggregate and rank.
    ///
    /// Fails only on setup problems. Failures of individual units or
    /// statistics are recorded in the results.
    pub fn run<F>(&self, progress: F) -> Result<ComparisonResults>
    where
        F: FnMut(f64, &str),
    {
        self.config.validate()?;
        if self.algorithms.is_empty() {
            return Err(SetupError::NoAlgorithms);
        }
        if self.simulations.is_empty() {
            return Err(SetupError::NoSimulations);
        }

        let algorithms: Vec<Arc<AlgorithmConfig>> = self
            .algorithms
            .iter()
            .flat_map(|a| expand_algorithm(Arc::clone(a), &self.parameters))
            .collect();
        let simulations: Vec<Arc<SimulationConfig>> = self
            .simulations
            .iter()
            .flat_map(|s| expand_simulation(Arc::clone(s), &self.parameters))
            .collect();
        let pairings = build_pairings(&algorithms, &simulations, self.config.skip_type_mismatches);
        info!(
            algorithms = algorithms.len(),
            simulations = simulations.len(),
            pairings = pairings.len(),
            statistics = self.statistics.len(),
            "expanded comparison"
        );

        let num_runs = generate_datasets(&simulations, self.config.workers)?;

        let statistics = Arc::new(self.statistics.clone());
        let mut scheduler = Scheduler::new(Arc::clone(&statistics), &self.config);
        if let Some(sink) = &self.sink {
            scheduler = scheduler.with_sink(Arc::clone(sink));
        }
        let output = scheduler.run(&pairings, num_runs, progress);

        let aggregator = Aggregator::new(&output.tensor, &pairings, &statistics);
        let mut tables = Vec::new();
        for &mode in &self.config.modes {
            for graph_type in GraphType::ALL {
                if output.graph_types_used[graph_type.index()] {
                    tables.push(aggregator.table(graph_type, mode));
                }
            }
        }
        let utilities = aggregator.utilities();
        let order = if self.config.sort_by_utility {
            sort_by_utility(&utilities)
        } else {
            (0..pairings.len()).collect()
        };

        Ok(ComparisonResults {
            parameters: self.parameters.clone(),
            config: self.config.clone(),
            algorithms,
            simulations,
            pairings,
            statistics,
            tensor: output.tensor,
            graph_types_used: output.graph_types_used,
            tables,
            utilities,
            order,
            statuses: output.statuses,
            num_runs,
            total_time: output.total_time,
        })
    }
}

/// Generate every simulation configuration's datasets and check that they
/// agree on the number of runs.
///
/// Errors are reported for the first configuration in expansion order,
/// whatever order the configurations finished in.
fn generate_datasets(simulations: &[Arc<SimulationConfig>], workers: usize) -> Result<usize> {
    #[cfg(feature = "parallel")]
    let generated: Vec<Result<usize>> = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .thread_name(|i| format!("algcomp-gen-{}", i))
        .build()
        .map_err(|e| SetupError::WorkerPool(e.to_string()))?
        .install(|| simulations.par_iter().map(|s| s.generate().map(<[_]>::len)).collect());

    #[cfg(not(feature = "parallel"))]
    let generated: Vec<Result<usize>> = {
        let _ = workers;
        simulations.iter().map(|s| s.generate().map(<[_]>::len)).collect()
    };

    let mut num_runs: Option<usize> = None;
    for (simulation, runs) in simulations.iter().zip(generated) {
        let runs = runs?;
        match num_runs {
            None => num_runs = Some(runs),
            Some(first) if first != runs => {
                return Err(SetupError::InconsistentRuns {
                    description: simulation.description(),
                    first,
                    other: runs,
                })
            }
            Some(_) => {}
        }
    }
    num_runs.ok_or(SetupError::NoSimulations)
}

// =============================================================================
// Results
// =============================================================================

/// Everything a comparison produced.
#[derive(Debug)]
pub struct ComparisonResults {
    pub parameters: Parameters,
    pub config: ComparisonConfig,
    pub algorithms: Vec<Arc<AlgorithmConfig>>,
    pub simulations: Vec<Arc<SimulationConfig>>,
    pub pairings: Vec<Pairing>,
    pub statistics: Arc<Statistics>,
    pub tensor: ResultTensor,
    pub graph_types_used: [bool; GraphType::COUNT],
    /// One table per requested mode and used graph type.
    pub tables: Vec<StatTable>,
    /// Utility per pairing.
    pub utilities: Vec<f64>,
    /// Display order of pairings.
    pub order: Vec<usize>,
    /// Status per unit, indexed `pairing * num_runs + run`.
    pub statuses: Vec<UnitStatus>,
    pub num_runs: usize,
    pub total_time: Duration,
}

impl ComparisonResults {
    pub fn table(&self, graph_type: GraphType, mode: Mode) -> Option<&StatTable> {
        self.tables
            .iter()
            .find(|t| t.graph_type == graph_type && t.mode == mode)
    }

    /// Tables laid out for display, mode-major.
    pub fn report_tables(&self) -> Vec<ReportTable> {
        let options = ReportOptions::from(&self.config);
        self.tables
            .iter()
            .map(|t| {
                assemble(
                    t,
                    &self.pairings,
                    &self.statistics,
                    &self.utilities,
                    &self.order,
                    &options,
                )
            })
            .collect()
    }

    pub fn status(&self, pairing: usize, run: usize) -> Option<&UnitStatus> {
        self.statuses.get(pairing * self.num_runs + run)
    }

    pub fn completed(&self) -> usize {
        self.statuses.iter().filter(|s| s.is_completed()).count()
    }

    pub fn failed(&self) -> usize {
        self.statuses.len() - self.completed()
    }

    /// Parameter names the algorithms and simulations read, first use first.
    pub fn declared_parameters(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        let declared = self
            .simulations
            .iter()
            .flat_map(|s| s.parameter_names())
            .chain(self.algorithms.iter().flat_map(|a| a.algorithm().parameters()));
        for name in declared {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}
