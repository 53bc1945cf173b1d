//! Capabilities bound to concrete parameter assignments.
//!
//! [`expand_algorithm`] and [`expand_simulation`] turn one capability and
//! the base [`Parameters`] into one configuration per point of the sweep
//! over the capability's varied parameters.

use crate::capability::{Algorithm, Simulation};
use crate::data::{DataSet, DataType};
use crate::error::SetupError;
use crate::graph::Graph;
use algcomp_core::{CombinationGenerator, ParamValue, Parameters};
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// One point of a sweep: the base parameters with some names pinned.
#[derive(Debug, Clone)]
struct Binding {
    parameters: Parameters,
    overridden: Vec<String>,
}

fn expand(names: &[String], base: &Parameters) -> Vec<Binding> {
    let mut varied: Vec<&str> = Vec::new();
    for name in names {
        if base.is_varied(name) && !varied.contains(&name.as_str()) {
            varied.push(name);
        }
    }

    if varied.is_empty() {
        return vec![Binding {
            parameters: base.clone(),
            overridden: Vec::new(),
        }];
    }

    let dims: Vec<usize> = varied.iter().map(|n| base.num_values(n)).collect();
    CombinationGenerator::new(&dims)
        .map(|combo| {
            let mut parameters = base.clone();
            for (name, &k) in varied.iter().zip(&combo) {
                if let Some(value) = base.values(name).and_then(|v| v.get(k)) {
                    parameters.override_value(name, value.clone());
                }
            }
            Binding {
                parameters,
                overridden: varied.iter().map(|n| n.to_string()).collect(),
            }
        })
        .collect()
}

fn describe(base: String, parameters: &Parameters, overridden: &[String]) -> String {
    let mut description = base;
    for name in overridden {
        if let Some(value) = parameters.first(name) {
            description.push_str(&format!(", {} = {}", name, value));
        }
    }
    description
}

/// An algorithm with its effective parameters.
#[derive(Clone)]
pub struct AlgorithmConfig {
    algorithm: Arc<dyn Algorithm>,
    parameters: Parameters,
    overridden: Vec<String>,
}

impl AlgorithmConfig {
    /// Bind `algorithm` to `parameters` with nothing overridden.
    pub fn new(algorithm: Arc<dyn Algorithm>, parameters: Parameters) -> Self {
        Self {
            algorithm,
            parameters,
            overridden: Vec::new(),
        }
    }

    pub fn algorithm(&self) -> &dyn Algorithm {
        self.algorithm.as_ref()
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Names pinned for this configuration, in sweep order.
    pub fn overridden(&self) -> &[String] {
        &self.overridden
    }

    pub fn data_type(&self) -> DataType {
        self.algorithm.data_type()
    }

    /// Algorithm description followed by `, name = value` per override.
    pub fn description(&self) -> String {
        describe(self.algorithm.description(), &self.parameters, &self.overridden)
    }

    /// Value of `name` if it resolves to exactly one in this configuration.
    pub fn value(&self, name: &str) -> Option<&ParamValue> {
        self.parameters.get(name).ok()
    }
}

impl std::fmt::Debug for AlgorithmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlgorithmConfig")
            .field("description", &self.description())
            .finish()
    }
}

/// Expand an algorithm over its varied parameters.
pub fn expand_algorithm(algorithm: Arc<dyn Algorithm>, base: &Parameters) -> Vec<Arc<AlgorithmConfig>> {
    let configs: Vec<Arc<AlgorithmConfig>> = expand(&algorithm.parameters(), base)
        .into_iter()
        .map(|b| {
            Arc::new(AlgorithmConfig {
                algorithm: Arc::clone(&algorithm),
                parameters: b.parameters,
                overridden: b.overridden,
            })
        })
        .collect();
    debug!(
        algorithm = %algorithm.description(),
        configurations = configs.len(),
        "expanded algorithm"
    );
    configs
}

/// True graph and data for one run of a simulation.
#[derive(Debug, Clone)]
pub struct SimulationRun {
    pub true_graph: Graph,
    pub data: DataSet,
}

/// A simulation with its effective parameters and, once generated, its
/// datasets.
pub struct SimulationConfig {
    simulation: Arc<dyn Simulation>,
    parameters: Parameters,
    overridden: Vec<String>,
    runs: OnceLock<Vec<Arc<SimulationRun>>>,
}

impl SimulationConfig {
    /// Bind `simulation` to `parameters` with nothing overridden.
    pub fn new(simulation: Arc<dyn Simulation>, parameters: Parameters) -> Self {
        Self {
            simulation,
            parameters,
            overridden: Vec::new(),
            runs: OnceLock::new(),
        }
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn overridden(&self) -> &[String] {
        &self.overridden
    }

    pub fn data_type(&self) -> DataType {
        self.simulation.data_type()
    }

    /// Names the simulation reads.
    pub fn parameter_names(&self) -> Vec<String> {
        self.simulation.parameters()
    }

    pub fn description(&self) -> String {
        describe(self.simulation.description(), &self.parameters, &self.overridden)
    }

    /// Value of `name` if it resolves to exactly one in this configuration.
    pub fn value(&self, name: &str) -> Option<&ParamValue> {
        self.parameters.get(name).ok()
    }

    /// Configured number of runs (`numRuns`, default 1).
    pub fn num_runs(&self) -> Result<usize, SetupError> {
        let n = self.parameters.get_usize_or("numRuns", 1)?;
        if n == 0 {
            return Err(SetupError::NoRuns);
        }
        Ok(n)
    }

    /// Generate this configuration's datasets, once.
    ///
    /// Later calls return the datasets from the first successful call.
    pub fn generate(&self) -> Result<&[Arc<SimulationRun>], SetupError> {
        if let Some(runs) = self.runs.get() {
            return Ok(runs);
        }

        let expected = self.num_runs()?;
        let created = self
            .simulation
            .create_data(&self.parameters)
            .map_err(|source| SetupError::Simulation {
                description: self.description(),
                source,
            })?;

        if created.len() < expected {
            return Err(SetupError::TooFewDatasets {
                description: self.description(),
                expected,
                found: created.len(),
            });
        }

        let runs: Vec<Arc<SimulationRun>> = created
            .into_iter()
            .take(expected)
            .map(|(true_graph, data)| Arc::new(SimulationRun { true_graph, data }))
            .collect();
        debug!(simulation = %self.description(), runs = runs.len(), "generated datasets");

        Ok(self.runs.get_or_init(|| runs))
    }

    /// Datasets, if already generated.
    pub fn runs(&self) -> Option<&[Arc<SimulationRun>]> {
        self.runs.get().map(Vec::as_slice)
    }

    pub fn run(&self, index: usize) -> Option<&Arc<SimulationRun>> {
        self.runs.get().and_then(|r| r.get(index))
    }
}

impl std::fmt::Debug for SimulationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationConfig")
            .field("description", &self.description())
            .field("generated", &self.runs.get().is_some())
            .finish()
    }
}

/// Expand a simulation over its varied parameters.
pub fn expand_simulation(simulation: Arc<dyn Simulation>, base: &Parameters) -> Vec<Arc<SimulationConfig>> {
    let configs: Vec<Arc<SimulationConfig>> = expand(&simulation.parameters(), base)
        .into_iter()
        .map(|b| {
            Arc::new(SimulationConfig {
                simulation: Arc::clone(&simulation),
                parameters: b.parameters,
                overridden: b.overridden,
                runs: OnceLock::new(),
            })
        })
        .collect();
    debug!(
        simulation = %simulation.description(),
        configurations = configs.len(),
        "expanded simulation"
    );
    configs
}
