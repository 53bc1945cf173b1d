//! Named factories for algorithms, simulations and statistics.
//!
//! Plugins are registered explicitly; [`Registry::with_builtins`] registers
//! the reference implementations shipped with this crate.

use crate::algorithms::{CorrelationSearch, EmptyGraph};
use crate::capability::{Algorithm, Simulation, Statistic};
use crate::error::SetupError;
use crate::statistics::{
    AdjacencyPrecision, AdjacencyRecall, ArrowheadPrecision, ArrowheadRecall, ElapsedCpuTime, ElapsedTime,
    ParameterColumn, Shd,
};
use crate::synthetic::{LinearGaussianSimulation, MixedSimulation};
use algcomp_core::Parameters;
use indexmap::IndexMap;
use std::fmt::Write;
use std::sync::Arc;

/// Prefix selecting a parameter column by statistic name, as in
/// `param:sampleSize`.
pub const PARAMETER_COLUMN_PREFIX: &str = "param:";

type Factory<T> = Box<dyn Fn() -> Arc<T> + Send + Sync>;

/// Registry of plugin factories, keyed by name in registration order.
#[derive(Default)]
pub struct Registry {
    algorithms: IndexMap<String, Factory<dyn Algorithm>>,
    simulations: IndexMap<String, Factory<dyn Simulation>>,
    statistics: IndexMap<String, Factory<dyn Statistic>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every reference plugin.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();

        registry.register_algorithm("correlation", || Arc::new(CorrelationSearch));
        registry.register_algorithm("empty", || Arc::new(EmptyGraph));

        registry.register_simulation("linear-gaussian", || Arc::new(LinearGaussianSimulation));
        registry.register_simulation("mixed", || Arc::new(MixedSimulation));

        registry.register_statistic("AP", || Arc::new(AdjacencyPrecision));
        registry.register_statistic("AR", || Arc::new(AdjacencyRecall));
        registry.register_statistic("AHP", || Arc::new(ArrowheadPrecision));
        registry.register_statistic("AHR", || Arc::new(ArrowheadRecall));
        registry.register_statistic("SHD", || Arc::new(Shd));
        registry.register_statistic("E", || Arc::new(ElapsedTime));
        registry.register_statistic("CPU", || Arc::new(ElapsedCpuTime));

        registry
    }

    pub fn register_algorithm<F>(&mut self, name: &str, factory: F)
    where
        F: Fn() -> Arc<dyn Algorithm> + Send + Sync + 'static,
    {
        self.algorithms.insert(name.to_string(), Box::new(factory));
    }

    pub fn register_simulation<F>(&mut self, name: &str, factory: F)
    where
        F: Fn() -> Arc<dyn Simulation> + Send + Sync + 'static,
    {
        self.simulations.insert(name.to_string(), Box::new(factory));
    }

    pub fn register_statistic<F>(&mut self, name: &str, factory: F)
    where
        F: Fn() -> Arc<dyn Statistic> + Send + Sync + 'static,
    {
        self.statistics.insert(name.to_string(), Box::new(factory));
    }

    pub fn algorithm(&self, name: &str) -> Result<Arc<dyn Algorithm>, SetupError> {
        self.algorithms
            .get(name)
            .map(|f| f())
            .ok_or_else(|| SetupError::UnknownPlugin {
                kind: "algorithm",
                name: name.to_string(),
            })
    }

    pub fn simulation(&self, name: &str) -> Result<Arc<dyn Simulation>, SetupError> {
        self.simulations
            .get(name)
            .map(|f| f())
            .ok_or_else(|| SetupError::UnknownPlugin {
                kind: "simulation",
                name: name.to_string(),
            })
    }

    /// Look up a statistic. `param:<name>` yields a parameter column.
    pub fn statistic(&self, name: &str) -> Result<Arc<dyn Statistic>, SetupError> {
        if let Some(parameter) = name.strip_prefix(PARAMETER_COLUMN_PREFIX) {
            return Ok(Arc::new(ParameterColumn::new(parameter)));
        }
        self.statistics
            .get(name)
            .map(|f| f())
            .ok_or_else(|| SetupError::UnknownPlugin {
                kind: "statistic",
                name: name.to_string(),
            })
    }

    pub fn algorithm_names(&self) -> impl Iterator<Item = &str> {
        self.algorithms.keys().map(String::as_str)
    }

    pub fn simulation_names(&self) -> impl Iterator<Item = &str> {
        self.simulations.keys().map(String::as_str)
    }

    pub fn statistic_names(&self) -> impl Iterator<Item = &str> {
        self.statistics.keys().map(String::as_str)
    }

    /// Human-readable listing of every registered plugin, with the values
    /// `defaults` holds for the parameters each one reads.
    pub fn configuration(&self, defaults: &Parameters) -> String {
        let mut out = String::new();

        out.push_str("Available Algorithms:\n\n");
        for (name, factory) in &self.algorithms {
            let algorithm = factory();
            let _ = writeln!(out, "{}: {}", name, algorithm.description());
            out.push_str(&parameter_line(&algorithm.parameters(), defaults));
        }

        out.push_str("\nAvailable Simulations:\n\n");
        for (name, factory) in &self.simulations {
            let simulation = factory();
            let _ = writeln!(out, "{}: {}", name, simulation.description());
            out.push_str(&parameter_line(&simulation.parameters(), defaults));
        }

        out.push_str("\nAvailable Statistics:\n\n");
        for (name, factory) in &self.statistics {
            let _ = writeln!(out, "{}: {}", name, factory().description());
        }
        let _ = writeln!(
            out,
            "{}<name>: Value of a parameter, shown as a column",
            PARAMETER_COLUMN_PREFIX
        );

        out
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("algorithms", &self.algorithms.keys().collect::<Vec<_>>())
            .field("simulations", &self.simulations.keys().collect::<Vec<_>>())
            .field("statistics", &self.statistics.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// `\tParameters: a = 1; b = no default; ...`, wrapping after every fourth
/// parameter. Empty when `names` is.
fn parameter_line(names: &[String], defaults: &Parameters) -> String {
    if names.is_empty() {
        return String::new();
    }
    let mut line = String::from("\tParameters: ");
    for (i, name) in names.iter().enumerate() {
        line.push_str(name);
        line.push_str(" = ");
        match defaults.values(name) {
            Some(values) if !values.is_empty() => {
                let joined: Vec<String> = values.iter().map(ToString::to_string).collect();
                line.push_str(&joined.join(","));
            }
            _ => line.push_str("no default"),
        }
        if i + 1 < names.len() {
            line.push_str("; ");
            if (i + 1) % 4 == 0 {
                line.push_str("\n\t\t");
            }
        }
    }
    line.push('\n');
    line
}
