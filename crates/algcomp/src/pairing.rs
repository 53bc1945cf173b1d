//! Algorithm × simulation pairings.

use crate::wrappers::{AlgorithmConfig, SimulationConfig};
use algcomp_core::ParamValue;
use std::sync::Arc;
use tracing::warn;

/// One algorithm configuration evaluated on one simulation configuration.
#[derive(Debug, Clone)]
pub struct Pairing {
    pub algorithm: Arc<AlgorithmConfig>,
    pub simulation: Arc<SimulationConfig>,
    /// Position of `algorithm` in the expanded algorithm list.
    pub algorithm_index: usize,
    /// Position of `simulation` in the expanded simulation list.
    pub simulation_index: usize,
}

impl Pairing {
    /// Whether the algorithm can handle the simulation's data type.
    pub fn is_compatible(&self) -> bool {
        self.algorithm
            .data_type()
            .accepts(self.simulation.data_type())
    }

    pub fn description(&self) -> String {
        format!(
            "{} on {}",
            self.algorithm.description(),
            self.simulation.description()
        )
    }

    /// Value of `name`, looked up in the simulation configuration first and
    /// then in the algorithm configuration.
    ///
    /// A name still varied in one configuration (because only the other one
    /// declares it) does not resolve there, so the lookup falls through to
    /// the configuration that pinned it.
    pub fn parameter_value(&self, name: &str) -> Option<&ParamValue> {
        self.simulation
            .value(name)
            .or_else(|| self.algorithm.value(name))
    }
}

/// Cross every simulation configuration with every algorithm configuration.
///
/// Pairings are simulation-major; their order is the pairing index used by
/// the tensor and every table. Type mismatches are logged, and dropped only
/// when `skip_type_mismatches` is set.
pub fn build_pairings(
    algorithms: &[Arc<AlgorithmConfig>],
    simulations: &[Arc<SimulationConfig>],
    skip_type_mismatches: bool,
) -> Vec<Pairing> {
    let mut pairings = Vec::with_capacity(algorithms.len() * simulations.len());

    for (simulation_index, simulation) in simulations.iter().enumerate() {
        for (algorithm_index, algorithm) in algorithms.iter().enumerate() {
            let pairing = Pairing {
                algorithm: Arc::clone(algorithm),
                simulation: Arc::clone(simulation),
                algorithm_index,
                simulation_index,
            };

            if !pairing.is_compatible() {
                warn!(
                    algorithm = %algorithm.description(),
                    algorithm_type = %algorithm.data_type(),
                    simulation = %simulation.description(),
                    simulation_type = %simulation.data_type(),
                    skipped = skip_type_mismatches,
                    "data type mismatch"
                );
                if skip_type_mismatches {
                    continue;
                }
            }

            pairings.push(pairing);
        }
    }

    pairings
}
