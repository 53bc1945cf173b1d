//! Reference simulations: random DAGs with linear-Gaussian data.
//!
//! Each run draws its own DAG and dataset from a generator seeded with
//! `seed + run`, so a simulation configuration is reproducible and its runs
//! are independent.
//!
//! # Parameters
//!
//! - `numMeasures`: number of variables, named `X1..Xn`
//! - `avgDegree`: expected node degree of the random DAG
//! - `sampleSize`: rows per dataset
//! - `coefLow`/`coefHigh`: edge coefficient magnitude range (sign random)
//! - `varLow`/`varHigh`: error variance range
//! - `percentDiscrete`, `numCategories`: mixed simulation only
//! - `numRuns`, `seed`

use crate::capability::Simulation;
use crate::data::{DataSet, DataType, VariableType};
use crate::error::SimulationError;
use crate::graph::Graph;
use algcomp_core::Parameters;
use rand::prelude::*;
use rand_distr::{Distribution, Normal, Uniform};
use rand_xoshiro::Xoshiro256PlusPlus;

/// Shape of the linear model, read from parameters.
#[derive(Debug, Clone, PartialEq)]
struct ModelSpec {
    num_measures: usize,
    avg_degree: f64,
    sample_size: usize,
    coef: (f64, f64),
    var: (f64, f64),
    num_runs: usize,
    seed: u64,
}

impl ModelSpec {
    fn from_parameters(p: &Parameters) -> Result<Self, SimulationError> {
        let model = Self {
            num_measures: p.get_usize_or("numMeasures", 10)?,
            avg_degree: p.get_f64_or("avgDegree", 2.0)?,
            sample_size: p.get_usize_or("sampleSize", 1000)?,
            coef: (p.get_f64_or("coefLow", 0.5)?, p.get_f64_or("coefHigh", 1.5)?),
            var: (p.get_f64_or("varLow", 1.0)?, p.get_f64_or("varHigh", 3.0)?),
            num_runs: p.get_usize_or("numRuns", 1)?,
            seed: p.get_usize_or("seed", 42)? as u64,
        };

        if model.num_measures == 0 {
            return Err(SimulationError::Failed("numMeasures must be at least 1".into()));
        }
        if model.coef.0 > model.coef.1 || model.var.0 <= 0.0 || model.var.0 > model.var.1 {
            return Err(SimulationError::Failed(format!(
                "invalid ranges: coef [{}, {}], var [{}, {}]",
                model.coef.0, model.coef.1, model.var.0, model.var.1
            )));
        }
        Ok(model)
    }

    fn rng(&self, run: usize) -> Xoshiro256PlusPlus {
        Xoshiro256PlusPlus::seed_from_u64(self.seed.wrapping_add(run as u64))
    }
}

fn names(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("X{}", i)).collect()
}

/// Random DAG over `names` in which every pair `(i, j)`, `i < j`, gets the
/// edge `names[i] -> names[j]` with the probability that yields
/// `avg_degree` on average.
///
/// Returns the graph and, per node, its parent indices.
fn random_dag<R: Rng>(names: &[String], avg_degree: f64, rng: &mut R) -> (Graph, Vec<Vec<usize>>) {
    let n = names.len();
    let p = if n > 1 {
        (avg_degree / (n - 1) as f64).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let mut graph = Graph::with_nodes(names.iter().cloned());
    let mut parents = vec![Vec::new(); n];
    for j in 0..n {
        for i in 0..j {
            if rng.gen_bool(p) {
                graph.add_directed(&names[i], &names[j]);
                parents[j].push(i);
            }
        }
    }
    (graph, parents)
}

/// Sample a linear SEM column by column in topological (index) order.
fn linear_columns<R: Rng>(
    parents: &[Vec<usize>],
    model: &ModelSpec,
    rng: &mut R,
) -> Result<Vec<Vec<f64>>, SimulationError> {
    let n = parents.len();
    let coef = Uniform::new_inclusive(model.coef.0, model.coef.1);
    let var = Uniform::new_inclusive(model.var.0, model.var.1);

    let mut columns: Vec<Vec<f64>> = Vec::with_capacity(n);
    for node_parents in parents {
        let weights: Vec<(usize, f64)> = node_parents
            .iter()
            .map(|&i| {
                let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                (i, sign * coef.sample(rng))
            })
            .collect();
        let noise = Normal::new(0.0, var.sample(rng).sqrt())
            .map_err(|e| SimulationError::Failed(e.to_string()))?;

        let column: Vec<f64> = (0..model.sample_size)
            .map(|row| {
                let signal: f64 = weights.iter().map(|&(i, w)| w * columns[i][row]).sum();
                signal + noise.sample(rng)
            })
            .collect();
        columns.push(column);
    }
    Ok(columns)
}

/// Replace a column by its rank bins `0..categories`.
fn discretize(column: &mut [f64], categories: usize) {
    let n = column.len();
    if n == 0 {
        return;
    }
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| column[a].total_cmp(&column[b]));
    for (rank, &row) in order.iter().enumerate() {
        column[row] = (rank * categories / n) as f64;
    }
}

/// Continuous data from a linear SEM with Gaussian errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearGaussianSimulation;

impl Simulation for LinearGaussianSimulation {
    fn create_data(&self, parameters: &Parameters) -> Result<Vec<(Graph, DataSet)>, SimulationError> {
        let model = ModelSpec::from_parameters(parameters)?;
        let names = names(model.num_measures);

        (0..model.num_runs)
            .map(|run| {
                let mut rng = model.rng(run);
                let (graph, parents) = random_dag(&names, model.avg_degree, &mut rng);
                let columns = linear_columns(&parents, &model, &mut rng)?;
                let variables = names
                    .iter()
                    .map(|n| (n.clone(), VariableType::Continuous))
                    .collect();
                let data = DataSet::new(variables, columns)
                    .map_err(|e| SimulationError::Failed(e.to_string()))?;
                Ok((graph, data))
            })
            .collect()
    }

    fn description(&self) -> String {
        "Linear Gaussian SEM simulation".into()
    }

    fn data_type(&self) -> DataType {
        DataType::Continuous
    }

    fn parameters(&self) -> Vec<String> {
        [
            "numMeasures",
            "avgDegree",
            "sampleSize",
            "coefLow",
            "coefHigh",
            "varLow",
            "varHigh",
            "numRuns",
            "seed",
        ]
        .map(String::from)
        .to_vec()
    }
}

/// Linear SEM data with a share of the variables discretized by rank.
///
/// Discretization happens after the whole model is sampled, so children
/// depend on the continuous value underneath a discrete parent.
#[derive(Debug, Clone, Copy, Default)]
pub struct MixedSimulation;

impl Simulation for MixedSimulation {
    fn create_data(&self, parameters: &Parameters) -> Result<Vec<(Graph, DataSet)>, SimulationError> {
        let model = ModelSpec::from_parameters(parameters)?;
        let percent = parameters.get_f64_or("percentDiscrete", 50.0)?.clamp(0.0, 100.0);
        let categories = parameters.get_usize_or("numCategories", 4)?;
        if categories < 2 {
            return Err(SimulationError::Failed("numCategories must be at least 2".into()));
        }
        let names = names(model.num_measures);
        let num_discrete = (model.num_measures as f64 * percent / 100.0).round() as usize;

        (0..model.num_runs)
            .map(|run| {
                let mut rng = model.rng(run);
                let (graph, parents) = random_dag(&names, model.avg_degree, &mut rng);
                let mut columns = linear_columns(&parents, &model, &mut rng)?;

                let mut indices: Vec<usize> = (0..names.len()).collect();
                indices.shuffle(&mut rng);
                let mut types = vec![VariableType::Continuous; names.len()];
                for &i in indices.iter().take(num_discrete) {
                    types[i] = VariableType::Discrete;
                    discretize(&mut columns[i], categories);
                }

                let variables = names.iter().cloned().zip(types).collect();
                let data = DataSet::new(variables, columns)
                    .map_err(|e| SimulationError::Failed(e.to_string()))?;
                Ok((graph, data))
            })
            .collect()
    }

    fn description(&self) -> String {
        "Mixed linear simulation with discretized variables".into()
    }

    fn data_type(&self) -> DataType {
        DataType::Mixed
    }

    fn parameters(&self) -> Vec<String> {
        let mut names = LinearGaussianSimulation.parameters();
        names.push("percentDiscrete".into());
        names.push("numCategories".into());
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(runs: usize) -> Parameters {
        let mut p = Parameters::new();
        p.set("numMeasures", 5);
        p.set("sampleSize", 200);
        p.set("numRuns", runs);
        p.set("seed", 7);
        p
    }

    #[test]
    fn test_linear_gaussian_shape() {
        let runs = LinearGaussianSimulation.create_data(&params(3)).unwrap();
        assert_eq!(runs.len(), 3);
        for (graph, data) in &runs {
            assert_eq!(graph.num_nodes(), 5);
            assert_eq!(data.num_columns(), 5);
            assert_eq!(data.num_rows(), 200);
            assert_eq!(data.data_type(), DataType::Continuous);
        }
    }

    #[test]
    fn test_reproducible_for_seed() {
        let a = LinearGaussianSimulation.create_data(&params(2)).unwrap();
        let b = LinearGaussianSimulation.create_data(&params(2)).unwrap();
        assert_eq!(a[1].0, b[1].0);
        assert_eq!(a[1].1, b[1].1);
    }

    #[test]
    fn test_edges_point_forward() {
        let mut p = params(1);
        p.set("avgDegree", 4);
        let (graph, _) = &LinearGaussianSimulation.create_data(&p).unwrap()[0];
        for e in graph.edges() {
            let i: usize = e.node1[1..].parse().unwrap();
            let j: usize = e.node2[1..].parse().unwrap();
            assert!(i < j, "{}", e);
            assert!(graph.is_directed(&e.node1, &e.node2));
        }
    }

    #[test]
    fn test_mixed_discretizes_share() {
        let mut p = params(1);
        p.set("percentDiscrete", 40);
        p.set("numCategories", 3);
        let (_, data) = &MixedSimulation.create_data(&p).unwrap()[0];
        assert!(data.is_mixed());
        let discrete: Vec<&str> = data.variable_names().filter(|n| data.is_discrete(n)).collect();
        assert_eq!(discrete.len(), 2);
        for name in discrete {
            let column = data.column(name).unwrap();
            assert!(column.iter().all(|v| [0.0, 1.0, 2.0].contains(v)));
        }
    }

    #[test]
    fn test_zero_measures_rejected() {
        let mut p = params(1);
        p.set("numMeasures", 0);
        assert!(LinearGaussianSimulation.create_data(&p).is_err());
    }

    #[test]
    fn test_discretize_bins_by_rank() {
        let mut column = vec![0.3, -1.0, 2.0, 0.1];
        discretize(&mut column, 2);
        assert_eq!(column, vec![1.0, 0.0, 1.0, 0.0]);
    }
}
