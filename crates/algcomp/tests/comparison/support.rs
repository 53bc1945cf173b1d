//! Small plugins with predictable output.

#![allow(dead_code)]

use algcomp::{
    Algorithm, CancelToken, DataSet, DataType, Graph, Parameters, SearchError, Simulation, SimulationError,
    Statistic, StatisticError, VariableType,
};
use std::thread;
use std::time::Duration;

/// Base parameters with `numRuns` set.
pub fn parameters(num_runs: usize) -> Parameters {
    let mut p = Parameters::with_defaults();
    p.set("numRuns", num_runs);
    p
}

fn names(data: &DataSet) -> Vec<String> {
    data.variable_names().map(String::from).collect()
}

// =============================================================================
// Simulations
// =============================================================================

/// `numMeasures` continuous variables with X1 -> X2 as the true graph.
/// Run `r` has `r + 1` rows.
pub struct Staircase;

impl Simulation for Staircase {
    fn create_data(&self, p: &Parameters) -> Result<Vec<(Graph, DataSet)>, SimulationError> {
        let runs = p.get_usize("numRuns")?;
        let k = p.get_usize_or("numMeasures", 3)?.max(2);
        let variables: Vec<(String, VariableType)> = (1..=k)
            .map(|i| (format!("X{}", i), VariableType::Continuous))
            .collect();

        (0..runs)
            .map(|r| {
                let mut truth = Graph::with_nodes(variables.iter().map(|(n, _)| n.clone()));
                truth.add_directed("X1", "X2");
                let columns: Vec<Vec<f64>> = (0..k)
                    .map(|c| (0..=r).map(|i| (i * k + c) as f64).collect())
                    .collect();
                let data = DataSet::new(variables.clone(), columns)
                    .map_err(|e| SimulationError::Failed(e.to_string()))?;
                Ok((truth, data))
            })
            .collect()
    }

    fn description(&self) -> String {
        "Staircase".into()
    }

    fn data_type(&self) -> DataType {
        DataType::Continuous
    }

    fn parameters(&self) -> Vec<String> {
        vec!["numMeasures".into(), "sampleSize".into(), "numRuns".into()]
    }
}

// =============================================================================
// Algorithms
// =============================================================================

/// Reads `a` and `b` and returns no edges.
pub struct Sweep;

impl Algorithm for Sweep {
    fn search(&self, data: &DataSet, _: &Parameters, _: &CancelToken) -> Result<Graph, SearchError> {
        Ok(Graph::with_nodes(names(data)))
    }

    fn description(&self) -> String {
        "Sweep".into()
    }

    fn data_type(&self) -> DataType {
        DataType::Mixed
    }

    fn parameters(&self) -> Vec<String> {
        vec!["a".into(), "b".into()]
    }
}

/// Returns X1 -> X2, the true graph of [`Staircase`].
pub struct Truth;

impl Algorithm for Truth {
    fn search(&self, data: &DataSet, _: &Parameters, _: &CancelToken) -> Result<Graph, SearchError> {
        let mut graph = Graph::with_nodes(names(data));
        graph.add_directed("X1", "X2");
        Ok(graph)
    }

    fn description(&self) -> String {
        "Truth".into()
    }

    fn data_type(&self) -> DataType {
        DataType::Mixed
    }

    fn parameters(&self) -> Vec<String> {
        vec![]
    }
}

/// Chains the first `edges` + 1 variables with undirected edges.
pub struct Draws;

impl Algorithm for Draws {
    fn search(&self, data: &DataSet, p: &Parameters, _: &CancelToken) -> Result<Graph, SearchError> {
        let names = names(data);
        let edges = p.get_usize("edges")?.min(names.len().saturating_sub(1));
        let mut graph = Graph::with_nodes(names.clone());
        for i in 0..edges {
            graph.add_undirected(&names[i], &names[i + 1]);
        }
        Ok(graph)
    }

    fn description(&self) -> String {
        "Draws".into()
    }

    fn data_type(&self) -> DataType {
        DataType::Mixed
    }

    fn parameters(&self) -> Vec<String> {
        vec!["edges".into()]
    }
}

/// Always reports a search error.
pub struct Failing;

impl Algorithm for Failing {
    fn search(&self, _: &DataSet, _: &Parameters, _: &CancelToken) -> Result<Graph, SearchError> {
        Err(SearchError::Failed("no convergence".into()))
    }

    fn description(&self) -> String {
        "Failing".into()
    }

    fn data_type(&self) -> DataType {
        DataType::Mixed
    }

    fn parameters(&self) -> Vec<String> {
        vec![]
    }
}

/// Always panics.
pub struct Panicking;

impl Algorithm for Panicking {
    fn search(&self, _: &DataSet, _: &Parameters, _: &CancelToken) -> Result<Graph, SearchError> {
        panic!("boom")
    }

    fn description(&self) -> String {
        "Panicking".into()
    }

    fn data_type(&self) -> DataType {
        DataType::Mixed
    }

    fn parameters(&self) -> Vec<String> {
        vec![]
    }
}

/// Runs until cancelled, polling the token.
pub struct Patient;

impl Algorithm for Patient {
    fn search(&self, _: &DataSet, _: &Parameters, cancel: &CancelToken) -> Result<Graph, SearchError> {
        loop {
            cancel.check()?;
            thread::sleep(Duration::from_millis(5));
        }
    }

    fn description(&self) -> String {
        "Patient".into()
    }

    fn data_type(&self) -> DataType {
        DataType::Mixed
    }

    fn parameters(&self) -> Vec<String> {
        vec![]
    }
}

/// Sleeps for three seconds without looking at the token.
pub struct Stubborn;

impl Algorithm for Stubborn {
    fn search(&self, data: &DataSet, _: &Parameters, _: &CancelToken) -> Result<Graph, SearchError> {
        thread::sleep(Duration::from_secs(3));
        Ok(Graph::with_nodes(names(data)))
    }

    fn description(&self) -> String {
        "Stubborn".into()
    }

    fn data_type(&self) -> DataType {
        DataType::Mixed
    }

    fn parameters(&self) -> Vec<String> {
        vec![]
    }
}

// =============================================================================
// Statistics
// =============================================================================

/// Number of rows in the dataset.
pub struct Rows;

impl Statistic for Rows {
    fn abbreviation(&self) -> String {
        "N".into()
    }

    fn description(&self) -> String {
        "Rows in the dataset".into()
    }

    fn value(&self, _: &Graph, _: &Graph, data: Option<&DataSet>) -> Result<f64, StatisticError> {
        data.map(|d| d.num_rows() as f64).ok_or(StatisticError::MissingData)
    }

    fn norm_value(&self, value: f64) -> f64 {
        value / (1.0 + value)
    }
}

/// Estimated edges divided by ten; NaN for an empty estimate.
pub struct EdgeTenths;

impl Statistic for EdgeTenths {
    fn abbreviation(&self) -> String {
        "ET".into()
    }

    fn description(&self) -> String {
        "Estimated edges / 10".into()
    }

    fn value(&self, _: &Graph, estimated: &Graph, _: Option<&DataSet>) -> Result<f64, StatisticError> {
        match estimated.num_edges() {
            0 => Ok(f64::NAN),
            n => Ok(n as f64 / 10.0),
        }
    }

    fn norm_value(&self, value: f64) -> f64 {
        value
    }
}

/// Always fails.
pub struct Broken;

impl Statistic for Broken {
    fn abbreviation(&self) -> String {
        "BRK".into()
    }

    fn description(&self) -> String {
        "Always fails".into()
    }

    fn value(&self, _: &Graph, _: &Graph, _: Option<&DataSet>) -> Result<f64, StatisticError> {
        Err(StatisticError::Failed("not available".into()))
    }

    fn norm_value(&self, value: f64) -> f64 {
        value
    }
}

/// Panics while scoring.
pub struct Exploding;

impl Statistic for Exploding {
    fn abbreviation(&self) -> String {
        "EXP".into()
    }

    fn description(&self) -> String {
        "Panics while scoring".into()
    }

    fn value(&self, _: &Graph, _: &Graph, _: Option<&DataSet>) -> Result<f64, StatisticError> {
        panic!("value boom")
    }

    fn norm_value(&self, value: f64) -> f64 {
        value
    }
}

/// Scores 1 but panics when normalized.
pub struct Unscaled;

impl Statistic for Unscaled {
    fn abbreviation(&self) -> String {
        "UNS".into()
    }

    fn description(&self) -> String {
        "Panics when normalized".into()
    }

    fn value(&self, _: &Graph, _: &Graph, _: Option<&DataSet>) -> Result<f64, StatisticError> {
        Ok(1.0)
    }

    fn norm_value(&self, _: f64) -> f64 {
        panic!("norm boom")
    }
}
