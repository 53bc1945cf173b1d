//! Reference algorithms.
//!
//! [`CorrelationSearch`] is a depth-zero constraint search: Fisher-z tests
//! of marginal correlation give the skeleton, and a significant partial
//! correlation given the middle node orients an unshielded triple as a
//! collider. [`EmptyGraph`] is the baseline every comparison can include.

use crate::cancel::CancelToken;
use crate::capability::Algorithm;
use crate::data::{DataSet, DataType};
use crate::error::SearchError;
use crate::graph::{Endpoint, Graph};
use algcomp_core::Parameters;
use tracing::debug;

/// Standard normal CDF: Φ(x) = (1 + erf(x/√2)) / 2
#[inline]
fn normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + libm::erf(x * std::f64::consts::FRAC_1_SQRT_2))
}

/// Two-sided Fisher-z p-value of a (partial) correlation `r` over `n` rows
/// with `conditioning` variables held fixed.
pub fn fisher_z_p_value(r: f64, n: usize, conditioning: usize) -> f64 {
    let dof = n as f64 - 3.0 - conditioning as f64;
    if dof <= 0.0 || !r.is_finite() {
        return 1.0;
    }
    let r = r.clamp(-1.0 + 1e-12, 1.0 - 1e-12);
    let z = r.atanh() * dof.sqrt();
    2.0 * (1.0 - normal_cdf(z.abs()))
}

/// Pairwise Pearson correlations. A constant column correlates 0 with
/// everything.
fn correlation_matrix(columns: &[&[f64]], cancel: &CancelToken) -> Result<Vec<Vec<f64>>, SearchError> {
    let k = columns.len();
    let standardized: Vec<Vec<f64>> = columns
        .iter()
        .map(|c| {
            let n = c.len() as f64;
            let mean = c.iter().sum::<f64>() / n;
            let sd = (c.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n).sqrt();
            if sd > 0.0 {
                c.iter().map(|v| (v - mean) / sd).collect()
            } else {
                vec![0.0; c.len()]
            }
        })
        .collect();

    let mut r = vec![vec![0.0; k]; k];
    for i in 0..k {
        cancel.check()?;
        r[i][i] = 1.0;
        for j in (i + 1)..k {
            let n = standardized[i].len() as f64;
            let v = standardized[i]
                .iter()
                .zip(&standardized[j])
                .map(|(a, b)| a * b)
                .sum::<f64>()
                / n;
            r[i][j] = v;
            r[j][i] = v;
        }
    }
    Ok(r)
}

fn partial_correlation(r: &[Vec<f64>], x: usize, y: usize, z: usize) -> f64 {
    let den = ((1.0 - r[x][z] * r[x][z]) * (1.0 - r[y][z] * r[y][z])).sqrt();
    if den > 0.0 {
        (r[x][y] - r[x][z] * r[y][z]) / den
    } else {
        0.0
    }
}

/// Correlation-based skeleton search with collider orientation.
#[derive(Debug, Clone, Copy, Default)]
pub struct CorrelationSearch;

impl Algorithm for CorrelationSearch {
    fn search(&self, data: &DataSet, parameters: &Parameters, cancel: &CancelToken) -> Result<Graph, SearchError> {
        let alpha = parameters.get_f64_or("alpha", 0.01)?;
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(SearchError::Failed(format!("alpha must be in (0, 1), got {}", alpha)));
        }
        let n = data.num_rows();
        if n < 5 {
            return Err(SearchError::Failed(format!("need at least 5 rows, got {}", n)));
        }

        let names: Vec<&str> = data.variable_names().collect();
        let columns: Vec<&[f64]> = (0..names.len()).filter_map(|i| data.column_at(i)).collect();
        let r = correlation_matrix(&columns, cancel)?;
        let k = names.len();

        let mut graph = Graph::with_nodes(names.iter().copied());
        let mut adjacent = vec![vec![false; k]; k];
        for i in 0..k {
            for j in (i + 1)..k {
                if fisher_z_p_value(r[i][j], n, 0) < alpha {
                    graph.add_undirected(names[i], names[j]);
                    adjacent[i][j] = true;
                    adjacent[j][i] = true;
                }
            }
        }

        let mut colliders = 0;
        for z in 0..k {
            cancel.check()?;
            let neighbors: Vec<usize> = (0..k).filter(|&v| adjacent[z][v]).collect();
            for (a, &x) in neighbors.iter().enumerate() {
                for &y in &neighbors[a + 1..] {
                    if adjacent[x][y] {
                        continue;
                    }
                    if fisher_z_p_value(partial_correlation(&r, x, y, z), n, 1) < alpha {
                        for end in [x, y] {
                            let at_end = graph
                                .endpoints(names[end], names[z])
                                .map_or(Endpoint::Tail, |(m, _)| m);
                            graph.add_edge(names[end], names[z], at_end, Endpoint::Arrow);
                        }
                        colliders += 1;
                    }
                }
            }
        }

        debug!(
            variables = k,
            edges = graph.num_edges(),
            colliders,
            "correlation search finished"
        );
        Ok(graph)
    }

    fn description(&self) -> String {
        "Correlation search (Fisher Z, depth 0)".into()
    }

    fn data_type(&self) -> DataType {
        DataType::Mixed
    }

    fn parameters(&self) -> Vec<String> {
        vec!["alpha".into()]
    }
}

/// Returns the data's variables with no edges.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyGraph;

impl Algorithm for EmptyGraph {
    fn search(&self, data: &DataSet, _: &Parameters, cancel: &CancelToken) -> Result<Graph, SearchError> {
        cancel.check()?;
        Ok(Graph::with_nodes(data.variable_names()))
    }

    fn description(&self) -> String {
        "Empty graph".into()
    }

    fn data_type(&self) -> DataType {
        DataType::Mixed
    }

    fn parameters(&self) -> Vec<String> {
        vec![]
    }
}
