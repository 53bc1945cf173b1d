//! Assembly of aggregated tables into rows of display strings.

use crate::aggregator::StatTable;
use crate::capability::Statistics;
use crate::config::ComparisonConfig;
use crate::graph::GraphType;
use crate::pairing::Pairing;
use algcomp_core::{CellFormat, Mode};

/// Column choices for assembled tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    pub show_algorithm_indices: bool,
    pub show_simulation_indices: bool,
    pub show_utilities: bool,
    pub format: CellFormat,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            show_algorithm_indices: false,
            show_simulation_indices: false,
            show_utilities: false,
            format: CellFormat::default(),
        }
    }
}

impl From<&ComparisonConfig> for ReportOptions {
    fn from(config: &ComparisonConfig) -> Self {
        Self {
            show_algorithm_indices: config.show_algorithm_indices,
            show_simulation_indices: config.show_simulation_indices,
            show_utilities: config.show_utilities,
            format: config.cell_format(),
        }
    }
}

/// A table ready for rendering: a header row and one string row per
/// pairing, in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    pub mode: Mode,
    pub graph_type: GraphType,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ReportTable {
    /// Index of a column by heading.
    pub fn column(&self, heading: &str) -> Option<usize> {
        self.header.iter().position(|h| h == heading)
    }

    pub fn num_columns(&self) -> usize {
        self.header.len()
    }
}

/// Lay out one aggregated table.
///
/// `order` lists pairing indices top to bottom. `utilities` is indexed by
/// pairing and only read when the utility column is shown.
pub fn assemble(
    table: &StatTable,
    pairings: &[Pairing],
    statistics: &Statistics,
    utilities: &[f64],
    order: &[usize],
    options: &ReportOptions,
) -> ReportTable {
    let mut header = Vec::with_capacity(statistics.len() + 3);
    if options.show_algorithm_indices {
        header.push("Alg".to_string());
    }
    if options.show_simulation_indices {
        header.push("Sim".to_string());
    }
    header.extend(statistics.iter().map(|(s, _)| s.abbreviation()));
    if options.show_utilities {
        header.push("U".to_string());
    }

    let rows = order
        .iter()
        .filter_map(|&p| {
            let pairing = pairings.get(p)?;
            let cells = table.rows.get(p)?;
            let mut row = Vec::with_capacity(header.len());
            if options.show_algorithm_indices {
                row.push((pairing.algorithm_index + 1).to_string());
            }
            if options.show_simulation_indices {
                row.push((pairing.simulation_index + 1).to_string());
            }
            row.extend(
                cells
                    .iter()
                    .take(statistics.len())
                    .map(|c| options.format.format(c)),
            );
            if options.show_utilities {
                let u = utilities.get(p).copied().unwrap_or(f64::NAN);
                row.push(options.format.format_number(u));
            }
            Some(row)
        })
        .collect();

    ReportTable {
        mode: table.mode,
        graph_type: table.graph_type,
        header,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancelToken;
    use crate::capability::{Algorithm, Simulation, Statistic};
    use crate::data::{DataSet, DataType};
    use crate::error::{SearchError, SimulationError, StatisticError};
    use crate::graph::Graph;
    use crate::wrappers::{AlgorithmConfig, SimulationConfig};
    use algcomp_core::{CellValue, Parameters};
    use std::sync::Arc;

    struct A;

    impl Algorithm for A {
        fn search(&self, _: &DataSet, _: &Parameters, _: &CancelToken) -> Result<Graph, SearchError> {
            Ok(Graph::new())
        }
        fn description(&self) -> String {
            "a".into()
        }
        fn data_type(&self) -> DataType {
            DataType::Continuous
        }
        fn parameters(&self) -> Vec<String> {
            vec![]
        }
    }

    struct S;

    impl Simulation for S {
        fn create_data(&self, _: &Parameters) -> Result<Vec<(Graph, DataSet)>, SimulationError> {
            Ok(vec![])
        }
        fn description(&self) -> String {
            "s".into()
        }
        fn data_type(&self) -> DataType {
            DataType::Continuous
        }
        fn parameters(&self) -> Vec<String> {
            vec![]
        }
    }

    struct Stat(&'static str);

    impl Statistic for Stat {
        fn abbreviation(&self) -> String {
            self.0.into()
        }
        fn description(&self) -> String {
            self.0.into()
        }
        fn value(&self, _: &Graph, _: &Graph, _: Option<&DataSet>) -> Result<f64, StatisticError> {
            Ok(0.0)
        }
        fn norm_value(&self, value: f64) -> f64 {
            value
        }
    }

    fn fixture() -> (Vec<Pairing>, Statistics, StatTable) {
        let alg = Arc::new(AlgorithmConfig::new(Arc::new(A), Parameters::new()));
        let sim = Arc::new(SimulationConfig::new(Arc::new(S), Parameters::new()));
        let pairings = (0..3)
            .map(|i| Pairing {
                algorithm: Arc::clone(&alg),
                simulation: Arc::clone(&sim),
                algorithm_index: i,
                simulation_index: 0,
            })
            .collect();
        let mut stats = Statistics::new();
        stats.add(Stat("AP"));
        stats.add(Stat("B"));
        let table = StatTable {
            graph_type: GraphType::AllEdges,
            mode: Mode::Average,
            rows: vec![
                vec![CellValue::Numeric(0.5), CellValue::Missing, CellValue::Missing],
                vec![CellValue::Numeric(0.25), CellValue::Boolean(false), CellValue::Missing],
                vec![CellValue::Numeric(0.000123), CellValue::Text("x".into()), CellValue::Missing],
            ],
        };
        (pairings, stats, table)
    }

    #[test]
    fn test_plain_columns() {
        let (pairings, stats, table) = fixture();
        let report = assemble(&table, &pairings, &stats, &[], &[0, 1, 2], &ReportOptions::default());
        assert_eq!(report.header, vec!["AP", "B"]);
        assert_eq!(report.rows[0], vec!["0.50", "*"]);
        assert_eq!(report.rows[1], vec!["0.25", "No"]);
        assert_eq!(report.rows[2], vec!["1.23E-4", "x"]);
    }

    #[test]
    fn test_index_and_utility_columns_in_sort_order() {
        let (pairings, stats, table) = fixture();
        let options = ReportOptions {
            show_algorithm_indices: true,
            show_simulation_indices: true,
            show_utilities: true,
            ..ReportOptions::default()
        };
        let utilities = [0.3, f64::NAN, 0.9];
        let report = assemble(&table, &pairings, &stats, &utilities, &[2, 0, 1], &options);
        assert_eq!(report.header, vec!["Alg", "Sim", "AP", "B", "U"]);
        assert_eq!(report.column("U"), Some(4));
        assert_eq!(report.rows[0], vec!["3", "1", "1.23E-4", "x", "0.90"]);
        assert_eq!(report.rows[1][0], "1");
        assert_eq!(report.rows[2], vec!["2", "1", "0.25", "No", "*"]);
    }
}
