//! Reduction of the result tensor into per-mode statistic tables.

use crate::capability::{guarded_norm_value, StatisticKind, Statistics};
use crate::graph::GraphType;
use crate::pairing::Pairing;
use crate::tensor::ResultTensor;
use algcomp_core::{utility, CellValue, Mode, ParamValue};

/// One aggregated table: a row per pairing, a column per statistic plus
/// the utility column.
#[derive(Debug, Clone, PartialEq)]
pub struct StatTable {
    pub graph_type: GraphType,
    pub mode: Mode,
    /// `rows[pairing][slot]`, pairings in pairing-index order.
    pub rows: Vec<Vec<CellValue>>,
}

impl StatTable {
    pub fn cell(&self, pairing: usize, slot: usize) -> Option<&CellValue> {
        self.rows.get(pairing).and_then(|r| r.get(slot))
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }
}

fn literal(value: Option<&ParamValue>) -> CellValue {
    match value {
        Some(ParamValue::Bool(b)) => CellValue::Boolean(*b),
        Some(ParamValue::Text(s)) => CellValue::Text(s.clone()),
        Some(v) => CellValue::from_reduction(v.as_f64()),
        None => CellValue::Missing,
    }
}

/// Reduces a filled tensor.
pub struct Aggregator<'a> {
    tensor: &'a ResultTensor,
    pairings: &'a [Pairing],
    statistics: &'a Statistics,
}

impl<'a> Aggregator<'a> {
    pub fn new(tensor: &'a ResultTensor, pairings: &'a [Pairing], statistics: &'a Statistics) -> Self {
        Self {
            tensor,
            pairings,
            statistics,
        }
    }

    /// Reduce every statistic column for one graph type and mode.
    ///
    /// Parameter columns show the parameter's literal value whatever the
    /// mode. The utility column holds the reduction of the per-run
    /// utilities; report tables show the pairing utility from
    /// [`Aggregator::utilities`] instead.
    pub fn table(&self, graph_type: GraphType, mode: Mode) -> StatTable {
        let g = graph_type.index();
        let rows = self
            .pairings
            .iter()
            .enumerate()
            .map(|(p, pairing)| {
                let mut row: Vec<CellValue> = self
                    .statistics
                    .iter()
                    .enumerate()
                    .map(|(s, (statistic, _))| match statistic.kind() {
                        StatisticKind::ParameterColumn(name) => literal(pairing.parameter_value(&name)),
                        _ => CellValue::from_reduction(mode.reduce_runs(self.tensor.runs(g, p, s))),
                    })
                    .collect();
                let u = self.tensor.utility_slot();
                row.push(CellValue::from_reduction(mode.reduce_runs(self.tensor.runs(g, p, u))));
                row
            })
            .collect();

        StatTable {
            graph_type,
            mode,
            rows,
        }
    }

    /// Utility of each pairing from its all-edges averages.
    ///
    /// NaN for a pairing none of whose weighted statistics has a finite
    /// average.
    pub fn utilities(&self) -> Vec<f64> {
        let averages = self.table(GraphType::AllEdges, Mode::Average);
        utilities_from(&averages, self.statistics)
    }
}

/// Utility per row of an all-edges average table.
pub fn utilities_from(averages: &StatTable, statistics: &Statistics) -> Vec<f64> {
    averages
        .rows
        .iter()
        .map(|row| {
            utility(statistics.iter().enumerate().map(|(s, (statistic, weight))| {
                let normalized = row
                    .get(s)
                    .and_then(CellValue::as_f64)
                    .filter(|v| v.is_finite())
                    .and_then(|v| guarded_norm_value(statistic, v));
                (weight, normalized)
            }))
        })
        .collect()
}
