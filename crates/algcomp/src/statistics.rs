//! Reference statistics.
//!
//! Adjacency and arrowhead precision/recall, structural Hamming distance,
//! search timing, and parameter columns. Precision and recall are NaN when
//! their denominator is zero, which the aggregation treats as missing.

use crate::capability::{Clock, Statistic, StatisticKind};
use crate::data::DataSet;
use crate::error::StatisticError;
use crate::graph::{Endpoint, Graph};

/// Counts of a confusion between two graphs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Confusion {
    pub tp: usize,
    pub fp: usize,
    pub fn_: usize,
}

impl Confusion {
    pub fn precision(&self) -> f64 {
        ratio(self.tp, self.tp + self.fp)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.tp, self.tp + self.fn_)
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        f64::NAN
    } else {
        num as f64 / den as f64
    }
}

/// Adjacency confusion of `estimated` against `reference`.
pub fn adjacency_confusion(reference: &Graph, estimated: &Graph) -> Confusion {
    let mut c = Confusion::default();
    for e in estimated.edges() {
        if reference.is_adjacent(&e.node1, &e.node2) {
            c.tp += 1;
        } else {
            c.fp += 1;
        }
    }
    c.fn_ = reference
        .edges()
        .filter(|e| !estimated.is_adjacent(&e.node1, &e.node2))
        .count();
    c
}

/// Arrowhead confusion of `estimated` against `reference`.
///
/// Each arrow mark is one item, identified by its edge and the node it
/// points into.
pub fn arrowhead_confusion(reference: &Graph, estimated: &Graph) -> Confusion {
    let arrows = |g: &Graph| -> Vec<(String, String)> {
        g.edges()
            .flat_map(|e| {
                let mut v = Vec::with_capacity(2);
                if e.endpoint1 == Endpoint::Arrow {
                    v.push((e.node2.clone(), e.node1.clone()));
                }
                if e.endpoint2 == Endpoint::Arrow {
                    v.push((e.node1, e.node2));
                }
                v
            })
            .collect()
    };
    // (from, into): the arrow on the from-into edge sits at `into`.
    let has_arrow = |g: &Graph, from: &str, into: &str| {
        g.endpoints(into, from)
            .is_some_and(|(at_into, _)| at_into == Endpoint::Arrow)
    };

    let mut c = Confusion::default();
    for (from, into) in arrows(estimated) {
        if has_arrow(reference, &from, &into) {
            c.tp += 1;
        } else {
            c.fp += 1;
        }
    }
    c.fn_ = arrows(reference)
        .into_iter()
        .filter(|(from, into)| !has_arrow(estimated, from, into))
        .count();
    c
}

/// Structural Hamming distance: one per node pair whose adjacency differs,
/// and one per shared adjacency whose marks differ.
pub fn structural_hamming_distance(reference: &Graph, estimated: &Graph) -> usize {
    let mut shd = 0;
    for e in reference.edges() {
        match estimated.endpoints(&e.node1, &e.node2) {
            None => shd += 1,
            Some(marks) if marks != (e.endpoint1, e.endpoint2) => shd += 1,
            Some(_) => {}
        }
    }
    shd + estimated
        .edges()
        .filter(|e| !reference.is_adjacent(&e.node1, &e.node2))
        .count()
}

/// Adjacency precision.
pub struct AdjacencyPrecision;

impl Statistic for AdjacencyPrecision {
    fn abbreviation(&self) -> String {
        "AP".into()
    }

    fn description(&self) -> String {
        "Adjacency Precision".into()
    }

    fn value(&self, reference: &Graph, estimated: &Graph, _: Option<&DataSet>) -> Result<f64, StatisticError> {
        Ok(adjacency_confusion(reference, estimated).precision())
    }

    fn norm_value(&self, value: f64) -> f64 {
        value
    }
}

/// Adjacency recall.
pub struct AdjacencyRecall;

impl Statistic for AdjacencyRecall {
    fn abbreviation(&self) -> String {
        "AR".into()
    }

    fn description(&self) -> String {
        "Adjacency Recall".into()
    }

    fn value(&self, reference: &Graph, estimated: &Graph, _: Option<&DataSet>) -> Result<f64, StatisticError> {
        Ok(adjacency_confusion(reference, estimated).recall())
    }

    fn norm_value(&self, value: f64) -> f64 {
        value
    }
}

pub struct ArrowheadPrecision;

impl Statistic for ArrowheadPrecision {
    fn abbreviation(&self) -> String {
        "AHP".into()
    }

    fn description(&self) -> String {
        "Arrowhead precision".into()
    }

    fn value(&self, reference: &Graph, estimated: &Graph, _: Option<&DataSet>) -> Result<f64, StatisticError> {
        Ok(arrowhead_confusion(reference, estimated).precision())
    }

    fn norm_value(&self, value: f64) -> f64 {
        value
    }
}

pub struct ArrowheadRecall;

impl Statistic for ArrowheadRecall {
    fn abbreviation(&self) -> String {
        "AHR".into()
    }

    fn description(&self) -> String {
        "Arrowhead recall".into()
    }

    fn value(&self, reference: &Graph, estimated: &Graph, _: Option<&DataSet>) -> Result<f64, StatisticError> {
        Ok(arrowhead_confusion(reference, estimated).recall())
    }

    fn norm_value(&self, value: f64) -> f64 {
        value
    }
}

/// Structural Hamming distance.
pub struct Shd;

impl Statistic for Shd {
    fn abbreviation(&self) -> String {
        "SHD".into()
    }

    fn description(&self) -> String {
        "Structural Hamming Distance".into()
    }

    fn value(&self, reference: &Graph, estimated: &Graph, _: Option<&DataSet>) -> Result<f64, StatisticError> {
        Ok(structural_hamming_distance(reference, estimated) as f64)
    }

    fn norm_value(&self, value: f64) -> f64 {
        1.0 - (value / 50.0).tanh()
    }
}

/// Wall-clock time of the search, in seconds.
pub struct ElapsedTime;

impl Statistic for ElapsedTime {
    fn abbreviation(&self) -> String {
        "E".into()
    }

    fn description(&self) -> String {
        "Elapsed time in seconds".into()
    }

    fn value(&self, _: &Graph, _: &Graph, _: Option<&DataSet>) -> Result<f64, StatisticError> {
        Err(StatisticError::Failed("timing is filled in by the runner".into()))
    }

    fn norm_value(&self, value: f64) -> f64 {
        1.0 - value.tanh()
    }

    fn kind(&self) -> StatisticKind {
        StatisticKind::Timing(Clock::Wall)
    }
}

/// CPU time of the search thread, in seconds.
pub struct ElapsedCpuTime;

impl Statistic for ElapsedCpuTime {
    fn abbreviation(&self) -> String {
        "CPU".into()
    }

    fn description(&self) -> String {
        "Elapsed CPU time in seconds".into()
    }

    fn value(&self, _: &Graph, _: &Graph, _: Option<&DataSet>) -> Result<f64, StatisticError> {
        Err(StatisticError::Failed("timing is filled in by the runner".into()))
    }

    fn norm_value(&self, value: f64) -> f64 {
        1.0 - value.tanh()
    }

    fn kind(&self) -> StatisticKind {
        StatisticKind::Timing(Clock::Cpu)
    }
}

/// Shows a parameter's value as a column.
pub struct ParameterColumn {
    name: String,
}

impl ParameterColumn {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Statistic for ParameterColumn {
    fn abbreviation(&self) -> String {
        self.name.clone()
    }

    fn description(&self) -> String {
        format!("Value of the '{}' parameter", self.name)
    }

    fn value(&self, _: &Graph, _: &Graph, _: Option<&DataSet>) -> Result<f64, StatisticError> {
        Err(StatisticError::Failed(format!(
            "'{}' is a parameter column",
            self.name
        )))
    }

    fn norm_value(&self, _: f64) -> f64 {
        f64::NAN
    }

    fn kind(&self) -> StatisticKind {
        StatisticKind::ParameterColumn(self.name.clone())
    }
}
