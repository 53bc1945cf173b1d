//! Reference-graph derivation and edge-type subgraphs.

use super::support::{parameters, Draws, Rows, Staircase, Truth};
use algcomp::algorithms::EmptyGraph;
use algcomp::output::write_report;
use algcomp::statistics::{AdjacencyPrecision, Shd};
use algcomp::synthetic::MixedSimulation;
use algcomp::{CellValue, Comparison, ComparisonConfig, ComparisonGraph, GraphType, Mode};

/// SHD of `Truth` and of a one-edge `Draws` against the chosen reference.
fn shd_against(reference: ComparisonGraph) -> (f64, f64) {
    let mut p = parameters(1);
    p.set("edges", 1);
    let results = Comparison::new(p)
        .config(ComparisonConfig::new().comparison_graph(reference))
        .algorithm(Truth)
        .algorithm(Draws)
        .simulation(Staircase)
        .statistic(Shd, 1.0)
        .run(|_, _| {})
        .unwrap();

    assert_eq!(results.completed(), 2);
    let averages = results.table(GraphType::AllEdges, Mode::Average).unwrap();
    let shd = |row| averages.cell(row, 0).and_then(CellValue::as_f64).unwrap();
    (shd(0), shd(1))
}

#[test]
fn estimates_are_scored_against_the_derived_reference() {
    // X1 -> X2 is its own equivalence class only as a DAG: the CPDAG leaves
    // it undirected and the PAG leaves both marks as circles.
    assert_eq!(shd_against(ComparisonGraph::TrueDag), (0.0, 1.0));
    assert_eq!(shd_against(ComparisonGraph::Cpdag), (1.0, 0.0));
    assert_eq!(shd_against(ComparisonGraph::Pag), (1.0, 1.0));
}

#[test]
fn mixed_data_fills_every_edge_type_table() {
    let mut p = parameters(2);
    p.set("numMeasures", 6);
    p.set("sampleSize", 200);
    p.set("percentDiscrete", 50);
    p.set("edges", 3);

    let results = Comparison::new(p)
        .config(ComparisonConfig::new().workers(2))
        .algorithm(EmptyGraph)
        .algorithm(Draws)
        .simulation(MixedSimulation)
        .statistic(Rows, 1.0)
        .statistic(AdjacencyPrecision, 1.0)
        .run(|_, _| {})
        .unwrap();

    assert_eq!(results.completed(), 4);
    assert_eq!(results.graph_types_used, [true; GraphType::COUNT]);
    // Two default modes, one table per edge type.
    assert_eq!(results.tables.len(), 2 * GraphType::COUNT);
    for graph_type in GraphType::ALL {
        let averages = results.table(graph_type, Mode::Average).unwrap();
        assert_eq!(averages.num_rows(), 2);
        assert_eq!(averages.cell(0, 0), Some(&CellValue::Numeric(200.0)), "{}", graph_type.header());
    }

    let mut out = Vec::new();
    write_report(&results, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    for header in ["All edges", "Discrete-discrete", "Discrete-continuous", "Continuous-continuous"] {
        assert!(text.contains(header), "missing {:?} in:\n{}", header, text);
    }
}
