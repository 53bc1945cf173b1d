//! Text, markdown and CSV output of a finished comparison.

use super::support::{parameters, Draws, EdgeTenths, Failing, Rows, Staircase};
use algcomp::algorithms::EmptyGraph;
use algcomp::checkpoint::{CsvUnitSink, CSV_HEADER_PREFIX};
use algcomp::output::{to_markdown, write_report, write_report_file, write_summary_csv};
use algcomp::{Comparison, ComparisonResults, Statistics};
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;

fn statistics() -> Statistics {
    let mut statistics = Statistics::new();
    statistics.add_weighted(Rows, 1.0);
    statistics.add_weighted(EdgeTenths, 0.5);
    statistics
}

fn comparison() -> Comparison {
    let mut p = parameters(2);
    p.set("edges", 4);
    Comparison::new(p)
        .algorithm(EmptyGraph)
        .algorithm(Draws)
        .simulation(Staircase)
        .statistics(statistics())
}

fn finished() -> ComparisonResults {
    comparison().run(|_, _| {}).unwrap()
}

#[test]
fn text_report_has_every_section() {
    let mut out = Vec::new();
    write_report(&finished(), &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    for expected in [
        "Statistics:",
        "N = Rows in the dataset",
        "ET = Estimated edges / 10",
        "Parameters:",
        "edges = 4",
        "Simulation:",
        "Staircase",
        "Algorithms:",
        "1. Empty graph",
        "2. Draws",
        "Weighting of statistics:",
        "    1 * f(N)",
        "    0.5 * f(ET)",
        "Units: 4 completed, 0 failed",
        "AVERAGE STATISTICS",
        "STANDARD DEVIATIONS",
        "All edges",
    ] {
        assert!(text.contains(expected), "missing {:?} in:\n{}", expected, text);
    }

    let averages = text.find("AVERAGE STATISTICS").unwrap();
    let deviations = text.find("STANDARD DEVIATIONS").unwrap();
    assert!(averages < deviations);
}

#[test]
fn report_files_are_written() {
    let dir = tempdir().unwrap();
    let results = finished();

    let report = dir.path().join("comparison.txt");
    write_report_file(&results, &report).unwrap();
    assert!(fs::read_to_string(&report).unwrap().contains("Algorithms:"));

    let md = to_markdown(&results);
    assert!(md.starts_with("# Comparison Results"));
    assert!(md.contains("## AVERAGE STATISTICS"));
    assert!(md.contains("| N | ET |"));
}

#[test]
fn summary_csv_has_one_line_per_table_row() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("summary.csv");
    let results = finished();
    write_summary_csv(&results, &path).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines[0],
        "graph_type,mode,algorithm_index,simulation_index,algorithm,simulation,N,ET,utility"
    );
    // Two modes, one graph type, two pairings.
    assert_eq!(lines.len(), 1 + 2 * 2);
    assert!(lines[1].starts_with("All edges,average,1,1,Empty graph,Staircase,1.50,*,"));
    assert!(lines[2].starts_with("All edges,average,2,1,Draws,Staircase,1.50,0.40,"));
}

#[test]
fn unit_sink_logs_every_unit() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("units.csv");
    let sink = CsvUnitSink::create(&path, &statistics()).unwrap();

    let mut p = parameters(2);
    p.set("edges", 4);
    let results = Comparison::new(p)
        .algorithm(Draws)
        .algorithm(Failing)
        .simulation(Staircase)
        .statistics(statistics())
        .with_sink(Arc::new(sink))
        .run(|_, _| {})
        .unwrap();
    assert_eq!(results.failed(), 2);

    let content = fs::read_to_string(&path).unwrap();
    let mut lines = content.lines();
    assert_eq!(lines.next(), Some(format!("{},N,ET,utility", CSV_HEADER_PREFIX).as_str()));

    let mut rows: Vec<Vec<&str>> = lines.map(|l| l.split(',').collect()).collect();
    assert_eq!(rows.len(), 4);
    rows.sort_by_key(|r| (r[0], r[4]));

    let first = &rows[0];
    assert_eq!(&first[..6], ["1", "1", "Draws", "Staircase", "1", "completed"]);
    assert_eq!(first[8], "4");
    assert_eq!(first[9], "1.000000");
    assert_eq!(first[10], "0.400000");

    let failed = &rows[2];
    assert_eq!(&failed[..6], ["2", "1", "Failing", "Staircase", "1", "error"]);
    assert_eq!(&failed[8..], ["", "", "", ""]);
}
