//! Expansion, tensor layout, aggregation and ranking.

use super::support::{parameters, Draws, EdgeTenths, Rows, Staircase, Sweep};
use algcomp::algorithms::EmptyGraph;
use algcomp::statistics::{ElapsedTime, ParameterColumn};
use algcomp::{CellValue, Comparison, ComparisonConfig, GraphType, Mode, ParamValue};

#[test]
fn sweep_expands_in_odometer_order() {
    let mut p = parameters(2);
    p.set_values("a", vec![1.into(), 2.into()]).unwrap();
    p.set_values("b", vec!["x".into(), "y".into(), "z".into()]).unwrap();

    let results = Comparison::new(p)
        .algorithm(Sweep)
        .simulation(Staircase)
        .statistic(Rows, 0.0)
        .run(|_, _| {})
        .unwrap();

    let bound: Vec<(ParamValue, ParamValue)> = results
        .algorithms
        .iter()
        .map(|a| (a.value("a").unwrap().clone(), a.value("b").unwrap().clone()))
        .collect();
    let expected: Vec<(ParamValue, ParamValue)> = [(1, "x"), (1, "y"), (1, "z"), (2, "x"), (2, "y"), (2, "z")]
        .into_iter()
        .map(|(a, b)| (a.into(), b.into()))
        .collect();
    assert_eq!(bound, expected);

    assert_eq!(results.pairings.len(), 6);
    assert_eq!(results.statuses.len(), 6 * 2);
    assert_eq!(results.completed(), 12);
    assert_eq!(results.algorithms[4].description(), "Sweep, a = 2, b = y");
}

#[test]
fn tensor_is_fully_populated_for_all_edges() {
    let mut p = parameters(3);
    p.set_values("edges", vec![1.into(), 2.into()]).unwrap();

    let results = Comparison::new(p)
        .config(ComparisonConfig::new().workers(2))
        .algorithm(Draws)
        .algorithm(EmptyGraph)
        .simulation(Staircase)
        .statistic(Rows, 1.0)
        .statistic(ParameterColumn::new("sampleSize"), 0.0)
        .statistic(ElapsedTime, 0.0)
        .run(|_, _| {})
        .unwrap();

    let pairings = results.pairings.len();
    assert_eq!(pairings, 3);
    assert_eq!(results.tensor.shape(), [4, pairings, 4, 3]);

    for p in 0..pairings {
        for s in 0..4 {
            for r in 0..3 {
                assert!(results.tensor.get(0, p, s, r).is_some(), "cell (0, {}, {}, {}) empty", p, s, r);
            }
        }
    }
    // Continuous data only scores all edges.
    assert_eq!(results.graph_types_used, [true, false, false, false]);
    assert_eq!(results.tensor.filled(), pairings * 4 * 3);
    assert_eq!(results.tables.len(), 2);
}

#[test]
fn runs_reduce_under_every_mode() {
    let config = ComparisonConfig::new().modes(Mode::ALL.to_vec());
    let results = Comparison::new(parameters(4))
        .config(config)
        .algorithm(EmptyGraph)
        .simulation(Staircase)
        .statistic(Rows, 1.0)
        .run(|_, _| {})
        .unwrap();

    let cell = |mode| {
        results
            .table(GraphType::AllEdges, mode)
            .and_then(|t| t.cell(0, 0))
            .and_then(CellValue::as_f64)
            .unwrap()
    };
    assert!((cell(Mode::Average) - 2.5).abs() < 1e-12);
    assert!((cell(Mode::StandardDeviation) - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);
    assert_eq!(cell(Mode::Min), 1.0);
    assert_eq!(cell(Mode::Max), 4.0);
    assert!((cell(Mode::Median) - 2.5).abs() < 1e-12);
}

#[test]
fn parameter_column_shows_literal_value_under_every_mode() {
    let mut p = parameters(4);
    p.set("sampleSize", 500);

    let results = Comparison::new(p)
        .config(ComparisonConfig::new().modes(Mode::ALL.to_vec()))
        .algorithm(EmptyGraph)
        .simulation(Staircase)
        .statistic(ParameterColumn::new("sampleSize"), 0.0)
        .run(|_, _| {})
        .unwrap();

    for mode in Mode::ALL {
        let table = results.table(GraphType::AllEdges, mode).unwrap();
        assert_eq!(table.cell(0, 0), Some(&CellValue::Numeric(500.0)), "{}", mode);
    }

    let standard_deviations = results
        .report_tables()
        .into_iter()
        .find(|t| t.mode == Mode::StandardDeviation)
        .unwrap();
    assert_eq!(standard_deviations.rows[0], vec!["500.00".to_string()]);
}

#[test]
fn zero_weight_statistic_does_not_move_utility() {
    // Rows averages 1.5 over two runs, so f(N) = 0.6; ET is NaN everywhere.
    let results = Comparison::new(parameters(2))
        .algorithm(EmptyGraph)
        .simulation(Staircase)
        .statistic(Rows, 1.0)
        .statistic(EdgeTenths, 0.0)
        .run(|_, _| {})
        .unwrap();
    assert!((results.utilities[0] - 0.6).abs() < 1e-12);
}

#[test]
fn rows_sort_by_descending_utility_with_nan_last() {
    let mut p = parameters(1);
    p.set_values("edges", vec![3.into(), 0.into(), 9.into()]).unwrap();

    let results = Comparison::new(p)
        .config(ComparisonConfig::new().sort_by_utility(true).show_utilities(true))
        .algorithm(Draws)
        .simulation(Staircase)
        .statistic(EdgeTenths, 1.0)
        .run(|_, _| {})
        .unwrap();

    assert!((results.utilities[0] - 0.3).abs() < 1e-12);
    assert!(results.utilities[1].is_nan());
    assert!((results.utilities[2] - 0.9).abs() < 1e-12);
    assert_eq!(results.order, vec![2, 0, 1]);

    let averages = &results.report_tables()[0];
    let u = averages.column("U").unwrap();
    let column: Vec<&str> = averages.rows.iter().map(|r| r[u].as_str()).collect();
    assert_eq!(column, vec!["0.90", "0.30", "*"]);
}

#[test]
fn progress_reaches_one() {
    let mut fractions = Vec::new();
    Comparison::new(parameters(3))
        .algorithm(EmptyGraph)
        .simulation(Staircase)
        .statistic(Rows, 1.0)
        .run(|fraction, _| fractions.push(fraction))
        .unwrap();

    assert_eq!(fractions.len(), 3);
    assert!(fractions.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(fractions.last().copied(), Some(1.0));
}

#[test]
fn one_varied_parameter_gives_one_configuration_per_value() {
    let mut p = parameters(1);
    p.set_values("edges", vec![1.into(), 2.into(), 3.into()]).unwrap();

    let results = Comparison::new(p)
        .algorithm(Draws)
        .simulation(Staircase)
        .statistic(Rows, 1.0)
        .run(|_, _| {})
        .unwrap();

    assert_eq!(results.simulations.len(), 1);
    assert_eq!(results.algorithms.len(), 3);
    for (config, expected) in results.algorithms.iter().zip([1i64, 2, 3]) {
        assert_eq!(config.overridden(), ["edges".to_string()]);
        assert_eq!(config.value("edges"), Some(&ParamValue::Int(expected)));
        assert_eq!(config.value("sampleSize"), Some(&ParamValue::Int(1000)));
    }
}
