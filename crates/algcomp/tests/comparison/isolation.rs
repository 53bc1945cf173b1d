//! One unit's failure never leaks into another's results.

use super::support::{parameters, Broken, Exploding, Failing, Panicking, Patient, Rows, Staircase, Unscaled};
use algcomp::algorithms::EmptyGraph;
use algcomp::{CellValue, Comparison, ComparisonConfig, GraphType, Mode, SearchError, UnitError, UnitStatus};
use std::time::{Duration, Instant};

#[cfg(feature = "parallel")]
use super::support::Stubborn;

#[test]
fn failing_and_panicking_units_are_isolated() {
    let results = Comparison::new(parameters(2))
        .config(ComparisonConfig::new().workers(3))
        .algorithm(EmptyGraph)
        .algorithm(Failing)
        .algorithm(Panicking)
        .simulation(Staircase)
        .statistic(Rows, 1.0)
        .run(|_, _| {})
        .unwrap();

    assert_eq!(results.completed(), 2);
    assert_eq!(results.failed(), 4);
    for r in 0..2 {
        assert_eq!(results.status(0, r), Some(&UnitStatus::Completed));
        assert_eq!(
            results.status(1, r),
            Some(&UnitStatus::Failed(UnitError::Search(SearchError::Failed(
                "no convergence".into()
            ))))
        );
        assert!(matches!(
            results.status(2, r),
            Some(UnitStatus::Failed(UnitError::Panicked(msg))) if msg == "boom"
        ));
        for s in 0..2 {
            assert_eq!(results.tensor.get(0, 1, s, r), None);
            assert_eq!(results.tensor.get(0, 2, s, r), None);
        }
    }

    let averages = results.table(GraphType::AllEdges, Mode::Average).unwrap();
    assert_eq!(averages.cell(0, 0), Some(&CellValue::Numeric(1.5)));
    assert_eq!(averages.cell(1, 0), Some(&CellValue::Missing));
    assert_eq!(averages.cell(2, 0), Some(&CellValue::Missing));
    assert!(results.utilities[1].is_nan());
}

#[test]
fn failing_statistic_leaves_only_its_cell_missing() {
    let results = Comparison::new(parameters(2))
        .algorithm(EmptyGraph)
        .simulation(Staircase)
        .statistic(Broken, 1.0)
        .statistic(Rows, 1.0)
        .run(|_, _| {})
        .unwrap();

    assert_eq!(results.completed(), 2);
    let averages = results.table(GraphType::AllEdges, Mode::Average).unwrap();
    assert_eq!(averages.cell(0, 0), Some(&CellValue::Missing));
    assert_eq!(averages.cell(0, 1), Some(&CellValue::Numeric(1.5)));
    // Only the statistic that produced a value is weighed.
    assert!((results.utilities[0] - 0.6).abs() < 1e-12);
}

#[test]
fn panicking_statistic_leaves_only_its_cell_missing() {
    let results = Comparison::new(parameters(2))
        .config(ComparisonConfig::new().workers(2))
        .algorithm(EmptyGraph)
        .simulation(Staircase)
        .statistic(Exploding, 1.0)
        .statistic(Rows, 1.0)
        .run(|_, _| {})
        .unwrap();

    assert_eq!(results.completed(), 2);
    let averages = results.table(GraphType::AllEdges, Mode::Average).unwrap();
    assert_eq!(averages.cell(0, 0), Some(&CellValue::Missing));
    assert_eq!(averages.cell(0, 1), Some(&CellValue::Numeric(1.5)));
    assert!((results.utilities[0] - 0.6).abs() < 1e-12);
}

#[test]
fn panicking_normalization_only_drops_its_utility_term() {
    let results = Comparison::new(parameters(2))
        .config(ComparisonConfig::new().workers(2))
        .algorithm(EmptyGraph)
        .simulation(Staircase)
        .statistic(Unscaled, 1.0)
        .statistic(Rows, 1.0)
        .run(|_, _| {})
        .unwrap();

    assert_eq!(results.completed(), 2);
    let averages = results.table(GraphType::AllEdges, Mode::Average).unwrap();
    assert_eq!(averages.cell(0, 0), Some(&CellValue::Numeric(1.0)));
    assert_eq!(averages.cell(0, 1), Some(&CellValue::Numeric(1.5)));
    assert!((results.utilities[0] - 0.6).abs() < 1e-12);
}

#[test]
fn cooperative_search_times_out() {
    let config = ComparisonConfig::new()
        .workers(2)
        .unit_timeout(Duration::from_millis(50));
    let start = Instant::now();
    let results = Comparison::new(parameters(1))
        .config(config)
        .algorithm(EmptyGraph)
        .algorithm(Patient)
        .simulation(Staircase)
        .statistic(Rows, 1.0)
        .run(|_, _| {})
        .unwrap();

    assert!(start.elapsed() < Duration::from_secs(5));
    assert_eq!(results.status(0, 0), Some(&UnitStatus::Completed));
    assert!(matches!(
        results.status(1, 0),
        Some(UnitStatus::Failed(UnitError::TimedOut { .. }))
    ));
}

#[cfg(feature = "parallel")]
#[test]
fn unit_ignoring_timeout_is_abandoned() {
    let config = ComparisonConfig::new()
        .workers(2)
        .unit_timeout(Duration::from_millis(50))
        .abandon_grace(Duration::from_millis(50));
    let start = Instant::now();
    let results = Comparison::new(parameters(1))
        .config(config)
        .algorithm(EmptyGraph)
        .algorithm(Stubborn)
        .simulation(Staircase)
        .statistic(Rows, 1.0)
        .run(|_, _| {})
        .unwrap();

    // Stubborn sleeps for three seconds; the comparison must not wait.
    assert!(start.elapsed() < Duration::from_secs(2));
    assert_eq!(results.status(0, 0), Some(&UnitStatus::Completed));
    assert!(matches!(
        results.status(1, 0),
        Some(UnitStatus::Failed(UnitError::Abandoned { .. }))
    ));
}

#[cfg(feature = "parallel")]
#[test]
fn queued_units_run_after_a_unit_is_abandoned() {
    // One worker, and the first unit in the queue never honours its timeout.
    let config = ComparisonConfig::new()
        .workers(1)
        .unit_timeout(Duration::from_millis(50))
        .abandon_grace(Duration::from_millis(50));
    let start = Instant::now();
    let results = Comparison::new(parameters(2))
        .config(config)
        .algorithm(Stubborn)
        .algorithm(EmptyGraph)
        .simulation(Staircase)
        .statistic(Rows, 1.0)
        .run(|_, _| {})
        .unwrap();

    assert!(start.elapsed() < Duration::from_secs(2));
    assert_eq!(results.statuses.len(), 4);
    for r in 0..2 {
        assert!(matches!(
            results.status(0, r),
            Some(UnitStatus::Failed(UnitError::Abandoned { .. }))
        ));
        assert_eq!(results.status(1, r), Some(&UnitStatus::Completed));
    }
    assert_eq!(results.completed(), 2);

    let averages = results.table(GraphType::AllEdges, Mode::Average).unwrap();
    assert_eq!(averages.cell(0, 0), Some(&CellValue::Missing));
    assert_eq!(averages.cell(1, 0), Some(&CellValue::Numeric(1.5)));
}
