//! Execution of (pairing × run) work units.
//!
//! Units are independent: each reads its pairing's pre-generated dataset,
//! runs the search, scores the result and returns a [`UnitRecord`]. Workers
//! never touch shared results. Records travel over a channel to the calling
//! thread, which alone writes the [`ResultTensor`] and merges the
//! graph-type flags.
//!
//! # Failure isolation
//!
//! A search error, a panic or a timeout fails only its own unit; a failing
//! statistic leaves only its own cell missing. Timeouts are cooperative: the
//! unit's [`CancelToken`] expires and the search is expected to notice. A
//! unit still running `unit_timeout + abandon_grace` after it started is
//! abandoned. Its thread is left to finish on its own, whatever it
//! eventually returns is discarded, and its worker slot goes to the next
//! queued unit.

use crate::cancel::CancelToken;
use crate::capability::{guarded_norm_value, Clock, StatisticKind, Statistics};
use crate::clock::thread_cpu_time;
use crate::config::ComparisonConfig;
use crate::error::{panic_message, SearchError, StatisticError, UnitError};
use crate::graph::{ComparisonGraph, Graph, GraphType};
use crate::pairing::Pairing;
use crate::tensor::ResultTensor;
use algcomp_core::{utility, ParamValue};
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

#[cfg(feature = "parallel")]
use crossbeam_channel::{unbounded, RecvTimeoutError, Sender};
#[cfg(feature = "parallel")]
use std::thread;

/// How often the coordinator re-checks for overdue units.
#[cfg(feature = "parallel")]
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Final state of a unit.
#[derive(Debug, Clone, PartialEq)]
pub enum UnitStatus {
    Completed,
    Failed(UnitError),
}

impl UnitStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, UnitStatus::Completed)
    }

    /// Short label for CSV output.
    pub fn label(&self) -> &'static str {
        match self {
            UnitStatus::Completed => "completed",
            UnitStatus::Failed(UnitError::Search(_)) => "error",
            UnitStatus::Failed(UnitError::Panicked(_)) => "panicked",
            UnitStatus::Failed(UnitError::TimedOut { .. }) => "timed-out",
            UnitStatus::Failed(UnitError::Abandoned { .. }) => "abandoned",
            UnitStatus::Failed(UnitError::NotStarted(_)) => "not-started",
        }
    }
}

/// Everything one unit produced.
#[derive(Debug, Clone)]
pub struct UnitRecord {
    /// Pairing index.
    pub pairing: usize,
    /// Run index within the pairing's simulation.
    pub run: usize,
    /// Estimated graph, aligned to the true graph's nodes.
    pub estimated_graph: Option<Graph>,
    /// Wall-clock time of the search.
    pub elapsed: Duration,
    /// CPU time of the search, where the platform reports it.
    pub cpu_time: Option<Duration>,
    /// Values indexed `[graph type][statistic slot]`; the last slot is the
    /// run's utility.
    pub values: Vec<Vec<Option<f64>>>,
    /// Graph types this unit populated.
    pub graph_types_used: [bool; GraphType::COUNT],
    pub status: UnitStatus,
}

impl UnitRecord {
    fn new(pairing: usize, run: usize, slots: usize) -> Self {
        Self {
            pairing,
            run,
            estimated_graph: None,
            elapsed: Duration::ZERO,
            cpu_time: None,
            values: vec![vec![None; slots]; GraphType::COUNT],
            graph_types_used: [false; GraphType::COUNT],
            status: UnitStatus::Completed,
        }
    }

    /// Discard every value and mark the unit failed.
    fn fail(mut self, error: UnitError) -> Self {
        for row in &mut self.values {
            row.iter_mut().for_each(|v| *v = None);
        }
        self.graph_types_used = [false; GraphType::COUNT];
        self.estimated_graph = None;
        self.status = UnitStatus::Failed(error);
        self
    }

    pub fn elapsed_millis(&self) -> u64 {
        self.elapsed.as_millis() as u64
    }

    pub fn cpu_millis(&self) -> Option<u64> {
        self.cpu_time.map(|d| d.as_millis() as u64)
    }

    /// Statistic values for all edges, utility slot included.
    pub fn all_edge_values(&self) -> &[Option<f64>] {
        &self.values[GraphType::AllEdges.index()]
    }
}

/// Receiver for finished units, called on the coordinating thread in
/// completion order.
pub trait UnitSink: Send + Sync {
    fn record(&self, pairing: &Pairing, record: &UnitRecord) -> io::Result<()>;
}

/// Results of executing every unit.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub tensor: ResultTensor,
    /// Graph types at least one unit populated.
    pub graph_types_used: [bool; GraphType::COUNT],
    /// Status per unit, indexed `pairing * num_runs + run`.
    pub statuses: Vec<UnitStatus>,
    pub num_runs: usize,
    pub total_time: Duration,
}

impl RunOutput {
    pub fn status(&self, pairing: usize, run: usize) -> Option<&UnitStatus> {
        self.statuses.get(pairing * self.num_runs + run)
    }

    pub fn completed(&self) -> usize {
        self.statuses.iter().filter(|s| s.is_completed()).count()
    }

    pub fn failed(&self) -> usize {
        self.statuses.len() - self.completed()
    }
}

/// Executes work units and collects their results.
pub struct Scheduler {
    statistics: Arc<Statistics>,
    comparison_graph: ComparisonGraph,
    workers: usize,
    unit_timeout: Option<Duration>,
    abandon_grace: Duration,
    sink: Option<Arc<dyn UnitSink>>,
}

impl Scheduler {
    pub fn new(statistics: Arc<Statistics>, config: &ComparisonConfig) -> Self {
        Self {
            statistics,
            comparison_graph: config.comparison_graph,
            workers: config.workers.max(1),
            unit_timeout: config.unit_timeout,
            abandon_grace: config.abandon_grace,
            sink: None,
        }
    }

    /// Forward every finished unit to `sink`.
    pub fn with_sink(mut self, sink: Arc<dyn UnitSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Run every `(pairing, run)` unit.
    ///
    /// Every pairing's simulation must already have generated its datasets.
    /// `progress` receives the completed fraction and a description of the
    /// unit that just finished.
    pub fn run<F>(&self, pairings: &[Pairing], num_runs: usize, mut progress: F) -> RunOutput
    where
        F: FnMut(f64, &str),
    {
        let start = Instant::now();
        let units: Vec<(usize, usize)> = (0..pairings.len())
            .flat_map(|p| (0..num_runs).map(move |r| (p, r)))
            .collect();

        info!(
            pairings = pairings.len(),
            runs = num_runs,
            units = units.len(),
            workers = self.workers,
            "starting units"
        );

        let mut collector = Collector::new(pairings, self.statistics.len(), num_runs, self.sink.as_deref());

        #[cfg(feature = "parallel")]
        self.run_pool(pairings, &units, &mut collector, &mut progress);

        #[cfg(not(feature = "parallel"))]
        self.run_serial(pairings, &units, &mut collector, &mut progress);

        let output = collector.finish(start.elapsed());
        info!(
            completed = output.completed(),
            failed = output.failed(),
            elapsed_ms = output.total_time.as_millis() as u64,
            "units finished"
        );
        output
    }

    #[cfg(not(feature = "parallel"))]
    fn run_serial<F>(&self, pairings: &[Pairing], units: &[(usize, usize)], collector: &mut Collector<'_>, progress: &mut F)
    where
        F: FnMut(f64, &str),
    {
        for &(p, r) in units {
            let record = execute_unit(
                p,
                &pairings[p],
                r,
                &self.statistics,
                self.comparison_graph,
                self.unit_timeout,
            );
            collector.accept(record);
            progress(collector.fraction(), &unit_label(&pairings[p], r));
        }
    }

    /// Run units on their own named threads, at most `workers` at a time.
    ///
    /// The coordinator hands out worker slots. A slot comes back when its
    /// unit finishes or is abandoned, so a unit that never returns costs
    /// one thread but never stalls the queue behind it.
    #[cfg(feature = "parallel")]
    fn run_pool<F>(&self, pairings: &[Pairing], units: &[(usize, usize)], collector: &mut Collector<'_>, progress: &mut F)
    where
        F: FnMut(f64, &str),
    {
        let (tx, rx) = unbounded::<(usize, UnitRecord)>();
        // Overflow means the unit can never be overdue.
        let limit = self.unit_timeout.and_then(|t| t.checked_add(self.abandon_grace));
        let slots = self.statistics.len() + 1;

        let mut started: Vec<Option<Instant>> = vec![None; units.len()];
        let mut settled = vec![false; units.len()];
        let mut remaining = units.len();
        let mut next = 0usize;
        let mut running = 0usize;

        while remaining > 0 {
            while running < self.workers && next < units.len() {
                let index = next;
                next += 1;
                let (p, r) = units[index];
                match self.spawn_unit(index, p, &pairings[p], r, tx.clone()) {
                    Ok(()) => {
                        started[index] = Some(Instant::now());
                        running += 1;
                    }
                    Err(e) => {
                        warn!(error = %e, "could not start unit thread");
                        settled[index] = true;
                        remaining -= 1;
                        collector.accept(UnitRecord::new(p, r, slots).fail(UnitError::NotStarted(e.to_string())));
                        progress(collector.fraction(), &unit_label(&pairings[p], r));
                    }
                }
            }
            if remaining == 0 {
                break;
            }

            let event = match limit {
                Some(_) => rx.recv_timeout(POLL_INTERVAL),
                None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };

            match event {
                Ok((index, record)) if settled[index] => {
                    debug!(pairing = record.pairing, run = record.run, "abandoned unit returned; result discarded");
                }
                Ok((index, record)) => {
                    settled[index] = true;
                    remaining -= 1;
                    running -= 1;
                    let (p, r) = units[index];
                    collector.accept(record);
                    progress(collector.fraction(), &unit_label(&pairings[p], r));
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }

            let Some(limit) = limit else { continue };
            let now = Instant::now();
            for index in 0..units.len() {
                let overdue = !settled[index] && started[index].is_some_and(|at| now.duration_since(at) >= limit);
                if !overdue {
                    continue;
                }
                let (p, r) = units[index];
                warn!(
                    pairing = %pairings[p].description(),
                    run = r + 1,
                    limit_ms = limit.as_millis() as u64,
                    "abandoning unit that ignored its timeout"
                );
                settled[index] = true;
                remaining -= 1;
                running -= 1;
                let mut record = UnitRecord::new(p, r, slots).fail(UnitError::Abandoned { after: limit });
                record.elapsed = limit;
                collector.accept(record);
                progress(collector.fraction(), &unit_label(&pairings[p], r));
            }
        }
    }

    #[cfg(feature = "parallel")]
    fn spawn_unit(
        &self,
        index: usize,
        pairing_index: usize,
        pairing: &Pairing,
        run: usize,
        tx: Sender<(usize, UnitRecord)>,
    ) -> io::Result<()> {
        let pairing = pairing.clone();
        let statistics = Arc::clone(&self.statistics);
        let comparison_graph = self.comparison_graph;
        let timeout = self.unit_timeout;
        thread::Builder::new()
            .name(format!("algcomp-unit-{}", index))
            .spawn(move || {
                let record = execute_unit(pairing_index, &pairing, run, &statistics, comparison_graph, timeout);
                // The coordinator may already be gone if this unit was abandoned.
                let _ = tx.send((index, record));
            })
            .map(drop)
    }
}

fn unit_label(pairing: &Pairing, run: usize) -> String {
    format!("{} (run {})", pairing.description(), run + 1)
}

/// Owner of the tensor while units finish.
struct Collector<'a> {
    pairings: &'a [Pairing],
    sink: Option<&'a dyn UnitSink>,
    tensor: ResultTensor,
    graph_types_used: [bool; GraphType::COUNT],
    statuses: Vec<Option<UnitStatus>>,
    num_runs: usize,
    done: usize,
}

impl<'a> Collector<'a> {
    fn new(pairings: &'a [Pairing], num_statistics: usize, num_runs: usize, sink: Option<&'a dyn UnitSink>) -> Self {
        Self {
            pairings,
            sink,
            tensor: ResultTensor::new(pairings.len(), num_statistics, num_runs),
            graph_types_used: [false; GraphType::COUNT],
            statuses: vec![None; pairings.len() * num_runs],
            num_runs,
            done: 0,
        }
    }

    fn fraction(&self) -> f64 {
        if self.statuses.is_empty() {
            1.0
        } else {
            self.done as f64 / self.statuses.len() as f64
        }
    }

    fn accept(&mut self, record: UnitRecord) {
        let (p, r) = (record.pairing, record.run);

        for (g, row) in record.values.iter().enumerate() {
            for (s, value) in row.iter().enumerate() {
                if let Some(v) = value {
                    if let Err(e) = self.tensor.set(g, p, s, r, *v) {
                        warn!(error = %e, "dropping tensor write");
                    }
                }
            }
        }
        for (used, unit_used) in self.graph_types_used.iter_mut().zip(record.graph_types_used) {
            *used |= unit_used;
        }

        match &record.status {
            UnitStatus::Completed => debug!(
                pairing = p,
                run = r,
                elapsed_ms = record.elapsed_millis(),
                "unit completed"
            ),
            UnitStatus::Failed(error) => warn!(
                pairing = %self.pairings[p].description(),
                run = r + 1,
                %error,
                "unit failed"
            ),
        }

        if let Some(sink) = self.sink {
            if let Err(e) = sink.record(&self.pairings[p], &record) {
                warn!(error = %e, "unit sink failed");
            }
        }

        self.statuses[p * self.num_runs + r] = Some(record.status);
        self.done += 1;
    }

    fn finish(self, total_time: Duration) -> RunOutput {
        RunOutput {
            tensor: self.tensor,
            graph_types_used: self.graph_types_used,
            statuses: self
                .statuses
                .into_iter()
                .map(|s| {
                    s.unwrap_or_else(|| UnitStatus::Failed(UnitError::NotStarted("no result received".into())))
                })
                .collect(),
            num_runs: self.num_runs,
            total_time,
        }
    }
}

/// Numeric form of a parameter value for tensor storage.
fn numeric_value(value: &ParamValue) -> Option<f64> {
    match value {
        ParamValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        other => other.as_f64(),
    }
}

/// Run one unit to completion.
///
/// Never panics: a panic anywhere in the search, the graph derivations or a
/// plugin call fails this unit only.
pub(crate) fn execute_unit(
    pairing_index: usize,
    pairing: &Pairing,
    run: usize,
    statistics: &Statistics,
    comparison_graph: ComparisonGraph,
    timeout: Option<Duration>,
) -> UnitRecord {
    panic::catch_unwind(AssertUnwindSafe(|| {
        score_unit(pairing_index, pairing, run, statistics, comparison_graph, timeout)
    }))
    .unwrap_or_else(|payload| {
        UnitRecord::new(pairing_index, run, statistics.len() + 1)
            .fail(UnitError::Panicked(panic_message(payload.as_ref())))
    })
}

fn score_unit(
    pairing_index: usize,
    pairing: &Pairing,
    run: usize,
    statistics: &Statistics,
    comparison_graph: ComparisonGraph,
    timeout: Option<Duration>,
) -> UnitRecord {
    let slots = statistics.len() + 1;
    let record = UnitRecord::new(pairing_index, run, slots);
    let timed_out = || UnitError::TimedOut {
        after: timeout.unwrap_or_default(),
    };

    let Some(sim_run) = pairing.simulation.run(run) else {
        return record.fail(UnitError::Search(SearchError::Failed(format!(
            "no dataset for run {}",
            run + 1
        ))));
    };

    let token = CancelToken::with_timeout(timeout);
    let algorithm = pairing.algorithm.algorithm();
    debug!(pairing = %pairing.description(), run = run + 1, "starting unit");

    let wall_start = Instant::now();
    let cpu_start = thread_cpu_time();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        algorithm.search(&sim_run.data, pairing.algorithm.parameters(), &token)
    }));
    let elapsed = wall_start.elapsed();
    let cpu_time = match (cpu_start, thread_cpu_time()) {
        (Some(a), Some(b)) => Some(b.saturating_sub(a)),
        _ => None,
    };

    let mut record = record;
    record.elapsed = elapsed;
    record.cpu_time = cpu_time;

    let estimated = match outcome {
        Ok(Ok(graph)) => graph,
        Ok(Err(SearchError::Cancelled)) if token.is_cancelled() => return record.fail(timed_out()),
        Ok(Err(e)) => return record.fail(UnitError::Search(e)),
        Err(payload) => return record.fail(UnitError::Panicked(panic_message(payload.as_ref()))),
    };
    if token.is_cancelled() {
        return record.fail(timed_out());
    }

    let estimated = estimated.aligned_to(&sim_run.true_graph);
    let reference = comparison_graph.derive(&sim_run.true_graph);
    let data = &sim_run.data;

    let graph_types: &[GraphType] = if data.is_mixed() {
        &GraphType::ALL
    } else {
        &GraphType::ALL[..1]
    };

    for &graph_type in graph_types {
        if token.is_cancelled() {
            return record.fail(timed_out());
        }

        let reference_sub;
        let estimated_sub;
        let (reference_graph, estimated_graph) = if graph_type == GraphType::AllEdges {
            (&reference, &estimated)
        } else {
            reference_sub = reference.edge_type_subgraph(data, graph_type);
            estimated_sub = estimated.edge_type_subgraph(data, graph_type);
            (&reference_sub, &estimated_sub)
        };

        let g = graph_type.index();
        record.graph_types_used[g] = true;

        for (s, (statistic, _)) in statistics.iter().enumerate() {
            record.values[g][s] = match statistic.kind() {
                StatisticKind::ParameterColumn(name) => {
                    pairing.parameter_value(&name).and_then(numeric_value)
                }
                StatisticKind::Timing(Clock::Wall) => Some(elapsed.as_secs_f64()),
                StatisticKind::Timing(Clock::Cpu) => cpu_time.map(|d| d.as_secs_f64()),
                StatisticKind::Measured => {
                    let result = panic::catch_unwind(AssertUnwindSafe(|| {
                        statistic.value(reference_graph, estimated_graph, Some(data))
                    }))
                    .unwrap_or_else(|payload| Err(StatisticError::Panicked(panic_message(payload.as_ref()))));
                    match result {
                        Ok(v) => Some(v),
                        Err(e) => {
                            warn!(
                                statistic = %statistic.abbreviation(),
                                graph_type = graph_type.header(),
                                error = %e,
                                "statistic failed"
                            );
                            None
                        }
                    }
                }
            };
        }
    }

    let all = GraphType::AllEdges.index();
    let run_utility = utility(statistics.iter().enumerate().map(|(s, (statistic, weight))| {
        let normalized = record.values[all][s]
            .filter(|v| v.is_finite())
            .and_then(|v| guarded_norm_value(statistic, v));
        (weight, normalized)
    }));
    record.values[all][slots - 1] = Some(run_utility);
    record.estimated_graph = Some(estimated);
    record
}
