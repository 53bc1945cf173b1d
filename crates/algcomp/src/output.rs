//! Output formatters for comparison results.
//!
//! This module provides:
//! - Space-aligned and tab-delimited text tables
//! - The full plain-text comparison report
//! - Markdown report generation
//! - CSV export of the aggregated tables

use crate::comparison::ComparisonResults;
use crate::report::ReportTable;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Quote a CSV field if it contains a separator, quote or newline.
pub fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Render a table with right-aligned, space-separated columns.
pub fn render_text(table: &ReportTable) -> String {
    let mut widths: Vec<usize> = table.header.iter().map(String::len).collect();
    for row in &table.rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.len());
        }
    }

    let mut out = String::new();
    for row in std::iter::once(&table.header).chain(&table.rows) {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{:>width$}", cell, width = w))
            .collect();
        out.push_str(&line.join("  "));
        out.push('\n');
    }
    out
}

/// Render a table with tab-separated cells.
pub fn render_tab_delimited(table: &ReportTable) -> String {
    let mut out = String::new();
    for row in std::iter::once(&table.header).chain(&table.rows) {
        out.push_str(&row.join("\t"));
        out.push('\n');
    }
    out
}

/// Render a table as a markdown table.
pub fn render_markdown(table: &ReportTable) -> String {
    let mut md = String::new();
    md.push_str(&format!("| {} |\n", table.header.join(" | ")));
    md.push('|');
    for _ in &table.header {
        md.push_str("---|");
    }
    md.push('\n');
    for row in &table.rows {
        md.push_str(&format!("| {} |\n", row.join(" | ")));
    }
    md
}

/// Write the plain-text comparison report.
pub fn write_report<W: Write>(results: &ComparisonResults, out: &mut W) -> io::Result<()> {
    let config = &results.config;
    let statistics = &results.statistics;

    writeln!(out, "{}", chrono::Local::now().format("%a %b %d %H:%M:%S %Y"))?;

    if !statistics.is_empty() {
        writeln!(out)?;
        writeln!(out, "Statistics:")?;
        writeln!(out)?;
        for (stat, _) in statistics.iter() {
            writeln!(out, "{} = {}", stat.abbreviation(), stat.description())?;
        }
    }

    writeln!(out)?;
    writeln!(out, "Parameters:")?;
    for name in results.declared_parameters() {
        if let Some(values) = results.parameters.values(&name) {
            let joined: Vec<String> = values.iter().map(ToString::to_string).collect();
            writeln!(out, "{} = {}", name, joined.join(","))?;
        }
    }
    writeln!(out)?;

    if let [only] = results.simulations.as_slice() {
        writeln!(out, "Simulation:")?;
        writeln!(out)?;
        writeln!(out, "{}", only.description())?;
        writeln!(out)?;
    } else {
        for (i, simulation) in results.simulations.iter().enumerate() {
            writeln!(out, "Simulation {}:", i + 1)?;
            writeln!(out, "{}", simulation.description())?;
            for name in simulation.parameter_names() {
                if let Some(value) = simulation.parameters().first(&name) {
                    writeln!(out, "{} = {}", name, value)?;
                }
            }
            writeln!(out)?;
        }
    }

    writeln!(out, "Algorithms:")?;
    writeln!(out)?;
    for (i, algorithm) in results.algorithms.iter().enumerate() {
        writeln!(out, "{}. {}", i + 1, algorithm.description())?;
    }

    if statistics.has_weights() {
        writeln!(out)?;
        writeln!(out, "Weighting of statistics:")?;
        writeln!(out)?;
        writeln!(out, "U = ")?;
        for (stat, weight) in statistics.iter().filter(|(_, w)| *w != 0.0) {
            writeln!(out, "    {} * f({})", weight, stat.abbreviation())?;
        }
        writeln!(out)?;
        writeln!(out, "Note that f for each statistic is a function that maps the statistic to the ")?;
        writeln!(out, "interval [0, 1], with higher being better.")?;
    }

    writeln!(out)?;
    writeln!(
        out,
        "Units: {} completed, {} failed ({:.1}s)",
        results.completed(),
        results.failed(),
        results.total_time.as_secs_f64()
    )?;
    writeln!(out)?;

    let tables = results.report_tables();
    for mode in &config.modes {
        writeln!(out, "{}", mode.title())?;
        writeln!(out)?;
        for table in tables.iter().filter(|t| t.mode == *mode) {
            writeln!(out, "{}", table.graph_type.header())?;
            writeln!(out)?;
            if config.tab_delimited {
                write!(out, "{}", render_tab_delimited(table))?;
            } else {
                write!(out, "{}", render_text(table))?;
            }
            writeln!(out)?;
        }
    }

    out.flush()
}

/// Write the plain-text report to a file.
pub fn write_report_file(results: &ComparisonResults, path: &Path) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_report(results, &mut writer)
}

/// Generate a markdown report.
pub fn to_markdown(results: &ComparisonResults) -> String {
    let mut md = String::new();
    md.push_str("# Comparison Results\n\n");

    md.push_str("## Configuration\n\n");
    md.push_str(&format!("- **Algorithms**: {}\n", results.algorithms.len()));
    md.push_str(&format!("- **Simulations**: {}\n", results.simulations.len()));
    md.push_str(&format!("- **Runs per simulation**: {}\n", results.num_runs));
    md.push_str(&format!(
        "- **Comparison graph**: {}\n",
        results.config.comparison_graph
    ));
    md.push_str(&format!(
        "- **Units**: {} completed, {} failed\n",
        results.completed(),
        results.failed()
    ));
    md.push_str(&format!(
        "- **Total execution time**: {:.1}s\n\n",
        results.total_time.as_secs_f64()
    ));

    md.push_str("## Algorithms\n\n");
    for (i, algorithm) in results.algorithms.iter().enumerate() {
        md.push_str(&format!("{}. {}\n", i + 1, algorithm.description()));
    }
    md.push_str("\n## Simulations\n\n");
    for (i, simulation) in results.simulations.iter().enumerate() {
        md.push_str(&format!("{}. {}\n", i + 1, simulation.description()));
    }
    md.push('\n');

    let tables = results.report_tables();
    for mode in &results.config.modes {
        md.push_str(&format!("## {}\n\n", mode.title()));
        for table in tables.iter().filter(|t| t.mode == *mode) {
            md.push_str(&format!("### {}\n\n", table.graph_type.header()));
            md.push_str(&render_markdown(table));
            md.push('\n');
        }
    }

    md
}

/// Write every aggregated table to one CSV file, one line per
/// (graph type, mode, pairing).
pub fn write_summary_csv(results: &ComparisonResults, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    let format = results.config.cell_format();

    let mut header = vec![
        "graph_type".to_string(),
        "mode".to_string(),
        "algorithm_index".to_string(),
        "simulation_index".to_string(),
        "algorithm".to_string(),
        "simulation".to_string(),
    ];
    header.extend(results.statistics.iter().map(|(s, _)| csv_field(&s.abbreviation())));
    header.push("utility".to_string());
    writeln!(writer, "{}", header.join(","))?;

    for table in &results.tables {
        for &p in &results.order {
            let (Some(pairing), Some(cells)) = (results.pairings.get(p), table.rows.get(p)) else {
                continue;
            };
            let mut line = vec![
                csv_field(table.graph_type.header()),
                table.mode.name().to_string(),
                (pairing.algorithm_index + 1).to_string(),
                (pairing.simulation_index + 1).to_string(),
                csv_field(&pairing.algorithm.description()),
                csv_field(&pairing.simulation.description()),
            ];
            line.extend(
                cells
                    .iter()
                    .take(results.statistics.len())
                    .map(|c| csv_field(&format.format(c))),
            );
            let u = results.utilities.get(p).copied().unwrap_or(f64::NAN);
            line.push(format.format_number(u));
            writeln!(writer, "{}", line.join(","))?;
        }
    }

    writer.flush()
}
