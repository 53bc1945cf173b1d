//! Incremental CSV log of finished units.
//!
//! [`CsvUnitSink`] appends one line per unit as units finish, so a long
//! comparison leaves a usable record even if it is interrupted.
//!
//! # Example
//!
//! ```ignore
//! use algcomp::checkpoint::CsvUnitSink;
//! use std::sync::Arc;
//!
//! let sink = Arc::new(CsvUnitSink::create(Path::new("units.csv"), &statistics)?);
//! let results = comparison.with_sink(sink).run(|_, _| {})?;
//! ```

use crate::capability::Statistics;
use crate::output::csv_field;
use crate::pairing::Pairing;
use crate::runner::{UnitRecord, UnitSink};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

/// Leading CSV columns; one column per statistic and a utility column follow.
pub const CSV_HEADER_PREFIX: &str =
    "algorithm_index,simulation_index,algorithm,simulation,run,status,elapsed_ms,cpu_ms,num_edges";

/// Thread-safe incremental CSV writer for unit records.
///
/// Only all-edge values are written. Flushes after each line.
pub struct CsvUnitSink {
    file: Mutex<BufWriter<File>>,
    num_statistics: usize,
}

impl CsvUnitSink {
    /// Create (or truncate) `path` and write the header.
    pub fn create(path: &Path, statistics: &Statistics) -> io::Result<Self> {
        let mut file = File::create(path)?;
        writeln!(file, "{}", Self::header(statistics))?;
        file.flush()?;

        Ok(Self {
            file: Mutex::new(BufWriter::new(file)),
            num_statistics: statistics.len(),
        })
    }

    /// Full header line for `statistics`.
    pub fn header(statistics: &Statistics) -> String {
        let mut header = CSV_HEADER_PREFIX.to_string();
        for (stat, _) in statistics.iter() {
            header.push(',');
            header.push_str(&csv_field(&stat.abbreviation()));
        }
        header.push_str(",utility");
        header
    }

    fn line(&self, pairing: &Pairing, record: &UnitRecord) -> String {
        let mut fields = vec![
            (pairing.algorithm_index + 1).to_string(),
            (pairing.simulation_index + 1).to_string(),
            csv_field(&pairing.algorithm.description()),
            csv_field(&pairing.simulation.description()),
            (record.run + 1).to_string(),
            record.status.label().to_string(),
            record.elapsed_millis().to_string(),
            record.cpu_millis().map(|c| c.to_string()).unwrap_or_default(),
            record
                .estimated_graph
                .as_ref()
                .map(|g| g.num_edges().to_string())
                .unwrap_or_default(),
        ];
        let values = record.all_edge_values();
        for s in 0..=self.num_statistics {
            fields.push(
                values
                    .get(s)
                    .copied()
                    .flatten()
                    .map(|v| format!("{:.6}", v))
                    .unwrap_or_default(),
            );
        }
        fields.join(",")
    }
}

impl UnitSink for CsvUnitSink {
    fn record(&self, pairing: &Pairing, record: &UnitRecord) -> io::Result<()> {
        let line = self.line(pairing, record);
        let mut file = self
            .file
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "unit log lock poisoned"))?;
        writeln!(file, "{}", line)?;
        file.flush()
    }
}
