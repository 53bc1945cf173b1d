//! Reduction of per-run statistic values into table cells.
//!
//! Each statistic is evaluated once per run. A summary table collapses the
//! run axis under one [`Mode`]. Runs that failed, timed out or produced a
//! non-finite value are missing and never count as zero.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Aggregation mode applied along the run axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    Average,
    StandardDeviation,
    Min,
    Max,
    Median,
}

impl Mode {
    /// Every mode, in report order.
    pub const ALL: [Mode; 5] = [
        Mode::Average,
        Mode::StandardDeviation,
        Mode::Min,
        Mode::Max,
        Mode::Median,
    ];

    /// Short name used on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Average => "average",
            Mode::StandardDeviation => "std-dev",
            Mode::Min => "min",
            Mode::Max => "max",
            Mode::Median => "median",
        }
    }

    /// Heading used above a report table.
    pub fn title(&self) -> &'static str {
        match self {
            Mode::Average => "AVERAGE STATISTICS",
            Mode::StandardDeviation => "STANDARD DEVIATIONS",
            Mode::Min => "MIN STATISTICS",
            Mode::Max => "MAX STATISTICS",
            Mode::Median => "MEDIAN STATISTICS",
        }
    }

    /// Reduce a set of observed values. `None` if `values` is empty.
    pub fn reduce(&self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        Some(match self {
            Mode::Average => mean(values),
            Mode::StandardDeviation => std_dev(values),
            Mode::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Mode::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Mode::Median => median(values),
        })
    }

    /// Reduce one run axis, skipping missing and non-finite runs.
    pub fn reduce_runs(&self, runs: &[Option<f64>]) -> Option<f64> {
        let observed: Vec<f64> = runs
            .iter()
            .filter_map(|r| *r)
            .filter(|v| !v.is_nan())
            .collect();
        self.reduce(&observed)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "average" | "mean" | "avg" => Ok(Mode::Average),
            "std-dev" | "stddev" | "standard-deviation" | "sd" => Ok(Mode::StandardDeviation),
            "min" => Ok(Mode::Min),
            "max" => Ok(Mode::Max),
            "median" => Ok(Mode::Median),
            other => Err(format!("unknown aggregation mode '{}'", other)),
        }
    }
}

/// Arithmetic mean. Caller guarantees `values` is non-empty.
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator). A single value gives 0.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// Median; averages the two middle values for an even count.
pub fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// One cell of an aggregated table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum CellValue {
    /// No run produced a value.
    #[default]
    Missing,
    /// Boolean parameter value, rendered as Yes/No.
    Boolean(bool),
    /// Reduced statistic or numeric parameter value.
    Numeric(f64),
    /// Text parameter value.
    Text(String),
}

impl CellValue {
    /// Wrap an optional reduction result. NaN is folded into `Missing`.
    pub fn from_reduction(value: Option<f64>) -> Self {
        match value {
            Some(v) if !v.is_nan() => CellValue::Numeric(v),
            _ => CellValue::Missing,
        }
    }

    /// Numeric payload, if any.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Numeric(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RUNS: [f64; 4] = [1.0, 2.0, 3.0, 4.0];

    #[test]
    fn test_modes_on_one_to_four() {
        assert_eq!(Mode::Average.reduce(&RUNS), Some(2.5));
        assert_eq!(Mode::Median.reduce(&RUNS), Some(2.5));
        assert_eq!(Mode::Min.reduce(&RUNS), Some(1.0));
        assert_eq!(Mode::Max.reduce(&RUNS), Some(4.0));

        let sd = Mode::StandardDeviation.reduce(&RUNS).unwrap();
        assert!((sd - 1.290_994_4).abs() < 1e-6, "sd = {}", sd);
    }

    #[test]
    fn test_missing_runs_ignored() {
        let runs = [Some(1.0), None, Some(3.0), Some(f64::NAN)];
        assert_eq!(Mode::Average.reduce_runs(&runs), Some(2.0));
        assert_eq!(Mode::Max.reduce_runs(&runs), Some(3.0));
    }

    #[test]
    fn test_no_successful_runs_is_missing() {
        let runs = [None, None];
        for mode in Mode::ALL {
            assert_eq!(mode.reduce_runs(&runs), None);
            assert_eq!(
                CellValue::from_reduction(mode.reduce_runs(&runs)),
                CellValue::Missing
            );
        }
    }

    #[test]
    fn test_single_observation() {
        assert_eq!(Mode::StandardDeviation.reduce(&[7.0]), Some(0.0));
        assert_eq!(Mode::Median.reduce(&[7.0]), Some(7.0));
    }

    #[test]
    fn test_median_odd_count_unsorted() {
        assert_eq!(Mode::Median.reduce(&[9.0, 1.0, 5.0]), Some(5.0));
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("average".parse::<Mode>(), Ok(Mode::Average));
        assert_eq!("SD".parse::<Mode>(), Ok(Mode::StandardDeviation));
        assert!("mode".parse::<Mode>().is_err());
        for mode in Mode::ALL {
            assert_eq!(mode.name().parse::<Mode>(), Ok(mode));
        }
    }
}
