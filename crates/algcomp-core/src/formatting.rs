//! Text representation of table cells.

use crate::aggregate::CellValue;

/// Marker printed for missing cells.
pub const MISSING: &str = "*";

/// Cell formatting rules shared by every renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellFormat {
    /// Decimal places for numeric cells.
    pub precision: usize,
}

impl Default for CellFormat {
    fn default() -> Self {
        Self { precision: 2 }
    }
}

impl CellFormat {
    pub fn new(precision: usize) -> Self {
        Self { precision }
    }

    /// Format one cell.
    pub fn format(&self, cell: &CellValue) -> String {
        match cell {
            CellValue::Missing => MISSING.to_string(),
            CellValue::Boolean(true) => "Yes".to_string(),
            CellValue::Boolean(false) => "No".to_string(),
            CellValue::Text(s) => s.clone(),
            CellValue::Numeric(v) => self.format_number(*v),
        }
    }

    /// Format a number: fixed decimals, or scientific notation when the
    /// value is nonzero but would round to zero at this precision.
    pub fn format_number(&self, value: f64) -> String {
        if value.is_nan() {
            return MISSING.to_string();
        }
        let threshold = 10f64.powi(-(self.precision as i32));
        if value != 0.0 && value.abs() < threshold {
            format!("{:.*e}", self.precision, value).replace('e', "E")
        } else {
            format!("{:.*}", self.precision, value)
        }
    }
}
