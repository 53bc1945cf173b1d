//! Four-dimensional accumulator of per-run statistic values.

use crate::graph::GraphType;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TensorError {
    #[error("cell [{0}][{1}][{2}][{3}] is out of bounds")]
    OutOfBounds(usize, usize, usize, usize),

    #[error("cell [{0}][{1}][{2}][{3}] was already written")]
    AlreadyWritten(usize, usize, usize, usize),
}

/// Values indexed `[graph type][pairing][statistic][run]`.
///
/// The statistic axis has one slot more than there are statistics; the last
/// slot holds the per-run utility. The shape is fixed at construction and a
/// cell can be written at most once. Unwritten cells are missing.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTensor {
    num_pairings: usize,
    num_slots: usize,
    num_runs: usize,
    cells: Vec<Option<f64>>,
}

impl ResultTensor {
    /// Allocate a tensor for `num_statistics` statistics plus the utility slot.
    pub fn new(num_pairings: usize, num_statistics: usize, num_runs: usize) -> Self {
        let num_slots = num_statistics + 1;
        Self {
            num_pairings,
            num_slots,
            num_runs,
            cells: vec![None; GraphType::COUNT * num_pairings * num_slots * num_runs],
        }
    }

    /// `[graph types, pairings, statistics + 1, runs]`.
    pub fn shape(&self) -> [usize; 4] {
        [GraphType::COUNT, self.num_pairings, self.num_slots, self.num_runs]
    }

    pub fn num_pairings(&self) -> usize {
        self.num_pairings
    }

    pub fn num_runs(&self) -> usize {
        self.num_runs
    }

    /// Index of the utility slot on the statistic axis.
    pub fn utility_slot(&self) -> usize {
        self.num_slots - 1
    }

    fn offset(&self, g: usize, p: usize, s: usize, r: usize) -> Option<usize> {
        if g >= GraphType::COUNT || p >= self.num_pairings || s >= self.num_slots || r >= self.num_runs {
            return None;
        }
        Some(((g * self.num_pairings + p) * self.num_slots + s) * self.num_runs + r)
    }

    pub fn get(&self, g: usize, p: usize, s: usize, r: usize) -> Option<f64> {
        self.offset(g, p, s, r).and_then(|i| self.cells[i])
    }

    /// Write one cell. Fails if the cell is out of bounds or already set.
    pub fn set(&mut self, g: usize, p: usize, s: usize, r: usize, value: f64) -> Result<(), TensorError> {
        let i = self
            .offset(g, p, s, r)
            .ok_or(TensorError::OutOfBounds(g, p, s, r))?;
        if self.cells[i].is_some() {
            return Err(TensorError::AlreadyWritten(g, p, s, r));
        }
        self.cells[i] = Some(value);
        Ok(())
    }

    /// The run axis for one (graph type, pairing, statistic).
    pub fn runs(&self, g: usize, p: usize, s: usize) -> &[Option<f64>] {
        match self.offset(g, p, s, 0) {
            Some(start) => &self.cells[start..start + self.num_runs],
            None => &[],
        }
    }

    /// Number of cells holding a value.
    pub fn filled(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}
