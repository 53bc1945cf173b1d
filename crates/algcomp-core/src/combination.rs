//! Mixed-radix enumeration of parameter combinations.
//!
//! A sweep over `k` varied parameters with `dims[i]` candidate values each is
//! the Cartesian product of `0..dims[0] × … × 0..dims[k-1]`. The generator
//! walks that product like an odometer: the last dimension increments
//! fastest, and each tuple is produced exactly once.

use std::iter::FusedIterator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Fresh,
    Running,
    Done,
}

/// Lazy, restartable iterator over every index tuple of a mixed-radix space.
///
/// `CombinationGenerator::new(&[2, 3])` yields
/// `[0,0] [0,1] [0,2] [1,0] [1,1] [1,2]` and then `None`.
///
/// An empty `dims` yields a single empty tuple (one configuration with
/// nothing varied); any zero-sized dimension yields nothing.
#[derive(Debug, Clone)]
pub struct CombinationGenerator {
    dims: Vec<usize>,
    current: Vec<usize>,
    state: State,
}

impl CombinationGenerator {
    /// Create a generator over the given dimension sizes.
    pub fn new(dims: &[usize]) -> Self {
        Self {
            dims: dims.to_vec(),
            current: vec![0; dims.len()],
            state: State::Fresh,
        }
    }

    /// Dimension sizes this generator walks.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Total number of tuples in the full product.
    pub fn total(&self) -> usize {
        self.dims.iter().product()
    }

    /// Restart the sequence from the first tuple.
    pub fn reset(&mut self) {
        self.current.iter_mut().for_each(|c| *c = 0);
        self.state = State::Fresh;
    }

    /// Number of tuples already produced.
    fn produced(&self) -> usize {
        match self.state {
            State::Fresh => 0,
            State::Done => self.total(),
            State::Running => {
                // Position of `current` in the mixed-radix order, plus one.
                let mut index = 0;
                for (c, d) in self.current.iter().zip(&self.dims) {
                    index = index * d + c;
                }
                index + 1
            }
        }
    }
}

impl Iterator for CombinationGenerator {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        match self.state {
            State::Done => None,
            State::Fresh => {
                if self.dims.iter().any(|&d| d == 0) {
                    self.state = State::Done;
                    return None;
                }
                self.state = State::Running;
                Some(self.current.clone())
            }
            State::Running => {
                let mut i = self.dims.len();
                loop {
                    if i == 0 {
                        self.state = State::Done;
                        return None;
                    }
                    i -= 1;
                    self.current[i] += 1;
                    if self.current[i] < self.dims[i] {
                        return Some(self.current.clone());
                    }
                    self.current[i] = 0;
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total().saturating_sub(self.produced());
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CombinationGenerator {}

impl FusedIterator for CombinationGenerator {}


/// Property-based tests using proptest
#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Every tuple of the product appears exactly once, in bounds.
        #[test]
        fn prop_covers_product_exactly_once(dims in prop::collection::vec(1usize..5, 0..5)) {
            let combos: Vec<Vec<usize>> = CombinationGenerator::new(&dims).collect();
            let expected: usize = dims.iter().product();
            prop_assert_eq!(combos.len(), expected);

            let unique: HashSet<Vec<usize>> = combos.iter().cloned().collect();
            prop_assert_eq!(unique.len(), expected);

            for combo in &combos {
                prop_assert_eq!(combo.len(), dims.len());
                for (c, d) in combo.iter().zip(&dims) {
                    prop_assert!(c < d);
                }
            }
        }

        /// Consecutive tuples are strictly increasing in lexicographic order.
        #[test]
        fn prop_lexicographic_order(dims in prop::collection::vec(1usize..4, 1..5)) {
            let combos: Vec<Vec<usize>> = CombinationGenerator::new(&dims).collect();
            for pair in combos.windows(2) {
                prop_assert!(pair[0] < pair[1]);
            }
        }
    }
}
