//! Weighted utility and ranking of pairings.

use std::cmp::Ordering;

/// Weighted mean of normalized statistic values.
///
/// Each item is `(weight, normalized)`. Items with zero weight are skipped,
/// as are items whose normalized value is missing or non-finite. Returns NaN
/// when nothing remains to average.
pub fn utility<I>(terms: I) -> f64
where
    I: IntoIterator<Item = (f64, Option<f64>)>,
{
    let mut sum = 0.0;
    let mut weight_sum = 0.0;

    for (weight, normalized) in terms {
        if weight == 0.0 {
            continue;
        }
        match normalized {
            Some(v) if v.is_finite() => {
                sum += weight * v;
                weight_sum += weight;
            }
            _ => {}
        }
    }

    if weight_sum == 0.0 {
        f64::NAN
    } else {
        sum / weight_sum
    }
}

/// Row order by descending utility.
///
/// NaN utilities sort after every other value and keep their relative input
/// order, as do ties.
pub fn sort_by_utility(utilities: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..utilities.len()).collect();
    order.sort_by(|&a, &b| {
        let (ua, ub) = (utilities[a], utilities[b]);
        match (ua.is_nan(), ub.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => ub.partial_cmp(&ua).unwrap_or(Ordering::Equal),
        }
    });
    order
}
