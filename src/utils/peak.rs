use std::ops::Range;

use crate::float::Float;

/// Which extremum of a lag-indexed function marks the best candidate. Similarity
/// functions peak at the period, dissimilarity functions dip.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Extremum {
    Maximum,
    Minimum,
}

/// Find the index of the best value of `arr` within `lags`. Ties are broken in favor of
/// the lowest lag. Returns `None` when `lags` does not overlap `arr`.
pub fn best_lag<T: Float>(arr: &[T], lags: Range<usize>, extremum: Extremum) -> Option<usize> {
    let end = lags.end.min(arr.len());
    if lags.start >= end {
        return None;
    }
    let lags = lags.start..end;
    let better = |candidate: T, best: T| match extremum {
        Extremum::Maximum => candidate > best,
        Extremum::Minimum => candidate < best,
    };

    arr[lags.clone()]
        .iter()
        .zip(lags)
        .fold(None, |best: Option<(usize, T)>, (&value, lag)| match best {
            Some((_, best_value)) if !better(value, best_value) => best,
            _ => Some((lag, value)),
        })
        .map(|(lag, _)| lag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_global_maximum() {
        let mut arr = vec![0.0f64; 64];
        arr[0] = 10.0;
        for (i, a) in arr.iter_mut().enumerate().skip(1) {
            *a = (i as f64 * 0.3).sin() * 0.5;
        }
        arr[37] = 4.0;
        assert_eq!(best_lag(&arr, 5..60, Extremum::Maximum), Some(37));
    }

    #[test]
    fn lag_zero_is_outside_the_search() {
        let arr = [9.0, 1.0, 3.0, 2.0];
        assert_eq!(best_lag(&arr, 1..4, Extremum::Maximum), Some(2));
    }

    #[test]
    fn ties_go_to_the_lowest_lag() {
        let arr = [5.0f32, 1.0, 2.0, 2.0, 0.5, 0.5];
        assert_eq!(best_lag(&arr, 1..4, Extremum::Maximum), Some(2));
        assert_eq!(best_lag(&arr, 1..6, Extremum::Minimum), Some(4));
    }

    #[test]
    fn empty_search_range() {
        let arr = [1.0f64, 2.0, 3.0];
        assert_eq!(best_lag(&arr, 2..2, Extremum::Maximum), None);
        assert_eq!(best_lag(&arr, 5..9, Extremum::Minimum), None);
    }
}
