//! Fatality ratio and its ordering.

use std::cmp::Ordering;

use crate::domain::NanOrder;

/// `deaths / confirmed_cases` with IEEE semantics: `0/0` is NaN, `n/0` is infinite.
pub fn fatality_ratio(deaths: i64, confirmed_cases: i64) -> f64 {
    deaths as f64 / confirmed_cases as f64
}

/// Descending order on ratios with explicit NaN placement.
///
/// Infinities are ordinary values, so `+inf` ranks first.
pub fn cmp_ratio_desc(a: f64, b: f64, nan_order: NanOrder) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => match nan_order {
            NanOrder::Last => Ordering::Greater,
            NanOrder::First => Ordering::Less,
        },
        (false, true) => match nan_order {
            NanOrder::Last => Ordering::Less,
            NanOrder::First => Ordering::Greater,
        },
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_deaths_in_a_hundred() {
        assert!((fatality_ratio(5, 100) - 0.05).abs() < 1e-12);
    }

    #[test]
    fn zero_denominator_propagates() {
        assert!(fatality_ratio(0, 0).is_nan());
        assert_eq!(fatality_ratio(3, 0), f64::INFINITY);
    }

    #[test]
    fn nan_placement_is_configurable() {
        let mut v = vec![0.1, f64::NAN, 0.5, f64::INFINITY];
        v.sort_by(|a, b| cmp_ratio_desc(*a, *b, NanOrder::Last));
        assert_eq!(v[0], f64::INFINITY);
        assert_eq!(v[1], 0.5);
        assert_eq!(v[2], 0.1);
        assert!(v[3].is_nan());

        v.sort_by(|a, b| cmp_ratio_desc(*a, *b, NanOrder::First));
        assert!(v[0].is_nan());
        assert_eq!(v[1], f64::INFINITY);
    }
}
