//! Numeric helpers shared by the codec, normalizer, and suppressor.

use std::cmp::Ordering;

use crate::util::{SsdOcrError, SsdOcrResult};

/// Checks that a threshold lies in [0, 1]; NaN is rejected.
pub(crate) fn check_unit_interval(name: &'static str, value: f32) -> SsdOcrResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SsdOcrError::InvalidThreshold { name, value })
    }
}

/// Orders scores descending with NaN ranked below every number.
pub(crate) fn score_cmp_desc(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.total_cmp(&a),
    }
}

/// Returns the largest element of `values`, or NaN if any element is NaN.
pub(crate) fn max_or_nan(values: &[f32]) -> f32 {
    let mut max = f32::NEG_INFINITY;
    for &value in values {
        if value.is_nan() {
            return f32::NAN;
        }
        if value > max {
            max = value;
        }
    }
    max
}

#[cfg(test)]
mod tests {
    use super::{check_unit_interval, max_or_nan, score_cmp_desc};
    use std::cmp::Ordering;

    #[test]
    fn unit_interval_accepts_bounds_and_rejects_nan() {
        assert!(check_unit_interval("t", 0.0).is_ok());
        assert!(check_unit_interval("t", 1.0).is_ok());
        assert!(check_unit_interval("t", -0.01).is_err());
        assert!(check_unit_interval("t", 1.01).is_err());
        assert!(check_unit_interval("t", f32::NAN).is_err());
    }

    #[test]
    fn nan_sorts_last_in_descending_order() {
        let mut values = [0.2, f32::NAN, 0.9, 0.5];
        values.sort_by(|a, b| score_cmp_desc(*a, *b));
        assert_eq!(&values[..3], &[0.9, 0.5, 0.2]);
        assert!(values[3].is_nan());
        assert_eq!(score_cmp_desc(0.9, 0.1), Ordering::Less);
    }

    #[test]
    fn max_propagates_nan() {
        assert_eq!(max_or_nan(&[1.0, 3.0, -2.0]), 3.0);
        assert!(max_or_nan(&[1.0, f32::NAN]).is_nan());
        assert_eq!(max_or_nan(&[]), f32::NEG_INFINITY);
    }
}
