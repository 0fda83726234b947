//! Numerically stable softmax over one anchor's class logits.

use crate::util::math::max_or_nan;

/// Writes the softmax of `logits` into `out`.
///
/// The row maximum is subtracted before exponentiating, so large logits do
/// not overflow. A row containing NaN, or whose maximum is infinite, has no
/// meaningful distribution and is filled with NaN so the anchor is dropped
/// downstream.
pub fn softmax_into(logits: &[f32], out: &mut [f32]) {
    debug_assert_eq!(logits.len(), out.len());
    let max = max_or_nan(logits);
    if !max.is_finite() {
        out.fill(f32::NAN);
        return;
    }

    let mut sum = 0.0f32;
    for (dst, &logit) in out.iter_mut().zip(logits) {
        let e = (logit - max).exp();
        *dst = e;
        sum += e;
    }
    // sum >= 1 because the maximum contributes exp(0).
    for value in out.iter_mut() {
        *value /= sum;
    }
}

/// Returns the softmax of `logits` as a new row.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let mut out = vec![0.0; logits.len()];
    softmax_into(logits, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::softmax;

    fn assert_distribution(row: &[f32]) {
        let sum: f32 = row.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5, "sum = {sum}");
        assert!(row.iter().all(|&p| (0.0..=1.0).contains(&p)));
    }

    #[test]
    fn equal_logits_give_uniform_distribution() {
        let row = softmax(&[3.0; 4]);
        assert_distribution(&row);
        assert!(row.iter().all(|&p| (p - 0.25).abs() < 1e-6));
    }

    #[test]
    fn extreme_logits_stay_finite() {
        let row = softmax(&[1.0e30, -1.0e30, 0.0]);
        assert_distribution(&row);
        assert_eq!(row[0], 1.0);

        let row = softmax(&[-1.0e4, -1.0e4 + 1.0]);
        assert_distribution(&row);
        assert!(row[1] > row[0]);
    }

    #[test]
    fn known_values() {
        let row = softmax(&[0.0, 1.0f32.ln()]);
        assert!((row[0] - 0.5).abs() < 1e-6);
        let row = softmax(&[0.0, 2.0f32.ln()]);
        assert!((row[1] - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn degenerate_rows_become_nan() {
        assert!(softmax(&[0.0, f32::NAN]).iter().all(|p| p.is_nan()));
        assert!(softmax(&[f32::INFINITY, 0.0]).iter().all(|p| p.is_nan()));
        assert!(softmax(&[f32::NEG_INFINITY; 2]).iter().all(|p| p.is_nan()));
    }

    #[test]
    fn negative_infinity_entries_get_zero_mass() {
        let row = softmax(&[f32::NEG_INFINITY, 0.0]);
        assert_eq!(row, vec![0.0, 1.0]);
    }

    #[test]
    fn empty_row_is_empty() {
        assert!(softmax(&[]).is_empty());
    }
}
