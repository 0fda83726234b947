//! Reference scalar kernel.

use crate::boxes::{decode, to_corner_form, CornerBox, Variances};
use crate::kernel::Kernel;
use crate::prior::Prior;
use crate::score::softmax_into;
use crate::tensor::LOCATION_COLS;

/// Scalar kernel, one anchor at a time.
pub struct ScalarKernel;

impl Kernel for ScalarKernel {
    fn decode_boxes(
        locations: &[f32],
        priors: &[Prior],
        variances: Variances,
        out: &mut [CornerBox],
    ) {
        debug_assert_eq!(locations.len(), priors.len() * LOCATION_COLS);
        debug_assert_eq!(out.len(), priors.len());
        for ((dst, loc), prior) in out
            .iter_mut()
            .zip(locations.chunks_exact(LOCATION_COLS))
            .zip(priors)
        {
            let loc = [loc[0], loc[1], loc[2], loc[3]];
            *dst = to_corner_form(decode(loc, prior, variances));
        }
    }

    fn softmax_rows(logits: &[f32], cols: usize, out: &mut [f32]) {
        debug_assert_eq!(logits.len(), out.len());
        if cols == 0 {
            return;
        }
        for (dst, row) in out.chunks_exact_mut(cols).zip(logits.chunks_exact(cols)) {
            softmax_into(row, dst);
        }
    }
}
