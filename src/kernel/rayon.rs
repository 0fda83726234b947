//! Rayon-parallel decode and normalization (feature-gated).
//!
//! Anchors are split into fixed-size chunks and each chunk is handed to the
//! sequential kernel `K`, so parallel output equals sequential output.

use crate::boxes::{CornerBox, Variances};
use crate::kernel::Kernel;
use crate::prior::Prior;
use crate::tensor::LOCATION_COLS;
use rayon::prelude::*;

/// Anchors per parallel work item.
const CHUNK: usize = 256;

/// Parallel counterpart of [`Kernel::decode_boxes`].
pub fn decode_boxes_par<K: Kernel>(
    locations: &[f32],
    priors: &[Prior],
    variances: Variances,
    out: &mut [CornerBox],
) {
    out.par_chunks_mut(CHUNK)
        .zip(locations.par_chunks(CHUNK * LOCATION_COLS))
        .zip(priors.par_chunks(CHUNK))
        .for_each(|((out, locations), priors)| {
            K::decode_boxes(locations, priors, variances, out);
        });
}

/// Parallel counterpart of [`Kernel::softmax_rows`].
pub fn softmax_rows_par<K: Kernel>(logits: &[f32], cols: usize, out: &mut [f32]) {
    if cols == 0 {
        return;
    }
    out.par_chunks_mut(CHUNK * cols)
        .zip(logits.par_chunks(CHUNK * cols))
        .for_each(|(out, logits)| K::softmax_rows(logits, cols, out));
}
