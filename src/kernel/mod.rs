//! Bulk decode and normalization kernels over the whole anchor set.
//!
//! Both stages are elementwise per anchor. Callers validate shapes first;
//! kernels only `debug_assert` them.

use crate::boxes::{CornerBox, Variances};
use crate::prior::Prior;

/// Kernel trait for the per-anchor stages of postprocessing.
pub trait Kernel {
    /// Decodes `[n, 4]` location rows against `n` priors into corner-form boxes.
    fn decode_boxes(
        locations: &[f32],
        priors: &[Prior],
        variances: Variances,
        out: &mut [CornerBox],
    );

    /// Applies a row-wise softmax to `[n, cols]` logits.
    fn softmax_rows(logits: &[f32], cols: usize, out: &mut [f32]);
}

pub mod scalar;

#[cfg(feature = "simd")]
pub mod simd;

#[cfg(feature = "rayon")]
pub mod rayon;

/// Kernel used by the pipeline: SIMD when available, scalar otherwise.
#[cfg(not(feature = "simd"))]
pub type ActiveKernel = scalar::ScalarKernel;
#[cfg(feature = "simd")]
pub type ActiveKernel = simd::SimdKernel;
