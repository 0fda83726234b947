//! SIMD decode kernel using the `wide` crate.
//!
//! Four anchors are decoded per step in structure-of-arrays form. The
//! exponential is evaluated per lane with `f32::exp` and every other
//! operation keeps the scalar evaluation order, so results are bit-identical
//! to [`ScalarKernel`](crate::kernel::scalar::ScalarKernel).

use crate::boxes::{CornerBox, Variances};
use crate::kernel::scalar::ScalarKernel;
use crate::kernel::Kernel;
use crate::prior::Prior;
use crate::tensor::LOCATION_COLS;
use wide::f32x4;

const LANES: usize = 4;

/// Gathers column `col` of four consecutive location rows.
#[inline]
fn load_column(locations: &[f32], col: usize) -> f32x4 {
    f32x4::from([
        locations[col],
        locations[LOCATION_COLS + col],
        locations[2 * LOCATION_COLS + col],
        locations[3 * LOCATION_COLS + col],
    ])
}

#[inline]
fn lane_exp(v: f32x4) -> f32x4 {
    f32x4::from(v.to_array().map(f32::exp))
}

/// SIMD kernel; softmax rows are short, so normalization stays scalar.
pub struct SimdKernel;

impl Kernel for SimdKernel {
    fn decode_boxes(
        locations: &[f32],
        priors: &[Prior],
        variances: Variances,
        out: &mut [CornerBox],
    ) {
        debug_assert_eq!(locations.len(), priors.len() * LOCATION_COLS);
        debug_assert_eq!(out.len(), priors.len());

        let simd_end = priors.len() / LANES * LANES;
        let center_var = f32x4::splat(variances.center);
        let size_var = f32x4::splat(variances.size);
        let two = f32x4::splat(2.0);

        let mut i = 0;
        while i < simd_end {
            let p = &priors[i..i + LANES];
            let pcx = f32x4::from([p[0].cx, p[1].cx, p[2].cx, p[3].cx]);
            let pcy = f32x4::from([p[0].cy, p[1].cy, p[2].cy, p[3].cy]);
            let pw = f32x4::from([p[0].w, p[1].w, p[2].w, p[3].w]);
            let ph = f32x4::from([p[0].h, p[1].h, p[2].h, p[3].h]);

            let loc = &locations[i * LOCATION_COLS..(i + LANES) * LOCATION_COLS];
            let cx = pcx + load_column(loc, 0) * center_var * pw;
            let cy = pcy + load_column(loc, 1) * center_var * ph;
            let half_w = pw * lane_exp(load_column(loc, 2) * size_var) / two;
            let half_h = ph * lane_exp(load_column(loc, 3) * size_var) / two;

            let x_min = (cx - half_w).to_array();
            let y_min = (cy - half_h).to_array();
            let x_max = (cx + half_w).to_array();
            let y_max = (cy + half_h).to_array();
            for lane in 0..LANES {
                out[i + lane] = CornerBox::new(x_min[lane], y_min[lane], x_max[lane], y_max[lane]);
            }
            i += LANES;
        }

        ScalarKernel::decode_boxes(
            &locations[simd_end * LOCATION_COLS..],
            &priors[simd_end..],
            variances,
            &mut out[simd_end..],
        );
    }

    fn softmax_rows(logits: &[f32], cols: usize, out: &mut [f32]) {
        ScalarKernel::softmax_rows(logits, cols, out);
    }
}
