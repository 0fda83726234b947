//! SSD location codec.
//!
//! The detector predicts offsets relative to each prior, scaled by two
//! variances. Decoding must use the same variances the model was trained
//! with or every box will be systematically off.

use crate::boxes::{CenterBox, CornerBox};
use crate::prior::Prior;
use crate::util::{SsdOcrError, SsdOcrResult};

/// Variance applied to the center offsets.
pub const CENTER_VARIANCE: f32 = 0.1;
/// Variance applied to the log-size offsets.
pub const SIZE_VARIANCE: f32 = 0.2;

/// Scale factors of the location encoding.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Variances {
    pub center: f32,
    pub size: f32,
}

impl Variances {
    /// Rejects variances that are zero, negative, or non-finite.
    pub fn validate(&self) -> SsdOcrResult<()> {
        let ok = |v: f32| v.is_finite() && v > 0.0;
        if ok(self.center) && ok(self.size) {
            Ok(())
        } else {
            Err(SsdOcrError::InvalidConfig {
                reason: "variances must be positive and finite",
            })
        }
    }
}

impl Default for Variances {
    fn default() -> Self {
        Self {
            center: CENTER_VARIANCE,
            size: SIZE_VARIANCE,
        }
    }
}

/// Decodes one `[dx, dy, dw, dh]` row against its prior.
///
/// `center = prior.center + offset * center_variance * prior.size` and
/// `size = prior.size * exp(offset * size_variance)`. Non-finite input
/// propagates into the result.
#[inline]
pub fn decode(loc: [f32; 4], prior: &Prior, variances: Variances) -> CenterBox {
    CenterBox {
        cx: prior.cx + loc[0] * variances.center * prior.w,
        cy: prior.cy + loc[1] * variances.center * prior.h,
        w: prior.w * (loc[2] * variances.size).exp(),
        h: prior.h * (loc[3] * variances.size).exp(),
    }
}

/// Encodes a center-form box as offsets against `prior`; inverse of [`decode`].
pub fn encode(boxed: CenterBox, prior: &Prior, variances: Variances) -> [f32; 4] {
    [
        (boxed.cx - prior.cx) / (variances.center * prior.w),
        (boxed.cy - prior.cy) / (variances.center * prior.h),
        (boxed.w / prior.w).ln() / variances.size,
        (boxed.h / prior.h).ln() / variances.size,
    ]
}

/// Converts a center-form box to corner form.
#[inline]
pub fn to_corner_form(boxed: CenterBox) -> CornerBox {
    let half_w = boxed.w / 2.0;
    let half_h = boxed.h / 2.0;
    CornerBox {
        x_min: boxed.cx - half_w,
        y_min: boxed.cy - half_h,
        x_max: boxed.cx + half_w,
        y_max: boxed.cy + half_h,
    }
}
