//! Low-level building blocks for custom postprocessing.
//!
//! Most users should call [`run`](crate::run) or
//! [`DetectionPipeline`](crate::DetectionPipeline) instead.

pub use crate::boxes::codec::{decode, encode, to_corner_form, CENTER_VARIANCE, SIZE_VARIANCE};
pub use crate::candidate::nms::hard_nms;
pub use crate::candidate::topk::Candidate;
pub use crate::kernel::scalar::ScalarKernel;
#[cfg(feature = "simd")]
pub use crate::kernel::simd::SimdKernel;
pub use crate::kernel::{ActiveKernel, Kernel};
pub use crate::score::softmax_into;
pub use crate::tensor::LOCATION_COLS;
