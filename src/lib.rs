//! SsdOcr decodes single-shot detector output into card digit boxes.
//!
//! The crate covers the CPU side of an SSD detector: anchor generation,
//! location decoding, softmax normalization, and per-class non-maximum
//! suppression. The network itself sits behind the [`Predictor`] trait.
//! Decoding and normalization can run in parallel with the `rayon` feature
//! and use SIMD with the `simd` feature.

pub mod boxes;
mod candidate;
#[cfg(feature = "image-io")]
pub mod io;
pub mod kernel;
pub mod lowlevel;
pub mod pipeline;
pub mod predictor;
pub mod prior;
pub mod score;
pub mod tensor;
mod trace;
pub mod util;

pub use boxes::{iou, CenterBox, CornerBox, Variances};
pub use candidate::{suppress, SuppressConfig, Suppressed};
pub use pipeline::{
    run, Detection, DetectionConfig, DetectionPipeline, ImageSize, PostprocessConfig, NUM_CLASSES,
};
pub use predictor::{InferenceError, InputBuffer, Predictor, RawOutput};
pub use prior::{generate_priors, FeatureMap, Prior, PriorCache, PriorConfig, PriorSet};
pub use score::softmax;
pub use tensor::{Tensor, TensorView};
pub use util::{SsdOcrError, SsdOcrResult};
