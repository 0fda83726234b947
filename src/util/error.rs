//! Error types for ssdocr.

use thiserror::Error;

/// Result alias for ssdocr operations.
pub type SsdOcrResult<T> = std::result::Result<T, SsdOcrError>;

/// Errors that can occur when decoding detector output.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SsdOcrError {
    /// A prior or postprocess configuration is malformed.
    #[error("invalid config: {reason}")]
    InvalidConfig { reason: &'static str },
    /// A probability or IoU threshold lies outside [0, 1].
    #[error("{name} must lie in [0, 1], got {value}")]
    InvalidThreshold { name: &'static str, value: f32 },
    /// A flat buffer cannot be split into rows of the requested width.
    #[error("buffer of length {len} cannot be split into rows of {cols}")]
    InvalidTensorShape { len: usize, cols: usize },
    /// A pixel buffer does not hold exactly `width * height * channels` bytes.
    #[error("buffer size mismatch: needed {needed}, got {got}")]
    BufferSizeMismatch { needed: usize, got: usize },
    /// The prior set and the model output disagree on the anchor count.
    #[error(
        "anchor count mismatch: {priors} priors, {locations} location rows, {scores} score rows"
    )]
    AnchorCountMismatch {
        priors: usize,
        locations: usize,
        scores: usize,
    },
    /// Score rows do not have one column per class.
    #[error("expected {expected} score columns, got {got}")]
    ClassCountMismatch { expected: usize, got: usize },
    /// The input buffer does not match the model's fixed input size.
    #[error(
        "input buffer is {width}x{height}, model expects {expected_width}x{expected_height}"
    )]
    InvalidInputSize {
        expected_width: usize,
        expected_height: usize,
        width: usize,
        height: usize,
    },
    /// Image size used for denormalization is not positive and finite.
    #[error("invalid image size {width}x{height}")]
    InvalidImageSize { width: f32, height: f32 },
    /// The inference collaborator is not ready to run.
    #[error("model unavailable: {reason}")]
    ModelUnavailable { reason: String },
    /// The inference collaborator ran but produced no result.
    #[error("inference failed: {reason}")]
    InferenceFailed { reason: String },
    /// Image decoding or conversion failed.
    #[error("image io error: {reason}")]
    ImageIo { reason: String },
}

impl SsdOcrError {
    /// Returns true when the failure came from the inference collaborator and
    /// the call may be retried later.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SsdOcrError::ModelUnavailable { .. } | SsdOcrError::InferenceFailed { .. }
        )
    }
}
