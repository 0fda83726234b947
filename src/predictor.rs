//! Seam between postprocessing and whatever runs the network.
//!
//! The model runtime is opaque to this crate: it takes a fixed-size RGB
//! buffer and returns flat location and score tensors in prior order.

use std::sync::Arc;

use thiserror::Error;

use crate::util::{SsdOcrError, SsdOcrResult};

/// Channels per pixel in an [`InputBuffer`].
pub const CHANNELS: usize = 3;

/// Interleaved RGB8 image at the model's input resolution.
#[derive(Clone, Debug, PartialEq)]
pub struct InputBuffer {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl InputBuffer {
    /// Wraps an RGB8 buffer of exactly `width * height * 3` bytes.
    pub fn new(data: Vec<u8>, width: usize, height: usize) -> SsdOcrResult<Self> {
        let needed = width
            .checked_mul(height)
            .and_then(|v| v.checked_mul(CHANNELS))
            .ok_or(SsdOcrError::InvalidConfig {
                reason: "input dimensions overflow",
            })?;
        if data.len() != needed {
            return Err(SsdOcrError::BufferSizeMismatch {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Solid frame with every channel set to `value`.
    pub fn blank(width: usize, height: usize, value: u8) -> Self {
        Self {
            data: vec![value; width * height * CHANNELS],
            width,
            height,
        }
    }

    /// Returns the width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the interleaved RGB bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Flat tensors produced by one inference call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawOutput {
    /// `[anchors, 4]` encoded offsets.
    pub locations: Vec<f32>,
    /// `[anchors, classes]` logits, background in column 0.
    pub scores: Vec<f32>,
}

/// Failure reported by a [`Predictor`].
#[derive(Clone, Debug, Error, PartialEq)]
pub enum InferenceError {
    /// The model is not loaded or not initialized yet.
    #[error("model unavailable: {0}")]
    Unavailable(String),
    /// The model ran but produced no usable output.
    #[error("inference failed: {0}")]
    Failed(String),
}

impl From<InferenceError> for SsdOcrError {
    fn from(value: InferenceError) -> Self {
        match value {
            InferenceError::Unavailable(reason) => SsdOcrError::ModelUnavailable { reason },
            InferenceError::Failed(reason) => SsdOcrError::InferenceFailed { reason },
        }
    }
}

/// Runs the detector network on one input buffer.
pub trait Predictor {
    /// Returns false while the model cannot run, e.g. before loading.
    fn is_ready(&self) -> bool {
        true
    }

    /// Runs the network and returns its raw tensors.
    fn infer(&self, input: &InputBuffer) -> Result<RawOutput, InferenceError>;
}

impl<P: Predictor + ?Sized> Predictor for &P {
    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }

    fn infer(&self, input: &InputBuffer) -> Result<RawOutput, InferenceError> {
        (**self).infer(input)
    }
}

impl<P: Predictor + ?Sized> Predictor for Box<P> {
    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }

    fn infer(&self, input: &InputBuffer) -> Result<RawOutput, InferenceError> {
        (**self).infer(input)
    }
}

impl<P: Predictor + ?Sized> Predictor for Arc<P> {
    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }

    fn infer(&self, input: &InputBuffer) -> Result<RawOutput, InferenceError> {
        (**self).infer(input)
    }
}
