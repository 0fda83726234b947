//! Detector postprocessing: normalize, decode, suppress, denormalize.
//!
//! [`run`] is the pure per-call pipeline over explicit tensors and priors.
//! [`DetectionPipeline`] owns a predictor and the prior set and drives a
//! full inference call.

mod detector;

pub use detector::DetectionPipeline;

use std::time::Instant;

use crate::boxes::codec::{CENTER_VARIANCE, SIZE_VARIANCE};
use crate::boxes::{CornerBox, Variances};
use crate::candidate::{suppress, SuppressConfig};
use crate::kernel::{ActiveKernel, Kernel};
use crate::prior::{Prior, PriorConfig};
use crate::tensor::{Tensor, TensorView, LOCATION_COLS};
use crate::trace::{trace_event, trace_span};
use crate::util::{SsdOcrError, SsdOcrResult};

/// Classes of the card digit detector: background plus the digits 0-9.
pub const NUM_CLASSES: usize = 11;

/// Parameters of the per-call postprocessing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PostprocessConfig {
    /// Location variance for the center offsets.
    pub center_variance: f32,
    /// Location variance for the log-size offsets.
    pub size_variance: f32,
    /// Thresholds and caps for suppression.
    pub suppress: SuppressConfig,
    /// Decode and normalize across threads (requires the `rayon` feature).
    pub parallel: bool,
}

impl Default for PostprocessConfig {
    fn default() -> Self {
        Self {
            center_variance: CENTER_VARIANCE,
            size_variance: SIZE_VARIANCE,
            suppress: SuppressConfig::default(),
            parallel: false,
        }
    }
}

impl PostprocessConfig {
    /// Returns the codec variances.
    pub fn variances(&self) -> Variances {
        Variances {
            center: self.center_variance,
            size: self.size_variance,
        }
    }

    /// Validates variances and suppression thresholds.
    pub fn validate(&self) -> SsdOcrResult<()> {
        self.variances().validate()?;
        self.suppress.validate()
    }
}

/// Everything fixed between training-time encoding and runtime decoding.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectionConfig {
    /// Input resolution and anchor table.
    pub priors: PriorConfig,
    /// Score columns per anchor, background included.
    pub num_classes: usize,
    /// Postprocessing parameters.
    pub postprocess: PostprocessConfig,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            priors: PriorConfig::card_ocr(),
            num_classes: NUM_CLASSES,
            postprocess: PostprocessConfig::default(),
        }
    }
}

impl DetectionConfig {
    /// Validates every part of the config.
    pub fn validate(&self) -> SsdOcrResult<()> {
        if self.num_classes < 2 {
            return Err(SsdOcrError::InvalidConfig {
                reason: "num_classes must include background and at least one class",
            });
        }
        self.priors.validate()?;
        self.postprocess.validate()
    }
}

/// Pixel size of the source image, used to denormalize boxes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageSize {
    pub width: f32,
    pub height: f32,
}

impl ImageSize {
    /// Creates a size from pixel dimensions.
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    fn validate(&self) -> SsdOcrResult<()> {
        let ok = |v: f32| v.is_finite() && v > 0.0;
        if ok(self.width) && ok(self.height) {
            Ok(())
        } else {
            Err(SsdOcrError::InvalidImageSize {
                width: self.width,
                height: self.height,
            })
        }
    }
}

/// One detected box in source-image pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Detection {
    /// Class id; 0 is background and never reported.
    pub label: usize,
    /// Class probability in [0, 1].
    pub confidence: f32,
    pub x_min: f32,
    pub y_min: f32,
    pub x_max: f32,
    pub y_max: f32,
    /// Size the coordinates were scaled to.
    pub image_size: ImageSize,
}

impl Detection {
    fn from_normalized(boxed: CornerBox, label: usize, confidence: f32, size: ImageSize) -> Self {
        Self {
            label,
            confidence,
            x_min: boxed.x_min * size.width,
            y_min: boxed.y_min * size.height,
            x_max: boxed.x_max * size.width,
            y_max: boxed.y_max * size.height,
            image_size: size,
        }
    }

    /// Returns `[x_min, y_min, x_max, y_max]`.
    pub fn bbox(&self) -> [f32; 4] {
        [self.x_min, self.y_min, self.x_max, self.y_max]
    }

    /// Returns the box width in pixels.
    pub fn width(&self) -> f32 {
        self.x_max - self.x_min
    }

    /// Returns the box height in pixels.
    pub fn height(&self) -> f32 {
        self.y_max - self.y_min
    }
}

/// Turns raw detector tensors into detections for one image.
///
/// `locations` must have four columns and `scores` one column per class;
/// both must have one row per prior. Returns an empty list when nothing
/// clears the probability threshold, including when there are no anchors.
pub fn run(
    locations: TensorView<'_>,
    scores: TensorView<'_>,
    priors: &[Prior],
    image_size: ImageSize,
    config: &PostprocessConfig,
) -> SsdOcrResult<Vec<Detection>> {
    config.validate()?;
    image_size.validate()?;
    if locations.cols() != LOCATION_COLS {
        return Err(SsdOcrError::InvalidTensorShape {
            len: locations.as_slice().len(),
            cols: LOCATION_COLS,
        });
    }
    if locations.rows() != priors.len() || scores.rows() != priors.len() {
        return Err(SsdOcrError::AnchorCountMismatch {
            priors: priors.len(),
            locations: locations.rows(),
            scores: scores.rows(),
        });
    }

    let _span = trace_span!("postprocess", anchors = priors.len()).entered();
    let start = Instant::now();

    let boxes = decode_boxes(locations, priors, config);
    let probabilities = normalize_scores(scores, config.parallel);
    let suppressed = suppress(probabilities.view(), &boxes, &config.suppress)?;

    let detections: Vec<Detection> = suppressed
        .iter()
        .map(|(boxed, label, confidence)| {
            Detection::from_normalized(boxed, label, confidence, image_size)
        })
        .collect();

    trace_event!(
        "postprocess_done",
        detections = detections.len(),
        elapsed_us = start.elapsed().as_micros() as u64
    );
    Ok(detections)
}

fn decode_boxes(
    locations: TensorView<'_>,
    priors: &[Prior],
    config: &PostprocessConfig,
) -> Vec<CornerBox> {
    let _span = trace_span!("decode").entered();
    let mut boxes = vec![CornerBox::default(); priors.len()];
    let variances = config.variances();
    #[cfg(feature = "rayon")]
    {
        if config.parallel {
            crate::kernel::rayon::decode_boxes_par::<ActiveKernel>(
                locations.as_slice(),
                priors,
                variances,
                &mut boxes,
            );
            return boxes;
        }
    }
    ActiveKernel::decode_boxes(locations.as_slice(), priors, variances, &mut boxes);
    boxes
}

fn normalize_scores(scores: TensorView<'_>, parallel: bool) -> Tensor {
    let _span = trace_span!("normalize").entered();
    let mut probabilities = Tensor::zeros(scores.rows(), scores.cols());
    #[cfg(feature = "rayon")]
    {
        if parallel {
            crate::kernel::rayon::softmax_rows_par::<ActiveKernel>(
                scores.as_slice(),
                scores.cols(),
                probabilities.data_mut(),
            );
            return probabilities;
        }
    }
    #[cfg(not(feature = "rayon"))]
    let _ = parallel;
    ActiveKernel::softmax_rows(scores.as_slice(), scores.cols(), probabilities.data_mut());
    probabilities
}
