//! Predictor-driven detection service.

use std::time::Instant;

use crate::pipeline::{run, Detection, DetectionConfig, ImageSize};
use crate::predictor::{InputBuffer, Predictor, RawOutput};
use crate::prior::{PriorCache, PriorSet};
use crate::tensor::TensorView;
use crate::trace::{trace_event, trace_span};
use crate::util::{SsdOcrError, SsdOcrResult};

/// Owns a predictor, its fixed config, and the lazily generated priors.
///
/// The pipeline holds no per-call mutable state, so one instance can serve
/// concurrent `predict` calls when the predictor is `Sync`.
pub struct DetectionPipeline<P> {
    predictor: P,
    config: DetectionConfig,
    priors: PriorCache,
}

impl<P: Predictor> DetectionPipeline<P> {
    /// Validates `config` and wraps `predictor`. Priors are generated on first use.
    pub fn new(predictor: P, config: DetectionConfig) -> SsdOcrResult<Self> {
        config.validate()?;
        let priors = PriorCache::new(config.priors.clone())?;
        Ok(Self {
            predictor,
            config,
            priors,
        })
    }

    /// Returns the pipeline config.
    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Returns the wrapped predictor.
    pub fn predictor(&self) -> &P {
        &self.predictor
    }

    /// Returns the prior set, generating it on first call.
    pub fn priors(&self) -> &PriorSet {
        self.priors.get()
    }

    /// Returns true when the predictor can run.
    pub fn is_ready(&self) -> bool {
        self.predictor.is_ready()
    }

    /// Returns the model input size as `(width, height)`.
    pub fn input_size(&self) -> (usize, usize) {
        (self.config.priors.input_width, self.config.priors.input_height)
    }

    /// Generates the priors and runs the predictor once on a white frame.
    ///
    /// The model output is discarded; this only pays one-time setup costs
    /// before the first real frame.
    pub fn warm_up(&self) -> SsdOcrResult<()> {
        let _span = trace_span!("warm_up").entered();
        let start = Instant::now();
        self.priors();
        let (width, height) = self.input_size();
        let blank = InputBuffer::blank(width, height, u8::MAX);
        self.infer(&blank)?;
        trace_event!("warm_up_done", elapsed_us = start.elapsed().as_micros() as u64);
        Ok(())
    }

    /// Runs the model on `input` and postprocesses its output.
    ///
    /// `image_size` is the pixel size of the original image the input was
    /// resized from; detections are reported in that coordinate space.
    pub fn predict(
        &self,
        input: &InputBuffer,
        image_size: ImageSize,
    ) -> SsdOcrResult<Vec<Detection>> {
        let _span = trace_span!("predict").entered();
        let (width, height) = self.input_size();
        if input.width() != width || input.height() != height {
            return Err(SsdOcrError::InvalidInputSize {
                expected_width: width,
                expected_height: height,
                width: input.width(),
                height: input.height(),
            });
        }
        let output = self.infer(input)?;
        self.postprocess(&output, image_size)
    }

    /// Postprocesses tensors that were produced elsewhere, e.g. recorded earlier.
    pub fn postprocess(
        &self,
        output: &RawOutput,
        image_size: ImageSize,
    ) -> SsdOcrResult<Vec<Detection>> {
        let locations = TensorView::locations(&output.locations)?;
        let anchors = locations.rows();
        let num_classes = self.config.num_classes;
        let score_len = output.scores.len();
        if anchors > 0 && score_len % anchors == 0 && score_len / anchors != num_classes {
            return Err(SsdOcrError::ClassCountMismatch {
                expected: num_classes,
                got: score_len / anchors,
            });
        }
        let scores = TensorView::new(&output.scores, num_classes)?;
        run(
            locations,
            scores,
            self.priors(),
            image_size,
            &self.config.postprocess,
        )
    }

    /// Resizes `image` to the model input and runs [`predict`](Self::predict).
    #[cfg(feature = "image-io")]
    pub fn predict_image(&self, image: &image::DynamicImage) -> SsdOcrResult<Vec<Detection>> {
        let (width, height) = self.input_size();
        let input = InputBuffer::from_image(image, width, height)?;
        self.predict(&input, crate::io::image_size_of(image))
    }

    fn infer(&self, input: &InputBuffer) -> SsdOcrResult<RawOutput> {
        if !self.predictor.is_ready() {
            return Err(SsdOcrError::ModelUnavailable {
                reason: "predictor is not ready".to_string(),
            });
        }
        let start = Instant::now();
        let output = self.predictor.infer(input)?;
        trace_event!("model_run", elapsed_us = start.elapsed().as_micros() as u64);
        Ok(output)
    }
}
