//! Thresholding, per-class greedy NMS, and top-K capping.
//!
//! Class 0 is background and never produces detections. Classes are visited
//! in ascending order and their survivors are appended in pick order.

pub(crate) mod nms;
pub(crate) mod topk;

use crate::boxes::CornerBox;
use crate::candidate::nms::hard_nms;
use crate::candidate::topk::{top_candidates, Candidate};
use crate::tensor::TensorView;
use crate::trace::{trace_event, trace_span};
use crate::util::math::check_unit_interval;
use crate::util::{SsdOcrError, SsdOcrResult};

/// Suppression parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SuppressConfig {
    /// Minimum class probability; candidates must exceed it strictly.
    pub prob_threshold: f32,
    /// Overlap above which the lower-scoring box is removed.
    pub iou_threshold: f32,
    /// Maximum candidates per class entering NMS.
    pub candidate_size: usize,
    /// Maximum survivors per class; `None` keeps all.
    pub top_k: Option<usize>,
}

impl Default for SuppressConfig {
    fn default() -> Self {
        Self {
            prob_threshold: 0.5,
            iou_threshold: 0.45,
            candidate_size: 200,
            top_k: Some(20),
        }
    }
}

impl SuppressConfig {
    /// Rejects thresholds outside [0, 1] instead of clamping them.
    pub fn validate(&self) -> SsdOcrResult<()> {
        check_unit_interval("prob_threshold", self.prob_threshold)?;
        check_unit_interval("iou_threshold", self.iou_threshold)
    }
}

/// Survivors of suppression as three index-aligned sequences.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Suppressed {
    pub boxes: Vec<CornerBox>,
    pub labels: Vec<usize>,
    pub confidences: Vec<f32>,
}

impl Suppressed {
    /// Returns the number of surviving boxes.
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// Returns true when nothing survived.
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Iterates over `(box, label, confidence)` triples.
    pub fn iter(&self) -> impl Iterator<Item = (CornerBox, usize, f32)> + '_ {
        self.boxes
            .iter()
            .zip(&self.labels)
            .zip(&self.confidences)
            .map(|((b, &label), &conf)| (*b, label, conf))
    }

    fn push(&mut self, boxed: CornerBox, label: usize, confidence: f32) {
        self.boxes.push(boxed);
        self.labels.push(label);
        self.confidences.push(confidence);
    }
}

/// Suppresses overlapping detections class by class.
///
/// `probabilities` holds one row per anchor and one column per class
/// (column 0 is background); `boxes` holds the matching corner-form boxes.
/// Anchors with a NaN probability or a non-finite box are dropped.
pub fn suppress(
    probabilities: TensorView<'_>,
    boxes: &[CornerBox],
    config: &SuppressConfig,
) -> SsdOcrResult<Suppressed> {
    config.validate()?;
    if probabilities.rows() != boxes.len() {
        return Err(SsdOcrError::AnchorCountMismatch {
            priors: boxes.len(),
            locations: boxes.len(),
            scores: probabilities.rows(),
        });
    }

    let num_classes = probabilities.cols();
    let _span = trace_span!("suppress", anchors = boxes.len(), classes = num_classes).entered();

    let mut out = Suppressed::default();
    let mut dropped = 0usize;
    for class in 1..num_classes {
        let mut candidates = Vec::new();
        for (anchor, row) in probabilities.iter_rows().enumerate() {
            let score = row[class];
            if score.is_nan() {
                dropped += 1;
                continue;
            }
            if score > config.prob_threshold {
                if boxes[anchor].is_finite() {
                    candidates.push(Candidate { anchor, score });
                } else {
                    dropped += 1;
                }
            }
        }
        if candidates.is_empty() {
            continue;
        }

        let passed = candidates.len();
        let ranked = top_candidates(candidates, config.candidate_size);
        let kept = hard_nms(&ranked, boxes, config.iou_threshold, config.top_k);
        trace_event!("class_suppressed", class = class, passed = passed, kept = kept.len());

        for candidate in kept {
            out.push(boxes[candidate.anchor], class, candidate.score);
        }
    }

    if dropped > 0 {
        trace_event!("non_finite_dropped", count = dropped);
    }
    Ok(out)
}
