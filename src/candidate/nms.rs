//! Greedy IoU non-maximum suppression for one class.

use crate::boxes::{iou, CornerBox};
use crate::candidate::topk::Candidate;

/// Runs greedy NMS over candidates already sorted by descending score.
///
/// A candidate is kept unless a previously kept box overlaps it with
/// IoU above `iou_threshold`; NaN overlaps never suppress. Stops after
/// `top_k` picks when a cap is given. Returned candidates are in pick order.
pub fn hard_nms(
    sorted: &[Candidate],
    boxes: &[CornerBox],
    iou_threshold: f32,
    top_k: Option<usize>,
) -> Vec<Candidate> {
    let cap = top_k.unwrap_or(usize::MAX);
    let mut kept: Vec<Candidate> = Vec::new();

    'outer: for &candidate in sorted {
        if kept.len() >= cap {
            break;
        }
        let current = &boxes[candidate.anchor];
        for picked in &kept {
            if iou(&boxes[picked.anchor], current) > iou_threshold {
                continue 'outer;
            }
        }
        kept.push(candidate);
    }

    kept
}
