//! Per-class candidate ranking.

use std::cmp::Ordering;

use crate::util::math::score_cmp_desc;

/// Anchor that passed the probability threshold for one class.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    /// Row of the anchor in the model output.
    pub anchor: usize,
    /// Probability of the class being suppressed.
    pub score: f32,
}

fn candidate_cmp_desc(a: &Candidate, b: &Candidate) -> Ordering {
    score_cmp_desc(a.score, b.score).then_with(|| a.anchor.cmp(&b.anchor))
}

/// Sorts candidates by descending score, lower anchor index first on ties.
pub(crate) fn sort_candidates_desc(candidates: &mut [Candidate]) {
    candidates.sort_by(candidate_cmp_desc);
}

/// Keeps the `limit` best candidates, sorted by descending score.
pub(crate) fn top_candidates(mut candidates: Vec<Candidate>, limit: usize) -> Vec<Candidate> {
    if candidates.len() > limit {
        candidates.select_nth_unstable_by(limit, candidate_cmp_desc);
        candidates.truncate(limit);
    }
    sort_candidates_desc(&mut candidates);
    candidates
}

#[cfg(test)]
mod tests {
    use super::{top_candidates, Candidate};

    fn c(anchor: usize, score: f32) -> Candidate {
        Candidate { anchor, score }
    }

    #[test]
    fn ties_break_by_anchor_index() {
        let out = top_candidates(vec![c(7, 0.6), c(2, 0.6), c(4, 0.9), c(1, 0.6)], 3);
        assert_eq!(out, vec![c(4, 0.9), c(1, 0.6), c(2, 0.6)]);
    }

    #[test]
    fn limit_zero_keeps_nothing() {
        assert!(top_candidates(vec![c(0, 0.9)], 0).is_empty());
    }

    #[test]
    fn short_lists_are_only_sorted() {
        let out = top_candidates(vec![c(0, 0.1), c(1, 0.8)], 10);
        assert_eq!(out, vec![c(1, 0.8), c(0, 0.1)]);
    }
}
