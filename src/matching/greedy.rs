//! Confidence-ordered greedy matching at a single IoU threshold.

use super::eval_id::EvalId;
use super::grouping::CategoryBucket;
use crate::results::{GroundTruthEval, MatchCounts, OverlapPair, PredictionEval};
use std::collections::HashMap;

/// Upper bound of the acceptance floor, so a threshold of 1.0 still admits
/// overlaps that are perfect up to rounding.
const MAX_ACCEPTANCE_FLOOR: f64 = 1.0 - 1e-10;

/// Greedily matches predictions to ground truths, one threshold at a time.
///
/// Match state lives in the `matches` table of each record at the
/// threshold's position, so thresholds never see each other's assignments.
pub struct ThresholdMatcher {
    gt_index: HashMap<EvalId, usize>,
}

impl ThresholdMatcher {
    /// Create a matcher resolving eval ids against `ground_truths`.
    pub fn new(ground_truths: &[GroundTruthEval]) -> Self {
        let gt_index = ground_truths
            .iter()
            .enumerate()
            .map(|(idx, gt)| (gt.eval_id, idx))
            .collect();
        Self { gt_index }
    }

    /// Match one category bucket at the threshold found at `threshold_idx`.
    ///
    /// Predictions are visited in bucket order, which must already be sorted
    /// by confidence. Each prediction takes the candidate with the highest
    /// overlap at or above the threshold. On equal overlaps the candidate seen
    /// later wins. A non-crowd ground truth accepts a single prediction; a
    /// crowd ground truth accepts any number but records only the latest.
    ///
    /// Returns the bucket's counts. False negatives are the bucket's ground
    /// truths left unmatched at this threshold.
    pub fn match_bucket(
        &self,
        bucket: &CategoryBucket,
        threshold_idx: usize,
        threshold: f64,
        predictions: &mut [PredictionEval],
        ground_truths: &mut [GroundTruthEval],
    ) -> MatchCounts {
        let mut counts = MatchCounts::default();

        for &pred_idx in &bucket.predictions {
            let best = match predictions[pred_idx].ious.as_deref() {
                Some(ious) => self.best_candidate(ious, threshold_idx, threshold, ground_truths),
                None => {
                    log::debug!(
                        "Prediction {} has no overlaps for '{}', skipping",
                        predictions[pred_idx].eval_id,
                        bucket.label
                    );
                    continue;
                }
            };

            match best {
                Some((gt_idx, pair)) => {
                    let pred_eval_id = predictions[pred_idx].eval_id;
                    *predictions[pred_idx].matches.at_mut(threshold_idx) = Some(pair);
                    *ground_truths[gt_idx].matches.at_mut(threshold_idx) = Some(pred_eval_id);
                    counts.true_positives += 1;
                }
                None => counts.false_positives += 1,
            }
        }

        counts.false_negatives = bucket
            .ground_truths
            .iter()
            .filter(|&&gt_idx| ground_truths[gt_idx].matches.at(threshold_idx).is_none())
            .count();

        counts
    }

    fn best_candidate(
        &self,
        ious: &[OverlapPair],
        threshold_idx: usize,
        threshold: f64,
        ground_truths: &[GroundTruthEval],
    ) -> Option<(usize, OverlapPair)> {
        let mut best = None;
        let mut floor = threshold.min(MAX_ACCEPTANCE_FLOOR);

        for pair in ious {
            let Some(&gt_idx) = self.gt_index.get(&pair.gt_eval_id) else {
                continue;
            };
            let gt = &ground_truths[gt_idx];

            if gt.matches.at(threshold_idx).is_some() && !gt.iscrowd {
                continue;
            }

            if pair.iou < floor {
                continue;
            }

            floor = pair.iou;
            best = Some((gt_idx, *pair));
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::threshold::ThresholdMap;

    const THRESHOLDS: [f64; 3] = [0.5, 0.65, 0.75];

    fn pred(eval_id: u64, ious: &[(u64, f64)]) -> PredictionEval {
        PredictionEval {
            detection_id: eval_id,
            eval_id: EvalId(eval_id),
            label: "cat".to_string(),
            confidence: 1.0,
            ious: Some(
                ious.iter()
                    .map(|&(gt, iou)| OverlapPair { gt_eval_id: EvalId(gt), iou })
                    .collect(),
            ),
            matches: ThresholdMap::filled(&THRESHOLDS, None),
        }
    }

    fn gt(eval_id: u64, iscrowd: bool) -> GroundTruthEval {
        GroundTruthEval {
            detection_id: eval_id,
            eval_id: EvalId(eval_id),
            label: "cat".to_string(),
            iscrowd,
            matches: ThresholdMap::filled(&THRESHOLDS, None),
        }
    }

    fn bucket(num_preds: usize, num_gts: usize) -> CategoryBucket {
        CategoryBucket {
            label: "cat".to_string(),
            predictions: (0..num_preds).collect(),
            ground_truths: (0..num_gts).collect(),
        }
    }

    fn run_all(
        preds: &mut [PredictionEval],
        gts: &mut [GroundTruthEval],
    ) -> Vec<MatchCounts> {
        let matcher = ThresholdMatcher::new(gts);
        let bucket = bucket(preds.len(), gts.len());
        let mut counts = Vec::new();
        for (idx, &threshold) in THRESHOLDS.iter().enumerate() {
            counts.push(matcher.match_bucket(&bucket, idx, threshold, preds, gts));
        }
        counts
    }

    #[test]
    fn test_single_prediction_at_each_threshold() {
        let mut preds = vec![pred(0, &[(1, 0.6)])];
        let mut gts = vec![gt(1, false)];

        let counts = run_all(&mut preds, &mut gts);
        assert_eq!(counts[0], MatchCounts::new(1, 0, 0));
        assert_eq!(counts[1], MatchCounts::new(0, 1, 1));
        assert_eq!(counts[2], MatchCounts::new(0, 1, 1));

        assert_eq!(*preds[0].matches.at(0), Some(OverlapPair { gt_eval_id: EvalId(1), iou: 0.6 }));
        assert_eq!(*gts[0].matches.at(0), Some(EvalId(0)));
        assert_eq!(*gts[0].matches.at(1), None);
    }

    #[test]
    fn test_non_crowd_ground_truth_accepts_one_prediction() {
        let mut preds = vec![pred(0, &[(2, 0.9)]), pred(1, &[(2, 0.7)])];
        let mut gts = vec![gt(2, false)];

        let counts = run_all(&mut preds, &mut gts);
        assert_eq!(counts[0], MatchCounts::new(1, 1, 0));
        assert_eq!(*gts[0].matches.at(0), Some(EvalId(0)));
        assert_eq!(*preds[1].matches.at(0), None);
    }

    #[test]
    fn test_second_prediction_falls_back_to_next_best() {
        let mut preds = vec![pred(0, &[(2, 0.9), (3, 0.8)]), pred(1, &[(2, 0.95), (3, 0.6)])];
        let mut gts = vec![gt(2, false), gt(3, false)];

        let counts = run_all(&mut preds, &mut gts);
        assert_eq!(counts[0], MatchCounts::new(2, 0, 0));
        assert_eq!(preds[1].matches.at(0).unwrap().gt_eval_id, EvalId(3));
        // 0.6 is below 0.65, so the second prediction misses there
        assert_eq!(counts[1], MatchCounts::new(1, 1, 1));
    }

    #[test]
    fn test_highest_overlap_wins_and_ties_go_to_later_candidate() {
        let mut preds = vec![pred(0, &[(1, 0.7), (2, 0.9), (3, 0.9)])];
        let mut gts = vec![gt(1, false), gt(2, false), gt(3, false)];

        run_all(&mut preds, &mut gts);
        assert_eq!(preds[0].matches.at(0).unwrap().gt_eval_id, EvalId(3));
    }

    #[test]
    fn test_crowd_ground_truth_accepts_many_and_keeps_latest() {
        let mut preds = vec![pred(0, &[(2, 0.9)]), pred(1, &[(2, 0.8)])];
        let mut gts = vec![gt(2, true)];

        let counts = run_all(&mut preds, &mut gts);
        assert_eq!(counts[0], MatchCounts::new(2, 0, 0));
        assert_eq!(*gts[0].matches.at(0), Some(EvalId(1)));
    }

    #[test]
    fn test_threshold_one_accepts_perfect_overlap() {
        let thresholds = [1.0];
        let mut preds = vec![pred(0, &[(1, 1.0)])];
        preds[0].matches = ThresholdMap::filled(&thresholds, None);
        let mut gts = vec![gt(1, false)];
        gts[0].matches = ThresholdMap::filled(&thresholds, None);

        let matcher = ThresholdMatcher::new(&gts);
        let counts = matcher.match_bucket(&bucket(1, 1), 0, 1.0, &mut preds, &mut gts);
        assert_eq!(counts, MatchCounts::new(1, 0, 0));
    }

    #[test]
    fn test_prediction_without_overlaps_is_skipped() {
        let mut preds = vec![pred(0, &[(1, 0.9)])];
        preds[0].ious = None;
        let mut gts = vec![gt(1, false)];

        let counts = run_all(&mut preds, &mut gts);
        assert_eq!(counts[0], MatchCounts::new(0, 0, 1));
    }

    #[test]
    fn test_empty_overlaps_are_false_positives() {
        let mut preds = vec![pred(0, &[])];
        let mut gts: Vec<GroundTruthEval> = vec![];

        let counts = run_all(&mut preds, &mut gts);
        assert!(counts.iter().all(|c| *c == MatchCounts::new(0, 1, 0)));
    }
}
