//! Per-category overlap computation between predictions and ground truths.

use super::grouping::CategoryBucket;
use crate::metrics::iou::calculate_iou_matrix;
use crate::results::{GroundTruthEval, OverlapPair, PredictionEval};
use crate::types::BoundingBox;
use std::cmp::Ordering;

/// Sort a bucket's predictions by confidence and attach their overlaps.
///
/// Predictions are ordered by confidence, highest first. The sort is stable,
/// so numerically equal confidences (including `-0.0` and `0.0`) keep their
/// encounter order. Confidences must not be NaN. Each prediction then
/// receives one [`OverlapPair`] per ground truth of the bucket, in ground
/// truth order. Crowd ground truths are scored by intersection over the
/// prediction's area.
///
/// `pred_boxes` and `gt_boxes` are indexed like `predictions` and
/// `ground_truths`.
pub fn build_overlaps(
    bucket: &mut CategoryBucket,
    predictions: &mut [PredictionEval],
    pred_boxes: &[BoundingBox],
    ground_truths: &[GroundTruthEval],
    gt_boxes: &[BoundingBox],
) {
    bucket
        .predictions
        .sort_by(|&a, &b| {
            predictions[b]
                .confidence
                .partial_cmp(&predictions[a].confidence)
                .unwrap_or(Ordering::Equal)
        });

    let sorted_pred_boxes: Vec<BoundingBox> =
        bucket.predictions.iter().map(|&p| pred_boxes[p]).collect();
    let bucket_gt_boxes: Vec<BoundingBox> =
        bucket.ground_truths.iter().map(|&g| gt_boxes[g]).collect();
    let iscrowd: Vec<bool> = bucket
        .ground_truths
        .iter()
        .map(|&g| ground_truths[g].iscrowd)
        .collect();

    // Shape = [num_preds, num_gts]
    let ious = calculate_iou_matrix(&sorted_pred_boxes, &bucket_gt_boxes, &iscrowd);

    for (&pred_idx, row) in bucket.predictions.iter().zip(ious) {
        let pairs = bucket
            .ground_truths
            .iter()
            .zip(row)
            .map(|(&gt_idx, iou)| OverlapPair {
                gt_eval_id: ground_truths[gt_idx].eval_id,
                iou,
            })
            .collect();
        predictions[pred_idx].ious = Some(pairs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::{group_by_category, EvalId};
    use crate::threshold::ThresholdMap;
    use approx::assert_relative_eq;

    fn pred(eval_id: u64, label: &str, confidence: f64) -> PredictionEval {
        PredictionEval {
            detection_id: eval_id,
            eval_id: EvalId(eval_id),
            label: label.to_string(),
            confidence,
            ious: None,
            matches: ThresholdMap::filled(&[0.5], None),
        }
    }

    fn gt(eval_id: u64, label: &str, iscrowd: bool) -> GroundTruthEval {
        GroundTruthEval {
            detection_id: eval_id,
            eval_id: EvalId(eval_id),
            label: label.to_string(),
            iscrowd,
            matches: ThresholdMap::filled(&[0.5], None),
        }
    }

    #[test]
    fn test_predictions_sorted_by_confidence_with_stable_ties() {
        let mut preds = vec![
            pred(0, "cat", 0.5),
            pred(1, "cat", 0.9),
            pred(2, "cat", 0.5),
            pred(3, "cat", 0.7),
        ];
        let gts = vec![gt(4, "cat", false)];
        let pred_boxes = vec![BoundingBox::new(0.0, 0.0, 10.0, 10.0); 4];
        let gt_boxes = vec![BoundingBox::new(0.0, 0.0, 10.0, 10.0)];

        let mut buckets = group_by_category(&preds, &gts);
        build_overlaps(&mut buckets[0], &mut preds, &pred_boxes, &gts, &gt_boxes);

        assert_eq!(buckets[0].predictions, vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_signed_zero_confidences_keep_encounter_order() {
        let mut preds = vec![pred(0, "cat", -0.0), pred(1, "cat", 0.0), pred(2, "cat", 0.3)];
        let gts = vec![gt(3, "cat", false)];
        let pred_boxes = vec![BoundingBox::new(0.0, 0.0, 10.0, 10.0); 3];
        let gt_boxes = vec![BoundingBox::new(0.0, 0.0, 10.0, 10.0)];

        let mut buckets = group_by_category(&preds, &gts);
        build_overlaps(&mut buckets[0], &mut preds, &pred_boxes, &gts, &gt_boxes);

        assert_eq!(buckets[0].predictions, vec![2, 0, 1]);
    }

    #[test]
    fn test_overlaps_follow_ground_truth_order() {
        let mut preds = vec![pred(0, "cat", 0.9)];
        let gts = vec![gt(1, "cat", false), gt(2, "cat", false)];
        let pred_boxes = vec![BoundingBox::new(0.0, 0.0, 10.0, 10.0)];
        let gt_boxes = vec![
            BoundingBox::new(5.0, 0.0, 10.0, 10.0),
            BoundingBox::new(0.0, 0.0, 10.0, 10.0),
        ];

        let mut buckets = group_by_category(&preds, &gts);
        build_overlaps(&mut buckets[0], &mut preds, &pred_boxes, &gts, &gt_boxes);

        let ious = preds[0].ious.as_ref().unwrap();
        assert_eq!(ious.len(), 2);
        assert_eq!(ious[0].gt_eval_id, EvalId(1));
        assert_relative_eq!(ious[0].iou, 50.0 / 150.0, epsilon = 1e-12);
        assert_eq!(ious[1].gt_eval_id, EvalId(2));
        assert_relative_eq!(ious[1].iou, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_crowd_column_uses_prediction_area() {
        let mut preds = vec![pred(0, "person", 0.9)];
        let gts = vec![gt(1, "person", true)];
        let pred_boxes = vec![BoundingBox::new(10.0, 10.0, 10.0, 10.0)];
        let gt_boxes = vec![BoundingBox::new(0.0, 0.0, 100.0, 100.0)];

        let mut buckets = group_by_category(&preds, &gts);
        build_overlaps(&mut buckets[0], &mut preds, &pred_boxes, &gts, &gt_boxes);

        assert_relative_eq!(preds[0].ious.as_ref().unwrap()[0].iou, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_bucket_without_ground_truths_gets_empty_overlaps() {
        let mut preds = vec![pred(0, "cat", 0.9)];
        let pred_boxes = vec![BoundingBox::new(0.0, 0.0, 10.0, 10.0)];

        let mut buckets = group_by_category(&preds, &[]);
        build_overlaps(&mut buckets[0], &mut preds, &pred_boxes, &[], &[]);

        assert_eq!(preds[0].ious, Some(vec![]));
    }
}
