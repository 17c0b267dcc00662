//! Evaluation records and per-threshold count aggregation.

use crate::config::FalseNegativeScope;
use crate::matching::EvalId;
use crate::threshold::{ThresholdMap, SUMMARY_IOU_THRESHOLD};
use serde::Serialize;
use std::ops::AddAssign;

/// A ground truth paired with an overlap score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OverlapPair {
    pub gt_eval_id: EvalId,
    pub iou: f64,
}

/// Evaluation record of one predicted detection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionEval {
    /// Id of the detection in the prediction field
    pub detection_id: u64,
    pub eval_id: EvalId,
    pub label: String,
    pub confidence: f64,
    /// Overlaps with every ground truth of the same label, in ground truth order
    pub ious: Option<Vec<OverlapPair>>,
    /// Matched ground truth and achieved overlap, per threshold
    pub matches: ThresholdMap<Option<OverlapPair>>,
}

impl PredictionEval {
    /// Whether this prediction is a true positive at `threshold`.
    pub fn is_matched_at(&self, threshold: f64) -> bool {
        matches!(self.matches.get(threshold), Some(Some(_)))
    }
}

/// Evaluation record of one ground truth detection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroundTruthEval {
    /// Id of the detection in the ground truth field
    pub detection_id: u64,
    pub eval_id: EvalId,
    pub label: String,
    pub iscrowd: bool,
    /// Eval id of the matched prediction, per threshold.
    ///
    /// A crowd region keeps only the most recently matched prediction.
    pub matches: ThresholdMap<Option<EvalId>>,
}

impl GroundTruthEval {
    /// Whether this ground truth is matched at `threshold`.
    pub fn is_matched_at(&self, threshold: f64) -> bool {
        matches!(self.matches.get(threshold), Some(Some(_)))
    }
}

/// True positive, false positive and false negative counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatchCounts {
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

impl MatchCounts {
    pub fn new(true_positives: usize, false_positives: usize, false_negatives: usize) -> Self {
        Self {
            true_positives,
            false_positives,
            false_negatives,
        }
    }
}

impl AddAssign for MatchCounts {
    fn add_assign(&mut self, other: Self) {
        self.true_positives += other.true_positives;
        self.false_positives += other.false_positives;
        self.false_negatives += other.false_negatives;
    }
}

/// Per-threshold counts for a whole sample, one mapping per count kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdCounts {
    pub true_positives: ThresholdMap<usize>,
    pub false_positives: ThresholdMap<usize>,
    pub false_negatives: ThresholdMap<usize>,
}

impl ThresholdCounts {
    /// All three counts at `threshold`.
    pub fn at(&self, threshold: f64) -> Option<MatchCounts> {
        Some(MatchCounts::new(
            *self.true_positives.get(threshold)?,
            *self.false_positives.get(threshold)?,
            *self.false_negatives.get(threshold)?,
        ))
    }
}

/// Per-threshold counts of one label within a sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCounts {
    pub label: String,
    pub num_predictions: usize,
    pub num_ground_truths: usize,
    pub counts: ThresholdMap<MatchCounts>,
}

/// Everything produced by evaluating one sample.
///
/// The `tp_iou75`, `fp_iou75` and `fn_iou75` scalars mirror the counts at
/// IoU 0.75 for quick filtering and are absent when 0.75 is not evaluated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleEvaluation {
    pub sample_id: u64,
    /// Namespace of these results, `"<pred_field>_eval"`
    pub eval_key: String,
    pub pred_field: String,
    pub gt_field: String,
    pub predictions: Vec<PredictionEval>,
    pub ground_truths: Vec<GroundTruthEval>,
    pub counts: ThresholdCounts,
    pub categories: Vec<CategoryCounts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tp_iou75: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fp_iou75: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fn_iou75: Option<usize>,
}

impl SampleEvaluation {
    /// Counts at IoU 0.75, if evaluated.
    pub fn summary_counts(&self) -> Option<MatchCounts> {
        Some(MatchCounts::new(self.tp_iou75?, self.fp_iou75?, self.fn_iou75?))
    }

    /// Record of the prediction with the given eval id.
    pub fn prediction(&self, eval_id: EvalId) -> Option<&PredictionEval> {
        self.predictions.iter().find(|p| p.eval_id == eval_id)
    }

    /// Record of the ground truth with the given eval id.
    pub fn ground_truth(&self, eval_id: EvalId) -> Option<&GroundTruthEval> {
        self.ground_truths.iter().find(|g| g.eval_id == eval_id)
    }

    /// Counts of the category with the given label.
    pub fn category(&self, label: &str) -> Option<&CategoryCounts> {
        self.categories.iter().find(|c| c.label == label)
    }
}

/// Output of [`ResultAggregator::finish`].
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedCounts {
    pub counts: ThresholdCounts,
    pub categories: Vec<CategoryCounts>,
    /// Counts at IoU 0.75, if part of the sweep
    pub summary: Option<MatchCounts>,
}

/// Collects per-category, per-threshold counts for one sample.
pub struct ResultAggregator {
    thresholds: Vec<f64>,
    scope: FalseNegativeScope,
    categories: Vec<CategoryCounts>,
}

impl ResultAggregator {
    pub fn new(thresholds: &[f64], scope: FalseNegativeScope) -> Self {
        Self {
            thresholds: thresholds.to_vec(),
            scope,
            categories: Vec::new(),
        }
    }

    /// Register a category and return its index for [`record`](Self::record).
    pub fn add_category(&mut self, label: &str, num_predictions: usize, num_ground_truths: usize) -> usize {
        self.categories.push(CategoryCounts {
            label: label.to_string(),
            num_predictions,
            num_ground_truths,
            counts: ThresholdMap::filled(&self.thresholds, MatchCounts::default()),
        });
        self.categories.len() - 1
    }

    /// Store the counts of one category at one threshold position.
    pub fn record(&mut self, category_idx: usize, threshold_idx: usize, counts: MatchCounts) {
        *self.categories[category_idx].counts.at_mut(threshold_idx) = counts;
    }

    /// Combine category counts into per-threshold sample totals.
    pub fn finish(self) -> AggregatedCounts {
        let totals: Vec<MatchCounts> = (0..self.thresholds.len())
            .map(|idx| self.total_at(idx))
            .collect();

        let counts = ThresholdCounts {
            true_positives: ThresholdMap::from_values(
                &self.thresholds,
                totals.iter().map(|c| c.true_positives),
            ),
            false_positives: ThresholdMap::from_values(
                &self.thresholds,
                totals.iter().map(|c| c.false_positives),
            ),
            false_negatives: ThresholdMap::from_values(
                &self.thresholds,
                totals.iter().map(|c| c.false_negatives),
            ),
        };
        let summary = counts.at(SUMMARY_IOU_THRESHOLD);

        AggregatedCounts {
            counts,
            categories: self.categories,
            summary,
        }
    }

    fn total_at(&self, threshold_idx: usize) -> MatchCounts {
        let mut total = MatchCounts::default();
        for category in &self.categories {
            total += *category.counts.at(threshold_idx);
        }

        if self.scope == FalseNegativeScope::LastCategory {
            total.false_negatives = self
                .categories
                .last()
                .map_or(0, |c| c.counts.at(threshold_idx).false_negatives);
        }

        total
    }
}
