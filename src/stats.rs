//! Statistics tracking across an evaluation run
//!
//! This module provides a running summary of the samples evaluated by
//! [`crate::evaluator::SampleEvaluator::evaluate_samples`].

use crate::results::SampleEvaluation;
use serde::{Deserialize, Serialize};

/// Statistics collected while evaluating samples
///
/// Counts at IoU 0.75 are summed only over samples where that threshold
/// was evaluated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationStats {
    /// Number of samples evaluated and persisted
    pub samples_evaluated: usize,

    /// Total number of predictions across evaluated samples
    pub total_predictions: usize,

    /// Total number of ground truths across evaluated samples
    pub total_ground_truths: usize,

    /// Number of ground truths flagged as crowd regions
    pub crowd_ground_truths: usize,

    /// Number of samples with neither predictions nor ground truths
    pub empty_samples: usize,

    /// Summed true positives at IoU 0.75
    pub true_positives_iou75: usize,

    /// Summed false positives at IoU 0.75
    pub false_positives_iou75: usize,

    /// Summed false negatives at IoU 0.75
    pub false_negatives_iou75: usize,
}

impl EvaluationStats {
    /// Create a new `EvaluationStats` with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one sample's evaluation into the running totals
    pub fn record(&mut self, evaluation: &SampleEvaluation) {
        self.samples_evaluated += 1;
        self.total_predictions += evaluation.predictions.len();
        self.total_ground_truths += evaluation.ground_truths.len();
        self.crowd_ground_truths += evaluation
            .ground_truths
            .iter()
            .filter(|gt| gt.iscrowd)
            .count();

        if evaluation.predictions.is_empty() && evaluation.ground_truths.is_empty() {
            self.empty_samples += 1;
        }

        if let Some(summary) = evaluation.summary_counts() {
            self.true_positives_iou75 += summary.true_positives;
            self.false_positives_iou75 += summary.false_positives;
            self.false_negatives_iou75 += summary.false_negatives;
        }
    }

    /// Print a summary of the statistics to stdout
    pub fn print_summary(&self) {
        println!("\n=== Evaluation Statistics ===");
        println!("Samples evaluated: {}", self.samples_evaluated);
        println!("Predictions: {}", self.total_predictions);
        println!("Ground truths: {}", self.total_ground_truths);
        println!("  - Crowd regions: {}", self.crowd_ground_truths);
        println!("Empty samples: {}", self.empty_samples);
        println!("At IoU 0.75:");
        println!("  - True positives: {}", self.true_positives_iou75);
        println!("  - False positives: {}", self.false_positives_iou75);
        println!("  - False negatives: {}", self.false_negatives_iou75);
        println!("=============================\n");
    }

    /// Get a formatted string summary of the statistics
    pub fn summary_string(&self) -> String {
        format!(
            "EvaluationStats {{ samples: {}, predictions: {}, ground_truths: {}, tp75: {}, fp75: {}, fn75: {} }}",
            self.samples_evaluated,
            self.total_predictions,
            self.total_ground_truths,
            self.true_positives_iou75,
            self.false_positives_iou75,
            self.false_negatives_iou75
        )
    }
}
