//! Partitioning of a sample's detections by label.

use crate::results::{GroundTruthEval, PredictionEval};
use std::collections::HashMap;

/// Predictions and ground truths sharing one label.
///
/// Entries are indices into the sample's prediction and ground truth
/// records, kept in encounter order until the overlap step sorts the
/// predictions by confidence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryBucket {
    pub label: String,
    pub predictions: Vec<usize>,
    pub ground_truths: Vec<usize>,
}

impl CategoryBucket {
    fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            predictions: Vec::new(),
            ground_truths: Vec::new(),
        }
    }
}

/// Group predictions and ground truths by label.
///
/// Buckets are returned in the order their label was first seen, scanning
/// predictions before ground truths. A label present on only one side still
/// gets a bucket, with the other side empty.
///
/// # Example
///
/// ```
/// use coco_match::matching::group_by_category;
///
/// let buckets = group_by_category(&[], &[]);
/// assert!(buckets.is_empty());
/// ```
pub fn group_by_category(
    predictions: &[PredictionEval],
    ground_truths: &[GroundTruthEval],
) -> Vec<CategoryBucket> {
    let mut buckets: Vec<CategoryBucket> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for (idx, pred) in predictions.iter().enumerate() {
        let bucket = bucket_index(&pred.label, &mut index, &mut buckets);
        buckets[bucket].predictions.push(idx);
    }

    for (idx, gt) in ground_truths.iter().enumerate() {
        let bucket = bucket_index(&gt.label, &mut index, &mut buckets);
        buckets[bucket].ground_truths.push(idx);
    }

    buckets
}

/// Index of the bucket for `label`, creating an empty one on first sight.
fn bucket_index<'a>(
    label: &'a str,
    index: &mut HashMap<&'a str, usize>,
    buckets: &mut Vec<CategoryBucket>,
) -> usize {
    *index.entry(label).or_insert_with(|| {
        buckets.push(CategoryBucket::new(label));
        buckets.len() - 1
    })
}
