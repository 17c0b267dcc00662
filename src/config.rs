//! Evaluation configuration.

use crate::error::{CocoMatchError, Result};
use crate::threshold::{default_iou_thresholds, validate_thresholds};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Which category buckets contribute to the per-threshold false negative count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum FalseNegativeScope {
    /// Sum unmatched ground truths over every category of the sample.
    #[default]
    #[value(name = "all")]
    AllCategories,
    /// Count unmatched ground truths of the last category iterated only.
    ///
    /// Matches counts written by earlier evaluation runs.
    #[value(name = "last")]
    LastCategory,
}

/// Settings for matching one prediction field against one ground truth field.
///
/// # Example
///
/// ```
/// use coco_match::config::EvalConfig;
///
/// let config = EvalConfig::new("predictions", "ground_truth")
///     .with_iou_thresholds(vec![0.5, 0.75])
///     .validated()
///     .unwrap();
/// assert_eq!(config.iou_thresholds, vec![0.5, 0.75]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Name of the sample field holding predicted detections
    pub pred_field: String,
    /// Name of the sample field holding ground truth detections
    pub gt_field: String,
    /// IoU thresholds, strictly increasing
    pub iou_thresholds: Vec<f64>,
    /// Ground truth attribute that marks crowd regions
    pub crowd_attribute: String,
    pub false_negative_scope: FalseNegativeScope,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            pred_field: "predictions".to_string(),
            gt_field: "ground_truth".to_string(),
            iou_thresholds: default_iou_thresholds(),
            crowd_attribute: "iscrowd".to_string(),
            false_negative_scope: FalseNegativeScope::default(),
        }
    }
}

impl EvalConfig {
    /// Create a config for the given fields with default thresholds.
    pub fn new(pred_field: impl Into<String>, gt_field: impl Into<String>) -> Self {
        Self {
            pred_field: pred_field.into(),
            gt_field: gt_field.into(),
            ..Self::default()
        }
    }

    pub fn with_iou_thresholds(mut self, iou_thresholds: Vec<f64>) -> Self {
        self.iou_thresholds = iou_thresholds;
        self
    }

    pub fn with_crowd_attribute(mut self, crowd_attribute: impl Into<String>) -> Self {
        self.crowd_attribute = crowd_attribute.into();
        self
    }

    pub fn with_false_negative_scope(mut self, scope: FalseNegativeScope) -> Self {
        self.false_negative_scope = scope;
        self
    }

    /// Load a config from a JSON file. Missing keys take their default values.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let config: EvalConfig = serde_json::from_reader(BufReader::new(file))?;
        config.validated()
    }

    /// Key under which results for this prediction field are stored.
    pub fn eval_key(&self) -> String {
        format!("{}_eval", self.pred_field)
    }

    /// Check the config and normalize its threshold sweep.
    pub fn validated(mut self) -> Result<Self> {
        if self.pred_field.is_empty() || self.gt_field.is_empty() {
            return Err(CocoMatchError::InvalidConfig(
                "Field names must not be empty".to_string()
            ));
        }

        if self.pred_field == self.gt_field {
            return Err(CocoMatchError::InvalidConfig(format!(
                "Prediction and ground truth fields must differ, both are '{}'",
                self.pred_field
            )));
        }

        self.iou_thresholds = validate_thresholds(&self.iou_thresholds)?;
        Ok(self)
    }
}
