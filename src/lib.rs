//! # coco-match
//!
//! A Rust library for matching predicted object detections to ground truth,
//! sample by sample, across a sweep of IoU thresholds.
//!
//! For every sample the library:
//! - Groups predictions and ground truths by label
//! - Computes IoU between every prediction and ground truth of a label, using
//!   intersection over prediction area for crowd regions
//! - Greedily assigns predictions to ground truths in confidence order,
//!   independently at each IoU threshold
//! - Counts true positives, false positives and false negatives per threshold
//!
//! No rank-based metric such as average precision is computed; the output is
//! per-threshold counts and per-detection match assignments.
//!
//! ## Quick Start
//!
//! ```rust
//! use coco_match::{evaluate, EvalConfig, MemoryStore};
//! use coco_match::types::{Detection, Sample};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let sample = Sample::new(1)
//!     .with_field("predictions", vec![
//!         Detection::new(1, "cat", vec![10.0, 10.0, 50.0, 50.0]).with_confidence(0.9),
//!     ])
//!     .with_field("ground_truth", vec![
//!         Detection::new(1, "cat", vec![10.0, 10.0, 50.0, 50.0]),
//!     ]);
//!
//! let mut store = MemoryStore::new();
//! evaluate(vec![sample], EvalConfig::default(), &mut store)?;
//!
//! let result = &store.evaluations()[0];
//! println!("TP@0.75: {:?}", result.tp_iou75);
//! # Ok(())
//! # }
//! ```
//!
//! ## Sample Format
//!
//! Samples are loaded from JSON documents of this shape:
//!
//! ```json
//! {
//!   "samples": [
//!     {
//!       "id": 1,
//!       "fields": {
//!         "predictions": {
//!           "detections": [
//!             {"id": 1, "label": "cat", "bounding_box": [x, y, width, height], "confidence": 0.9}
//!           ]
//!         },
//!         "ground_truth": {
//!           "detections": [
//!             {"id": 1, "label": "cat", "bounding_box": [x, y, width, height],
//!              "attributes": {"iscrowd": 0}}
//!           ]
//!         }
//!       }
//!     }
//!   ]
//! }
//! ```

pub mod error;
pub mod types;
pub mod config;
pub mod loader;
pub mod threshold;
pub mod metrics;
pub mod matching;
pub mod results;
pub mod store;
pub mod stats;
pub mod evaluator;

// Re-export commonly used types and functions
pub use error::{CocoMatchError, Result};
pub use types::{AttributeValue, BoundingBox, Detection, Detections, Sample, SampleDataset};
pub use config::{EvalConfig, FalseNegativeScope};
pub use loader::{load_from_file, load_from_string};
pub use threshold::{default_iou_thresholds, generate_threshold_range, ThresholdMap};
pub use matching::EvalId;
pub use results::{
    CategoryCounts, GroundTruthEval, MatchCounts, OverlapPair, PredictionEval,
    SampleEvaluation, ThresholdCounts,
};
pub use store::{JsonLinesStore, MemoryStore, SampleStore};
pub use stats::EvaluationStats;
pub use evaluator::{evaluate, SampleEvaluator};
