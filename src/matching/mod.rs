//! Detection matching for a single sample.
//!
//! Matching runs in four steps:
//!
//! 1. [`EvalIdAllocator`] gives every prediction, then every ground truth, a
//!    sample-local [`EvalId`].
//! 2. [`group_by_category`] buckets detections by label.
//! 3. [`build_overlaps`] sorts each bucket's predictions by confidence and
//!    records their overlaps with the bucket's ground truths.
//! 4. [`ThresholdMatcher`] assigns predictions to ground truths greedily,
//!    independently for each IoU threshold.

pub mod eval_id;
pub mod greedy;
pub mod grouping;
pub mod overlap;

pub use eval_id::{EvalId, EvalIdAllocator};
pub use greedy::ThresholdMatcher;
pub use grouping::{group_by_category, CategoryBucket};
pub use overlap::build_overlaps;
