//! Overlap metrics used for matching.

pub mod iou;

pub use iou::{calculate_crowd_iou, calculate_iou, calculate_iou_matrix};
