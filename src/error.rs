//! Error types for the coco-match library.

use thiserror::Error;

/// Result type for coco-match operations.
pub type Result<T> = std::result::Result<T, CocoMatchError>;

/// Error types that can occur while matching detections.
#[derive(Error, Debug)]
pub enum CocoMatchError {
    /// Error during JSON parsing or serialization.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Error during I/O operations.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// A configured detection field is absent on a sample.
    #[error("Missing field: sample {sample_id} has no '{field}' field")]
    MissingField { sample_id: u64, field: String },

    /// A detection cannot be evaluated. The whole sample is rejected.
    #[error("Malformed detection {detection_id} in field '{field}' of sample {sample_id}: {reason}")]
    MalformedDetection {
        sample_id: u64,
        field: String,
        detection_id: u64,
        reason: String,
    },

    /// Sample data that cannot be loaded as a dataset.
    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    /// Invalid IoU threshold or threshold sweep.
    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),

    /// Invalid evaluation configuration.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}
