//! JSON loading utilities for sample datasets.

use crate::error::{CocoMatchError, Result};
use crate::types::SampleDataset;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Load a sample dataset from a JSON file.
///
/// # Arguments
///
/// * `path` - Path to a JSON document of the form `{"samples": [...]}`
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if two samples
/// share an id. Detections are not validated here; a malformed detection
/// fails only the sample that holds it, at evaluation time.
///
/// # Example
///
/// ```no_run
/// use coco_match::loader::load_from_file;
///
/// let dataset = load_from_file("samples.json").unwrap();
/// println!("Loaded {} samples", dataset.samples.len());
/// ```
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<SampleDataset> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let dataset: SampleDataset = serde_json::from_reader(reader)?;

    validate_dataset(&dataset)?;

    Ok(dataset)
}

/// Load a sample dataset from a JSON string.
///
/// # Example
///
/// ```
/// use coco_match::loader::load_from_string;
///
/// let json = r#"{
///     "samples": [
///         {"id": 1, "fields": {"predictions": {"detections": []}}}
///     ]
/// }"#;
/// let dataset = load_from_string(json).unwrap();
/// assert_eq!(dataset.samples.len(), 1);
/// ```
pub fn load_from_string(json_str: &str) -> Result<SampleDataset> {
    let dataset: SampleDataset = serde_json::from_str(json_str)?;
    validate_dataset(&dataset)?;
    Ok(dataset)
}

/// Validate that sample ids are unique.
fn validate_dataset(dataset: &SampleDataset) -> Result<()> {
    let mut seen = HashSet::with_capacity(dataset.samples.len());
    for sample in &dataset.samples {
        if !seen.insert(sample.id) {
            return Err(CocoMatchError::InvalidDataset(
                format!("Sample id {} appears more than once", sample.id)
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_from_string() {
        let json = r#"{
            "samples": [
                {
                    "id": 1,
                    "filepath": "/data/1.jpg",
                    "fields": {
                        "predictions": {
                            "detections": [
                                {"id": 1, "label": "cat", "bounding_box": [10.0, 20.0, 30.0, 40.0], "confidence": 0.8}
                            ]
                        },
                        "ground_truth": {"detections": []}
                    }
                }
            ]
        }"#;

        let dataset = load_from_string(json).unwrap();
        assert_eq!(dataset.samples.len(), 1);
        assert_eq!(dataset.samples[0].filepath.as_deref(), Some("/data/1.jpg"));
        assert_eq!(dataset.samples[0].field("predictions").unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_sample_ids() {
        let json = r#"{"samples": [{"id": 3}, {"id": 3}]}"#;

        let result = load_from_string(json);
        assert!(matches!(result, Err(CocoMatchError::InvalidDataset(_))));
    }

    #[test]
    fn test_malformed_boxes_are_left_for_evaluation() {
        let json = r#"{
            "samples": [{
                "id": 1,
                "fields": {"predictions": {"detections": [
                    {"id": 1, "label": "cat", "bounding_box": [1.0, 2.0]}
                ]}}
            }]
        }"#;

        assert!(load_from_string(json).is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"samples": [{{"id": 1}}, {{"id": 2}}]}}"#).unwrap();

        let dataset = load_from_file(file.path()).unwrap();
        assert_eq!(dataset.samples.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_from_file("/nonexistent/samples.json");
        assert!(matches!(result, Err(CocoMatchError::IoError(_))));
    }
}
