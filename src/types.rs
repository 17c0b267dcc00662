//! Core data types for samples and their detections.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Represents a bounding box in COCO format (x, y, width, height).
///
/// Coordinates are in LTWH (Left-Top-Width-Height) format where:
/// - x: Left coordinate
/// - y: Top coordinate
/// - width: Box width
/// - height: Box height
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Get the area of the bounding box.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Get the right coordinate (x + width).
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Get the bottom coordinate (y + height).
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// A detection attribute value.
///
/// Attributes arrive from annotation tools in loosely typed form, so
/// booleans, integers, floats and strings are all accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl AttributeValue {
    /// Interpret the value as a flag. Numbers are true when non-zero.
    pub fn is_truthy(&self) -> bool {
        match self {
            AttributeValue::Bool(b) => *b,
            AttributeValue::Int(i) => *i != 0,
            AttributeValue::Float(f) => *f != 0.0,
            AttributeValue::Text(s) => {
                let s = s.trim();
                match s.parse::<f64>() {
                    Ok(v) => v != 0.0,
                    Err(_) => s.eq_ignore_ascii_case("true"),
                }
            }
        }
    }
}

/// A single predicted or ground truth object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Identifier, unique within the owning collection
    pub id: u64,
    pub label: String,
    /// Bounding box in [x, y, width, height] format
    pub bounding_box: Vec<f64>,
    /// Confidence score (for predictions)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl Detection {
    /// Create a detection without confidence or attributes.
    pub fn new(id: u64, label: impl Into<String>, bounding_box: Vec<f64>) -> Self {
        Self {
            id,
            label: label.into(),
            bounding_box,
            confidence: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Set the confidence score.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Set an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// Convert the bounding box array to a `BoundingBox`.
    ///
    /// Returns `None` when the array does not hold exactly 4 values.
    pub fn to_bbox(&self) -> Option<BoundingBox> {
        match self.bounding_box.as_slice() {
            &[x, y, width, height] => Some(BoundingBox::new(x, y, width, height)),
            _ => None,
        }
    }

    /// Whether the attribute named `crowd_attribute` marks this detection as a crowd region.
    pub fn is_crowd(&self, crowd_attribute: &str) -> bool {
        self.attributes
            .get(crowd_attribute)
            .is_some_and(AttributeValue::is_truthy)
    }
}

/// A named collection of detections on a sample.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Detections {
    pub detections: Vec<Detection>,
}

impl Detections {
    pub fn new(detections: Vec<Detection>) -> Self {
        Self { detections }
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }
}

/// A data sample holding any number of named detection fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filepath: Option<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, Detections>,
}

impl Sample {
    /// Create a sample with no fields.
    pub fn new(id: u64) -> Self {
        Self {
            id,
            filepath: None,
            fields: BTreeMap::new(),
        }
    }

    /// Add or replace a detection field.
    pub fn with_field(mut self, name: impl Into<String>, detections: Vec<Detection>) -> Self {
        self.fields.insert(name.into(), Detections::new(detections));
        self
    }

    /// Look up a detection field by name.
    pub fn field(&self, name: &str) -> Option<&Detections> {
        self.fields.get(name)
    }
}

/// A set of samples as stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SampleDataset {
    pub samples: Vec<Sample>,
}
