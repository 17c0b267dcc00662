//! IoU threshold sweeps and threshold-keyed mappings.

use crate::error::{CocoMatchError, Result};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// IoU threshold whose counts are mirrored as flat scalars on each sample.
pub const SUMMARY_IOU_THRESHOLD: f64 = 0.75;

/// Tolerance used when looking a threshold up by value.
const THRESHOLD_EPSILON: f64 = 1e-6;

/// Default COCO sweep: 0.50, 0.55, ..., 0.95.
///
/// # Example
///
/// ```
/// use coco_match::threshold::default_iou_thresholds;
///
/// let thresholds = default_iou_thresholds();
/// assert_eq!(thresholds.len(), 10);
/// assert_eq!(thresholds[0], 0.5);
/// assert_eq!(thresholds[5], 0.75);
/// assert_eq!(thresholds[9], 0.95);
/// ```
pub fn default_iou_thresholds() -> Vec<f64> {
    (0..10).map(|i| (50 + 5 * i) as f64 / 100.0).collect()
}

/// Generate a range of threshold values for evaluation.
///
/// # Arguments
///
/// * `start` - Starting threshold value (inclusive)
/// * `end` - Ending threshold value (inclusive)
/// * `steps` - Number of threshold values to generate
///
/// # Returns
///
/// Returns a vector of evenly-spaced threshold values, rounded to six decimals.
///
/// # Example
///
/// ```
/// use coco_match::threshold::generate_threshold_range;
///
/// let thresholds = generate_threshold_range(0.5, 0.95, 10).unwrap();
/// assert_eq!(thresholds.len(), 10);
/// assert_eq!(thresholds[3], 0.65);
/// ```
pub fn generate_threshold_range(start: f64, end: f64, steps: usize) -> Result<Vec<f64>> {
    if steps == 0 {
        return Err(CocoMatchError::InvalidThreshold(
            "Number of steps must be greater than 0".to_string()
        ));
    }

    validate_threshold(start)?;
    validate_threshold(end)?;

    if start > end {
        return Err(CocoMatchError::InvalidThreshold(
            format!("Start threshold ({}) must be <= end threshold ({})", start, end)
        ));
    }

    if steps == 1 {
        return Ok(vec![normalize_threshold(start)]);
    }

    let step_size = (end - start) / (steps - 1) as f64;
    Ok((0..steps)
        .map(|i| normalize_threshold(start + step_size * i as f64))
        .collect())
}

/// Round a threshold to six decimals so that keys and lookups are stable.
pub fn normalize_threshold(threshold: f64) -> f64 {
    (threshold * 1e6).round() / 1e6
}

/// Validate a full sweep and return its normalized form.
///
/// The sweep must be non-empty, strictly increasing and within [0.0, 1.0].
pub fn validate_thresholds(thresholds: &[f64]) -> Result<Vec<f64>> {
    if thresholds.is_empty() {
        return Err(CocoMatchError::InvalidThreshold(
            "At least one IoU threshold is required".to_string()
        ));
    }

    let mut normalized = Vec::with_capacity(thresholds.len());
    for &threshold in thresholds {
        validate_threshold(threshold)?;
        let threshold = normalize_threshold(threshold);
        if let Some(&previous) = normalized.last() {
            if threshold <= previous {
                return Err(CocoMatchError::InvalidThreshold(format!(
                    "Thresholds must be strictly increasing, got {} after {}",
                    threshold, previous
                )));
            }
        }
        normalized.push(threshold);
    }

    Ok(normalized)
}

/// Validate that a threshold is in the valid range [0.0, 1.0].
fn validate_threshold(threshold: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(CocoMatchError::InvalidThreshold(
            format!("Threshold must be between 0.0 and 1.0, got {}", threshold)
        ));
    }
    Ok(())
}

/// String key used when a threshold becomes a map key, e.g. `"0.75"`.
pub fn threshold_key(threshold: f64) -> String {
    normalize_threshold(threshold).to_string()
}

/// An ordered mapping from IoU threshold to a value.
///
/// Entries keep the order of the sweep they were built from. Values for
/// different thresholds are fully independent of each other.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdMap<T> {
    entries: Vec<(f64, T)>,
}

impl<T> ThresholdMap<T> {
    /// Build a map with one value per threshold.
    pub fn from_fn(thresholds: &[f64], mut f: impl FnMut(f64) -> T) -> Self {
        Self {
            entries: thresholds.iter().map(|&t| (t, f(t))).collect(),
        }
    }

    /// Build a map pairing thresholds with values in order.
    pub fn from_values(thresholds: &[f64], values: impl IntoIterator<Item = T>) -> Self {
        let entries: Vec<(f64, T)> = thresholds.iter().copied().zip(values).collect();
        debug_assert_eq!(entries.len(), thresholds.len());
        Self { entries }
    }

    /// Build a map with the same value at every threshold.
    pub fn filled(thresholds: &[f64], value: T) -> Self
    where
        T: Clone,
    {
        Self::from_fn(thresholds, |_| value.clone())
    }

    /// Number of thresholds.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Position of `threshold` in the sweep, if present.
    pub fn position(&self, threshold: f64) -> Option<usize> {
        self.entries
            .iter()
            .position(|&(t, _)| (t - threshold).abs() < THRESHOLD_EPSILON)
    }

    /// Value at `threshold`, if the threshold is part of the sweep.
    pub fn get(&self, threshold: f64) -> Option<&T> {
        self.position(threshold).map(|idx| &self.entries[idx].1)
    }

    /// Value at position `idx` of the sweep.
    pub fn at(&self, idx: usize) -> &T {
        &self.entries[idx].1
    }

    /// Mutable value at position `idx` of the sweep.
    pub fn at_mut(&mut self, idx: usize) -> &mut T {
        &mut self.entries[idx].1
    }

    /// Thresholds in sweep order.
    pub fn thresholds(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|&(t, _)| t)
    }

    /// Values in sweep order.
    pub fn values(&self) -> impl Iterator<Item = &T> + '_ {
        self.entries.iter().map(|(_, v)| v)
    }

    /// `(threshold, value)` pairs in sweep order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, &T)> + '_ {
        self.entries.iter().map(|(t, v)| (*t, v))
    }
}

impl<T: Serialize> Serialize for ThresholdMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (threshold, value) in &self.entries {
            map.serialize_entry(&threshold_key(*threshold), value)?;
        }
        map.end()
    }
}
