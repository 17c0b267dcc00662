//! Sample-local surrogate ids for detections.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a detection within one sample's evaluation pass.
///
/// Predictions and ground truths refer to each other only through these
/// ids, never through direct references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvalId(pub u64);

impl fmt::Display for EvalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands out strictly increasing [`EvalId`]s starting at zero.
///
/// Create one allocator per sample so ids never leak between samples.
///
/// # Example
///
/// ```
/// use coco_match::matching::{EvalId, EvalIdAllocator};
///
/// let mut ids = EvalIdAllocator::new();
/// assert_eq!(ids.allocate(), EvalId(0));
/// assert_eq!(ids.allocate(), EvalId(1));
/// assert_eq!(ids.allocated(), 2);
/// ```
#[derive(Debug, Default)]
pub struct EvalIdAllocator {
    next: u64,
}

impl EvalIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the next unused id.
    pub fn allocate(&mut self) -> EvalId {
        let id = EvalId(self.next);
        self.next += 1;
        id
    }

    /// Number of ids handed out so far.
    pub fn allocated(&self) -> u64 {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_strictly_increasing() {
        let mut ids = EvalIdAllocator::new();
        let allocated: Vec<EvalId> = (0..5).map(|_| ids.allocate()).collect();
        assert_eq!(allocated, (0..5).map(EvalId).collect::<Vec<_>>());
    }

    #[test]
    fn test_new_allocator_restarts_at_zero() {
        let mut first = EvalIdAllocator::new();
        first.allocate();
        first.allocate();

        let mut second = EvalIdAllocator::new();
        assert_eq!(second.allocate(), EvalId(0));
    }

    #[test]
    fn test_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&EvalId(12)).unwrap(), "12");
    }
}
