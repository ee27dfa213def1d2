//! Selecting markers above the outlier threshold

use crate::types::MarkerRecord;

/// Markers whose absolute score strictly exceeds `threshold`, in their
/// original relative order. An empty result is a valid outcome, not an error.
pub fn significant_markers(records: &[MarkerRecord], threshold: f64) -> Vec<MarkerRecord> {
    records
        .iter()
        .filter(|r| r.abs_score > threshold)
        .cloned()
        .collect()
}
