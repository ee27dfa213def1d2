//! Expanding significant markers into symmetric genomic windows

use crate::types::{GenomicWindow, MarkerRecord};

/// Closed window `[max(0, pos - w), pos + w]` around one marker.
///
/// The start clips at 0 near the chromosome head; there is no upper clip
/// because chromosome lengths are not known here.
pub fn expand_marker(record: &MarkerRecord, half_width: u64) -> GenomicWindow {
    GenomicWindow {
        chromosome: record.chromosome.clone(),
        start: record.position.saturating_sub(half_width),
        end: record.position.saturating_add(half_width),
    }
}

/// Expand every marker, preserving order. Overlapping windows are kept as
/// separate queries; merging them is not this stage's concern.
pub fn expand_windows(records: &[MarkerRecord], half_width: u64) -> Vec<GenomicWindow> {
    records
        .iter()
        .map(|record| expand_marker(record, half_width))
        .collect()
}
