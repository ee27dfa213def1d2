//! Interval join between query windows and the feature catalogue
//!
//! Chromosome groups are independent, so the join runs per chromosome (in
//! parallel via rayon) with a single sweep over both interval sets sorted by
//! start. Each overlapping (feature, window) pair is emitted exactly once;
//! the final ordering is feature input order, then window input order, which
//! keeps output byte-stable across runs and thread counts.

use std::collections::HashMap;

use rayon::prelude::*;

use selsweep_core::types::GenomicWindow;

use crate::gff::FeatureInterval;

/// One overlap between a reference feature and a query window.
///
/// The same feature overlapped by several windows yields one hit per window;
/// those are independent hit contexts and are all reported.
#[derive(Debug, Clone)]
pub struct AnnotationHit {
    pub feature: FeatureInterval,
    /// The window that produced this hit
    pub window: GenomicWindow,
}

/// Sweep one chromosome group. `win_idx`/`feat_idx` index into the full
/// input slices; returned pairs are (feature index, window index).
fn sweep_chromosome(
    windows: &[GenomicWindow],
    features: &[FeatureInterval],
    win_idx: &[usize],
    feat_idx: &[usize],
) -> Vec<(usize, usize)> {
    // start events for both sets; at equal starts features go first, which
    // fixes a deterministic processing order (the overlap set is the same
    // either way because the later interval sees the earlier one as active)
    let mut events: Vec<(u64, u8, usize)> = Vec::with_capacity(win_idx.len() + feat_idx.len());
    for &j in feat_idx {
        events.push((features[j].start, 0, j));
    }
    for &i in win_idx {
        events.push((windows[i].start, 1, i));
    }
    events.sort_unstable();

    let mut active_features: Vec<(u64, usize)> = Vec::new();
    let mut active_windows: Vec<(u64, usize)> = Vec::new();
    let mut pairs = Vec::new();

    for (start, kind, idx) in events {
        if kind == 0 {
            // a feature opens: drop windows that ended before it, pair with the rest
            active_windows.retain(|&(end, _)| end >= start);
            for &(_, win) in &active_windows {
                pairs.push((idx, win));
            }
            active_features.push((features[idx].end, idx));
        } else {
            active_features.retain(|&(end, _)| end >= start);
            for &(_, feat) in &active_features {
                pairs.push((feat, idx));
            }
            active_windows.push((windows[idx].end, idx));
        }
    }

    pairs
}

/// All (feature, window) overlaps on matching chromosomes.
pub fn join_windows(windows: &[GenomicWindow], features: &[FeatureInterval]) -> Vec<AnnotationHit> {
    let mut by_chrom: HashMap<&str, (Vec<usize>, Vec<usize>)> = HashMap::new();
    for (i, window) in windows.iter().enumerate() {
        by_chrom
            .entry(window.chromosome.as_str())
            .or_default()
            .0
            .push(i);
    }
    for (j, feature) in features.iter().enumerate() {
        by_chrom
            .entry(feature.chromosome.as_str())
            .or_default()
            .1
            .push(j);
    }

    let groups: Vec<(Vec<usize>, Vec<usize>)> = by_chrom.into_values().collect();
    let mut pairs: Vec<(usize, usize)> = groups
        .par_iter()
        .map(|(win_idx, feat_idx)| sweep_chromosome(windows, features, win_idx, feat_idx))
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect();

    pairs.sort_unstable();
    pairs
        .into_iter()
        .map(|(feat, win)| AnnotationHit {
            feature: features[feat].clone(),
            window: windows[win].clone(),
        })
        .collect()
}
