//! Outlier threshold from the absolute-score distribution
//!
//! The cutoff is `mean + k * sd` over a population's absolute scores, with
//! `sd` the sample (n-1) estimator. The reference criterion is k = 3; k stays
//! configurable rather than baked in.

use crate::error::{Result, SweepError};

/// Result of threshold estimation for one population.
#[derive(Debug, Clone)]
pub struct ThresholdResult {
    /// Mean of the usable absolute scores
    pub mean: f64,
    /// Sample (n-1) standard deviation
    pub std_dev: f64,
    /// Multiplier applied to the standard deviation
    pub k: f64,
    /// `mean + k * std_dev`
    pub threshold: f64,
    /// Number of scores used
    pub n_used: usize,
    /// Number of NaN/non-finite scores excluded
    pub n_excluded: usize,
}

/// Estimate the outlier cutoff `mean + k * sd` over `scores`.
///
/// Non-finite scores are excluded rather than propagated. Fails with
/// `InsufficientData` when fewer than two usable observations remain.
pub fn sigma_threshold(scores: &[f64], k: f64) -> Result<ThresholdResult> {
    let valid: Vec<f64> = scores.iter().copied().filter(|s| s.is_finite()).collect();
    let n_used = valid.len();
    let n_excluded = scores.len() - n_used;

    if n_used < 2 {
        return Err(SweepError::InsufficientData { observed: n_used });
    }

    let n = n_used as f64;
    let mean = valid.iter().sum::<f64>() / n;
    let variance = valid.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std_dev = variance.sqrt();

    Ok(ThresholdResult {
        mean,
        std_dev,
        k,
        threshold: mean + k * std_dev,
        n_used,
        n_excluded,
    })
}

/// Pretty-print per-population thresholds to stderr.
pub fn print_thresholds(rows: &[(String, ThresholdResult)]) {
    if rows.is_empty() {
        eprintln!("No thresholds calculated.");
        return;
    }

    eprintln!("\nThresholds (mean + k*sd of |score|):");
    eprintln!(
        "{:<14} {:>10} {:>10} {:>6} {:>12} {:>10} {:>10}",
        "Population", "Mean", "SD", "k", "Threshold", "n", "excluded"
    );
    eprintln!("{}", "-".repeat(78));

    for (population, t) in rows {
        eprintln!(
            "{:<14} {:>10.4} {:>10.4} {:>6.1} {:>12.4} {:>10} {:>10}",
            population, t.mean, t.std_dev, t.k, t.threshold, t.n_used, t.n_excluded
        );
    }
}
