//! selsweep-pipeline: the per-population scan orchestrator
//!
//! Runs the full merge -> threshold -> select -> window -> annotate sequence
//! for every configured population. Populations are independent: they share
//! no mutable state, run in parallel, and one population's failure (for
//! example too few markers for a threshold) never aborts the others. The only
//! error that stops the whole run is an unusable configuration, such as an
//! unreadable feature catalogue.
//!
//! ## Output layout
//!
//! Under the configured output directory:
//! - `merged/{pop}_merged_scores.tsv` (headerless merged table)
//! - `significant_hits/{pop}_significant_hits.tsv`
//! - `regions/{pop}_regions.tsv`
//! - `annotation/{pop}_annotated_features.tsv` (when a catalogue is given)
//!
//! ## Example
//! ```ignore
//! use selsweep_pipeline::{run_pipeline, PipelineConfig};
//!
//! let summary = run_pipeline(&PipelineConfig {
//!     input_dir: "scans/".into(),
//!     output_dir: "out/".into(),
//!     populations: vec!["JM".into(), "RW".into()],
//!     max_chromosome: 29,
//!     k: 3.0,
//!     half_width: 25_000,
//!     annotation: Some("genes.gff".into()),
//! })?;
//! for report in summary.succeeded() {
//!     println!("{}: {} significant markers", report.population, report.n_significant);
//! }
//! ```

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use rayon::prelude::*;
use tracing::warn;

use selsweep_annotate::{
    distinct_feature_count, join_windows, load_features, write_annotation_table, FeatureInterval,
};
use selsweep_core::io::{write_hits_table, write_merged_table, write_windows_table};
use selsweep_core::{
    expand_windows, merge_population_dir, significant_markers, sigma_threshold, LoadWarning,
    ThresholdResult,
};

/// Everything the orchestrator needs for one run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory holding the per-chromosome score files
    pub input_dir: PathBuf,
    /// Root of the output tree
    pub output_dir: PathBuf,
    /// Population labels to scan
    pub populations: Vec<String>,
    /// Highest chromosome number expected in the input (merge order 1..=max)
    pub max_chromosome: u32,
    /// Sigma multiplier of the outlier cutoff
    pub k: f64,
    /// Window half-width around each significant marker, in bp
    pub half_width: u64,
    /// Feature catalogue (GFF3) to annotate regions against, if any
    pub annotation: Option<PathBuf>,
}

/// What one population's scan produced.
#[derive(Debug)]
pub struct PopulationReport {
    pub population: String,
    /// Markers in the merged table
    pub n_markers: usize,
    pub threshold: ThresholdResult,
    pub n_significant: usize,
    /// Annotation hit rows, when a catalogue was joined
    pub n_annotation_hits: Option<usize>,
    /// Distinct features among those hits
    pub n_distinct_features: Option<usize>,
    /// Input irregularities encountered along the way
    pub warnings: Vec<LoadWarning>,
    pub merged_path: PathBuf,
    pub hits_path: PathBuf,
    pub regions_path: PathBuf,
    pub annotation_path: Option<PathBuf>,
}

/// Per-population result, success or failure.
#[derive(Debug)]
pub struct PopulationOutcome {
    pub population: String,
    pub result: anyhow::Result<PopulationReport>,
}

/// All per-population outcomes of one run.
#[derive(Debug)]
pub struct PipelineSummary {
    pub outcomes: Vec<PopulationOutcome>,
}

impl PipelineSummary {
    /// Reports of the populations that completed.
    pub fn succeeded(&self) -> impl Iterator<Item = &PopulationReport> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }

    /// Labels and errors of the populations that failed.
    pub fn failed(&self) -> impl Iterator<Item = (&str, &anyhow::Error)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.population.as_str(), e)))
    }
}

/// Scan one population: merge its partitions, estimate the cutoff, select
/// hits, expand them into windows, and (given a catalogue) annotate them.
///
/// Writes this population's output tables as it goes; other populations'
/// files are untouched.
pub fn run_population(
    config: &PipelineConfig,
    population: &str,
    features: Option<&[FeatureInterval]>,
) -> anyhow::Result<PopulationReport> {
    let mut outcome = merge_population_dir(&config.input_dir, population, config.max_chromosome)
        .with_context(|| format!("merging score files for {}", population))?;

    let merged_dir = config.output_dir.join("merged");
    let hits_dir = config.output_dir.join("significant_hits");
    let regions_dir = config.output_dir.join("regions");
    fs::create_dir_all(&merged_dir)?;
    fs::create_dir_all(&hits_dir)?;
    fs::create_dir_all(&regions_dir)?;

    let merged_path = merged_dir.join(format!("{}_merged_scores.tsv", population));
    write_merged_table(&merged_path, &outcome.records)
        .with_context(|| format!("writing {}", merged_path.display()))?;
    eprintln!(
        "[{}] merged {} markers from {} file(s)",
        population,
        outcome.records.len(),
        outcome.files_merged
    );

    let abs_scores: Vec<f64> = outcome.records.iter().map(|r| r.abs_score).collect();
    let threshold = sigma_threshold(&abs_scores, config.k)
        .with_context(|| format!("estimating the threshold for {}", population))?;

    let hits = significant_markers(&outcome.records, threshold.threshold);
    let hits_path = hits_dir.join(format!("{}_significant_hits.tsv", population));
    write_hits_table(&hits_path, &hits).with_context(|| format!("writing {}", hits_path.display()))?;
    eprintln!(
        "[{}] threshold {:.4} -> {} significant marker(s)",
        population,
        threshold.threshold,
        hits.len()
    );

    let windows = expand_windows(&hits, config.half_width);
    let regions_path = regions_dir.join(format!("{}_regions.tsv", population));
    write_windows_table(&regions_path, &windows)
        .with_context(|| format!("writing {}", regions_path.display()))?;

    let mut annotation_path = None;
    let mut n_annotation_hits = None;
    let mut n_distinct_features = None;
    if let Some(features) = features {
        let annotation_dir = config.output_dir.join("annotation");
        fs::create_dir_all(&annotation_dir)?;

        let annotated = join_windows(&windows, features);
        let path = annotation_dir.join(format!("{}_annotated_features.tsv", population));
        write_annotation_table(&path, &annotated)
            .with_context(|| format!("writing {}", path.display()))?;
        eprintln!(
            "[{}] {} annotation hit(s), {} distinct feature(s)",
            population,
            annotated.len(),
            distinct_feature_count(&annotated)
        );

        n_annotation_hits = Some(annotated.len());
        n_distinct_features = Some(distinct_feature_count(&annotated));
        annotation_path = Some(path);
    }

    Ok(PopulationReport {
        population: population.to_string(),
        n_markers: outcome.records.len(),
        threshold,
        n_significant: hits.len(),
        n_annotation_hits,
        n_distinct_features,
        warnings: std::mem::take(&mut outcome.warnings),
        merged_path,
        hits_path,
        regions_path,
        annotation_path,
    })
}

/// Run the scan for every configured population, in parallel.
///
/// The feature catalogue is loaded once and shared read-only across the
/// population tasks. Per-population failures are collected in the summary
/// rather than propagated.
pub fn run_pipeline(config: &PipelineConfig) -> anyhow::Result<PipelineSummary> {
    if config.populations.is_empty() {
        anyhow::bail!("no populations configured");
    }
    if config.max_chromosome == 0 {
        anyhow::bail!("max chromosome must be at least 1");
    }

    let features: Option<Arc<[FeatureInterval]>> = match &config.annotation {
        Some(path) => {
            let (features, warnings) = load_features(path)
                .with_context(|| format!("loading feature catalogue {}", path.display()))?;
            if !warnings.is_empty() {
                warn!(
                    catalogue = %path.display(),
                    skipped = warnings.len(),
                    "skipped malformed catalogue records"
                );
            }
            eprintln!("Loaded {} features from {}", features.len(), path.display());
            Some(features.into())
        }
        None => None,
    };

    let outcomes: Vec<PopulationOutcome> = config
        .populations
        .par_iter()
        .map(|population| {
            let result = run_population(config, population, features.as_deref());
            if let Err(err) = &result {
                warn!(population = population.as_str(), error = %err, "population scan failed");
            }
            PopulationOutcome {
                population: population.clone(),
                result,
            }
        })
        .collect();

    Ok(PipelineSummary { outcomes })
}
