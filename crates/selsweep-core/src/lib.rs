//! selsweep-core: data model and statistics for selection-signature scans
//!
//! This crate holds the in-memory half of the selsweep pipeline: merging
//! chromosome-partitioned score files into one ordered per-population table,
//! estimating the outlier threshold over absolute scores, selecting
//! significant markers, and expanding hits into genomic windows. Interval
//! annotation lives in `selsweep-annotate`; orchestration across populations
//! lives in `selsweep-pipeline`.
//!
//! ## Features
//! - 7/8/9-field score-file layouts, resolved once per file
//! - Absolute scores recomputed from raw scores, never trusted from input
//! - Chromosome-number merge ordering with missing partitions tolerated
//! - mean + k*sd outlier threshold with the sample (n-1) estimator
//! - Warnings collected per run and mirrored as `tracing` events
//! - Transparent gzip input
//!
//! ## Module Organization
//! - `types`: core data types (MarkerRecord, GenomicWindow, LoadWarning)
//! - `error`: SweepError and the crate Result alias
//! - `io`: score-table reading/writing and schema detection
//! - `merge`: chromosome-partition merge (one ordered table per population)
//! - `threshold`: mean + k*sd outlier cutoff
//! - `select`: significant-marker filter
//! - `window`: marker-to-window expansion
//!
//! ## Example
//! ```ignore
//! use selsweep_core::{merge_population_dir, sigma_threshold, significant_markers, expand_windows};
//!
//! let outcome = merge_population_dir("scans/".as_ref(), "JM", 29)?;
//! let abs: Vec<f64> = outcome.records.iter().map(|r| r.abs_score).collect();
//! let cutoff = sigma_threshold(&abs, 3.0)?;
//! let hits = significant_markers(&outcome.records, cutoff.threshold);
//! let windows = expand_windows(&hits, 25_000);
//! ```

pub mod error;
pub mod io;
pub mod merge;
pub mod select;
pub mod threshold;
pub mod types;
pub mod window;

pub use error::{Result, SweepError};
pub use merge::{merge_partitions, merge_population_dir, MergeOutcome};
pub use select::significant_markers;
pub use threshold::{print_thresholds, sigma_threshold, ThresholdResult};
pub use types::{natural_chrom_cmp, GenomicWindow, LoadWarning, MarkerId, MarkerRecord, Population};
pub use window::{expand_marker, expand_windows};
