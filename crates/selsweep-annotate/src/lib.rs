//! Feature annotation for selection-scan windows
//!
//! Takes candidate regions produced by a genome scan and reports every
//! catalogue feature (GFF3) they touch.
//!
//! # Features
//!
//! - GFF3 catalogue loading with `Name`/`Dbxref` attribute extraction
//! - Parallel per-chromosome sweep-line interval join
//! - Feature-centric TSV reports with distinct-feature summaries
//!
//! # Module Organization
//!
//! - [`gff`]: catalogue parsing into [`FeatureInterval`] records
//! - [`join`]: window-to-feature overlap search
//! - [`report`]: TSV output and hit summaries
//!
//! # Example
//!
//! ```ignore
//! use selsweep_annotate::{join_windows, load_features};
//!
//! let (features, warnings) = load_features(Path::new("genes.gff"))?;
//! let hits = join_windows(&windows, &features);
//! for hit in &hits {
//!     println!("{} overlaps {}..{}", hit.feature.name, hit.window.start, hit.window.end);
//! }
//! ```

pub mod gff;
pub mod join;
pub mod report;

pub use gff::{load_features, FeatureInterval};
pub use join::{join_windows, AnnotationHit};
pub use report::{distinct_feature_count, write_annotation_table, ANNOTATION_HEADER};
