//! Core data types for selection-signature scans
//!
//! These are plain data structures shared by the merge, threshold, selection,
//! and annotation stages. They hold no file handles and no parsing logic.

use std::cmp::Ordering;
use std::fmt;

/// Marker identifier (e.g., SNP name or locus id)
pub type MarkerId = String;

/// Population label (e.g., "JM", "RW")
pub type Population = String;

/// One genome-scan observation: a marker with its haplotype-score statistics.
///
/// Records are immutable once loaded. `abs_score` is always recomputed from
/// `raw_score` during loading; an absolute-score column supplied by upstream
/// input is only used for cross-checking.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerRecord {
    /// Chromosome label, kept as text (not assumed numeric across datasets)
    pub chromosome: String,
    /// Marker identifier
    pub marker_id: MarkerId,
    /// Third input column, carried through unchanged (not interpreted)
    pub aux: String,
    /// Genomic coordinate in bp
    pub position: u64,
    /// First allele-frequency column, carried through as text
    pub freq1: String,
    /// Second allele-frequency column, carried through as text
    pub freq2: String,
    /// Raw haplotype score as computed upstream
    pub raw_score: f64,
    /// Absolute value of `raw_score`
    pub abs_score: f64,
    /// Trailing column of 9-field inputs, when present
    pub extra: Option<String>,
}

/// Closed genomic interval derived from a significant marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenomicWindow {
    pub chromosome: String,
    /// Window start in bp, clipped at 0
    pub start: u64,
    /// Window end in bp (chromosome length is not known, so no upper clip)
    pub end: u64,
}

/// An input irregularity that was skipped or corrected during loading.
///
/// Warnings are collected and returned alongside results; each one is also
/// emitted as a `tracing` event at the site that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadWarning {
    /// File or source the warning refers to
    pub file: String,
    /// 1-based line number, when known
    pub line: Option<u64>,
    pub message: String,
}

impl LoadWarning {
    pub fn new(file: impl Into<String>, line: Option<u64>, message: impl Into<String>) -> Self {
        LoadWarning {
            file: file.into(),
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}: {}", self.file, line, self.message),
            None => write!(f, "{}: {}", self.file, self.message),
        }
    }
}

/// Compare chromosome labels naturally: numeric labels in numeric order
/// first, non-numeric labels (X, MT, scaffolds) lexically after.
pub fn natural_chrom_cmp(a: &str, b: &str) -> Ordering {
    let a_num: Option<u32> = a
        .trim_start_matches(|c: char| !c.is_numeric())
        .parse()
        .ok();
    let b_num: Option<u32> = b
        .trim_start_matches(|c: char| !c.is_numeric())
        .parse()
        .ok();
    match (a_num, b_num) {
        (Some(an), Some(bn)) => an.cmp(&bn),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}
