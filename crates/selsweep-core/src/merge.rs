//! Merging chromosome-partitioned score files into one ordered table
//!
//! Upstream scans emit one score file per chromosome per population, named
//! `<population>_chr<N>…`. The merge concatenates them in chromosome-number
//! order 1..=max. Ordering *within* a partition is taken as-is from the file.

use std::collections::HashMap;
use std::path::Path;

use tracing::warn;

use crate::error::Result;
use crate::io::{chromosome_from_filename, push_warning, read_partition};
use crate::types::{LoadWarning, MarkerRecord};

/// Result of merging one population's chromosome partitions.
#[derive(Debug)]
pub struct MergeOutcome {
    /// All records, in chromosome order then partition order
    pub records: Vec<MarkerRecord>,
    /// Irregularities encountered while scanning and reading files
    pub warnings: Vec<LoadWarning>,
    /// Number of partition files read
    pub files_merged: usize,
}

/// Concatenate per-chromosome record lists in chromosome-number order.
///
/// Chromosomes without a partition contribute nothing; partitions keyed
/// outside `1..=max_chromosome` are ignored here (the directory scan warns
/// about them).
pub fn merge_partitions(
    mut partitions: HashMap<u32, Vec<MarkerRecord>>,
    max_chromosome: u32,
) -> Vec<MarkerRecord> {
    let mut merged = Vec::new();
    for chromosome in 1..=max_chromosome {
        if let Some(records) = partitions.remove(&chromosome) {
            merged.extend(records);
        }
    }
    merged
}

/// Find and merge all of `population`'s partition files under `dir`.
///
/// Files are matched by the `<population>_` prefix. A file whose name has no
/// parseable `_chr<N>` tag is skipped with a warning, as is a second file for
/// a chromosome already seen (the lexicographically first wins) and a
/// chromosome number outside `1..=max_chromosome`. A missing partition for an
/// in-range chromosome is noted as a warning and contributes no records.
pub fn merge_population_dir(
    dir: &Path,
    population: &str,
    max_chromosome: u32,
) -> Result<MergeOutcome> {
    let mut warnings = Vec::new();
    let prefix = format!("{}_", population);

    // sorted for deterministic duplicate resolution across platforms
    let mut names: Vec<String> = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();

    let mut partition_files: HashMap<u32, String> = HashMap::new();
    for name in names.iter().filter(|n| n.starts_with(&prefix)) {
        let Some(chromosome) = chromosome_from_filename(name) else {
            push_warning(
                &mut warnings,
                LoadWarning::new(
                    name.clone(),
                    None,
                    "cannot extract a chromosome number from the file name, skipping",
                ),
            );
            continue;
        };
        if chromosome == 0 || chromosome > max_chromosome {
            push_warning(
                &mut warnings,
                LoadWarning::new(
                    name.clone(),
                    None,
                    format!(
                        "chromosome {} outside the configured range 1..={}, skipping",
                        chromosome, max_chromosome
                    ),
                ),
            );
            continue;
        }
        if let Some(kept) = partition_files.get(&chromosome) {
            push_warning(
                &mut warnings,
                LoadWarning::new(
                    name.clone(),
                    None,
                    format!("duplicate partition for chromosome {}, keeping {}", chromosome, kept),
                ),
            );
            continue;
        }
        partition_files.insert(chromosome, name.clone());
    }

    let mut partitions: HashMap<u32, Vec<MarkerRecord>> = HashMap::new();
    let mut files_merged = 0;
    for chromosome in 1..=max_chromosome {
        let Some(name) = partition_files.get(&chromosome) else {
            push_warning(
                &mut warnings,
                LoadWarning::new(
                    dir.display().to_string(),
                    None,
                    format!("no partition file for chromosome {}", chromosome),
                ),
            );
            continue;
        };
        let label = chromosome.to_string();
        let (records, mut file_warnings) = read_partition(&dir.join(name), &label)?;
        warnings.append(&mut file_warnings);
        partitions.insert(chromosome, records);
        files_merged += 1;
    }

    if files_merged == 0 {
        warn!(population, dir = %dir.display(), "no partition files found");
    }

    Ok(MergeOutcome {
        records: merge_partitions(partitions, max_chromosome),
        warnings,
        files_merged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_marker(chromosome: &str, marker_id: &str, position: u64, raw: f64) -> MarkerRecord {
        MarkerRecord {
            chromosome: chromosome.to_string(),
            marker_id: marker_id.to_string(),
            aux: ".".to_string(),
            position,
            freq1: "0.5".to_string(),
            freq2: "0.5".to_string(),
            raw_score: raw,
            abs_score: raw.abs(),
            extra: None,
        }
    }

    #[test]
    fn test_merge_partitions_orders_by_chromosome_number() {
        let mut partitions = HashMap::new();
        partitions.insert(10, vec![make_marker("10", "c", 10, 1.0)]);
        partitions.insert(2, vec![make_marker("2", "b", 20, 1.0)]);
        partitions.insert(1, vec![
            make_marker("1", "a1", 5, 1.0),
            make_marker("1", "a2", 1, 1.0), // within-partition order untouched
        ]);

        let merged = merge_partitions(partitions, 29);
        let ids: Vec<&str> = merged.iter().map(|m| m.marker_id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "a2", "b", "c"]);
    }

    #[test]
    fn test_merge_partitions_missing_chromosomes_are_empty() {
        let mut partitions = HashMap::new();
        partitions.insert(5, vec![make_marker("5", "x", 1, 2.0)]);
        let merged = merge_partitions(partitions, 29);
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn test_merge_population_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("JM_chr2_scores.norm"),
            "snp3\t.\t300\t0.9\t0.1\t-4.0\t4.0\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("JM_chr1_scores.norm"),
            "snp1\t.\t100\t0.9\t0.1\t1.0\t1.0\nsnp2\t.\t200\t0.8\t0.2\t-2.0\t2.0\n",
        )
        .unwrap();
        // other population, ignored
        std::fs::write(
            dir.path().join("RW_chr1_scores.norm"),
            "other\t.\t1\t0.5\t0.5\t9.0\t9.0\n",
        )
        .unwrap();
        // no chromosome tag, skipped with a warning
        std::fs::write(dir.path().join("JM_summary.txt"), "not a partition\n").unwrap();

        let outcome = merge_population_dir(dir.path(), "JM", 3).unwrap();
        assert_eq!(outcome.files_merged, 2);
        let ids: Vec<&str> = outcome.records.iter().map(|m| m.marker_id.as_str()).collect();
        assert_eq!(ids, vec!["snp1", "snp2", "snp3"]);
        assert_eq!(outcome.records[0].chromosome, "1");
        assert_eq!(outcome.records[2].chromosome, "2");

        let messages: Vec<&str> = outcome.warnings.iter().map(|w| w.message.as_str()).collect();
        assert!(messages.iter().any(|m| m.contains("cannot extract")));
        // chromosome 3 has no partition
        assert!(messages.iter().any(|m| m.contains("no partition file for chromosome 3")));
    }

    #[test]
    fn test_out_of_range_chromosome_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("JM_chr1_scores.norm"),
            "snp1\t.\t100\t0.9\t0.1\t1.0\t1.0\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("JM_chr30_scores.norm"),
            "snp2\t.\t100\t0.9\t0.1\t1.0\t1.0\n",
        )
        .unwrap();

        let outcome = merge_population_dir(dir.path(), "JM", 29).unwrap();
        assert_eq!(outcome.records.len(), 1);
        assert!(outcome
            .warnings
            .iter()
            .any(|w| w.message.contains("outside the configured range")));
    }

    #[test]
    fn test_duplicate_partition_first_wins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("JM_chr1_a.norm"),
            "first\t.\t100\t0.9\t0.1\t1.0\t1.0\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("JM_chr1_b.norm"),
            "second\t.\t100\t0.9\t0.1\t1.0\t1.0\n",
        )
        .unwrap();

        let outcome = merge_population_dir(dir.path(), "JM", 1).unwrap();
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].marker_id, "first");
        assert!(outcome
            .warnings
            .iter()
            .any(|w| w.message.contains("duplicate partition")));
    }
}
