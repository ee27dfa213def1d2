//! Annotation report writer
//!
//! One row per (feature, window) hit, feature-centric: the coordinates are
//! the feature's own, so the same table reads as "which catalogue entries
//! fall near a selection signal". Repeated features across windows are kept;
//! `distinct_feature_count` gives the deduplicated tally for summaries.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use selsweep_core::error::Result;

use crate::join::AnnotationHit;

/// Column header for annotation tables.
pub const ANNOTATION_HEADER: &str =
    "chr\tstart\tend\tfeature_type\tfeature_name\tfeature_id\tfeature_source\tfeature_strand\tfeature_score\tfeature_phase\tfull_attributes";

/// Write annotation hits as a TSV table with a header row.
pub fn write_annotation_table(path: &Path, hits: &[AnnotationHit]) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "{}", ANNOTATION_HEADER)?;
    for hit in hits {
        let f = &hit.feature;
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            f.chromosome,
            f.start,
            f.end,
            f.feature_type,
            f.name,
            f.feature_id,
            f.source,
            f.strand,
            f.score,
            f.phase,
            f.attributes,
        )?;
    }
    writer.flush()?;
    Ok(())
}

/// Number of distinct features among the hits.
///
/// Two rows count as the same feature when coordinates, type, and attribute
/// string all match; a feature hit by several windows is counted once.
pub fn distinct_feature_count(hits: &[AnnotationHit]) -> usize {
    let mut seen: HashSet<(&str, u64, u64, &str, &str)> = HashSet::new();
    for hit in hits {
        let f = &hit.feature;
        seen.insert((
            f.chromosome.as_str(),
            f.start,
            f.end,
            f.feature_type.as_str(),
            f.attributes.as_str(),
        ));
    }
    seen.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gff::FeatureInterval;
    use selsweep_core::types::GenomicWindow;

    fn make_hit(chromosome: &str, start: u64, end: u64, name: &str) -> AnnotationHit {
        AnnotationHit {
            feature: FeatureInterval {
                chromosome: chromosome.to_string(),
                source: "RefSeq".to_string(),
                feature_type: "gene".to_string(),
                start,
                end,
                score: ".".to_string(),
                strand: "-".to_string(),
                phase: ".".to_string(),
                attributes: format!("ID=gene-{0};Name={0}", name),
                name: name.to_string(),
                feature_id: String::new(),
            },
            window: GenomicWindow {
                chromosome: chromosome.to_string(),
                start: start.saturating_sub(500),
                end: end + 500,
            },
        }
    }

    #[test]
    fn test_write_annotation_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("annotated.tsv");
        let hits = vec![make_hit("2", 60000, 70000, "KIT")];

        write_annotation_table(&path, &hits).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some(ANNOTATION_HEADER));
        assert_eq!(
            lines.next(),
            Some("2\t60000\t70000\tgene\tKIT\t\tRefSeq\t-\t.\t.\tID=gene-KIT;Name=KIT")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_empty_table_has_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("annotated.tsv");

        write_annotation_table(&path, &[]).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, format!("{}\n", ANNOTATION_HEADER));
    }

    #[test]
    fn test_distinct_count_collapses_repeated_features() {
        let mut hits = vec![
            make_hit("1", 100, 200, "A"),
            make_hit("1", 100, 200, "A"),
            make_hit("1", 300, 400, "B"),
        ];
        // same coordinates on a different chromosome is a different feature
        hits.push(make_hit("2", 100, 200, "A"));

        assert_eq!(hits.len(), 4);
        assert_eq!(distinct_feature_count(&hits), 3);
    }
}
