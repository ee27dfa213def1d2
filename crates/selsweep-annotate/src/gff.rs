//! GFF3 feature catalogue parsing
//!
//! The catalogue is read once per run and shared read-only afterwards. Only
//! the columns the annotation report needs are interpreted; the attribute
//! block is carried through raw with `Name` and the first `Dbxref` entry
//! pulled out for the report's name/id columns.

use std::path::Path;

use tracing::warn;

use selsweep_core::error::Result;
use selsweep_core::io::open_reader;
use selsweep_core::types::LoadWarning;

/// One reference annotation entry. Read-only after load.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureInterval {
    pub chromosome: String,
    /// Annotation source column (e.g., "RefSeq")
    pub source: String,
    /// Feature type column (e.g., "gene", "mRNA")
    pub feature_type: String,
    /// 1-based start coordinate
    pub start: u64,
    /// 1-based end coordinate, inclusive
    pub end: u64,
    /// Score column, kept as text ("." when absent)
    pub score: String,
    pub strand: String,
    pub phase: String,
    /// Raw semicolon-delimited attribute block, carried through unmodified
    pub attributes: String,
    /// `Name` attribute, empty when absent
    pub name: String,
    /// First `Dbxref` entry, empty when absent
    pub feature_id: String,
}

/// Look up one key in a semicolon-delimited `key=value` attribute block.
fn attribute_value(attributes: &str, key: &str) -> Option<String> {
    attributes.split(';').find_map(|entry| {
        let (k, v) = entry.split_once('=')?;
        (k.trim() == key).then(|| v.trim().to_string())
    })
}

fn feature_from_fields(row: &csv::StringRecord) -> std::result::Result<FeatureInterval, String> {
    let field = |i: usize| row.get(i).unwrap_or("").trim();

    let start: u64 = field(3)
        .parse()
        .map_err(|_| format!("invalid start '{}'", field(3)))?;
    let end: u64 = field(4)
        .parse()
        .map_err(|_| format!("invalid end '{}'", field(4)))?;
    if start > end {
        return Err(format!("start {} greater than end {}", start, end));
    }

    let attributes = field(8).to_string();
    let name = attribute_value(&attributes, "Name").unwrap_or_default();
    let feature_id = attribute_value(&attributes, "Dbxref")
        .map(|v| v.split(',').next().unwrap_or("").to_string())
        .unwrap_or_default();

    Ok(FeatureInterval {
        chromosome: field(0).to_string(),
        source: field(1).to_string(),
        feature_type: field(2).to_string(),
        start,
        end,
        score: field(5).to_string(),
        strand: field(6).to_string(),
        phase: field(7).to_string(),
        attributes,
        name,
        feature_id,
    })
}

/// Load a GFF3 feature catalogue (optionally gzipped).
///
/// Comment and directive lines are skipped. Rows with fewer than nine fields
/// or unparseable coordinates are skipped with a warning; tab-less lines
/// (e.g., a trailing FASTA section) are skipped quietly.
pub fn load_features(path: &Path) -> Result<(Vec<FeatureInterval>, Vec<LoadWarning>)> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .comment(Some(b'#'))
        .from_reader(open_reader(path)?);

    let mut features = Vec::new();
    let mut warnings = Vec::new();

    for result in reader.records() {
        let row = result?;
        if row.len() <= 1 {
            continue;
        }
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        if row.len() < 9 {
            record_warning(
                &mut warnings,
                LoadWarning::new(
                    &file_name,
                    Some(line),
                    format!("expected 9 fields, found {}", row.len()),
                ),
            );
            continue;
        }
        match feature_from_fields(&row) {
            Ok(feature) => features.push(feature),
            Err(reason) => record_warning(
                &mut warnings,
                LoadWarning::new(&file_name, Some(line), format!("skipping row: {}", reason)),
            ),
        }
    }

    Ok((features, warnings))
}

fn record_warning(warnings: &mut Vec<LoadWarning>, warning: LoadWarning) {
    warn!(file = %warning.file, line = warning.line, "{}", warning.message);
    warnings.push(warning);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::NamedTempFile;

    const GFF: &str = "\
##gff-version 3
#!genome-build ARS-UCD1.2
1\tRefSeq\tgene\t1000\t2000\t.\t+\t.\tID=gene-1;Dbxref=GeneID:100,VGNC:VGNC:25;Name=ABCB1
1\tRefSeq\tmRNA\t1000\t1800\t.\t+\t.\tID=rna-1;Parent=gene-1
2\tRefSeq\tgene\t500\t900\t.\t-\t.\tID=gene-2;Name=TLR4
";

    fn temp_gff(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_catalogue() {
        let file = temp_gff(GFF);
        let (features, warnings) = load_features(file.path()).unwrap();
        assert_eq!(features.len(), 3);
        assert!(warnings.is_empty());

        let gene = &features[0];
        assert_eq!(gene.chromosome, "1");
        assert_eq!(gene.feature_type, "gene");
        assert_eq!(gene.start, 1000);
        assert_eq!(gene.end, 2000);
        assert_eq!(gene.name, "ABCB1");
        assert_eq!(gene.feature_id, "GeneID:100");
        assert_eq!(
            gene.attributes,
            "ID=gene-1;Dbxref=GeneID:100,VGNC:VGNC:25;Name=ABCB1"
        );
    }

    #[test]
    fn test_missing_name_and_dbxref_are_empty() {
        let file = temp_gff(GFF);
        let (features, _) = load_features(file.path()).unwrap();
        let mrna = &features[1];
        assert_eq!(mrna.name, "");
        assert_eq!(mrna.feature_id, "");
    }

    #[test]
    fn test_short_row_warned_and_skipped() {
        let file = temp_gff("1\tRefSeq\tgene\t10\n1\tRefSeq\tgene\t10\t20\t.\t+\t.\tID=g\n");
        let (features, warnings) = load_features(file.path()).unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("expected 9 fields"));
    }

    #[test]
    fn test_bad_coordinates_warned_and_skipped() {
        let file = temp_gff(
            "1\tRefSeq\tgene\tten\t20\t.\t+\t.\tID=a\n1\tRefSeq\tgene\t30\t20\t.\t+\t.\tID=b\n",
        );
        let (features, warnings) = load_features(file.path()).unwrap();
        assert!(features.is_empty());
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].message.contains("invalid start"));
        assert!(warnings[1].message.contains("greater than end"));
    }

    #[test]
    fn test_fasta_tail_skipped_quietly() {
        let file = temp_gff(
            "1\tRefSeq\tgene\t10\t20\t.\t+\t.\tID=g\n##FASTA\nACGTACGTACGT\nACGT\n",
        );
        let (features, warnings) = load_features(file.path()).unwrap();
        assert_eq!(features.len(), 1);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_attribute_value_lookup() {
        let attrs = "ID=x;Name=FOO; Dbxref=GeneID:7,Other:8 ;note=a=b";
        assert_eq!(attribute_value(attrs, "Name").as_deref(), Some("FOO"));
        assert_eq!(
            attribute_value(attrs, "Dbxref").as_deref(),
            Some("GeneID:7,Other:8")
        );
        assert_eq!(attribute_value(attrs, "missing"), None);
        // value containing '=' splits on the first one
        assert_eq!(attribute_value(attrs, "note").as_deref(), Some("a=b"));
    }
}
