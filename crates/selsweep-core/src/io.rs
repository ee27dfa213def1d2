//! Reading and writing of score tables
//!
//! Score files are tab-separated. Four row layouts are recognized, resolved
//! once per file from the first parseable row:
//!
//! - 7 fields: `marker_id  aux  position  freq1  freq2  raw  abs` with the
//!   chromosome taken from the file name (`…_chr<N>…`)
//! - 8 fields: either the 7-field layout plus a trailing extra column, or a
//!   leading chromosome column; disambiguated against the filename chromosome
//! - 9 fields: leading chromosome column plus a trailing extra column
//!
//! Any other field count is a [`SweepError::SchemaMismatch`] for that file.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use tracing::warn;

use crate::error::{Result, SweepError};
use crate::types::{GenomicWindow, LoadWarning, MarkerRecord};

/// Column names of the significant-hit table, in output order.
const HITS_COLUMNS: [&str; 8] = [
    "chromosome",
    "marker_id",
    "aux",
    "position",
    "freq1",
    "freq2",
    "raw_score",
    "abs_score",
];

/// Recognized score-file layouts, resolved once per file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSchema {
    /// No chromosome column; the label comes from the file name
    Bare { extra: bool },
    /// Leading chromosome column
    Chrom { extra: bool },
}

impl RecordSchema {
    fn detect(
        field_count: usize,
        first_field: Option<&str>,
        chrom_hint: Option<&str>,
    ) -> Option<RecordSchema> {
        match (field_count, chrom_hint) {
            (7, Some(_)) => Some(RecordSchema::Bare { extra: false }),
            (8, Some(hint)) => {
                let first = first_field.unwrap_or("").trim();
                if normalize_chrom(first) == normalize_chrom(hint) {
                    Some(RecordSchema::Chrom { extra: false })
                } else {
                    Some(RecordSchema::Bare { extra: true })
                }
            }
            (8, None) => Some(RecordSchema::Chrom { extra: false }),
            (9, _) => Some(RecordSchema::Chrom { extra: true }),
            _ => None,
        }
    }

    fn field_count(self) -> usize {
        match self {
            RecordSchema::Bare { extra } => 7 + extra as usize,
            RecordSchema::Chrom { extra } => 8 + extra as usize,
        }
    }

    fn has_extra(self) -> bool {
        matches!(
            self,
            RecordSchema::Bare { extra: true } | RecordSchema::Chrom { extra: true }
        )
    }
}

/// Open a file for buffered reading, decompressing `.gz` transparently.
pub fn open_reader(path: &Path) -> Result<Box<dyn BufRead>> {
    if !path.exists() {
        return Err(SweepError::missing_input(path));
    }
    let file = File::open(path)?;
    if path.extension().and_then(|e| e.to_str()) == Some("gz") {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Extract the chromosome number from a partition file name tagged `_chr<N>`.
pub fn chromosome_from_filename(name: &str) -> Option<u32> {
    let tagged = &name[name.find("_chr")? + 4..];
    let end = tagged
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(tagged.len());
    tagged[..end].parse().ok()
}

/// Strip a leading chr/Chr/CHR prefix from a chromosome label.
pub fn normalize_chrom(label: &str) -> &str {
    label
        .strip_prefix("chr")
        .or_else(|| label.strip_prefix("Chr"))
        .or_else(|| label.strip_prefix("CHR"))
        .unwrap_or(label)
}

/// Record a warning both as a tracing event and in the returned list.
pub(crate) fn push_warning(warnings: &mut Vec<LoadWarning>, warning: LoadWarning) {
    warn!(file = %warning.file, line = warning.line, "{}", warning.message);
    warnings.push(warning);
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn table_reader(path: &Path, has_headers: bool) -> Result<csv::Reader<Box<dyn BufRead>>> {
    let reader = open_reader(path)?;
    Ok(csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(has_headers)
        .flexible(true)
        .quoting(false)
        .from_reader(reader))
}

fn is_blank(row: &csv::StringRecord) -> bool {
    row.len() == 1 && row.get(0).map_or(true, |f| f.trim().is_empty())
}

/// Positions sometimes arrive as floats ("12345.0"); accept and truncate.
fn parse_position(text: &str) -> Option<u64> {
    let value: f64 = text.parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some(value as u64)
}

/// Parse one row under a resolved schema. On success also returns an optional
/// cross-check message (absolute-score column disagreeing with |raw|).
fn parse_record(
    row: &csv::StringRecord,
    schema: RecordSchema,
    chrom_hint: Option<&str>,
) -> std::result::Result<(MarkerRecord, Option<String>), String> {
    let field = |i: usize| row.get(i).unwrap_or("").trim();

    let (chromosome, base) = match schema {
        RecordSchema::Bare { .. } => {
            let hint = chrom_hint.ok_or("no chromosome column and no filename chromosome")?;
            (hint.to_string(), 0)
        }
        RecordSchema::Chrom { .. } => (field(0).to_string(), 1),
    };

    let position = parse_position(field(base + 2))
        .ok_or_else(|| format!("invalid position '{}'", field(base + 2)))?;
    let raw_score: f64 = field(base + 5)
        .parse()
        .map_err(|_| format!("invalid raw score '{}'", field(base + 5)))?;
    let abs_score = raw_score.abs();

    let cross_check = field(base + 6)
        .parse::<f64>()
        .ok()
        .filter(|supplied| {
            supplied.is_finite() && abs_score.is_finite() && (supplied - abs_score).abs() > 1e-6
        })
        .map(|supplied| {
            format!(
                "absolute-score column {} disagrees with |{}|, recomputed value kept",
                supplied, raw_score
            )
        });

    let extra = schema.has_extra().then(|| field(base + 7).to_string());

    Ok((
        MarkerRecord {
            chromosome,
            marker_id: field(base).to_string(),
            aux: field(base + 1).to_string(),
            position,
            freq1: field(base + 3).to_string(),
            freq2: field(base + 4).to_string(),
            raw_score,
            abs_score,
            extra,
        },
        cross_check,
    ))
}

fn read_records(
    path: &Path,
    chrom_hint: Option<&str>,
    has_headers: bool,
) -> Result<(Vec<MarkerRecord>, Vec<LoadWarning>)> {
    let file_name = display_name(path);
    let mut reader = table_reader(path, has_headers)?;
    let mut records = Vec::new();
    let mut warnings = Vec::new();
    let mut schema: Option<RecordSchema> = None;

    for result in reader.records() {
        let row = result?;
        if is_blank(&row) {
            continue;
        }
        let line = row.position().map(|p| p.line()).unwrap_or(0);

        let candidate = match schema {
            Some(resolved) => {
                if row.len() != resolved.field_count() {
                    return Err(SweepError::schema_mismatch(path, row.len()));
                }
                resolved
            }
            None => RecordSchema::detect(row.len(), row.get(0), chrom_hint)
                .ok_or_else(|| SweepError::schema_mismatch(path, row.len()))?,
        };

        match parse_record(&row, candidate, chrom_hint) {
            Ok((record, cross_check)) => {
                // the schema is locked by the first row that parses; stray
                // header lines fall through the Err arm without locking it
                schema = Some(candidate);
                if let Some(message) = cross_check {
                    push_warning(
                        &mut warnings,
                        LoadWarning::new(&file_name, Some(line), message),
                    );
                }
                records.push(record);
            }
            Err(reason) => {
                push_warning(
                    &mut warnings,
                    LoadWarning::new(&file_name, Some(line), format!("skipping row: {}", reason)),
                );
            }
        }
    }

    Ok((records, warnings))
}

/// Read one chromosome partition of score records.
///
/// `chromosome` is the filename-derived label. It becomes the record's
/// chromosome when the file has no chromosome column and disambiguates the
/// 8-field layouts when it does.
pub fn read_partition(
    path: &Path,
    chromosome: &str,
) -> Result<(Vec<MarkerRecord>, Vec<LoadWarning>)> {
    read_records(path, Some(chromosome), false)
}

/// Read a merged or filtered marker table. These always carry a chromosome
/// column; `has_header` skips the header row of significant-hit tables.
pub fn read_marker_table(
    path: &Path,
    has_header: bool,
) -> Result<(Vec<MarkerRecord>, Vec<LoadWarning>)> {
    read_records(path, None, has_header)
}

/// Read a windowed-region table (`CHR`, `START`, `END` columns).
///
/// The header row is optional so plain 3-column interval files load too.
pub fn read_regions_table(path: &Path) -> Result<(Vec<GenomicWindow>, Vec<LoadWarning>)> {
    let file_name = display_name(path);
    let mut reader = table_reader(path, false)?;
    let mut windows = Vec::new();
    let mut warnings = Vec::new();

    for (index, result) in reader.records().enumerate() {
        let row = result?;
        if is_blank(&row) {
            continue;
        }
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        if row.len() < 3 {
            push_warning(
                &mut warnings,
                LoadWarning::new(
                    &file_name,
                    Some(line),
                    format!("expected 3 fields, found {}", row.len()),
                ),
            );
            continue;
        }
        let start = row.get(1).unwrap_or("").trim().parse::<u64>();
        let end = row.get(2).unwrap_or("").trim().parse::<u64>();
        match (start, end) {
            (Ok(start), Ok(end)) => windows.push(GenomicWindow {
                chromosome: row.get(0).unwrap_or("").trim().to_string(),
                start,
                end,
            }),
            // first row with non-numeric coordinates is the header
            _ if index == 0 => {}
            _ => push_warning(
                &mut warnings,
                LoadWarning::new(&file_name, Some(line), "unparseable region row"),
            ),
        }
    }

    Ok((windows, warnings))
}

fn write_record_row<W: Write>(
    out: &mut W,
    record: &MarkerRecord,
    pad_extra: bool,
) -> io::Result<()> {
    write!(
        out,
        "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
        record.chromosome,
        record.marker_id,
        record.aux,
        record.position,
        record.freq1,
        record.freq2,
        record.raw_score,
        record.abs_score
    )?;
    match (&record.extra, pad_extra) {
        (Some(extra), _) => writeln!(out, "\t{}", extra),
        (None, true) => writeln!(out, "\t"),
        (None, false) => writeln!(out),
    }
}

/// Write the merged per-population marker table (tab-separated, no header).
///
/// When any record carries the extra column, every row is padded to nine
/// fields so the table keeps a single layout.
pub fn write_merged_table(path: &Path, records: &[MarkerRecord]) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    let pad_extra = records.iter().any(|r| r.extra.is_some());
    for record in records {
        write_record_row(&mut out, record, pad_extra)?;
    }
    out.flush()?;
    Ok(())
}

/// Write the significant-hit table with its header row.
pub fn write_hits_table(path: &Path, records: &[MarkerRecord]) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    let pad_extra = records.iter().any(|r| r.extra.is_some());
    if pad_extra {
        writeln!(out, "{}\textra", HITS_COLUMNS.join("\t"))?;
    } else {
        writeln!(out, "{}", HITS_COLUMNS.join("\t"))?;
    }
    for record in records {
        write_record_row(&mut out, record, pad_extra)?;
    }
    out.flush()?;
    Ok(())
}

/// Write the windowed-region table (`CHR\tSTART\tEND` header).
pub fn write_windows_table(path: &Path, windows: &[GenomicWindow]) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "CHR\tSTART\tEND")?;
    for window in windows {
        writeln!(
            out,
            "{}\t{}\t{}",
            window.chromosome, window.start, window.end
        )?;
    }
    out.flush()?;
    Ok(())
}
