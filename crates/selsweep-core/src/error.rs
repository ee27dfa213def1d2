//! Error types for selection-scan operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading score data or estimating thresholds.
///
/// The variants follow the pipeline's failure policy: `MissingInput` and
/// `MalformedRecord` are usually downgraded to warnings at the call site,
/// `SchemaMismatch` fails the affected file, and `InsufficientData` fails
/// the affected population. None of them should take down a whole
/// multi-population run.
#[derive(Error, Debug)]
pub enum SweepError {
    /// I/O error from file operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV/TSV layer error
    #[error("parse error: {0}")]
    Csv(#[from] csv::Error),

    /// A required input file or directory is absent
    #[error("missing input: {}", path.display())]
    MissingInput { path: PathBuf },

    /// A record could not be parsed
    #[error("malformed record at {file}:{line}: {message}")]
    MalformedRecord {
        file: String,
        line: u64,
        message: String,
    },

    /// Too few usable observations to estimate a threshold
    #[error("insufficient data: {observed} usable observation(s), need at least 2")]
    InsufficientData { observed: usize },

    /// A score file had an unrecognized column count
    #[error("schema mismatch in {}: {found} field(s) per row (recognized layouts have 7, 8, or 9)", path.display())]
    SchemaMismatch { path: PathBuf, found: usize },
}

impl SweepError {
    pub fn missing_input(path: impl Into<PathBuf>) -> Self {
        SweepError::MissingInput { path: path.into() }
    }

    pub fn malformed(file: impl Into<String>, line: u64, message: impl Into<String>) -> Self {
        SweepError::MalformedRecord {
            file: file.into(),
            line,
            message: message.into(),
        }
    }

    pub fn schema_mismatch(path: impl Into<PathBuf>, found: usize) -> Self {
        SweepError::SchemaMismatch {
            path: path.into(),
            found,
        }
    }
}

/// Convenience result type for selsweep operations
pub type Result<T> = std::result::Result<T, SweepError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SweepError::InsufficientData { observed: 1 };
        assert_eq!(
            err.to_string(),
            "insufficient data: 1 usable observation(s), need at least 2"
        );

        let err = SweepError::malformed("pop_chr1.norm", 42, "bad position");
        assert_eq!(
            err.to_string(),
            "malformed record at pop_chr1.norm:42: bad position"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: SweepError = io_err.into();
        assert!(matches!(err, SweepError::Io(_)));
    }
}
