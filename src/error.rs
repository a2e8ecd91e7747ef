use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Data source failures
// ---------------------------------------------------------------------------

/// A source table could not be read or lacks something the join needs.
#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {source_name}: {source}")]
    Csv {
        source_name: String,
        #[source]
        source: csv::Error,
    },

    #[error("malformed JSON in {source_name}: {source}")]
    Json {
        source_name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{source_name} has no '{column}' column")]
    MissingColumn { source_name: String, column: String },

    /// `row` is 1-based and counts data rows only (the header is row 0).
    #[error("{source_name}, row {row}: missing value for field '{field}'")]
    MissingField {
        source_name: String,
        row: usize,
        field: String,
    },

    #[error("GDP row '{key}' has no column for year {year}")]
    MissingYear { key: String, year: String },

    #[error("unsupported plot catalogue format: .{0}")]
    UnsupportedFormat(String),

    #[error("{what} must be a single ASCII character, got {value:?}")]
    InvalidDialect { what: &'static str, value: String },
}

// ---------------------------------------------------------------------------
// Reconciliation / resolution failures
// ---------------------------------------------------------------------------

/// Everything that aborts a reconciliation or resolution run.
///
/// Plot codes without a reference entry and empty year fields are *not*
/// errors; they are reported through the result partitions.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    DataSource(#[from] DataSourceError),

    /// The plot code has no row in the translation table. This is a broken
    /// configuration, not a data gap.
    #[error("plot code '{code}' is absent from the code translation table")]
    TranslationMissing { code: String },

    #[error("value {value:?} for '{code}' in year {year} is not a number")]
    NumericFormat {
        code: String,
        year: String,
        value: String,
    },

    #[error("value {value} for '{code}' in year {year} is not positive, log10 is undefined")]
    Domain {
        code: String,
        year: String,
        value: f64,
    },
}

pub type Result<T> = std::result::Result<T, ReconcileError>;
