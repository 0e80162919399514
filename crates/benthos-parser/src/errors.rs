use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("required file missing: {0}")]
    MissingFile(PathBuf),

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("manifest row {row} has {found} columns, expected {expected}")]
    WrongColumnCount {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("manifest row {row} column '{column}' is not a number: '{value}'")]
    BadNumber {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("{file}: format version must be '1.0', got '{found}'")]
    UnsupportedVersion { file: String, found: String },

    #[error("{file}: unknown label '{label}'")]
    UnknownLabel { file: String, label: String },

    #[error("unknown deployment type '{0}' (expected AUV, BRUV, TI, DOV or TV)")]
    UnknownDeploymentType(String),
}
