use std::path::PathBuf;

use thiserror::Error;

use crate::envelope::EnvelopeError;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("parse error: {0}")]
    Parse(#[from] benthos_parser::ParseError),

    #[error("catalog error: {0}")]
    Catalog(#[from] benthos_catalog::CatalogError),

    #[error("cannot scan {path}: {source}")]
    Envelope {
        path: PathBuf,
        #[source]
        source: EnvelopeError,
    },

    #[error("unknown camera angle '{0}'")]
    UnknownCameraAngle(String),

    #[error("image file missing: {0}")]
    MissingImageFile(PathBuf),

    #[error("bulk image metadata returned {returned} identifiers for {submitted} records")]
    BatchLengthMismatch { submitted: usize, returned: usize },

    #[error("image upload incomplete: {completed} of {submitted} tasks finished")]
    PartialUpload { completed: usize, submitted: usize },

    #[error("no deployment directories found under {0}")]
    NoDeployments(PathBuf),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
