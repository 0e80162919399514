use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("endpoint unavailable: {path} returned status {status}")]
    Unavailable { path: String, status: u16 },

    #[error("server rejected {path} with status {status}: {body}")]
    Rejected {
        path: String,
        status: u16,
        body: String,
    },

    #[error("expected exactly one {resource} matching '{key}', found {found}")]
    AmbiguousResume {
        resource: &'static str,
        key: String,
        found: usize,
    },

    #[error("created response for {path} is missing a Location header")]
    MissingLocation { path: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
