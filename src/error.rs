use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExtractError>;

/// Failures that abort the extraction of a single document.
///
/// Sections that cannot be located are not errors; they surface as `None`
/// or empty collections on the `Publication`.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("image error: {0}")]
    Image(String),

    #[error("cache error: {0}")]
    Cache(String),
}

impl ExtractError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ExtractError::Io { path: path.into(), source }
    }
}

impl From<rusqlite::Error> for ExtractError {
    fn from(err: rusqlite::Error) -> Self {
        ExtractError::Cache(err.to_string())
    }
}
