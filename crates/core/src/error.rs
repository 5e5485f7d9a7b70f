use std::path::PathBuf;

use thiserror::Error;

/// Error type for the fatal, stage-aborting failures.
///
/// Anything that can only degrade a single field of a finding record is
/// modelled as an `Option` on that record instead and never reaches here.
#[derive(Debug, Error)]
pub enum ChainError {
    /// A required input file (fragment, adapter, scaffold, instrumented unit) is missing.
    #[error("{role} file not found: {}", path.display())]
    MissingInput { role: &'static str, path: PathBuf },

    /// The bound expression matched none of the accepted forms.
    #[error("Unrecognized bound format: {0:?} (expected LO<=x<=HI, LO..HI, or LO,HI)")]
    BoundFormat(String),

    /// Only one of `--lo` / `--hi` was supplied.
    #[error("please provide both --lo and --hi if using that style")]
    PartialBounds,

    /// Filesystem failure on a specific path.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Scenario file could not be parsed, or has an unsupported extension.
    #[error("Invalid scenario file {}: {reason}", path.display())]
    Scenario { path: PathBuf, reason: String },
}

impl ChainError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ChainError::Io { path: path.into(), source }
    }
}

/// Convenience result type for core operations.
pub type Result<T> = std::result::Result<T, ChainError>;
