//! Error taxonomy for the discovery and parsing core.
//!
//! Parsing never fails; only rule loading and storage access produce errors.

use std::path::PathBuf;

/// Failures surfaced by the rule set, the storage layer, and the document index
#[derive(Debug, thiserror::Error)]
pub enum IndexError
{
    /// A required ignore-rule source is missing or unusable
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Target path does not exist or is excluded by the ignore rules
    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Underlying read/write failure at the storage boundary
    #[error("storage error at {}", path.display())]
    Storage
    {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl IndexError
{
    /// Map an I/O error for `path`, keeping `NotFound` distinct
    pub fn from_io(
        path: impl Into<PathBuf>,
        err: std::io::Error,
    ) -> Self
    {
        let path = path.into();
        if err.kind() == std::io::ErrorKind::NotFound
        {
            Self::NotFound(path)
        }
        else
        {
            Self::Storage { path, source: err }
        }
    }

    /// Process exit code used by the CLI for this error kind
    pub fn exit_code(&self) -> u8
    {
        match self
        {
            Self::Configuration(_) => 2,
            Self::NotFound(_) => 3,
            Self::Storage { .. } => 4,
        }
    }
}
