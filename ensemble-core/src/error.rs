//! Error types for ensemble-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::BuildIdentity;

/// All errors that can arise from manifest loading and validation.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load — includes file path and line context.
    #[error("failed to parse manifest at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The manifest declares no participant builds at all.
    #[error("manifest at {path} declares no participant builds")]
    NoParticipants { path: PathBuf },

    /// Two participants in one manifest share a logical identity.
    #[error("manifest at {path} declares participant '{identity}' more than once")]
    DuplicateParticipant {
        path: PathBuf,
        identity: BuildIdentity,
    },

    /// No target build was named, neither in the manifest nor by the caller.
    #[error("no target build named; set `target` in the manifest or pass one explicitly")]
    MissingTarget,
}

/// Convenience constructor for [`CoreError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> CoreError {
    CoreError::Io {
        path: path.into(),
        source,
    }
}
