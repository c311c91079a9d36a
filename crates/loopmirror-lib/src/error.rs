use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoopMirrorError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid arguments: {details}")]
    CliArgumentValidation { details: String },

    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Failed to parse {source_name}: {reason}")]
    Parse { source_name: String, reason: String },

    #[error("Filesystem operation failed at {path}: {reason}")]
    Filesystem { path: PathBuf, reason: String },

    #[error("Size probe failed for {url}: {reason}")]
    SizeProbe { url: String, reason: String },

    #[error("Unexpected error: {0}")]
    Unexpected(#[from] eyre::Report),
}

/// Coarse classification of [`LoopMirrorError`], used for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Validation,
    Fetch,
    Parse,
    Filesystem,
    SizeProbe,
    Unexpected,
}

impl LoopMirrorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Config,
            Self::CliArgumentValidation { .. } => ErrorKind::Validation,
            Self::Fetch { .. } => ErrorKind::Fetch,
            Self::Parse { .. } => ErrorKind::Parse,
            Self::Filesystem { .. } => ErrorKind::Filesystem,
            Self::SizeProbe { .. } => ErrorKind::SizeProbe,
            Self::Unexpected(_) => ErrorKind::Unexpected,
        }
    }

    pub(crate) fn fetch(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Fetch {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn filesystem(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Filesystem {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
