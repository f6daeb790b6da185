//! Error types for tracking operations

use std::path::PathBuf;

/// Everything a tracking operation can report back to the caller.
///
/// Most variants are warnings: the operation was a harmless no-op and the
/// tracked totals are untouched. Only [`TrackerError::PersistenceWrite`] and
/// [`TrackerError::StateLock`] are real failures.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("No open projects.")]
    NoActiveContext,

    #[error("Time tracking is already underway for \"{0}\".")]
    AlreadyTracking(String),

    #[error("Time tracking has not started.")]
    NotTracking,

    #[error("Time tracking is not paused for inactivity.")]
    NotPaused,

    #[error("Project \"{0}\" not found.")]
    UnknownProject(String),

    #[error("Failed to read {path}: {details}")]
    PersistenceRead { path: PathBuf, details: String },

    #[error("Failed to save tracked time to {path}: {source}")]
    PersistenceWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    InvalidConfigurationInput(String),

    #[error("Failed to lock {0}")]
    StateLock(&'static str),
}

/// How an error should be shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl TrackerError {
    pub fn severity(&self) -> Severity {
        match self {
            Self::PersistenceRead { .. } | Self::PersistenceWrite { .. } | Self::StateLock(_) => {
                Severity::Error
            }
            _ => Severity::Warning,
        }
    }
}

pub type TrackerResult<T> = Result<T, TrackerError>;
