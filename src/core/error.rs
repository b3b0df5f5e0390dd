use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Central error type for the entire launcher backend.
/// Every module returns `Result<T, LauncherError>`.
#[derive(Debug, Error)]
pub enum LauncherError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    // ── JSON ────────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Input ───────────────────────────────────────────
    #[error("{0}")]
    Validation(#[from] ValidationError),

    // ── Launch session ──────────────────────────────────
    #[error("A Minecraft launch is already in progress, please wait")]
    LaunchInProgress,

    #[error("Minecraft is already running; confirm to close it and launch again")]
    SessionRunning,

    #[error("Launch failed: {0}")]
    LaunchFailed(String),

    #[error("Launch timed out after {0:?}")]
    LaunchTimeout(Duration),

    // ── Generic ─────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Input problems reported back to the user before anything changes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Enter a username")]
    EmptyUsername,

    #[error("Choose a game version")]
    EmptyVersion,

    #[error("Add at least one profile")]
    NoProfiles,

    #[error("Select a profile")]
    NoProfileSelected,

    #[error("Invalid memory setting: {0}")]
    InvalidMemory(String),
}

/// Convenience alias used throughout the crate.
pub type LauncherResult<T> = Result<T, LauncherError>;

impl LauncherError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LauncherError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<std::io::Error> for LauncherError {
    fn from(source: std::io::Error) -> Self {
        LauncherError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

// ── Serialization for the presentation layer ───────────
// Errors cross into the UI as their display text.
impl serde::Serialize for LauncherError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
