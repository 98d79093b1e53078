//! Error types for driftsync

use thiserror::Error;

/// Fatal and pass-level errors.
///
/// Scan failures abort the pass: the comparator cannot run on an incomplete
/// tree. Per-file transfer failures never surface here; they are collected as
/// [`ActionError`] records in the pass report instead.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Standard IO error (automatically converted via #[from])
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A tree scan could not complete
    #[error("Scan failed for {path}: {message}")]
    Scan { path: String, message: String },

    /// Remote store call failed outside the per-file action scope
    #[error("Remote store error: {0}")]
    Remote(#[from] RemoteError),

    /// Sidecar state file could not be written
    #[error("State file error: {0}")]
    State(String),

    /// Invalid options or paths
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors surfaced by a [`RemoteStore`](crate::remote::RemoteStore)
/// implementation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    /// Rate-limit-class failure; eligible for backoff retry
    #[error("Rate limited by remote store")]
    RateLimited,

    /// The referenced object or folder does not exist
    #[error("Remote object not found: {0}")]
    NotFound(String),

    /// Any other API failure
    #[error("Remote API error: {0}")]
    Api(String),
}

impl RemoteError {
    /// Whether bounded exponential backoff may retry this failure.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RemoteError::RateLimited)
    }
}

/// The kind of per-file action that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Upload,
    Download,
    DeleteLocal,
    DeleteRemote,
}

impl ActionKind {
    pub fn label(&self) -> &'static str {
        match self {
            ActionKind::Upload => "upload",
            ActionKind::Download => "download",
            ActionKind::DeleteLocal => "delete-local",
            ActionKind::DeleteRemote => "delete-remote",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A single failed per-file action, isolated from the rest of the pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionError {
    /// Relative posix path of the affected file
    pub path: String,

    /// What the executor was attempting
    pub action: ActionKind,

    /// Human-readable failure reason
    pub message: String,
}

impl ActionError {
    pub fn new(path: impl Into<String>, action: ActionKind, message: impl ToString) -> Self {
        Self {
            path: path.into(),
            action,
            message: message.to_string(),
        }
    }
}

impl std::fmt::Display for ActionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.action, self.path, self.message)
    }
}
