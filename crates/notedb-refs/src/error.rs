//! Error types for reference operations.

use notedb_types::ObjectId;
use thiserror::Error;

/// Errors that can occur during reference operations.
#[derive(Debug, Error)]
pub enum RefError {
    /// The ref name is invalid.
    #[error("invalid ref name: {name}: {reason}")]
    InvalidRefName { name: String, reason: String },

    /// A compare-and-swap precondition failed: the ref no longer points
    /// where the writer observed it.
    #[error("lock failure on {name}: expected {}, found {}", display_target(.expected), display_target(.actual))]
    LockFailure {
        name: String,
        expected: Option<ObjectId>,
        actual: Option<ObjectId>,
    },

    /// The same ref appears twice in one batch.
    #[error("duplicate command for ref {name} in batch")]
    DuplicateCommand { name: String },

    /// Internal state of the backend is unusable (e.g. a poisoned lock).
    #[error("ref storage error: {0}")]
    Storage(String),

    /// I/O error from a persistent backend.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RefError {
    /// Returns `true` for compare-and-swap conflicts, the only retryable kind.
    pub fn is_lock_failure(&self) -> bool {
        matches!(self, Self::LockFailure { .. })
    }
}

fn display_target(target: &Option<ObjectId>) -> String {
    match target {
        Some(id) => id.short_hex(),
        None => "<none>".to_string(),
    }
}

/// Convenience type alias for ref operations.
pub type Result<T> = std::result::Result<T, RefError>;
