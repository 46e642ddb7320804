//! Error types for checker storage.

use notedb_meta::MetaError;

/// Errors from reading or writing checkers.
#[derive(Debug, thiserror::Error)]
pub enum CheckerError {
    /// The stored config of a checker is unparsable or incomplete. Not
    /// retried: the data has to be repaired.
    #[error("{reason}")]
    Malformed { uuid: String, reason: String },

    /// A checker with this UUID already exists.
    #[error("checker {0} already exists")]
    DuplicateKey(String),

    /// No checker with this UUID exists.
    #[error("checker {0} not found")]
    NoSuchChecker(String),

    /// The string is not a valid checker UUID.
    #[error("invalid checker UUID: {0}")]
    InvalidUuid(String),

    /// Lock failures persisted through every retry.
    #[error("update failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<CheckerError>,
    },

    /// The checkers configuration could not be loaded.
    #[error("invalid checkers configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure in the underlying metadata storage.
    #[error(transparent)]
    Meta(#[from] MetaError),
}

impl CheckerError {
    /// Returns `true` for ref compare-and-swap conflicts, the only errors
    /// that are retried.
    pub fn is_lock_failure(&self) -> bool {
        matches!(self, Self::Meta(e) if e.is_lock_failure())
    }

    pub(crate) fn malformed(uuid: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            uuid: uuid.into(),
            reason: reason.into(),
        }
    }
}

/// Result alias for checker operations.
pub type CheckerResult<T> = Result<T, CheckerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use notedb_refs::RefError;

    fn lock_failure() -> CheckerError {
        CheckerError::Meta(MetaError::Ref(RefError::LockFailure {
            name: "refs/meta/checkers".into(),
            expected: None,
            actual: None,
        }))
    }

    #[test]
    fn only_lock_failures_are_retryable() {
        assert!(lock_failure().is_lock_failure());
        assert!(!CheckerError::DuplicateKey("abc".into()).is_lock_failure());
        assert!(!CheckerError::malformed("abc", "name of checker abc not set").is_lock_failure());
    }

    #[test]
    fn exhausted_keeps_the_cause() {
        use std::error::Error as _;

        let err = CheckerError::RetriesExhausted {
            attempts: 3,
            source: Box::new(lock_failure()),
        };
        assert!(!err.is_lock_failure());
        assert!(err.to_string().starts_with("update failed after 3 attempts"));
        assert!(err.source().is_some());
    }

    #[test]
    fn malformed_displays_reason() {
        let err = CheckerError::malformed("abc", "name of checker abc not set");
        assert_eq!(err.to_string(), "name of checker abc not set");
    }
}
