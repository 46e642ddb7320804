//! Error types for the metadata layer.

use notedb_refs::RefError;
use notedb_store::StoreError;

use crate::config::ConfigParseError;

/// Errors from loading or committing versioned metadata.
#[derive(Debug, thiserror::Error)]
pub enum MetaError {
    /// Object store failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Ref store failure, including compare-and-swap lock failures.
    #[error("ref error: {0}")]
    Ref(#[from] RefError),

    /// No repository with this name is known to the manager.
    #[error("repository not found: {0}")]
    RepositoryNotFound(String),

    /// A repository with this name already exists.
    #[error("repository already exists: {0}")]
    RepositoryExists(String),

    /// A config file in a metadata tree could not be parsed.
    #[error("invalid config file {file} in {ref_name}: {source}")]
    ConfigInvalid {
        ref_name: String,
        file: String,
        #[source]
        source: ConfigParseError,
    },

    /// A metadata file is not valid UTF-8 text.
    #[error("file {file} in {ref_name} is not UTF-8 text")]
    NotText { ref_name: String, file: String },
}

impl MetaError {
    /// Returns `true` if the error is a ref compare-and-swap conflict.
    pub fn is_lock_failure(&self) -> bool {
        matches!(self, Self::Ref(e) if e.is_lock_failure())
    }
}

/// Result alias for metadata operations.
pub type MetaResult<T> = Result<T, MetaError>;
