//! Versioned metadata plumbing for NoteDb.
//!
//! Metadata entities are stored as small files inside the tree of the tip
//! commit of a dedicated ref. This crate provides the pieces every such
//! entity needs:
//!
//! - [`Repository`] / [`RepositoryManager`]: a named handle over an object
//!   store and a ref store, opened per operation
//! - [`GitConfig`]: the INI-like `[section]` / `key = value` text format
//! - [`RefSnapshot`]: the tip of a ref as read at one point in time, and the
//!   commit step that writes a new tip (suppressing empty commits)
//! - [`MetaDataUpdate`]: commit identities plus the single-use batch of ref
//!   updates that makes several metadata commits land atomically
//! - [`NoteMap`]: a flat notes tree keyed by [`notedb_types::NoteId`]
//! - [`RefUpdateListener`]: post-commit notification hook
//! - [`retry`]: re-run an operation on classified (lock failure) errors

pub mod config;
pub mod error;
pub mod events;
pub mod history;
pub mod note_map;
pub mod repository;
pub mod retry;
pub mod snapshot;
pub mod update;

pub use config::{ConfigParseError, GitConfig};
pub use error::{MetaError, MetaResult};
pub use events::{
    NoopRefUpdateListener, RecordingRefUpdateListener, RefUpdateListener, RefUpdatedEvent,
};
pub use history::{commit_times, CommitTimes};
pub use note_map::NoteMap;
pub use repository::{InMemoryRepositoryManager, Repository, RepositoryManager};
pub use retry::{retry, RetryError, RetryPolicy};
pub use snapshot::{put_text, RefSnapshot};
pub use update::MetaDataUpdate;
