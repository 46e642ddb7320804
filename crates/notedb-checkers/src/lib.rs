//! Checker storage on NoteDb.
//!
//! Every checker lives on its own ref, `refs/checkers/<shard>/<uuid>`, as a
//! `checker.config` file in the tip commit's tree. A shared notes ref,
//! `refs/meta/checkers`, maps each repository (by the SHA-1 of its name) to
//! the sorted UUIDs of the enabled checkers that apply to it.
//!
//! # Entry points
//!
//! - [`Checkers`]: `get_checker`, `list_checkers`, `checkers_of`
//! - [`CheckersUpdate`]: `create_checker`, `update_checker`
//!
//! Writes commit the checker ref and the index ref in one atomic batch and
//! retry the whole read-modify-write on lock failures.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use notedb_checkers::{
//!     CheckerCreation, CheckerUpdate, CheckerUuid, Checkers, CheckersConfig, CheckersUpdate,
//! };
//! use notedb_meta::{InMemoryRepositoryManager, NoopRefUpdateListener};
//!
//! let manager = Arc::new(InMemoryRepositoryManager::new());
//! manager.create_repository("All-Projects").unwrap();
//!
//! let config = CheckersConfig::default();
//! let listener = Arc::new(NoopRefUpdateListener);
//! let updates = CheckersUpdate::new(manager.clone(), config.clone(), listener);
//! let uuid = CheckerUuid::make("my-checker");
//! updates
//!     .create_checker(
//!         CheckerCreation::new(uuid.as_str(), "my-checker", "my-repo"),
//!         CheckerUpdate::default(),
//!     )
//!     .unwrap();
//!
//! let checkers = Checkers::new(manager, config);
//! let found = checkers.checkers_of("my-repo").unwrap();
//! assert_eq!(found.len(), 1);
//! assert_eq!(found[0].uuid, uuid);
//! ```

pub mod by_repository;
pub mod checker;
pub mod checker_config;
pub mod checkers;
pub mod config;
mod config_entry;
pub mod error;
pub mod refs;
#[cfg(test)]
mod testing;
pub mod update;
pub mod uuid;

pub use by_repository::CheckersByRepositoryNotes;
pub use checker::{
    BlockingCondition, Checker, CheckerCreation, CheckerStatus, CheckerUpdate,
};
pub use checker_config::CheckerConfig;
pub use checkers::Checkers;
pub use config::{CheckersConfig, ServerIdentConfig};
pub use error::{CheckerError, CheckerResult};
pub use update::CheckersUpdate;
pub use uuid::CheckerUuid;
