//! Reference management for NoteDb metadata.
//!
//! A ref is a named, atomically-updatable pointer to a commit. Every
//! metadata entity owns one ref; the tip commit of that ref is
//! authoritative.
//!
//! # Concurrency
//!
//! Refs are the single serialization point. Writers never lock across their
//! read-modify-write cycle; instead every update carries the tip the writer
//! observed, and the store applies a whole batch of such compare-and-swap
//! commands atomically or not at all. A mismatch surfaces as
//! [`RefError::LockFailure`], which callers may retry from a fresh read.
//!
//! # Modules
//!
//! - [`error`]: Error types for ref operations
//! - [`types`]: [`RefUpdate`] commands and the single-use [`BatchRefUpdate`]
//! - [`traits`]: The [`RefStore`] trait defining the storage interface
//! - [`names`]: Ref name validation
//! - [`memory`]: In-memory [`InMemoryRefStore`] for tests

pub mod error;
pub mod memory;
pub mod names;
pub mod traits;
pub mod types;

pub use error::{RefError, Result};
pub use memory::InMemoryRefStore;
pub use names::validate_ref_name;
pub use traits::RefStore;
pub use types::{BatchRefUpdate, RefUpdate};
