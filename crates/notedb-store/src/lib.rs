//! Content-addressed object storage for NoteDb metadata.
//!
//! This crate implements a hash-keyed object store with a git-compatible
//! object model. Metadata entities are persisted as files inside trees, and
//! every change is recorded as a commit pointing at a new root tree.
//!
//! # Object Types
//!
//! - [`Blob`] -- raw content (config files, note contents)
//! - [`Tree`] -- directory listing mapping names to object references
//! - [`Commit`] -- a tree snapshot plus parents, identities and a message
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`InMemoryObjectStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written (content-addressing guarantees this).
//! 2. Write-then-link: objects are written before any ref points at them.
//! 3. Concurrent reads are always safe (objects are immutable).
//! 4. The store never interprets object contents -- it is a pure key-value store.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod memory;
pub mod object;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryObjectStore;
pub use object::{Blob, Commit, EntryMode, ObjectKind, StoredObject, Tree, TreeEntry};
pub use traits::ObjectStore;
