//! Foundation types for NoteDb metadata storage.
//!
//! This crate provides the identifiers and identity types shared by every
//! other `notedb-*` crate.
//!
//! # Key Types
//!
//! - [`ObjectId`]: Content-addressed identifier (BLAKE3 hash) of a blob, tree or commit
//! - [`NoteId`]: 20-byte SHA-1 key under which a note is stored in a notes tree
//! - [`PersonIdent`]: Author/committer identity with a seconds-precision timestamp

pub mod error;
pub mod identity;
pub mod note;
pub mod object;
pub mod temporal;

pub use error::TypeError;
pub use identity::PersonIdent;
pub use note::NoteId;
pub use object::ObjectId;
pub use temporal::{now_truncated, truncate_to_second};
