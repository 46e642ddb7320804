//! Hashing primitives for NoteDb metadata storage.
//!
//! Two hash families live here:
//!
//! - [`ContentHasher`]: domain-separated BLAKE3 hashing that addresses every
//!   stored blob, tree and commit.
//! - [`NoteKeyHasher`]: SHA-1 of a logical key's canonical string form,
//!   used as the flat address of a note in a notes tree.
//!
//! All crypto operations wrap established libraries; no custom cryptography.

pub mod hasher;
pub mod note_key;

pub use hasher::ContentHasher;
pub use note_key::{sha1_digest, NoteKeyHasher};
