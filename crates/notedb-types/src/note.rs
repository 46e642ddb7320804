use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Key of a note inside a notes tree.
///
/// Note ids are SHA-1 sized (20 bytes) so that a notes tree written here is
/// addressed the same way as one written by a git-based deployment: the same
/// logical key always maps to the same 40-character hex name.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NoteId([u8; 20]);

impl NoteId {
    pub const fn from_raw(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// The 40-character lowercase hex name used as the tree entry name.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        let arr: [u8; 20] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| TypeError::InvalidLength {
                expected: 20,
                actual: bytes.len(),
            })?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NoteId({})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
