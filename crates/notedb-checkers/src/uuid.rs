//! Checker UUIDs.

use std::fmt;
use std::str::FromStr;

use notedb_crypto::sha1_digest;
use serde::{Deserialize, Serialize};

use crate::error::CheckerError;
use crate::refs::REFS_CHECKERS;

/// Identifier of a checker: 40 lowercase hex characters.
///
/// Immutable once the checker exists; it names the checker's ref and is the
/// value stored in the by-repository index.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CheckerUuid(String);

impl CheckerUuid {
    pub fn parse(s: &str) -> Result<Self, CheckerError> {
        if Self::is_uuid(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(CheckerError::InvalidUuid(s.to_string()))
        }
    }

    pub fn is_uuid(s: &str) -> bool {
        s.len() == 40 && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }

    /// A fresh UUID for a checker called `name`, salted so that two
    /// checkers with the same name get different UUIDs.
    pub fn make(name: &str) -> Self {
        let salt = rand::random::<u64>().to_be_bytes();
        let parts: [&[u8]; 4] = [b"checker ", name.as_bytes(), b"\n", &salt];
        let digest = sha1_digest(&parts);
        Self(hex::encode(digest))
    }

    /// Parse the UUID out of a `refs/checkers/<shard>/<uuid>` name.
    pub fn from_ref(ref_name: &str) -> Option<Self> {
        let rest = ref_name.strip_prefix(REFS_CHECKERS)?;
        let (shard, uuid) = rest.split_once('/')?;
        let uuid = Self::parse(uuid).ok()?;
        (uuid.shard() == shard).then_some(uuid)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn shard(&self) -> &str {
        &self.0[..2]
    }
}

impl fmt::Display for CheckerUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for CheckerUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CheckerUuid({})", self.0)
    }
}

impl FromStr for CheckerUuid {
    type Err = CheckerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CheckerUuid {
    type Error = CheckerError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if Self::is_uuid(&s) {
            Ok(Self(s))
        } else {
            Err(CheckerError::InvalidUuid(s))
        }
    }
}

impl From<CheckerUuid> for String {
    fn from(uuid: CheckerUuid) -> Self {
        uuid.0
    }
}

impl AsRef<str> for CheckerUuid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
