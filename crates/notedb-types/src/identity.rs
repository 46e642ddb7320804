use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::temporal::truncate_to_second;

/// Identity recorded as author or committer of a metadata commit.
///
/// Commit timestamps are only precise to the second, so `when` is always
/// truncated on construction.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PersonIdent {
    pub name: String,
    pub email: String,
    pub when: DateTime<Utc>,
}

impl PersonIdent {
    pub fn new(name: impl Into<String>, email: impl Into<String>, when: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            when: truncate_to_second(when),
        }
    }

    /// The same identity, re-stamped at `when`.
    pub fn with_when(&self, when: DateTime<Utc>) -> Self {
        Self::new(self.name.clone(), self.email.clone(), when)
    }
}

impl fmt::Display for PersonIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}> {}", self.name, self.email, self.when.timestamp())
    }
}
