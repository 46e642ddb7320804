//! The checker entity and the requests that create and modify it.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use notedb_types::ObjectId;
use serde::{Deserialize, Serialize};

use crate::uuid::CheckerUuid;

/// Whether a checker is active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckerStatus {
    #[default]
    Enabled,
    /// Soft-deleted: kept on its ref but dropped from the repository index.
    Disabled,
}

impl CheckerStatus {
    pub fn as_config_value(&self) -> &'static str {
        match self {
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
        }
    }

    pub fn from_config_value(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("enabled") {
            Some(Self::Enabled)
        } else if value.eq_ignore_ascii_case("disabled") {
            Some(Self::Disabled)
        } else {
            None
        }
    }
}

impl fmt::Display for CheckerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_config_value())
    }
}

/// Conditions under which a checker's results block submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockingCondition {
    StateNotPassing,
}

impl BlockingCondition {
    pub fn as_config_value(&self) -> &'static str {
        match self {
            Self::StateNotPassing => "STATE_NOT_PASSING",
        }
    }

    pub fn from_config_value(value: &str) -> Option<Self> {
        value
            .eq_ignore_ascii_case("STATE_NOT_PASSING")
            .then_some(Self::StateNotPassing)
    }
}

/// A checker as stored at one commit of its ref.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checker {
    pub uuid: CheckerUuid,
    pub name: String,
    pub description: Option<String>,
    pub url: Option<String>,
    /// Repository the checker applies to.
    pub repository: String,
    pub status: CheckerStatus,
    pub blocking: BTreeSet<BlockingCondition>,
    /// Query restricting the changes the checker applies to.
    pub query: Option<String>,
    /// Committer time of the first commit on the checker ref.
    pub created_on: DateTime<Utc>,
    /// Committer time of the tip commit.
    pub updated_on: DateTime<Utc>,
    /// Tip commit this snapshot was read from.
    pub ref_state: ObjectId,
}

impl Checker {
    pub fn is_enabled(&self) -> bool {
        self.status == CheckerStatus::Enabled
    }
}

/// Mandatory properties of a new checker.
///
/// `checker_uuid` is validated when the creation is staged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckerCreation {
    pub checker_uuid: String,
    pub name: String,
    pub repository: String,
}

impl CheckerCreation {
    pub fn new(
        checker_uuid: impl Into<String>,
        name: impl Into<String>,
        repository: impl Into<String>,
    ) -> Self {
        Self {
            checker_uuid: checker_uuid.into(),
            name: name.into(),
            repository: repository.into(),
        }
    }
}

/// Changes to apply to a checker. `None` leaves a property as it is; an
/// empty string for `description`, `url` or `query` removes it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckerUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub repository: Option<String>,
    pub status: Option<CheckerStatus>,
    pub blocking: Option<BTreeSet<BlockingCondition>>,
    pub query: Option<String>,
    /// Commit time to record; defaults to now.
    pub updated_on: Option<DateTime<Utc>>,
}

impl CheckerUpdate {
    /// Returns `true` if no property would change.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.url.is_none()
            && self.repository.is_none()
            && self.status.is_none()
            && self.blocking.is_none()
            && self.query.is_none()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = Some(repository.into());
        self
    }

    pub fn with_status(mut self, status: CheckerStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_blocking(mut self, blocking: impl IntoIterator<Item = BlockingCondition>) -> Self {
        self.blocking = Some(blocking.into_iter().collect());
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_updated_on(mut self, when: DateTime<Utc>) -> Self {
        self.updated_on = Some(when);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_config_values() {
        assert_eq!(CheckerStatus::Enabled.as_config_value(), "enabled");
        assert_eq!(CheckerStatus::Disabled.to_string(), "disabled");
        assert_eq!(CheckerStatus::from_config_value("DISABLED"), Some(CheckerStatus::Disabled));
        assert_eq!(CheckerStatus::from_config_value("off"), None);
        assert_eq!(CheckerStatus::default(), CheckerStatus::Enabled);
    }

    #[test]
    fn blocking_config_values() {
        let cond = BlockingCondition::StateNotPassing;
        assert_eq!(BlockingCondition::from_config_value(cond.as_config_value()), Some(cond));
        assert_eq!(BlockingCondition::from_config_value("ALWAYS"), None);
    }

    #[test]
    fn update_emptiness_ignores_timestamp() {
        assert!(CheckerUpdate::default().is_empty());
        assert!(CheckerUpdate::default().with_updated_on(Utc::now()).is_empty());
        assert!(!CheckerUpdate::default().with_description("").is_empty());
        assert!(!CheckerUpdate::default().with_blocking(Vec::new()).is_empty());
    }
}
