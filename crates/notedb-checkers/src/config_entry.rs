//! Mapping between checker properties and keys of the `[checker]` section.

use std::collections::BTreeSet;

use notedb_meta::GitConfig;

use crate::checker::{BlockingCondition, CheckerCreation, CheckerStatus, CheckerUpdate};
use crate::error::{CheckerError, CheckerResult};
use crate::uuid::CheckerUuid;

pub(crate) const SECTION: &str = "checker";

/// Checker properties as read from a config, before timestamps and the ref
/// state are attached.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct CheckerProperties {
    pub name: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub repository: String,
    pub status: CheckerStatus,
    pub blocking: BTreeSet<BlockingCondition>,
    pub query: Option<String>,
}

/// One property of a checker and how it is stored.
pub(crate) trait CheckerConfigEntry: Sync {
    fn key(&self) -> &'static str;

    fn read_from_config(
        &self,
        uuid: &CheckerUuid,
        config: &GitConfig,
        properties: &mut CheckerProperties,
    ) -> CheckerResult<()>;

    /// Write the initial value for a new checker, replacing whatever the
    /// config holds.
    fn init_new_config(&self, _config: &mut GitConfig, _creation: &CheckerCreation) {}

    fn update_config_value(&self, config: &mut GitConfig, update: &CheckerUpdate);
}

/// Every entry, in the order keys are written.
pub(crate) const ENTRIES: [&dyn CheckerConfigEntry; 7] = [
    &NameEntry,
    &DescriptionEntry,
    &UrlEntry,
    &RepositoryEntry,
    &StatusEntry,
    &BlockingEntry,
    &QueryEntry,
];

pub(crate) fn read_properties(
    uuid: &CheckerUuid,
    config: &GitConfig,
) -> CheckerResult<CheckerProperties> {
    let mut properties = CheckerProperties::default();
    for entry in ENTRIES {
        entry.read_from_config(uuid, config, &mut properties)?;
    }
    Ok(properties)
}

pub(crate) fn init_new_config(config: &mut GitConfig, creation: &CheckerCreation) {
    for entry in ENTRIES {
        entry.init_new_config(config, creation);
    }
}

pub(crate) fn apply_update(config: &mut GitConfig, update: &CheckerUpdate) {
    for entry in ENTRIES {
        entry.update_config_value(config, update);
    }
}

fn required(uuid: &CheckerUuid, config: &GitConfig, key: &str) -> CheckerResult<String> {
    match config.get_string(SECTION, None, key) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(CheckerError::malformed(
            uuid.as_str(),
            format!("{key} of checker {uuid} not set"),
        )),
    }
}

fn optional(config: &GitConfig, key: &str) -> Option<String> {
    config
        .get_string(SECTION, None, key)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Set `key`, or remove it when the new value is empty.
fn set_or_unset(config: &mut GitConfig, key: &str, value: Option<&String>) {
    match value.map(String::as_str) {
        Some("") => config.unset(SECTION, None, key),
        Some(value) => config.set_string(SECTION, None, key, value),
        None => {}
    }
}

struct NameEntry;

impl CheckerConfigEntry for NameEntry {
    fn key(&self) -> &'static str {
        "name"
    }

    fn read_from_config(
        &self,
        uuid: &CheckerUuid,
        config: &GitConfig,
        properties: &mut CheckerProperties,
    ) -> CheckerResult<()> {
        properties.name = required(uuid, config, self.key())?;
        Ok(())
    }

    fn init_new_config(&self, config: &mut GitConfig, creation: &CheckerCreation) {
        config.set_string(SECTION, None, self.key(), &creation.name);
    }

    fn update_config_value(&self, config: &mut GitConfig, update: &CheckerUpdate) {
        if let Some(name) = &update.name {
            config.set_string(SECTION, None, self.key(), name);
        }
    }
}

struct DescriptionEntry;

impl CheckerConfigEntry for DescriptionEntry {
    fn key(&self) -> &'static str {
        "description"
    }

    fn read_from_config(
        &self,
        _uuid: &CheckerUuid,
        config: &GitConfig,
        properties: &mut CheckerProperties,
    ) -> CheckerResult<()> {
        properties.description = optional(config, self.key());
        Ok(())
    }

    fn update_config_value(&self, config: &mut GitConfig, update: &CheckerUpdate) {
        set_or_unset(config, self.key(), update.description.as_ref());
    }
}

struct UrlEntry;

impl CheckerConfigEntry for UrlEntry {
    fn key(&self) -> &'static str {
        "url"
    }

    fn read_from_config(
        &self,
        _uuid: &CheckerUuid,
        config: &GitConfig,
        properties: &mut CheckerProperties,
    ) -> CheckerResult<()> {
        properties.url = optional(config, self.key());
        Ok(())
    }

    fn update_config_value(&self, config: &mut GitConfig, update: &CheckerUpdate) {
        set_or_unset(config, self.key(), update.url.as_ref());
    }
}

struct RepositoryEntry;

impl CheckerConfigEntry for RepositoryEntry {
    fn key(&self) -> &'static str {
        "repository"
    }

    fn read_from_config(
        &self,
        uuid: &CheckerUuid,
        config: &GitConfig,
        properties: &mut CheckerProperties,
    ) -> CheckerResult<()> {
        properties.repository = required(uuid, config, self.key())?;
        Ok(())
    }

    fn init_new_config(&self, config: &mut GitConfig, creation: &CheckerCreation) {
        config.set_string(SECTION, None, self.key(), &creation.repository);
    }

    fn update_config_value(&self, config: &mut GitConfig, update: &CheckerUpdate) {
        if let Some(repository) = &update.repository {
            config.set_string(SECTION, None, self.key(), repository);
        }
    }
}

struct StatusEntry;

impl CheckerConfigEntry for StatusEntry {
    fn key(&self) -> &'static str {
        "status"
    }

    fn read_from_config(
        &self,
        uuid: &CheckerUuid,
        config: &GitConfig,
        properties: &mut CheckerProperties,
    ) -> CheckerResult<()> {
        properties.status = match config.get_string(SECTION, None, self.key()) {
            None => CheckerStatus::Enabled,
            Some(value) => CheckerStatus::from_config_value(value).ok_or_else(|| {
                CheckerError::malformed(
                    uuid.as_str(),
                    format!("invalid status of checker {uuid}: {value}"),
                )
            })?,
        };
        Ok(())
    }

    fn init_new_config(&self, config: &mut GitConfig, _creation: &CheckerCreation) {
        config.set_string(
            SECTION,
            None,
            self.key(),
            CheckerStatus::Enabled.as_config_value(),
        );
    }

    fn update_config_value(&self, config: &mut GitConfig, update: &CheckerUpdate) {
        if let Some(status) = update.status {
            config.set_string(SECTION, None, self.key(), status.as_config_value());
        }
    }
}

struct BlockingEntry;

impl CheckerConfigEntry for BlockingEntry {
    fn key(&self) -> &'static str {
        "blocking"
    }

    fn read_from_config(
        &self,
        uuid: &CheckerUuid,
        config: &GitConfig,
        properties: &mut CheckerProperties,
    ) -> CheckerResult<()> {
        properties.blocking = config
            .get_string_list(SECTION, None, self.key())
            .into_iter()
            .map(|value| {
                BlockingCondition::from_config_value(value).ok_or_else(|| {
                    CheckerError::malformed(
                        uuid.as_str(),
                        format!("invalid blocking condition of checker {uuid}: {value}"),
                    )
                })
            })
            .collect::<CheckerResult<_>>()?;
        Ok(())
    }

    fn update_config_value(&self, config: &mut GitConfig, update: &CheckerUpdate) {
        if let Some(blocking) = &update.blocking {
            config.set_string_list(
                SECTION,
                None,
                self.key(),
                blocking.iter().map(BlockingCondition::as_config_value),
            );
        }
    }
}

struct QueryEntry;

impl CheckerConfigEntry for QueryEntry {
    fn key(&self) -> &'static str {
        "query"
    }

    fn read_from_config(
        &self,
        _uuid: &CheckerUuid,
        config: &GitConfig,
        properties: &mut CheckerProperties,
    ) -> CheckerResult<()> {
        properties.query = optional(config, self.key());
        Ok(())
    }

    fn update_config_value(&self, config: &mut GitConfig, update: &CheckerUpdate) {
        set_or_unset(config, self.key(), update.query.as_ref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uuid() -> CheckerUuid {
        CheckerUuid::parse("a9993e364706816aba3e25717850c26c9cd0d89d").unwrap()
    }

    fn creation() -> CheckerCreation {
        CheckerCreation::new(uuid().as_str(), "my-checker", "test-repo")
    }

    #[test]
    fn keys_are_in_declared_order() {
        let keys: Vec<_> = ENTRIES.iter().map(|e| e.key()).collect();
        assert_eq!(
            keys,
            vec!["name", "description", "url", "repository", "status", "blocking", "query"]
        );
    }

    #[test]
    fn new_config_has_mandatory_keys_and_enabled_status() {
        let mut config = GitConfig::new();
        init_new_config(&mut config, &creation());
        assert_eq!(
            config.to_text(),
            "[checker]\n\tname = my-checker\n\trepository = test-repo\n\tstatus = enabled\n"
        );

        let properties = read_properties(&uuid(), &config).unwrap();
        assert_eq!(properties.name, "my-checker");
        assert_eq!(properties.repository, "test-repo");
        assert_eq!(properties.status, CheckerStatus::Enabled);
        assert!(properties.blocking.is_empty());
        assert_eq!(properties.description, None);
    }

    #[test]
    fn init_overwrites_stale_values() {
        let mut config = GitConfig::parse("[checker]\n\tname = old\n\tstatus = disabled\n").unwrap();
        init_new_config(&mut config, &creation());
        assert_eq!(config.get_string(SECTION, None, "name"), Some("my-checker"));
        assert_eq!(config.get_string(SECTION, None, "status"), Some("enabled"));
    }

    #[test]
    fn missing_name_is_malformed() {
        let config = GitConfig::parse("[checker]\n").unwrap();
        let err = read_properties(&uuid(), &config).unwrap_err();
        assert_eq!(err.to_string(), format!("name of checker {} not set", uuid()));
    }

    #[test]
    fn missing_repository_is_malformed() {
        let config = GitConfig::parse("[checker]\n\tname = n\n").unwrap();
        let err = read_properties(&uuid(), &config).unwrap_err();
        assert_eq!(err.to_string(), format!("repository of checker {} not set", uuid()));
    }

    #[test]
    fn invalid_status_and_blocking_are_malformed() {
        let config =
            GitConfig::parse("[checker]\n\tname = n\n\trepository = r\n\tstatus = paused\n").unwrap();
        assert!(matches!(
            read_properties(&uuid(), &config),
            Err(CheckerError::Malformed { .. })
        ));

        let config =
            GitConfig::parse("[checker]\n\tname = n\n\trepository = r\n\tblocking = NEVER\n").unwrap();
        assert!(matches!(
            read_properties(&uuid(), &config),
            Err(CheckerError::Malformed { .. })
        ));
    }

    #[test]
    fn empty_optional_values_unset_the_key() {
        let mut config = GitConfig::new();
        init_new_config(&mut config, &creation());
        apply_update(
            &mut config,
            &CheckerUpdate::default()
                .with_description("desc")
                .with_url("http://example.com/my-checker")
                .with_query("status:open"),
        );
        assert_eq!(config.get_string(SECTION, None, "description"), Some("desc"));

        apply_update(
            &mut config,
            &CheckerUpdate::default()
                .with_description("")
                .with_url("")
                .with_query(""),
        );
        for key in ["description", "url", "query"] {
            assert_eq!(config.get_string(SECTION, None, key), None, "{key}");
        }
    }

    #[test]
    fn blocking_is_multi_valued() {
        let mut config = GitConfig::new();
        init_new_config(&mut config, &creation());
        apply_update(
            &mut config,
            &CheckerUpdate::default().with_blocking([BlockingCondition::StateNotPassing]),
        );
        assert_eq!(
            config.get_string_list(SECTION, None, "blocking"),
            vec!["STATE_NOT_PASSING"]
        );
        let properties = read_properties(&uuid(), &config).unwrap();
        assert!(properties.blocking.contains(&BlockingCondition::StateNotPassing));

        apply_update(&mut config, &CheckerUpdate::default().with_blocking(Vec::new()));
        assert!(config.get_string_list(SECTION, None, "blocking").is_empty());
    }

    #[test]
    fn absent_fields_leave_config_untouched() {
        let mut config = GitConfig::new();
        init_new_config(&mut config, &creation());
        let before = config.clone();
        apply_update(&mut config, &CheckerUpdate::default());
        assert_eq!(config, before);
    }
}
