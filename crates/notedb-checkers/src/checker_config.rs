//! A checker's ref: load the stored checker, stage a creation or update,
//! and commit it as a new tip.

use chrono::{DateTime, Utc};
use notedb_meta::{
    commit_times, put_text, GitConfig, MetaDataUpdate, MetaError, RefSnapshot, Repository,
};
use notedb_types::{truncate_to_second, ObjectId};
use tracing::debug;

use crate::checker::{Checker, CheckerCreation, CheckerUpdate};
use crate::config_entry::{self, CheckerProperties, SECTION};
use crate::error::{CheckerError, CheckerResult};
use crate::refs::{checker_ref, CHECKER_CONFIG_FILE};
use crate::uuid::CheckerUuid;

/// Versioned storage of one checker.
///
/// A config is loaded from the ref tip, optionally carries a staged creation
/// and/or update, and on [`CheckerConfig::commit`] writes them as one commit.
/// After a commit the loaded checker reflects the new tip and nothing is
/// staged, so the same value can be committed again.
#[derive(Debug)]
pub struct CheckerConfig {
    uuid: CheckerUuid,
    snapshot: RefSnapshot,
    config: GitConfig,
    loaded: Option<Checker>,
    creation: Option<CheckerCreation>,
    update: Option<CheckerUpdate>,
}

impl CheckerConfig {
    /// Load the checker stored at `uuid`'s ref. A missing ref loads with no
    /// checker; an unparsable or incomplete config is an error.
    pub fn load_for_checker(repo: &Repository, uuid: &CheckerUuid) -> CheckerResult<Self> {
        let snapshot = RefSnapshot::load(repo, &checker_ref(uuid))?;
        let (config, loaded) = match snapshot.revision() {
            Some(revision) => {
                let config = read_config(repo, &snapshot, uuid)?;
                let properties = config_entry::read_properties(uuid, &config)?;
                let times = commit_times(repo, revision)?;
                let checker = build_checker(
                    uuid,
                    properties,
                    times.created_on,
                    times.updated_on,
                    revision,
                );
                (config, Some(checker))
            }
            None => (GitConfig::new(), None),
        };
        Ok(Self {
            uuid: uuid.clone(),
            snapshot,
            config,
            loaded,
            creation: None,
            update: None,
        })
    }

    /// Stage the creation of a new checker.
    ///
    /// Fails with [`CheckerError::InvalidUuid`] for a malformed UUID and
    /// with [`CheckerError::DuplicateKey`] if the ref already exists.
    pub fn create_for_new_checker(
        repo: &Repository,
        creation: CheckerCreation,
    ) -> CheckerResult<Self> {
        let uuid = CheckerUuid::parse(&creation.checker_uuid)?;
        let mut checker_config = Self::load_for_checker(repo, &uuid)?;
        if checker_config.snapshot.revision().is_some() {
            return Err(CheckerError::DuplicateKey(uuid.to_string()));
        }
        checker_config.creation = Some(creation);
        Ok(checker_config)
    }

    pub fn uuid(&self) -> &CheckerUuid {
        &self.uuid
    }

    /// Tip commit as loaded or last committed.
    pub fn revision(&self) -> Option<ObjectId> {
        self.snapshot.revision()
    }

    /// Stage an update. Replaces any previously staged update. An update
    /// that sets no property counts as no change.
    pub fn set_checker_update(&mut self, update: CheckerUpdate) {
        self.update = Some(update);
    }

    /// The checker as loaded or last committed, ignoring staged changes.
    pub fn loaded_checker(&self) -> Option<&Checker> {
        self.loaded.as_ref()
    }

    /// The checker that committing now would produce.
    ///
    /// Pure: nothing is written. Timestamps of a staged change are the
    /// update's `updated_on` or the current time; `ref_state` stays at the
    /// loaded tip (null for a creation).
    pub fn preview(&self) -> CheckerResult<Option<Checker>> {
        if !self.has_staged_changes() {
            return Ok(self.loaded.clone());
        }
        let config = self.staged_config();
        let properties = config_entry::read_properties(&self.uuid, &config)?;
        let when = self.commit_time();
        let created_on = self.loaded.as_ref().map_or(when, |c| c.created_on);
        let ref_state = self.revision().unwrap_or_else(ObjectId::null);
        Ok(Some(build_checker(
            &self.uuid,
            properties,
            created_on,
            when,
            ref_state,
        )))
    }

    /// Commit the staged creation and update.
    ///
    /// Returns `false` if nothing was staged. If the staged changes leave the
    /// config as it is, no commit is written but `true` is still returned.
    pub fn commit(
        &mut self,
        repo: &Repository,
        update: &mut MetaDataUpdate,
    ) -> CheckerResult<bool> {
        if !self.has_staged_changes() {
            return Ok(false);
        }

        let config = self.staged_config();
        self.ensure_mandatory_properties(&config)?;
        let properties = config_entry::read_properties(&self.uuid, &config)?;

        let when = self.commit_time();
        let message = self.commit_message(&properties);
        let mut tree = self.snapshot.tree().clone();
        put_text(repo, &mut tree, CHECKER_CONFIG_FILE, &config.to_text())?;

        let committed = self.snapshot.commit(repo, update, tree, &message, when)?;
        self.creation = None;
        self.update = None;

        if let Some(revision) = committed {
            let times = commit_times(repo, revision)?;
            self.loaded = Some(build_checker(
                &self.uuid,
                properties,
                times.created_on,
                times.updated_on,
                revision,
            ));
            self.config = config;
            debug!(checker = %self.uuid, commit = %revision.short_hex(), "checker committed");
        }
        Ok(true)
    }

    fn has_staged_changes(&self) -> bool {
        self.creation.is_some() || self.update.as_ref().is_some_and(|u| !u.is_empty())
    }

    /// The loaded config with the staged creation, then the staged update,
    /// applied on top.
    fn staged_config(&self) -> GitConfig {
        let mut config = self.config.clone();
        if let Some(creation) = &self.creation {
            config_entry::init_new_config(&mut config, creation);
        }
        if let Some(update) = &self.update {
            config_entry::apply_update(&mut config, update);
        }
        config
    }

    fn commit_time(&self) -> DateTime<Utc> {
        let when = self
            .update
            .as_ref()
            .and_then(|u| u.updated_on)
            .unwrap_or_else(Utc::now);
        truncate_to_second(when)
    }

    fn ensure_mandatory_properties(&self, config: &GitConfig) -> CheckerResult<()> {
        let is_set = |key: &str| {
            config
                .get_string(SECTION, None, key)
                .is_some_and(|v| !v.trim().is_empty())
        };
        if !is_set("name") {
            return Err(CheckerError::malformed(
                self.uuid.as_str(),
                format!("Name of the checker {} must be defined", self.uuid),
            ));
        }
        if !is_set("repository") {
            return Err(CheckerError::malformed(
                self.uuid.as_str(),
                format!("Repository of the checker {} must be defined", self.uuid),
            ));
        }
        Ok(())
    }

    fn commit_message(&self, properties: &CheckerProperties) -> String {
        match &self.loaded {
            Some(old) if self.creation.is_none() => {
                if old.name != properties.name {
                    format!(
                        "Update checker\n\nRename from {} to {}",
                        old.name, properties.name
                    )
                } else {
                    "Update checker".to_string()
                }
            }
            _ => "Create checker".to_string(),
        }
    }
}

fn read_config(
    repo: &Repository,
    snapshot: &RefSnapshot,
    uuid: &CheckerUuid,
) -> CheckerResult<GitConfig> {
    snapshot
        .read_config(repo, CHECKER_CONFIG_FILE)
        .map_err(|e| match e {
            MetaError::ConfigInvalid { .. } | MetaError::NotText { .. } => {
                CheckerError::malformed(uuid.as_str(), e.to_string())
            }
            other => other.into(),
        })
}

fn build_checker(
    uuid: &CheckerUuid,
    properties: CheckerProperties,
    created_on: DateTime<Utc>,
    updated_on: DateTime<Utc>,
    ref_state: ObjectId,
) -> Checker {
    Checker {
        uuid: uuid.clone(),
        name: properties.name,
        description: properties.description,
        url: properties.url,
        repository: properties.repository,
        status: properties.status,
        blocking: properties.blocking,
        query: properties.query,
        created_on,
        updated_on,
        ref_state,
    }
}
