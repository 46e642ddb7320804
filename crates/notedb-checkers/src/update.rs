//! Creating and updating checkers.

use std::sync::Arc;

use chrono::Utc;
use notedb_meta::{
    retry, MetaDataUpdate, RefUpdateListener, Repository, RepositoryManager, RetryError,
};
use notedb_types::PersonIdent;
use tracing::debug;

use crate::by_repository::CheckersByRepositoryNotes;
use crate::checker::{Checker, CheckerCreation, CheckerStatus, CheckerUpdate};
use crate::checker_config::CheckerConfig;
use crate::config::CheckersConfig;
use crate::error::{CheckerError, CheckerResult};
use crate::uuid::CheckerUuid;

/// Writes checkers and keeps the by-repository index in step.
///
/// Each write loads the checker ref and the index ref, commits both into
/// one batch, and applies the batch with compare-and-swap on the tips it
/// read. A lock failure reruns the whole sequence from fresh reads, up to
/// the configured number of attempts.
pub struct CheckersUpdate {
    repo_manager: Arc<dyn RepositoryManager>,
    config: CheckersConfig,
    listener: Arc<dyn RefUpdateListener>,
    actor: Option<PersonIdent>,
}

impl CheckersUpdate {
    pub fn new(
        repo_manager: Arc<dyn RepositoryManager>,
        config: CheckersConfig,
        listener: Arc<dyn RefUpdateListener>,
    ) -> Self {
        Self {
            repo_manager,
            config,
            listener,
            actor: None,
        }
    }

    /// Attribute writes to `actor` instead of the server.
    pub fn for_user(mut self, actor: PersonIdent) -> Self {
        self.actor = Some(actor);
        self
    }

    /// Create a checker, then apply `update` on top in the same commit.
    pub fn create_checker(
        &self,
        creation: CheckerCreation,
        update: CheckerUpdate,
    ) -> CheckerResult<Checker> {
        self.with_retry("create", || self.try_create_checker(&creation, &update))
    }

    /// Update an existing checker.
    pub fn update_checker(
        &self,
        uuid: &CheckerUuid,
        update: CheckerUpdate,
    ) -> CheckerResult<Checker> {
        self.with_retry("update", || self.try_update_checker(uuid, &update))
    }

    fn try_create_checker(
        &self,
        creation: &CheckerCreation,
        update: &CheckerUpdate,
    ) -> CheckerResult<Checker> {
        let repo = self.open_repository()?;
        let mut checker_config = CheckerConfig::create_for_new_checker(&repo, creation.clone())?;
        checker_config.set_checker_update(update.clone());
        let mut by_repository = CheckersByRepositoryNotes::load(&repo)?;

        let mut meta = self.new_meta_update();
        checker_config.commit(&repo, &mut meta)?;
        let checker = loaded_checker(&checker_config)?;
        if checker.is_enabled() {
            by_repository.insert(&checker.uuid, &checker.repository);
        }
        by_repository.commit(&repo, &mut meta)?;

        self.execute(&repo, meta)?;
        Ok(checker)
    }

    fn try_update_checker(
        &self,
        uuid: &CheckerUuid,
        update: &CheckerUpdate,
    ) -> CheckerResult<Checker> {
        let repo = self.open_repository()?;
        let mut checker_config = CheckerConfig::load_for_checker(&repo, uuid)?;
        let old = checker_config
            .loaded_checker()
            .cloned()
            .ok_or_else(|| CheckerError::NoSuchChecker(uuid.to_string()))?;
        checker_config.set_checker_update(update.clone());
        let mut by_repository = CheckersByRepositoryNotes::load(&repo)?;

        let mut meta = self.new_meta_update();
        checker_config.commit(&repo, &mut meta)?;
        let checker = loaded_checker(&checker_config)?;
        match checker.status {
            CheckerStatus::Disabled => {
                by_repository.remove(uuid, &old.repository);
                by_repository.remove(uuid, &checker.repository);
            }
            CheckerStatus::Enabled if old.repository == checker.repository => {
                by_repository.insert(uuid, &checker.repository);
            }
            CheckerStatus::Enabled => {
                by_repository.update(uuid, &old.repository, &checker.repository);
            }
        }
        by_repository.commit(&repo, &mut meta)?;

        self.execute(&repo, meta)?;
        Ok(checker)
    }

    fn open_repository(&self) -> CheckerResult<Repository> {
        Ok(self.repo_manager.open_repository(&self.config.all_projects)?)
    }

    fn new_meta_update(&self) -> MetaDataUpdate {
        MetaDataUpdate::new(
            self.config.all_projects.clone(),
            self.config.server_ident(Utc::now()),
            self.actor.clone(),
        )
    }

    fn execute(&self, repo: &Repository, meta: MetaDataUpdate) -> CheckerResult<()> {
        let event = meta.execute(repo)?;
        if !event.updates.is_empty() {
            debug!(project = %event.project, refs = ?event.ref_names(), "checker refs updated");
            self.listener.on_refs_updated(&event);
        }
        Ok(())
    }

    fn with_retry<T>(
        &self,
        action: &str,
        mut op: impl FnMut() -> CheckerResult<T>,
    ) -> CheckerResult<T> {
        retry(&self.config.retry, CheckerError::is_lock_failure, |attempt| {
            if attempt > 1 {
                debug!(action, attempt, "retrying checker write");
            }
            op()
        })
        .map_err(|e| match e {
            RetryError::Exhausted { attempts, last } => CheckerError::RetriesExhausted {
                attempts,
                source: Box::new(last),
            },
            RetryError::Aborted(e) => e,
        })
    }
}

fn loaded_checker(checker_config: &CheckerConfig) -> CheckerResult<Checker> {
    checker_config
        .loaded_checker()
        .cloned()
        .ok_or_else(|| CheckerError::NoSuchChecker(checker_config.uuid().to_string()))
}
