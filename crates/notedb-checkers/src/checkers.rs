//! Reading checkers.

use std::sync::Arc;

use notedb_meta::{Repository, RepositoryManager};
use tracing::warn;

use crate::by_repository::CheckersByRepositoryNotes;
use crate::checker::Checker;
use crate::checker_config::CheckerConfig;
use crate::config::CheckersConfig;
use crate::error::{CheckerError, CheckerResult};
use crate::refs::REFS_CHECKERS;
use crate::uuid::CheckerUuid;

/// Read access to the checkers stored in the all-projects repository.
pub struct Checkers {
    repo_manager: Arc<dyn RepositoryManager>,
    config: CheckersConfig,
}

impl Checkers {
    pub fn new(repo_manager: Arc<dyn RepositoryManager>, config: CheckersConfig) -> Self {
        Self {
            repo_manager,
            config,
        }
    }

    /// The checker with `uuid`, or `None` if there is none. A string that is
    /// not a valid UUID finds nothing.
    pub fn get_checker(&self, uuid: &str) -> CheckerResult<Option<Checker>> {
        let Ok(uuid) = CheckerUuid::parse(uuid) else {
            return Ok(None);
        };
        let repo = self.open_repository()?;
        let checker_config = CheckerConfig::load_for_checker(&repo, &uuid)?;
        Ok(checker_config.loaded_checker().cloned())
    }

    /// All checkers, sorted by UUID. Fails if any stored checker is
    /// malformed.
    pub fn list_checkers(&self) -> CheckerResult<Vec<Checker>> {
        let repo = self.open_repository()?;
        let mut checkers = Vec::new();
        for (ref_name, _) in repo.refs_by_prefix(REFS_CHECKERS)? {
            let Some(uuid) = CheckerUuid::from_ref(&ref_name) else {
                continue;
            };
            let checker_config = CheckerConfig::load_for_checker(&repo, &uuid)?;
            checkers.extend(checker_config.loaded_checker().cloned());
        }
        checkers.sort_by(|a, b| a.uuid.cmp(&b.uuid));
        Ok(checkers)
    }

    /// Enabled checkers that apply to `repository`, sorted by UUID.
    ///
    /// Index entries whose checker is gone, malformed, disabled, or moved to
    /// another repository are skipped with a warning.
    pub fn checkers_of(&self, repository: &str) -> CheckerResult<Vec<Checker>> {
        let repo = self.open_repository()?;
        let index = CheckersByRepositoryNotes::load(&repo)?;
        let mut checkers = Vec::new();
        for uuid in index.get(&repo, repository)? {
            let checker = match load_indexed(&repo, &uuid) {
                Ok(Some(checker)) => checker,
                Ok(None) => {
                    warn!(checker = %uuid, repository, "indexed checker does not exist");
                    continue;
                }
                Err(CheckerError::Malformed { reason, .. }) => {
                    warn!(checker = %uuid, repository, %reason, "skipping malformed checker");
                    continue;
                }
                Err(e) => return Err(e),
            };
            if !checker.is_enabled() {
                warn!(checker = %uuid, repository, "indexed checker is disabled");
                continue;
            }
            if checker.repository != repository {
                warn!(
                    checker = %uuid,
                    repository,
                    actual = %checker.repository,
                    "indexed checker applies to another repository"
                );
                continue;
            }
            checkers.push(checker);
        }
        Ok(checkers)
    }

    fn open_repository(&self) -> CheckerResult<Repository> {
        Ok(self.repo_manager.open_repository(&self.config.all_projects)?)
    }
}

fn load_indexed(repo: &Repository, uuid: &CheckerUuid) -> CheckerResult<Option<Checker>> {
    let checker_config = CheckerConfig::load_for_checker(repo, uuid)?;
    Ok(checker_config.loaded_checker().cloned())
}
