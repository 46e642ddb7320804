//! Identities and the ref batch shared by the commits of one logical write.

use notedb_refs::{BatchRefUpdate, RefUpdate};
use notedb_types::PersonIdent;
use tracing::debug;

use crate::error::MetaResult;
use crate::events::RefUpdatedEvent;
use crate::repository::Repository;

/// One logical metadata write.
///
/// Every [`crate::RefSnapshot::commit`] made with the same update stages its
/// ref command in the same batch, so entity refs and index refs move
/// together or not at all.
#[derive(Debug)]
pub struct MetaDataUpdate {
    project: String,
    author: PersonIdent,
    committer: PersonIdent,
    actor: Option<PersonIdent>,
    batch: BatchRefUpdate,
}

impl MetaDataUpdate {
    /// The author is the acting user when known, otherwise the server; the
    /// committer is always the server.
    pub fn new(
        project: impl Into<String>,
        server_ident: PersonIdent,
        actor: Option<PersonIdent>,
    ) -> Self {
        Self {
            project: project.into(),
            author: actor.clone().unwrap_or_else(|| server_ident.clone()),
            committer: server_ident,
            actor,
            batch: BatchRefUpdate::new(),
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn author(&self) -> &PersonIdent {
        &self.author
    }

    pub fn committer(&self) -> &PersonIdent {
        &self.committer
    }

    pub fn actor(&self) -> Option<&PersonIdent> {
        self.actor.as_ref()
    }

    pub fn batch(&self) -> &BatchRefUpdate {
        &self.batch
    }

    pub fn add_ref_update(&mut self, command: RefUpdate) -> MetaResult<()> {
        Ok(self.batch.add_command(command)?)
    }

    /// Apply the staged commands atomically.
    ///
    /// An empty batch is not sent to the ref store and yields an event with
    /// no updates.
    pub fn execute(self, repo: &Repository) -> MetaResult<RefUpdatedEvent> {
        let updates = if self.batch.is_empty() {
            debug!(project = %self.project, "no ref updates staged");
            Vec::new()
        } else {
            self.batch.execute(repo.refs())?
        };
        Ok(RefUpdatedEvent {
            project: self.project,
            updates,
            actor: self.actor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use notedb_types::ObjectId;

    fn server() -> PersonIdent {
        PersonIdent::new("Gerrit Server", "noreply@gerritcodereview.com", Utc::now())
    }

    #[test]
    fn author_defaults_to_server() {
        let update = MetaDataUpdate::new("All-Projects", server(), None);
        assert_eq!(update.author().name, "Gerrit Server");
        assert_eq!(update.committer().name, "Gerrit Server");
        assert!(update.actor().is_none());
    }

    #[test]
    fn actor_becomes_author() {
        let actor = PersonIdent::new("Alice", "alice@example.com", Utc::now());
        let update = MetaDataUpdate::new("All-Projects", server(), Some(actor));
        assert_eq!(update.author().name, "Alice");
        assert_eq!(update.committer().name, "Gerrit Server");
    }

    #[test]
    fn empty_batch_executes_as_no_op() {
        let repo = Repository::in_memory("All-Projects");
        let event = MetaDataUpdate::new("All-Projects", server(), None)
            .execute(&repo)
            .unwrap();
        assert!(event.updates.is_empty());
        assert!(repo.refs_by_prefix("refs/").unwrap().is_empty());
    }

    #[test]
    fn staged_commands_apply_together() {
        let repo = Repository::in_memory("All-Projects");
        let mut update = MetaDataUpdate::new("All-Projects", server(), None);
        update
            .add_ref_update(RefUpdate::new(
                "refs/checkers/ab/abc",
                None,
                Some(ObjectId::from_bytes(b"1")),
            ))
            .unwrap();
        update
            .add_ref_update(RefUpdate::new(
                "refs/meta/checkers",
                None,
                Some(ObjectId::from_bytes(b"2")),
            ))
            .unwrap();
        assert_eq!(update.batch().commands().len(), 2);

        let event = update.execute(&repo).unwrap();
        assert_eq!(event.project, "All-Projects");
        assert_eq!(event.updates.len(), 2);
        assert_eq!(repo.refs_by_prefix("refs/").unwrap().len(), 2);
    }
}
