//! Point-in-time view of a metadata ref and the commit step on top of it.

use chrono::{DateTime, Utc};
use notedb_refs::RefUpdate;
use notedb_store::{Blob, Commit, Tree, TreeEntry};
use notedb_types::ObjectId;
use tracing::debug;

use crate::config::GitConfig;
use crate::error::{MetaError, MetaResult};
use crate::repository::Repository;
use crate::update::MetaDataUpdate;

/// The tip of a metadata ref as it was when loaded.
///
/// The revision doubles as the compare-and-swap precondition for the next
/// write: [`RefSnapshot::commit`] stages a ref update from `revision` to the
/// new commit, and the batch fails with a lock failure if somebody else
/// moved the ref in between.
#[derive(Clone, Debug)]
pub struct RefSnapshot {
    ref_name: String,
    revision: Option<ObjectId>,
    tree: Tree,
    tree_id: ObjectId,
}

impl RefSnapshot {
    /// Read the current tip of `ref_name`. A missing ref loads as an empty tree.
    pub fn load(repo: &Repository, ref_name: &str) -> MetaResult<Self> {
        let revision = repo.exact_ref(ref_name)?;
        let (tree, tree_id) = match revision {
            Some(rev) => {
                let commit = repo.objects().read_commit(&rev)?;
                (repo.objects().read_tree(&commit.tree)?, commit.tree)
            }
            None => {
                let tree = Tree::empty();
                let tree_id = tree.to_stored_object()?.compute_id();
                (tree, tree_id)
            }
        };
        debug!(ref_name, revision = ?revision, "loaded metadata ref");
        Ok(Self {
            ref_name: ref_name.to_string(),
            revision,
            tree,
            tree_id,
        })
    }

    pub fn ref_name(&self) -> &str {
        &self.ref_name
    }

    /// Tip commit, or `None` if the ref did not exist.
    pub fn revision(&self) -> Option<ObjectId> {
        self.revision
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Raw content of the file `path` in the tip tree.
    pub fn read_file(&self, repo: &Repository, path: &str) -> MetaResult<Option<Vec<u8>>> {
        match self.tree.get(path) {
            Some(entry) => Ok(Some(repo.objects().read_blob(&entry.object_id)?.data)),
            None => Ok(None),
        }
    }

    /// Content of `path` as UTF-8 text.
    pub fn read_text(&self, repo: &Repository, path: &str) -> MetaResult<Option<String>> {
        self.read_file(repo, path)?
            .map(|bytes| {
                String::from_utf8(bytes).map_err(|_| MetaError::NotText {
                    ref_name: self.ref_name.clone(),
                    file: path.to_string(),
                })
            })
            .transpose()
    }

    /// Parse `path` as a config file. A missing file reads as an empty config.
    pub fn read_config(&self, repo: &Repository, path: &str) -> MetaResult<GitConfig> {
        let text = self.read_text(repo, path)?.unwrap_or_default();
        GitConfig::parse(&text).map_err(|source| MetaError::ConfigInvalid {
            ref_name: self.ref_name.clone(),
            file: path.to_string(),
            source,
        })
    }

    /// Write `tree` as the new tip and stage the ref update in `update`.
    ///
    /// Returns `None` without writing a commit when `tree` equals the current
    /// tip tree. On success the snapshot advances to the new commit.
    pub fn commit(
        &mut self,
        repo: &Repository,
        update: &mut MetaDataUpdate,
        tree: Tree,
        message: &str,
        when: DateTime<Utc>,
    ) -> MetaResult<Option<ObjectId>> {
        let tree_id = repo.objects().write_tree(&tree)?;
        if tree_id == self.tree_id {
            debug!(ref_name = %self.ref_name, "tree unchanged, skipping commit");
            return Ok(None);
        }

        let commit = Commit {
            tree: tree_id,
            parents: self.revision.into_iter().collect(),
            author: update.author().with_when(when),
            committer: update.committer().with_when(when),
            message: message.to_string(),
        };
        let commit_id = repo.objects().write_commit(&commit)?;
        update.add_ref_update(RefUpdate::new(
            self.ref_name.clone(),
            self.revision,
            Some(commit_id),
        ))?;
        debug!(
            ref_name = %self.ref_name,
            commit = %commit_id.short_hex(),
            "staged metadata commit"
        );

        self.revision = Some(commit_id);
        self.tree = tree;
        self.tree_id = tree_id;
        Ok(Some(commit_id))
    }
}

/// Store `text` as a blob and point `path` in `tree` at it.
pub fn put_text(repo: &Repository, tree: &mut Tree, path: &str, text: &str) -> MetaResult<()> {
    let blob_id = repo.objects().write_blob(&Blob::from_text(text))?;
    tree.upsert(TreeEntry::file(path, blob_id));
    Ok(())
}
