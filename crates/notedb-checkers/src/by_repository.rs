//! The checkers-by-repository index on `refs/meta/checkers`.
//!
//! Each repository with enabled checkers has one note, keyed by the SHA-1 of
//! the repository name. The note lists the UUIDs of those checkers, sorted,
//! one per line. A repository without checkers has no note at all.

use std::collections::BTreeSet;

use notedb_crypto::NoteKeyHasher;
use notedb_meta::{MetaDataUpdate, NoteMap, RefSnapshot, Repository};
use notedb_types::{now_truncated, ObjectId};
use tracing::{debug, warn};

use crate::error::CheckerResult;
use crate::refs::REFS_META_CHECKERS;
use crate::uuid::CheckerUuid;

const COMMIT_MESSAGE: &str = "Update checkers by repository";

/// A staged index change, replayed at commit time.
#[derive(Clone, Debug, PartialEq, Eq)]
enum NoteOp {
    Insert {
        uuid: CheckerUuid,
        repository: String,
    },
    Remove {
        uuid: CheckerUuid,
        repository: String,
    },
}

/// Index from repository name to the checkers that apply to it.
#[derive(Debug)]
pub struct CheckersByRepositoryNotes {
    snapshot: RefSnapshot,
    notes: NoteMap,
    pending: Vec<NoteOp>,
}

impl CheckersByRepositoryNotes {
    pub fn load(repo: &Repository) -> CheckerResult<Self> {
        let snapshot = RefSnapshot::load(repo, REFS_META_CHECKERS)?;
        let notes = NoteMap::from_tree(snapshot.tree());
        Ok(Self {
            snapshot,
            notes,
            pending: Vec::new(),
        })
    }

    /// Tip commit as loaded or last committed.
    pub fn revision(&self) -> Option<ObjectId> {
        self.snapshot.revision()
    }

    /// UUIDs of the checkers indexed for `repository`, as loaded. Lines that
    /// are not valid UUIDs are skipped.
    pub fn get(
        &self,
        repo: &Repository,
        repository: &str,
    ) -> CheckerResult<BTreeSet<CheckerUuid>> {
        read_uuids(repo, &self.notes, repository)
    }

    /// Stage adding `uuid` to `repository`'s note.
    pub fn insert(&mut self, uuid: &CheckerUuid, repository: &str) {
        self.pending.push(NoteOp::Insert {
            uuid: uuid.clone(),
            repository: repository.to_string(),
        });
    }

    /// Stage removing `uuid` from `repository`'s note.
    pub fn remove(&mut self, uuid: &CheckerUuid, repository: &str) {
        self.pending.push(NoteOp::Remove {
            uuid: uuid.clone(),
            repository: repository.to_string(),
        });
    }

    /// Stage moving `uuid` from one repository to another.
    pub fn update(&mut self, uuid: &CheckerUuid, old_repository: &str, new_repository: &str) {
        if old_repository == new_repository {
            return;
        }
        self.remove(uuid, old_repository);
        self.insert(uuid, new_repository);
    }

    /// Apply the staged changes and stage a commit of the new notes tree.
    ///
    /// Returns `false` if the resulting tree equals the loaded one, even when
    /// changes were staged.
    pub fn commit(
        &mut self,
        repo: &Repository,
        update: &mut MetaDataUpdate,
    ) -> CheckerResult<bool> {
        if self.pending.is_empty() {
            return Ok(false);
        }

        let mut notes = self.notes.clone();
        let mut footers = BTreeSet::new();
        for op in std::mem::take(&mut self.pending) {
            let (uuid, repository, changed) = match op {
                NoteOp::Insert { uuid, repository } => {
                    let mut uuids = read_uuids(repo, &notes, &repository)?;
                    let changed = uuids.insert(uuid.clone());
                    if changed {
                        write_uuids(repo, &mut notes, &repository, &uuids)?;
                    }
                    (uuid, repository, changed)
                }
                NoteOp::Remove { uuid, repository } => {
                    let mut uuids = read_uuids(repo, &notes, &repository)?;
                    let changed = uuids.remove(&uuid);
                    if changed {
                        write_uuids(repo, &mut notes, &repository, &uuids)?;
                    }
                    (uuid, repository, changed)
                }
            };
            if changed {
                footers.insert(format!("Repository: {repository}"));
                footers.insert(format!("Checker: {uuid}"));
            }
        }

        let mut message = String::from(COMMIT_MESSAGE);
        if !footers.is_empty() {
            message.push_str("\n\n");
            message.push_str(&footers.into_iter().collect::<Vec<_>>().join("\n"));
        }

        let committed = self
            .snapshot
            .commit(repo, update, notes.to_tree(), &message, now_truncated())?;
        if committed.is_none() {
            debug!("checkers-by-repository index unchanged");
            return Ok(false);
        }
        self.notes = notes;
        Ok(true)
    }
}

fn read_uuids(
    repo: &Repository,
    notes: &NoteMap,
    repository: &str,
) -> CheckerResult<BTreeSet<CheckerUuid>> {
    let Some(text) = notes.read_text(repo, &NoteKeyHasher::hash(repository))? else {
        return Ok(BTreeSet::new());
    };
    let mut uuids = BTreeSet::new();
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match CheckerUuid::parse(line) {
            Ok(uuid) => {
                uuids.insert(uuid);
            }
            Err(_) => {
                warn!(repository, entry = line, "skipping invalid checker UUID in index");
            }
        }
    }
    Ok(uuids)
}

fn write_uuids(
    repo: &Repository,
    notes: &mut NoteMap,
    repository: &str,
    uuids: &BTreeSet<CheckerUuid>,
) -> CheckerResult<()> {
    let text: String = uuids.iter().map(|uuid| format!("{uuid}\n")).collect();
    notes.write_text(repo, NoteKeyHasher::hash(repository), &text)?;
    Ok(())
}
