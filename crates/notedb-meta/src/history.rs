//! Timestamps derived from a metadata ref's commit history.

use chrono::{DateTime, Utc};
use notedb_types::ObjectId;

use crate::error::MetaResult;
use crate::repository::Repository;

/// Creation and last-update time of an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommitTimes {
    /// Committer time of the root commit.
    pub created_on: DateTime<Utc>,
    /// Committer time of the tip commit.
    pub updated_on: DateTime<Utc>,
}

/// Follow first parents from `tip` down to the root commit.
///
/// `created_on` is the root's committer time even when later commits carry
/// earlier timestamps.
pub fn commit_times(repo: &Repository, tip: ObjectId) -> MetaResult<CommitTimes> {
    let tip_commit = repo.objects().read_commit(&tip)?;
    let updated_on = tip_commit.committer.when;
    let mut created_on = updated_on;

    let mut next = tip_commit.parents.first().copied();
    while let Some(id) = next {
        let commit = repo.objects().read_commit(&id)?;
        created_on = commit.committer.when;
        next = commit.parents.first().copied();
    }

    Ok(CommitTimes {
        created_on,
        updated_on,
    })
}
