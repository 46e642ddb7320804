//! Ref update commands and batches.

use std::collections::BTreeSet;

use notedb_types::ObjectId;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RefError, Result};
use crate::traits::RefStore;

/// A single compare-and-swap command.
///
/// `old_target` is the tip the writer observed (`None` means "the ref must
/// not exist yet"); `new_target` is the desired tip (`None` deletes the ref).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefUpdate {
    pub name: String,
    pub old_target: Option<ObjectId>,
    pub new_target: Option<ObjectId>,
}

impl RefUpdate {
    pub fn new(
        name: impl Into<String>,
        old_target: Option<ObjectId>,
        new_target: Option<ObjectId>,
    ) -> Self {
        Self {
            name: name.into(),
            old_target,
            new_target,
        }
    }

    /// Returns `true` if this command creates the ref.
    pub fn is_create(&self) -> bool {
        self.old_target.is_none() && self.new_target.is_some()
    }

    /// Returns `true` if this command deletes the ref.
    pub fn is_delete(&self) -> bool {
        self.new_target.is_none()
    }
}

/// Collects ref commands and applies them as one atomic unit.
///
/// A batch is single-use: [`BatchRefUpdate::execute`] consumes it. A writer
/// that hits a lock failure builds a fresh batch from fresh reads.
#[derive(Clone, Debug, Default)]
pub struct BatchRefUpdate {
    commands: Vec<RefUpdate>,
}

impl BatchRefUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a command. A ref may appear at most once per batch.
    pub fn add_command(&mut self, command: RefUpdate) -> Result<()> {
        if self.commands.iter().any(|c| c.name == command.name) {
            return Err(RefError::DuplicateCommand { name: command.name });
        }
        self.commands.push(command);
        Ok(())
    }

    pub fn commands(&self) -> &[RefUpdate] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Names of the refs touched by this batch, sorted.
    pub fn ref_names(&self) -> BTreeSet<&str> {
        self.commands.iter().map(|c| c.name.as_str()).collect()
    }

    /// Apply every command atomically against `refs`.
    ///
    /// Returns the applied commands. On a precondition mismatch nothing is
    /// applied and [`RefError::LockFailure`] is returned.
    pub fn execute(self, refs: &dyn RefStore) -> Result<Vec<RefUpdate>> {
        if self.commands.is_empty() {
            return Ok(Vec::new());
        }
        refs.apply_batch(&self.commands)?;
        debug!(commands = self.commands.len(), "ref batch applied");
        Ok(self.commands)
    }
}
