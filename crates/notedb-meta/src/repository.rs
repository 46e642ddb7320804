//! Repository handles and the manager that opens them.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use notedb_refs::{InMemoryRefStore, RefError, RefStore};
use notedb_store::{InMemoryObjectStore, ObjectStore};
use notedb_types::ObjectId;

use crate::error::{MetaError, MetaResult};

/// A named repository: an object store plus a ref store.
///
/// Handles are cheap to clone and are meant to be opened per operation and
/// dropped at its end; nothing is locked while a handle is alive.
#[derive(Clone)]
pub struct Repository {
    name: String,
    objects: Arc<dyn ObjectStore>,
    refs: Arc<dyn RefStore>,
}

impl Repository {
    pub fn new(
        name: impl Into<String>,
        objects: Arc<dyn ObjectStore>,
        refs: Arc<dyn RefStore>,
    ) -> Self {
        Self {
            name: name.into(),
            objects,
            refs,
        }
    }

    /// A fresh repository backed by in-memory stores.
    pub fn in_memory(name: impl Into<String>) -> Self {
        Self::new(
            name,
            Arc::new(InMemoryObjectStore::new()),
            Arc::new(InMemoryRefStore::new()),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn objects(&self) -> &dyn ObjectStore {
        self.objects.as_ref()
    }

    pub fn refs(&self) -> &dyn RefStore {
        self.refs.as_ref()
    }

    /// The commit `ref_name` points to, if the ref exists.
    pub fn exact_ref(&self, ref_name: &str) -> MetaResult<Option<ObjectId>> {
        Ok(self.refs.read_ref(ref_name)?)
    }

    /// All refs below `prefix`, sorted by name.
    pub fn refs_by_prefix(&self, prefix: &str) -> MetaResult<Vec<(String, ObjectId)>> {
        Ok(self.refs.list_refs(prefix)?)
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Opens repositories by name.
pub trait RepositoryManager: Send + Sync {
    fn open_repository(&self, name: &str) -> MetaResult<Repository>;
}

/// Manager holding in-memory repositories, for tests and embedding.
#[derive(Debug, Default)]
pub struct InMemoryRepositoryManager {
    repos: RwLock<HashMap<String, Repository>>,
}

impl InMemoryRepositoryManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty in-memory repository.
    pub fn create_repository(&self, name: &str) -> MetaResult<Repository> {
        self.register(Repository::in_memory(name))
    }

    /// Register an existing handle (for example one with a custom ref store).
    pub fn register(&self, repo: Repository) -> MetaResult<Repository> {
        let mut repos = self.repos.write().map_err(poisoned)?;
        if repos.contains_key(repo.name()) {
            return Err(MetaError::RepositoryExists(repo.name().to_string()));
        }
        repos.insert(repo.name().to_string(), repo.clone());
        Ok(repo)
    }
}

impl RepositoryManager for InMemoryRepositoryManager {
    fn open_repository(&self, name: &str) -> MetaResult<Repository> {
        let repos = self.repos.read().map_err(poisoned)?;
        repos
            .get(name)
            .cloned()
            .ok_or_else(|| MetaError::RepositoryNotFound(name.to_string()))
    }
}

fn poisoned(e: impl std::fmt::Display) -> MetaError {
    MetaError::Ref(RefError::Storage(format!("repository registry lock poisoned: {e}")))
}
