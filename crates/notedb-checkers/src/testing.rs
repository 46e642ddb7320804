//! Fixtures shared by the unit tests of this crate.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use notedb_meta::{InMemoryRepositoryManager, RecordingRefUpdateListener, RetryPolicy, Repository};
use notedb_refs::{InMemoryRefStore, RefError, RefStore, RefUpdate};
use notedb_store::InMemoryObjectStore;
use notedb_types::{ObjectId, PersonIdent};

use crate::checker::{CheckerCreation, CheckerUpdate};
use crate::checkers::Checkers;
use crate::config::CheckersConfig;
use crate::update::CheckersUpdate;
use crate::uuid::CheckerUuid;

/// Ref store that reports a lock failure for the next `failures` batches.
#[derive(Debug, Default)]
pub(crate) struct FlakyRefStore {
    inner: InMemoryRefStore,
    failures: AtomicU32,
    batches: AtomicU32,
}

impl FlakyRefStore {
    pub fn fail_next(&self, failures: u32) {
        self.failures.store(failures, Ordering::SeqCst);
    }

    /// Batches attempted so far, including failed ones.
    pub fn batches(&self) -> u32 {
        self.batches.load(Ordering::SeqCst)
    }
}

impl RefStore for FlakyRefStore {
    fn read_ref(&self, name: &str) -> notedb_refs::Result<Option<ObjectId>> {
        self.inner.read_ref(name)
    }

    fn list_refs(&self, prefix: &str) -> notedb_refs::Result<Vec<(String, ObjectId)>> {
        self.inner.list_refs(prefix)
    }

    fn apply_batch(&self, commands: &[RefUpdate]) -> notedb_refs::Result<()> {
        self.batches.fetch_add(1, Ordering::SeqCst);
        let injected = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            let first = &commands[0];
            return Err(RefError::LockFailure {
                name: first.name.clone(),
                expected: first.old_target,
                actual: first.old_target,
            });
        }
        self.inner.apply_batch(commands)
    }
}

pub(crate) struct Fixture {
    pub manager: Arc<InMemoryRepositoryManager>,
    pub refs: Arc<FlakyRefStore>,
    pub listener: Arc<RecordingRefUpdateListener>,
    pub config: CheckersConfig,
}

impl Fixture {
    pub fn new() -> Self {
        let refs = Arc::new(FlakyRefStore::default());
        let manager = Arc::new(InMemoryRepositoryManager::new());
        manager
            .register(Repository::new(
                "All-Projects",
                Arc::new(InMemoryObjectStore::new()),
                refs.clone(),
            ))
            .unwrap();
        let config = CheckersConfig {
            retry: RetryPolicy::no_backoff(3),
            ..CheckersConfig::default()
        };
        Self {
            manager,
            refs,
            listener: Arc::new(RecordingRefUpdateListener::new()),
            config,
        }
    }

    pub fn repo(&self) -> Repository {
        use notedb_meta::RepositoryManager;
        self.manager.open_repository("All-Projects").unwrap()
    }

    pub fn updates(&self) -> CheckersUpdate {
        CheckersUpdate::new(
            self.manager.clone(),
            self.config.clone(),
            self.listener.clone(),
        )
    }

    pub fn checkers(&self) -> Checkers {
        Checkers::new(self.manager.clone(), self.config.clone())
    }

    /// Create an enabled checker named `name` for `repository`.
    pub fn create(&self, name: &str, repository: &str) -> CheckerUuid {
        let uuid = CheckerUuid::make(name);
        self.updates()
            .create_checker(
                CheckerCreation::new(uuid.as_str(), name, repository),
                CheckerUpdate::default(),
            )
            .unwrap();
        uuid
    }
}

pub(crate) fn alice() -> PersonIdent {
    PersonIdent::new("Alice", "alice@example.com", chrono::Utc::now())
}
