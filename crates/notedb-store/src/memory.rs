use std::collections::HashMap;
use std::sync::RwLock;

use notedb_types::ObjectId;

use crate::error::{StoreError, StoreResult};
use crate::object::StoredObject;
use crate::traits::ObjectStore;

/// In-memory, HashMap-based object store.
///
/// Intended for tests and embedding. All objects are held in memory behind a
/// `RwLock` for safe concurrent access. Objects are cloned on read/write.
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<ObjectId, StoredObject>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>> {
        let map = self.objects.read().expect("lock poisoned");
        Ok(map.get(id).cloned())
    }

    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId> {
        let id = object.compute_id();
        if id.is_null() {
            return Err(StoreError::NullObjectId);
        }
        let mut map = self.objects.write().expect("lock poisoned");
        map.entry(id).or_insert_with(|| object.clone());
        Ok(id)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        let map = self.objects.read().expect("lock poisoned");
        Ok(map.contains_key(id))
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryObjectStore")
            .field("object_count", &self.len())
            .finish()
    }
}
