use notedb_types::ObjectId;

use crate::error::{StoreError, StoreResult};
use crate::object::{Blob, Commit, StoredObject, Tree};

/// Content-addressed object store.
///
/// All implementations must satisfy these invariants:
/// - Objects are immutable once written. The same data always produces the
///   same ID.
/// - Concurrent reads are always safe (objects are immutable).
/// - The store never interprets object contents; it is a pure key-value store.
/// - All I/O errors are propagated, never silently ignored.
///
/// The typed `read_*`/`write_*` helpers are provided on top of the raw
/// `read`/`write` pair and fail with [`StoreError::NotFound`] for missing ids.
pub trait ObjectStore: Send + Sync {
    /// Read an object by its content-addressed ID.
    ///
    /// Returns `Ok(None)` if the object does not exist.
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>>;

    /// Write an object and return its content-addressed ID.
    ///
    /// If the object already exists, this is a no-op (idempotent).
    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId>;

    /// Check whether an object exists in the store.
    fn exists(&self, id: &ObjectId) -> StoreResult<bool>;

    /// Read an object that must exist.
    fn read_existing(&self, id: &ObjectId) -> StoreResult<StoredObject> {
        self.read(id)?.ok_or(StoreError::NotFound(*id))
    }

    fn read_blob(&self, id: &ObjectId) -> StoreResult<Blob> {
        Blob::from_stored_object(&self.read_existing(id)?)
    }

    fn read_tree(&self, id: &ObjectId) -> StoreResult<Tree> {
        Tree::from_stored_object(&self.read_existing(id)?)
    }

    fn read_commit(&self, id: &ObjectId) -> StoreResult<Commit> {
        Commit::from_stored_object(&self.read_existing(id)?)
    }

    fn write_blob(&self, blob: &Blob) -> StoreResult<ObjectId> {
        self.write(&blob.to_stored_object())
    }

    fn write_tree(&self, tree: &Tree) -> StoreResult<ObjectId> {
        self.write(&tree.to_stored_object()?)
    }

    fn write_commit(&self, commit: &Commit) -> StoreResult<ObjectId> {
        self.write(&commit.to_stored_object()?)
    }
}
