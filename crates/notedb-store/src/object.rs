use serde::{Deserialize, Serialize};
use notedb_crypto::ContentHasher;
use notedb_types::{ObjectId, PersonIdent};

use crate::error::{StoreError, StoreResult};

/// The kind of object stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Raw content (config files, note contents).
    Blob,
    /// Directory listing: ordered entries mapping names to object references.
    Tree,
    /// A root tree plus history metadata.
    Commit,
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blob => write!(f, "blob"),
            Self::Tree => write!(f, "tree"),
            Self::Commit => write!(f, "commit"),
        }
    }
}

/// A stored object: kind tag + serialized data + cached size.
///
/// `StoredObject` is the unit of storage. The store never interprets the
/// contents of the data; it is a pure key-value store keyed by content hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    pub kind: ObjectKind,
    pub data: Vec<u8>,
    pub size: u64,
}

impl StoredObject {
    pub fn new(kind: ObjectKind, data: Vec<u8>) -> Self {
        let size = data.len() as u64;
        Self { kind, data, size }
    }

    /// Compute the content-addressed ID for this object.
    pub fn compute_id(&self) -> ObjectId {
        let hasher = match self.kind {
            ObjectKind::Blob => &ContentHasher::BLOB,
            ObjectKind::Tree => &ContentHasher::TREE,
            ObjectKind::Commit => &ContentHasher::COMMIT,
        };
        hasher.hash(&self.data)
    }

    fn expect_kind(&self, kind: ObjectKind) -> StoreResult<()> {
        if self.kind != kind {
            return Err(StoreError::CorruptObject {
                id: self.compute_id(),
                reason: format!("expected {kind}, got {}", self.kind),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Blob
// ---------------------------------------------------------------------------

/// Raw content object (analogous to git blob).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blob {
    pub data: Vec<u8>,
}

impl Blob {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Blob holding UTF-8 text.
    pub fn from_text(text: &str) -> Self {
        Self::new(text.as_bytes().to_vec())
    }

    pub fn to_stored_object(&self) -> StoredObject {
        StoredObject::new(ObjectKind::Blob, self.data.clone())
    }

    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        obj.expect_kind(ObjectKind::Blob)?;
        Ok(Self {
            data: obj.data.clone(),
        })
    }

    /// Decode the content as UTF-8.
    pub fn text(&self) -> StoreResult<&str> {
        std::str::from_utf8(&self.data).map_err(|e| StoreError::Serialization(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

/// File mode for a tree entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryMode {
    /// Normal file (0o100644).
    Regular,
    /// Subtree / directory (0o040000).
    Directory,
}

impl EntryMode {
    pub fn mode_bits(&self) -> u32 {
        match self {
            Self::Regular => 0o100644,
            Self::Directory => 0o040000,
        }
    }
}

impl std::fmt::Display for EntryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:06o}", self.mode_bits())
    }
}

/// A single entry in a tree object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub mode: EntryMode,
    pub name: String,
    pub object_id: ObjectId,
}

impl TreeEntry {
    pub fn new(mode: EntryMode, name: impl Into<String>, object_id: ObjectId) -> Self {
        Self {
            mode,
            name: name.into(),
            object_id,
        }
    }

    /// A regular file entry.
    pub fn file(name: impl Into<String>, object_id: ObjectId) -> Self {
        Self::new(EntryMode::Regular, name, object_id)
    }
}

impl PartialOrd for TreeEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TreeEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.name.cmp(&other.name)
    }
}

/// Directory listing object (analogous to git tree).
///
/// Entries are kept sorted by name and unique, so two trees with the same
/// content always hash to the same id. That is what lets callers detect a
/// no-op change by comparing tree ids.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    /// Create a tree; entries are sorted and later duplicates win.
    pub fn new(entries: Vec<TreeEntry>) -> Self {
        let mut tree = Self::empty();
        for entry in entries {
            tree.upsert(entry);
        }
        tree
    }

    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn to_stored_object(&self) -> StoreResult<StoredObject> {
        let data =
            serde_json::to_vec(self).map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(StoredObject::new(ObjectKind::Tree, data))
    }

    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        obj.expect_kind(ObjectKind::Tree)?;
        serde_json::from_slice(&obj.data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Look up an entry by name.
    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries
            .binary_search_by(|e| e.name.as_str().cmp(name))
            .ok()
            .map(|idx| &self.entries[idx])
    }

    /// Insert an entry, replacing any entry with the same name.
    pub fn upsert(&mut self, entry: TreeEntry) {
        match self
            .entries
            .binary_search_by(|e| e.name.as_str().cmp(entry.name.as_str()))
        {
            Ok(idx) => self.entries[idx] = entry,
            Err(idx) => self.entries.insert(idx, entry),
        }
    }

    /// Remove an entry by name. Returns the removed entry, if any.
    pub fn remove(&mut self, name: &str) -> Option<TreeEntry> {
        self.entries
            .binary_search_by(|e| e.name.as_str().cmp(name))
            .ok()
            .map(|idx| self.entries.remove(idx))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Commit
// ---------------------------------------------------------------------------

/// History unit: a root tree plus its parents and who/when/why.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub tree: ObjectId,
    pub parents: Vec<ObjectId>,
    pub author: PersonIdent,
    pub committer: PersonIdent,
    pub message: String,
}

impl Commit {
    pub fn to_stored_object(&self) -> StoreResult<StoredObject> {
        let data =
            serde_json::to_vec(self).map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(StoredObject::new(ObjectKind::Commit, data))
    }

    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        obj.expect_kind(ObjectKind::Commit)?;
        serde_json::from_slice(&obj.data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Returns `true` for the first commit of a history.
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn ident(secs: i64) -> PersonIdent {
        PersonIdent::new("Server", "server@example.com", Utc.timestamp_opt(secs, 0).unwrap())
    }

    #[test]
    fn blob_kind_mismatch() {
        let stored = StoredObject::new(ObjectKind::Tree, b"not a blob".to_vec());
        let err = Blob::from_stored_object(&stored).unwrap_err();
        assert!(matches!(err, StoreError::CorruptObject { .. }));
    }

    #[test]
    fn blob_text() {
        let blob = Blob::from_text("[checker]\n");
        assert_eq!(blob.text().unwrap(), "[checker]\n");
        assert!(Blob::new(vec![0xff, 0xfe]).text().is_err());
    }

    #[test]
    fn tree_entries_sorted() {
        let tree = Tree::new(vec![
            TreeEntry::file("zebra.config", ObjectId::null()),
            TreeEntry::file("alpha.config", ObjectId::null()),
            TreeEntry::new(EntryMode::Directory, "middle", ObjectId::null()),
        ]);
        let names: Vec<_> = tree.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["alpha.config", "middle", "zebra.config"]);
    }

    #[test]
    fn tree_upsert_replaces_same_name() {
        let mut tree = Tree::empty();
        tree.upsert(TreeEntry::file("checker.config", ObjectId::from_bytes(b"v1")));
        tree.upsert(TreeEntry::file("checker.config", ObjectId::from_bytes(b"v2")));
        assert_eq!(tree.len(), 1);
        assert_eq!(
            tree.get("checker.config").unwrap().object_id,
            ObjectId::from_bytes(b"v2")
        );
    }

    #[test]
    fn tree_remove() {
        let mut tree = Tree::new(vec![
            TreeEntry::file("a", ObjectId::null()),
            TreeEntry::file("b", ObjectId::null()),
        ]);
        assert!(tree.remove("a").is_some());
        assert!(tree.remove("a").is_none());
        assert!(tree.get("b").is_some());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn equal_trees_share_an_id() {
        let a = Tree::new(vec![
            TreeEntry::file("x", ObjectId::from_bytes(b"x")),
            TreeEntry::file("y", ObjectId::from_bytes(b"y")),
        ]);
        let mut b = Tree::empty();
        b.upsert(TreeEntry::file("y", ObjectId::from_bytes(b"y")));
        b.upsert(TreeEntry::file("x", ObjectId::from_bytes(b"x")));
        assert_eq!(
            a.to_stored_object().unwrap().compute_id(),
            b.to_stored_object().unwrap().compute_id()
        );
    }

    #[test]
    fn commit_decodes_from_stored_object() {
        let commit = Commit {
            tree: ObjectId::from_bytes(b"tree"),
            parents: vec![ObjectId::from_bytes(b"parent")],
            author: ident(100),
            committer: ident(100),
            message: "Update checker".into(),
        };
        let stored = commit.to_stored_object().unwrap();
        assert_eq!(stored.kind, ObjectKind::Commit);
        let decoded = Commit::from_stored_object(&stored).unwrap();
        assert_eq!(decoded, commit);
        assert!(!decoded.is_root());
    }

    #[test]
    fn commit_kind_mismatch() {
        let stored = Blob::from_text("x").to_stored_object();
        assert!(matches!(
            Commit::from_stored_object(&stored),
            Err(StoreError::CorruptObject { .. })
        ));
    }

    #[test]
    fn object_kind_display() {
        assert_eq!(ObjectKind::Blob.to_string(), "blob");
        assert_eq!(ObjectKind::Tree.to_string(), "tree");
        assert_eq!(ObjectKind::Commit.to_string(), "commit");
        assert_eq!(EntryMode::Regular.to_string(), "100644");
    }
}
