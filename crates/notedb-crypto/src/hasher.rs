use notedb_types::ObjectId;

/// Domain-separated BLAKE3 content hasher.
///
/// Each hasher carries a domain tag that is prepended to every hash
/// computation, so a blob and a tree with identical bytes never share an id.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for blob objects (config files, note contents).
    pub const BLOB: Self = Self {
        domain: "notedb-blob-v1",
    };
    /// Hasher for tree objects.
    pub const TREE: Self = Self {
        domain: "notedb-tree-v1",
    };
    /// Hasher for commit objects.
    pub const COMMIT: Self = Self {
        domain: "notedb-commit-v1",
    };

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> ObjectId {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        ObjectId::from_hash(*hasher.finalize().as_bytes())
    }

    /// Verify that data produces the expected object id.
    pub fn verify(&self, data: &[u8], expected: &ObjectId) -> bool {
        self.hash(data) == *expected
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }
}
