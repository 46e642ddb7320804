use notedb_types::NoteId;
use sha1::{Digest, Sha1};

/// Maps a logical key (for example a repository name) to the note id under
/// which its note is stored.
///
/// SHA-1 is used as a bucketing function, not for integrity: the property that
/// matters is that the same key string always maps to the same note id, so
/// notes written by an existing deployment stay readable.
pub struct NoteKeyHasher;

impl NoteKeyHasher {
    /// Note id for the UTF-8 bytes of `key`.
    pub fn hash(key: &str) -> NoteId {
        NoteId::from_raw(sha1_digest(&[key.as_bytes()]))
    }
}

/// SHA-1 over the concatenation of `parts`.
pub fn sha1_digest(parts: &[&[u8]]) -> [u8; 20] {
    let mut hasher = Sha1::new();
    for part in parts {
        hasher.update(part);
    }
    let digest = hasher.finalize();
    let mut out = [0u8; 20];
    out.copy_from_slice(&digest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_plain_sha1() {
        // sha1("abc")
        assert_eq!(
            NoteKeyHasher::hash("abc").to_hex(),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }

    #[test]
    fn same_key_same_note() {
        assert_eq!(NoteKeyHasher::hash("my-repo"), NoteKeyHasher::hash("my-repo"));
        assert_ne!(NoteKeyHasher::hash("my-repo"), NoteKeyHasher::hash("my-repo2"));
    }

    #[test]
    fn digest_of_parts_is_concatenation() {
        assert_eq!(sha1_digest(&[b"ab", b"c"]), sha1_digest(&[b"abc"]));
    }
}
