//! Flat notes trees: one blob per [`NoteId`], named by its hex form.

use std::collections::BTreeMap;

use notedb_store::{Blob, Tree, TreeEntry};
use notedb_types::{NoteId, ObjectId};
use tracing::warn;

use crate::error::MetaResult;
use crate::repository::Repository;

/// A mutable view of a notes tree.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NoteMap {
    notes: BTreeMap<NoteId, ObjectId>,
    // Entries whose names are not note ids; written back untouched.
    other: Vec<TreeEntry>,
}

impl NoteMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tree(tree: &Tree) -> Self {
        let mut map = Self::new();
        for entry in &tree.entries {
            match parse_note_name(&entry.name) {
                Some(id) => {
                    map.notes.insert(id, entry.object_id);
                }
                None => {
                    warn!(name = %entry.name, "ignoring non-note entry in notes tree");
                    map.other.push(entry.clone());
                }
            }
        }
        map
    }

    pub fn to_tree(&self) -> Tree {
        let mut entries = self.other.clone();
        entries.extend(
            self.notes
                .iter()
                .map(|(id, blob)| TreeEntry::file(id.to_hex(), *blob)),
        );
        Tree::new(entries)
    }

    pub fn get(&self, id: &NoteId) -> Option<ObjectId> {
        self.notes.get(id).copied()
    }

    pub fn contains(&self, id: &NoteId) -> bool {
        self.notes.contains_key(id)
    }

    pub fn set(&mut self, id: NoteId, blob: ObjectId) {
        self.notes.insert(id, blob);
    }

    pub fn remove(&mut self, id: &NoteId) -> Option<ObjectId> {
        self.notes.remove(id)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NoteId, &ObjectId)> {
        self.notes.iter()
    }

    /// Text content of the note at `id`.
    pub fn read_text(&self, repo: &Repository, id: &NoteId) -> MetaResult<Option<String>> {
        match self.get(id) {
            Some(blob_id) => {
                let blob = repo.objects().read_blob(&blob_id)?;
                Ok(Some(blob.text()?.to_string()))
            }
            None => Ok(None),
        }
    }

    /// Store `text` as the note at `id`; empty text removes the note.
    pub fn write_text(&mut self, repo: &Repository, id: NoteId, text: &str) -> MetaResult<()> {
        if text.is_empty() {
            self.remove(&id);
            return Ok(());
        }
        let blob_id = repo.objects().write_blob(&Blob::from_text(text))?;
        self.set(id, blob_id);
        Ok(())
    }
}

fn parse_note_name(name: &str) -> Option<NoteId> {
    if name.len() != 40 || !name.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
        return None;
    }
    NoteId::from_hex(name).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(seed: u8) -> NoteId {
        NoteId::from_raw([seed; 20])
    }

    #[test]
    fn write_read_and_remove() {
        let repo = Repository::in_memory("All-Projects");
        let mut map = NoteMap::new();
        map.write_text(&repo, note(1), "a\nb\n").unwrap();
        assert_eq!(map.read_text(&repo, &note(1)).unwrap().as_deref(), Some("a\nb\n"));
        assert_eq!(map.read_text(&repo, &note(2)).unwrap(), None);

        map.write_text(&repo, note(1), "").unwrap();
        assert!(!map.contains(&note(1)));
        assert!(map.is_empty());
    }

    #[test]
    fn tree_round_trip() {
        let repo = Repository::in_memory("All-Projects");
        let mut map = NoteMap::new();
        map.write_text(&repo, note(2), "x\n").unwrap();
        map.write_text(&repo, note(1), "y\n").unwrap();

        let tree = map.to_tree();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.entries[0].name, note(1).to_hex());

        let reread = NoteMap::from_tree(&tree);
        assert_eq!(reread, map);
        assert_eq!(reread.len(), 2);
    }

    #[test]
    fn foreign_entries_are_preserved() {
        let blob = ObjectId::from_bytes(b"readme");
        let tree = Tree::new(vec![
            TreeEntry::file("README", blob),
            TreeEntry::file(note(3).to_hex(), ObjectId::from_bytes(b"n")),
            TreeEntry::file("ABCDEF0123456789ABCDEF0123456789ABCDEF01", blob),
        ]);
        let map = NoteMap::from_tree(&tree);
        assert_eq!(map.len(), 1);
        assert_eq!(map.to_tree(), tree);
    }

    #[test]
    fn equal_maps_give_equal_trees() {
        let repo = Repository::in_memory("All-Projects");
        let mut a = NoteMap::new();
        let mut b = NoteMap::new();
        a.write_text(&repo, note(1), "u\n").unwrap();
        a.write_text(&repo, note(2), "v\n").unwrap();
        b.write_text(&repo, note(2), "v\n").unwrap();
        b.write_text(&repo, note(1), "u\n").unwrap();
        assert_eq!(
            repo.objects().write_tree(&a.to_tree()).unwrap(),
            repo.objects().write_tree(&b.to_tree()).unwrap()
        );
    }
}
