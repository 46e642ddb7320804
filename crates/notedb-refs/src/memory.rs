//! In-memory reference store for testing and ephemeral use.
//!
//! [`InMemoryRefStore`] stores all refs in a `BTreeMap` protected by a
//! `RwLock`. A batch is verified and applied under a single write lock, which
//! gives the all-or-nothing semantics the [`RefStore`] trait requires.

use std::collections::BTreeMap;
use std::sync::RwLock;

use notedb_types::ObjectId;

use crate::error::{RefError, Result};
use crate::names::validate_ref_name;
use crate::traits::RefStore;
use crate::types::RefUpdate;

/// An in-memory implementation of [`RefStore`].
#[derive(Debug, Default)]
pub struct InMemoryRefStore {
    refs: RwLock<BTreeMap<String, ObjectId>>,
}

impl InMemoryRefStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(e: impl std::fmt::Display) -> RefError {
    RefError::Storage(format!("lock poisoned: {e}"))
}

impl RefStore for InMemoryRefStore {
    fn read_ref(&self, name: &str) -> Result<Option<ObjectId>> {
        let refs = self.refs.read().map_err(poisoned)?;
        Ok(refs.get(name).copied())
    }

    fn list_refs(&self, prefix: &str) -> Result<Vec<(String, ObjectId)>> {
        let refs = self.refs.read().map_err(poisoned)?;
        Ok(refs
            .range(prefix.to_string()..)
            .take_while(|(name, _)| name.starts_with(prefix))
            .map(|(name, id)| (name.clone(), *id))
            .collect())
    }

    fn apply_batch(&self, commands: &[RefUpdate]) -> Result<()> {
        for command in commands {
            validate_ref_name(&command.name)?;
        }

        let mut refs = self.refs.write().map_err(poisoned)?;

        // Verify every precondition before touching anything.
        for command in commands {
            let actual = refs.get(&command.name).copied();
            if actual != command.old_target {
                return Err(RefError::LockFailure {
                    name: command.name.clone(),
                    expected: command.old_target,
                    actual,
                });
            }
        }

        for command in commands {
            match command.new_target {
                Some(target) => {
                    refs.insert(command.name.clone(), target);
                }
                None => {
                    refs.remove(&command.name);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(seed: u8) -> ObjectId {
        ObjectId::from_hash([seed; 32])
    }

    #[test]
    fn create_and_read() {
        let store = InMemoryRefStore::new();
        store
            .compare_and_swap("refs/meta/checkers", None, Some(id(1)))
            .unwrap();
        assert_eq!(store.read_ref("refs/meta/checkers").unwrap(), Some(id(1)));
        assert_eq!(store.read_ref("refs/missing").unwrap(), None);
    }

    #[test]
    fn create_fails_if_ref_exists() {
        let store = InMemoryRefStore::new();
        store.compare_and_swap("refs/x", None, Some(id(1))).unwrap();
        let err = store
            .compare_and_swap("refs/x", None, Some(id(2)))
            .unwrap_err();
        match err {
            RefError::LockFailure {
                expected, actual, ..
            } => {
                assert_eq!(expected, None);
                assert_eq!(actual, Some(id(1)));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(store.read_ref("refs/x").unwrap(), Some(id(1)));
    }

    #[test]
    fn stale_expected_value_is_rejected() {
        let store = InMemoryRefStore::new();
        store.compare_and_swap("refs/x", None, Some(id(1))).unwrap();
        store
            .compare_and_swap("refs/x", Some(id(1)), Some(id(2)))
            .unwrap();
        let err = store
            .compare_and_swap("refs/x", Some(id(1)), Some(id(3)))
            .unwrap_err();
        assert!(err.is_lock_failure());
        assert_eq!(store.read_ref("refs/x").unwrap(), Some(id(2)));
    }

    #[test]
    fn delete_ref() {
        let store = InMemoryRefStore::new();
        store.compare_and_swap("refs/x", None, Some(id(1))).unwrap();
        store.compare_and_swap("refs/x", Some(id(1)), None).unwrap();
        assert_eq!(store.read_ref("refs/x").unwrap(), None);
    }

    #[test]
    fn batch_is_all_or_nothing() {
        let store = InMemoryRefStore::new();
        store.compare_and_swap("refs/b", None, Some(id(9))).unwrap();

        let commands = vec![
            RefUpdate::new("refs/a", None, Some(id(1))),
            // Stale: refs/b already exists.
            RefUpdate::new("refs/b", None, Some(id(2))),
        ];
        let err = store.apply_batch(&commands).unwrap_err();
        assert!(err.is_lock_failure());
        assert_eq!(store.read_ref("refs/a").unwrap(), None);
        assert_eq!(store.read_ref("refs/b").unwrap(), Some(id(9)));
    }

    #[test]
    fn invalid_names_rejected_before_applying() {
        let store = InMemoryRefStore::new();
        let commands = vec![
            RefUpdate::new("refs/ok", None, Some(id(1))),
            RefUpdate::new("not-a-ref", None, Some(id(2))),
        ];
        assert!(matches!(
            store.apply_batch(&commands),
            Err(RefError::InvalidRefName { .. })
        ));
        assert_eq!(store.read_ref("refs/ok").unwrap(), None);
    }

    #[test]
    fn list_by_prefix_is_sorted() {
        let store = InMemoryRefStore::new();
        for (name, seed) in [
            ("refs/checkers/bb/b", 2),
            ("refs/checkers/aa/a", 1),
            ("refs/meta/checkers", 3),
        ] {
            store.compare_and_swap(name, None, Some(id(seed))).unwrap();
        }
        let listed = store.list_refs("refs/checkers/").unwrap();
        let names: Vec<_> = listed.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["refs/checkers/aa/a", "refs/checkers/bb/b"]);
        assert_eq!(store.list_refs("").unwrap().len(), 3);
    }

    #[test]
    fn concurrent_creates_have_one_winner() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(InMemoryRefStore::new());
        let handles: Vec<_> = (1..=8u8)
            .map(|seed| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.compare_and_swap("refs/race", None, Some(id(seed))))
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().expect("thread should not panic"))
            .filter(|r| r.is_ok())
            .count();
        assert_eq!(winners, 1);
    }
}
