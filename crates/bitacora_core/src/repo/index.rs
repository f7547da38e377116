//! Ordered ID indexes.
//!
//! # Responsibility
//! - Maintain most-recent-first ID lists under named index keys.
//! - Hide the list encoding from the entity repositories.
//!
//! # Invariants
//! - An index never holds the same ID twice after `prepend`.
//! - `prepend` never reorders an ID that is already present.
//! - An absent or undecodable index reads as empty.

use super::RepoResult;
use crate::codec;
use crate::model::EntityId;
use crate::store::KeyValueStore;
use log::warn;

/// Named index families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexKey<'a> {
    /// Every subject.
    AllSubjects,
    /// Every note.
    AllNotes,
    /// Notes owned by one subject.
    NotesBySubject(&'a str),
}

impl IndexKey<'_> {
    /// Storage key holding this index.
    pub fn storage_key(&self) -> String {
        match self {
            Self::AllSubjects => "subjects:index".to_string(),
            Self::AllNotes => "notes:index".to_string(),
            Self::NotesBySubject(subject_id) => format!("notes:bySubject:{subject_id}"),
        }
    }
}

/// Reads and rewrites index lists in one store.
pub struct IndexManager<'s, S: KeyValueStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: KeyValueStore + ?Sized> IndexManager<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Returns the persisted sequence, or an empty one if absent or corrupt.
    pub fn read_index(&self, index: IndexKey<'_>) -> RepoResult<Vec<EntityId>> {
        let key = index.storage_key();
        let Some(raw) = self.store.get(&key)? else {
            return Ok(Vec::new());
        };

        match codec::decode::<Vec<EntityId>>(&raw) {
            Ok(ids) => Ok(ids),
            Err(err) => {
                warn!(
                    "event=index_decode module=repo status=corrupt key={} error={}",
                    key, err
                );
                Ok(Vec::new())
            }
        }
    }

    /// Inserts `id` at the front unless already present.
    ///
    /// Returns `true` when the index was changed.
    pub fn prepend(&self, index: IndexKey<'_>, id: &str) -> RepoResult<bool> {
        let mut ids = self.read_index(index)?;
        if ids.iter().any(|existing| existing == id) {
            return Ok(false);
        }

        ids.insert(0, id.to_string());
        self.write_index(index, &ids)?;
        Ok(true)
    }

    /// Removes every occurrence of `id` and persists the result.
    ///
    /// Returns how many entries were dropped.
    pub fn remove_id(&self, index: IndexKey<'_>, id: &str) -> RepoResult<usize> {
        let mut ids = self.read_index(index)?;
        let before = ids.len();
        ids.retain(|existing| existing != id);
        self.write_index(index, &ids)?;
        Ok(before - ids.len())
    }

    /// Persists an empty sequence.
    pub fn clear(&self, index: IndexKey<'_>) -> RepoResult<()> {
        self.write_index(index, &[])
    }

    fn write_index(&self, index: IndexKey<'_>, ids: &[EntityId]) -> RepoResult<()> {
        let raw = codec::encode(ids)?;
        self.store.set(&index.storage_key(), &raw)?;
        Ok(())
    }
}
