//! Note repository contract and key-value implementation.
//!
//! # Responsibility
//! - Provide CRUD and listing for `Note` records.
//! - Maintain both the global `notes:index` and the per-subject
//!   `notes:bySubject:<subjectId>` indexes.
//!
//! # Invariants
//! - A stored note is listed in the global index and in the index of its
//!   current `subject_id`, and nowhere else.
//! - `update` moving a note to another subject, or `create` overwriting an
//!   ID under a different subject, relocates it between per-subject indexes.
//! - `remove` of an absent or corrupt note is a complete no-op, since the
//!   owning subject cannot be determined.

use super::index::{IndexKey, IndexManager};
use super::{note_key, read_record, write_record, RepoResult};
use crate::model::note::{Note, NotePatch};
use crate::model::EntityId;
use crate::store::KeyValueStore;
use log::debug;
use std::collections::BTreeSet;

/// Repository interface for note operations.
pub trait NoteRepository {
    /// Lists every note, most recently created first.
    fn list(&self) -> RepoResult<Vec<Note>>;
    /// Lists the notes of one subject; empty for unknown subjects.
    fn list_by_subject(&self, subject_id: &str) -> RepoResult<Vec<Note>>;
    /// Gets one note; `None` when absent or corrupt.
    fn get(&self, id: &str) -> RepoResult<Option<Note>>;
    /// Stores `note` under its caller-supplied ID and returns it.
    fn create(&self, note: &Note) -> RepoResult<Note>;
    /// Shallow-merges `patch`; `None` when the note does not exist.
    fn update(&self, id: &str, patch: NotePatch) -> RepoResult<Option<Note>>;
    /// Deletes one note and drops it from both indexes.
    fn remove(&self, id: &str) -> RepoResult<()>;
    /// Deletes every indexed note and empties the affected indexes.
    fn clear(&self) -> RepoResult<()>;
}

/// Note repository backed by any `KeyValueStore`.
pub struct KvNoteRepository<'s, S: KeyValueStore + ?Sized> {
    store: &'s S,
    index: IndexManager<'s, S>,
}

impl<'s, S: KeyValueStore + ?Sized> KvNoteRepository<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self {
            store,
            index: IndexManager::new(store),
        }
    }

    fn resolve(&self, ids: &[EntityId]) -> RepoResult<Vec<Note>> {
        let mut notes = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(note) = self.get(id)? {
                notes.push(note);
            }
        }
        Ok(notes)
    }
}

impl<S: KeyValueStore + ?Sized> NoteRepository for KvNoteRepository<'_, S> {
    fn list(&self) -> RepoResult<Vec<Note>> {
        let ids = self.index.read_index(IndexKey::AllNotes)?;
        self.resolve(&ids)
    }

    fn list_by_subject(&self, subject_id: &str) -> RepoResult<Vec<Note>> {
        let ids = self
            .index
            .read_index(IndexKey::NotesBySubject(subject_id))?;
        self.resolve(&ids)
    }

    fn get(&self, id: &str) -> RepoResult<Option<Note>> {
        read_record(self.store, &note_key(id))
    }

    fn create(&self, note: &Note) -> RepoResult<Note> {
        note.validate()?;

        if let Some(previous) = self.get(&note.id)? {
            if previous.subject_id != note.subject_id {
                self.index
                    .remove_id(IndexKey::NotesBySubject(&previous.subject_id), &note.id)?;
                debug!("event=note_relocate module=repo status=ok");
            }
        }

        self.index.prepend(IndexKey::AllNotes, &note.id)?;
        self.index
            .prepend(IndexKey::NotesBySubject(&note.subject_id), &note.id)?;
        write_record(self.store, &note_key(&note.id), note)?;
        debug!("event=note_create module=repo status=ok");
        Ok(note.clone())
    }

    fn update(&self, id: &str, patch: NotePatch) -> RepoResult<Option<Note>> {
        let Some(mut note) = self.get(id)? else {
            return Ok(None);
        };

        let previous_subject = note.subject_id.clone();
        note.apply_patch(patch);
        note.validate()?;
        write_record(self.store, &note_key(id), &note)?;

        if note.subject_id != previous_subject {
            self.index
                .remove_id(IndexKey::NotesBySubject(&previous_subject), id)?;
            self.index
                .prepend(IndexKey::NotesBySubject(&note.subject_id), id)?;
            debug!("event=note_relocate module=repo status=ok");
        }

        Ok(Some(note))
    }

    fn remove(&self, id: &str) -> RepoResult<()> {
        let Some(note) = self.get(id)? else {
            return Ok(());
        };

        self.index.remove_id(IndexKey::AllNotes, id)?;
        self.index
            .remove_id(IndexKey::NotesBySubject(&note.subject_id), id)?;
        self.store.remove(&note_key(id))?;
        Ok(())
    }

    fn clear(&self) -> RepoResult<()> {
        let ids = self.index.read_index(IndexKey::AllNotes)?;
        let mut owners = BTreeSet::new();
        for id in &ids {
            if let Some(note) = self.get(id)? {
                owners.insert(note.subject_id);
            }
            self.store.remove(&note_key(id))?;
        }

        for subject_id in &owners {
            self.index.clear(IndexKey::NotesBySubject(subject_id))?;
        }
        self.index.clear(IndexKey::AllNotes)?;
        debug!(
            "event=note_clear module=repo status=ok removed={} subject_indexes={}",
            ids.len(),
            owners.len()
        );
        Ok(())
    }
}
