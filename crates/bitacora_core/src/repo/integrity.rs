//! Read-only index/store drift report.
//!
//! Repositories tolerate drift between indexes and records instead of
//! repairing it. This module only measures it, for diagnostics.

use super::index::{IndexKey, IndexManager};
use super::{note_key, read_record, subject_key, RepoResult};
use crate::model::note::Note;
use crate::model::subject::Subject;
use crate::model::EntityId;
use crate::store::KeyValueStore;
use std::collections::BTreeSet;

const SUBJECT_PREFIX: &str = "subject:";
const NOTE_PREFIX: &str = "note:";
const BY_SUBJECT_PREFIX: &str = "notes:bySubject:";

/// Drift found between indexes and stored records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegrityReport {
    /// IDs in `subjects:index` without a decodable record.
    pub dangling_subject_ids: Vec<EntityId>,
    /// IDs in `notes:index` without a decodable record.
    pub dangling_note_ids: Vec<EntityId>,
    /// `(subject_id, note_id)` pairs listed under a subject the note does
    /// not currently belong to, or whose note is gone.
    pub misplaced_subject_entries: Vec<(EntityId, EntityId)>,
    /// Subject records missing from `subjects:index`.
    pub unindexed_subject_ids: Vec<EntityId>,
    /// Note records missing from `notes:index`.
    pub unindexed_note_ids: Vec<EntityId>,
    /// Notes whose `subject_id` does not resolve to a subject.
    pub orphan_note_ids: Vec<EntityId>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self == &Self::default()
    }
}

/// Scans the whole store and reports index/record drift.
pub fn check_integrity<S: KeyValueStore + ?Sized>(store: &S) -> RepoResult<IntegrityReport> {
    let index = IndexManager::new(store);
    let mut report = IntegrityReport::default();

    let subject_ids = index.read_index(IndexKey::AllSubjects)?;
    for id in &subject_ids {
        if read_record::<Subject, _>(store, &subject_key(id))?.is_none() {
            report.dangling_subject_ids.push(id.clone());
        }
    }

    let note_ids = index.read_index(IndexKey::AllNotes)?;
    for id in &note_ids {
        match read_record::<Note, _>(store, &note_key(id))? {
            None => report.dangling_note_ids.push(id.clone()),
            Some(note) => {
                if read_record::<Subject, _>(store, &subject_key(&note.subject_id))?.is_none() {
                    report.orphan_note_ids.push(id.clone());
                }
            }
        }
    }

    let indexed_subjects: BTreeSet<&str> = subject_ids.iter().map(String::as_str).collect();
    for key in store.keys_with_prefix(SUBJECT_PREFIX)? {
        let id = &key[SUBJECT_PREFIX.len()..];
        if !indexed_subjects.contains(id) {
            report.unindexed_subject_ids.push(id.to_string());
        }
    }

    let indexed_notes: BTreeSet<&str> = note_ids.iter().map(String::as_str).collect();
    for key in store.keys_with_prefix(NOTE_PREFIX)? {
        let id = &key[NOTE_PREFIX.len()..];
        if !indexed_notes.contains(id) {
            report.unindexed_note_ids.push(id.to_string());
        }
    }

    for key in store.keys_with_prefix(BY_SUBJECT_PREFIX)? {
        let subject_id = &key[BY_SUBJECT_PREFIX.len()..];
        for note_id in index.read_index(IndexKey::NotesBySubject(subject_id))? {
            let owned = read_record::<Note, _>(store, &note_key(&note_id))?
                .is_some_and(|note| note.subject_id == subject_id);
            if !owned {
                report
                    .misplaced_subject_entries
                    .push((subject_id.to_string(), note_id));
            }
        }
    }

    Ok(report)
}
