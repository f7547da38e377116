//! Subject repository contract and key-value implementation.
//!
//! # Responsibility
//! - Provide CRUD and listing for `Subject` records.
//! - Keep the `subjects:index` list in step with stored records.
//!
//! # Invariants
//! - `list` preserves index order and silently skips unresolvable IDs.
//! - `create` with an existing ID overwrites the record without duplicating
//!   the index entry.
//! - Removing a subject never touches its notes.

use super::index::{IndexKey, IndexManager};
use super::{read_record, subject_key, write_record, RepoResult};
use crate::model::subject::{Subject, SubjectPatch};
use crate::store::KeyValueStore;
use log::debug;

/// Repository interface for subject operations.
pub trait SubjectRepository {
    /// Lists subjects, most recently created first.
    fn list(&self) -> RepoResult<Vec<Subject>>;
    /// Gets one subject; `None` when absent or corrupt.
    fn get(&self, id: &str) -> RepoResult<Option<Subject>>;
    /// Stores `subject` under its caller-supplied ID and returns it.
    fn create(&self, subject: &Subject) -> RepoResult<Subject>;
    /// Shallow-merges `patch`; `None` when the subject does not exist.
    fn update(&self, id: &str, patch: SubjectPatch) -> RepoResult<Option<Subject>>;
    /// Deletes one subject. Unknown IDs are a no-op.
    fn remove(&self, id: &str) -> RepoResult<()>;
    /// Deletes every indexed subject and empties the index.
    fn clear(&self) -> RepoResult<()>;
}

/// Subject repository backed by any `KeyValueStore`.
pub struct KvSubjectRepository<'s, S: KeyValueStore + ?Sized> {
    store: &'s S,
    index: IndexManager<'s, S>,
}

impl<'s, S: KeyValueStore + ?Sized> KvSubjectRepository<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self {
            store,
            index: IndexManager::new(store),
        }
    }
}

impl<S: KeyValueStore + ?Sized> SubjectRepository for KvSubjectRepository<'_, S> {
    fn list(&self) -> RepoResult<Vec<Subject>> {
        let ids = self.index.read_index(IndexKey::AllSubjects)?;
        let mut subjects = Vec::with_capacity(ids.len());
        for id in &ids {
            if let Some(subject) = self.get(id)? {
                subjects.push(subject);
            }
        }
        Ok(subjects)
    }

    fn get(&self, id: &str) -> RepoResult<Option<Subject>> {
        read_record(self.store, &subject_key(id))
    }

    fn create(&self, subject: &Subject) -> RepoResult<Subject> {
        subject.validate()?;

        let inserted = self.index.prepend(IndexKey::AllSubjects, &subject.id)?;
        write_record(self.store, &subject_key(&subject.id), subject)?;
        debug!(
            "event=subject_create module=repo status=ok new_index_entry={}",
            inserted
        );
        Ok(subject.clone())
    }

    fn update(&self, id: &str, patch: SubjectPatch) -> RepoResult<Option<Subject>> {
        let Some(mut subject) = self.get(id)? else {
            return Ok(None);
        };

        subject.apply_patch(patch);
        subject.validate()?;
        write_record(self.store, &subject_key(id), &subject)?;
        Ok(Some(subject))
    }

    fn remove(&self, id: &str) -> RepoResult<()> {
        self.index.remove_id(IndexKey::AllSubjects, id)?;
        self.store.remove(&subject_key(id))?;
        Ok(())
    }

    fn clear(&self) -> RepoResult<()> {
        let ids = self.index.read_index(IndexKey::AllSubjects)?;
        for id in &ids {
            self.store.remove(&subject_key(id))?;
        }
        self.index.clear(IndexKey::AllSubjects)?;
        debug!(
            "event=subject_clear module=repo status=ok removed={}",
            ids.len()
        );
        Ok(())
    }
}
