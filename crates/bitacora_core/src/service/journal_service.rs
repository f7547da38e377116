//! Journal use-case service.
//!
//! # Responsibility
//! - Generate IDs and creation timestamps before records reach repositories.
//! - Normalize user-entered text, lists and tags.
//! - Own application policies the repositories leave out: cascade delete,
//!   referential checks on note creation, the memorable-moments view.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - A note is only created for a subject that currently exists.
//! - `delete_subject_cascade` removes notes before the subject.

use crate::model::note::{MemorablePreview, Note, NoteKind, NotePatch, Sentiment};
use crate::model::subject::{MainChannel, Relationship, Subject, SubjectPatch};
use crate::model::{normalize_list, normalize_optional_text, EntityId};
use crate::repo::note_repo::{KvNoteRepository, NoteRepository};
use crate::repo::subject_repo::{KvSubjectRepository, SubjectRepository};
use crate::repo::{RepoError, RepoResult};
use crate::store::KeyValueStore;
use chrono::{SecondsFormat, Utc};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Service error for journal use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Referenced subject does not exist.
    SubjectNotFound(EntityId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SubjectNotFound(id) => write!(f, "subject not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::SubjectNotFound(_) => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Generates a fresh opaque record ID.
pub fn new_entity_id() -> EntityId {
    Uuid::new_v4().to_string()
}

/// Current UTC time in RFC 3339 with millisecond precision.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// User input for a new subject.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectDraft {
    pub name: String,
    pub alias: Option<String>,
    pub relationship: Option<Relationship>,
    pub main_channel: Option<MainChannel>,
    pub initial_note: Option<String>,
    pub trust: Option<u8>,
    pub tags: Vec<String>,
}

/// User input for a new note.
///
/// `timestamp = None` records the interaction as happening now.
/// `channel = None` inherits the subject's main channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDraft {
    pub subject_id: EntityId,
    pub timestamp: Option<String>,
    pub channel: Option<MainChannel>,
    pub kind: Option<NoteKind>,
    pub overall_rating: Option<u8>,
    pub main_topic: Option<String>,
    pub content: String,
    pub positive_points: Vec<String>,
    pub negative_points: Vec<String>,
    pub improvement_points: Vec<String>,
    pub empathy: Option<u8>,
    pub receptivity: Option<u8>,
    pub attention: Option<u8>,
    pub active_listening: Option<u8>,
    pub apt_comments: Option<u8>,
    pub other_aspects: Option<String>,
    pub topic_changes: Option<String>,
    pub is_memorable: bool,
    pub sentiment: Option<Sentiment>,
    pub tags: Vec<String>,
}

/// Which notes a view covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteScope<'a> {
    All,
    Subject(&'a str),
}

/// Journal facade over subject and note repositories.
pub struct JournalService<SR: SubjectRepository, NR: NoteRepository> {
    subjects: SR,
    notes: NR,
}

impl<'s, S: KeyValueStore + ?Sized>
    JournalService<KvSubjectRepository<'s, S>, KvNoteRepository<'s, S>>
{
    /// Builds a service over key-value repositories sharing `store`.
    pub fn over_store(store: &'s S) -> Self {
        Self::new(KvSubjectRepository::new(store), KvNoteRepository::new(store))
    }
}

impl<SR: SubjectRepository, NR: NoteRepository> JournalService<SR, NR> {
    /// Creates a service using the provided repository implementations.
    pub fn new(subjects: SR, notes: NR) -> Self {
        Self { subjects, notes }
    }

    pub fn subjects(&self) -> &SR {
        &self.subjects
    }

    pub fn notes(&self) -> &NR {
        &self.notes
    }

    /// Creates a subject with a generated ID and creation timestamp.
    pub fn create_subject(&self, draft: SubjectDraft) -> ServiceResult<Subject> {
        let subject = Subject {
            id: new_entity_id(),
            name: draft.name.trim().to_string(),
            alias: normalize_optional_text(draft.alias),
            relationship: draft.relationship,
            main_channel: draft.main_channel,
            initial_note: normalize_optional_text(draft.initial_note),
            trust: draft.trust,
            tags: normalize_list(&draft.tags),
            created_at: now_timestamp(),
        };

        let created = self.subjects.create(&subject)?;
        info!("event=subject_create module=service status=ok");
        Ok(created)
    }

    /// Applies a normalized patch; `None` when the subject does not exist.
    pub fn update_subject(
        &self,
        id: &str,
        patch: SubjectPatch,
    ) -> ServiceResult<Option<Subject>> {
        let patch = SubjectPatch {
            name: patch.name.map(|name| name.trim().to_string()),
            alias: patch.alias.map(normalize_optional_text),
            initial_note: patch.initial_note.map(normalize_optional_text),
            tags: patch.tags.map(|tags| normalize_list(&tags)),
            ..patch
        };
        Ok(self.subjects.update(id, patch)?)
    }

    pub fn get_subject(&self, id: &str) -> RepoResult<Option<Subject>> {
        self.subjects.get(id)
    }

    pub fn list_subjects(&self) -> RepoResult<Vec<Subject>> {
        self.subjects.list()
    }

    /// Deletes a subject after deleting every note it owns.
    ///
    /// Returns the number of notes removed. Unknown subjects remove nothing
    /// but still clear any stale index entry.
    pub fn delete_subject_cascade(&self, id: &str) -> ServiceResult<usize> {
        let owned = self.notes.list_by_subject(id)?;
        for note in &owned {
            self.notes.remove(&note.id)?;
        }
        self.subjects.remove(id)?;

        info!(
            "event=subject_delete module=service status=ok cascade=true notes_removed={}",
            owned.len()
        );
        Ok(owned.len())
    }

    /// Creates a note for an existing subject.
    ///
    /// # Errors
    /// - `SubjectNotFound` when `draft.subject_id` does not resolve.
    /// - `Repo(Validation)` when content is blank or a scale is out of range.
    pub fn create_note(&self, draft: NoteDraft) -> ServiceResult<Note> {
        let subject_id = draft.subject_id.trim().to_string();
        let Some(subject) = self.subjects.get(&subject_id)? else {
            return Err(ServiceError::SubjectNotFound(subject_id));
        };

        let note = Note {
            id: new_entity_id(),
            subject_id,
            timestamp: draft.timestamp.unwrap_or_else(now_timestamp),
            channel: draft.channel.or(subject.main_channel),
            kind: draft.kind,
            overall_rating: draft.overall_rating,
            main_topic: normalize_optional_text(draft.main_topic),
            content: draft.content.trim().to_string(),
            positive_points: normalize_list(&draft.positive_points),
            negative_points: normalize_list(&draft.negative_points),
            improvement_points: normalize_list(&draft.improvement_points),
            empathy: draft.empathy,
            receptivity: draft.receptivity,
            attention: draft.attention,
            active_listening: draft.active_listening,
            apt_comments: draft.apt_comments,
            other_aspects: normalize_optional_text(draft.other_aspects),
            topic_changes: normalize_optional_text(draft.topic_changes),
            is_memorable: draft.is_memorable,
            sentiment: draft.sentiment,
            tags: normalize_list(&draft.tags),
        };

        let created = self.notes.create(&note)?;
        info!(
            "event=note_create module=service status=ok memorable={}",
            created.is_memorable
        );
        Ok(created)
    }

    /// Applies a patch to a note; `None` when the note does not exist.
    ///
    /// # Errors
    /// - `SubjectNotFound` when the patch moves the note to an unknown subject.
    pub fn update_note(&self, id: &str, patch: NotePatch) -> ServiceResult<Option<Note>> {
        if let Some(target) = patch.subject_id.as_deref() {
            if self.subjects.get(target)?.is_none() {
                return Err(ServiceError::SubjectNotFound(target.to_string()));
            }
        }
        Ok(self.notes.update(id, patch)?)
    }

    pub fn delete_note(&self, id: &str) -> RepoResult<()> {
        self.notes.remove(id)
    }

    pub fn get_note(&self, id: &str) -> RepoResult<Option<Note>> {
        self.notes.get(id)
    }

    /// Notes of one subject or of the whole journal, most recent first.
    pub fn notes_for(&self, scope: NoteScope<'_>) -> RepoResult<Vec<Note>> {
        match scope {
            NoteScope::All => self.notes.list(),
            NoteScope::Subject(subject_id) => self.notes.list_by_subject(subject_id),
        }
    }

    /// Memorable notes in scope, sorted by interaction time descending.
    pub fn memorable_notes(&self, scope: NoteScope<'_>) -> RepoResult<Vec<MemorablePreview>> {
        let mut memorable: Vec<Note> = self
            .notes_for(scope)?
            .into_iter()
            .filter(|note| note.is_memorable)
            .collect();
        memorable.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(memorable.iter().map(MemorablePreview::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::{new_entity_id, now_timestamp};

    #[test]
    fn generated_ids_are_unique_uuids() {
        let first = new_entity_id();
        let second = new_entity_id();
        assert_ne!(first, second);
        assert!(uuid::Uuid::parse_str(&first).is_ok());
    }

    #[test]
    fn timestamps_are_rfc3339_utc() {
        let value = now_timestamp();
        assert!(value.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&value).is_ok());
    }
}
