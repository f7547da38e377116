//! Core domain logic for Bitacora, a personal relationship journal.
//! This crate owns the persisted layout and the index invariants.

pub mod codec;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use codec::{CodecError, Decoded};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::note::{MemorablePreview, Note, NoteKind, NotePatch, Sentiment};
pub use model::subject::{MainChannel, Relationship, Subject, SubjectPatch};
pub use model::{EntityId, ValidationError};
pub use repo::index::{IndexKey, IndexManager};
pub use repo::integrity::{check_integrity, IntegrityReport};
pub use repo::note_repo::{KvNoteRepository, NoteRepository};
pub use repo::subject_repo::{KvSubjectRepository, SubjectRepository};
pub use repo::{RepoError, RepoResult};
pub use service::journal_service::{
    JournalService, NoteDraft, NoteScope, ServiceError, ServiceResult, SubjectDraft,
};
pub use store::{
    open_db, open_db_in_memory, KeyValueStore, MemoryStore, SqliteStore, StoreError, StoreResult,
    STORE_VERSION,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
