//! Repository layer over the key-value store.
//!
//! # Responsibility
//! - Keep Subject/Note records and their ID indexes consistent under
//!   create/update/delete.
//! - Own the persisted key layout (`subject:<id>`, `notes:index`, ...).
//!
//! # Invariants
//! - Absent and undecodable records are both reported as `None`; neither is
//!   an error.
//! - Only store transport failures and write-path validation surface as
//!   `RepoError`.
//! - Repositories hold no cache; every call re-reads the store.

pub mod index;
pub mod integrity;
pub mod note_repo;
pub mod subject_repo;

use crate::codec::{self, CodecError};
use crate::model::ValidationError;
use crate::store::{KeyValueStore, StoreError};
use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for journal persistence operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Store(StoreError),
    Codec(CodecError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "invalid record: {err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Codec(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Codec(err) => Some(err),
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<CodecError> for RepoError {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}

/// Storage key of one subject record.
pub fn subject_key(id: &str) -> String {
    format!("subject:{id}")
}

/// Storage key of one note record.
pub fn note_key(id: &str) -> String {
    format!("note:{id}")
}

/// Reads and decodes one record; corrupt values are treated as absent.
pub(crate) fn read_record<T, S>(store: &S, key: &str) -> RepoResult<Option<T>>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };

    match codec::decode::<T>(&raw) {
        Ok(record) => Ok(Some(record)),
        Err(err) => {
            warn!(
                "event=record_decode module=repo status=corrupt key={} error={}",
                key, err
            );
            Ok(None)
        }
    }
}

pub(crate) fn write_record<T, S>(store: &S, key: &str, record: &T) -> RepoResult<()>
where
    T: Serialize,
    S: KeyValueStore + ?Sized,
{
    let raw = codec::encode(record)?;
    store.set(key, &raw)?;
    Ok(())
}
