//! Subject domain model.
//!
//! # Responsibility
//! - Define the person record the journal is written about.
//! - Provide shallow-merge patch semantics for updates.
//!
//! # Invariants
//! - `id` and `created_at` never change after creation.
//! - `name` is non-blank; `trust` is within 1..=5 when set.
//! - Serialized field names follow the stored layout (`nombre`,
//!   `canalPrincipal`, `creadoEn`, ...).

use super::{check_rating, require_id, require_text, EntityId, ValidationError};
use serde::{Deserialize, Serialize};

/// How the user is related to a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    Amigo,
    Familia,
    Pareja,
    Cliente,
    Colega,
    Otro,
}

/// Medium through which an interaction happens.
///
/// Shared by `Subject::main_channel` and `Note::channel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MainChannel {
    Presencial,
    Chat,
    Llamada,
    Email,
    RedSocial,
}

/// A person being journaled about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: EntityId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(rename = "relacion", default, skip_serializing_if = "Option::is_none")]
    pub relationship: Option<Relationship>,
    #[serde(
        rename = "canalPrincipal",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub main_channel: Option<MainChannel>,
    #[serde(rename = "notaInicial", default, skip_serializing_if = "Option::is_none")]
    pub initial_note: Option<String>,
    /// Trust level, 1..=5.
    #[serde(rename = "confianza", default, skip_serializing_if = "Option::is_none")]
    pub trust: Option<u8>,
    #[serde(rename = "etiquetas", default)]
    pub tags: Vec<String>,
    /// Creation timestamp as stored (RFC 3339 when produced by this crate).
    #[serde(rename = "creadoEn")]
    pub created_at: String,
}

impl Subject {
    /// Creates a subject with only the required fields set.
    pub fn new(
        id: impl Into<EntityId>,
        name: impl Into<String>,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            alias: None,
            relationship: None,
            main_channel: None,
            initial_note: None,
            trust: None,
            tags: Vec::new(),
            created_at: created_at.into(),
        }
    }

    /// Checks write-path invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_id(&self.id)?;
        require_text("nombre", &self.name)?;
        check_rating("confianza", self.trust)?;
        Ok(())
    }

    /// Shallow-merges `patch` onto this record. Absent patch fields are kept.
    pub fn apply_patch(&mut self, patch: SubjectPatch) {
        let SubjectPatch {
            name,
            alias,
            relationship,
            main_channel,
            initial_note,
            trust,
            tags,
        } = patch;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(alias) = alias {
            self.alias = alias;
        }
        if let Some(relationship) = relationship {
            self.relationship = relationship;
        }
        if let Some(main_channel) = main_channel {
            self.main_channel = main_channel;
        }
        if let Some(initial_note) = initial_note {
            self.initial_note = initial_note;
        }
        if let Some(trust) = trust {
            self.trust = trust;
        }
        if let Some(tags) = tags {
            self.tags = tags;
        }
    }
}

/// Partial update for a `Subject`.
///
/// Outer `None` keeps the current value. For optional fields,
/// `Some(None)` clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectPatch {
    pub name: Option<String>,
    pub alias: Option<Option<String>>,
    pub relationship: Option<Option<Relationship>>,
    pub main_channel: Option<Option<MainChannel>>,
    pub initial_note: Option<Option<String>>,
    pub trust: Option<Option<u8>>,
    pub tags: Option<Vec<String>>,
}
