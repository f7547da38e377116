//! Note domain model.
//!
//! # Responsibility
//! - Define one journaled interaction tied to a subject.
//! - Provide shallow-merge patch semantics for updates.
//!
//! # Invariants
//! - `id` is immutable; `subject_id` and `content` are non-blank.
//! - Every rating scale is within 1..=5 when set.
//! - Missing list fields and `esMemorable` decode as empty / `false`.

use super::subject::MainChannel;
use super::{check_rating, require_id, require_text, EntityId, ValidationError};
use serde::{Deserialize, Serialize};

/// Social context of an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteKind {
    Escolar,
    Laboral,
    Familiar,
    Amigos,
    Casual,
    Otro,
}

/// Overall tone the user perceived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Negativo,
    Neutral,
    Positivo,
}

/// A single journaled interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: EntityId,
    #[serde(rename = "subjectId")]
    pub subject_id: EntityId,
    /// Interaction time as supplied by the caller.
    pub timestamp: String,
    #[serde(rename = "canal", default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<MainChannel>,
    #[serde(rename = "tipo", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<NoteKind>,
    #[serde(
        rename = "calificacionGeneral",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub overall_rating: Option<u8>,
    #[serde(rename = "temaPrincipal", default, skip_serializing_if = "Option::is_none")]
    pub main_topic: Option<String>,
    #[serde(rename = "contenido")]
    pub content: String,
    #[serde(rename = "puntosPositivos", default)]
    pub positive_points: Vec<String>,
    #[serde(rename = "puntosNegativos", default)]
    pub negative_points: Vec<String>,
    #[serde(rename = "puntosPorMejorar", default)]
    pub improvement_points: Vec<String>,
    #[serde(rename = "escalaEmpatia", default, skip_serializing_if = "Option::is_none")]
    pub empathy: Option<u8>,
    #[serde(
        rename = "escalaReceptividad",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub receptivity: Option<u8>,
    #[serde(rename = "escalaAtencion", default, skip_serializing_if = "Option::is_none")]
    pub attention: Option<u8>,
    #[serde(
        rename = "escalaEscuchaActiva",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub active_listening: Option<u8>,
    #[serde(
        rename = "escalaComentariosAcertados",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub apt_comments: Option<u8>,
    #[serde(rename = "otrosAspectos", default, skip_serializing_if = "Option::is_none")]
    pub other_aspects: Option<String>,
    #[serde(rename = "cambiosDeTema", default, skip_serializing_if = "Option::is_none")]
    pub topic_changes: Option<String>,
    #[serde(rename = "esMemorable", default)]
    pub is_memorable: bool,
    #[serde(rename = "sentimiento", default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
    #[serde(rename = "etiquetas", default)]
    pub tags: Vec<String>,
}

impl Note {
    /// Creates a note with only the required fields set.
    pub fn new(
        id: impl Into<EntityId>,
        subject_id: impl Into<EntityId>,
        timestamp: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            subject_id: subject_id.into(),
            timestamp: timestamp.into(),
            channel: None,
            kind: None,
            overall_rating: None,
            main_topic: None,
            content: content.into(),
            positive_points: Vec::new(),
            negative_points: Vec::new(),
            improvement_points: Vec::new(),
            empathy: None,
            receptivity: None,
            attention: None,
            active_listening: None,
            apt_comments: None,
            other_aspects: None,
            topic_changes: None,
            is_memorable: false,
            sentiment: None,
            tags: Vec::new(),
        }
    }

    /// Checks write-path invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_id(&self.id)?;
        require_text("subjectId", &self.subject_id)?;
        require_text("contenido", &self.content)?;
        check_rating("calificacionGeneral", self.overall_rating)?;
        check_rating("escalaEmpatia", self.empathy)?;
        check_rating("escalaReceptividad", self.receptivity)?;
        check_rating("escalaAtencion", self.attention)?;
        check_rating("escalaEscuchaActiva", self.active_listening)?;
        check_rating("escalaComentariosAcertados", self.apt_comments)?;
        Ok(())
    }

    /// Display title: trimmed main topic or a fixed placeholder.
    pub fn title(&self) -> &str {
        match self.main_topic.as_deref().map(str::trim) {
            Some(topic) if !topic.is_empty() => topic,
            _ => UNTITLED_NOTE,
        }
    }

    /// Shallow-merges `patch` onto this record. Absent patch fields are kept.
    pub fn apply_patch(&mut self, patch: NotePatch) {
        let NotePatch {
            subject_id,
            timestamp,
            channel,
            kind,
            overall_rating,
            main_topic,
            content,
            positive_points,
            negative_points,
            improvement_points,
            empathy,
            receptivity,
            attention,
            active_listening,
            apt_comments,
            other_aspects,
            topic_changes,
            is_memorable,
            sentiment,
            tags,
        } = patch;

        merge(&mut self.subject_id, subject_id);
        merge(&mut self.timestamp, timestamp);
        merge(&mut self.channel, channel);
        merge(&mut self.kind, kind);
        merge(&mut self.overall_rating, overall_rating);
        merge(&mut self.main_topic, main_topic);
        merge(&mut self.content, content);
        merge(&mut self.positive_points, positive_points);
        merge(&mut self.negative_points, negative_points);
        merge(&mut self.improvement_points, improvement_points);
        merge(&mut self.empathy, empathy);
        merge(&mut self.receptivity, receptivity);
        merge(&mut self.attention, attention);
        merge(&mut self.active_listening, active_listening);
        merge(&mut self.apt_comments, apt_comments);
        merge(&mut self.other_aspects, other_aspects);
        merge(&mut self.topic_changes, topic_changes);
        merge(&mut self.is_memorable, is_memorable);
        merge(&mut self.sentiment, sentiment);
        merge(&mut self.tags, tags);
    }
}

/// Placeholder title for notes without a main topic.
pub const UNTITLED_NOTE: &str = "Sin título";

fn merge<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

/// Partial update for a `Note`.
///
/// Outer `None` keeps the current value. For optional fields,
/// `Some(None)` clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePatch {
    pub subject_id: Option<EntityId>,
    pub timestamp: Option<String>,
    pub channel: Option<Option<MainChannel>>,
    pub kind: Option<Option<NoteKind>>,
    pub overall_rating: Option<Option<u8>>,
    pub main_topic: Option<Option<String>>,
    pub content: Option<String>,
    pub positive_points: Option<Vec<String>>,
    pub negative_points: Option<Vec<String>>,
    pub improvement_points: Option<Vec<String>>,
    pub empathy: Option<Option<u8>>,
    pub receptivity: Option<Option<u8>>,
    pub attention: Option<Option<u8>>,
    pub active_listening: Option<Option<u8>>,
    pub apt_comments: Option<Option<u8>>,
    pub other_aspects: Option<Option<String>>,
    pub topic_changes: Option<Option<String>>,
    pub is_memorable: Option<bool>,
    pub sentiment: Option<Option<Sentiment>>,
    pub tags: Option<Vec<String>>,
}

/// Projection used by the memorable-moments view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemorablePreview {
    pub id: EntityId,
    pub subject_id: EntityId,
    pub timestamp: String,
    pub main_topic: Option<String>,
}

impl From<&Note> for MemorablePreview {
    fn from(note: &Note) -> Self {
        Self {
            id: note.id.clone(),
            subject_id: note.subject_id.clone(),
            timestamp: note.timestamp.clone(),
            main_topic: note.main_topic.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Note, NoteKind, NotePatch, Sentiment, UNTITLED_NOTE};
    use crate::model::ValidationError;

    #[test]
    fn decodes_sparse_legacy_record_with_defaults() {
        let raw = r#"{"id":"n1","subjectId":"s1","timestamp":"2024-05-01T10:30:00.000Z","contenido":"charla"}"#;
        let note: Note = serde_json::from_str(raw).unwrap();
        assert_eq!(note, Note::new("n1", "s1", "2024-05-01T10:30:00.000Z", "charla"));
        assert!(!note.is_memorable);
        assert!(note.positive_points.is_empty());
    }

    #[test]
    fn apply_patch_keeps_unpatched_fields() {
        let mut note = Note::new("n1", "s1", "T1", "charla");
        note.kind = Some(NoteKind::Laboral);
        note.empathy = Some(3);
        note.positive_points = vec!["escuchó".to_string()];

        note.apply_patch(NotePatch {
            is_memorable: Some(true),
            sentiment: Some(Some(Sentiment::Positivo)),
            empathy: Some(None),
            ..NotePatch::default()
        });

        assert!(note.is_memorable);
        assert_eq!(note.sentiment, Some(Sentiment::Positivo));
        assert_eq!(note.empathy, None);
        assert_eq!(note.kind, Some(NoteKind::Laboral));
        assert_eq!(note.positive_points, vec!["escuchó".to_string()]);
        assert_eq!(note.content, "charla");
    }

    #[test]
    fn validate_checks_required_text_and_scales() {
        let note = Note::new("n1", " ", "T1", "charla");
        assert_eq!(note.validate(), Err(ValidationError::BlankField("subjectId")));

        let note = Note::new("n1", "s1", "T1", "");
        assert_eq!(note.validate(), Err(ValidationError::BlankField("contenido")));

        let mut note = Note::new("n1", "s1", "T1", "charla");
        note.apt_comments = Some(0);
        assert!(matches!(
            note.validate(),
            Err(ValidationError::RatingOutOfRange {
                field: "escalaComentariosAcertados",
                ..
            })
        ));
    }

    #[test]
    fn title_falls_back_when_topic_blank() {
        let mut note = Note::new("n1", "s1", "T1", "charla");
        assert_eq!(note.title(), UNTITLED_NOTE);
        note.main_topic = Some("  ".to_string());
        assert_eq!(note.title(), UNTITLED_NOTE);
        note.main_topic = Some(" viaje ".to_string());
        assert_eq!(note.title(), "viaje");
    }
}
