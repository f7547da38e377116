//! Journal domain model.
//!
//! # Responsibility
//! - Define the Subject and Note records persisted by the repositories.
//! - Define explicit patch types for shallow-merge updates.
//! - Keep the JSON field naming of stored records stable.
//!
//! # Invariants
//! - Every record is identified by a caller-generated, immutable `EntityId`.
//! - `Subject::created_at` is set once and never patched.
//! - Rating scales are within `RATING_MIN..=RATING_MAX` when present.

pub mod note;
pub mod subject;

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Opaque record identifier. Generated by the caller before `create`.
pub type EntityId = String;

pub const RATING_MIN: u8 = 1;
pub const RATING_MAX: u8 = 5;

/// Write-path validation failure for journal records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// `id` is empty or whitespace.
    BlankId,
    /// A required text field is empty or whitespace.
    BlankField(&'static str),
    /// A 1-5 scale holds a value outside its range.
    RatingOutOfRange { field: &'static str, value: u8 },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankId => write!(f, "id must not be blank"),
            Self::BlankField(field) => write!(f, "`{field}` must not be blank"),
            Self::RatingOutOfRange { field, value } => write!(
                f,
                "`{field}` must be within {RATING_MIN}..={RATING_MAX}, got {value}"
            ),
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField(field));
    }
    Ok(())
}

pub(crate) fn require_id(id: &str) -> Result<(), ValidationError> {
    if id.trim().is_empty() {
        return Err(ValidationError::BlankId);
    }
    Ok(())
}

pub(crate) fn check_rating(field: &'static str, value: Option<u8>) -> Result<(), ValidationError> {
    match value {
        Some(value) if !(RATING_MIN..=RATING_MAX).contains(&value) => {
            Err(ValidationError::RatingOutOfRange { field, value })
        }
        _ => Ok(()),
    }
}

/// Trims entries, drops blanks and removes duplicates keeping first-seen order.
pub fn normalize_list(values: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        let trimmed = value.trim();
        if trimmed.is_empty() || normalized.iter().any(|seen| seen == trimmed) {
            continue;
        }
        normalized.push(trimmed.to_string());
    }
    normalized
}

/// Trims optional free text; blank input becomes `None`.
pub fn normalize_optional_text(value: Option<String>) -> Option<String> {
    value.and_then(|text| {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::{check_rating, normalize_list, normalize_optional_text, ValidationError};

    #[test]
    fn normalize_list_strips_blanks_and_duplicates_in_order() {
        let input = vec![
            " trabajo ".to_string(),
            "".to_string(),
            "familia".to_string(),
            "trabajo".to_string(),
            "   ".to_string(),
        ];
        assert_eq!(
            normalize_list(&input),
            vec!["trabajo".to_string(), "familia".to_string()]
        );
    }

    #[test]
    fn normalize_optional_text_maps_blank_to_none() {
        assert_eq!(normalize_optional_text(Some("  ".to_string())), None);
        assert_eq!(
            normalize_optional_text(Some(" apodo ".to_string())).as_deref(),
            Some("apodo")
        );
        assert_eq!(normalize_optional_text(None), None);
    }

    #[test]
    fn check_rating_bounds() {
        assert!(check_rating("x", None).is_ok());
        assert!(check_rating("x", Some(1)).is_ok());
        assert!(check_rating("x", Some(5)).is_ok());
        assert_eq!(
            check_rating("x", Some(0)),
            Err(ValidationError::RatingOutOfRange {
                field: "x",
                value: 0
            })
        );
        assert!(check_rating("x", Some(6)).is_err());
    }
}
