//! Entity codec for stored values.
//!
//! # Responsibility
//! - Encode records and index lists to the JSON strings kept in the store.
//! - Decode them back into an explicit success/failure result.
//!
//! # Invariants
//! - `decode(encode(x)) == x` for every record this crate produces.
//! - Decoding never panics; malformed input yields `CodecError`, and the
//!   caller decides how to treat it (repositories treat it as absence).

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Outcome of decoding one stored value.
pub type Decoded<T> = Result<T, CodecError>;

#[derive(Debug)]
pub enum CodecError {
    Encode(serde_json::Error),
    Decode(serde_json::Error),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode(err) => write!(f, "failed to encode stored value: {err}"),
            Self::Decode(err) => write!(f, "failed to decode stored value: {err}"),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encode(err) | Self::Decode(err) => Some(err),
        }
    }
}

/// Encodes a record or index list to its stored representation.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String, CodecError> {
    serde_json::to_string(value).map_err(CodecError::Encode)
}

/// Decodes a stored representation.
pub fn decode<T: DeserializeOwned>(raw: &str) -> Decoded<T> {
    serde_json::from_str(raw).map_err(CodecError::Decode)
}
