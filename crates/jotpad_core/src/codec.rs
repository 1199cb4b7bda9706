//! Versioned encode/decode for the persisted notes collection.
//!
//! # Responsibility
//! - Define the explicit on-slot schema for the whole collection.
//! - Turn malformed slot data into a typed decode failure.
//!
//! # Invariants
//! - Encoding always writes `CURRENT_SCHEMA_VERSION`.
//! - Decoded collections never contain duplicate ids.
//! - A bare JSON array of notes is read as schema version 0.

use crate::model::note::Note;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Schema version written by [`encode_collection`].
pub const CURRENT_SCHEMA_VERSION: u32 = 1;
/// Version assigned to unversioned bare-array payloads.
pub const LEGACY_SCHEMA_VERSION: u32 = 0;

pub type CodecResult<T> = Result<T, CodecError>;

#[derive(Debug)]
pub enum CodecError {
    Json(serde_json::Error),
    UnsupportedVersion { found: u64, latest_supported: u32 },
    /// Payload is valid JSON but neither an envelope nor a note array.
    InvalidShape(&'static str),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid notes payload: {err}"),
            Self::UnsupportedVersion {
                found,
                latest_supported,
            } => write!(
                f,
                "notes schema version {found} is not supported (latest {latest_supported})"
            ),
            Self::InvalidShape(details) => write!(f, "invalid notes payload shape: {details}"),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    notes: &'a [Note],
}

#[derive(Deserialize)]
struct EnvelopeV1 {
    notes: Vec<Note>,
}

/// Result of decoding one slot payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedCollection {
    pub notes: Vec<Note>,
    /// Schema version the payload was written with.
    pub schema_version: u32,
    /// Number of notes dropped because their id was already seen.
    pub duplicates_dropped: usize,
}

/// Encodes the full collection as a version 1 envelope.
pub fn encode_collection(notes: &[Note]) -> CodecResult<String> {
    let envelope = EnvelopeRef {
        version: CURRENT_SCHEMA_VERSION,
        notes,
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Decodes a slot payload written by any supported schema version.
///
/// Later notes that reuse an earlier id are dropped; the first one wins.
pub fn decode_collection(raw: &str) -> CodecResult<DecodedCollection> {
    let value: Value = serde_json::from_str(raw)?;
    let schema_version = match &value {
        Value::Array(_) => LEGACY_SCHEMA_VERSION,
        Value::Object(fields) => {
            let version = fields
                .get("version")
                .and_then(Value::as_u64)
                .ok_or(CodecError::InvalidShape("envelope is missing numeric `version`"))?;
            if version != u64::from(CURRENT_SCHEMA_VERSION) {
                return Err(CodecError::UnsupportedVersion {
                    found: version,
                    latest_supported: CURRENT_SCHEMA_VERSION,
                });
            }
            CURRENT_SCHEMA_VERSION
        }
        _ => return Err(CodecError::InvalidShape("expected object or array")),
    };
    let notes = if schema_version == LEGACY_SCHEMA_VERSION {
        serde_json::from_value::<Vec<Note>>(value)?
    } else {
        serde_json::from_value::<EnvelopeV1>(value)?.notes
    };

    let (notes, duplicates_dropped) = dedupe_by_id(notes);
    Ok(DecodedCollection {
        notes,
        schema_version,
        duplicates_dropped,
    })
}

fn dedupe_by_id(notes: Vec<Note>) -> (Vec<Note>, usize) {
    let total = notes.len();
    let mut seen = HashSet::with_capacity(total);
    let unique = notes
        .into_iter()
        .filter(|note| seen.insert(note.id.clone()))
        .collect::<Vec<_>>();
    let dropped = total - unique.len();
    (unique, dropped)
}

#[cfg(test)]
mod tests {
    use super::{decode_collection, encode_collection, CodecError, CURRENT_SCHEMA_VERSION};
    use crate::model::note::Note;

    #[test]
    fn encode_writes_versioned_envelope() {
        let raw = encode_collection(&[Note::new("note_1", 10)]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], CURRENT_SCHEMA_VERSION);
        assert_eq!(value["notes"][0]["title"], "Untitled Note");
        assert_eq!(value["notes"][0]["lastEdited"], 10);
    }

    #[test]
    fn decode_reads_legacy_bare_array() {
        let raw = r#"[{"id":"note_1700000000000","title":"Old","content":"a\nb","lastEdited":1700000000000}]"#;
        let decoded = decode_collection(raw).unwrap();
        assert_eq!(decoded.schema_version, 0);
        assert_eq!(decoded.notes.len(), 1);
        assert_eq!(decoded.notes[0].content, "a\nb");
    }

    #[test]
    fn decode_drops_duplicate_ids_keeping_first() {
        let mut first = Note::new("note_1", 1);
        first.title = "first".to_string();
        let mut second = Note::new("note_1", 2);
        second.title = "second".to_string();
        let raw = encode_collection(&[first, second, Note::new("note_2", 3)]).unwrap();

        let decoded = decode_collection(&raw).unwrap();
        assert_eq!(decoded.duplicates_dropped, 1);
        assert_eq!(decoded.notes.len(), 2);
        assert_eq!(decoded.notes[0].title, "first");
    }

    #[test]
    fn decode_rejects_unknown_version() {
        let err = decode_collection(r#"{"version":9,"notes":[]}"#).unwrap_err();
        assert!(matches!(err, CodecError::UnsupportedVersion { found: 9, .. }));
    }

    #[test]
    fn decode_rejects_missing_fields_and_garbage() {
        assert!(matches!(
            decode_collection(r#"[{"id":"x","title":"t"}]"#),
            Err(CodecError::Json(_))
        ));
        assert!(matches!(
            decode_collection("not json"),
            Err(CodecError::Json(_))
        ));
        assert!(matches!(
            decode_collection("\"notes\""),
            Err(CodecError::InvalidShape(_))
        ));
        assert!(matches!(
            decode_collection(r#"{"notes":[]}"#),
            Err(CodecError::InvalidShape(_))
        ));
    }
}
