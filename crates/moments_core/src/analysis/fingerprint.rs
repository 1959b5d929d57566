//! Deterministic content digest of an ordered note collection.
//!
//! # Invariants
//! - Equal ordered note sequences always produce equal digests.
//! - The digest is order-sensitive. Callers needing order-invariant cache
//!   keys must sort notes canonically before hashing.
//! - Canonical form: JSON array of objects with sorted keys and `created_at`
//!   rendered as an RFC 3339 UTC string.

use crate::model::note::Note;
use chrono::SecondsFormat;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Returns the lower-case hex SHA-256 digest of `notes`.
pub fn fingerprint(notes: &[Note]) -> String {
    hex::encode(digest(notes))
}

/// Raw SHA-256 digest of the canonical serialization.
pub(crate) fn digest(notes: &[Note]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(canonical_json(notes).as_bytes());
    hasher.finalize().into()
}

fn canonical_json(notes: &[Note]) -> String {
    let records = notes
        .iter()
        .map(|note| {
            // serde_json::Map is BTreeMap-backed, so keys serialize sorted.
            let mut record = Map::new();
            record.insert("content".to_string(), Value::from(note.content.as_str()));
            record.insert(
                "created_at".to_string(),
                Value::from(render_timestamp(note)),
            );
            record.insert("id".to_string(), Value::from(note.id.to_string()));
            record.insert("title".to_string(), Value::from(note.title.as_str()));
            Value::Object(record)
        })
        .collect::<Vec<_>>();
    Value::Array(records).to_string()
}

fn render_timestamp(note: &Note) -> String {
    note.created_at_utc()
        .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|_| note.created_at.to_string())
}

#[cfg(test)]
mod tests {
    use super::{canonical_json, fingerprint};
    use crate::model::note::Note;
    use uuid::Uuid;

    fn note(id: u128, title: &str, created_at: i64) -> Note {
        Note::with_id(Uuid::from_u128(id), title, "body", created_at)
    }

    #[test]
    fn canonical_form_sorts_keys_and_renders_timestamps() {
        let json = canonical_json(&[note(1, "t", 0)]);
        assert_eq!(
            json,
            concat!(
                r#"[{"content":"body","created_at":"1970-01-01T00:00:00.000Z","#,
                r#""id":"00000000-0000-0000-0000-000000000001","title":"t"}]"#
            )
        );
    }

    #[test]
    fn digest_is_hex_sha256() {
        let digest = fingerprint(&[note(1, "t", 0)]);
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn out_of_range_timestamp_still_hashes() {
        let a = fingerprint(&[note(1, "t", i64::MAX)]);
        let b = fingerprint(&[note(1, "t", i64::MAX)]);
        assert_eq!(a, b);
    }
}
