//! Note input model.
//!
//! # Responsibility
//! - Define the timestamped journal entry analyzed by core.
//! - Validate caller-supplied timestamps before date arithmetic.
//!
//! # Invariants
//! - `id` is opaque to core and only echoed back in `Moment::note_ids`.
//! - `created_at` is Unix epoch milliseconds representable as a UTC date.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque identifier of a note owned by the calling service.
pub type NoteId = Uuid;

/// One timestamped journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Note {
    /// Creates a note with a generated ID.
    pub fn new(title: impl Into<String>, content: impl Into<String>, created_at: i64) -> Self {
        Self::with_id(Uuid::new_v4(), title, content, created_at)
    }

    /// Creates a note with a caller-provided ID.
    ///
    /// Used when identity already exists in the caller's storage.
    pub fn with_id(
        id: NoteId,
        title: impl Into<String>,
        content: impl Into<String>,
        created_at: i64,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            content: content.into(),
            created_at,
        }
    }

    /// Returns `title + " " + content`, the text analyzed for this note.
    pub fn combined_text(&self) -> String {
        format!("{} {}", self.title, self.content)
    }

    /// Returns `created_at` as a UTC date-time.
    ///
    /// # Errors
    /// - `TimestampOutOfRange` when the value cannot be represented.
    pub fn created_at_utc(&self) -> Result<DateTime<Utc>, NoteValidationError> {
        DateTime::<Utc>::from_timestamp_millis(self.created_at).ok_or(
            NoteValidationError::TimestampOutOfRange {
                id: self.id,
                created_at: self.created_at,
            },
        )
    }

    /// Validates caller-side invariants.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        self.created_at_utc().map(|_| ())
    }
}

/// Contract violations for note input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    /// `created_at` is outside the representable date range.
    TimestampOutOfRange { id: NoteId, created_at: i64 },
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TimestampOutOfRange { id, created_at } => write!(
                f,
                "note {id} has out-of-range created_at ({created_at} ms since epoch)"
            ),
        }
    }
}

impl Error for NoteValidationError {}
