//! Moment output model.
//!
//! # Responsibility
//! - Define the synthesized summary of one note cluster.
//! - Map continuous polarity scores onto discrete tone buckets.
//!
//! # Invariants
//! - `start_date <= end_date`, both taken from member notes' `created_at`.
//! - `note_count == note_ids.len()` and `note_count >= 1`.
//! - `score` lies in `[-1, 1]` and `tone == Tone::from_score(score)`.

use crate::model::note::NoteId;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Scores strictly above this are positive.
pub const POSITIVE_THRESHOLD: f64 = 0.1;
/// Scores strictly below this are negative.
pub const NEGATIVE_THRESHOLD: f64 = -0.1;

/// Discrete emotional tone of a moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tone {
    Positive,
    Neutral,
    Negative,
}

impl Tone {
    /// Buckets a polarity score using the fixed ±0.1 thresholds.
    pub fn from_score(score: f64) -> Self {
        if score > POSITIVE_THRESHOLD {
            Self::Positive
        } else if score < NEGATIVE_THRESHOLD {
            Self::Negative
        } else {
            Self::Neutral
        }
    }

    /// Stable label used in summaries and on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "Positive",
            Self::Neutral => "Neutral",
            Self::Negative => "Negative",
        }
    }
}

impl Display for Tone {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Synthesized summary of one thematically and temporally coherent cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Moment {
    pub title: String,
    pub summary: String,
    pub tone: Tone,
    /// Mean polarity in `[-1, 1]`.
    pub score: f64,
    /// Top discriminating terms, highest weight first.
    pub keywords: Vec<String>,
    pub reflection_prompt: String,
    /// Earliest member `created_at`, epoch milliseconds.
    pub start_date: i64,
    /// Latest member `created_at`, epoch milliseconds.
    pub end_date: i64,
    pub note_count: usize,
    /// Source note IDs in cluster order.
    pub note_ids: Vec<NoteId>,
}

#[cfg(test)]
mod tests {
    use super::Tone;

    #[test]
    fn tone_thresholds_are_exclusive() {
        assert_eq!(Tone::from_score(0.1), Tone::Neutral);
        assert_eq!(Tone::from_score(-0.1), Tone::Neutral);
        assert_eq!(Tone::from_score(0.100_001), Tone::Positive);
        assert_eq!(Tone::from_score(-0.100_001), Tone::Negative);
        assert_eq!(Tone::from_score(0.0), Tone::Neutral);
    }

    #[test]
    fn tone_serializes_as_label() {
        let json = serde_json::to_value(Tone::Negative).unwrap();
        assert_eq!(json, "Negative");
        assert_eq!(Tone::Positive.to_string(), "Positive");
    }
}
