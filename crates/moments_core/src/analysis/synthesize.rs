//! Moment synthesis for one cluster of notes.
//!
//! # Responsibility
//! - Derive keywords, tone, title, summary and reflection prompt.
//! - Compute the cluster's date span and echo member note IDs.
//!
//! # Invariants
//! - Output is a pure function of the cluster's notes: identical input yields
//!   an identical moment, including the chosen prompt template.
//! - `start_date`/`end_date` are the min/max member `created_at`.

use crate::analysis::fingerprint::digest;
use crate::analysis::keywords::{extract_keywords, DEFAULT_TOP_K};
use crate::analysis::sentiment::score_sentiment;
use crate::analysis::vectorizer::VectorizerConfig;
use crate::model::moment::{Moment, Tone};
use crate::model::note::{Note, NoteValidationError};
use chrono::{DateTime, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Number of prompt templates per tone.
const PROMPT_TEMPLATES: u64 = 3;

/// Synthesis parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisConfig {
    /// Maximum number of keywords per moment.
    pub top_k: usize,
    pub vectorizer: VectorizerConfig,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            vectorizer: VectorizerConfig::default(),
        }
    }
}

/// Contract violations while synthesizing a moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisError {
    /// Clusters must contain at least one note.
    EmptyCluster,
    InvalidNote(NoteValidationError),
}

impl Display for SynthesisError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyCluster => write!(f, "cannot synthesize a moment from an empty cluster"),
            Self::InvalidNote(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SynthesisError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::EmptyCluster => None,
            Self::InvalidNote(err) => Some(err),
        }
    }
}

impl From<NoteValidationError> for SynthesisError {
    fn from(value: NoteValidationError) -> Self {
        Self::InvalidNote(value)
    }
}

/// Builds a moment from one non-empty cluster.
pub fn synthesize(
    cluster_notes: &[Note],
    config: &SynthesisConfig,
) -> Result<Moment, SynthesisError> {
    let (Some(first), Some(last)) = (
        cluster_notes.iter().min_by_key(|note| note.created_at),
        cluster_notes.iter().max_by_key(|note| note.created_at),
    ) else {
        return Err(SynthesisError::EmptyCluster);
    };
    let start = first.created_at_utc()?;
    let end = last.created_at_utc()?;

    let texts = cluster_notes
        .iter()
        .map(Note::combined_text)
        .collect::<Vec<_>>();
    let keywords = extract_keywords(&texts, config.top_k, &config.vectorizer).into_value();
    let (tone, score) = score_sentiment(&texts);
    let template = prompt_template_index(cluster_notes);

    Ok(Moment {
        title: moment_title(&keywords, start, end),
        summary: moment_summary(cluster_notes.len(), &keywords, tone),
        tone,
        score,
        reflection_prompt: reflection_prompt(&keywords, tone, template),
        keywords,
        start_date: first.created_at,
        end_date: last.created_at,
        note_count: cluster_notes.len(),
        note_ids: cluster_notes.iter().map(|note| note.id).collect(),
    })
}

/// `"<Keyword> Journey (<start>[ - <end>])"`, or `"Reflections from <start>"`
/// when no keyword exists. The end date appears once the span reaches a day.
pub fn moment_title(keywords: &[String], start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    let Some(primary) = keywords.first() else {
        return format!("Reflections from {}", start.format("%B %d"));
    };

    let mut date_range = start.format("%b %d").to_string();
    if (end - start).num_days() > 0 {
        date_range.push_str(&format!(" - {}", end.format("%b %d")));
    }
    format!("{} Journey ({date_range})", title_case(primary))
}

pub fn moment_summary(note_count: usize, keywords: &[String], tone: Tone) -> String {
    let mut summary = format!("A collection of {note_count} thoughts and experiences ");
    if !keywords.is_empty() {
        summary.push_str(&format!("centered around {}. ", join_top(keywords, 3)));
    }
    summary.push_str(&format!(
        "This period shows a {} emotional tone with themes of personal reflection and growth.",
        tone.as_str().to_lowercase()
    ));
    summary
}

/// Picks template `index % 3` of the tone's prompt set.
pub fn reflection_prompt(keywords: &[String], tone: Tone, index: usize) -> String {
    let fallback = match tone {
        Tone::Positive => "these themes",
        Tone::Negative => "these challenges",
        Tone::Neutral => "this period",
    };
    let (top3, top2, top1) = if keywords.is_empty() {
        (fallback.to_string(), fallback.to_string(), fallback.to_string())
    } else {
        (join_top(keywords, 3), join_top(keywords, 2), keywords[0].clone())
    };

    match (tone, index % PROMPT_TEMPLATES as usize) {
        (Tone::Positive, 0) => {
            format!("What made this period particularly meaningful, especially around {top3}?")
        }
        (Tone::Positive, 1) => {
            format!("How did experiences with {top2} contribute to your growth?")
        }
        (Tone::Positive, _) => {
            format!("What patterns do you notice in your positive experiences with {top1}?")
        }
        (Tone::Negative, 0) => format!("What challenges around {top3} taught you the most?"),
        (Tone::Negative, 1) => {
            format!("How might you approach situations involving {top2} differently?")
        }
        (Tone::Negative, _) => format!("What support or resources could help you with {top1}?"),
        (Tone::Neutral, 0) => format!("What insights emerge when you reflect on {top3}?"),
        (Tone::Neutral, 1) => {
            format!("How do these experiences with {top2} fit into your larger story?")
        }
        (Tone::Neutral, _) => format!("What would you like to explore more deeply about {top1}?"),
    }
}

/// Deterministic template choice derived from the cluster's content digest.
fn prompt_template_index(cluster_notes: &[Note]) -> usize {
    let hash = digest(cluster_notes);
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&hash[..8]);
    (u64::from_be_bytes(prefix) % PROMPT_TEMPLATES) as usize
}

fn join_top(keywords: &[String], count: usize) -> String {
    keywords
        .iter()
        .take(count)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Upper-cases the first letter of every alphabetic run, lower-cases the rest.
fn title_case(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut previous_alphabetic = false;
    for c in value.chars() {
        if previous_alphabetic {
            result.extend(c.to_lowercase());
        } else {
            result.extend(c.to_uppercase());
        }
        previous_alphabetic = c.is_alphabetic();
    }
    result
}
