//! Keyword extraction over a cluster's combined text.
//!
//! # Invariants
//! - Never returns more than `top_k` terms and never returns zero-weight terms.
//! - Ranking ties are broken lexicographically (primary path) or by first
//!   occurrence (frequency fallback), so output is reproducible.
//! - Extraction never fails; vocabulary errors switch to the fallback.

use crate::analysis::outcome::Outcome;
use crate::analysis::vectorizer::{TfidfVectorizer, VectorizeError, VectorizerConfig};
use log::warn;
use std::collections::HashMap;

/// Default number of keywords attached to a moment.
pub const DEFAULT_TOP_K: usize = 8;

/// Minimum character count (exclusive) for fallback terms.
const FALLBACK_MIN_CHARS: usize = 3;

/// Returns up to `top_k` highest-weighted terms of `texts` joined as one document.
///
/// Falls back to whitespace word counting when the vocabulary cannot be fit;
/// the returned outcome records which path ran.
pub fn extract_keywords<S: AsRef<str>>(
    texts: &[S],
    top_k: usize,
    config: &VectorizerConfig,
) -> Outcome<Vec<String>, VectorizeError> {
    let combined = texts
        .iter()
        .map(AsRef::<str>::as_ref)
        .collect::<Vec<_>>()
        .join(" ");

    match TfidfVectorizer::new(config.clone()).fit_transform(&[combined.as_str()]) {
        Ok(matrix) => {
            let vocabulary = matrix.vocabulary();
            let mut scored = matrix
                .rows()
                .first()
                .map(|row| row.entries().to_vec())
                .unwrap_or_default();
            scored.retain(|(_, weight)| *weight > 0.0);
            scored.sort_by(|(a_idx, a_w), (b_idx, b_w)| {
                b_w.total_cmp(a_w)
                    .then_with(|| vocabulary[*a_idx].cmp(&vocabulary[*b_idx]))
            });
            Outcome::Primary(
                scored
                    .into_iter()
                    .take(top_k)
                    .map(|(idx, _)| vocabulary[idx].clone())
                    .collect(),
            )
        }
        Err(cause) => {
            warn!(
                "event=keywords_extract module=analysis status=fallback cause=\"{}\"",
                cause
            );
            Outcome::Fallback {
                value: frequency_keywords(&combined, top_k),
                cause,
            }
        }
    }
}

/// Ranks whitespace-separated words longer than three characters by count.
fn frequency_keywords(text: &str, top_k: usize) -> Vec<String> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (position, word) in text.split_whitespace().enumerate() {
        if word.chars().count() > FALLBACK_MIN_CHARS {
            counts.entry(word).or_insert((0, position)).0 += 1;
        }
    }

    let mut ranked = counts.into_iter().collect::<Vec<_>>();
    ranked.sort_by(|(_, (a_count, a_first)), (_, (b_count, b_first))| {
        b_count.cmp(a_count).then_with(|| a_first.cmp(b_first))
    });
    ranked
        .into_iter()
        .take(top_k)
        .map(|(word, _)| word.to_string())
        .collect()
}
