//! Lexicon-based polarity scoring.
//!
//! # Responsibility
//! - Estimate a per-text polarity in `[-1, 1]` from a word lexicon.
//! - Average polarity over a batch and bucket it into a `Tone`.
//!
//! # Invariants
//! - Texts with no lexicon hits score exactly 0.
//! - Batch scores stay in `[-1, 1]`; an empty batch is neutral.

use crate::model::moment::Tone;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Polarity multiplier applied after a negator (`not good` -> -0.5 x good).
const NEGATION_FACTOR: f64 = -0.5;
/// Polarity multiplier applied after an intensifier (`very good`).
const INTENSIFIER_FACTOR: f64 = 1.3;

/// Characters closing a sentence; modifiers never carry across them.
const SENTENCE_ENDS: &[char] = &['.', '!', '?', ';'];

const NEGATORS: &[&str] = &["not", "no", "never", "nothing", "nobody", "neither", "nor", "without"];

const INTENSIFIERS: &[&str] = &[
    "very",
    "so",
    "really",
    "extremely",
    "incredibly",
    "super",
    "truly",
    "totally",
    "absolutely",
    "deeply",
];

static DEFAULT_LEXICON: Lazy<SentimentLexicon> = Lazy::new(SentimentLexicon::default);

/// Word-to-polarity table, matched case-insensitively.
#[derive(Debug, Clone)]
pub struct SentimentLexicon {
    words: HashMap<String, f64>,
}

impl SentimentLexicon {
    /// Creates an empty lexicon.
    pub fn new() -> Self {
        Self {
            words: HashMap::new(),
        }
    }

    /// Inserts `word` with `polarity` clamped to `[-1, 1]`.
    pub fn insert(&mut self, word: &str, polarity: f64) {
        self.words
            .insert(word.to_lowercase(), polarity.clamp(-1.0, 1.0));
    }

    pub fn polarity(&self, word: &str) -> Option<f64> {
        self.words.get(word).copied()
    }

    /// Scores one text.
    ///
    /// Each lexicon hit contributes its polarity, scaled by directly preceding
    /// intensifiers and flipped/damped by a negator that precedes it with only
    /// intensifiers in between. Any other word or a sentence end (`.`, `!`,
    /// `?`, `;`) clears pending modifiers. The text score is the mean of the
    /// contributions, clamped to `[-1, 1]`.
    pub fn score_text(&self, text: &str) -> f64 {
        let lowered = text.to_lowercase();
        let mut total = 0.0;
        let mut hits = 0usize;

        for sentence in lowered.split(SENTENCE_ENDS) {
            let mut negated = false;
            let mut intensity = 1.0;

            for token in sentence
                .split(|c: char| !c.is_alphabetic() && c != '\'')
                .map(|token| token.trim_matches('\''))
                .filter(|token| !token.is_empty())
            {
                if is_negator(token) {
                    negated = true;
                    continue;
                }
                if INTENSIFIERS.contains(&token) {
                    intensity *= INTENSIFIER_FACTOR;
                    continue;
                }
                if let Some(polarity) = self.polarity(token) {
                    let mut value = (polarity * intensity).clamp(-1.0, 1.0);
                    if negated {
                        value *= NEGATION_FACTOR;
                    }
                    total += value;
                    hits += 1;
                }
                negated = false;
                intensity = 1.0;
            }
        }

        if hits == 0 {
            return 0.0;
        }
        (total / hits as f64).clamp(-1.0, 1.0)
    }
}

impl Default for SentimentLexicon {
    fn default() -> Self {
        let mut lexicon = Self::new();

        for word in [
            "amazing", "awesome", "beautiful", "brilliant", "excellent", "fantastic",
            "incredible", "love", "loved", "perfect", "wonderful", "best", "thrilled",
        ] {
            lexicon.insert(word, 0.9);
        }
        for word in [
            "great", "happy", "glad", "delightful", "excited", "exciting", "fun", "joy",
            "grateful", "proud", "lovely", "enjoyed", "enjoy", "good", "nice", "friendly",
            "pleasant", "peaceful", "relaxing", "inspiring", "productive", "successful",
        ] {
            lexicon.insert(word, 0.6);
        }
        for word in [
            "calm", "fine", "hopeful", "interesting", "better", "clear", "fresh", "helpful",
            "new", "positive",
        ] {
            lexicon.insert(word, 0.3);
        }
        lexicon.insert("okay", 0.1);
        lexicon.insert("ok", 0.1);

        for word in [
            "tired", "boring", "busy", "confused", "nervous", "worried", "late", "difficult",
            "hard", "stuck",
        ] {
            lexicon.insert(word, -0.3);
        }
        for word in [
            "sad", "bad", "angry", "upset", "lonely", "stressed", "anxious", "frustrated",
            "disappointed", "disappointing", "unhappy", "hurt", "sick", "lost", "afraid",
        ] {
            lexicon.insert(word, -0.6);
        }
        for word in [
            "terrible", "awful", "horrible", "miserable", "hate", "hated", "worst",
            "devastated", "depressed", "painful", "disgusting",
        ] {
            lexicon.insert(word, -0.9);
        }

        lexicon
    }
}

fn is_negator(token: &str) -> bool {
    NEGATORS.contains(&token) || token.ends_with("n't")
}

/// Averages polarity across `texts` using the built-in lexicon and buckets it.
///
/// Returns `(Tone::Neutral, 0.0)` for an empty batch.
pub fn score_sentiment<S: AsRef<str>>(texts: &[S]) -> (Tone, f64) {
    score_sentiment_with(&DEFAULT_LEXICON, texts)
}

/// Same as [`score_sentiment`] with a caller-provided lexicon.
pub fn score_sentiment_with<S: AsRef<str>>(
    lexicon: &SentimentLexicon,
    texts: &[S],
) -> (Tone, f64) {
    if texts.is_empty() {
        return (Tone::Neutral, 0.0);
    }
    let sum: f64 = texts
        .iter()
        .map(|text| lexicon.score_text(text.as_ref()))
        .sum();
    let score = (sum / texts.len() as f64).clamp(-1.0, 1.0);
    (Tone::from_score(score), score)
}
