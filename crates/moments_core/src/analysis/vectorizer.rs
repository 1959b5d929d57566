//! TF-IDF vector-space model over unigrams and bigrams.
//!
//! # Responsibility
//! - Fit a vocabulary and term weights over one corpus per call.
//! - Provide L2-normalized sparse rows and pairwise cosine similarity.
//!
//! # Invariants
//! - A fitted matrix is a local value; no model state outlives the call.
//! - Vocabulary is indexed in lexicographic order.
//! - Every non-empty row has unit L2 norm; documents without terms map to
//!   the zero vector.

use crate::analysis::stop_words::StopWords;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::error::Error;
use std::fmt::{Display, Formatter};

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("valid token regex"));

/// Default vocabulary cap.
pub const DEFAULT_MAX_FEATURES: usize = 1000;

/// Explicit vectorizer configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorizerConfig {
    /// Maximum number of vocabulary terms kept, by corpus frequency.
    pub max_features: usize,
    /// Smallest n-gram length (inclusive, >= 1).
    pub ngram_min: usize,
    /// Largest n-gram length (inclusive).
    pub ngram_max: usize,
    /// Minimum number of documents a term must occur in.
    pub min_df: usize,
    pub stop_words: StopWords,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_features: DEFAULT_MAX_FEATURES,
            ngram_min: 1,
            ngram_max: 2,
            min_df: 1,
            stop_words: StopWords::English,
        }
    }
}

/// Vocabulary fitting failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VectorizeError {
    /// No documents were supplied.
    EmptyCorpus,
    /// No term survived tokenization, stop-word and frequency filtering.
    EmptyVocabulary,
    /// `ngram_min` is zero or greater than `ngram_max`.
    InvalidNgramRange { min: usize, max: usize },
}

impl Display for VectorizeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyCorpus => write!(f, "cannot fit vocabulary on an empty corpus"),
            Self::EmptyVocabulary => write!(
                f,
                "empty vocabulary; documents contain only stop words or no tokens"
            ),
            Self::InvalidNgramRange { min, max } => {
                write!(f, "invalid n-gram range ({min}, {max})")
            }
        }
    }
}

impl Error for VectorizeError {}

/// Sparse row: `(term index, weight)` pairs sorted by term index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dot product via a merge over both sorted index lists.
    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.entries.len() && j < other.entries.len() {
            let (a_idx, a_val) = self.entries[i];
            let (b_idx, b_val) = other.entries[j];
            match a_idx.cmp(&b_idx) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a_val * b_val;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }
}

/// Result of fitting a vectorizer on one corpus.
#[derive(Debug, Clone, PartialEq)]
pub struct TfidfMatrix {
    vocabulary: Vec<String>,
    rows: Vec<SparseVector>,
}

impl TfidfMatrix {
    /// Vocabulary terms in index order.
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn rows(&self) -> &[SparseVector] {
        &self.rows
    }

    /// Full `n x n` cosine similarity matrix.
    ///
    /// Rows are unit-normalized, so cosine reduces to the dot product. Zero
    /// rows score 0 against every row, including themselves.
    pub fn cosine_similarity(&self) -> Vec<Vec<f64>> {
        let n = self.rows.len();
        let mut matrix = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in i..n {
                let value = self.rows[i].dot(&self.rows[j]);
                matrix[i][j] = value;
                matrix[j][i] = value;
            }
        }
        matrix
    }
}

/// Stateless TF-IDF vectorizer; each `fit_transform` builds a fresh model.
#[derive(Debug, Clone, Default)]
pub struct TfidfVectorizer {
    config: VectorizerConfig,
}

impl TfidfVectorizer {
    pub fn new(config: VectorizerConfig) -> Self {
        Self { config }
    }

    /// Fits vocabulary and idf weights on `documents` and returns their rows.
    ///
    /// Weights are raw counts times smooth idf `ln((1 + n) / (1 + df)) + 1`,
    /// then L2-normalized per row.
    ///
    /// # Errors
    /// - `EmptyCorpus` when `documents` is empty.
    /// - `EmptyVocabulary` when no term survives filtering.
    /// - `InvalidNgramRange` for a misconfigured n-gram range.
    pub fn fit_transform<S: AsRef<str>>(
        &self,
        documents: &[S],
    ) -> Result<TfidfMatrix, VectorizeError> {
        let config = &self.config;
        if config.ngram_min == 0 || config.ngram_min > config.ngram_max {
            return Err(VectorizeError::InvalidNgramRange {
                min: config.ngram_min,
                max: config.ngram_max,
            });
        }
        if documents.is_empty() {
            return Err(VectorizeError::EmptyCorpus);
        }

        let doc_counts = documents
            .iter()
            .map(|doc| self.count_terms(doc.as_ref()))
            .collect::<Vec<_>>();

        let mut doc_freq: BTreeMap<&str, usize> = BTreeMap::new();
        let mut corpus_freq: BTreeMap<&str, usize> = BTreeMap::new();
        for counts in &doc_counts {
            for (term, count) in counts {
                *doc_freq.entry(term.as_str()).or_insert(0) += 1;
                *corpus_freq.entry(term.as_str()).or_insert(0) += count;
            }
        }

        let mut kept = doc_freq
            .iter()
            .filter(|(_, df)| **df >= config.min_df)
            .map(|(term, _)| *term)
            .collect::<Vec<_>>();
        if kept.len() > config.max_features {
            kept.sort_by(|a, b| corpus_freq[b].cmp(&corpus_freq[a]).then_with(|| a.cmp(b)));
            kept.truncate(config.max_features);
            kept.sort_unstable();
        }
        if kept.is_empty() {
            return Err(VectorizeError::EmptyVocabulary);
        }

        let n_docs = documents.len() as f64;
        let index: HashMap<&str, usize> = kept
            .iter()
            .enumerate()
            .map(|(idx, term)| (*term, idx))
            .collect();
        let idf = kept
            .iter()
            .map(|term| ((1.0 + n_docs) / (1.0 + doc_freq[term] as f64)).ln() + 1.0)
            .collect::<Vec<_>>();

        let rows = doc_counts
            .iter()
            .map(|counts| {
                let mut entries = counts
                    .iter()
                    .filter_map(|(term, count)| {
                        index
                            .get(term.as_str())
                            .map(|idx| (*idx, *count as f64 * idf[*idx]))
                    })
                    .collect::<Vec<_>>();
                entries.sort_by_key(|(idx, _)| *idx);
                let norm = entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
                if norm > 0.0 {
                    for entry in &mut entries {
                        entry.1 /= norm;
                    }
                }
                SparseVector { entries }
            })
            .collect();

        Ok(TfidfMatrix {
            vocabulary: kept.into_iter().map(str::to_string).collect(),
            rows,
        })
    }

    fn count_terms(&self, document: &str) -> BTreeMap<String, usize> {
        let lowered = document.to_lowercase();
        let tokens = TOKEN_RE
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|token| !self.config.stop_words.contains(token))
            .collect::<Vec<_>>();

        let mut counts = BTreeMap::new();
        for n in self.config.ngram_min..=self.config.ngram_max {
            if n > tokens.len() {
                break;
            }
            for window in tokens.windows(n) {
                *counts.entry(window.join(" ")).or_insert(0) += 1;
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::{StopWords, TfidfVectorizer, VectorizeError, VectorizerConfig};

    #[test]
    fn fit_builds_sorted_unigram_and_bigram_vocabulary() {
        let matrix = TfidfVectorizer::default()
            .fit_transform(&["The team lunch", "lunch with the team"])
            .unwrap();
        assert_eq!(
            matrix.vocabulary(),
            &["lunch", "lunch team", "team", "team lunch"]
        );
    }

    #[test]
    fn bigrams_span_removed_stop_words() {
        let matrix = TfidfVectorizer::default()
            .fit_transform(&["hiking in the mountains"])
            .unwrap();
        assert!(matrix
            .vocabulary()
            .contains(&"hiking mountains".to_string()));
    }

    #[test]
    fn single_character_tokens_are_ignored() {
        let matrix = TfidfVectorizer::default()
            .fit_transform(&["x y z walk"])
            .unwrap();
        assert_eq!(matrix.vocabulary(), &["walk"]);
    }

    #[test]
    fn rows_are_unit_normalized() {
        let matrix = TfidfVectorizer::default()
            .fit_transform(&["coffee coffee morning", "evening run"])
            .unwrap();
        for row in matrix.rows() {
            let norm: f64 = row.entries().iter().map(|(_, w)| w * w).sum();
            assert!((norm - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn cosine_similarity_is_symmetric_and_bounded() {
        let matrix = TfidfVectorizer::default()
            .fit_transform(&["morning coffee", "morning run", "evening movie"])
            .unwrap();
        let sim = matrix.cosine_similarity();
        assert!((sim[0][0] - 1.0).abs() < 1e-9);
        assert!(sim[0][1] > 0.0 && sim[0][1] < 1.0);
        assert_eq!(sim[0][2], 0.0);
        assert_eq!(sim[0][1], sim[1][0]);
    }

    #[test]
    fn stop_word_only_document_maps_to_zero_vector() {
        let matrix = TfidfVectorizer::default()
            .fit_transform(&["the and of", "garden tomatoes"])
            .unwrap();
        assert!(matrix.rows()[0].is_zero());
        assert_eq!(matrix.cosine_similarity()[0][0], 0.0);
    }

    #[test]
    fn all_stop_words_fail_with_empty_vocabulary() {
        let err = TfidfVectorizer::default()
            .fit_transform(&["the and of", "it is"])
            .unwrap_err();
        assert_eq!(err, VectorizeError::EmptyVocabulary);
    }

    #[test]
    fn empty_corpus_and_bad_range_are_rejected() {
        let empty: [&str; 0] = [];
        assert_eq!(
            TfidfVectorizer::default().fit_transform(&empty).unwrap_err(),
            VectorizeError::EmptyCorpus
        );

        let config = VectorizerConfig {
            ngram_min: 2,
            ngram_max: 1,
            ..VectorizerConfig::default()
        };
        assert_eq!(
            TfidfVectorizer::new(config).fit_transform(&["a"]).unwrap_err(),
            VectorizeError::InvalidNgramRange { min: 2, max: 1 }
        );
    }

    #[test]
    fn max_features_keeps_most_frequent_terms() {
        let config = VectorizerConfig {
            max_features: 2,
            ngram_max: 1,
            stop_words: StopWords::None,
            ..VectorizerConfig::default()
        };
        let matrix = TfidfVectorizer::new(config)
            .fit_transform(&["beta beta alpha gamma gamma gamma delta"])
            .unwrap();
        assert_eq!(matrix.vocabulary(), &["beta", "gamma"]);
    }
}
