//! Similarity-fusion clustering of notes.
//!
//! # Responsibility
//! - Fuse text cosine similarity with exponential temporal decay into one
//!   distance matrix.
//! - Partition notes with average-linkage clustering, then filter small
//!   groups and reclaim their notes as singletons.
//!
//! # Invariants
//! - The returned groups form a partition of `0..notes.len()`: every index
//!   appears in exactly one group, whichever path ran.
//! - Vectorizer or linkage failures degrade to singleton groups and are
//!   reported through `Outcome::Fallback`, never as errors.
//! - Input notes are expected sorted by `created_at`; the algorithm itself
//!   does not depend on order beyond group numbering.

use crate::analysis::linkage::{average_linkage, LinkageError};
use crate::analysis::outcome::Outcome;
use crate::analysis::preprocess::normalize;
use crate::analysis::vectorizer::{TfidfVectorizer, VectorizeError, VectorizerConfig};
use crate::model::note::Note;
use log::{debug, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default minimum size for a cluster to survive filtering.
pub const DEFAULT_MIN_CLUSTER_SIZE: usize = 2;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Index groups partitioning one batch of notes.
pub type Partition = Vec<Vec<usize>>;

/// Fusion and partitioning parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterConfig {
    /// Weight of text cosine similarity in the fused score.
    pub text_weight: f64,
    /// Weight of temporal similarity in the fused score.
    pub temporal_weight: f64,
    /// Characteristic decay time in seconds (`exp(-dt / decay_seconds)`).
    pub decay_seconds: f64,
    /// Target cluster count is `max(1, n / notes_per_cluster)`.
    pub notes_per_cluster: usize,
    pub vectorizer: VectorizerConfig,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            text_weight: 0.7,
            temporal_weight: 0.3,
            decay_seconds: 7.0 * SECONDS_PER_DAY,
            notes_per_cluster: 3,
            vectorizer: VectorizerConfig::default(),
        }
    }
}

impl ClusterConfig {
    /// Target cluster count for `n` notes.
    pub fn target_clusters(&self, n: usize) -> usize {
        (n / self.notes_per_cluster.max(1)).max(1)
    }
}

/// Why clustering fell back to singleton groups.
#[derive(Debug, Clone, PartialEq)]
pub enum ClusterFallback {
    /// Fewer than two notes; no clustering attempted.
    TooFewNotes { count: usize },
    /// Text vectorization failed.
    Vectorize(VectorizeError),
    /// Agglomerative clustering rejected the distance matrix.
    Linkage(LinkageError),
}

impl Display for ClusterFallback {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooFewNotes { count } => write!(f, "too few notes to cluster ({count})"),
            Self::Vectorize(err) => write!(f, "text vectorization failed: {err}"),
            Self::Linkage(err) => write!(f, "linkage failed: {err}"),
        }
    }
}

impl Error for ClusterFallback {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::TooFewNotes { .. } => None,
            Self::Vectorize(err) => Some(err),
            Self::Linkage(err) => Some(err),
        }
    }
}

/// Partitions `notes` into thematically and temporally coherent groups.
///
/// Groups from clustering come first, ordered by their smallest index, followed
/// by reclaimed singletons in index order. Members are ascending.
pub fn cluster(
    notes: &[Note],
    min_cluster_size: usize,
    config: &ClusterConfig,
) -> Outcome<Partition, ClusterFallback> {
    let n = notes.len();
    if n < 2 {
        return Outcome::Fallback {
            value: singletons(n),
            cause: ClusterFallback::TooFewNotes { count: n },
        };
    }

    let distances = match fused_distances(notes, config) {
        Ok(distances) => distances,
        Err(err) => {
            warn!(
                "event=cluster_notes module=analysis status=fallback \
                 stage=vectorize notes={} cause=\"{}\"",
                n, err
            );
            return Outcome::Fallback {
                value: singletons(n),
                cause: ClusterFallback::Vectorize(err),
            };
        }
    };

    let target = config.target_clusters(n);
    match average_linkage(&distances, target) {
        Ok(labels) => {
            let partition = filter_and_reclaim(group_labels(&labels), n, min_cluster_size);
            debug!(
                "event=cluster_notes module=analysis status=ok notes={} target={} groups={}",
                n,
                target,
                partition.len()
            );
            Outcome::Primary(partition)
        }
        Err(err) => {
            warn!(
                "event=cluster_notes module=analysis status=fallback \
                 stage=linkage notes={} cause=\"{}\"",
                n, err
            );
            Outcome::Fallback {
                value: singletons(n),
                cause: ClusterFallback::Linkage(err),
            }
        }
    }
}

/// Builds the fused distance matrix `1 - (w_t * text + w_d * temporal)`.
///
/// Temporal similarity on the diagonal is 0. Values are not clamped.
pub fn fused_distances(
    notes: &[Note],
    config: &ClusterConfig,
) -> Result<Vec<Vec<f64>>, VectorizeError> {
    let documents = notes
        .iter()
        .map(|note| normalize(&note.combined_text()))
        .collect::<Vec<_>>();
    let text = TfidfVectorizer::new(config.vectorizer.clone())
        .fit_transform(&documents)?
        .cosine_similarity();

    let n = notes.len();
    let mut distances = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..n {
            let temporal = if i == j {
                0.0
            } else {
                temporal_similarity(notes[i].created_at, notes[j].created_at, config.decay_seconds)
            };
            let combined = config.text_weight * text[i][j] + config.temporal_weight * temporal;
            distances[i][j] = 1.0 - combined;
        }
    }
    Ok(distances)
}

/// `exp(-|a - b| / decay_seconds)` with `a`, `b` in epoch milliseconds.
pub fn temporal_similarity(a_ms: i64, b_ms: i64, decay_seconds: f64) -> f64 {
    let delta_seconds = (a_ms.abs_diff(b_ms) as f64) / 1000.0;
    (-delta_seconds / decay_seconds).exp()
}

/// Keeps groups of at least `min_cluster_size` members and turns every
/// uncovered index below `n` into its own singleton group.
pub fn filter_and_reclaim(groups: Partition, n: usize, min_cluster_size: usize) -> Partition {
    let mut covered = vec![false; n];
    let mut result = groups
        .into_iter()
        .filter(|group| !group.is_empty() && group.len() >= min_cluster_size)
        .collect::<Vec<_>>();
    for group in &result {
        for index in group {
            if let Some(slot) = covered.get_mut(*index) {
                *slot = true;
            }
        }
    }
    result.extend(
        covered
            .iter()
            .enumerate()
            .filter(|(_, covered)| !**covered)
            .map(|(index, _)| vec![index]),
    );
    result
}

fn group_labels(labels: &[usize]) -> Partition {
    let mut groups: Partition = Vec::new();
    let mut slot_of_label: Vec<Option<usize>> = Vec::new();
    for (index, label) in labels.iter().enumerate() {
        if *label >= slot_of_label.len() {
            slot_of_label.resize(label + 1, None);
        }
        match slot_of_label[*label] {
            Some(slot) => groups[slot].push(index),
            None => {
                slot_of_label[*label] = Some(groups.len());
                groups.push(vec![index]);
            }
        }
    }
    groups
}

fn singletons(n: usize) -> Partition {
    (0..n).map(|index| vec![index]).collect()
}

#[cfg(test)]
mod tests {
    use super::{
        cluster, filter_and_reclaim, fused_distances, group_labels, temporal_similarity,
        ClusterConfig, ClusterFallback,
    };
    use crate::analysis::vectorizer::VectorizeError;
    use crate::model::note::Note;

    const DAY_MS: i64 = 86_400_000;

    #[test]
    fn temporal_similarity_decays_over_one_week() {
        let week = 7.0 * 86_400.0;
        assert_eq!(temporal_similarity(5, 5, week), 1.0);
        let one_week = temporal_similarity(0, 7 * DAY_MS, week);
        assert!((one_week - (-1.0f64).exp()).abs() < 1e-12);
        assert_eq!(
            temporal_similarity(0, 3 * DAY_MS, week),
            temporal_similarity(3 * DAY_MS, 0, week)
        );
    }

    #[test]
    fn identical_notes_have_near_zero_distance() {
        let notes = vec![
            Note::new("Morning run", "Ran by the river", DAY_MS),
            Note::new("Morning run", "Ran by the river", DAY_MS),
        ];
        let distances = fused_distances(&notes, &ClusterConfig::default()).unwrap();
        assert!(distances[0][1].abs() < 1e-9);
        // Diagonal: text similarity 1, temporal 0.
        assert!((distances[0][0] - 0.3).abs() < 1e-9);
    }

    #[test]
    fn target_cluster_count_is_one_per_three_notes() {
        let config = ClusterConfig::default();
        assert_eq!(config.target_clusters(2), 1);
        assert_eq!(config.target_clusters(5), 1);
        assert_eq!(config.target_clusters(6), 2);
        assert_eq!(config.target_clusters(10), 3);
    }

    #[test]
    fn fewer_than_two_notes_are_singletons_without_clustering() {
        let config = ClusterConfig::default();
        let empty = cluster(&[], 2, &config);
        assert_eq!(empty.cause(), Some(&ClusterFallback::TooFewNotes { count: 0 }));
        assert!(empty.value().is_empty());

        let one = cluster(&[Note::new("solo", "entry", 0)], 2, &config);
        assert_eq!(one.into_value(), vec![vec![0]]);
    }

    #[test]
    fn stop_word_only_batch_falls_back_to_singletons() {
        let notes = vec![
            Note::new("The", "and of the", 0),
            Note::new("It", "is what it is", DAY_MS),
            Note::new("", "", 2 * DAY_MS),
        ];
        let outcome = cluster(&notes, 2, &ClusterConfig::default());
        assert_eq!(
            outcome.cause(),
            Some(&ClusterFallback::Vectorize(VectorizeError::EmptyVocabulary))
        );
        assert_eq!(outcome.into_value(), vec![vec![0], vec![1], vec![2]]);
    }

    #[test]
    fn separates_two_themes_far_apart_in_time() {
        let notes = vec![
            Note::new("Garden", "planted tomatoes in the garden", 0),
            Note::new("Garden", "watered the tomatoes in the garden", DAY_MS),
            Note::new("Garden", "garden tomatoes are growing", 2 * DAY_MS),
            Note::new("Exam", "studied chemistry for the exam", 60 * DAY_MS),
            Note::new("Exam", "chemistry exam practice problems", 61 * DAY_MS),
            Note::new("Exam", "passed the chemistry exam", 62 * DAY_MS),
        ];
        let outcome = cluster(&notes, 2, &ClusterConfig::default());
        assert!(!outcome.is_fallback());
        assert_eq!(outcome.into_value(), vec![vec![0, 1, 2], vec![3, 4, 5]]);
    }

    #[test]
    fn small_groups_are_reclaimed_as_singletons() {
        let groups = vec![vec![0, 2, 3], vec![1]];
        let partition = filter_and_reclaim(groups, 4, 2);
        assert_eq!(partition, vec![vec![0, 2, 3], vec![1]]);

        let strict = filter_and_reclaim(vec![vec![0, 1], vec![2, 3, 4]], 5, 3);
        assert_eq!(strict, vec![vec![2, 3, 4], vec![0], vec![1]]);
    }

    #[test]
    fn labels_group_by_first_appearance() {
        assert_eq!(
            group_labels(&[1, 0, 1, 2, 0]),
            vec![vec![0, 2], vec![1, 4], vec![3]]
        );
    }
}
