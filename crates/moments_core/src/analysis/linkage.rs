//! Average-linkage agglomerative clustering over a precomputed distance matrix.
//!
//! # Invariants
//! - Produces exactly `n_clusters` labels in `0..n_clusters`.
//! - Labels are numbered by first appearance in point order.
//! - Nearest-neighbour ties pick the lowest slot index and equal-distance
//!   merges are applied in discovery order, so results are reproducible for
//!   identical input.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Clustering input violations.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkageError {
    /// Distance matrix is not `n x n`.
    NotSquare { rows: usize, row: usize, len: usize },
    /// A distance entry is NaN or infinite.
    NonFiniteDistance { row: usize, col: usize },
    /// `requested` clusters cannot be formed from `points` points.
    InvalidClusterCount { requested: usize, points: usize },
}

impl Display for LinkageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotSquare { rows, row, len } => write!(
                f,
                "distance matrix is not square: {rows} rows but row {row} has {len} entries"
            ),
            Self::NonFiniteDistance { row, col } => {
                write!(f, "distance at ({row}, {col}) is not finite")
            }
            Self::InvalidClusterCount { requested, points } => write!(
                f,
                "cannot form {requested} clusters from {points} points"
            ),
        }
    }
}

impl Error for LinkageError {}

/// Clusters points described by `distances` into `n_clusters` groups.
///
/// Builds the UPGMA hierarchy (clusters joined by smallest mean pairwise
/// distance) with the nearest-neighbour chain in O(n^2) time, then replays its
/// cheapest merges until `n_clusters` groups remain. The diagonal is ignored.
///
/// # Errors
/// - `NotSquare` or `NonFiniteDistance` for malformed matrices.
/// - `InvalidClusterCount` when `n_clusters` is 0 or exceeds the point count.
pub fn average_linkage(
    distances: &[Vec<f64>],
    n_clusters: usize,
) -> Result<Vec<usize>, LinkageError> {
    let n = distances.len();
    for (row, values) in distances.iter().enumerate() {
        if values.len() != n {
            return Err(LinkageError::NotSquare {
                rows: n,
                row,
                len: values.len(),
            });
        }
        for (col, value) in values.iter().enumerate() {
            if row != col && !value.is_finite() {
                return Err(LinkageError::NonFiniteDistance { row, col });
            }
        }
    }
    if n_clusters == 0 || n_clusters > n {
        return Err(LinkageError::InvalidClusterCount {
            requested: n_clusters,
            points: n,
        });
    }

    let merges = nearest_neighbor_chain(distances);

    let mut parent: Vec<usize> = (0..n).collect();
    let mut remaining = n;
    for &(a, b, _) in &merges {
        if remaining == n_clusters {
            break;
        }
        let (root_a, root_b) = (find(&mut parent, a), find(&mut parent, b));
        if root_a != root_b {
            parent[root_a.max(root_b)] = root_a.min(root_b);
            remaining -= 1;
        }
    }

    let mut label_of_root = vec![usize::MAX; n];
    let mut next_label = 0;
    let mut labels = Vec::with_capacity(n);
    for point in 0..n {
        let root = find(&mut parent, point);
        if label_of_root[root] == usize::MAX {
            label_of_root[root] = next_label;
            next_label += 1;
        }
        labels.push(label_of_root[root]);
    }
    Ok(labels)
}

/// Builds the full merge list `(slot_a, slot_b, distance)` sorted by distance.
///
/// Slot `s` always holds point `s`, so merges can be replayed on points.
fn nearest_neighbor_chain(distances: &[Vec<f64>]) -> Vec<(usize, usize, f64)> {
    let n = distances.len();
    let mut between = distances.to_vec();
    let mut size = vec![1usize; n];
    let mut active = vec![true; n];
    let mut chain: Vec<usize> = Vec::with_capacity(n);
    let mut merges: Vec<(usize, usize, f64)> = Vec::with_capacity(n.saturating_sub(1));

    while merges.len() + 1 < n {
        if chain.is_empty() {
            if let Some(start) = (0..n).find(|&slot| active[slot]) {
                chain.push(start);
            }
        }
        let Some(&current) = chain.last() else {
            break;
        };
        let previous = chain.len().checked_sub(2).map(|idx| chain[idx]);

        // The previous chain link wins ties, then the lowest slot.
        let mut nearest = previous;
        let mut nearest_d = previous.map_or(f64::INFINITY, |slot| between[current][slot]);
        for k in 0..n {
            if k == current || !active[k] {
                continue;
            }
            if nearest.is_none() || between[current][k] < nearest_d {
                nearest = Some(k);
                nearest_d = between[current][k];
            }
        }
        let Some(nearest) = nearest else {
            break;
        };

        if Some(nearest) != previous {
            chain.push(nearest);
            continue;
        }

        chain.pop();
        chain.pop();
        let (keep, absorb) = (current.min(nearest), current.max(nearest));
        let keep_size = size[keep] as f64;
        let absorb_size = size[absorb] as f64;
        for k in 0..n {
            if k == keep || k == absorb || !active[k] {
                continue;
            }
            let merged = (keep_size * between[keep][k] + absorb_size * between[absorb][k])
                / (keep_size + absorb_size);
            between[keep][k] = merged;
            between[k][keep] = merged;
        }
        size[keep] += size[absorb];
        active[absorb] = false;
        merges.push((keep, absorb, nearest_d));
    }

    // Stable: equal distances keep discovery order, so children precede parents.
    merges.sort_by(|a, b| a.2.total_cmp(&b.2));
    merges
}

fn find(parent: &mut [usize], mut node: usize) -> usize {
    while parent[node] != node {
        parent[node] = parent[parent[node]];
        node = parent[node];
    }
    node
}

#[cfg(test)]
mod tests {
    use super::{average_linkage, LinkageError};

    /// Exhaustive UPGMA: merge the closest active pair until `k` remain.
    fn exhaustive(distances: &[Vec<f64>], k: usize) -> Vec<usize> {
        let n = distances.len();
        let mut members: Vec<Option<Vec<usize>>> = (0..n).map(|i| Some(vec![i])).collect();
        let mut groups = n;
        while groups > k {
            let mut best = (0, 0, f64::INFINITY);
            for i in 0..n {
                for j in (i + 1)..n {
                    let (Some(a), Some(b)) = (&members[i], &members[j]) else {
                        continue;
                    };
                    let total: f64 = a
                        .iter()
                        .flat_map(|&x| b.iter().map(move |&y| distances[x][y]))
                        .sum();
                    let mean = total / (a.len() * b.len()) as f64;
                    if mean < best.2 {
                        best = (i, j, mean);
                    }
                }
            }
            let absorbed = members[best.1].take().unwrap();
            members[best.0].as_mut().unwrap().extend(absorbed);
            groups -= 1;
        }
        let mut labels = vec![usize::MAX; n];
        let mut next = 0;
        for point in 0..n {
            if labels[point] != usize::MAX {
                continue;
            }
            let group = members.iter().flatten().find(|g| g.contains(&point)).unwrap();
            for &member in group {
                labels[member] = next;
            }
            next += 1;
        }
        labels
    }

    fn scattered_points(n: usize) -> Vec<Vec<f64>> {
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = || {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            (state >> 11) as f64 / (1u64 << 53) as f64
        };
        let points: Vec<(f64, f64)> = (0..n).map(|_| (next() * 10.0, next() * 10.0)).collect();
        points
            .iter()
            .map(|a| {
                points
                    .iter()
                    .map(|b| ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt())
                    .collect()
            })
            .collect()
    }

    fn line(points: &[f64]) -> Vec<Vec<f64>> {
        points
            .iter()
            .map(|a| points.iter().map(|b| (a - b).abs()).collect())
            .collect()
    }

    #[test]
    fn separates_two_obvious_groups() {
        let labels = average_linkage(&line(&[0.0, 0.1, 0.2, 5.0, 5.1]), 2).unwrap();
        assert_eq!(labels, vec![0, 0, 0, 1, 1]);
    }

    #[test]
    fn single_cluster_merges_everything() {
        let labels = average_linkage(&line(&[0.0, 3.0, 9.0]), 1).unwrap();
        assert_eq!(labels, vec![0, 0, 0]);
    }

    #[test]
    fn n_clusters_equal_to_points_keeps_singletons() {
        let labels = average_linkage(&line(&[0.0, 1.0, 2.0]), 3).unwrap();
        assert_eq!(labels, vec![0, 1, 2]);
    }

    #[test]
    fn merged_cluster_distance_is_the_member_mean() {
        // After {2, 3} merges, 1 sits 1.45 from it on average, farther than 0.
        let labels = average_linkage(&line(&[0.0, 1.0, 2.0, 2.9]), 2).unwrap();
        assert_eq!(labels, vec![0, 0, 1, 1]);
    }

    #[test]
    fn matches_exhaustive_merging_at_every_cut() {
        let distances = scattered_points(30);
        for k in 1..=30 {
            assert_eq!(
                average_linkage(&distances, k).unwrap(),
                exhaustive(&distances, k),
                "k = {k}"
            );
        }
    }

    #[test]
    fn handles_thousands_of_points() {
        let points: Vec<f64> = (0..2000)
            .map(|i| if i % 2 == 0 { i as f64 * 1e-4 } else { 100.0 + i as f64 * 1e-4 })
            .collect();
        let labels = average_linkage(&line(&points), 2).unwrap();
        for (i, label) in labels.iter().enumerate() {
            assert_eq!(*label, i % 2);
        }
    }

    #[test]
    fn equal_distances_resolve_the_same_way_every_time() {
        let distances = line(&[0.0, 1.0, 2.0, 3.0]);
        let first = average_linkage(&distances, 2).unwrap();
        assert_eq!(first, average_linkage(&distances, 2).unwrap());
        assert_eq!(first, vec![0, 0, 1, 1]);
    }

    #[test]
    fn negative_distances_are_accepted() {
        let distances = vec![vec![0.0, -0.05], vec![-0.05, 0.0]];
        assert_eq!(average_linkage(&distances, 1).unwrap(), vec![0, 0]);
    }

    #[test]
    fn rejects_malformed_input() {
        let ragged = vec![vec![0.0, 1.0], vec![1.0]];
        assert!(matches!(
            average_linkage(&ragged, 1),
            Err(LinkageError::NotSquare { row: 1, .. })
        ));

        let nan = vec![vec![0.0, f64::NAN], vec![f64::NAN, 0.0]];
        assert_eq!(
            average_linkage(&nan, 1),
            Err(LinkageError::NonFiniteDistance { row: 0, col: 1 })
        );

        assert_eq!(
            average_linkage(&line(&[0.0, 1.0]), 3),
            Err(LinkageError::InvalidClusterCount {
                requested: 3,
                points: 2
            })
        );
    }
}
