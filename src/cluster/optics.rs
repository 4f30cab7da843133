//! OPTICS: Ordering Points To Identify the Clustering Structure.
//!
//! OPTICS (Ankerst et al., 1999) generalizes DBSCAN across density
//! scales. Instead of committing to one ε, it produces a *visitation
//! ordering* together with a reachability distance per point; valleys in
//! the reachability plot are clusters at whatever density they occur.
//!
//! ## Core and reachability distances
//!
//! - **Core distance** of p: distance to its `min_pts`-th nearest other
//!   point (∞ if p has fewer than `min_pts` neighbors within `max_eps`).
//! - **Reachability distance** of o from p:
//!   `max(core_distance(p), dist(p, o))`.
//!
//! The traversal repeatedly expands the unprocessed point with the
//! smallest reachability, which makes the ordering density-greedy:
//! dense regions are exhausted before the walk crosses a sparse gap.
//!
//! ## Cluster extraction
//!
//! This implementation carves clusters out of the ordering with a flat
//! reachability threshold, exposed as a tunable parameter (not a hidden
//! constant): contiguous runs of points whose reachability stays at or
//! below the threshold share a cluster; a high-reachability point either
//! starts a new cluster (if it is itself core at that threshold) or is
//! noise. Points never reached within `max_eps` stay noise.
//!
//! Complexity is O(n²) with the linear-scan neighborhood query used here,
//! matching [`super::Dbscan`].

use super::dbscan::NOISE;
use super::traits::Clustering;
use crate::error::{Error, Result};
use crate::math;

/// OPTICS clustering algorithm.
#[derive(Debug, Clone)]
pub struct Optics {
    /// Minimum neighbor count (excluding self) for core classification.
    min_pts: usize,
    /// Maximum neighborhood radius considered during traversal.
    max_eps: f32,
    /// Reachability threshold used when carving clusters from the ordering.
    extraction_threshold: f32,
}

/// Everything an OPTICS fit produces.
#[derive(Debug, Clone)]
pub struct OpticsFit {
    /// Visitation order; a permutation of `0..n`.
    pub ordering: Vec<usize>,
    /// Reachability distance per point (`f32::INFINITY` where undefined,
    /// e.g. for the first point of each connected region).
    pub reachability: Vec<f32>,
    /// Core distance per point (`f32::INFINITY` for non-core points).
    pub core_distances: Vec<f32>,
    /// Labels extracted at the configured threshold; noise carries [`NOISE`].
    pub labels: Vec<usize>,
    /// Number of clusters extracted.
    pub n_clusters: usize,
}

impl Optics {
    /// Create a new OPTICS clusterer.
    pub fn new(min_pts: usize) -> Self {
        Self {
            min_pts,
            max_eps: f32::INFINITY,
            extraction_threshold: 0.5,
        }
    }

    /// Bound the neighborhood radius (default: unbounded).
    pub fn with_max_eps(mut self, max_eps: f32) -> Self {
        self.max_eps = max_eps;
        self
    }

    /// Set the reachability threshold used for cluster extraction.
    pub fn with_extraction_threshold(mut self, threshold: f32) -> Self {
        self.extraction_threshold = threshold;
        self
    }

    /// Fit the model: compute the ordering, distances, and labels.
    pub fn fit(&self, data: &[Vec<f32>]) -> Result<OpticsFit> {
        let n = data.len();
        if n == 0 {
            return Err(Error::EmptyInput);
        }
        math::validate_matrix(data)?;

        if self.min_pts < 1 {
            return Err(Error::InvalidParameter {
                name: "min_pts",
                message: "must be at least 1",
            });
        }
        if self.max_eps <= 0.0 {
            return Err(Error::InvalidParameter {
                name: "max_eps",
                message: "must be positive",
            });
        }
        if self.extraction_threshold <= 0.0 {
            return Err(Error::InvalidParameter {
                name: "extraction_threshold",
                message: "must be positive",
            });
        }

        let mut processed = vec![false; n];
        let mut reachability = vec![f32::INFINITY; n];
        let mut core_distances = vec![f32::INFINITY; n];
        let mut ordering = Vec::with_capacity(n);

        // Seed set of points adjacent to the processed region, keyed by
        // current reachability. Linear-scan minimum keeps ties resolved
        // by lowest index, so the ordering is reproducible.
        let mut seeds: Vec<usize> = Vec::new();

        for start in 0..n {
            if processed[start] {
                continue;
            }
            self.process_point(start, data, &mut processed, &mut reachability, &mut core_distances, &mut ordering, &mut seeds);

            while let Some(pos) = argmin_reachability(&seeds, &reachability) {
                let next = seeds.swap_remove(pos);
                self.process_point(next, data, &mut processed, &mut reachability, &mut core_distances, &mut ordering, &mut seeds);
            }
        }

        let (labels, n_clusters) =
            extract_labels(&ordering, &reachability, &core_distances, self.extraction_threshold);

        Ok(OpticsFit {
            ordering,
            reachability,
            core_distances,
            labels,
            n_clusters,
        })
    }

    /// Mark a point processed, record it in the ordering, and relax the
    /// reachability of its unprocessed neighbors if it is core.
    #[allow(clippy::too_many_arguments)]
    fn process_point(
        &self,
        idx: usize,
        data: &[Vec<f32>],
        processed: &mut [bool],
        reachability: &mut [f32],
        core_distances: &mut [f32],
        ordering: &mut Vec<usize>,
        seeds: &mut Vec<usize>,
    ) {
        processed[idx] = true;
        ordering.push(idx);

        let neighbors = self.neighbors_within_max_eps(data, idx);
        let core_dist = self.core_distance(&neighbors);
        core_distances[idx] = core_dist;

        if !core_dist.is_finite() {
            return;
        }

        for &(other, dist) in &neighbors {
            if processed[other] {
                continue;
            }
            let reach = core_dist.max(dist);
            if reach < reachability[other] {
                // A point enters the seed set exactly when its
                // reachability first becomes finite.
                if reachability[other].is_infinite() {
                    seeds.push(other);
                }
                reachability[other] = reach;
            }
        }
    }

    /// Neighbors within `max_eps` (excluding self), with distances.
    fn neighbors_within_max_eps(&self, data: &[Vec<f32>], idx: usize) -> Vec<(usize, f32)> {
        let point = &data[idx];
        data.iter()
            .enumerate()
            .filter(|(j, _)| *j != idx)
            .filter_map(|(j, other)| {
                let dist = math::squared_euclidean(point, other).sqrt();
                (dist <= self.max_eps).then_some((j, dist))
            })
            .collect()
    }

    /// Distance to the `min_pts`-th nearest neighbor, or ∞ if not core.
    fn core_distance(&self, neighbors: &[(usize, f32)]) -> f32 {
        if neighbors.len() < self.min_pts {
            return f32::INFINITY;
        }
        let mut dists: Vec<f32> = neighbors.iter().map(|&(_, d)| d).collect();
        dists.sort_by(|a, b| a.total_cmp(b));
        dists[self.min_pts - 1]
    }
}

/// Index into `seeds` of the entry with minimum reachability (ties to the
/// lowest point index).
fn argmin_reachability(seeds: &[usize], reachability: &[f32]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (pos, &idx) in seeds.iter().enumerate() {
        match best {
            None => best = Some(pos),
            Some(b) => {
                let (br, bi) = (reachability[seeds[b]], seeds[b]);
                let r = reachability[idx];
                if r < br || (r == br && idx < bi) {
                    best = Some(pos);
                }
            }
        }
    }
    best
}

/// Carve clusters out of the ordering with a flat reachability threshold.
fn extract_labels(
    ordering: &[usize],
    reachability: &[f32],
    core_distances: &[f32],
    threshold: f32,
) -> (Vec<usize>, usize) {
    let n = ordering.len();
    let mut labels = vec![NOISE; n];
    let mut current: Option<usize> = None;
    let mut next_cluster = 0usize;

    for &idx in ordering {
        if reachability[idx] > threshold {
            // Too far from the preceding run; either this point anchors a
            // fresh dense region or it is noise.
            if core_distances[idx] <= threshold {
                current = Some(next_cluster);
                next_cluster += 1;
                labels[idx] = current.expect("just set");
            } else {
                current = None;
            }
        } else if let Some(cluster) = current {
            labels[idx] = cluster;
        } else if core_distances[idx] <= threshold {
            current = Some(next_cluster);
            next_cluster += 1;
            labels[idx] = current.expect("just set");
        }
    }

    (labels, next_cluster)
}

impl Clustering for Optics {
    fn fit_predict(&self, data: &[Vec<f32>]) -> Result<Vec<usize>> {
        Ok(self.fit(data)?.labels)
    }

    /// OPTICS discovers clusters dynamically, so this returns 0.
    fn n_clusters(&self) -> usize {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_blobs() -> Vec<Vec<f32>> {
        vec![
            vec![0.0, 0.0],
            vec![0.2, 0.0],
            vec![0.0, 0.2],
            vec![0.2, 0.2],
            vec![10.0, 10.0],
            vec![10.2, 10.0],
            vec![10.0, 10.2],
            vec![10.2, 10.2],
        ]
    }

    #[test]
    fn ordering_is_a_permutation() {
        let fit = Optics::new(2).fit(&two_blobs()).unwrap();
        let mut sorted = fit.ordering.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn two_blobs_extract_two_clusters() {
        let fit = Optics::new(2)
            .with_extraction_threshold(1.0)
            .fit(&two_blobs())
            .unwrap();

        assert_eq!(fit.n_clusters, 2);
        assert_eq!(fit.labels[0], fit.labels[1]);
        assert_eq!(fit.labels[4], fit.labels[5]);
        assert_ne!(fit.labels[0], fit.labels[4]);
        assert!(fit.labels.iter().all(|&l| l != NOISE));
    }

    #[test]
    fn dense_region_visited_before_crossing_gap() {
        // The walk starts at index 0 and must exhaust the first blob
        // before the large-reachability jump to the second.
        let fit = Optics::new(2).fit(&two_blobs()).unwrap();
        let first_four: std::collections::HashSet<usize> =
            fit.ordering[..4].iter().copied().collect();
        assert_eq!(first_four, (0..4).collect());
    }

    #[test]
    fn min_pts_above_n_is_all_noise() {
        let data = vec![vec![0.0], vec![0.1], vec![0.2]];
        let fit = Optics::new(10).fit(&data).unwrap();
        assert_eq!(fit.n_clusters, 0);
        assert!(fit.labels.iter().all(|&l| l == NOISE));
        assert!(fit.core_distances.iter().all(|d| d.is_infinite()));
    }

    #[test]
    fn max_eps_bounds_reachability() {
        // With a tight max_eps the far blob is unreachable from the first
        // and restarts with infinite reachability.
        let fit = Optics::new(2).with_max_eps(1.0).fit(&two_blobs()).unwrap();
        let second_start = fit.ordering[4];
        assert!(fit.reachability[second_start].is_infinite());
    }

    #[test]
    fn isolated_outlier_is_noise() {
        let mut data = two_blobs();
        data.push(vec![100.0, 100.0]);
        let fit = Optics::new(2)
            .with_extraction_threshold(1.0)
            .fit(&data)
            .unwrap();
        assert_eq!(fit.labels[8], NOISE);
    }

    #[test]
    fn empty_input_error() {
        let data: Vec<Vec<f32>> = vec![];
        assert!(Optics::new(2).fit(&data).is_err());
    }

    #[test]
    fn invalid_params_rejected() {
        let data = vec![vec![0.0]];
        assert!(Optics::new(0).fit(&data).is_err());
        assert!(Optics::new(2).with_max_eps(0.0).fit(&data).is_err());
        assert!(Optics::new(2).with_extraction_threshold(-1.0).fit(&data).is_err());
    }
}
