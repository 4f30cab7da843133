//! K-means clustering with k-means++ seeding.
//!
//! Partitions data into k clusters by minimizing **within-cluster sum of
//! squares** (inertia):
//!
//! ```text
//! J = Σ_k Σ_{x ∈ C_k} ||x - μ_k||²
//! ```
//!
//! Lloyd's iterations: assign each point to its nearest centroid, then
//! move each centroid to the mean of its points. Each step either lowers
//! J or leaves it unchanged, and J is bounded below by 0, so the loop
//! converges (to a local minimum; the global problem is NP-hard).
//!
//! ## K-means++ seeding
//!
//! Uniform-random seeding can place two initial centroids inside one
//! spatial group and produce empty or lopsided clusters. K-means++
//! (Arthur & Vassilvitskii, 2007) picks the first centroid uniformly and
//! each later one with probability proportional to the squared distance
//! to the nearest already-chosen centroid, spreading the seeds out.
//!
//! ## Assumptions
//!
//! - Clusters are roughly spherical and similarly sized
//! - You know k in advance (see the elbow sweep in [`crate::evaluate`])

use super::traits::Clustering;
use crate::error::{Error, Result};
use crate::math;
use rand::prelude::*;

/// K-means clustering algorithm.
#[derive(Debug, Clone)]
pub struct Kmeans {
    /// Number of clusters.
    k: usize,
    /// Maximum Lloyd iterations.
    max_iter: usize,
    /// Convergence tolerance on the change in inertia.
    tol: f32,
    /// Optional RNG seed for reproducible seeding.
    seed: Option<u64>,
}

/// Everything a k-means fit produces.
#[derive(Debug, Clone)]
pub struct KmeansFit {
    /// One cluster label per input point, in `0..k`.
    pub labels: Vec<usize>,
    /// Final centroid positions, `k` rows.
    pub centroids: Vec<Vec<f32>>,
    /// Final within-cluster sum of squares.
    pub inertia: f32,
    /// Number of Lloyd iterations run.
    pub n_iter: usize,
    /// Whether the run stopped on a convergence criterion rather than
    /// the iteration cap.
    pub converged: bool,
}

impl Kmeans {
    /// Create a new k-means clusterer with `k` clusters.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iter: 100,
            tol: 1e-6,
            seed: None,
        }
    }

    /// Set the maximum number of Lloyd iterations.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the convergence tolerance on the inertia change.
    pub fn with_tol(mut self, tol: f32) -> Self {
        self.tol = tol;
        self
    }

    /// Set the RNG seed for reproducible seeding.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Fit the model and return labels, centroids, and diagnostics.
    pub fn fit(&self, data: &[Vec<f32>]) -> Result<KmeansFit> {
        let n = data.len();
        math::validate_matrix(data)?;

        if self.k < 1 || self.k > n {
            return Err(Error::InvalidClusterCount {
                requested: self.k,
                n_items: n,
            });
        }

        let mut rng: Box<dyn RngCore> = match self.seed {
            Some(s) => Box::new(StdRng::seed_from_u64(s)),
            None => Box::new(rand::rng()),
        };

        let mut centroids = self.init_centroids(data, &mut rng);
        let mut labels = vec![0usize; n];
        let mut prev_inertia = f32::INFINITY;
        let mut inertia = 0.0f32;
        let mut n_iter = 0;
        let mut converged = false;

        for iter in 0..self.max_iter {
            n_iter = iter + 1;

            // Assignment: nearest centroid, ties going to the lowest index
            // (strict `<` during the in-order scan).
            let mut changed = false;
            for (i, point) in data.iter().enumerate() {
                let mut best = 0usize;
                let mut best_dist = f32::INFINITY;
                for (c, centroid) in centroids.iter().enumerate() {
                    let dist = math::squared_euclidean(point, centroid);
                    if dist < best_dist {
                        best_dist = dist;
                        best = c;
                    }
                }
                if labels[i] != best {
                    labels[i] = best;
                    changed = true;
                }
            }

            // Update: mean of members; a centroid with no members keeps
            // its previous position rather than becoming undefined.
            let d = data[0].len();
            let mut sums = vec![vec![0.0f32; d]; self.k];
            let mut counts = vec![0usize; self.k];
            for (point, &label) in data.iter().zip(labels.iter()) {
                counts[label] += 1;
                for (acc, &x) in sums[label].iter_mut().zip(point.iter()) {
                    *acc += x;
                }
            }
            for c in 0..self.k {
                if counts[c] > 0 {
                    for acc in &mut sums[c] {
                        *acc /= counts[c] as f32;
                    }
                    centroids[c] = std::mem::take(&mut sums[c]);
                }
            }

            inertia = total_inertia(data, &centroids, &labels);

            if iter > 0 && !changed {
                converged = true;
                break;
            }
            if (prev_inertia - inertia).abs() < self.tol {
                converged = true;
                break;
            }
            prev_inertia = inertia;
        }

        tracing::debug!(
            n_iter,
            inertia,
            converged,
            "k-means finished"
        );

        Ok(KmeansFit {
            labels,
            centroids,
            inertia,
            n_iter,
            converged,
        })
    }

    /// K-means++ seeding.
    fn init_centroids(&self, data: &[Vec<f32>], rng: &mut dyn RngCore) -> Vec<Vec<f32>> {
        plus_plus_seeds(data, self.k, rng)
    }
}

/// K-means++ seed selection: first seed uniform-random, each later seed
/// sampled with probability proportional to its squared distance to the
/// nearest seed chosen so far. Shared with the GMM, whose mean
/// initialization has the same failure mode under uniform sampling.
pub(crate) fn plus_plus_seeds(
    data: &[Vec<f32>],
    k: usize,
    rng: &mut dyn RngCore,
) -> Vec<Vec<f32>> {
    let n = data.len();
    let mut seeds: Vec<Vec<f32>> = Vec::with_capacity(k);

    let first = rng.random_range(0..n);
    seeds.push(data[first].clone());

    let mut min_dists: Vec<f32> = data
        .iter()
        .map(|p| math::squared_euclidean(p, &seeds[0]))
        .collect();

    for _ in 1..k {
        let total: f32 = min_dists.iter().sum();
        let chosen = if total <= 0.0 {
            // Every point coincides with an existing seed; any choice is
            // equivalent.
            rng.random_range(0..n)
        } else {
            let threshold = rng.random::<f32>() * total;
            let mut cumsum = 0.0f32;
            let mut idx = n - 1;
            for (j, &dist) in min_dists.iter().enumerate() {
                cumsum += dist;
                if cumsum >= threshold {
                    idx = j;
                    break;
                }
            }
            idx
        };

        seeds.push(data[chosen].clone());
        let latest = seeds.last().expect("just pushed");
        for (dist, point) in min_dists.iter_mut().zip(data.iter()) {
            let d = math::squared_euclidean(point, latest);
            if d < *dist {
                *dist = d;
            }
        }
    }

    seeds
}

/// Sum of squared distances from each point to its assigned centroid.
pub(crate) fn total_inertia(data: &[Vec<f32>], centroids: &[Vec<f32>], labels: &[usize]) -> f32 {
    data.iter()
        .zip(labels.iter())
        .map(|(point, &label)| math::squared_euclidean(point, &centroids[label]))
        .sum()
}

impl Clustering for Kmeans {
    fn fit_predict(&self, data: &[Vec<f32>]) -> Result<Vec<usize>> {
        Ok(self.fit(data)?.labels)
    }

    fn n_clusters(&self) -> usize {
        self.k
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_pairs() -> Vec<Vec<f32>> {
        vec![
            vec![0.0, 0.0],
            vec![0.0, 1.0],
            vec![10.0, 10.0],
            vec![10.0, 11.0],
        ]
    }

    #[test]
    fn two_well_separated_pairs() {
        let fit = Kmeans::new(2).with_seed(42).fit(&two_pairs()).unwrap();

        assert_eq!(fit.labels[0], fit.labels[1]);
        assert_eq!(fit.labels[2], fit.labels[3]);
        assert_ne!(fit.labels[0], fit.labels[2]);

        // Centroids land on the pair midpoints and inertia is the four
        // half-unit squared offsets: 4 * 0.25 = 1.
        assert!((fit.inertia - 1.0).abs() < 1e-4);
        let mut centroids = fit.centroids.clone();
        centroids.sort_by(|a, b| a[0].total_cmp(&b[0]));
        assert!((centroids[0][0]).abs() < 1e-4);
        assert!((centroids[0][1] - 0.5).abs() < 1e-4);
        assert!((centroids[1][0] - 10.0).abs() < 1e-4);
        assert!((centroids[1][1] - 10.5).abs() < 1e-4);
        assert!(fit.converged);
    }

    #[test]
    fn k_equals_n_gives_zero_inertia() {
        let data = vec![vec![0.0, 0.0], vec![5.0, 5.0], vec![10.0, 0.0]];
        let fit = Kmeans::new(3).with_seed(7).fit(&data).unwrap();

        let unique: std::collections::HashSet<_> = fit.labels.iter().collect();
        assert_eq!(unique.len(), 3);
        assert!(fit.inertia < 1e-6);
    }

    #[test]
    fn deterministic_with_seed() {
        let data = two_pairs();
        let labels1 = Kmeans::new(2).with_seed(42).fit_predict(&data).unwrap();
        let labels2 = Kmeans::new(2).with_seed(42).fit_predict(&data).unwrap();
        assert_eq!(labels1, labels2);
    }

    #[test]
    fn inertia_non_increasing_across_iteration_caps() {
        // Running with a larger iteration budget can only lower inertia.
        let data: Vec<Vec<f32>> = (0..40)
            .map(|i| vec![(i % 7) as f32, (i % 5) as f32 * 2.0])
            .collect();

        let short = Kmeans::new(4).with_seed(3).with_max_iter(1).fit(&data).unwrap();
        let long = Kmeans::new(4).with_seed(3).with_max_iter(100).fit(&data).unwrap();
        assert!(long.inertia <= short.inertia + 1e-5);
    }

    #[test]
    fn labels_in_range() {
        let data: Vec<Vec<f32>> = (0..30).map(|i| vec![i as f32, (i * i % 13) as f32]).collect();
        let fit = Kmeans::new(5).with_seed(1).fit(&data).unwrap();
        assert_eq!(fit.labels.len(), 30);
        assert!(fit.labels.iter().all(|&l| l < 5));
    }

    #[test]
    fn empty_input_error() {
        let data: Vec<Vec<f32>> = vec![];
        assert!(matches!(
            Kmeans::new(2).fit(&data),
            Err(Error::EmptyInput)
        ));
    }

    #[test]
    fn k_zero_and_k_above_n_rejected() {
        let data = vec![vec![0.0], vec![1.0]];
        assert!(matches!(
            Kmeans::new(0).fit(&data),
            Err(Error::InvalidClusterCount { requested: 0, .. })
        ));
        assert!(matches!(
            Kmeans::new(3).fit(&data),
            Err(Error::InvalidClusterCount { requested: 3, .. })
        ));
    }

    #[test]
    fn ragged_rows_rejected() {
        let data = vec![vec![0.0, 0.0], vec![1.0]];
        assert!(Kmeans::new(1).fit(&data).is_err());
    }

    #[test]
    fn identical_points_converge() {
        let data = vec![vec![2.0, 2.0]; 6];
        let fit = Kmeans::new(2).with_seed(9).fit(&data).unwrap();
        assert!(fit.inertia < 1e-6);
        assert!(fit.converged);
    }

    #[test]
    fn single_cluster() {
        let data = two_pairs();
        let fit = Kmeans::new(1).with_seed(0).fit(&data).unwrap();
        assert!(fit.labels.iter().all(|&l| l == 0));
        assert_eq!(fit.centroids.len(), 1);
    }
}
