//! UMAP-style embedding (lightweight variant).
//!
//! A compact take on Uniform Manifold Approximation and Projection
//! (McInnes et al., 2018) for visualization of larger, higher-dimensional
//! datasets than t-SNE comfortably handles:
//!
//! 1. Build a k-nearest-neighbor graph.
//! 2. Convert neighbor distances to edge weights with a per-point
//!    bandwidth calibrated so each point's total weight matches
//!    `log2(n_neighbors)` (local connectivity normalization), then
//!    symmetrize with the probabilistic t-conorm `w + w' - w·w'`.
//! 3. Initialize the layout with PCA and refine it by stochastic
//!    attraction along graph edges plus sampled repulsion, under a
//!    linearly decaying learning rate.
//!
//! This is an iterative approximation of the reference algorithm, not a
//! port: no spectral initialization, no fitted output-kernel parameters.
//! Seed it for reproducible layouts.

use rand::prelude::*;

use super::pca::Pca;
use crate::error::{Error, Result};
use crate::math;

/// Binary-search iterations for the per-point bandwidth.
const BANDWIDTH_SEARCH_STEPS: usize = 20;
/// Random repulsion samples per edge endpoint per epoch.
const NEGATIVE_SAMPLES: usize = 3;
/// Per-axis displacement clip, keeps early epochs from exploding.
const MAX_STEP: f64 = 4.0;

/// UMAP-style reducer.
#[derive(Debug, Clone)]
pub struct Umap {
    /// Output dimensionality.
    n_components: usize,
    /// Neighborhood size for the kNN graph.
    n_neighbors: usize,
    /// Optimization epochs.
    n_iter: usize,
    /// Initial learning rate, decays linearly to zero.
    learning_rate: f64,
    /// Optional RNG seed for reproducible layouts.
    seed: Option<u64>,
}

/// Everything a UMAP fit produces.
#[derive(Debug, Clone)]
pub struct UmapFit {
    /// Embedded coordinates: one row per input row, `n_components` columns.
    pub embedding: Vec<Vec<f32>>,
}

impl Umap {
    /// Create a UMAP reducer targeting `n_components` output dimensions.
    pub fn new(n_components: usize) -> Self {
        Self {
            n_components,
            n_neighbors: 15,
            n_iter: 200,
            learning_rate: 1.0,
            seed: None,
        }
    }

    /// Set the neighborhood size (default 15; capped at `n - 1`).
    pub fn with_n_neighbors(mut self, n_neighbors: usize) -> Self {
        self.n_neighbors = n_neighbors;
        self
    }

    /// Set the number of optimization epochs (default 200).
    pub fn with_n_iter(mut self, n_iter: usize) -> Self {
        self.n_iter = n_iter;
        self
    }

    /// Set the initial learning rate (default 1.0).
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Set the RNG seed for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Fit the reducer and return the embedding.
    pub fn fit(&self, data: &[Vec<f32>]) -> Result<UmapFit> {
        let n = data.len();
        let d = math::validate_matrix(data)?;

        if self.n_components < 1 {
            return Err(Error::InvalidParameter {
                name: "n_components",
                message: "must be at least 1",
            });
        }
        if self.n_neighbors < 1 {
            return Err(Error::InvalidParameter {
                name: "n_neighbors",
                message: "must be at least 1",
            });
        }
        if self.n_iter < 1 {
            return Err(Error::InvalidParameter {
                name: "n_iter",
                message: "must be at least 1",
            });
        }

        if n == 1 {
            return Ok(UmapFit {
                embedding: vec![vec![0.0; self.n_components]],
            });
        }

        let mut rng: Box<dyn RngCore> = match self.seed {
            Some(s) => Box::new(StdRng::seed_from_u64(s)),
            None => Box::new(rand::rng()),
        };

        let edges = self.weighted_edges(data, n);

        // PCA layout as the starting point, padded with zero columns when
        // the data has fewer dimensions than the target.
        let m = self.n_components;
        let pca_components = m.min(d);
        let pca = Pca::new(pca_components).fit(data)?;
        let mut y = vec![0.0f64; n * m];
        for i in 0..n {
            for c in 0..pca_components {
                y[i * m + c] = f64::from(pca.embedding[i][c]);
            }
            // Tiny jitter breaks exact ties between duplicate rows.
            for c in 0..m {
                y[i * m + c] += rng.random::<f64>() * 1e-4;
            }
        }

        for epoch in 0..self.n_iter {
            let alpha = self.learning_rate * (1.0 - epoch as f64 / self.n_iter as f64);

            for &(i, j, weight) in &edges {
                // Attraction between edge endpoints.
                let mut dist_sq = 0.0f64;
                for c in 0..m {
                    let diff = y[i * m + c] - y[j * m + c];
                    dist_sq += diff * diff;
                }
                let pull = (alpha * f64::from(weight)) / (1.0 + dist_sq);
                for c in 0..m {
                    let delta = (pull * (y[j * m + c] - y[i * m + c])).clamp(-MAX_STEP, MAX_STEP);
                    y[i * m + c] += delta;
                    y[j * m + c] -= delta;
                }

                // Sampled repulsion away from random points.
                for _ in 0..NEGATIVE_SAMPLES {
                    let other = rng.random_range(0..n);
                    if other == i {
                        continue;
                    }
                    let mut rep_dist_sq = 0.0f64;
                    for c in 0..m {
                        let diff = y[i * m + c] - y[other * m + c];
                        rep_dist_sq += diff * diff;
                    }
                    let push = alpha / ((0.01 + rep_dist_sq) * (1.0 + rep_dist_sq));
                    for c in 0..m {
                        let delta = (push * (y[i * m + c] - y[other * m + c]))
                            .clamp(-MAX_STEP, MAX_STEP);
                        y[i * m + c] += delta;
                    }
                }
            }
        }

        tracing::debug!(n_iter = self.n_iter, n_edges = edges.len(), "umap finished");

        let embedding = (0..n)
            .map(|i| (0..m).map(|c| y[i * m + c] as f32).collect())
            .collect();
        Ok(UmapFit { embedding })
    }

    /// kNN graph with locally normalized, symmetrized edge weights.
    fn weighted_edges(&self, data: &[Vec<f32>], n: usize) -> Vec<(usize, usize, f32)> {
        let k = self.n_neighbors.min(n - 1);
        let target = (k as f64).log2().max(1.0);

        // Directed weights, keyed (i, j) with i < j resolved later.
        let mut directed = vec![0.0f64; n * n];

        for i in 0..n {
            let mut dists: Vec<(usize, f64)> = (0..n)
                .filter(|&j| j != i)
                .map(|j| (j, f64::from(math::squared_euclidean(&data[i], &data[j])).sqrt()))
                .collect();
            dists.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
            dists.truncate(k);

            let rho = dists.first().map(|&(_, d)| d).unwrap_or(0.0);

            // Calibrate sigma so the total membership strength of the
            // neighborhood hits the target.
            let mut sigma = 1.0f64;
            let mut lo = 0.0f64;
            let mut hi = f64::INFINITY;
            for _ in 0..BANDWIDTH_SEARCH_STEPS {
                let total: f64 = dists
                    .iter()
                    .map(|&(_, d)| (-((d - rho).max(0.0)) / sigma).exp())
                    .sum();
                if (total - target).abs() < 1e-5 {
                    break;
                }
                if total > target {
                    hi = sigma;
                    sigma = (lo + sigma) / 2.0;
                } else {
                    lo = sigma;
                    sigma = if hi.is_finite() { (sigma + hi) / 2.0 } else { sigma * 2.0 };
                }
            }

            for &(j, dist) in &dists {
                directed[i * n + j] = (-((dist - rho).max(0.0)) / sigma).exp();
            }
        }

        // Probabilistic t-conorm symmetrization.
        let mut edges = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                let a = directed[i * n + j];
                let b = directed[j * n + i];
                let w = a + b - a * b;
                if w > 0.0 {
                    edges.push((i, j, w as f32));
                }
            }
        }
        edges
    }
}
