//! t-SNE: t-distributed Stochastic Neighbor Embedding.
//!
//! Iterative, stochastic dimensionality reduction for visualization
//! (van der Maaten & Hinton, 2008). High-dimensional neighborhoods are
//! converted to pairwise affinities with a per-point Gaussian bandwidth
//! calibrated by binary search against a target *perplexity*; the
//! low-dimensional layout is then gradient-descended to minimize the KL
//! divergence to those affinities under a heavy-tailed Student-t kernel.
//!
//! ## Caveats
//!
//! - Stochastic initialization: runs are only reproducible with
//!   [`Tsne::with_seed`].
//! - Every iteration touches all point pairs — O(n²) — so this is
//!   unsuitable beyond a few thousand points.
//! - Distances between well-separated groups in the output are not
//!   meaningful; only neighborhood structure is.

use rand::prelude::*;
use rand_distr::StandardNormal;

use crate::error::{Error, Result};
use crate::math;

/// Binary-search iterations for the per-point bandwidth calibration.
const BANDWIDTH_SEARCH_STEPS: usize = 50;
/// Tolerance on the entropy match during bandwidth calibration.
const ENTROPY_TOL: f64 = 1e-5;
/// Affinity multiplier during the early exaggeration phase.
const EARLY_EXAGGERATION: f64 = 4.0;
/// Iterations spent in the early exaggeration phase.
const EARLY_EXAGGERATION_ITERS: usize = 100;
/// Iteration at which momentum switches from 0.5 to 0.8.
const MOMENTUM_SWITCH_ITER: usize = 250;

/// t-SNE reducer.
#[derive(Debug, Clone)]
pub struct Tsne {
    /// Output dimensionality.
    n_components: usize,
    /// Target perplexity (effective neighborhood size).
    perplexity: f64,
    /// Gradient descent learning rate.
    learning_rate: f64,
    /// Gradient descent iterations.
    n_iter: usize,
    /// Optional RNG seed for reproducible initialization.
    seed: Option<u64>,
}

/// Everything a t-SNE fit produces.
#[derive(Debug, Clone)]
pub struct TsneFit {
    /// Embedded coordinates: one row per input row, `n_components` columns.
    pub embedding: Vec<Vec<f32>>,
}

impl Tsne {
    /// Create a t-SNE reducer targeting `n_components` output dimensions.
    pub fn new(n_components: usize) -> Self {
        Self {
            n_components,
            perplexity: 30.0,
            learning_rate: 200.0,
            n_iter: 500,
            seed: None,
        }
    }

    /// Set the target perplexity (default 30; clamped to `(n-1)/3`).
    pub fn with_perplexity(mut self, perplexity: f64) -> Self {
        self.perplexity = perplexity;
        self
    }

    /// Set the gradient descent learning rate (default 200).
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Set the number of gradient descent iterations (default 500).
    pub fn with_n_iter(mut self, n_iter: usize) -> Self {
        self.n_iter = n_iter;
        self
    }

    /// Set the RNG seed for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Fit the reducer and return the embedding.
    pub fn fit(&self, data: &[Vec<f32>]) -> Result<TsneFit> {
        let n = data.len();
        math::validate_matrix(data)?;

        if self.n_components < 1 {
            return Err(Error::InvalidParameter {
                name: "n_components",
                message: "must be at least 1",
            });
        }
        if self.perplexity <= 0.0 {
            return Err(Error::InvalidParameter {
                name: "perplexity",
                message: "must be positive",
            });
        }
        if self.n_iter < 1 {
            return Err(Error::InvalidParameter {
                name: "n_iter",
                message: "must be at least 1",
            });
        }

        if n == 1 {
            return Ok(TsneFit {
                embedding: vec![vec![0.0; self.n_components]],
            });
        }

        let mut rng: Box<dyn RngCore> = match self.seed {
            Some(s) => Box::new(StdRng::seed_from_u64(s)),
            None => Box::new(rand::rng()),
        };

        // Pairwise squared distances in the input space.
        let mut dist_sq = vec![0.0f64; n * n];
        for i in 0..n {
            for j in (i + 1)..n {
                let d = f64::from(math::squared_euclidean(&data[i], &data[j]));
                dist_sq[i * n + j] = d;
                dist_sq[j * n + i] = d;
            }
        }

        let p = self.joint_affinities(&dist_sq, n);

        // Small Gaussian initialization.
        let m = self.n_components;
        let mut y = vec![0.0f64; n * m];
        for v in y.iter_mut() {
            let sample: f64 = rng.sample(StandardNormal);
            *v = sample * 1e-2;
        }

        let mut velocity = vec![0.0f64; n * m];
        let mut q_num = vec![0.0f64; n * n];

        for iter in 0..self.n_iter {
            let exaggeration = if iter < EARLY_EXAGGERATION_ITERS {
                EARLY_EXAGGERATION
            } else {
                1.0
            };
            let momentum = if iter < MOMENTUM_SWITCH_ITER { 0.5 } else { 0.8 };

            // Student-t numerators and their total.
            let mut q_total = 0.0f64;
            for i in 0..n {
                for j in (i + 1)..n {
                    let mut d = 0.0f64;
                    for c in 0..m {
                        let diff = y[i * m + c] - y[j * m + c];
                        d += diff * diff;
                    }
                    let num = 1.0 / (1.0 + d);
                    q_num[i * n + j] = num;
                    q_num[j * n + i] = num;
                    q_total += 2.0 * num;
                }
            }

            for i in 0..n {
                let mut grad = vec![0.0f64; m];
                for j in 0..n {
                    if i == j {
                        continue;
                    }
                    let num = q_num[i * n + j];
                    let q = (num / q_total).max(1e-12);
                    let coeff = 4.0 * (exaggeration * p[i * n + j] - q) * num;
                    for c in 0..m {
                        grad[c] += coeff * (y[i * m + c] - y[j * m + c]);
                    }
                }
                for c in 0..m {
                    velocity[i * m + c] =
                        momentum * velocity[i * m + c] - self.learning_rate * grad[c];
                }
            }

            for (pos, vel) in y.iter_mut().zip(velocity.iter()) {
                *pos += vel;
            }

            // Keep the layout centered so it cannot drift.
            for c in 0..m {
                let mean: f64 = (0..n).map(|i| y[i * m + c]).sum::<f64>() / n as f64;
                for i in 0..n {
                    y[i * m + c] -= mean;
                }
            }
        }

        tracing::debug!(n_iter = self.n_iter, n, "t-sne finished");

        let embedding = (0..n)
            .map(|i| (0..m).map(|c| y[i * m + c] as f32).collect())
            .collect();
        Ok(TsneFit { embedding })
    }

    /// Symmetrized joint affinities from per-point calibrated Gaussians.
    fn joint_affinities(&self, dist_sq: &[f64], n: usize) -> Vec<f64> {
        // Perplexity cannot exceed the neighbor count; clamp rather than
        // error so tiny inputs still embed.
        let effective = self.perplexity.min(((n - 1) as f64 / 3.0).max(1.0));
        let target_entropy = effective.ln();

        let mut conditional = vec![0.0f64; n * n];
        for i in 0..n {
            let mut beta = 1.0f64;
            let mut beta_min = f64::NEG_INFINITY;
            let mut beta_max = f64::INFINITY;

            for _ in 0..BANDWIDTH_SEARCH_STEPS {
                let mut sum_p = 0.0f64;
                let mut sum_dp = 0.0f64;
                for j in 0..n {
                    if j == i {
                        continue;
                    }
                    let pj = (-dist_sq[i * n + j] * beta).exp();
                    conditional[i * n + j] = pj;
                    sum_p += pj;
                    sum_dp += dist_sq[i * n + j] * pj;
                }

                if sum_p <= 0.0 {
                    break;
                }
                let entropy = sum_p.ln() + beta * sum_dp / sum_p;
                let diff = entropy - target_entropy;
                if diff.abs() < ENTROPY_TOL {
                    break;
                }
                if diff > 0.0 {
                    beta_min = beta;
                    beta = if beta_max.is_finite() {
                        (beta + beta_max) / 2.0
                    } else {
                        beta * 2.0
                    };
                } else {
                    beta_max = beta;
                    beta = if beta_min.is_finite() {
                        (beta + beta_min) / 2.0
                    } else {
                        beta / 2.0
                    };
                }
            }

            let sum_p: f64 = (0..n).filter(|&j| j != i).map(|j| conditional[i * n + j]).sum();
            if sum_p > 0.0 {
                for j in 0..n {
                    if j != i {
                        conditional[i * n + j] /= sum_p;
                    }
                }
            }
        }

        let mut joint = vec![0.0f64; n * n];
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                joint[i * n + j] =
                    ((conditional[i * n + j] + conditional[j * n + i]) / (2.0 * n as f64))
                        .max(1e-12);
            }
        }
        joint
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_blobs() -> Vec<Vec<f32>> {
        vec![
            vec![0.0, 0.0, 0.0],
            vec![0.2, 0.1, 0.0],
            vec![0.1, 0.2, 0.1],
            vec![10.0, 10.0, 10.0],
            vec![10.2, 10.1, 10.0],
            vec![10.1, 10.2, 10.1],
        ]
    }

    #[test]
    fn embedding_shape() {
        let fit = Tsne::new(2).with_seed(42).fit(&two_blobs()).unwrap();
        assert_eq!(fit.embedding.len(), 6);
        assert!(fit.embedding.iter().all(|row| row.len() == 2));
    }

    #[test]
    fn deterministic_with_seed() {
        let data = two_blobs();
        let a = Tsne::new(2).with_seed(7).fit(&data).unwrap();
        let b = Tsne::new(2).with_seed(7).fit(&data).unwrap();
        assert_eq!(a.embedding, b.embedding);
    }

    #[test]
    fn separated_blobs_stay_separated() {
        let data = two_blobs();
        // A gentle learning rate keeps the tiny layout from oscillating.
        let fit = Tsne::new(2)
            .with_learning_rate(10.0)
            .with_n_iter(1000)
            .with_seed(42)
            .fit(&data)
            .unwrap();
        let emb = &fit.embedding;

        let dist =
            |a: &[f32], b: &[f32]| -> f32 { math::squared_euclidean(a, b).sqrt() };

        let within = (dist(&emb[0], &emb[1]) + dist(&emb[1], &emb[2]) + dist(&emb[3], &emb[4]))
            / 3.0;
        let cross = (dist(&emb[0], &emb[3]) + dist(&emb[1], &emb[4]) + dist(&emb[2], &emb[5]))
            / 3.0;
        assert!(
            within < cross,
            "within-blob mean {within} should be below cross-blob mean {cross}"
        );
    }

    #[test]
    fn single_point_embeds_at_origin() {
        let data = vec![vec![1.0, 2.0, 3.0]];
        let fit = Tsne::new(2).fit(&data).unwrap();
        assert_eq!(fit.embedding, vec![vec![0.0, 0.0]]);
    }

    #[test]
    fn invalid_params_rejected() {
        let data = two_blobs();
        assert!(Tsne::new(0).fit(&data).is_err());
        assert!(Tsne::new(2).with_perplexity(0.0).fit(&data).is_err());
        assert!(Tsne::new(2).with_n_iter(0).fit(&data).is_err());
    }

    #[test]
    fn empty_input_error() {
        let data: Vec<Vec<f32>> = vec![];
        assert!(matches!(Tsne::new(2).fit(&data), Err(Error::EmptyInput)));
    }
}
