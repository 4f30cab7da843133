//! Gaussian mixture model fit by expectation-maximization.
//!
//! Models the data as a mixture of `k` Gaussians with diagonal
//! covariances:
//!
//! ```text
//! P(x) = Σ_k π_k × N(x | μ_k, diag(σ²_k))
//! ```
//!
//! **EM iterations**:
//! 1. **E-step**: compute each point's *responsibility* — the posterior
//!    probability that component k generated it.
//! 2. **M-step**: refit weights, means, and per-dimension variances from
//!    the responsibility-weighted data.
//! 3. Stop when the total log-likelihood changes by less than `tol`.
//!
//! The hard labels returned by [`Clustering::fit_predict`] are the
//! arg-max responsibility per point — a deliberately lossy view of the
//! soft model. The full posterior is available through
//! [`SoftClustering::fit_predict_proba`] or [`GmmFit::responsibilities`].
//!
//! ## Degeneracy handling
//!
//! Mirrors k-means: a component whose total responsibility collapses to
//! zero keeps its previous parameters, a point whose density vanishes
//! under every component gets uniform responsibility, and zero variances
//! are floored inside the density kernel. None of these raise errors.

use super::traits::{Clustering, SoftClustering};
use crate::error::{Error, Result};
use crate::math;
use rand::prelude::*;

/// Gaussian mixture model clusterer.
#[derive(Debug, Clone)]
pub struct Gmm {
    /// Number of mixture components.
    k: usize,
    /// Maximum EM iterations.
    max_iter: usize,
    /// Convergence tolerance on the log-likelihood change.
    tol: f64,
    /// Optional RNG seed for reproducible initialization.
    seed: Option<u64>,
}

/// Everything a GMM fit produces.
#[derive(Debug, Clone)]
pub struct GmmFit {
    /// Hard labels: arg-max responsibility per point.
    pub labels: Vec<usize>,
    /// Mixture weights, summing to 1.
    pub weights: Vec<f64>,
    /// Component means, `k` rows.
    pub means: Vec<Vec<f32>>,
    /// Per-dimension variances, `k` rows.
    pub variances: Vec<Vec<f32>>,
    /// Posterior responsibilities, `n` rows of `k` entries each summing to 1.
    pub responsibilities: Vec<Vec<f64>>,
    /// Final total log-likelihood.
    pub log_likelihood: f64,
    /// Number of EM iterations run.
    pub n_iter: usize,
    /// Whether the log-likelihood criterion stopped the run.
    pub converged: bool,
}

impl Gmm {
    /// Create a new GMM clusterer with `k` components.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iter: 100,
            tol: 1e-6,
            seed: None,
        }
    }

    /// Set the maximum number of EM iterations.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the convergence tolerance on the log-likelihood change.
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set the RNG seed for reproducible initialization.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Fit the mixture and return parameters, responsibilities, and labels.
    pub fn fit(&self, data: &[Vec<f32>]) -> Result<GmmFit> {
        let n = data.len();
        let d = math::validate_matrix(data)?;

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

        // Means: sampled from the data with the k-means++ spread, so two
        // components rarely start inside one dense region. Weights
        // uniform, variances unit.
        let mut means = super::kmeans::plus_plus_seeds(data, self.k, &mut rng);
        let mut variances = vec![vec![1.0f32; d]; self.k];
        let mut weights = vec![1.0f64 / self.k as f64; self.k];

        let mut responsibilities = vec![vec![0.0f64; self.k]; n];
        let mut prev_ll = f64::NEG_INFINITY;
        let mut log_likelihood = 0.0f64;
        let mut n_iter = 0usize;
        let mut converged = false;

        for iter in 0..self.max_iter {
            n_iter = iter + 1;

            // E-step.
            log_likelihood = 0.0;
            for (point, resp) in data.iter().zip(responsibilities.iter_mut()) {
                let mut total = 0.0f64;
                for c in 0..self.k {
                    let density =
                        weights[c] * math::gaussian_density(point, &means[c], &variances[c]);
                    resp[c] = density;
                    total += density;
                }
                if total > 0.0 {
                    for r in resp.iter_mut() {
                        *r /= total;
                    }
                } else {
                    // Every component's density underflowed for this point;
                    // spread the responsibility uniformly.
                    resp.fill(1.0 / self.k as f64);
                }
                log_likelihood += total.max(f64::MIN_POSITIVE).ln();
            }

            // M-step.
            for c in 0..self.k {
                let total_resp: f64 = responsibilities.iter().map(|r| r[c]).sum();
                weights[c] = total_resp / n as f64;
                if total_resp <= f64::EPSILON {
                    // Starved component: retain previous mean and variance.
                    continue;
                }

                let mut mean = vec![0.0f64; d];
                for (point, resp) in data.iter().zip(responsibilities.iter()) {
                    for (m, &x) in mean.iter_mut().zip(point.iter()) {
                        *m += resp[c] * f64::from(x);
                    }
                }
                for m in &mut mean {
                    *m /= total_resp;
                }

                let mut var = vec![0.0f64; d];
                for (point, resp) in data.iter().zip(responsibilities.iter()) {
                    for j in 0..d {
                        let diff = f64::from(point[j]) - mean[j];
                        var[j] += resp[c] * diff * diff;
                    }
                }
                for v in &mut var {
                    *v /= total_resp;
                }

                means[c] = mean.into_iter().map(|m| m as f32).collect();
                variances[c] = var.into_iter().map(|v| v as f32).collect();
            }

            if (log_likelihood - prev_ll).abs() < self.tol {
                converged = true;
                break;
            }
            prev_ll = log_likelihood;
        }

        tracing::debug!(n_iter, log_likelihood, converged, "gmm finished");

        // Hard assignment, ties to the lowest component index.
        let labels: Vec<usize> = responsibilities
            .iter()
            .map(|resp| {
                let mut best = 0usize;
                let mut best_resp = f64::NEG_INFINITY;
                for (c, &r) in resp.iter().enumerate() {
                    if r > best_resp {
                        best_resp = r;
                        best = c;
                    }
                }
                best
            })
            .collect();

        Ok(GmmFit {
            labels,
            weights,
            means,
            variances,
            responsibilities,
            log_likelihood,
            n_iter,
            converged,
        })
    }
}

impl Clustering for Gmm {
    fn fit_predict(&self, data: &[Vec<f32>]) -> Result<Vec<usize>> {
        Ok(self.fit(data)?.labels)
    }

    fn n_clusters(&self) -> usize {
        self.k
    }
}

impl SoftClustering for Gmm {
    fn fit_predict_proba(&self, data: &[Vec<f32>]) -> Result<Vec<Vec<f64>>> {
        Ok(self.fit(data)?.responsibilities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_blobs() -> Vec<Vec<f32>> {
        vec![
            vec![0.0, 0.0],
            vec![0.3, 0.1],
            vec![0.1, 0.3],
            vec![10.0, 10.0],
            vec![10.3, 10.1],
            vec![10.1, 10.3],
        ]
    }

    #[test]
    fn two_blobs_separate() {
        let fit = Gmm::new(2).with_seed(42).fit(&two_blobs()).unwrap();
        assert_eq!(fit.labels[0], fit.labels[1]);
        assert_eq!(fit.labels[3], fit.labels[4]);
        assert_ne!(fit.labels[0], fit.labels[3]);
    }

    #[test]
    fn responsibilities_sum_to_one() {
        let fit = Gmm::new(2).with_seed(1).fit(&two_blobs()).unwrap();
        for resp in &fit.responsibilities {
            let total: f64 = resp.iter().sum();
            assert!((total - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn weights_sum_to_one() {
        let fit = Gmm::new(3).with_seed(5).fit(&two_blobs()).unwrap();
        let total: f64 = fit.weights.iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn single_component_covers_everything() {
        let fit = Gmm::new(1).with_seed(0).fit(&two_blobs()).unwrap();
        assert!(fit.labels.iter().all(|&l| l == 0));
        assert!((fit.weights[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn deterministic_with_seed() {
        let data = two_blobs();
        let a = Gmm::new(2).with_seed(7).fit(&data).unwrap();
        let b = Gmm::new(2).with_seed(7).fit(&data).unwrap();
        assert_eq!(a.labels, b.labels);
        assert!((a.log_likelihood - b.log_likelihood).abs() < 1e-12);
    }

    #[test]
    fn soft_clustering_matches_fit() {
        let data = two_blobs();
        let probs = Gmm::new(2).with_seed(3).fit_predict_proba(&data).unwrap();
        assert_eq!(probs.len(), 6);
        assert_eq!(probs[0].len(), 2);
    }

    #[test]
    fn converges_on_easy_data() {
        let fit = Gmm::new(2).with_seed(42).fit(&two_blobs()).unwrap();
        assert!(fit.converged);
        assert!(fit.n_iter < 100);
    }

    #[test]
    fn identical_points_do_not_crash() {
        // Variance collapses to zero; the density floor keeps the fit
        // finite.
        let data = vec![vec![1.0, 1.0]; 5];
        let fit = Gmm::new(2).with_seed(2).fit(&data).unwrap();
        assert!(fit.log_likelihood.is_finite());
        assert_eq!(fit.labels.len(), 5);
    }

    #[test]
    fn invalid_k_rejected() {
        let data = two_blobs();
        assert!(matches!(
            Gmm::new(0).fit(&data),
            Err(Error::InvalidClusterCount { .. })
        ));
        assert!(matches!(
            Gmm::new(7).fit(&data),
            Err(Error::InvalidClusterCount { .. })
        ));
    }

    #[test]
    fn empty_input_error() {
        let data: Vec<Vec<f32>> = vec![];
        assert!(matches!(Gmm::new(1).fit(&data), Err(Error::EmptyInput)));
    }
}
