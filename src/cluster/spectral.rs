//! Spectral clustering via graph Laplacian eigenvectors.
//!
//! The Ng-Jordan-Weiss pipeline:
//!
//! ```text
//! 1. Affinity matrix A from a Gaussian kernel: exp(-||xi-xj||² / 2σ²)
//! 2. Symmetric normalized Laplacian L = I - D^{-1/2} A D^{-1/2}
//! 3. k eigenvectors of L with the smallest eigenvalues
//! 4. Row-normalize the n×k embedding
//! 5. K-means on the embedding rows
//! ```
//!
//! Clustering the Laplacian embedding (instead of the raw coordinates)
//! lets k-means separate non-convex shapes that it would slice through in
//! the original space. Note the eigendecomposition is the real thing
//! here; shortcutting step 2-4 and running k-means on the raw data
//! degenerates the method into plain k-means.
//!
//! # Trade-offs
//!
//! | Aspect | Spectral | K-means |
//! |--------|----------|---------|
//! | Shape | Any | Convex |
//! | Complexity | O(n³) eigendecomp | O(nkd × iter) |
//! | Memory | O(n²) affinity | O(nd) |
//!
//! # References
//!
//! - Ng, Jordan, Weiss (2001). "On Spectral Clustering"
//! - von Luxburg (2007). "A Tutorial on Spectral Clustering"

use super::kmeans::Kmeans;
use super::traits::Clustering;
use crate::error::{Error, Result};
use crate::math;

/// Number of deterministic k-means restarts over the embedding; the run
/// with the lowest inertia wins. K-means++ can still pick an unlucky
/// first centroid on tiny embeddings.
const KMEANS_RESTARTS: u64 = 4;

/// Spectral clustering algorithm.
#[derive(Debug, Clone)]
pub struct Spectral {
    /// Number of clusters.
    k: usize,
    /// Gaussian kernel width.
    sigma: f32,
    /// Optional RNG seed forwarded to the embedding k-means.
    seed: Option<u64>,
}

/// Everything a spectral fit produces.
#[derive(Debug, Clone)]
pub struct SpectralFit {
    /// One label per point, in `0..k`.
    pub labels: Vec<usize>,
    /// The row-normalized Laplacian embedding that was clustered, `n`
    /// rows of `k` entries.
    pub embedding: Vec<Vec<f32>>,
}

impl Spectral {
    /// Create a new spectral clusterer with `k` clusters.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            sigma: 1.0,
            seed: None,
        }
    }

    /// Set the Gaussian kernel width (default 1.0).
    pub fn with_sigma(mut self, sigma: f32) -> Self {
        self.sigma = sigma;
        self
    }

    /// Set the RNG seed for the embedding k-means.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Fit the model: build the Laplacian, embed, cluster.
    pub fn fit(&self, data: &[Vec<f32>]) -> Result<SpectralFit> {
        let n = data.len();
        math::validate_matrix(data)?;

        if self.k < 1 || self.k > n {
            return Err(Error::InvalidClusterCount {
                requested: self.k,
                n_items: n,
            });
        }
        if self.sigma <= 0.0 {
            return Err(Error::InvalidParameter {
                name: "sigma",
                message: "must be positive",
            });
        }

        // Gaussian-kernel affinity with a zero diagonal.
        let two_sigma_sq = 2.0 * f64::from(self.sigma) * f64::from(self.sigma);
        let mut affinity = vec![0.0f64; n * n];
        for i in 0..n {
            for j in (i + 1)..n {
                let d_sq = f64::from(math::squared_euclidean(&data[i], &data[j]));
                let a = (-d_sq / two_sigma_sq).exp();
                affinity[i * n + j] = a;
                affinity[j * n + i] = a;
            }
        }

        // Symmetric normalized Laplacian. An isolated point (zero degree)
        // keeps a plain identity row.
        let degrees: Vec<f64> = (0..n)
            .map(|i| (0..n).map(|j| affinity[i * n + j]).sum())
            .collect();
        let inv_sqrt_deg: Vec<f64> = degrees
            .iter()
            .map(|&deg| if deg > 0.0 { 1.0 / deg.sqrt() } else { 0.0 })
            .collect();

        let mut laplacian = vec![0.0f64; n * n];
        for i in 0..n {
            for j in 0..n {
                let norm = inv_sqrt_deg[i] * affinity[i * n + j] * inv_sqrt_deg[j];
                laplacian[i * n + j] = if i == j { 1.0 - norm } else { -norm };
            }
        }

        // k smallest eigenvectors, as rows of the embedding.
        let (_, eigenvectors) = math::symmetric_eigen(laplacian, n);
        let mut embedding: Vec<Vec<f32>> = (0..n)
            .map(|i| (0..self.k).map(|c| eigenvectors[c][i] as f32).collect())
            .collect();

        // Row normalization (step 4 of Ng-Jordan-Weiss).
        for row in &mut embedding {
            let norm: f32 = row.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm > 0.0 {
                for x in row.iter_mut() {
                    *x /= norm;
                }
            }
        }

        let labels = self.kmeans_on_embedding(&embedding)?;

        Ok(SpectralFit { labels, embedding })
    }

    /// Cluster embedding rows, keeping the restart with the best inertia.
    fn kmeans_on_embedding(&self, embedding: &[Vec<f32>]) -> Result<Vec<usize>> {
        let mut best: Option<(f32, Vec<usize>)> = None;

        for t in 0..KMEANS_RESTARTS {
            let mut kmeans = Kmeans::new(self.k);
            if let Some(seed) = self.seed {
                kmeans = kmeans.with_seed(seed.wrapping_add(t));
            }
            let fit = kmeans.fit(embedding)?;

            match &mut best {
                None => best = Some((fit.inertia, fit.labels)),
                Some((best_inertia, best_labels)) => {
                    if fit.inertia < *best_inertia {
                        *best_inertia = fit.inertia;
                        *best_labels = fit.labels;
                    }
                }
            }
        }

        Ok(best.expect("at least one restart ran").1)
    }
}

impl Clustering for Spectral {
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

    #[test]
    fn two_separated_blobs() {
        let data = vec![
            vec![0.0, 0.0],
            vec![0.1, 0.0],
            vec![0.0, 0.1],
            vec![5.0, 5.0],
            vec![5.1, 5.0],
            vec![5.0, 5.1],
        ];

        let fit = Spectral::new(2).with_sigma(1.0).with_seed(42).fit(&data).unwrap();
        assert_eq!(fit.labels[0], fit.labels[1]);
        assert_eq!(fit.labels[1], fit.labels[2]);
        assert_eq!(fit.labels[3], fit.labels[4]);
        assert_eq!(fit.labels[4], fit.labels[5]);
        assert_ne!(fit.labels[0], fit.labels[3]);
    }

    #[test]
    fn embedding_has_k_columns() {
        let data = vec![
            vec![0.0, 0.0],
            vec![0.1, 0.0],
            vec![5.0, 5.0],
            vec![5.1, 5.0],
        ];
        let fit = Spectral::new(2).with_seed(1).fit(&data).unwrap();
        assert_eq!(fit.embedding.len(), 4);
        assert!(fit.embedding.iter().all(|row| row.len() == 2));
    }

    #[test]
    fn labels_cover_every_point() {
        let data: Vec<Vec<f32>> = (0..12)
            .map(|i| vec![(i / 4) as f32 * 8.0, (i % 4) as f32 * 0.1])
            .collect();
        let labels = Spectral::new(3).with_seed(9).fit_predict(&data).unwrap();
        assert_eq!(labels.len(), 12);
        assert!(labels.iter().all(|&l| l < 3));
    }

    #[test]
    fn invalid_sigma_rejected() {
        let data = vec![vec![0.0], vec![1.0]];
        assert!(Spectral::new(1).with_sigma(0.0).fit(&data).is_err());
    }

    #[test]
    fn invalid_k_rejected() {
        let data = vec![vec![0.0], vec![1.0]];
        assert!(matches!(
            Spectral::new(3).fit(&data),
            Err(Error::InvalidClusterCount { .. })
        ));
    }

    #[test]
    fn empty_input_error() {
        let data: Vec<Vec<f32>> = vec![];
        assert!(matches!(
            Spectral::new(2).fit(&data),
            Err(Error::EmptyInput)
        ));
    }
}
