//! Principal component analysis.
//!
//! Exact linear dimensionality reduction: center the data (no scaling),
//! eigendecompose the sample covariance matrix, and project onto the
//! top-variance eigenvectors. Deterministic — no seed, no iteration
//! budget — and the only reducer in this crate whose output is exactly
//! reproducible by construction.
//!
//! The fit reports per-component explained variance alongside the
//! embedding, and [`PcaFit::inverse_transform`] maps embedded rows back
//! to the original space (exactly, when all components are kept).

use crate::error::{Error, Result};
use crate::math;

/// Principal component analysis reducer.
#[derive(Debug, Clone)]
pub struct Pca {
    /// Number of components to keep.
    n_components: usize,
}

/// Everything a PCA fit produces.
#[derive(Debug, Clone)]
pub struct PcaFit {
    /// Projected coordinates: one row per input row, `n_components` columns.
    pub embedding: Vec<Vec<f32>>,
    /// Principal axes: `n_components` rows of length `d`, unit norm,
    /// ordered by descending explained variance.
    pub components: Vec<Vec<f32>>,
    /// Column means subtracted before projection.
    pub mean: Vec<f32>,
    /// Variance captured by each kept component.
    pub explained_variance: Vec<f32>,
    /// Fraction of total variance captured by each kept component.
    pub explained_variance_ratio: Vec<f32>,
    /// Running total of the ratio, ending at 1.0 when every component
    /// is kept.
    pub cumulative_variance_ratio: Vec<f32>,
}

impl Pca {
    /// Create a PCA reducer keeping `n_components` components.
    pub fn new(n_components: usize) -> Self {
        Self { n_components }
    }

    /// Fit the reducer and project the data.
    pub fn fit(&self, data: &[Vec<f32>]) -> Result<PcaFit> {
        let n = data.len();
        let d = math::validate_matrix(data)?;

        if self.n_components < 1 || self.n_components > d {
            return Err(Error::InvalidParameter {
                name: "n_components",
                message: "must be between 1 and the feature count",
            });
        }

        let mean = math::mean(data)?;
        let centered: Vec<Vec<f32>> = data
            .iter()
            .map(|row| row.iter().zip(mean.iter()).map(|(x, m)| x - m).collect())
            .collect();

        // Sample covariance (d x d). A single row has no variance; the
        // zero matrix falls out naturally below.
        let denom = if n > 1 { (n - 1) as f64 } else { 1.0 };
        let mut cov = vec![0.0f64; d * d];
        for row in &centered {
            for a in 0..d {
                for b in a..d {
                    cov[a * d + b] += f64::from(row[a]) * f64::from(row[b]);
                }
            }
        }
        for a in 0..d {
            for b in a..d {
                let v = cov[a * d + b] / denom;
                cov[a * d + b] = v;
                cov[b * d + a] = v;
            }
        }

        let (eigenvalues, eigenvectors) = math::symmetric_eigen(cov, d);

        // Jacobi returns ascending order; PCA wants descending variance.
        let total_variance: f64 = eigenvalues.iter().map(|&v| v.max(0.0)).sum();
        let mut components = Vec::with_capacity(self.n_components);
        let mut explained_variance = Vec::with_capacity(self.n_components);
        for c in 0..self.n_components {
            let idx = d - 1 - c;
            explained_variance.push(eigenvalues[idx].max(0.0) as f32);
            components.push(
                eigenvectors[idx]
                    .iter()
                    .map(|&x| x as f32)
                    .collect::<Vec<f32>>(),
            );
        }

        let explained_variance_ratio: Vec<f32> = explained_variance
            .iter()
            .map(|&v| {
                if total_variance > 0.0 {
                    (f64::from(v) / total_variance) as f32
                } else {
                    0.0
                }
            })
            .collect();
        let mut cumulative_variance_ratio = Vec::with_capacity(self.n_components);
        let mut running = 0.0f32;
        for &ratio in &explained_variance_ratio {
            running += ratio;
            cumulative_variance_ratio.push(running);
        }

        let embedding: Vec<Vec<f32>> = centered
            .iter()
            .map(|row| {
                components
                    .iter()
                    .map(|axis| row.iter().zip(axis.iter()).map(|(x, a)| x * a).sum())
                    .collect()
            })
            .collect();

        Ok(PcaFit {
            embedding,
            components,
            mean,
            explained_variance,
            explained_variance_ratio,
            cumulative_variance_ratio,
        })
    }
}

impl PcaFit {
    /// Map embedded rows back into the original feature space.
    ///
    /// With every component kept this reconstructs the input exactly (up
    /// to floating-point error); with fewer components it returns the
    /// closest rank-restricted approximation.
    pub fn inverse_transform(&self, embedding: &[Vec<f32>]) -> Vec<Vec<f32>> {
        let d = self.mean.len();
        embedding
            .iter()
            .map(|row| {
                let mut out = self.mean.clone();
                for (coord, axis) in row.iter().zip(self.components.iter()) {
                    for j in 0..d {
                        out[j] += coord * axis[j];
                    }
                }
                out
            })
            .collect()
    }
}
