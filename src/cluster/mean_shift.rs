//! Mean shift: mode-seeking clustering by kernel-density ascent.
//!
//! Every data point seeds a shift center; each center repeatedly moves to
//! the mean of all data points within `bandwidth` of its current position
//! (a flat kernel). Centers climb toward local density maxima, and the
//! centers that settle close together are merged into one *mode*. The
//! number of clusters therefore falls out of the data and the bandwidth;
//! it is never supplied by the caller.
//!
//! ## Behavior details
//!
//! - A center with no neighbors within the bandwidth stays where it is
//!   (an isolated point becomes its own mode).
//! - A center converges once its movement drops below `1e-6`; the run
//!   stops when every center has converged or `max_iter` is reached.
//! - After convergence, centers within `bandwidth / 2` of each other are
//!   merged greedily in input order, averaging each merged group. Every
//!   original point is then assigned to its nearest mode.
//!
//! Each iteration scans all point/center pairs, so a full run is O(n²)
//! per iteration.

use super::traits::Clustering;
use crate::error::{Error, Result};
use crate::math;

/// Movement threshold below which a shift center counts as converged.
const SHIFT_TOL: f32 = 1e-6;

/// Mean shift clustering algorithm.
#[derive(Debug, Clone)]
pub struct MeanShift {
    /// Flat-kernel radius.
    bandwidth: f32,
    /// Maximum shift iterations.
    max_iter: usize,
}

/// Everything a mean shift fit produces.
#[derive(Debug, Clone)]
pub struct MeanShiftFit {
    /// One label per point; labels index into `modes`.
    pub labels: Vec<usize>,
    /// Final cluster modes (merged shift centers).
    pub modes: Vec<Vec<f32>>,
    /// Number of shift iterations run.
    pub n_iter: usize,
}

impl MeanShift {
    /// Create a new mean shift clusterer with the given bandwidth.
    pub fn new(bandwidth: f32) -> Self {
        Self {
            bandwidth,
            max_iter: 300,
        }
    }

    /// Set the maximum number of shift iterations.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Fit the model: shift, merge, assign.
    pub fn fit(&self, data: &[Vec<f32>]) -> Result<MeanShiftFit> {
        let n = data.len();
        let d = math::validate_matrix(data)?;

        if self.bandwidth <= 0.0 {
            return Err(Error::InvalidParameter {
                name: "bandwidth",
                message: "must be positive",
            });
        }

        let bw_sq = self.bandwidth * self.bandwidth;
        let mut centers: Vec<Vec<f32>> = data.to_vec();
        let mut converged = vec![false; n];
        let mut n_iter = 0usize;

        for _ in 0..self.max_iter {
            if converged.iter().all(|&c| c) {
                break;
            }
            n_iter += 1;

            for (c, done) in centers.iter_mut().zip(converged.iter_mut()) {
                if *done {
                    continue;
                }

                let mut sum = vec![0.0f32; d];
                let mut count = 0usize;
                for point in data {
                    if math::squared_euclidean(c, point) <= bw_sq {
                        for (acc, &x) in sum.iter_mut().zip(point.iter()) {
                            *acc += x;
                        }
                        count += 1;
                    }
                }

                if count == 0 {
                    // No support inside the kernel: the center is its own
                    // (degenerate) mode.
                    *done = true;
                    continue;
                }

                for acc in &mut sum {
                    *acc /= count as f32;
                }
                let movement = math::squared_euclidean(c, &sum).sqrt();
                *c = sum;
                if movement < SHIFT_TOL {
                    *done = true;
                }
            }
        }

        let modes = merge_centers(&centers, self.bandwidth / 2.0);

        // Nearest mode wins; ties go to the lowest mode index.
        let labels: Vec<usize> = data
            .iter()
            .map(|point| {
                let mut best = 0usize;
                let mut best_dist = f32::INFINITY;
                for (m, mode) in modes.iter().enumerate() {
                    let dist = math::squared_euclidean(point, mode);
                    if dist < best_dist {
                        best_dist = dist;
                        best = m;
                    }
                }
                best
            })
            .collect();

        tracing::debug!(n_iter, n_modes = modes.len(), "mean shift finished");

        Ok(MeanShiftFit {
            labels,
            modes,
            n_iter,
        })
    }
}

/// Greedily merge converged centers that sit within `radius` of an
/// accepted mode, averaging each merged group. Input order decides which
/// center anchors a group, so the result is deterministic.
fn merge_centers(centers: &[Vec<f32>], radius: f32) -> Vec<Vec<f32>> {
    let radius_sq = radius * radius;
    let mut modes: Vec<Vec<f32>> = Vec::new();
    let mut counts: Vec<usize> = Vec::new();

    for center in centers {
        let mut merged = false;
        for (mode, count) in modes.iter_mut().zip(counts.iter_mut()) {
            if math::squared_euclidean(center, mode) <= radius_sq {
                // Running mean of the group.
                let new_count = *count + 1;
                for (m, &c) in mode.iter_mut().zip(center.iter()) {
                    *m = (*m * *count as f32 + c) / new_count as f32;
                }
                *count = new_count;
                merged = true;
                break;
            }
        }
        if !merged {
            modes.push(center.clone());
            counts.push(1);
        }
    }

    modes
}

impl Clustering for MeanShift {
    fn fit_predict(&self, data: &[Vec<f32>]) -> Result<Vec<usize>> {
        Ok(self.fit(data)?.labels)
    }

    /// Mean shift discovers the number of clusters, so this returns 0.
    fn n_clusters(&self) -> usize {
        0
    }
}
