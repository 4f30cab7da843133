//! Cluster-quality metrics.
//!
//! Pure functions of `(data, labels)`. The labels can come from any
//! clusterer in this crate or from the outside: values are grouped by
//! equality, so arbitrary label sets work and the density algorithms'
//! [`NOISE`](crate::cluster::NOISE) sentinel is treated as just another
//! group.
//!
//! A metric that is mathematically undefined for the given input (for
//! example Silhouette with one cluster) returns the
//! [`Evaluation::NotApplicable`] value — a normal result carrying an
//! explanation, not an error.
//!
//! | Metric | Range | Better |
//! |--------|-------|--------|
//! | [`silhouette`] | [-1, 1] | higher |
//! | [`davies_bouldin`] | [0, ∞) | lower |
//! | [`calinski_harabasz`] | [0, ∞) | higher |
//!
//! [`elbow_wcss`] is the odd one out: it sweeps k and reruns k-means
//! internally so a caller can plot within-cluster sum of squares against
//! k and look for the bend.

use crate::cluster::{total_inertia, Kmeans};
use crate::error::{Error, Result};
use crate::math;

/// Qualitative interpretation bucket attached to a metric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    /// Clearly separated, compact clusters.
    Excellent,
    /// Solid structure with some overlap.
    Good,
    /// Weak structure.
    Fair,
    /// Little to no cluster structure.
    Poor,
}

/// Outcome of one metric computation.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    /// The metric value with its interpretation bucket.
    Score {
        /// Metric value.
        value: f32,
        /// Interpretation bucket.
        quality: Quality,
    },
    /// The metric is undefined for this input.
    NotApplicable {
        /// Why the metric does not apply.
        reason: &'static str,
    },
}

impl Evaluation {
    /// The numeric value, if the metric applied.
    pub fn value(&self) -> Option<f32> {
        match self {
            Evaluation::Score { value, .. } => Some(*value),
            Evaluation::NotApplicable { .. } => None,
        }
    }
}

// Interpretation thresholds. Silhouette and Calinski-Harabasz read
// downward (higher is better), Davies-Bouldin upward (lower is better).
const SILHOUETTE_EXCELLENT: f32 = 0.7;
const SILHOUETTE_GOOD: f32 = 0.5;
const SILHOUETTE_FAIR: f32 = 0.25;
const DAVIES_BOULDIN_EXCELLENT: f32 = 1.0;
const DAVIES_BOULDIN_GOOD: f32 = 1.5;
const DAVIES_BOULDIN_FAIR: f32 = 2.0;
const CALINSKI_EXCELLENT: f32 = 100.0;
const CALINSKI_GOOD: f32 = 50.0;
const CALINSKI_FAIR: f32 = 10.0;

/// Mean silhouette coefficient over all points.
///
/// Per point: `a` is the mean distance to the rest of its own cluster
/// (0 for a singleton), `b` the smallest mean distance to any other
/// cluster, and the score `(b - a) / max(a, b)` (0 when both are 0).
///
/// Returns `NotApplicable` when fewer than two distinct labels are
/// present.
pub fn silhouette(data: &[Vec<f32>], labels: &[usize]) -> Result<Evaluation> {
    let groups = validate_and_group(data, labels)?;
    if groups.len() < 2 {
        return Ok(Evaluation::NotApplicable {
            reason: "silhouette requires at least 2 clusters",
        });
    }

    let n = data.len();
    let mut total = 0.0f32;

    for (i, point) in data.iter().enumerate() {
        let own = groups
            .iter()
            .position(|(label, _)| *label == labels[i])
            .expect("every point's label has a group");

        let a = {
            let members = &groups[own].1;
            if members.len() <= 1 {
                0.0
            } else {
                let sum: f32 = members
                    .iter()
                    .filter(|&&j| j != i)
                    .map(|&j| math::squared_euclidean(point, &data[j]).sqrt())
                    .sum();
                sum / (members.len() - 1) as f32
            }
        };

        let b = groups
            .iter()
            .enumerate()
            .filter(|(g, _)| *g != own)
            .map(|(_, (_, members))| {
                let sum: f32 = members
                    .iter()
                    .map(|&j| math::squared_euclidean(point, &data[j]).sqrt())
                    .sum();
                sum / members.len() as f32
            })
            .fold(f32::INFINITY, f32::min);

        let denom = a.max(b);
        total += if denom == 0.0 { 0.0 } else { (b - a) / denom };
    }

    let value = total / n as f32;
    let quality = if value >= SILHOUETTE_EXCELLENT {
        Quality::Excellent
    } else if value >= SILHOUETTE_GOOD {
        Quality::Good
    } else if value >= SILHOUETTE_FAIR {
        Quality::Fair
    } else {
        Quality::Poor
    };

    Ok(Evaluation::Score { value, quality })
}

/// Davies-Bouldin index: mean over clusters of the worst
/// `(scatter_i + scatter_j) / centroid_distance(i, j)` pairing.
///
/// Lower is better. Returns `NotApplicable` below two clusters.
pub fn davies_bouldin(data: &[Vec<f32>], labels: &[usize]) -> Result<Evaluation> {
    let groups = validate_and_group(data, labels)?;
    let k = groups.len();
    if k < 2 {
        return Ok(Evaluation::NotApplicable {
            reason: "davies-bouldin requires at least 2 clusters",
        });
    }

    let centroids: Vec<Vec<f32>> = groups
        .iter()
        .map(|(_, members)| {
            let rows: Vec<Vec<f32>> = members.iter().map(|&j| data[j].clone()).collect();
            math::mean(&rows).expect("groups are non-empty")
        })
        .collect();

    let scatters: Vec<f32> = groups
        .iter()
        .zip(centroids.iter())
        .map(|((_, members), centroid)| {
            let sum: f32 = members
                .iter()
                .map(|&j| math::squared_euclidean(&data[j], centroid).sqrt())
                .sum();
            sum / members.len() as f32
        })
        .collect();

    let mut total = 0.0f32;
    for i in 0..k {
        let mut worst = 0.0f32;
        for j in 0..k {
            if i == j {
                continue;
            }
            let dist = math::squared_euclidean(&centroids[i], &centroids[j]).sqrt();
            // Coincident centroids force the ratio to infinity, which
            // surfaces as a Poor score rather than a crash.
            let ratio = if dist > 0.0 {
                (scatters[i] + scatters[j]) / dist
            } else {
                f32::INFINITY
            };
            worst = worst.max(ratio);
        }
        total += worst;
    }

    let value = total / k as f32;
    let quality = if value < DAVIES_BOULDIN_EXCELLENT {
        Quality::Excellent
    } else if value < DAVIES_BOULDIN_GOOD {
        Quality::Good
    } else if value < DAVIES_BOULDIN_FAIR {
        Quality::Fair
    } else {
        Quality::Poor
    };

    Ok(Evaluation::Score { value, quality })
}

/// Calinski-Harabasz index: between-cluster vs. within-cluster variance,
/// scaled by the degrees of freedom `(n - k) / (k - 1)`.
///
/// Higher is better. Returns `NotApplicable` below two clusters, and when
/// the within-cluster variance is zero (every point sits exactly on its
/// centroid, e.g. `k == n`).
pub fn calinski_harabasz(data: &[Vec<f32>], labels: &[usize]) -> Result<Evaluation> {
    let groups = validate_and_group(data, labels)?;
    let n = data.len();
    let k = groups.len();
    if k < 2 {
        return Ok(Evaluation::NotApplicable {
            reason: "calinski-harabasz requires at least 2 clusters",
        });
    }
    if k == n {
        return Ok(Evaluation::NotApplicable {
            reason: "calinski-harabasz is undefined with one point per cluster",
        });
    }

    let overall = math::mean(data)?;

    let mut between = 0.0f32;
    let mut within = 0.0f32;
    for (_, members) in &groups {
        let rows: Vec<Vec<f32>> = members.iter().map(|&j| data[j].clone()).collect();
        let centroid = math::mean(&rows).expect("groups are non-empty");
        between += members.len() as f32 * math::squared_euclidean(&centroid, &overall);
        within += members
            .iter()
            .map(|&j| math::squared_euclidean(&data[j], &centroid))
            .sum::<f32>();
    }

    if within <= 0.0 {
        return Ok(Evaluation::NotApplicable {
            reason: "calinski-harabasz is undefined with zero within-cluster variance",
        });
    }

    let value = (between / within) * ((n - k) as f32 / (k - 1) as f32);
    let quality = if value >= CALINSKI_EXCELLENT {
        Quality::Excellent
    } else if value >= CALINSKI_GOOD {
        Quality::Good
    } else if value >= CALINSKI_FAIR {
        Quality::Fair
    } else {
        Quality::Poor
    };

    Ok(Evaluation::Score { value, quality })
}

/// Within-cluster sum of squares for `k = 1..=max_k`, for elbow plots.
///
/// Runs the k-means component once per k (seeded when `seed` is given, so
/// sweeps are reproducible). `max_k` is capped at the row count.
pub fn elbow_wcss(data: &[Vec<f32>], max_k: usize, seed: Option<u64>) -> Result<Vec<(usize, f32)>> {
    math::validate_matrix(data)?;
    if max_k < 1 {
        return Err(Error::InvalidParameter {
            name: "max_k",
            message: "must be at least 1",
        });
    }

    let top = max_k.min(data.len());
    let mut sweep = Vec::with_capacity(top);
    for k in 1..=top {
        let mut kmeans = Kmeans::new(k);
        if let Some(s) = seed {
            kmeans = kmeans.with_seed(s);
        }
        let fit = kmeans.fit(data)?;
        sweep.push((k, fit.inertia));
    }
    Ok(sweep)
}

/// Validate shapes and group point indices by label value, in order of
/// first appearance.
fn validate_and_group(data: &[Vec<f32>], labels: &[usize]) -> Result<Vec<(usize, Vec<usize>)>> {
    math::validate_matrix(data)?;
    if labels.len() != data.len() {
        return Err(Error::DimensionMismatch {
            expected: data.len(),
            found: labels.len(),
        });
    }

    let mut groups: Vec<(usize, Vec<usize>)> = Vec::new();
    for (i, &label) in labels.iter().enumerate() {
        match groups.iter_mut().find(|(l, _)| *l == label) {
            Some((_, members)) => members.push(i),
            None => groups.push((label, vec![i])),
        }
    }
    Ok(groups)
}

/// Within-cluster sum of squares for an externally supplied labeling,
/// measured against the labeling's own centroids.
pub fn wcss_for_labels(data: &[Vec<f32>], labels: &[usize]) -> Result<f32> {
    let groups = validate_and_group(data, labels)?;
    let mut centroids = Vec::with_capacity(groups.len());
    let mut relabeled = vec![0usize; data.len()];
    for (g, (_, members)) in groups.iter().enumerate() {
        let rows: Vec<Vec<f32>> = members.iter().map(|&j| data[j].clone()).collect();
        centroids.push(math::mean(&rows).expect("groups are non-empty"));
        for &j in members {
            relabeled[j] = g;
        }
    }
    Ok(total_inertia(data, &centroids, &relabeled))
}
