//! Hierarchical (agglomerative) clustering.
//!
//! Bottom-up clustering: start with `n` singleton clusters and repeatedly
//! merge the closest pair until `k` clusters remain. The merge history
//! forms a dendrogram you can inspect after the fit.
//!
//! # Linkage Methods
//!
//! The key choice: how do we define "distance between clusters"?
//!
//! | Linkage | Formula | Effect |
//! |---------|---------|--------|
//! | Single | min(d(a,b)) for a∈A, b∈B | Chaining; elongated clusters |
//! | Complete | max(d(a,b)) | Compact, spherical clusters |
//! | Average | size-weighted mean(d(a,b)) | Balanced compromise |
//! | Ward | Δ variance | Minimizes within-cluster variance |
//!
//! Ward merges the pair whose union increases total within-cluster
//! variance the least:
//!
//! ```text
//! Δ(A,B) = (nₐ × nᵦ)/(nₐ + nᵦ) × ||μₐ - μᵦ||²
//! ```
//!
//! # Complexity
//!
//! Each merge linearly scans all active cluster pairs, so a full run is
//! O(n³). That bounds this method to small and medium datasets; it is the
//! documented tradeoff of the exact pairwise formulation, not an accident.
//! Ties are broken by the first pair found in row-major scan order, so
//! runs are reproducible.

use super::traits::Clustering;
use crate::error::{Error, Result};
use crate::math;

/// Linkage method for hierarchical clustering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Linkage {
    /// Single linkage: minimum distance between clusters.
    #[default]
    Single,
    /// Complete linkage: maximum distance between clusters.
    Complete,
    /// Average linkage: size-weighted mean distance (UPGMA).
    Average,
    /// Ward's method: minimize the within-cluster variance increase.
    Ward,
}

/// One merge event in the dendrogram.
///
/// Cluster ids follow the SciPy convention: leaves are `0..n-1` and the
/// `t`-th merge creates cluster `n + t`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Merge {
    /// First merged cluster id.
    pub a: usize,
    /// Second merged cluster id.
    pub b: usize,
    /// Linkage distance at which the merge happened.
    pub distance: f32,
    /// Number of points in the merged cluster.
    pub size: usize,
}

/// Hierarchical (agglomerative) clustering.
#[derive(Debug, Clone)]
pub struct Hierarchical {
    /// Number of clusters to stop at.
    k: usize,
    /// Linkage method.
    linkage: Linkage,
}

/// Everything a hierarchical fit produces.
#[derive(Debug, Clone)]
pub struct HierarchicalFit {
    /// One label per point, in `0..k`, numbered by first appearance in
    /// input order.
    pub labels: Vec<usize>,
    /// The merge history, `n - k` entries, in merge order.
    pub merges: Vec<Merge>,
}

/// Internal bookkeeping for one active cluster.
struct Active {
    /// Dendrogram id (SciPy convention).
    id: usize,
    /// Member point indices.
    members: Vec<usize>,
    /// Centroid, maintained for Ward linkage.
    centroid: Vec<f32>,
}

impl Hierarchical {
    /// Create a new agglomerative clusterer targeting `k` clusters.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            linkage: Linkage::Single,
        }
    }

    /// Set the linkage method (default: single).
    pub fn with_linkage(mut self, linkage: Linkage) -> Self {
        self.linkage = linkage;
        self
    }

    /// Fit the model: run merges down to `k` clusters.
    pub fn fit(&self, data: &[Vec<f32>]) -> Result<HierarchicalFit> {
        let n = data.len();
        math::validate_matrix(data)?;

        if self.k < 1 || self.k > n {
            return Err(Error::InvalidClusterCount {
                requested: self.k,
                n_items: n,
            });
        }

        let mut clusters: Vec<Active> = (0..n)
            .map(|i| Active {
                id: i,
                members: vec![i],
                centroid: data[i].clone(),
            })
            .collect();

        // Pairwise linkage distances between active clusters, mirrored
        // into both triangles so scan indexing stays simple.
        let mut dist: Vec<Vec<f32>> = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in (i + 1)..n {
                let d = match self.linkage {
                    Linkage::Ward => math::squared_euclidean(&data[i], &data[j]) / 2.0,
                    _ => math::squared_euclidean(&data[i], &data[j]).sqrt(),
                };
                dist[i][j] = d;
                dist[j][i] = d;
            }
        }

        let mut merges = Vec::with_capacity(n - self.k);
        let mut next_id = n;

        while clusters.len() > self.k {
            // Minimum-distance pair, first one in row-major order on ties.
            let mut best = (0usize, 1usize);
            let mut best_dist = f32::INFINITY;
            for i in 0..clusters.len() {
                for j in (i + 1)..clusters.len() {
                    if dist[i][j] < best_dist {
                        best_dist = dist[i][j];
                        best = (i, j);
                    }
                }
            }

            let (i, j) = best;
            let merged_size = clusters[i].members.len() + clusters[j].members.len();
            merges.push(Merge {
                a: clusters[i].id,
                b: clusters[j].id,
                distance: best_dist,
                size: merged_size,
            });

            // Fold j into i, then drop j (preserving list order keeps the
            // row-major tie-break stable across merges).
            let ni = clusters[i].members.len() as f32;
            let nj = clusters[j].members.len() as f32;
            for pos in 0..clusters.len() {
                if pos == i || pos == j {
                    continue;
                }
                let nk = clusters[pos].members.len() as f32;
                let dik = dist[i][pos];
                let djk = dist[j][pos];
                let updated = match self.linkage {
                    Linkage::Single => dik.min(djk),
                    Linkage::Complete => dik.max(djk),
                    Linkage::Average => (ni * dik + nj * djk) / (ni + nj),
                    // Lance-Williams form of the Ward variance increase.
                    Linkage::Ward => {
                        ((ni + nk) * dik + (nj + nk) * djk - nk * dist[i][j]) / (ni + nj + nk)
                    }
                };
                dist[i][pos] = updated;
                dist[pos][i] = updated;
            }

            let removed = clusters.remove(j);
            let target = &mut clusters[i];
            for (c, &x) in target.centroid.iter_mut().zip(removed.centroid.iter()) {
                *c = (*c * ni + x * nj) / (ni + nj);
            }
            target.members.extend(removed.members);
            target.id = next_id;
            next_id += 1;

            for row in &mut dist {
                row.remove(j);
            }
            dist.remove(j);
        }

        // Flatten membership to labels, numbering clusters by first
        // appearance in input order.
        let mut cluster_of_point = vec![0usize; n];
        for (slot, cluster) in clusters.iter().enumerate() {
            for &p in &cluster.members {
                cluster_of_point[p] = slot;
            }
        }
        let mut slot_label = vec![usize::MAX; clusters.len()];
        let mut next_label = 0usize;
        let mut labels = vec![0usize; n];
        for p in 0..n {
            let slot = cluster_of_point[p];
            if slot_label[slot] == usize::MAX {
                slot_label[slot] = next_label;
                next_label += 1;
            }
            labels[p] = slot_label[slot];
        }

        Ok(HierarchicalFit { labels, merges })
    }
}

impl Clustering for Hierarchical {
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
            vec![0.1, 0.1],
            vec![10.0, 10.0],
            vec![10.1, 10.1],
        ]
    }

    #[test]
    fn two_pairs_split_cleanly() {
        let fit = Hierarchical::new(2).fit(&two_pairs()).unwrap();
        assert_eq!(fit.labels[0], fit.labels[1]);
        assert_eq!(fit.labels[2], fit.labels[3]);
        assert_ne!(fit.labels[0], fit.labels[2]);
    }

    #[test]
    fn merge_record_length_is_n_minus_k() {
        let data: Vec<Vec<f32>> = (0..8).map(|i| vec![i as f32, 0.0]).collect();
        for k in 1..=8 {
            let fit = Hierarchical::new(k).fit(&data).unwrap();
            assert_eq!(fit.merges.len(), 8 - k);
        }
    }

    #[test]
    fn labels_numbered_by_first_appearance() {
        let fit = Hierarchical::new(2).fit(&two_pairs()).unwrap();
        assert_eq!(fit.labels[0], 0);
        assert_eq!(fit.labels[2], 1);
    }

    #[test]
    fn merge_sizes_accumulate() {
        let data: Vec<Vec<f32>> = (0..5).map(|i| vec![i as f32 * i as f32, 0.0]).collect();
        let fit = Hierarchical::new(1).fit(&data).unwrap();
        // Final merge contains every point.
        assert_eq!(fit.merges.last().unwrap().size, 5);
    }

    #[test]
    fn all_linkages_agree_on_well_separated_pairs() {
        for linkage in [
            Linkage::Single,
            Linkage::Complete,
            Linkage::Average,
            Linkage::Ward,
        ] {
            let fit = Hierarchical::new(2)
                .with_linkage(linkage)
                .fit(&two_pairs())
                .unwrap();
            assert_eq!(fit.labels[0], fit.labels[1], "{linkage:?}");
            assert_ne!(fit.labels[0], fit.labels[2], "{linkage:?}");
        }
    }

    #[test]
    fn single_linkage_chains() {
        // A chain of equidistant points plus one distant outlier: single
        // linkage keeps the chain whole at k=2.
        let mut data: Vec<Vec<f32>> = (0..6).map(|i| vec![i as f32, 0.0]).collect();
        data.push(vec![100.0, 0.0]);

        let fit = Hierarchical::new(2).fit(&data).unwrap();
        let chain_label = fit.labels[0];
        assert!(fit.labels[..6].iter().all(|&l| l == chain_label));
        assert_ne!(fit.labels[6], chain_label);
    }

    #[test]
    fn k_equals_n_yields_singletons() {
        let data = two_pairs();
        let fit = Hierarchical::new(4).fit(&data).unwrap();
        assert_eq!(fit.labels, vec![0, 1, 2, 3]);
        assert!(fit.merges.is_empty());
    }

    #[test]
    fn invalid_k_rejected() {
        let data = two_pairs();
        assert!(matches!(
            Hierarchical::new(0).fit(&data),
            Err(Error::InvalidClusterCount { .. })
        ));
        assert!(matches!(
            Hierarchical::new(5).fit(&data),
            Err(Error::InvalidClusterCount { .. })
        ));
    }

    #[test]
    fn empty_input_error() {
        let data: Vec<Vec<f32>> = vec![];
        assert!(matches!(
            Hierarchical::new(1).fit(&data),
            Err(Error::EmptyInput)
        ));
    }

    #[test]
    fn single_point() {
        let data = vec![vec![1.0, 2.0]];
        let fit = Hierarchical::new(1).fit(&data).unwrap();
        assert_eq!(fit.labels, vec![0]);
        assert!(fit.merges.is_empty());
    }
}
