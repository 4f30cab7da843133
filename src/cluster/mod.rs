//! Clustering algorithms for grouping similar items.
//!
//! This module provides clustering algorithms for dense vectors.
//!
//! ## Hard vs Soft Clustering
//!
//! **Hard clustering** assigns each item to exactly one cluster. Simple, but
//! loses information when items genuinely span multiple groups.
//!
//! **Soft clustering** gives each item a probability distribution over
//! clusters. A point might be 60% component A, 40% component B; the GMM
//! exposes this through [`SoftClustering`].
//!
//! ## Algorithms
//!
//! | Algorithm | Needs k | Finds noise | Shape assumption |
//! |-----------|---------|-------------|------------------|
//! | [`Kmeans`] | yes | no | spherical |
//! | [`Dbscan`] | no | yes | arbitrary |
//! | [`Optics`] | no | yes | arbitrary, varying density |
//! | [`Hierarchical`] | yes | no | depends on linkage |
//! | [`MeanShift`] | no | no | density modes |
//! | [`Gmm`] | yes | no | axis-aligned ellipsoids |
//! | [`Spectral`] | yes | no | graph-connected |
//!
//! ## Choosing by name
//!
//! Callers that receive an algorithm selection from the outside build an
//! [`Algorithm`] value and hand it to [`run`]. The enum is closed: an
//! unsupported selection fails at compile time in the caller, never at
//! run time inside this module.
//!
//! ## Usage
//!
//! ```rust
//! use glom::cluster::{Algorithm, Clustering, Dbscan, Kmeans, run, NOISE};
//!
//! let data = vec![
//!     vec![0.0, 0.0],
//!     vec![0.1, 0.1],
//!     vec![10.0, 10.0],
//!     vec![10.1, 10.1],
//! ];
//!
//! // Hard clustering with K-means
//! let labels = Kmeans::new(2).with_seed(42).fit_predict(&data).unwrap();
//! assert_eq!(labels[0], labels[1]);  // First two together
//! assert_ne!(labels[0], labels[2]);  // Separate from last two
//!
//! // Density-based clustering with DBSCAN
//! let labels = Dbscan::new(0.5, 1).fit_predict(&data).unwrap();
//! assert!(labels.iter().all(|&l| l != NOISE));
//!
//! // Or dispatch through the closed algorithm enum
//! let output = run(&Algorithm::Kmeans(Kmeans::new(2).with_seed(42)), &data).unwrap();
//! assert_eq!(output.labels().len(), data.len());
//! ```

mod dbscan;
mod gmm;
mod hierarchical;
mod kmeans;
mod mean_shift;
mod optics;
mod spectral;
mod traits;

pub use dbscan::{Dbscan, DbscanFit, NOISE};
pub use gmm::{Gmm, GmmFit};
pub use hierarchical::{Hierarchical, HierarchicalFit, Linkage, Merge};
pub use kmeans::{Kmeans, KmeansFit};
pub use mean_shift::{MeanShift, MeanShiftFit};
pub use optics::{Optics, OpticsFit};
pub use spectral::{Spectral, SpectralFit};
pub use traits::{Clustering, SoftClustering};

pub(crate) use kmeans::total_inertia;

use crate::error::Result;

/// A configured clustering algorithm, ready to run.
///
/// One variant per supported algorithm, each carrying its own
/// strongly-typed configuration. Dispatch is a single exhaustive match in
/// [`run`]; there is no string-keyed lookup.
#[derive(Debug, Clone)]
pub enum Algorithm {
    /// Centroid partitioning ([`Kmeans`]).
    Kmeans(Kmeans),
    /// Density clustering with noise ([`Dbscan`]).
    Dbscan(Dbscan),
    /// Density ordering ([`Optics`]).
    Optics(Optics),
    /// Agglomerative merging ([`Hierarchical`]).
    Hierarchical(Hierarchical),
    /// Mode seeking ([`MeanShift`]).
    MeanShift(MeanShift),
    /// Gaussian mixture ([`Gmm`]).
    Gmm(Gmm),
    /// Laplacian-embedding clustering ([`Spectral`]).
    Spectral(Spectral),
}

/// The full result of running one clustering algorithm.
///
/// Every variant exposes labels through [`ClusterOutput::labels`]; the
/// algorithm-specific extras (centroids, merge history, reachability
/// ordering, mixture parameters, ...) live in the wrapped fit structs.
#[derive(Debug, Clone)]
pub enum ClusterOutput {
    /// K-means fit: centroids, inertia, iteration diagnostics.
    Kmeans(KmeansFit),
    /// DBSCAN fit: noise count, core points.
    Dbscan(DbscanFit),
    /// OPTICS fit: ordering, reachability, core distances.
    Optics(OpticsFit),
    /// Hierarchical fit: merge history.
    Hierarchical(HierarchicalFit),
    /// Mean shift fit: discovered modes.
    MeanShift(MeanShiftFit),
    /// GMM fit: mixture parameters and responsibilities.
    Gmm(GmmFit),
    /// Spectral fit: Laplacian embedding.
    Spectral(SpectralFit),
}

impl ClusterOutput {
    /// The label sequence, one entry per input row.
    pub fn labels(&self) -> &[usize] {
        match self {
            ClusterOutput::Kmeans(fit) => &fit.labels,
            ClusterOutput::Dbscan(fit) => &fit.labels,
            ClusterOutput::Optics(fit) => &fit.labels,
            ClusterOutput::Hierarchical(fit) => &fit.labels,
            ClusterOutput::MeanShift(fit) => &fit.labels,
            ClusterOutput::Gmm(fit) => &fit.labels,
            ClusterOutput::Spectral(fit) => &fit.labels,
        }
    }
}

/// Run a configured algorithm against a data matrix.
pub fn run(algorithm: &Algorithm, data: &[Vec<f32>]) -> Result<ClusterOutput> {
    match algorithm {
        Algorithm::Kmeans(model) => Ok(ClusterOutput::Kmeans(model.fit(data)?)),
        Algorithm::Dbscan(model) => Ok(ClusterOutput::Dbscan(model.fit(data)?)),
        Algorithm::Optics(model) => Ok(ClusterOutput::Optics(model.fit(data)?)),
        Algorithm::Hierarchical(model) => Ok(ClusterOutput::Hierarchical(model.fit(data)?)),
        Algorithm::MeanShift(model) => Ok(ClusterOutput::MeanShift(model.fit(data)?)),
        Algorithm::Gmm(model) => Ok(ClusterOutput::Gmm(model.fit(data)?)),
        Algorithm::Spectral(model) => Ok(ClusterOutput::Spectral(model.fit(data)?)),
    }
}

#[cfg(test)]
mod dispatch_tests {
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
    fn every_variant_dispatches() {
        let data = two_pairs();
        let algorithms = vec![
            Algorithm::Kmeans(Kmeans::new(2).with_seed(42)),
            Algorithm::Dbscan(Dbscan::new(1.0, 1)),
            Algorithm::Optics(Optics::new(1).with_extraction_threshold(1.0)),
            Algorithm::Hierarchical(Hierarchical::new(2)),
            Algorithm::MeanShift(MeanShift::new(1.0)),
            Algorithm::Gmm(Gmm::new(2).with_seed(42)),
            Algorithm::Spectral(Spectral::new(2).with_seed(42)),
        ];

        for algorithm in &algorithms {
            let output = run(algorithm, &data).unwrap();
            assert_eq!(output.labels().len(), 4, "{algorithm:?}");
        }
    }

    #[test]
    fn errors_propagate_through_dispatch() {
        let empty: Vec<Vec<f32>> = vec![];
        let result = run(&Algorithm::Kmeans(Kmeans::new(2)), &empty);
        assert!(result.is_err());
    }
}
