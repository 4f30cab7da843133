//! Numeric engine for clustering dashboards.
//!
//! `glom` is a small, backend-agnostic library covering the three numeric
//! jobs behind a clustering UI: grouping dense vectors, scoring the
//! resulting groups, and projecting the data down for plotting.
//!
//! The public API is organized in three modules:
//! - [`cluster`] — the algorithms: k-means (k-means++ seeding, Lloyd
//!   iterations), DBSCAN and OPTICS (density, with noise), agglomerative
//!   hierarchy, mean shift, Gaussian mixtures, and spectral clustering,
//!   all runnable through the closed [`cluster::Algorithm`] dispatcher.
//! - [`evaluate`] — cluster-quality metrics (Silhouette, Davies-Bouldin,
//!   Calinski-Harabasz, elbow/WCSS sweep) over any labeling.
//! - [`reduce`] — PCA, t-SNE, and a UMAP-style embedding, plus the
//!   auto-selection policy.
//!
//! Every entry point takes the observation matrix as an explicit
//! `&[Vec<f32>]` argument, runs synchronously to completion, and returns
//! plain data the caller owns. There is no global state and no I/O.

#![forbid(unsafe_code)]

pub mod cluster;
pub mod error;
pub mod evaluate;
pub mod math;
pub mod reduce;

pub use cluster::{
    run, Algorithm, ClusterOutput, Clustering, Dbscan, DbscanFit, Gmm, GmmFit, Hierarchical,
    HierarchicalFit, Kmeans, KmeansFit, Linkage, MeanShift, MeanShiftFit, Merge, Optics, OpticsFit,
    SoftClustering, Spectral, SpectralFit, NOISE,
};
pub use error::{Error, Result};
pub use evaluate::{
    calinski_harabasz, davies_bouldin, elbow_wcss, silhouette, Evaluation, Quality,
};
pub use reduce::{auto_select, Pca, PcaFit, Selection, Technique, Tsne, TsneFit, Umap, UmapFit};
