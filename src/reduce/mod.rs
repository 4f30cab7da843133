//! Dimensionality reduction for visualization.
//!
//! Three techniques with one shared purpose: project an observation
//! matrix down to 2-3 plottable columns. Reduction is independent of
//! clustering — it never influences labels — and each technique returns
//! its own fit struct with technique-specific metadata.
//!
//! | Technique | Nature | Reproducible | Sweet spot |
//! |-----------|--------|--------------|------------|
//! | [`Pca`] | exact, linear | always | small or low-dimensional data |
//! | [`Tsne`] | iterative, O(n²)/iter | with a seed | medium-sized visualization |
//! | [`Umap`] | iterative, graph-based | with a seed | large + high-dimensional |
//!
//! [`auto_select`] encodes that table as a policy: given the data shape
//! it picks a technique and reports the rule that fired, so a caller can
//! display *why* a projection method was chosen.

mod pca;
mod tsne;
mod umap;

pub use pca::{Pca, PcaFit};
pub use tsne::{Tsne, TsneFit};
pub use umap::{Umap, UmapFit};

/// Below this row count PCA is always preferred: the iterative methods
/// have nothing to gain on datasets this small.
pub const SMALL_SAMPLE_LIMIT: usize = 50;
/// At or below this column count the data is already plottable-adjacent;
/// PCA keeps it faithful.
pub const LOW_DIMENSION_LIMIT: usize = 3;
/// Above this column count (together with [`LARGE_SAMPLE_LIMIT`]) the
/// graph-based technique wins.
pub const HIGH_DIMENSION_LIMIT: usize = 50;
/// Above this row count (together with [`HIGH_DIMENSION_LIMIT`]) t-SNE's
/// O(n²) iterations stop being practical.
pub const LARGE_SAMPLE_LIMIT: usize = 2000;

/// A reduction technique, as chosen by [`auto_select`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Technique {
    /// Exact linear projection.
    Pca,
    /// t-distributed stochastic neighbor embedding.
    Tsne,
    /// UMAP-style graph embedding.
    Umap,
}

/// The outcome of the auto-selection policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Chosen technique.
    pub technique: Technique,
    /// The rule that fired, in plain words.
    pub reason: &'static str,
}

/// Choose a reduction technique from the data shape.
///
/// Rules, in order:
/// 1. Small datasets (`n <` [`SMALL_SAMPLE_LIMIT`]) → PCA.
/// 2. Already low-dimensional data (`d <=` [`LOW_DIMENSION_LIMIT`]) → PCA.
/// 3. High-dimensional and large (`d >` [`HIGH_DIMENSION_LIMIT`] and
///    `n >` [`LARGE_SAMPLE_LIMIT`]) → UMAP.
/// 4. Everything else → t-SNE.
pub fn auto_select(n_rows: usize, n_cols: usize) -> Selection {
    if n_rows < SMALL_SAMPLE_LIMIT {
        return Selection {
            technique: Technique::Pca,
            reason: "small dataset: exact PCA is fast and faithful",
        };
    }
    if n_cols <= LOW_DIMENSION_LIMIT {
        return Selection {
            technique: Technique::Pca,
            reason: "already low-dimensional: a linear projection loses little",
        };
    }
    if n_cols > HIGH_DIMENSION_LIMIT && n_rows > LARGE_SAMPLE_LIMIT {
        return Selection {
            technique: Technique::Umap,
            reason: "high-dimensional and large: graph-based embedding scales best",
        };
    }
    Selection {
        technique: Technique::Tsne,
        reason: "medium-sized visualization task: t-SNE preserves local structure",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_datasets_get_pca() {
        let sel = auto_select(10, 100);
        assert_eq!(sel.technique, Technique::Pca);
        assert!(sel.reason.contains("small"));
    }

    #[test]
    fn low_dimensional_data_gets_pca() {
        let sel = auto_select(10_000, 3);
        assert_eq!(sel.technique, Technique::Pca);
    }

    #[test]
    fn large_high_dimensional_data_gets_umap() {
        let sel = auto_select(5000, 128);
        assert_eq!(sel.technique, Technique::Umap);
    }

    #[test]
    fn medium_tasks_get_tsne() {
        assert_eq!(auto_select(500, 20).technique, Technique::Tsne);
        // Large but moderate-dimensional also falls through to t-SNE.
        assert_eq!(auto_select(5000, 20).technique, Technique::Tsne);
        // High-dimensional but not large stays with t-SNE too.
        assert_eq!(auto_select(500, 128).technique, Technique::Tsne);
    }

    #[test]
    fn rule_order_small_beats_everything() {
        assert_eq!(auto_select(10, 2).technique, Technique::Pca);
        assert_eq!(auto_select(49, 500).technique, Technique::Pca);
    }
}
