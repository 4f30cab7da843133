use thiserror::Error;

/// Errors returned by the algorithms in this crate.
///
/// Every variant is detected during input validation, before any iteration
/// begins. Numerical degeneracies encountered mid-fit (empty clusters,
/// zero-variance dimensions, vanishing densities) are handled by documented
/// fallbacks instead of errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Input matrix has zero rows.
    #[error("empty input")]
    EmptyInput,

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Human-readable explanation.
        message: &'static str,
    },

    /// Requested cluster count is incompatible with the dataset.
    #[error("invalid cluster count: requested {requested}, but dataset has {n_items} items")]
    InvalidClusterCount {
        /// Requested number of clusters.
        requested: usize,
        /// Number of items in the dataset.
        n_items: usize,
    },

    /// Rows of a matrix (or a pair of vectors) have inconsistent dimensionality.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected dimensionality.
        expected: usize,
        /// Found dimensionality.
        found: usize,
    },
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;
