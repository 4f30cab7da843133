//! Scalar numeric kernel shared by every algorithm in this crate.
//!
//! Everything here is a pure function over slices: no state, no side
//! effects, safe to call concurrently. Algorithms build on these
//! primitives instead of pulling in a linear-algebra stack; the one
//! non-trivial routine is a cyclic Jacobi eigensolver for the symmetric
//! matrices PCA and spectral clustering produce.

use crate::error::{Error, Result};

/// Euclidean distance between two vectors.
///
/// Returns `DimensionMismatch` if the vectors differ in length.
pub fn euclidean(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(Error::DimensionMismatch {
            expected: a.len(),
            found: b.len(),
        });
    }
    Ok(squared_euclidean(a, b).sqrt())
}

/// Squared Euclidean distance. Hot-path variant: lengths are only
/// debug-asserted, callers validate shapes up front.
#[inline]
pub(crate) fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Element-wise arithmetic mean of a set of equal-length vectors.
///
/// Returns `EmptyInput` if `vectors` is empty and `DimensionMismatch` if
/// the rows are ragged.
pub fn mean(vectors: &[Vec<f32>]) -> Result<Vec<f32>> {
    let Some(first) = vectors.first() else {
        return Err(Error::EmptyInput);
    };
    let d = first.len();
    let mut out = vec![0.0f32; d];
    for v in vectors {
        if v.len() != d {
            return Err(Error::DimensionMismatch {
                expected: d,
                found: v.len(),
            });
        }
        for (acc, &x) in out.iter_mut().zip(v.iter()) {
            *acc += x;
        }
    }
    let n = vectors.len() as f32;
    for acc in &mut out {
        *acc /= n;
    }
    Ok(out)
}

/// Per-dimension population variance of a set of vectors around `center`.
///
/// Rows are assumed rectangular (callers validate); an empty set yields
/// all zeros.
pub fn variance_diagonal(vectors: &[Vec<f32>], center: &[f32]) -> Vec<f32> {
    let d = center.len();
    let mut out = vec![0.0f32; d];
    if vectors.is_empty() {
        return out;
    }
    for v in vectors {
        debug_assert_eq!(v.len(), d);
        for j in 0..d {
            let diff = v[j] - center[j];
            out[j] += diff * diff;
        }
    }
    let n = vectors.len() as f32;
    for acc in &mut out {
        *acc /= n;
    }
    out
}

/// Variance entries at or below zero are replaced by this value inside
/// [`gaussian_density`]. A floor, not an error: a zero-variance dimension
/// means every observed value was identical, and flooring keeps the
/// density finite instead of dividing by zero.
pub const VARIANCE_FLOOR: f32 = 1.0;

/// Diagonal-covariance multivariate normal density of `x`.
///
/// `variance_diagonal` entries that are not strictly positive are treated
/// as [`VARIANCE_FLOOR`]. Accumulates in log space and exponentiates once,
/// so moderate dimensionality does not underflow.
///
/// Lengths are debug-asserted; callers validate shapes up front.
pub fn gaussian_density(x: &[f32], mean: &[f32], variance_diagonal: &[f32]) -> f64 {
    debug_assert_eq!(x.len(), mean.len());
    debug_assert_eq!(x.len(), variance_diagonal.len());

    let mut log_density = 0.0f64;
    for ((&xi, &mi), &vi) in x.iter().zip(mean.iter()).zip(variance_diagonal.iter()) {
        let var = f64::from(if vi > 0.0 { vi } else { VARIANCE_FLOOR });
        let diff = f64::from(xi) - f64::from(mi);
        log_density += -0.5 * (diff * diff / var + (2.0 * std::f64::consts::PI * var).ln());
    }
    log_density.exp()
}

/// Validate a rectangular, non-empty observation matrix.
///
/// Returns the feature count `d`. Zero rows is `EmptyInput`; zero columns
/// is an invalid parameter; ragged rows are `DimensionMismatch`.
pub(crate) fn validate_matrix(data: &[Vec<f32>]) -> Result<usize> {
    let Some(first) = data.first() else {
        return Err(Error::EmptyInput);
    };
    let d = first.len();
    if d == 0 {
        return Err(Error::InvalidParameter {
            name: "dimension",
            message: "must be at least 1",
        });
    }
    for row in data.iter().skip(1) {
        if row.len() != d {
            return Err(Error::DimensionMismatch {
                expected: d,
                found: row.len(),
            });
        }
    }
    Ok(d)
}

/// Eigendecomposition of a symmetric `size x size` matrix (row-major)
/// via cyclic Jacobi rotations.
///
/// Returns `(eigenvalues, eigenvectors)` sorted by ascending eigenvalue;
/// `eigenvectors[j]` is the unit eigenvector paired with `eigenvalues[j]`.
/// Symmetry is the caller's responsibility.
pub(crate) fn symmetric_eigen(mut a: Vec<f64>, size: usize) -> (Vec<f64>, Vec<Vec<f64>>) {
    let n = size;
    debug_assert_eq!(a.len(), n * n);

    let mut v = vec![0.0f64; n * n];
    for i in 0..n {
        v[i * n + i] = 1.0;
    }

    const MAX_SWEEPS: usize = 64;
    const OFF_DIAGONAL_EPS: f64 = 1e-12;

    for _ in 0..MAX_SWEEPS {
        let mut off = 0.0f64;
        for i in 0..n {
            for j in (i + 1)..n {
                off += a[i * n + j] * a[i * n + j];
            }
        }
        if off.sqrt() < OFF_DIAGONAL_EPS {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = a[p * n + q];
                if apq.abs() < f64::EPSILON {
                    continue;
                }

                let app = a[p * n + p];
                let aqq = a[q * n + q];
                let theta = (aqq - app) / (2.0 * apq);
                let t = if theta >= 0.0 {
                    1.0 / (theta + (1.0 + theta * theta).sqrt())
                } else {
                    1.0 / (theta - (1.0 + theta * theta).sqrt())
                };
                let c = 1.0 / (1.0 + t * t).sqrt();
                let s = t * c;

                // Apply the rotation from both sides: columns p,q then rows p,q.
                for k in 0..n {
                    let akp = a[k * n + p];
                    let akq = a[k * n + q];
                    a[k * n + p] = c * akp - s * akq;
                    a[k * n + q] = s * akp + c * akq;
                }
                for k in 0..n {
                    let apk = a[p * n + k];
                    let aqk = a[q * n + k];
                    a[p * n + k] = c * apk - s * aqk;
                    a[q * n + k] = s * apk + c * aqk;
                }
                for k in 0..n {
                    let vkp = v[k * n + p];
                    let vkq = v[k * n + q];
                    v[k * n + p] = c * vkp - s * vkq;
                    v[k * n + q] = s * vkp + c * vkq;
                }
            }
        }
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| a[i * n + i].total_cmp(&a[j * n + j]));

    let values: Vec<f64> = order.iter().map(|&j| a[j * n + j]).collect();
    let vectors: Vec<Vec<f64>> = order
        .iter()
        .map(|&j| (0..n).map(|i| v[i * n + j]).collect())
        .collect();

    (values, vectors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn euclidean_basic() {
        let d = euclidean(&[0.0, 0.0], &[3.0, 4.0]).unwrap();
        assert!((d - 5.0).abs() < 1e-6);
    }

    #[test]
    fn euclidean_dimension_mismatch() {
        let result = euclidean(&[0.0, 0.0], &[1.0]);
        assert!(matches!(
            result,
            Err(Error::DimensionMismatch {
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn mean_basic() {
        let m = mean(&[vec![0.0, 2.0], vec![2.0, 4.0]]).unwrap();
        assert_eq!(m, vec![1.0, 3.0]);
    }

    #[test]
    fn mean_empty_input() {
        let result = mean(&[]);
        assert!(matches!(result, Err(Error::EmptyInput)));
    }

    #[test]
    fn variance_diagonal_basic() {
        let vectors = vec![vec![0.0, 1.0], vec![2.0, 1.0]];
        let var = variance_diagonal(&vectors, &[1.0, 1.0]);
        assert!((var[0] - 1.0).abs() < 1e-6);
        assert!(var[1].abs() < 1e-6);
    }

    #[test]
    fn gaussian_density_standard_normal_peak() {
        // 1-D standard normal at its mean: 1 / sqrt(2*pi)
        let density = gaussian_density(&[0.0], &[0.0], &[1.0]);
        assert!((density - 0.398_942_280_4).abs() < 1e-6);
    }

    #[test]
    fn gaussian_density_floors_degenerate_variance() {
        // Zero variance falls back to the unit floor rather than dividing
        // by zero, so the result matches the unit-variance density.
        let floored = gaussian_density(&[1.0, 2.0], &[1.0, 2.0], &[0.0, -3.0]);
        let unit = gaussian_density(&[1.0, 2.0], &[1.0, 2.0], &[1.0, 1.0]);
        assert!((floored - unit).abs() < 1e-12);
        assert!(floored.is_finite());
    }

    #[test]
    fn validate_matrix_rejects_ragged_rows() {
        let data = vec![vec![0.0, 0.0], vec![1.0]];
        assert!(validate_matrix(&data).is_err());
    }

    #[test]
    fn jacobi_diagonal_matrix() {
        // Already diagonal: eigenvalues are the diagonal, sorted ascending.
        let a = vec![3.0, 0.0, 0.0, 1.0];
        let (values, _) = symmetric_eigen(a, 2);
        assert!((values[0] - 1.0).abs() < 1e-9);
        assert!((values[1] - 3.0).abs() < 1e-9);
    }

    #[test]
    fn jacobi_known_2x2() {
        // [[2, 1], [1, 2]] has eigenvalues 1 and 3 with eigenvectors
        // along (1, -1) and (1, 1).
        let a = vec![2.0, 1.0, 1.0, 2.0];
        let (values, vectors) = symmetric_eigen(a, 2);
        assert!((values[0] - 1.0).abs() < 1e-9);
        assert!((values[1] - 3.0).abs() < 1e-9);

        let v1 = &vectors[1];
        assert!((v1[0].abs() - v1[1].abs()).abs() < 1e-9);
    }

    #[test]
    fn jacobi_eigenvectors_are_unit_length() {
        let a = vec![4.0, 1.0, 0.5, 1.0, 3.0, 0.2, 0.5, 0.2, 1.0];
        let (_, vectors) = symmetric_eigen(a, 3);
        for v in &vectors {
            let norm: f64 = v.iter().map(|x| x * x).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-9);
        }
    }
}
