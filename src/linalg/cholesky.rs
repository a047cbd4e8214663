use crate::error::{LinalgError, Result};
use crate::traits::{FloatScalar, MatrixMut};

/// Cholesky decomposition in place: A = L * L^T.
///
/// Left-looking column sweep. Only the lower triangle of `a` is read; on
/// return it holds L (including the diagonal). The strict upper triangle is
/// left unchanged. Symmetry is assumed, not verified.
///
/// Returns `NotPositiveDefinite` at the first non-positive pivot.
pub(crate) fn cholesky_in_place<T: FloatScalar>(a: &mut impl MatrixMut<T>) -> Result<()> {
    let n = a.nrows();
    debug_assert_eq!(n, a.ncols(), "Cholesky decomposition requires a square matrix");

    for j in 0..n {
        // a[j:n, j] -= l[j, k] * l[j:n, k] for every finished column k
        for k in 0..j {
            let ljk = *a.get(j, k);
            for i in j..n {
                let lik = *a.get(i, k);
                let v = a.get_mut(i, j);
                *v = *v - ljk * lik;
            }
        }

        let diag = *a.get(j, j);
        if !(diag > T::zero()) {
            return Err(LinalgError::NotPositiveDefinite);
        }
        let ljj = diag.sqrt();
        *a.get_mut(j, j) = ljj;

        let inv_ljj = T::one() / ljj;
        for i in (j + 1)..n {
            let v = a.get_mut(i, j);
            *v = *v * inv_ljj;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dense::DenseMatrix;

    fn from_rows(n: usize, rows: &[f64]) -> DenseMatrix<f64> {
        DenseMatrix::from_fn(n, n, |i, j| rows[i * n + j])
    }

    #[test]
    fn cholesky_3x3_exact() {
        let mut a = from_rows(3, &[4.0, 12.0, -16.0, 12.0, 37.0, -43.0, -16.0, -43.0, 98.0]);
        cholesky_in_place(&mut a).unwrap();
        let expected = [[2.0, 0.0, 0.0], [6.0, 1.0, 0.0], [-8.0, 5.0, 3.0]];
        for i in 0..3 {
            for j in 0..=i {
                assert_eq!(a[(i, j)], expected[i][j], "L[({},{})]", i, j);
            }
        }
    }

    #[test]
    fn upper_triangle_untouched() {
        let mut a = from_rows(2, &[4.0, 2.0, 2.0, 3.0]);
        cholesky_in_place(&mut a).unwrap();
        assert_eq!(a[(0, 1)], 2.0);
        assert_eq!(a[(0, 0)], 2.0);
        assert_eq!(a[(1, 0)], 1.0);
        assert!((a[(1, 1)] - 2.0_f64.sqrt()).abs() < 1e-14);
    }

    #[test]
    fn not_positive_definite() {
        let mut a = from_rows(2, &[1.0, 5.0, 5.0, 1.0]);
        assert_eq!(cholesky_in_place(&mut a), Err(LinalgError::NotPositiveDefinite));
    }

    #[test]
    fn nan_pivot_rejected() {
        let mut a = from_rows(1, &[f64::NAN]);
        assert_eq!(cholesky_in_place(&mut a), Err(LinalgError::NotPositiveDefinite));
    }
}
