use log::{debug, warn};

use crate::dense::DenseMatrix;
use crate::error::{require_shape, require_square, LinalgError, Result};
use crate::linalg::{gemm, svd_tall, DenseLu};
use crate::ops::Linalg;
use crate::view::{MatrixView, MatrixViewMut};

impl Linalg {
    /// Sum of the first `min(rows, cols)` diagonal entries; `0` when empty.
    pub fn trace(&self, a: &MatrixView<'_>) -> f64 {
        debug!("trace {:?}", a.shape());
        (0..a.rows().min(a.cols())).map(|i| a[(i, i)]).sum()
    }

    /// Determinant via LU with partial pivoting.
    ///
    /// Exactly `0.0` when elimination meets an all-zero column, and `1.0`
    /// for a `0 x 0` matrix.
    pub fn determinant(&self, a: &MatrixView<'_>) -> Result<f64> {
        require_square("det", a.shape())?;
        debug!("det {:?}", a.shape());
        Ok(DenseLu::new(a).det())
    }

    /// LU factorization of `a`, checked against the singular policy.
    fn factor_invertible(&self, op: &'static str, a: &MatrixView<'_>) -> Result<DenseLu<f64>> {
        let lu = DenseLu::new(a);
        if lu.is_singular() {
            if self.config().is_strict() {
                return Err(LinalgError::Singular);
            }
            warn!("{}: singular {:?} input, result may not be finite", op, a.shape());
        }
        Ok(lu)
    }

    /// `out = a⁻¹`.
    ///
    /// A singular `a` yields non-finite entries, or
    /// [`LinalgError::Singular`] under [`SingularPolicy::Strict`](crate::SingularPolicy::Strict).
    pub fn inverse(&self, a: &MatrixView<'_>, out: &mut MatrixViewMut<'_>) -> Result<()> {
        require_square("inv", a.shape())?;
        require_shape("inv", a.shape(), out.shape())?;
        debug!("inv {:?}", a.shape());
        let inv = self.factor_invertible("inv", a)?.inverse();
        out.copy_from(&inv);
        Ok(())
    }

    /// `out = aᵐ` by repeated multiplication.
    ///
    /// `m == 0` gives the identity for any `a`. Negative `m` raises `a⁻¹`
    /// to `|m|`. The accumulator starts at the base and is multiplied by it
    /// `|m| - 1` times.
    ///
    /// ```
    /// use densecore::{Linalg, MatrixView, MatrixViewMut};
    ///
    /// let a = [2.0, 0.0, 0.0, 4.0];
    /// let a = MatrixView::col_major(2, 2, &a).unwrap();
    /// let mut buf = [0.0; 4];
    /// let mut out = MatrixViewMut::col_major(2, 2, &mut buf).unwrap();
    ///
    /// Linalg::default().matrix_power(&a, -2, &mut out).unwrap();
    /// assert_eq!(buf, [0.25, 0.0, 0.0, 0.0625]);
    /// ```
    pub fn matrix_power(&self, a: &MatrixView<'_>, m: i64, out: &mut MatrixViewMut<'_>) -> Result<()> {
        let n = require_square("matrix_power", a.shape())?;
        require_shape("matrix_power", a.shape(), out.shape())?;
        debug!("matrix_power {:?} ^ {}", a.shape(), m);

        if m == 0 {
            out.copy_from(&DenseMatrix::<f64>::eye(n));
            return Ok(());
        }

        let base = if m > 0 {
            DenseMatrix::from_ref(a)
        } else {
            self.factor_invertible("matrix_power", a)?.inverse()
        };

        let mut acc = base.clone();
        let mut tmp = DenseMatrix::zeros(n, n);
        for _ in 1..m.unsigned_abs() {
            gemm(&acc, &base, &mut tmp);
            core::mem::swap(&mut acc, &mut tmp);
        }
        out.copy_from(&acc);
        Ok(())
    }

    /// Number of singular values above a threshold.
    ///
    /// Without `tolerance` the threshold is `σ_max · max(rows, cols) · ε`.
    /// An explicit `tolerance` is relative: singular values above
    /// `tolerance · σ_max` count.
    pub fn matrix_rank(&self, a: &MatrixView<'_>, tolerance: Option<f64>) -> Result<usize> {
        debug!("matrix_rank {:?} tol={:?}", a.shape(), tolerance);
        let (rows, cols) = a.shape();
        if rows == 0 || cols == 0 {
            return Ok(0);
        }

        let max_iter = self.config().max_iter(rows, cols);
        let s = if rows >= cols {
            svd_tall(a, false, max_iter)?.s
        } else {
            svd_tall(&a.t(), false, max_iter)?.s
        };

        let s_max = s[0];
        let threshold = match tolerance {
            Some(tol) => tol * s_max,
            None => s_max * rows.max(cols) as f64 * f64::EPSILON,
        };
        Ok(s.iter().filter(|&&sv| sv > threshold).count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, SingularPolicy};

    const TOL: f64 = 1e-10;

    fn assert_near(a: f64, b: f64, tol: f64, msg: &str) {
        assert!((a - b).abs() < tol, "{}: {} vs {} (diff {})", msg, a, b, (a - b).abs());
    }

    #[test]
    fn trace_rectangular_and_empty() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let a = MatrixView::row_major(2, 3, &data).unwrap();
        assert_eq!(Linalg::default().trace(&a), 6.0);
        let e = MatrixView::row_major(0, 3, &[]).unwrap();
        assert_eq!(Linalg::default().trace(&e), 0.0);
    }

    #[test]
    fn determinant_values() {
        let la = Linalg::default();
        let data = [6.0, 1.0, 1.0, 4.0, -2.0, 5.0, 2.0, 8.0, 7.0];
        let a = MatrixView::row_major(3, 3, &data).unwrap();
        assert_near(la.determinant(&a).unwrap(), -306.0, 1e-9, "det");
        // det(Aᵗ) == det(A)
        assert_near(la.determinant(&a.t()).unwrap(), -306.0, 1e-9, "det t");

        let empty = MatrixView::col_major(0, 0, &[]).unwrap();
        assert_eq!(la.determinant(&empty).unwrap(), 1.0);
    }

    #[test]
    fn singular_determinant_is_zero() {
        let data = [1.0, 2.0, 2.0, 4.0];
        let a = MatrixView::col_major(2, 2, &data).unwrap();
        assert_eq!(Linalg::default().determinant(&a).unwrap(), 0.0);
    }

    #[test]
    fn inverse_2x2() {
        let data = [4.0, 7.0, 2.0, 6.0];
        let a = MatrixView::row_major(2, 2, &data).unwrap();
        let mut buf = [0.0; 4];
        let mut out = MatrixViewMut::row_major(2, 2, &mut buf).unwrap();
        Linalg::default().inverse(&a, &mut out).unwrap();
        let expected = [0.6, -0.7, -0.2, 0.4];
        for (got, want) in buf.iter().zip(expected) {
            assert_near(*got, want, TOL, "inv");
        }
    }

    #[test]
    fn singular_inverse_policies() {
        let data = [1.0, 2.0, 2.0, 4.0];
        let a = MatrixView::col_major(2, 2, &data).unwrap();

        let mut buf = [0.0; 4];
        let mut out = MatrixViewMut::col_major(2, 2, &mut buf).unwrap();
        Linalg::default().inverse(&a, &mut out).unwrap();
        assert!(buf.iter().any(|x| !x.is_finite()));

        let strict = Linalg::new(Config::new().with_singular_policy(SingularPolicy::Strict));
        let mut buf = [3.0; 4];
        let mut out = MatrixViewMut::col_major(2, 2, &mut buf).unwrap();
        assert_eq!(strict.inverse(&a, &mut out), Err(LinalgError::Singular));
        assert_eq!(buf, [3.0; 4]);
    }

    #[test]
    fn power_zero_of_singular_is_identity() {
        let data = [0.0; 4];
        let a = MatrixView::col_major(2, 2, &data).unwrap();
        let mut buf = [9.0; 4];
        let mut out = MatrixViewMut::col_major(2, 2, &mut buf).unwrap();
        Linalg::default().matrix_power(&a, 0, &mut out).unwrap();
        assert_eq!(buf, [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn power_positive() {
        // [[1,1],[1,0]]^5 = [[8,5],[5,3]]
        let data = [1.0, 1.0, 1.0, 0.0];
        let a = MatrixView::row_major(2, 2, &data).unwrap();
        let mut buf = [0.0; 4];
        let mut out = MatrixViewMut::row_major(2, 2, &mut buf).unwrap();
        Linalg::default().matrix_power(&a, 5, &mut out).unwrap();
        assert_eq!(buf, [8.0, 5.0, 5.0, 3.0]);
    }

    #[test]
    fn power_negative_uses_inverse() {
        // [[1,1],[0,1]]^-3 = [[1,-3],[0,1]]
        let data = [1.0, 1.0, 0.0, 1.0];
        let a = MatrixView::row_major(2, 2, &data).unwrap();
        let mut buf = [0.0; 4];
        let mut out = MatrixViewMut::row_major(2, 2, &mut buf).unwrap();
        Linalg::default().matrix_power(&a, -3, &mut out).unwrap();
        let expected = [1.0, -3.0, 0.0, 1.0];
        for (got, want) in buf.iter().zip(expected) {
            assert_near(*got, want, TOL, "A^-3");
        }
    }

    #[test]
    fn power_negative_singular_strict() {
        let data = [1.0, 2.0, 2.0, 4.0];
        let a = MatrixView::col_major(2, 2, &data).unwrap();
        let strict = Linalg::new(Config::new().with_singular_policy(SingularPolicy::Strict));
        let mut buf = [0.0; 4];
        let mut out = MatrixViewMut::col_major(2, 2, &mut buf).unwrap();
        assert_eq!(strict.matrix_power(&a, -1, &mut out), Err(LinalgError::Singular));
    }

    #[test]
    fn rank_default_and_explicit_tolerance() {
        let la = Linalg::default();
        let data = [3.0, 0.0, 0.0, 0.0, 1.0, 2.0, 0.0, 2.0, 4.0];
        let a = MatrixView::row_major(3, 3, &data).unwrap();
        assert_eq!(la.matrix_rank(&a, None).unwrap(), 2);

        // σ = (1, 1e-3); relative tolerance 1e-2 drops the second one
        let d = [1.0, 0.0, 0.0, 1e-3];
        let d = MatrixView::col_major(2, 2, &d).unwrap();
        assert_eq!(la.matrix_rank(&d, None).unwrap(), 2);
        assert_eq!(la.matrix_rank(&d, Some(1e-2)).unwrap(), 1);
        assert_eq!(la.matrix_rank(&d, Some(1e-4)).unwrap(), 2);
    }

    #[test]
    fn rank_wide_zero_and_empty() {
        let la = Linalg::default();
        let data = [0.0, 1.0, 0.0, 0.0, 2.0, 0.0];
        let wide = MatrixView::row_major(2, 3, &data).unwrap();
        assert_eq!(la.matrix_rank(&wide, None).unwrap(), 1);

        let zeros = [0.0; 4];
        let z = MatrixView::col_major(2, 2, &zeros).unwrap();
        assert_eq!(la.matrix_rank(&z, None).unwrap(), 0);

        let e = MatrixView::col_major(0, 4, &[]).unwrap();
        assert_eq!(la.matrix_rank(&e, None).unwrap(), 0);
    }
}
