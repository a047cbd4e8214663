use log::{debug, warn};
use num_complex::Complex;

use crate::dense::DenseMatrix;
use crate::error::{require_shape, require_square, LinalgError, Result};
use crate::linalg::{cholesky_in_place, eigenvalues, svd_tall, DenseQr};
use crate::ops::Linalg;
use crate::view::{MatrixView, MatrixViewMut};

/// Which SVD factors to produce, for an `m x n` input with `k = min(m, n)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SvdMode {
    /// `U` is `m x m`, `Vᵗ` is `n x n`.
    #[default]
    Full,
    /// `U` is `m x k`, `Vᵗ` is `k x n`.
    Thin,
    /// Singular values only; `U` and `Vᵗ` are never touched.
    ValuesOnly,
}

impl SvdMode {
    /// The `(full_matrices, compute_uv)` flag pair.
    pub fn from_flags(full_matrices: bool, compute_uv: bool) -> Self {
        match (compute_uv, full_matrices) {
            (false, _) => SvdMode::ValuesOnly,
            (true, true) => SvdMode::Full,
            (true, false) => SvdMode::Thin,
        }
    }

    /// Expected `(U, Vᵗ)` shapes, or `None` for values-only.
    pub fn factor_shapes(self, rows: usize, cols: usize) -> Option<((usize, usize), (usize, usize))> {
        let k = rows.min(cols);
        match self {
            SvdMode::Full => Some(((rows, rows), (cols, cols))),
            SvdMode::Thin => Some(((rows, k), (k, cols))),
            SvdMode::ValuesOnly => None,
        }
    }
}

fn require_len(expected: usize, got: usize) -> Result<()> {
    if got < expected {
        return Err(LinalgError::BufferLength { expected, got });
    }
    Ok(())
}

impl Linalg {
    /// Lower Cholesky factor `L` with `a = L·Lᵗ`.
    ///
    /// Only the lower triangle of `a` is read; the strict upper triangle of
    /// `out` is written as zeros. A non-positive pivot is reported as
    /// [`LinalgError::NotPositiveDefinite`].
    ///
    /// ```
    /// use densecore::{Linalg, MatrixView, MatrixViewMut};
    ///
    /// let a = [4.0, 12.0, -16.0, 12.0, 37.0, -43.0, -16.0, -43.0, 98.0];
    /// let a = MatrixView::row_major(3, 3, &a).unwrap();
    /// let mut buf = [0.0; 9];
    /// let mut l = MatrixViewMut::row_major(3, 3, &mut buf).unwrap();
    ///
    /// Linalg::default().cholesky(&a, &mut l).unwrap();
    /// assert_eq!(buf, [2.0, 0.0, 0.0, 6.0, 1.0, 0.0, -8.0, 5.0, 3.0]);
    /// ```
    pub fn cholesky(&self, a: &MatrixView<'_>, out: &mut MatrixViewMut<'_>) -> Result<()> {
        require_square("cholesky", a.shape())?;
        require_shape("cholesky", a.shape(), out.shape())?;
        debug!("cholesky {:?}", a.shape());

        let mut l = DenseMatrix::from_ref(a);
        cholesky_in_place(&mut l)?;
        out.fill_with(|i, j| if j > i { 0.0 } else { l[(i, j)] });
        Ok(())
    }

    /// Singular value decomposition `a = U·diag(s)·Vᵗ`.
    ///
    /// `s` receives `min(rows, cols)` values in descending order. The `vt`
    /// output holds `Vᵗ`, so its rows are the right singular vectors. `u` and
    /// `vt` are required for [`SvdMode::Full`] and [`SvdMode::Thin`] and
    /// ignored for [`SvdMode::ValuesOnly`].
    pub fn svd(
        &self,
        a: &MatrixView<'_>,
        mode: SvdMode,
        u: Option<&mut MatrixViewMut<'_>>,
        s: &mut [f64],
        vt: Option<&mut MatrixViewMut<'_>>,
    ) -> Result<()> {
        let (rows, cols) = a.shape();
        let k = rows.min(cols);
        require_len(k, s.len())?;

        let factors = match mode.factor_shapes(rows, cols) {
            None => None,
            Some((u_shape, vt_shape)) => {
                let (u, vt) = match (u, vt) {
                    (Some(u), Some(vt)) => (u, vt),
                    (u, vt) => {
                        return Err(LinalgError::Arity {
                            op: "svd",
                            expected: 3,
                            got: 1 + usize::from(u.is_some()) + usize::from(vt.is_some()),
                        })
                    }
                };
                require_shape("svd", u_shape, u.shape())?;
                require_shape("svd", vt_shape, vt.shape())?;
                Some((u, vt))
            }
        };
        debug!("svd {:?} {:?}", a.shape(), mode);

        let compute_uv = factors.is_some();
        let max_iter = self.config().max_iter(rows, cols);

        // Wide inputs go through the transpose: Aᵗ = U'·S·V'ᵗ gives U = V', V = U'.
        let (u_full, sv, v_full) = if rows >= cols {
            let parts = svd_tall(a, compute_uv, max_iter)?;
            (parts.u, parts.s, parts.v)
        } else {
            let parts = svd_tall(&a.t(), compute_uv, max_iter)?;
            (parts.v, parts.s, parts.u)
        };

        s[..k].copy_from_slice(&sv[..k]);
        if let (Some((u, vt)), Some(u_full), Some(v_full)) = (factors, u_full, v_full) {
            u.fill_with(|i, j| u_full[(i, j)]);
            vt.fill_with(|i, j| v_full[(j, i)]);
        }
        Ok(())
    }

    /// Eigenvalues of a general square matrix, in the order the Francis QR
    /// iteration leaves them. Complex pairs appear adjacent, positive
    /// imaginary part first. `out` needs at least `rows` slots.
    pub fn eigenvalues(&self, a: &MatrixView<'_>, out: &mut [Complex<f64>]) -> Result<()> {
        let n = require_square("eigenvalues", a.shape())?;
        require_len(n, out.len())?;
        debug!("eigenvalues {:?}", a.shape());

        let values = eigenvalues(a, self.config().max_iter(n, n))?;
        out[..n].copy_from_slice(&values);
        Ok(())
    }

    /// [`eigenvalues`](Self::eigenvalues) written as interleaved
    /// `[re0, im0, re1, im1, ...]` into `out` (at least `2 * rows` long).
    ///
    /// ```
    /// use densecore::{Linalg, MatrixView};
    ///
    /// // 90° rotation: eigenvalues ±i
    /// let a = [0.0, 1.0, -1.0, 0.0];
    /// let a = MatrixView::col_major(2, 2, &a).unwrap();
    /// let mut out = [0.0; 4];
    /// Linalg::default().eigenvalues_interleaved(&a, &mut out).unwrap();
    /// assert_eq!(out, [0.0, 1.0, 0.0, -1.0]);
    /// ```
    pub fn eigenvalues_interleaved(&self, a: &MatrixView<'_>, out: &mut [f64]) -> Result<()> {
        let n = require_square("eigenvalues", a.shape())?;
        require_len(2 * n, out.len())?;
        debug!("eigenvalues {:?}", a.shape());

        let values = eigenvalues(a, self.config().max_iter(n, n))?;
        for (pair, z) in out.chunks_exact_mut(2).zip(&values) {
            pair[0] = z.re;
            pair[1] = z.im;
        }
        Ok(())
    }

    /// Solve `a·x = b` with Householder QR.
    ///
    /// `a` is `rows x cols`, `b` is `rows x nrhs` and `x` is `cols x nrhs`.
    /// Square systems are solved exactly, overdetermined ones in the
    /// least-squares sense, and underdetermined ones with the minimum-norm
    /// solution. A rank-deficient `a` is solved anyway (entries may come out
    /// huge or non-finite), or rejected with [`LinalgError::Singular`] under [`SingularPolicy::Strict`](crate::SingularPolicy::Strict).
    pub fn solve(
        &self,
        a: &MatrixView<'_>,
        b: &MatrixView<'_>,
        x: &mut MatrixViewMut<'_>,
    ) -> Result<()> {
        let (rows, cols) = a.shape();
        let nrhs = b.cols();
        require_shape("solve", (rows, nrhs), b.shape())?;
        require_shape("solve", (cols, nrhs), x.shape())?;
        debug!("solve {:?} with {} right-hand sides", a.shape(), nrhs);

        let tall = rows >= cols;
        let qr = if tall {
            DenseQr::new(a)
        } else {
            DenseQr::from_scratch(DenseMatrix::transposed(a))
        };
        if qr.is_rank_deficient() {
            if self.config().is_strict() {
                return Err(LinalgError::Singular);
            }
            warn!("solve: rank-deficient {:?} system, result may not be finite", a.shape());
        }

        let mut sol = DenseMatrix::zeros(cols, nrhs);
        let mut rhs = vec![0.0; rows];
        let mut col = vec![0.0; cols];
        for j in 0..nrhs {
            for (i, v) in rhs.iter_mut().enumerate() {
                *v = b[(i, j)];
            }
            if tall {
                qr.solve_into(&rhs, &mut col);
            } else {
                qr.solve_transposed_min_norm_into(&rhs, &mut col);
            }
            for (i, v) in col.iter().enumerate() {
                sol[(i, j)] = *v;
            }
        }
        x.copy_from(&sol);
        Ok(())
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
    fn svd_mode_flags() {
        assert_eq!(SvdMode::from_flags(true, true), SvdMode::Full);
        assert_eq!(SvdMode::from_flags(false, true), SvdMode::Thin);
        assert_eq!(SvdMode::from_flags(true, false), SvdMode::ValuesOnly);
        assert_eq!(SvdMode::Thin.factor_shapes(4, 2), Some(((4, 2), (2, 2))));
    }

    #[test]
    fn cholesky_rejects_indefinite_without_writing() {
        let data = [1.0, 2.0, 2.0, 1.0];
        let a = MatrixView::col_major(2, 2, &data).unwrap();
        let mut buf = [5.0; 4];
        let mut out = MatrixViewMut::col_major(2, 2, &mut buf).unwrap();
        assert_eq!(
            Linalg::default().cholesky(&a, &mut out),
            Err(LinalgError::NotPositiveDefinite)
        );
        assert_eq!(buf, [5.0; 4]);
    }

    #[test]
    fn svd_values_only_ignores_factor_outputs() {
        let data = [3.0, 0.0, 0.0, 4.0];
        let a = MatrixView::col_major(2, 2, &data).unwrap();
        let mut s = [0.0; 2];
        Linalg::default()
            .svd(&a, SvdMode::ValuesOnly, None, &mut s, None)
            .unwrap();
        assert_near(s[0], 4.0, TOL, "σ0");
        assert_near(s[1], 3.0, TOL, "σ1");
    }

    #[test]
    fn svd_full_requires_both_factor_outputs() {
        let data = [1.0; 4];
        let a = MatrixView::col_major(2, 2, &data).unwrap();
        let mut s = [0.0; 2];
        let mut ubuf = [0.0; 4];
        let mut u = MatrixViewMut::col_major(2, 2, &mut ubuf).unwrap();
        let err = Linalg::default()
            .svd(&a, SvdMode::Full, Some(&mut u), &mut s, None)
            .unwrap_err();
        assert_eq!(
            err,
            LinalgError::Arity {
                op: "svd",
                expected: 3,
                got: 2
            }
        );
    }

    #[test]
    fn svd_short_values_buffer() {
        let data = [1.0; 6];
        let a = MatrixView::col_major(2, 3, &data).unwrap();
        let mut s = [0.0; 1];
        let err = Linalg::default()
            .svd(&a, SvdMode::ValuesOnly, None, &mut s, None)
            .unwrap_err();
        assert_eq!(err, LinalgError::BufferLength { expected: 2, got: 1 });
    }

    fn check_thin_reconstruction(rows: usize, cols: usize, data: &[f64]) {
        let a = MatrixView::row_major(rows, cols, data).unwrap();
        let k = rows.min(cols);
        let mut ubuf = vec![0.0; rows * k];
        let mut vbuf = vec![0.0; k * cols];
        let mut s = vec![0.0; k];
        {
            let mut u = MatrixViewMut::col_major(rows, k, &mut ubuf).unwrap();
            let mut vt = MatrixViewMut::col_major(k, cols, &mut vbuf).unwrap();
            Linalg::default()
                .svd(&a, SvdMode::Thin, Some(&mut u), &mut s, Some(&mut vt))
                .unwrap();
        }
        let u = MatrixView::col_major(rows, k, &ubuf).unwrap();
        let vt = MatrixView::col_major(k, cols, &vbuf).unwrap();
        for i in 0..rows {
            for j in 0..cols {
                let sum: f64 = (0..k).map(|p| u[(i, p)] * s[p] * vt[(p, j)]).sum();
                assert_near(sum, a[(i, j)], 1e-9, &format!("USVᵗ[({},{})]", i, j));
            }
        }
    }

    #[test]
    fn svd_thin_tall_and_wide() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 0.0, 1.0, -1.0, 2.0];
        check_thin_reconstruction(4, 3, &data);
        check_thin_reconstruction(3, 4, &data);
    }

    #[test]
    fn eigenvalues_buffer_too_short() {
        let data = [1.0; 4];
        let a = MatrixView::col_major(2, 2, &data).unwrap();
        let mut out = [0.0; 3];
        let err = Linalg::default()
            .eigenvalues_interleaved(&a, &mut out)
            .unwrap_err();
        assert_eq!(err, LinalgError::BufferLength { expected: 4, got: 3 });
    }

    #[test]
    fn eigenvalues_complex_out() {
        let data = [2.0, 0.0, 0.0, 3.0];
        let a = MatrixView::col_major(2, 2, &data).unwrap();
        let mut out = [Complex::new(0.0, 0.0); 2];
        Linalg::default().eigenvalues(&a, &mut out).unwrap();
        let mut re: Vec<f64> = out.iter().map(|z| z.re).collect();
        re.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(re, vec![2.0, 3.0]);
        assert!(out.iter().all(|z| z.im == 0.0));
    }

    #[test]
    fn solve_least_squares() {
        // Fit y = c0 + c1*t through (0,1), (1,2), (2,4)
        let a = [1.0, 0.0, 1.0, 1.0, 1.0, 2.0];
        let b = [1.0, 2.0, 4.0];
        let a = MatrixView::row_major(3, 2, &a).unwrap();
        let b = MatrixView::col_major(3, 1, &b).unwrap();
        let mut xbuf = [0.0; 2];
        let mut x = MatrixViewMut::col_major(2, 1, &mut xbuf).unwrap();
        Linalg::default().solve(&a, &b, &mut x).unwrap();
        assert_near(xbuf[0], 5.0 / 6.0, TOL, "c0");
        assert_near(xbuf[1], 1.5, TOL, "c1");
    }

    #[test]
    fn solve_minimum_norm() {
        let a = [1.0, 1.0];
        let b = [2.0];
        let a = MatrixView::row_major(1, 2, &a).unwrap();
        let b = MatrixView::col_major(1, 1, &b).unwrap();
        let mut xbuf = [0.0; 2];
        let mut x = MatrixViewMut::col_major(2, 1, &mut xbuf).unwrap();
        Linalg::default().solve(&a, &b, &mut x).unwrap();
        assert_near(xbuf[0], 1.0, TOL, "x0");
        assert_near(xbuf[1], 1.0, TOL, "x1");
    }

    #[test]
    fn solve_multiple_right_hand_sides() {
        let a = [2.0, 1.0, 1.0, 3.0];
        let b = [3.0, 4.0, 1.0, 3.0]; // columns [3,4] and [1,3]
        let a = MatrixView::row_major(2, 2, &a).unwrap();
        let b = MatrixView::col_major(2, 2, &b).unwrap();
        let mut xbuf = [0.0; 4];
        let mut x = MatrixViewMut::col_major(2, 2, &mut xbuf).unwrap();
        Linalg::default().solve(&a, &b, &mut x).unwrap();
        let expected = [1.0, 1.0, 0.0, 1.0];
        for (got, want) in xbuf.iter().zip(expected) {
            assert_near(*got, want, TOL, "x");
        }
    }

    #[test]
    fn solve_rank_deficient_policies() {
        let a = [1.0, 2.0, 2.0, 4.0];
        let b = [1.0, 1.0];
        let a = MatrixView::row_major(2, 2, &a).unwrap();
        let b = MatrixView::col_major(2, 1, &b).unwrap();

        let strict = Linalg::new(Config::new().with_singular_policy(SingularPolicy::Strict));
        let mut xbuf = [0.0; 2];
        let mut x = MatrixViewMut::col_major(2, 1, &mut xbuf).unwrap();
        assert_eq!(strict.solve(&a, &b, &mut x), Err(LinalgError::Singular));

        assert_eq!(xbuf, [0.0; 2]);

        let mut x = MatrixViewMut::col_major(2, 1, &mut xbuf).unwrap();
        assert!(Linalg::default().solve(&a, &b, &mut x).is_ok());
    }

    #[test]
    fn solve_rhs_row_mismatch() {
        let a = [1.0; 6];
        let b = [1.0; 2];
        let a = MatrixView::row_major(3, 2, &a).unwrap();
        let b = MatrixView::col_major(2, 1, &b).unwrap();
        let mut xbuf = [0.0; 2];
        let mut x = MatrixViewMut::col_major(2, 1, &mut xbuf).unwrap();
        assert!(matches!(
            Linalg::default().solve(&a, &b, &mut x),
            Err(LinalgError::ShapeMismatch { op: "solve", .. })
        ));
    }
}
