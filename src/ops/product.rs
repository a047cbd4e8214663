use log::debug;

use crate::error::{require_shape, Result};
use crate::linalg::{gemm, scale};
use crate::operand::{resolve, Contraction, Operand, Resolved};
use crate::ops::Linalg;
use crate::view::{MatrixView, MatrixViewMut};

fn write_resolved(op: &'static str, r: Resolved<'_>, out: &mut MatrixViewMut<'_>) -> Result<()> {
    require_shape(op, r.shape(), out.shape())?;
    match r {
        Resolved::Scaled { alpha, m } => scale(alpha, &m, out),
        Resolved::Product { a, b } => gemm(&a, &b, out),
    }
    Ok(())
}

impl Linalg {
    /// `dot(left, right)`: scalar scaling, or the ordinary product `A·B`.
    ///
    /// ```
    /// use densecore::{Linalg, MatrixView, MatrixViewMut};
    ///
    /// let a = [1.0, 2.0, 3.0, 4.0];
    /// let a = MatrixView::row_major(2, 2, &a).unwrap();
    /// let mut out = [0.0; 4];
    /// let mut out = MatrixViewMut::row_major(2, 2, &mut out).unwrap();
    ///
    /// Linalg::default().dot(2.0_f64, a, &mut out).unwrap();
    /// assert_eq!(out.as_view().as_slice(), &[2.0, 4.0, 6.0, 8.0]);
    /// ```
    pub fn dot<'a>(
        &self,
        left: impl Into<Operand<'a>>,
        right: impl Into<Operand<'a>>,
        out: &mut MatrixViewMut<'_>,
    ) -> Result<()> {
        let r = resolve("dot", left.into(), right.into(), Contraction::Product)?;
        debug!("dot -> {:?}", r.shape());
        write_resolved("dot", r, out)
    }

    /// `inner(left, right)`: scalar scaling, or `A·Bᵗ` (contraction over the
    /// trailing dimension of both), shape `(A.rows, B.rows)`.
    pub fn inner<'a>(
        &self,
        left: impl Into<Operand<'a>>,
        right: impl Into<Operand<'a>>,
        out: &mut MatrixViewMut<'_>,
    ) -> Result<()> {
        let r = resolve("inner", left.into(), right.into(), Contraction::Trailing)?;
        debug!("inner -> {:?}", r.shape());
        write_resolved("inner", r, out)
    }

    /// `outer(left, right)`: scalar scaling, or `A·B`. With a column vector
    /// on the left and a row vector on the right this is the outer product.
    pub fn outer<'a>(
        &self,
        left: impl Into<Operand<'a>>,
        right: impl Into<Operand<'a>>,
        out: &mut MatrixViewMut<'_>,
    ) -> Result<()> {
        let r = resolve("outer", left.into(), right.into(), Contraction::Product)?;
        debug!("outer -> {:?}", r.shape());
        write_resolved("outer", r, out)
    }

    /// `out = a · b`. No scalar overload.
    pub fn matmul(
        &self,
        a: &MatrixView<'_>,
        b: &MatrixView<'_>,
        out: &mut MatrixViewMut<'_>,
    ) -> Result<()> {
        debug!("matmul {:?} x {:?}", a.shape(), b.shape());
        require_shape("matmul", (a.cols(), b.cols()), b.shape())?;
        require_shape("matmul", (a.rows(), b.cols()), out.shape())?;
        gemm(a, b, out);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LinalgError;

    #[test]
    fn dot_scalar_right() {
        let a = [1.0, 3.0, 2.0, 4.0];
        let a = MatrixView::col_major(2, 2, &a).unwrap();
        let mut buf = [0.0; 4];
        let mut out = MatrixViewMut::col_major(2, 2, &mut buf).unwrap();
        Linalg::default().dot(a, -1.0_f64, &mut out).unwrap();
        assert_eq!(buf, [-1.0, -3.0, -2.0, -4.0]);
    }

    #[test]
    fn inner_contracts_trailing_dimension() {
        // A = [[1,2,3],[4,5,6]], B = [[1,0,1]]  ->  A·Bᵗ = [[4],[10]]
        let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let b = [1.0, 0.0, 1.0];
        let a = MatrixView::row_major(2, 3, &a).unwrap();
        let b = MatrixView::row_major(1, 3, &b).unwrap();
        let mut buf = [0.0; 2];
        let mut out = MatrixViewMut::col_major(2, 1, &mut buf).unwrap();
        Linalg::default().inner(a, b, &mut out).unwrap();
        assert_eq!(buf, [4.0, 10.0]);
    }

    #[test]
    fn outer_of_vectors() {
        let u = [1.0, 2.0];
        let v = [3.0, 4.0, 5.0];
        let u = MatrixView::col_major(2, 1, &u).unwrap();
        let v = MatrixView::col_major(1, 3, &v).unwrap();
        let mut buf = [0.0; 6];
        let mut out = MatrixViewMut::row_major(2, 3, &mut buf).unwrap();
        Linalg::default().outer(u, v, &mut out).unwrap();
        assert_eq!(buf, [3.0, 4.0, 5.0, 6.0, 8.0, 10.0]);
    }

    #[test]
    fn wrong_output_shape_leaves_buffer_untouched() {
        let a = [1.0; 6];
        let a = MatrixView::col_major(2, 3, &a).unwrap();
        let mut buf = [7.0; 6];
        let mut out = MatrixViewMut::col_major(3, 2, &mut buf).unwrap();
        let err = Linalg::default().dot(a, 2.0_f64, &mut out).unwrap_err();
        assert!(matches!(err, LinalgError::ShapeMismatch { op: "dot", .. }));
        assert_eq!(buf, [7.0; 6]);
    }

    #[test]
    fn matmul_shape_mismatch() {
        let a = [0.0; 6];
        let a = MatrixView::col_major(2, 3, &a).unwrap();
        let mut buf = [0.0; 4];
        let mut out = MatrixViewMut::col_major(2, 2, &mut buf).unwrap();
        let err = Linalg::default().matmul(&a, &a, &mut out).unwrap_err();
        assert_eq!(
            err,
            LinalgError::ShapeMismatch {
                op: "matmul",
                expected: (3, 3),
                got: (2, 3)
            }
        );
    }

    #[test]
    fn matmul_row_times_column() {
        let r = [1.0, 2.0, 3.0];
        let c = [4.0, 5.0, 6.0];
        let r = MatrixView::row_major(1, 3, &r).unwrap();
        let c = MatrixView::col_major(3, 1, &c).unwrap();
        let mut buf = [0.0; 1];
        let mut out = MatrixViewMut::col_major(1, 1, &mut buf).unwrap();
        Linalg::default().matmul(&r, &c, &mut out).unwrap();
        assert_eq!(buf[0], 32.0);
    }
}
