use log::debug;

use crate::error::{require_shape, require_square, Result};
use crate::ops::Linalg;
use crate::view::{MatrixView, MatrixViewMut};

fn indicator(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

impl Linalg {
    /// Square identity; `out` must be `n x n`.
    pub fn identity(&self, out: &mut MatrixViewMut<'_>) -> Result<()> {
        require_square("identity", out.shape())?;
        debug!("identity {:?}", out.shape());
        out.fill_with(|i, j| indicator(i == j));
        Ok(())
    }

    /// Ones where `row == col`, zeros elsewhere, for any `out` shape.
    ///
    /// ```
    /// use densecore::{Linalg, MatrixViewMut};
    ///
    /// let mut buf = [9.0; 6];
    /// let mut out = MatrixViewMut::row_major(2, 3, &mut buf).unwrap();
    /// Linalg::default().eye(&mut out).unwrap();
    /// assert_eq!(buf, [1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
    /// ```
    pub fn eye(&self, out: &mut MatrixViewMut<'_>) -> Result<()> {
        debug!("eye {:?}", out.shape());
        out.fill_with(|i, j| indicator(i == j));
        Ok(())
    }

    /// Ones at and below the diagonal (`col <= row`), zeros above.
    pub fn tri(&self, out: &mut MatrixViewMut<'_>) -> Result<()> {
        debug!("tri {:?}", out.shape());
        out.fill_with(|i, j| indicator(j <= i));
        Ok(())
    }

    /// Copy of `a` with the strict upper triangle (`col > row`) zeroed.
    pub fn tril(&self, a: &MatrixView<'_>, out: &mut MatrixViewMut<'_>) -> Result<()> {
        require_shape("tril", a.shape(), out.shape())?;
        debug!("tril {:?}", a.shape());
        out.fill_with(|i, j| if j > i { 0.0 } else { a[(i, j)] });
        Ok(())
    }

    /// Copy of `a` with the strict lower triangle (`col < row`) zeroed.
    pub fn triu(&self, a: &MatrixView<'_>, out: &mut MatrixViewMut<'_>) -> Result<()> {
        require_shape("triu", a.shape(), out.shape())?;
        debug!("triu {:?}", a.shape());
        out.fill_with(|i, j| if j < i { 0.0 } else { a[(i, j)] });
        Ok(())
    }

    /// In-place [`tril`](Self::tril): each cell is read before it is written.
    pub fn tril_in_place(&self, m: &mut MatrixViewMut<'_>) {
        debug!("tril_in_place {:?}", m.shape());
        for j in 0..m.cols() {
            for i in 0..j.min(m.rows()) {
                m[(i, j)] = 0.0;
            }
        }
    }

    /// In-place [`triu`](Self::triu).
    pub fn triu_in_place(&self, m: &mut MatrixViewMut<'_>) {
        debug!("triu_in_place {:?}", m.shape());
        for j in 0..m.cols() {
            for i in (j + 1)..m.rows() {
                m[(i, j)] = 0.0;
            }
        }
    }
}
