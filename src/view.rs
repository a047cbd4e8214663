//! Non-owning rectangular views over caller-supplied `f64` buffers.
//!
//! A view never allocates or frees its buffer. It only records the shape and
//! the [`StorageOrder`] used to map `(row, col)` to a flat offset. Buffers may
//! be longer than `rows * cols`; trailing elements are never touched.

use core::ops::{Index, IndexMut};

use crate::error::{LinalgError, Result};
use crate::traits::{MatrixMut, MatrixRef};

/// Mapping from a 2-D index to a 1-D buffer offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StorageOrder {
    /// `offset = row * cols + col`.
    RowMajor,
    /// `offset = col * rows + row`.
    #[default]
    ColMajor,
}

impl StorageOrder {
    /// The opposite order. Reinterpreting a buffer with the flipped order and
    /// swapped dimensions yields its transpose.
    #[inline]
    pub fn flipped(self) -> Self {
        match self {
            StorageOrder::RowMajor => StorageOrder::ColMajor,
            StorageOrder::ColMajor => StorageOrder::RowMajor,
        }
    }

    #[inline]
    fn offset(self, rows: usize, cols: usize, row: usize, col: usize) -> usize {
        debug_assert!(row < rows && col < cols, "index ({row}, {col}) out of {rows}x{cols}");
        match self {
            StorageOrder::RowMajor => row * cols + col,
            StorageOrder::ColMajor => col * rows + row,
        }
    }
}

fn checked_len(rows: usize, cols: usize, available: usize) -> Result<()> {
    let expected = rows.checked_mul(cols).ok_or(LinalgError::BufferLength {
        expected: usize::MAX,
        got: available,
    })?;
    if available < expected {
        return Err(LinalgError::BufferLength {
            expected,
            got: available,
        });
    }
    Ok(())
}

/// Read-only view of a `rows x cols` matrix.
///
/// ```
/// use densecore::{MatrixView, StorageOrder};
///
/// let data = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
/// let a = MatrixView::new(2, 3, &data, StorageOrder::RowMajor).unwrap();
/// assert_eq!(a[(1, 0)], 4.0);
///
/// // Zero-copy transpose
/// let at = a.t();
/// assert_eq!(at.shape(), (3, 2));
/// assert_eq!(at[(0, 1)], 4.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct MatrixView<'a> {
    data: &'a [f64],
    rows: usize,
    cols: usize,
    order: StorageOrder,
}

impl<'a> MatrixView<'a> {
    /// Wrap `data` as a `rows x cols` matrix in the given order.
    ///
    /// Fails with [`LinalgError::BufferLength`] if `data` holds fewer than
    /// `rows * cols` values.
    pub fn new(rows: usize, cols: usize, data: &'a [f64], order: StorageOrder) -> Result<Self> {
        checked_len(rows, cols, data.len())?;
        Ok(Self {
            data,
            rows,
            cols,
            order,
        })
    }

    /// Column-major view.
    pub fn col_major(rows: usize, cols: usize, data: &'a [f64]) -> Result<Self> {
        Self::new(rows, cols, data, StorageOrder::ColMajor)
    }

    /// Row-major view.
    pub fn row_major(rows: usize, cols: usize, data: &'a [f64]) -> Result<Self> {
        Self::new(rows, cols, data, StorageOrder::RowMajor)
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    pub fn order(&self) -> StorageOrder {
        self.order
    }

    #[inline]
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Number of addressable elements, `rows * cols`.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Transposed view over the same buffer.
    #[inline]
    pub fn t(&self) -> MatrixView<'a> {
        MatrixView {
            data: self.data,
            rows: self.cols,
            cols: self.rows,
            order: self.order.flipped(),
        }
    }

    /// Underlying buffer, exactly as supplied.
    #[inline]
    pub fn as_slice(&self) -> &'a [f64] {
        self.data
    }
}

impl MatrixRef<f64> for MatrixView<'_> {
    #[inline]
    fn nrows(&self) -> usize {
        self.rows
    }

    #[inline]
    fn ncols(&self) -> usize {
        self.cols
    }

    #[inline]
    fn get(&self, row: usize, col: usize) -> &f64 {
        &self.data[self.order.offset(self.rows, self.cols, row, col)]
    }
}

impl Index<(usize, usize)> for MatrixView<'_> {
    type Output = f64;

    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        self.get(row, col)
    }
}

/// Mutable view of a `rows x cols` matrix; the destination of every result.
///
/// ```
/// use densecore::MatrixViewMut;
///
/// let mut buf = [0.0; 4];
/// let mut m = MatrixViewMut::col_major(2, 2, &mut buf).unwrap();
/// m[(0, 1)] = 5.0;
/// assert_eq!(buf[2], 5.0);
/// ```
#[derive(Debug)]
pub struct MatrixViewMut<'a> {
    data: &'a mut [f64],
    rows: usize,
    cols: usize,
    order: StorageOrder,
}

impl<'a> MatrixViewMut<'a> {
    /// Wrap `data` as a mutable `rows x cols` matrix in the given order.
    pub fn new(
        rows: usize,
        cols: usize,
        data: &'a mut [f64],
        order: StorageOrder,
    ) -> Result<Self> {
        checked_len(rows, cols, data.len())?;
        Ok(Self {
            data,
            rows,
            cols,
            order,
        })
    }

    /// Column-major mutable view.
    pub fn col_major(rows: usize, cols: usize, data: &'a mut [f64]) -> Result<Self> {
        Self::new(rows, cols, data, StorageOrder::ColMajor)
    }

    /// Row-major mutable view.
    pub fn row_major(rows: usize, cols: usize, data: &'a mut [f64]) -> Result<Self> {
        Self::new(rows, cols, data, StorageOrder::RowMajor)
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    pub fn order(&self) -> StorageOrder {
        self.order
    }

    #[inline]
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read-only reborrow.
    #[inline]
    pub fn as_view(&self) -> MatrixView<'_> {
        MatrixView {
            data: &*self.data,
            rows: self.rows,
            cols: self.cols,
            order: self.order,
        }
    }

    /// Set every addressable element to `value`.
    pub fn fill(&mut self, value: f64) {
        let n = self.len();
        self.data[..n].iter_mut().for_each(|x| *x = value);
    }

    /// Fill from `f(row, col)`, visiting elements in storage order.
    pub fn fill_with(&mut self, mut f: impl FnMut(usize, usize) -> f64) {
        match self.order {
            StorageOrder::RowMajor => {
                for i in 0..self.rows {
                    for j in 0..self.cols {
                        self.data[i * self.cols + j] = f(i, j);
                    }
                }
            }
            StorageOrder::ColMajor => {
                for j in 0..self.cols {
                    for i in 0..self.rows {
                        self.data[j * self.rows + i] = f(i, j);
                    }
                }
            }
        }
    }

    /// Copy every element of `src`, which must have the same shape.
    pub(crate) fn copy_from(&mut self, src: &impl MatrixRef<f64>) {
        debug_assert_eq!((src.nrows(), src.ncols()), self.shape());
        self.fill_with(|i, j| *src.get(i, j));
    }
}

impl MatrixRef<f64> for MatrixViewMut<'_> {
    #[inline]
    fn nrows(&self) -> usize {
        self.rows
    }

    #[inline]
    fn ncols(&self) -> usize {
        self.cols
    }

    #[inline]
    fn get(&self, row: usize, col: usize) -> &f64 {
        &self.data[self.order.offset(self.rows, self.cols, row, col)]
    }
}

impl MatrixMut<f64> for MatrixViewMut<'_> {
    #[inline]
    fn get_mut(&mut self, row: usize, col: usize) -> &mut f64 {
        &mut self.data[self.order.offset(self.rows, self.cols, row, col)]
    }
}

impl Index<(usize, usize)> for MatrixViewMut<'_> {
    type Output = f64;

    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        self.get(row, col)
    }
}

impl IndexMut<(usize, usize)> for MatrixViewMut<'_> {
    #[inline]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        self.get_mut(row, col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn col_major_indexing() {
        // col0=[1,3], col1=[2,4]
        let data = [1.0, 3.0, 2.0, 4.0];
        let m = MatrixView::col_major(2, 2, &data).unwrap();
        assert_eq!(m[(0, 0)], 1.0);
        assert_eq!(m[(1, 0)], 3.0);
        assert_eq!(m[(0, 1)], 2.0);
        assert_eq!(m[(1, 1)], 4.0);
    }

    #[test]
    fn row_major_indexing() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let m = MatrixView::row_major(2, 3, &data).unwrap();
        assert_eq!(m[(0, 2)], 3.0);
        assert_eq!(m[(1, 0)], 4.0);
        assert_eq!(m[(1, 2)], 6.0);
    }

    #[test]
    fn transpose_flips_order() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let m = MatrixView::col_major(2, 3, &data).unwrap();
        let t = m.t();
        assert_eq!(t.shape(), (3, 2));
        assert_eq!(t.order(), StorageOrder::RowMajor);
        for i in 0..2 {
            for j in 0..3 {
                assert_eq!(m[(i, j)], t[(j, i)]);
            }
        }
        assert_eq!(t.t().order(), StorageOrder::ColMajor);
    }

    #[test]
    fn short_buffer_rejected() {
        let data = [1.0, 2.0, 3.0];
        let err = MatrixView::col_major(2, 2, &data).unwrap_err();
        assert_eq!(err, LinalgError::BufferLength { expected: 4, got: 3 });
    }

    #[test]
    fn overflowing_shape_rejected() {
        let data = [0.0; 1];
        assert!(MatrixView::row_major(usize::MAX, 2, &data).is_err());
    }

    #[test]
    fn longer_buffer_accepted_tail_untouched() {
        let mut data = [9.0; 5];
        let mut m = MatrixViewMut::row_major(2, 2, &mut data).unwrap();
        m.fill(0.0);
        assert_eq!(data, [0.0, 0.0, 0.0, 0.0, 9.0]);
    }

    #[test]
    fn empty_view() {
        let data: [f64; 0] = [];
        let m = MatrixView::col_major(0, 3, &data).unwrap();
        assert!(m.is_empty());
        assert_eq!(m.shape(), (0, 3));
    }

    #[test]
    fn fill_with_respects_order() {
        let mut data = [0.0; 6];
        {
            let mut m = MatrixViewMut::row_major(2, 3, &mut data).unwrap();
            m.fill_with(|i, j| (i * 3 + j) as f64);
        }
        assert_eq!(data, [0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        {
            let mut m = MatrixViewMut::col_major(2, 3, &mut data).unwrap();
            m.fill_with(|i, j| (i * 3 + j) as f64);
        }
        assert_eq!(data, [0.0, 3.0, 1.0, 4.0, 2.0, 5.0]);
    }
}
