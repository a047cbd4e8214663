use core::ops::{Index, IndexMut};

use crate::traits::{MatrixMut, MatrixRef, Scalar};

/// Call-scoped heap matrix used as factorization workspace.
///
/// Column-major `Vec<T>` storage. Never handed to callers: every public
/// operation copies its final result into a caller-owned
/// [`MatrixViewMut`](crate::MatrixViewMut) once all fallible steps are done.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DenseMatrix<T> {
    data: Vec<T>,
    nrows: usize,
    ncols: usize,
}

impl<T: Scalar> DenseMatrix<T> {
    /// `nrows x ncols` matrix of zeros.
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self {
            data: vec![T::zero(); nrows * ncols],
            nrows,
            ncols,
        }
    }

    /// `n x n` identity.
    pub fn eye(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m[(i, i)] = T::one();
        }
        m
    }

    /// Copy of any matrix-like source.
    pub fn from_ref(src: &impl MatrixRef<T>) -> Self {
        Self::from_fn(src.nrows(), src.ncols(), |i, j| *src.get(i, j))
    }

    /// Copy of the transpose of any matrix-like source.
    pub fn transposed(src: &impl MatrixRef<T>) -> Self {
        Self::from_fn(src.ncols(), src.nrows(), |i, j| *src.get(j, i))
    }

    /// Create a matrix by calling `f(row, col)` for each element.
    pub fn from_fn(nrows: usize, ncols: usize, f: impl Fn(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(nrows * ncols);
        for j in 0..ncols {
            for i in 0..nrows {
                data.push(f(i, j));
            }
        }
        Self { data, nrows, ncols }
    }
}

impl<T> DenseMatrix<T> {
    #[inline]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.ncols
    }
}

impl<T> MatrixRef<T> for DenseMatrix<T> {
    #[inline]
    fn nrows(&self) -> usize {
        self.nrows
    }

    #[inline]
    fn ncols(&self) -> usize {
        self.ncols
    }

    #[inline]
    fn get(&self, row: usize, col: usize) -> &T {
        &self.data[col * self.nrows + row]
    }
}

impl<T> MatrixMut<T> for DenseMatrix<T> {
    #[inline]
    fn get_mut(&mut self, row: usize, col: usize) -> &mut T {
        &mut self.data[col * self.nrows + row]
    }
}

impl<T> Index<(usize, usize)> for DenseMatrix<T> {
    type Output = T;

    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &T {
        &self.data[col * self.nrows + row]
    }
}

impl<T> IndexMut<(usize, usize)> for DenseMatrix<T> {
    #[inline]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        &mut self.data[col * self.nrows + row]
    }
}
