use num_traits::NumCast;

use crate::dense::DenseMatrix;
use crate::traits::{FloatScalar, MatrixMut, MatrixRef};

/// Perform LU decomposition with partial pivoting, in place.
///
/// On return, `a` contains both L and U packed together:
/// - Upper triangle (including diagonal): U
/// - Lower triangle (excluding diagonal): L (diagonal of L is implicitly 1)
///
/// `perm` is filled with the row permutation indices.
/// Returns `true` if the number of row swaps was even.
///
/// A column whose candidate pivots are all exactly zero is skipped, leaving
/// a zero on the diagonal of U; the factorization itself never fails.
pub(crate) fn lu_in_place<T: FloatScalar>(a: &mut impl MatrixMut<T>, perm: &mut [usize]) -> bool {
    let n = a.nrows();
    debug_assert_eq!(n, a.ncols(), "LU decomposition requires a square matrix");
    debug_assert_eq!(n, perm.len(), "permutation slice length must match matrix size");

    for (i, p) in perm.iter_mut().enumerate() {
        *p = i;
    }

    let mut even = true;

    for col in 0..n {
        // Partial pivoting: find row with largest modulus in this column
        let mut max_row = col;
        let mut max_val = a.get(col, col).abs();
        for row in (col + 1)..n {
            let val = a.get(row, col).abs();
            if val > max_val {
                max_val = val;
                max_row = row;
            }
        }

        if max_val == T::zero() {
            continue;
        }

        if max_row != col {
            perm.swap(col, max_row);
            for j in 0..n {
                let tmp = *a.get(col, j);
                *a.get_mut(col, j) = *a.get(max_row, j);
                *a.get_mut(max_row, j) = tmp;
            }
            even = !even;
        }

        let inv_pivot = T::one() / *a.get(col, col);

        // Scale sub-column: a[col+1:n, col] /= pivot
        for i in (col + 1)..n {
            let v = a.get_mut(i, col);
            *v = *v * inv_pivot;
        }

        // Rank-1 update: a[col+1:n, j] -= a[col, j] * a[col+1:n, col]
        for j in (col + 1)..n {
            let a_col_j = *a.get(col, j);
            if a_col_j == T::zero() {
                continue;
            }
            for i in (col + 1)..n {
                let l = *a.get(i, col);
                let v = a.get_mut(i, j);
                *v = *v - l * a_col_j;
            }
        }
    }

    even
}

/// Solve Ax = b given the packed LU decomposition and permutation.
///
/// `b` (input) and `x` (output) are separate slices of length n.
/// A zero pivot propagates as non-finite entries in `x`.
pub(crate) fn lu_solve<T: FloatScalar>(
    lu: &impl MatrixRef<T>,
    perm: &[usize],
    b: &[T],
    x: &mut [T],
) {
    let n = lu.nrows();

    // Apply permutation and forward substitution (solve Ly = Pb)
    for i in 0..n {
        let mut sum = b[perm[i]];
        for j in 0..i {
            sum = sum - *lu.get(i, j) * x[j];
        }
        x[i] = sum;
    }

    // Back substitution (solve Ux = y)
    for i in (0..n).rev() {
        let mut sum = x[i];
        for j in (i + 1)..n {
            sum = sum - *lu.get(i, j) * x[j];
        }
        x[i] = sum / *lu.get(i, i);
    }
}

/// LU decomposition of a square matrix, held in scratch storage.
#[derive(Debug)]
pub(crate) struct DenseLu<T> {
    lu: DenseMatrix<T>,
    perm: Vec<usize>,
    even: bool,
}

impl<T: FloatScalar> DenseLu<T> {
    /// Factor a copy of `a`, which must be square.
    pub fn new(a: &impl MatrixRef<T>) -> Self {
        let n = a.nrows();
        debug_assert_eq!(n, a.ncols());
        let mut lu = DenseMatrix::from_ref(a);
        let mut perm = vec![0usize; n];
        let even = lu_in_place(&mut lu, &mut perm);
        Self { lu, perm, even }
    }

    /// Determinant: signed product of the pivots. Exactly zero when a
    /// column had no non-zero pivot.
    pub fn det(&self) -> T {
        let n = self.lu.nrows();
        let mut d = if self.even { T::one() } else { -T::one() };
        for i in 0..n {
            d = d * self.lu[(i, i)];
        }
        d
    }

    /// Whether some pivot is negligible relative to the largest one
    /// (`|u_ii| <= n * eps * max |u_jj|`).
    pub fn is_singular(&self) -> bool {
        let n = self.lu.nrows();
        if n == 0 {
            return false;
        }
        let mut max_pivot = T::zero();
        let mut min_pivot = T::infinity();
        for i in 0..n {
            let p = self.lu[(i, i)].abs();
            max_pivot = max_pivot.max(p);
            min_pivot = min_pivot.min(p);
        }
        let n_t = <T as NumCast>::from(n).unwrap_or_else(T::one);
        max_pivot == T::zero() || min_pivot <= n_t * T::epsilon() * max_pivot
    }

    /// Solve `A x = b` for a single right-hand side.
    pub fn solve_into(&self, b: &[T], x: &mut [T]) {
        lu_solve(&self.lu, &self.perm, b, x);
    }

    /// Matrix inverse, one unit column at a time.
    pub fn inverse(&self) -> DenseMatrix<T> {
        let n = self.lu.nrows();
        let mut inv = DenseMatrix::zeros(n, n);
        let mut e = vec![T::zero(); n];
        let mut col_buf = vec![T::zero(); n];

        for col in 0..n {
            if col > 0 {
                e[col - 1] = T::zero();
            }
            e[col] = T::one();

            self.solve_into(&e, &mut col_buf);

            for (row, v) in col_buf.iter().enumerate() {
                inv[(row, col)] = *v;
            }
        }

        inv
    }
}
