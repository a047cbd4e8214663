use num_traits::NumCast;

use crate::dense::DenseMatrix;
use crate::traits::{FloatScalar, MatrixMut, MatrixRef};

/// QR decomposition in place using Householder reflections.
///
/// On return, `a` contains the packed QR factorization:
/// - Upper triangle (including diagonal): R
/// - Lower triangle (excluding diagonal): Householder vectors (scaled)
///
/// `tau` is filled with the Householder scalar factors (length N).
///
/// Works on rectangular matrices (M >= N). An exactly-zero column gets
/// `tau = 0` (identity reflector) and a zero on the diagonal of R.
pub(crate) fn qr_in_place<T: FloatScalar>(a: &mut impl MatrixMut<T>, tau: &mut [T]) {
    let m = a.nrows();
    let n = a.ncols();
    debug_assert!(m >= n, "QR decomposition requires M >= N");
    debug_assert_eq!(tau.len(), n);

    for col in 0..n {
        let mut norm_sq = T::zero();
        for i in col..m {
            let v = *a.get(i, col);
            norm_sq = norm_sq + v * v;
        }

        if norm_sq == T::zero() {
            tau[col] = T::zero();
            continue;
        }

        let norm = norm_sq.sqrt();
        let a_col_col = *a.get(col, col);

        // sigma = sign(a[col,col]) * ||x|| avoids cancellation in v0.
        let sigma = if a_col_col < T::zero() { -norm } else { norm };

        // v[col] = a[col,col] + sigma; rest of v is a[col+1:m, col] (stored in-place)
        let v0 = a_col_col + sigma;
        let tau_val = v0 / sigma;
        tau[col] = tau_val;

        // Scale the sub-diagonal entries by 1/v0 for storage
        for i in (col + 1)..m {
            let val = *a.get(i, col) / v0;
            *a.get_mut(i, col) = val;
        }

        // Apply H to trailing columns: A[col:m, col+1:n] -= tau * v * (v^T * A)
        for j in (col + 1)..n {
            let mut dot = *a.get(col, j);
            for i in (col + 1)..m {
                dot = dot + *a.get(i, col) * *a.get(i, j);
            }
            dot = dot * tau_val;

            *a.get_mut(col, j) = *a.get(col, j) - dot;
            for i in (col + 1)..m {
                let vi = *a.get(i, col);
                let old = *a.get(i, j);
                *a.get_mut(i, j) = old - dot * vi;
            }
        }

        // Store -sigma (the R diagonal entry) in a[col, col]
        *a.get_mut(col, col) = -sigma;
    }
}

/// Householder QR of an M x N matrix (M >= N), held in scratch storage.
#[derive(Debug)]
pub(crate) struct DenseQr<T> {
    qr: DenseMatrix<T>,
    tau: Vec<T>,
}

impl<T: FloatScalar> DenseQr<T> {
    /// Factor `a`; requires `a.nrows() >= a.ncols()`.
    pub fn new(a: &impl MatrixRef<T>) -> Self {
        Self::from_scratch(DenseMatrix::from_ref(a))
    }

    /// Factor a matrix already copied into scratch.
    pub fn from_scratch(mut qr: DenseMatrix<T>) -> Self {
        let mut tau = vec![T::zero(); qr.ncols()];
        qr_in_place(&mut qr, &mut tau);
        Self { qr, tau }
    }

    /// Whether some diagonal entry of R is negligible
    /// (`|r_ii| <= max(M, N) * eps * max |r_jj|`).
    pub fn is_rank_deficient(&self) -> bool {
        let n = self.qr.ncols();
        if n == 0 {
            return false;
        }
        let mut max_r = T::zero();
        let mut min_r = T::infinity();
        for i in 0..n {
            let r = self.qr[(i, i)].abs();
            max_r = max_r.max(r);
            min_r = min_r.min(r);
        }
        let dim = <T as NumCast>::from(self.qr.nrows().max(n)).unwrap_or_else(T::one);
        max_r == T::zero() || min_r <= dim * T::epsilon() * max_r
    }

    /// Overwrite `y` (length M) with `Q^T y`.
    fn apply_qt(&self, y: &mut [T]) {
        let m = self.qr.nrows();
        for col in 0..self.qr.ncols() {
            let tau_val = self.tau[col];
            let mut dot = y[col];
            for i in (col + 1)..m {
                dot = dot + self.qr[(i, col)] * y[i];
            }
            dot = dot * tau_val;

            y[col] = y[col] - dot;
            for i in (col + 1)..m {
                y[i] = y[i] - dot * self.qr[(i, col)];
            }
        }
    }

    /// Overwrite `y` (length M) with `Q y`, applying reflections in reverse.
    fn apply_q(&self, y: &mut [T]) {
        let m = self.qr.nrows();
        for col in (0..self.qr.ncols()).rev() {
            let tau_val = self.tau[col];
            let mut dot = y[col];
            for i in (col + 1)..m {
                dot = dot + self.qr[(i, col)] * y[i];
            }
            dot = dot * tau_val;

            y[col] = y[col] - dot;
            for i in (col + 1)..m {
                y[i] = y[i] - dot * self.qr[(i, col)];
            }
        }
    }

    /// Least-squares solve `min ||A x - b||` for one right-hand side.
    ///
    /// `b` has length M, `x` has length N. Computes `x = R^{-1} Q^T b`;
    /// a zero on the diagonal of R propagates as non-finite entries.
    pub fn solve_into(&self, b: &[T], x: &mut [T]) {
        let n = self.qr.ncols();
        let mut qtb = b.to_vec();
        self.apply_qt(&mut qtb);

        for i in (0..n).rev() {
            let mut sum = qtb[i];
            for j in (i + 1)..n {
                sum = sum - self.qr[(i, j)] * x[j];
            }
            x[i] = sum / self.qr[(i, i)];
        }
    }

    /// Minimum-norm solution of the underdetermined system `A^T x = b`,
    /// where this decomposition was computed from `A` (M x N, M >= N).
    ///
    /// `b` has length N, `x` has length M. With `A = Q R`, solves
    /// `R^T z = b` by forward substitution and returns `x = Q [z; 0]`.
    pub fn solve_transposed_min_norm_into(&self, b: &[T], x: &mut [T]) {
        let m = self.qr.nrows();
        let n = self.qr.ncols();
        for i in 0..n {
            let mut sum = b[i];
            for j in 0..i {
                sum = sum - self.qr[(j, i)] * x[j];
            }
            x[i] = sum / self.qr[(i, i)];
        }
        for v in x.iter_mut().take(m).skip(n) {
            *v = T::zero();
        }
        self.apply_q(&mut x[..m]);
    }
}
