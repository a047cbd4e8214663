//! Numerical kernels.
//!
//! Everything here is generic over [`MatrixRef`] / [`MatrixMut`] and works
//! in place on its arguments. Shape validation happens in [`crate::ops`]
//! before any kernel runs, so kernels only `debug_assert!` their
//! preconditions.

pub(crate) mod cholesky;
pub(crate) mod hessenberg;
pub(crate) mod lu;
pub(crate) mod qr;
pub(crate) mod schur;
pub(crate) mod svd;

pub(crate) use cholesky::cholesky_in_place;
pub(crate) use lu::DenseLu;
pub(crate) use qr::DenseQr;
pub(crate) use schur::eigenvalues;
pub(crate) use svd::svd_tall;

use num_traits::{Float, Zero};

use crate::traits::{MatrixMut, MatrixRef, Scalar};

/// `c = a * b`.
///
/// Loop order is i-k-j so the inner loop streams a row of `b`.
/// `c` must already be `a.nrows() x b.ncols()` and must not alias `a` or `b`.
pub(crate) fn gemm<T: Scalar>(
    a: &impl MatrixRef<T>,
    b: &impl MatrixRef<T>,
    c: &mut impl MatrixMut<T>,
) {
    let m = a.nrows();
    let n = a.ncols();
    let p = b.ncols();
    debug_assert_eq!(n, b.nrows());
    debug_assert_eq!((c.nrows(), c.ncols()), (m, p));

    for i in 0..m {
        for j in 0..p {
            *c.get_mut(i, j) = T::zero();
        }
    }
    for i in 0..m {
        for k in 0..n {
            let a_ik = *a.get(i, k);
            for j in 0..p {
                let c_ij = c.get_mut(i, j);
                *c_ij = *c_ij + a_ik * *b.get(k, j);
            }
        }
    }
}

/// `c = alpha * a`.
pub(crate) fn scale<T: Scalar>(alpha: T, a: &impl MatrixRef<T>, c: &mut impl MatrixMut<T>) {
    debug_assert_eq!((c.nrows(), c.ncols()), (a.nrows(), a.ncols()));
    for j in 0..a.ncols() {
        for i in 0..a.nrows() {
            *c.get_mut(i, j) = alpha * *a.get(i, j);
        }
    }
}

/// Givens rotation `(c, s)` such that `[c s; -s c]^T [a; b] = [r; 0]`.
#[inline]
pub(crate) fn givens<R: Float + Zero>(a: R, b: R) -> (R, R) {
    if b == R::zero() {
        (R::one(), R::zero())
    } else if b.abs() > a.abs() {
        let t = a / b;
        let s = R::one() / (R::one() + t * t).sqrt();
        (s * t, s)
    } else {
        let t = b / a;
        let c = R::one() / (R::one() + t * t).sqrt();
        (c, c * t)
    }
}
