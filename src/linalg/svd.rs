use log::trace;

use crate::dense::DenseMatrix;
use crate::error::{LinalgError, Result};
use crate::linalg::givens;
use crate::traits::{FloatScalar, MatrixMut, MatrixRef};

// ── Householder bidiagonalization ───────────────────────────────────

/// Householder bidiagonalization: reduce an M×N matrix (M ≥ N) to upper
/// bidiagonal form via orthogonal transforms.
///
/// On return:
/// - `diag[0..n]` contains the bidiagonal diagonal
/// - `off_diag[0..n-1]` contains the bidiagonal superdiagonal
/// - `u` (M×M) accumulates the left orthogonal transform
/// - `v` (N×N) accumulates the right orthogonal transform
///
/// The result satisfies `A = U · B · V^T` where B = bidiag(diag, off_diag).
pub(crate) fn bidiagonalize<T: FloatScalar>(
    a: &mut impl MatrixMut<T>,
    diag: &mut [T],
    off_diag: &mut [T],
    u: &mut impl MatrixMut<T>,
    v: &mut impl MatrixMut<T>,
    compute_u: bool,
    compute_v: bool,
) {
    let m = a.nrows();
    let n = a.ncols();
    debug_assert!(m >= n, "bidiagonalize requires M >= N");
    debug_assert!(diag.len() >= n);
    debug_assert!(off_diag.len() + 1 >= n);

    if compute_u {
        for i in 0..m {
            for j in 0..m {
                *u.get_mut(i, j) = if i == j { T::one() } else { T::zero() };
            }
        }
    }
    if compute_v {
        for i in 0..n {
            for j in 0..n {
                *v.get_mut(i, j) = if i == j { T::one() } else { T::zero() };
            }
        }
    }

    for k in 0..n {
        // ── Left Householder: zero out a[k+1:m, k] ──
        let mut norm_sq = T::zero();
        for i in k..m {
            let val = *a.get(i, k);
            norm_sq = norm_sq + val * val;
        }

        if norm_sq > T::zero() {
            let norm = norm_sq.sqrt();
            let akk = *a.get(k, k);
            let sigma = if akk < T::zero() { -norm } else { norm };

            let v0 = akk + sigma;
            *a.get_mut(k, k) = v0;

            for i in (k + 1)..m {
                let val = *a.get(i, k) / v0;
                *a.get_mut(i, k) = val;
            }

            let tau = v0 / sigma;

            // A[k:m, k+1:n] -= tau * v * (v^T * A)
            for j in (k + 1)..n {
                let mut dot = *a.get(k, j);
                for i in (k + 1)..m {
                    dot = dot + *a.get(i, k) * *a.get(i, j);
                }
                dot = dot * tau;

                *a.get_mut(k, j) = *a.get(k, j) - dot;
                for i in (k + 1)..m {
                    let vi = *a.get(i, k);
                    *a.get_mut(i, j) = *a.get(i, j) - dot * vi;
                }
            }

            // U = U * (I - tau * v * v^T)
            if compute_u {
                for row in 0..m {
                    let mut dot = *u.get(row, k);
                    for i in (k + 1)..m {
                        dot = dot + *u.get(row, i) * *a.get(i, k);
                    }
                    dot = dot * tau;

                    *u.get_mut(row, k) = *u.get(row, k) - dot;
                    for i in (k + 1)..m {
                        let vi = *a.get(i, k);
                        *u.get_mut(row, i) = *u.get(row, i) - dot * vi;
                    }
                }
            }

            diag[k] = -sigma;
        } else {
            diag[k] = *a.get(k, k);
        }

        // ── Right Householder: zero out a[k, k+2:n] ──
        if k + 2 < n {
            let mut norm_sq = T::zero();
            for j in (k + 1)..n {
                let val = *a.get(k, j);
                norm_sq = norm_sq + val * val;
            }

            if norm_sq > T::zero() {
                let norm = norm_sq.sqrt();
                let ak_k1 = *a.get(k, k + 1);
                let sigma = if ak_k1 < T::zero() { -norm } else { norm };

                let v0 = ak_k1 + sigma;
                *a.get_mut(k, k + 1) = v0;

                for j in (k + 2)..n {
                    let val = *a.get(k, j) / v0;
                    *a.get_mut(k, j) = val;
                }

                let tau = v0 / sigma;

                for i in (k + 1)..m {
                    let mut dot = *a.get(i, k + 1);
                    for j in (k + 2)..n {
                        dot = dot + *a.get(i, j) * *a.get(k, j);
                    }
                    dot = dot * tau;

                    *a.get_mut(i, k + 1) = *a.get(i, k + 1) - dot;
                    for j in (k + 2)..n {
                        let vj = *a.get(k, j);
                        *a.get_mut(i, j) = *a.get(i, j) - dot * vj;
                    }
                }

                if compute_v {
                    for row in 0..n {
                        let mut dot = *v.get(row, k + 1);
                        for j in (k + 2)..n {
                            dot = dot + *v.get(row, j) * *a.get(k, j);
                        }
                        dot = dot * tau;

                        *v.get_mut(row, k + 1) = *v.get(row, k + 1) - dot;
                        for j in (k + 2)..n {
                            let vj = *a.get(k, j);
                            *v.get_mut(row, j) = *v.get(row, j) - dot * vj;
                        }
                    }
                }

                off_diag[k] = -sigma;
            } else {
                off_diag[k] = *a.get(k, k + 1);
            }
        } else if k + 1 < n {
            off_diag[k] = *a.get(k, k + 1);
        }
    }
}

// ── Golub-Kahan bidiagonal QR ───────────────────────────────────────

fn negate_column<T: FloatScalar>(m: &mut impl MatrixMut<T>, col: usize) {
    for row in 0..m.nrows() {
        let val = *m.get(row, col);
        *m.get_mut(row, col) = -val;
    }
}

fn swap_columns<T: FloatScalar>(m: &mut impl MatrixMut<T>, a: usize, b: usize) {
    for row in 0..m.nrows() {
        let tmp = *m.get(row, a);
        *m.get_mut(row, a) = *m.get(row, b);
        *m.get_mut(row, b) = tmp;
    }
}

/// Golub-Kahan implicit-shift QR iteration on a bidiagonal matrix.
///
/// On return `diag` holds the non-negative singular values sorted
/// descending and `off_diag` is zeroed. Rotations are accumulated into the
/// columns of `u` and `v` when requested.
pub(crate) fn bidiagonal_qr<T: FloatScalar>(
    diag: &mut [T],
    off_diag: &mut [T],
    u: &mut impl MatrixMut<T>,
    v: &mut impl MatrixMut<T>,
    compute_u: bool,
    compute_v: bool,
    max_iter: usize,
) -> Result<()> {
    let n = diag.len();
    let eps = T::epsilon();
    let zero = T::zero();

    // Scale for the zero-diagonal test
    let mut bnorm = zero;
    for i in 0..n {
        let e = if i + 1 < n { off_diag[i].abs() } else { zero };
        bnorm = bnorm.max(diag[i].abs() + e);
    }

    let mut iter = 0usize;
    let mut hi = n.saturating_sub(1);

    while hi > 0 {
        // Deflation: trailing off-diagonal negligible
        let threshold = eps * (diag[hi - 1].abs() + diag[hi].abs());
        if off_diag[hi - 1].abs() <= threshold {
            off_diag[hi - 1] = zero;
            hi -= 1;
            continue;
        }

        // Start of the unreduced block
        let mut lo = hi - 1;
        while lo > 0 {
            let threshold = eps * (diag[lo - 1].abs() + diag[lo].abs());
            if off_diag[lo - 1].abs() <= threshold {
                off_diag[lo - 1] = zero;
                break;
            }
            lo -= 1;
        }

        iter += 1;
        if iter > max_iter {
            return Err(LinalgError::ConvergenceFailure { iterations: max_iter });
        }

        // A zero on the diagonal breaks the shift; chase its
        // off-diagonal neighbour out with left rotations instead.
        let mut found_zero = false;
        for idx in lo..hi {
            if diag[idx].abs() <= eps * bnorm {
                diag[idx] = zero;
                let mut z = off_diag[idx];
                off_diag[idx] = zero;
                for j in (idx + 1)..=hi {
                    let (c, s) = givens(diag[j], z);
                    diag[j] = c * diag[j] + s * z;
                    if j < hi {
                        z = -(s * off_diag[j]);
                        off_diag[j] = c * off_diag[j];
                    }
                    if compute_u {
                        for row in 0..u.nrows() {
                            let uj = *u.get(row, j);
                            let ui = *u.get(row, idx);
                            *u.get_mut(row, j) = c * uj + s * ui;
                            *u.get_mut(row, idx) = c * ui - s * uj;
                        }
                    }
                }
                found_zero = true;
                break;
            }
        }
        if found_zero {
            continue;
        }

        // Wilkinson shift from trailing 2×2 of B^T B
        let d_hi = diag[hi];
        let d_hi1 = diag[hi - 1];
        let e_hi1 = off_diag[hi - 1];
        let e_hi2 = if hi >= 2 && hi - 2 >= lo {
            off_diag[hi - 2]
        } else {
            zero
        };

        let t11 = d_hi1 * d_hi1 + e_hi2 * e_hi2;
        let t12 = d_hi1 * e_hi1;
        let t22 = d_hi * d_hi + e_hi1 * e_hi1;

        let two = T::one() + T::one();
        let d = (t11 - t22) / two;
        let sign_d = if d >= zero { T::one() } else { -T::one() };
        let mu = t22 - t12 * t12 / (d + sign_d * (d * d + t12 * t12).sqrt());

        // Implicit QR chase
        let mut x = diag[lo] * diag[lo] - mu;
        let mut z = diag[lo] * off_diag[lo];

        for k in lo..hi {
            // Right rotation on columns k, k+1
            let (c, s) = givens(x, z);
            if k > lo {
                off_diag[k - 1] = c * x + s * z;
            }

            let dk = diag[k];
            let ek = off_diag[k];
            let dk1 = diag[k + 1];

            diag[k] = c * dk + s * ek;
            off_diag[k] = c * ek - s * dk;
            let bulge = s * dk1;
            diag[k + 1] = c * dk1;

            if compute_v {
                for row in 0..v.nrows() {
                    let vk = *v.get(row, k);
                    let vk1 = *v.get(row, k + 1);
                    *v.get_mut(row, k) = c * vk + s * vk1;
                    *v.get_mut(row, k + 1) = c * vk1 - s * vk;
                }
            }

            // Left rotation on rows k, k+1 to remove the bulge at B[k+1, k]
            let (c2, s2) = givens(diag[k], bulge);

            diag[k] = c2 * diag[k] + s2 * bulge;
            let old_ek = off_diag[k];
            let old_dk1 = diag[k + 1];
            off_diag[k] = c2 * old_ek + s2 * old_dk1;
            diag[k + 1] = c2 * old_dk1 - s2 * old_ek;

            if k + 1 < hi {
                let old_ek1 = off_diag[k + 1];
                // Fill-in at B[k, k+2] drives the next right rotation
                x = off_diag[k];
                z = s2 * old_ek1;
                off_diag[k + 1] = c2 * old_ek1;
            }

            if compute_u {
                for row in 0..u.nrows() {
                    let uk = *u.get(row, k);
                    let uk1 = *u.get(row, k + 1);
                    *u.get_mut(row, k) = c2 * uk + s2 * uk1;
                    *u.get_mut(row, k + 1) = c2 * uk1 - s2 * uk;
                }
            }
        }
    }

    trace!("bidiagonal QR converged after {} sweeps", iter);

    for i in 0..n {
        if diag[i] < zero {
            diag[i] = -diag[i];
            if compute_u {
                negate_column(u, i);
            }
        }
    }

    // Selection sort, descending, permuting U and V columns alongside
    for i in 0..n {
        let mut max_idx = i;
        for j in (i + 1)..n {
            if diag[j] > diag[max_idx] {
                max_idx = j;
            }
        }
        if max_idx != i {
            diag.swap(i, max_idx);
            if compute_u {
                swap_columns(u, i, max_idx);
            }
            if compute_v {
                swap_columns(v, i, max_idx);
            }
        }
    }

    Ok(())
}

// ── Driver ──────────────────────────────────────────────────────────

/// Factors of `A = U · diag(s) · V^T` for a tall matrix.
#[derive(Debug)]
pub(crate) struct SvdParts<T> {
    /// M×M left singular vectors, when requested.
    pub u: Option<DenseMatrix<T>>,
    /// N singular values, descending.
    pub s: Vec<T>,
    /// N×N right singular vectors (columns), when requested.
    pub v: Option<DenseMatrix<T>>,
}

/// SVD of an M×N matrix with M ≥ N.
///
/// Wide inputs are handled by the caller through the transpose.
pub(crate) fn svd_tall<T: FloatScalar>(
    a: &impl MatrixRef<T>,
    compute_uv: bool,
    max_iter: usize,
) -> Result<SvdParts<T>> {
    let m = a.nrows();
    let n = a.ncols();
    debug_assert!(m >= n, "svd_tall requires M >= N");

    let mut work = DenseMatrix::from_ref(a);
    let (mut u, mut v) = if compute_uv {
        (DenseMatrix::zeros(m, m), DenseMatrix::zeros(n, n))
    } else {
        (DenseMatrix::zeros(0, 0), DenseMatrix::zeros(0, 0))
    };
    let mut diag = vec![T::zero(); n];
    let mut off_diag = vec![T::zero(); n.saturating_sub(1)];

    bidiagonalize(
        &mut work,
        &mut diag,
        &mut off_diag,
        &mut u,
        &mut v,
        compute_uv,
        compute_uv,
    );
    bidiagonal_qr(
        &mut diag,
        &mut off_diag,
        &mut u,
        &mut v,
        compute_uv,
        compute_uv,
        max_iter,
    )?;

    Ok(SvdParts {
        u: compute_uv.then_some(u),
        s: diag,
        v: compute_uv.then_some(v),
    })
}
