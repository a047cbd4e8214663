use log::trace;
use num_complex::Complex;
use num_traits::{Float, One, Zero};

use crate::dense::DenseMatrix;
use crate::error::{LinalgError, Result};
use crate::linalg::hessenberg::hessenberg;
use crate::traits::{FloatScalar, MatrixMut, MatrixRef};

#[inline]
fn g<T: Copy>(m: &impl MatrixRef<T>, i: usize, j: usize) -> T {
    *m.get(i, j)
}

/// Whether the sub-diagonal entry `h[i, i-1]` can be treated as zero.
///
/// Relative to its diagonal neighbours, or to `hnorm` when both are zero.
#[inline]
fn negligible<T: FloatScalar>(h: &impl MatrixRef<T>, i: usize, hnorm: T) -> bool {
    let mut scale = g(h, i - 1, i - 1).abs() + g(h, i, i).abs();
    if scale == T::zero() {
        scale = hnorm;
    }
    g(h, i, i - 1).abs() <= T::epsilon() * scale
}

/// Francis double-shift QR iteration on an upper Hessenberg matrix.
///
/// Transforms `h` to real Schur form (quasi-upper-triangular) in place.
/// When `compute_q` is set, accumulates the orthogonal similarity transform
/// into `q`.
///
/// Real eigenvalues appear as 1×1 diagonal blocks; complex conjugate pairs
/// as 2×2 blocks. Every sub-diagonal entry outside a 2×2 block is exactly
/// zero on return.
pub(crate) fn francis_qr<T: FloatScalar>(
    h: &mut impl MatrixMut<T>,
    q: &mut impl MatrixMut<T>,
    compute_q: bool,
    max_iter: usize,
) -> Result<()> {
    let n = h.nrows();
    if n <= 1 {
        return Ok(());
    }

    let eps = T::epsilon();
    let mut hnorm = T::zero();
    for j in 0..n {
        for i in 0..n.min(j + 2) {
            hnorm = hnorm.max(g(h, i, j).abs());
        }
    }

    let mut iter = 0usize;
    let mut p = n; // active submatrix is h[0..p, 0..p]

    while p > 2 {
        if negligible(h, p - 1, hnorm) {
            *h.get_mut(p - 1, p - 2) = T::zero();
            p -= 1;
            continue;
        }

        // 2×2 block at the bottom
        if negligible(h, p - 2, hnorm) {
            *h.get_mut(p - 2, p - 3) = T::zero();
            p -= 2;
            continue;
        }

        iter += 1;
        if iter > max_iter {
            return Err(LinalgError::ConvergenceFailure { iterations: max_iter });
        }

        // Start of the active unreduced block
        let mut q_start = p - 1;
        while q_start > 0 {
            if negligible(h, q_start, hnorm) {
                *h.get_mut(q_start, q_start - 1) = T::zero();
                break;
            }
            q_start -= 1;
        }

        // Exceptional shift every 10 iterations
        let (s, t) = if iter % 10 == 0 {
            let w = g(h, p - 1, p - 2).abs() + g(h, p - 2, p - 3).abs();
            (w + w, w * w)
        } else {
            // Francis double shift from bottom-right 2×2 block
            let a11 = g(h, p - 2, p - 2);
            let a12 = g(h, p - 2, p - 1);
            let a21 = g(h, p - 1, p - 2);
            let a22 = g(h, p - 1, p - 1);
            (a11 + a22, a11 * a22 - a12 * a21)
        };

        // First column of (H^2 - s*H + t*I)
        let h00 = g(h, q_start, q_start);
        let h10 = g(h, q_start + 1, q_start);
        let h01 = g(h, q_start, q_start + 1);
        let h11 = g(h, q_start + 1, q_start + 1);

        let mut x = h00 * h00 + h01 * h10 - s * h00 + t;
        let mut y = h10 * (h00 + h11 - s);
        let mut z = if q_start + 2 < p {
            h10 * g(h, q_start + 2, q_start + 1)
        } else {
            T::zero()
        };

        // Chase the bulge down the diagonal
        for k in q_start..(p - 1) {
            let use3 = k + 2 < p;
            let (v0, v1, v2, tau) = if use3 {
                householder3(x, y, z)
            } else {
                let (v0h, v1h, tau_h) = householder2(x, y);
                (v0h, v1h, T::zero(), tau_h)
            };

            let col_start = if k > q_start { k - 1 } else { k };

            // Left
            for j in col_start..n {
                let mut dot = v0 * g(h, k, j) + v1 * g(h, k + 1, j);
                if use3 {
                    dot = dot + v2 * g(h, k + 2, j);
                }
                dot = tau * dot;
                *h.get_mut(k, j) = g(h, k, j) - dot * v0;
                *h.get_mut(k + 1, j) = g(h, k + 1, j) - dot * v1;
                if use3 {
                    *h.get_mut(k + 2, j) = g(h, k + 2, j) - dot * v2;
                }
            }

            // Right
            let row_end = if use3 { (k + 4).min(p) } else { p };
            for i in 0..row_end {
                let mut dot = v0 * g(h, i, k) + v1 * g(h, i, k + 1);
                if use3 {
                    dot = dot + v2 * g(h, i, k + 2);
                }
                dot = tau * dot;
                *h.get_mut(i, k) = g(h, i, k) - dot * v0;
                *h.get_mut(i, k + 1) = g(h, i, k + 1) - dot * v1;
                if use3 {
                    *h.get_mut(i, k + 2) = g(h, i, k + 2) - dot * v2;
                }
            }

            if compute_q {
                for i in 0..n {
                    let mut dot = v0 * g(q, i, k) + v1 * g(q, i, k + 1);
                    if use3 {
                        dot = dot + v2 * g(q, i, k + 2);
                    }
                    dot = tau * dot;
                    *q.get_mut(i, k) = g(q, i, k) - dot * v0;
                    *q.get_mut(i, k + 1) = g(q, i, k + 1) - dot * v1;
                    if use3 {
                        *q.get_mut(i, k + 2) = g(q, i, k + 2) - dot * v2;
                    }
                }
            }

            // Next bulge comes from the fill-in in column k
            if k + 2 < p - 1 {
                x = g(h, k + 1, k);
                y = g(h, k + 2, k);
                z = g(h, k + 3, k);
            } else if k + 1 < p - 1 {
                x = g(h, k + 1, k);
                y = g(h, k + 2, k);
                z = T::zero();
            }
        }

        // Clean up sub-sub-diagonal round-off
        for i in 0..n {
            for j in 0..i.saturating_sub(1) {
                if g(h, i, j).abs() < eps * (g(h, i, i).abs() + g(h, j, j).abs()) {
                    *h.get_mut(i, j) = T::zero();
                }
            }
        }
    }

    if p == 2 && negligible(h, 1, hnorm) {
        *h.get_mut(1, 0) = T::zero();
    }

    trace!("Francis QR converged after {} sweeps", iter);
    Ok(())
}

/// 3-element Householder: returns (v0, v1, v2, tau) with v0 = 1.
#[inline]
fn householder3<T: Float + Zero + One>(x: T, y: T, z: T) -> (T, T, T, T) {
    let norm = (x * x + y * y + z * z).sqrt();
    if norm == T::zero() {
        return (T::one(), T::zero(), T::zero(), T::zero());
    }
    let sign = if x >= T::zero() { T::one() } else { -T::one() };
    let u0 = x + sign * norm;
    let v1 = y / u0;
    let v2 = z / u0;
    let tau = (T::one() + T::one()) / (T::one() + v1 * v1 + v2 * v2);
    (T::one(), v1, v2, tau)
}

/// 2-element Householder: returns (v0, v1, tau) with v0 = 1.
#[inline]
fn householder2<T: Float + Zero + One>(x: T, y: T) -> (T, T, T) {
    let norm = (x * x + y * y).sqrt();
    if norm == T::zero() {
        return (T::one(), T::zero(), T::zero());
    }
    let sign = if x >= T::zero() { T::one() } else { -T::one() };
    let u0 = x + sign * norm;
    let v1 = y / u0;
    let tau = (T::one() + T::one()) / (T::one() + v1 * v1);
    (T::one(), v1, tau)
}

/// Read eigenvalues off a real Schur form.
///
/// 1×1 diagonal blocks give real eigenvalues; 2×2 blocks give either two
/// reals or a conjugate pair `(re + i·im, re - i·im)`.
pub(crate) fn schur_eigenvalues<T: FloatScalar>(s: &impl MatrixRef<T>) -> Vec<Complex<T>> {
    let n = s.nrows();
    let mut out = Vec::with_capacity(n);
    let half = T::one() / (T::one() + T::one());

    let mut i = 0;
    while i < n {
        if i + 1 < n && g(s, i + 1, i) != T::zero() {
            let a = g(s, i, i);
            let b = g(s, i, i + 1);
            let c = g(s, i + 1, i);
            let d = g(s, i + 1, i + 1);

            let tr = (a + d) * half;
            let det = a * d - b * c;
            let disc = tr * tr - det;

            if disc >= T::zero() {
                let sq = disc.sqrt();
                out.push(Complex::new(tr + sq, T::zero()));
                out.push(Complex::new(tr - sq, T::zero()));
            } else {
                let sq = (-disc).sqrt();
                out.push(Complex::new(tr, sq));
                out.push(Complex::new(tr, -sq));
            }
            i += 2;
        } else {
            out.push(Complex::new(g(s, i, i), T::zero()));
            i += 1;
        }
    }

    out
}

/// Eigenvalues of a general real square matrix.
///
/// Hessenberg reduction followed by Francis QR; no Schur vectors are
/// accumulated. Order is whatever the iteration leaves on the diagonal.
pub(crate) fn eigenvalues<T: FloatScalar>(
    a: &impl MatrixRef<T>,
    max_iter: usize,
) -> Result<Vec<Complex<T>>> {
    let mut h = DenseMatrix::from_ref(a);
    let mut unused = DenseMatrix::zeros(0, 0);
    hessenberg(&mut h, &mut unused, false);
    francis_qr(&mut h, &mut unused, false, max_iter)?;
    Ok(schur_eigenvalues(&h))
}
