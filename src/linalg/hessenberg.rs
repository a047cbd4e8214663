use crate::traits::{FloatScalar, MatrixMut};

/// Reduce a square matrix to upper Hessenberg form via Householder similarity
/// transforms: `Q^T A Q = H`.
///
/// On return `a` is overwritten with H. When `compute_q` is set, `q` (n×n)
/// accumulates Q so that `A = Q H Q^T`; otherwise `q` is never touched.
pub(crate) fn hessenberg<T: FloatScalar>(
    a: &mut impl MatrixMut<T>,
    q: &mut impl MatrixMut<T>,
    compute_q: bool,
) {
    let n = a.nrows();
    debug_assert_eq!(n, a.ncols(), "hessenberg requires a square matrix");

    if compute_q {
        for i in 0..n {
            for j in 0..n {
                *q.get_mut(i, j) = if i == j { T::one() } else { T::zero() };
            }
        }
    }

    for k in 0..n.saturating_sub(2) {
        // Householder vector from a[k+1:n, k]
        let mut norm_sq = T::zero();
        for i in (k + 1)..n {
            let v = *a.get(i, k);
            norm_sq = norm_sq + v * v;
        }
        if norm_sq == T::zero() {
            continue;
        }

        let norm = norm_sq.sqrt();
        let ak1k = *a.get(k + 1, k);
        let sigma = if ak1k < T::zero() { -norm } else { norm };
        let v0 = ak1k + sigma;

        // Store normalized vector in a[k+2:n, k] (v[0] = 1 implicit)
        for i in (k + 2)..n {
            let val = *a.get(i, k) / v0;
            *a.get_mut(i, k) = val;
        }

        let tau = v0 / sigma;

        // Left: A[k+1:n, k+1:n] = (I - tau v v^T) A[k+1:n, k+1:n].
        // Column k is set explicitly below.
        for j in (k + 1)..n {
            let mut dot = *a.get(k + 1, j);
            for i in (k + 2)..n {
                dot = dot + *a.get(i, k) * *a.get(i, j);
            }
            dot = dot * tau;

            *a.get_mut(k + 1, j) = *a.get(k + 1, j) - dot;
            for i in (k + 2)..n {
                let vi = *a.get(i, k);
                *a.get_mut(i, j) = *a.get(i, j) - dot * vi;
            }
        }

        // Right: A[0:n, k+1:n] = A[0:n, k+1:n] (I - tau v v^T)
        for i in 0..n {
            let mut dot = *a.get(i, k + 1);
            for jj in (k + 2)..n {
                dot = dot + *a.get(i, jj) * *a.get(jj, k);
            }
            dot = dot * tau;

            *a.get_mut(i, k + 1) = *a.get(i, k + 1) - dot;
            for jj in (k + 2)..n {
                let vj = *a.get(jj, k);
                *a.get_mut(i, jj) = *a.get(i, jj) - dot * vj;
            }
        }

        if compute_q {
            for i in 0..n {
                let mut dot = *q.get(i, k + 1);
                for jj in (k + 2)..n {
                    dot = dot + *q.get(i, jj) * *a.get(jj, k);
                }
                dot = dot * tau;

                *q.get_mut(i, k + 1) = *q.get(i, k + 1) - dot;
                for jj in (k + 2)..n {
                    let vj = *a.get(jj, k);
                    *q.get_mut(i, jj) = *q.get(i, jj) - dot * vj;
                }
            }
        }

        *a.get_mut(k + 1, k) = -sigma;
        for i in (k + 2)..n {
            *a.get_mut(i, k) = T::zero();
        }
    }
}
