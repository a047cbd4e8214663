use thiserror::Error;

/// Errors reported by every operation in this crate.
///
/// Validation errors are always detected before any output element is
/// written, so a failed call leaves the caller's buffers untouched.
///
/// ```
/// use densecore::{Linalg, LinalgError, MatrixView, MatrixViewMut};
///
/// let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
/// let a = MatrixView::col_major(2, 3, &a).unwrap();
/// let mut out = [0.0; 4];
/// let mut out = MatrixViewMut::col_major(2, 2, &mut out).unwrap();
///
/// let err = Linalg::default().inverse(&a, &mut out).unwrap_err();
/// assert!(matches!(err, LinalgError::ShapeMismatch { .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LinalgError {
    /// Wrong number of arguments or output buffers for a named operation.
    #[error("`{op}` takes {expected} arguments, got {got}")]
    Arity {
        op: &'static str,
        expected: usize,
        got: usize,
    },
    /// An argument is not of the declared kind.
    #[error("argument {index} of `{op}` must be {expected}")]
    Type {
        op: &'static str,
        index: usize,
        expected: &'static str,
    },
    /// A buffer is too short for the shape it is declared with.
    #[error("buffer holds {got} values, shape needs {expected}")]
    BufferLength { expected: usize, got: usize },
    /// Dimensions are incompatible for the requested operation.
    #[error("shape mismatch in `{op}`: expected {}x{}, got {}x{}", expected.0, expected.1, got.0, got.1)]
    ShapeMismatch {
        op: &'static str,
        expected: (usize, usize),
        got: (usize, usize),
    },
    /// Operand kinds not handled by this operation's dispatch rule.
    #[error("`{op}` does not support {detail}")]
    UnsupportedOperand {
        op: &'static str,
        detail: &'static str,
    },
    /// Matrix is singular or rank-deficient (only under the strict policy).
    #[error("matrix is singular")]
    Singular,
    /// A non-positive pivot was met during Cholesky factorization.
    #[error("matrix is not positive definite")]
    NotPositiveDefinite,
    /// Iterative algorithm did not converge within the iteration budget.
    #[error("iterative algorithm did not converge after {iterations} iterations")]
    ConvergenceFailure { iterations: usize },
    /// No operation is registered under this name.
    #[error("unknown operation `{0}`")]
    UnknownOperation(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, LinalgError>;

/// Shorthand for the most common error: `got` shape where `expected` was required.
pub(crate) fn shape_mismatch(
    op: &'static str,
    expected: (usize, usize),
    got: (usize, usize),
) -> LinalgError {
    LinalgError::ShapeMismatch { op, expected, got }
}

/// Fails with `ShapeMismatch` unless `shape` is square.
pub(crate) fn require_square(op: &'static str, shape: (usize, usize)) -> Result<usize> {
    if shape.0 != shape.1 {
        return Err(shape_mismatch(op, (shape.0, shape.0), shape));
    }
    Ok(shape.0)
}

/// Fails with `ShapeMismatch` unless `got == expected`.
pub(crate) fn require_shape(
    op: &'static str,
    expected: (usize, usize),
    got: (usize, usize),
) -> Result<()> {
    if expected != got {
        return Err(shape_mismatch(op, expected, got));
    }
    Ok(())
}
