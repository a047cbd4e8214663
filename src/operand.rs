//! Scalar-or-matrix operands of the `dot` / `inner` / `outer` family.

use crate::error::{require_shape, LinalgError, Result};
use crate::view::MatrixView;

/// One side of a binary product.
///
/// The kind is fixed by how the caller declares the argument, never by
/// looking at its value: a `1x1` matrix is still a matrix.
#[derive(Debug, Clone, Copy)]
pub enum Operand<'a> {
    Scalar(f64),
    Matrix(MatrixView<'a>),
}

impl From<f64> for Operand<'_> {
    fn from(value: f64) -> Self {
        Operand::Scalar(value)
    }
}

impl<'a> From<MatrixView<'a>> for Operand<'a> {
    fn from(view: MatrixView<'a>) -> Self {
        Operand::Matrix(view)
    }
}

/// Which product a matrix-matrix pair stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Contraction {
    /// `A·B`, requires `A.cols == B.rows`.
    Product,
    /// `A·Bᵗ`, requires `A.cols == B.cols`.
    Trailing,
}

/// Outcome of resolving two operands, before any arithmetic.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Resolved<'a> {
    /// `alpha * m`
    Scaled { alpha: f64, m: MatrixView<'a> },
    /// `a · b`, with `b` already transposed for trailing contractions.
    Product { a: MatrixView<'a>, b: MatrixView<'a> },
}

impl Resolved<'_> {
    pub fn shape(&self) -> (usize, usize) {
        match self {
            Resolved::Scaled { m, .. } => m.shape(),
            Resolved::Product { a, b } => (a.rows(), b.cols()),
        }
    }
}

/// Classify both operands and validate their shapes.
///
/// The four-way rule shared by `dot`, `inner` and `outer`; only the
/// matrix-matrix arm depends on `contraction`.
pub(crate) fn resolve<'a>(
    op: &'static str,
    left: Operand<'a>,
    right: Operand<'a>,
    contraction: Contraction,
) -> Result<Resolved<'a>> {
    match (left, right) {
        (Operand::Scalar(alpha), Operand::Matrix(m)) | (Operand::Matrix(m), Operand::Scalar(alpha)) => {
            Ok(Resolved::Scaled { alpha, m })
        }
        (Operand::Matrix(a), Operand::Matrix(b)) => {
            let b = match contraction {
                Contraction::Product => b,
                Contraction::Trailing => b.t(),
            };
            require_shape(op, (a.cols(), b.cols()), (b.rows(), b.cols()))?;
            Ok(Resolved::Product { a, b })
        }
        (Operand::Scalar(_), Operand::Scalar(_)) => Err(LinalgError::UnsupportedOperand {
            op,
            detail: "two scalar operands",
        }),
    }
}
