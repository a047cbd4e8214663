//! Name-based entry point for hosts that pass shapes and raw buffers.
//!
//! Every named operation takes its shape integers explicitly, followed by
//! the buffers they describe, in the order documented on [`Op`]. Output
//! buffers are passed separately. Raw buffers are interpreted with
//! [`Config::order`](crate::Config::order).

use core::fmt;
use core::ops::RangeInclusive;
use core::str::FromStr;

use log::debug;

use crate::error::{LinalgError, Result};
use crate::operand::{resolve, Contraction, Operand};
use crate::ops::{Linalg, SvdMode};
use crate::view::{MatrixView, MatrixViewMut};

/// Named operations, with their argument lists and outputs.
///
/// | Name | Arguments | Outputs | Result |
/// |---|---|---|---|
/// | `dot`, `inner`, `outer` | rows_l, cols_l, left, rows_r, cols_r, right | result | `Done` |
/// | `mat_mul` | rows_l, cols_l, left, rows_r, cols_r, right | result | `Done` |
/// | `cholesky` | rows, cols, a | l | `Done` |
/// | `svd` | rows, cols, a, \[full_matrices\], \[compute_uv\] | u, s, v | `Done` |
/// | `matrix_power` | rows, cols, a, exponent | result | `Done` |
/// | `eye`, `tri` | rows, cols | result | `Done` |
/// | `identity` | n | result | `Done` |
/// | `tril`, `triu` | rows, cols, a | result | `Done` |
/// | `inv` | rows, cols, a | result | `Done` |
/// | `det`, `trace` | rows, cols, a | | `Scalar` |
/// | `matrix_rank` | rows, cols, a, \[tolerance\] | | `Rank` |
/// | `get_eigen_values` | rows, cols, a | interleaved re/im | `Done` |
/// | `solve_linear_system_householder_qr` | rows, cols, a, b | x | `Done` |
///
/// For `dot`, `inner` and `outer`, a [`Arg::Num`] in a buffer position makes
/// that side a scalar; its shape integers are still validated. `svd` flags
/// default to `true`; `v` receives `Vᵗ`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Dot,
    Inner,
    Outer,
    MatMul,
    Cholesky,
    Svd,
    MatrixPower,
    Eye,
    Identity,
    Tri,
    Tril,
    Triu,
    Inv,
    Det,
    Trace,
    MatrixRank,
    EigenValues,
    Solve,
}

impl Op {
    pub const ALL: [Op; 18] = [
        Op::Dot,
        Op::Inner,
        Op::Outer,
        Op::MatMul,
        Op::Cholesky,
        Op::Svd,
        Op::MatrixPower,
        Op::Eye,
        Op::Identity,
        Op::Tri,
        Op::Tril,
        Op::Triu,
        Op::Inv,
        Op::Det,
        Op::Trace,
        Op::MatrixRank,
        Op::EigenValues,
        Op::Solve,
    ];

    /// Exported name.
    pub fn name(self) -> &'static str {
        match self {
            Op::Dot => "dot",
            Op::Inner => "inner",
            Op::Outer => "outer",
            Op::MatMul => "mat_mul",
            Op::Cholesky => "cholesky",
            Op::Svd => "svd",
            Op::MatrixPower => "matrix_power",
            Op::Eye => "eye",
            Op::Identity => "identity",
            Op::Tri => "tri",
            Op::Tril => "tril",
            Op::Triu => "triu",
            Op::Inv => "inv",
            Op::Det => "det",
            Op::Trace => "trace",
            Op::MatrixRank => "matrix_rank",
            Op::EigenValues => "get_eigen_values",
            Op::Solve => "solve_linear_system_householder_qr",
        }
    }

    /// Accepted argument counts and the exact number of output buffers.
    fn signature(self) -> (RangeInclusive<usize>, usize) {
        match self {
            Op::Dot | Op::Inner | Op::Outer | Op::MatMul => (6..=6, 1),
            Op::Cholesky | Op::Tril | Op::Triu | Op::Inv | Op::EigenValues => (3..=3, 1),
            Op::Svd => (3..=5, 3),
            Op::MatrixPower | Op::Solve => (4..=4, 1),
            Op::Eye | Op::Tri => (2..=2, 1),
            Op::Identity => (1..=1, 1),
            Op::Det | Op::Trace => (3..=3, 0),
            Op::MatrixRank => (3..=4, 0),
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Op {
    type Err = LinalgError;

    fn from_str(s: &str) -> Result<Self> {
        Op::ALL
            .iter()
            .copied()
            .find(|op| op.name() == s)
            .ok_or_else(|| LinalgError::UnknownOperation(s.to_owned()))
    }
}

/// One positional argument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Arg<'a> {
    Int(i64),
    Num(f64),
    Bool(bool),
    Buf(&'a [f64]),
}

impl From<i64> for Arg<'_> {
    fn from(v: i64) -> Self {
        Arg::Int(v)
    }
}

impl From<f64> for Arg<'_> {
    fn from(v: f64) -> Self {
        Arg::Num(v)
    }
}

impl From<bool> for Arg<'_> {
    fn from(v: bool) -> Self {
        Arg::Bool(v)
    }
}

impl<'a> From<&'a [f64]> for Arg<'a> {
    fn from(v: &'a [f64]) -> Self {
        Arg::Buf(v)
    }
}

/// What a successful call produced besides its output buffers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// Results were written to the output buffers.
    Done,
    /// `det` / `trace`.
    Scalar(f64),
    /// `matrix_rank`.
    Rank(usize),
}

/// Typed access to the positional arguments of one call.
struct Args<'s, 'a> {
    op: &'static str,
    args: &'s [Arg<'a>],
}

impl<'s, 'a> Args<'s, 'a> {
    fn type_error(&self, index: usize, expected: &'static str) -> LinalgError {
        LinalgError::Type {
            op: self.op,
            index,
            expected,
        }
    }

    /// A shape integer. Integral non-negative numbers are accepted too.
    fn dim(&self, i: usize) -> Result<usize> {
        const EXPECTED: &str = "a non-negative integer";
        match self.args[i] {
            Arg::Int(v) => usize::try_from(v).map_err(|_| self.type_error(i, EXPECTED)),
            Arg::Num(v) if v >= 0.0 && v.fract() == 0.0 && v <= u32::MAX as f64 => Ok(v as usize),
            _ => Err(self.type_error(i, EXPECTED)),
        }
    }

    fn int(&self, i: usize) -> Result<i64> {
        match self.args[i] {
            Arg::Int(v) => Ok(v),
            Arg::Num(v) if v.fract() == 0.0 && v.abs() <= i64::MAX as f64 => Ok(v as i64),
            _ => Err(self.type_error(i, "an integer")),
        }
    }

    fn num(&self, i: usize) -> Result<f64> {
        match self.args[i] {
            Arg::Num(v) => Ok(v),
            Arg::Int(v) => Ok(v as f64),
            _ => Err(self.type_error(i, "a number")),
        }
    }

    /// Optional boolean flag, `default` when absent.
    fn flag_or(&self, i: usize, default: bool) -> Result<bool> {
        match self.args.get(i) {
            None => Ok(default),
            Some(Arg::Bool(v)) => Ok(*v),
            Some(_) => Err(self.type_error(i, "a boolean")),
        }
    }

    fn buf(&self, i: usize) -> Result<&'a [f64]> {
        match self.args[i] {
            Arg::Buf(b) => Ok(b),
            _ => Err(self.type_error(i, "a buffer")),
        }
    }

    /// `rows, cols, buffer` starting at `i`.
    fn matrix(&self, i: usize, la: &Linalg) -> Result<MatrixView<'a>> {
        let rows = self.dim(i)?;
        let cols = self.dim(i + 1)?;
        let data = self.buf(i + 2)?;
        MatrixView::new(rows, cols, data, la.config().order())
    }

    /// `rows, cols, scalar-or-buffer` starting at `i`.
    fn operand(&self, i: usize, la: &Linalg) -> Result<Operand<'a>> {
        let rows = self.dim(i)?;
        let cols = self.dim(i + 1)?;
        match self.args[i + 2] {
            Arg::Num(v) => Ok(Operand::Scalar(v)),
            Arg::Buf(data) => Ok(Operand::Matrix(MatrixView::new(
                rows,
                cols,
                data,
                la.config().order(),
            )?)),
            _ => Err(self.type_error(i + 2, "a number or a buffer")),
        }
    }
}

fn out_view<'o>(la: &Linalg, (rows, cols): (usize, usize), buf: &'o mut [f64]) -> Result<MatrixViewMut<'o>> {
    MatrixViewMut::new(rows, cols, buf, la.config().order())
}

impl Linalg {
    /// Run a named operation on raw arguments.
    ///
    /// Argument count, argument kinds and buffer lengths are all checked
    /// before anything is written.
    ///
    /// ```
    /// use densecore::{Arg, Linalg, Op, Outcome};
    ///
    /// let la = Linalg::default();
    /// let a = [2.0, 0.0, 0.0, 3.0];
    /// let args = [Arg::Int(2), Arg::Int(2), Arg::Buf(&a)];
    ///
    /// let det = la.invoke("det".parse().unwrap(), &args, &mut []).unwrap();
    /// assert_eq!(det, Outcome::Scalar(6.0));
    ///
    /// let mut inv = [0.0; 4];
    /// la.invoke(Op::Inv, &args, &mut [&mut inv]).unwrap();
    /// assert_eq!(inv, [0.5, 0.0, 0.0, 1.0 / 3.0]);
    /// ```
    pub fn invoke(&self, op: Op, args: &[Arg<'_>], outs: &mut [&mut [f64]]) -> Result<Outcome> {
        let name = op.name();
        let (arg_range, n_outs) = op.signature();
        let got = args.len() + outs.len();
        let expected = args.len().clamp(*arg_range.start(), *arg_range.end()) + n_outs;
        if !arg_range.contains(&args.len()) || outs.len() != n_outs {
            return Err(LinalgError::Arity {
                op: name,
                expected,
                got,
            });
        }
        debug!("invoke {} with {} args, {} outputs", name, args.len(), outs.len());

        let a = Args { op: name, args };
        match op {
            Op::Dot | Op::Inner | Op::Outer => {
                let left = a.operand(0, self)?;
                let right = a.operand(3, self)?;
                let contraction = if op == Op::Inner {
                    Contraction::Trailing
                } else {
                    Contraction::Product
                };
                let shape = resolve(name, left, right, contraction)?.shape();
                let mut out = out_view(self, shape, &mut *outs[0])?;
                match op {
                    Op::Dot => self.dot(left, right, &mut out)?,
                    Op::Inner => self.inner(left, right, &mut out)?,
                    _ => self.outer(left, right, &mut out)?,
                }
            }
            Op::MatMul => {
                let left = a.matrix(0, self)?;
                let right = a.matrix(3, self)?;
                let mut out = out_view(self, (left.rows(), right.cols()), &mut *outs[0])?;
                self.matmul(&left, &right, &mut out)?;
            }
            Op::Cholesky => {
                let m = a.matrix(0, self)?;
                let mut out = out_view(self, m.shape(), &mut *outs[0])?;
                self.cholesky(&m, &mut out)?;
            }
            Op::Svd => {
                let m = a.matrix(0, self)?;
                let full = a.flag_or(3, true)?;
                let compute_uv = a.flag_or(4, true)?;
                let mode = SvdMode::from_flags(full, compute_uv);
                let [u_buf, s_buf, v_buf] = outs else {
                    return Err(LinalgError::Arity {
                        op: name,
                        expected,
                        got,
                    });
                };
                match mode.factor_shapes(m.rows(), m.cols()) {
                    Some((u_shape, vt_shape)) => {
                        let mut u = out_view(self, u_shape, u_buf)?;
                        let mut vt = out_view(self, vt_shape, v_buf)?;
                        self.svd(&m, mode, Some(&mut u), s_buf, Some(&mut vt))?;
                    }
                    None => self.svd(&m, mode, None, s_buf, None)?,
                }
            }
            Op::MatrixPower => {
                let m = a.matrix(0, self)?;
                let exponent = a.int(3)?;
                let mut out = out_view(self, m.shape(), &mut *outs[0])?;
                self.matrix_power(&m, exponent, &mut out)?;
            }
            Op::Eye | Op::Tri => {
                let shape = (a.dim(0)?, a.dim(1)?);
                let mut out = out_view(self, shape, &mut *outs[0])?;
                if op == Op::Eye {
                    self.eye(&mut out)?;
                } else {
                    self.tri(&mut out)?;
                }
            }
            Op::Identity => {
                let n = a.dim(0)?;
                let mut out = out_view(self, (n, n), &mut *outs[0])?;
                self.identity(&mut out)?;
            }
            Op::Tril | Op::Triu => {
                let m = a.matrix(0, self)?;
                let mut out = out_view(self, m.shape(), &mut *outs[0])?;
                if op == Op::Tril {
                    self.tril(&m, &mut out)?;
                } else {
                    self.triu(&m, &mut out)?;
                }
            }
            Op::Inv => {
                let m = a.matrix(0, self)?;
                let mut out = out_view(self, m.shape(), &mut *outs[0])?;
                self.inverse(&m, &mut out)?;
            }
            Op::Det => return Ok(Outcome::Scalar(self.determinant(&a.matrix(0, self)?)?)),
            Op::Trace => return Ok(Outcome::Scalar(self.trace(&a.matrix(0, self)?))),
            Op::MatrixRank => {
                let m = a.matrix(0, self)?;
                let tol = if args.len() > 3 { Some(a.num(3)?) } else { None };
                return Ok(Outcome::Rank(self.matrix_rank(&m, tol)?));
            }
            Op::EigenValues => {
                let m = a.matrix(0, self)?;
                self.eigenvalues_interleaved(&m, &mut *outs[0])?;
            }
            Op::Solve => {
                let m = a.matrix(0, self)?;
                let b = MatrixView::new(m.rows(), 1, a.buf(3)?, self.config().order())?;
                let mut x = out_view(self, (m.cols(), 1), &mut *outs[0])?;
                self.solve(&m, &b, &mut x)?;
            }
        }
        Ok(Outcome::Done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for op in Op::ALL {
            assert_eq!(op.name().parse::<Op>().unwrap(), op);
            assert_eq!(op.to_string(), op.name());
        }
        assert_eq!(
            "qr".parse::<Op>(),
            Err(LinalgError::UnknownOperation("qr".into()))
        );
    }

    #[test]
    fn arity_counts_outputs() {
        let a = [1.0; 4];
        let args = [Arg::Int(2), Arg::Int(2), Arg::Buf(&a)];
        let err = Linalg::default().invoke(Op::Inv, &args, &mut []).unwrap_err();
        assert_eq!(
            err,
            LinalgError::Arity {
                op: "inv",
                expected: 4,
                got: 3
            }
        );
    }

    #[test]
    fn negative_dimension_is_type_error() {
        let a = [1.0; 4];
        let args = [Arg::Int(-2), Arg::Int(2), Arg::Buf(&a)];
        let err = Linalg::default().invoke(Op::Det, &args, &mut []).unwrap_err();
        assert_eq!(
            err,
            LinalgError::Type {
                op: "det",
                index: 0,
                expected: "a non-negative integer"
            }
        );
    }

    #[test]
    fn integral_number_accepted_as_dimension() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let args = [Arg::Num(2.0), Arg::Num(2.0), Arg::Buf(&a)];
        let out = Linalg::default().invoke(Op::Trace, &args, &mut []).unwrap();
        assert_eq!(out, Outcome::Scalar(5.0));
    }

    #[test]
    fn number_in_buffer_slot_for_matmul() {
        let a = [1.0; 4];
        let args = [
            Arg::Int(2),
            Arg::Int(2),
            Arg::Num(3.0),
            Arg::Int(2),
            Arg::Int(2),
            Arg::Buf(&a),
        ];
        let mut out = [0.0; 4];
        let err = Linalg::default()
            .invoke(Op::MatMul, &args, &mut [&mut out])
            .unwrap_err();
        assert!(matches!(err, LinalgError::Type { op: "mat_mul", index: 2, .. }));
    }

    #[test]
    fn short_buffer_rejected() {
        let a = [1.0; 3];
        let args = [Arg::Int(2), Arg::Int(2), Arg::Buf(&a)];
        let err = Linalg::default().invoke(Op::Det, &args, &mut []).unwrap_err();
        assert_eq!(err, LinalgError::BufferLength { expected: 4, got: 3 });
    }

    #[test]
    fn svd_flags_are_optional_and_typed() {
        let a = [3.0, 0.0, 0.0, 4.0];
        let la = Linalg::default();
        let (mut u, mut s, mut v) = ([0.0; 4], [0.0; 2], [0.0; 4]);

        let args = [Arg::Int(2), Arg::Int(2), Arg::Buf(&a), Arg::Bool(true), Arg::Bool(false)];
        la.invoke(Op::Svd, &args, &mut [&mut u, &mut s, &mut v]).unwrap();
        assert!((s[0] - 4.0).abs() < 1e-12 && (s[1] - 3.0).abs() < 1e-12);
        assert_eq!(u, [0.0; 4]);
        assert_eq!(v, [0.0; 4]);

        let bad = [Arg::Int(2), Arg::Int(2), Arg::Buf(&a), Arg::Int(1)];
        let err = la.invoke(Op::Svd, &bad, &mut [&mut u, &mut s, &mut v]).unwrap_err();
        assert!(matches!(err, LinalgError::Type { index: 3, expected: "a boolean", .. }));
    }

    #[test]
    fn rank_with_optional_tolerance() {
        let a = [1.0, 0.0, 0.0, 1e-3];
        let la = Linalg::default();
        let base = [Arg::Int(2), Arg::Int(2), Arg::Buf(&a)];
        assert_eq!(la.invoke(Op::MatrixRank, &base, &mut []).unwrap(), Outcome::Rank(2));

        let with_tol = [Arg::Int(2), Arg::Int(2), Arg::Buf(&a), Arg::Num(1e-2)];
        assert_eq!(la.invoke(Op::MatrixRank, &with_tol, &mut []).unwrap(), Outcome::Rank(1));
    }
}
