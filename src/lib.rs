//! # densecore
//!
//! Dense linear algebra over caller-owned `f64` buffers. The crate never
//! allocates or resizes the caller's storage: inputs are borrowed through
//! [`MatrixView`], outputs are written through [`MatrixViewMut`], and every
//! shape is checked before the first element is written.
//!
//! ## Quick start
//!
//! ```
//! use densecore::{Linalg, MatrixView, MatrixViewMut};
//!
//! let la = Linalg::default();
//!
//! // [[4, 2], [2, 3]] is symmetric positive definite
//! let a = [4.0, 2.0, 2.0, 3.0];
//! let a = MatrixView::row_major(2, 2, &a).unwrap();
//!
//! let mut l = [0.0; 4];
//! la.cholesky(&a, &mut MatrixViewMut::row_major(2, 2, &mut l).unwrap())
//!     .unwrap();
//! assert_eq!(l[0], 2.0);
//! assert_eq!(l[1], 0.0);
//!
//! let b = [2.0, 1.0];
//! let b = MatrixView::col_major(2, 1, &b).unwrap();
//! let mut x = [0.0; 2];
//! la.solve(&a, &b, &mut MatrixViewMut::col_major(2, 1, &mut x).unwrap())
//!     .unwrap();
//! assert!((x[0] - 0.5).abs() < 1e-12 && x[1].abs() < 1e-12);
//! ```
//!
//! ## Layout
//!
//! - [`Linalg`] carries a [`Config`] and exposes every operation as a method:
//!   products (`dot`, `inner`, `outer`, `matmul`), constructors (`identity`,
//!   `eye`, `tri`, `tril`, `triu`), scalar properties (`trace`,
//!   `determinant`, `matrix_rank`), `inverse`, `matrix_power`, and the
//!   decompositions (`cholesky`, `svd`, `eigenvalues`, `solve`).
//! - [`Operand`] lets the product family take a scalar on either side.
//! - [`Op`] and [`Linalg::invoke`] expose the same operations by name for
//!   hosts that pass shape integers and flat buffers.
//! - Internally the algorithms are generic over [`FloatScalar`] and operate
//!   on anything implementing [`MatrixRef`] / [`MatrixMut`].
//!
//! ## Singular inputs
//!
//! By default `inverse`, negative `matrix_power` and `solve` compute through
//! a singular or rank-deficient input and log a warning; the result may hold
//! huge or non-finite values. [`SingularPolicy::Strict`] turns that into
//! [`LinalgError::Singular`].

mod config;
mod dense;
mod dispatch;
mod error;
mod linalg;
mod operand;
mod ops;
mod traits;
mod view;

pub use config::{Config, SingularPolicy};
pub use dispatch::{Arg, Op, Outcome};
pub use error::{LinalgError, Result};
pub use operand::Operand;
pub use ops::{Linalg, SvdMode};
pub use traits::{FloatScalar, MatrixMut, MatrixRef, Scalar};
pub use view::{MatrixView, MatrixViewMut, StorageOrder};

pub use num_complex::Complex;
