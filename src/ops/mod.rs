//! Public operations over caller-owned views.
//!
//! Every operation is a method on [`Linalg`]. Each one validates all shapes
//! first, computes into internal scratch where a factorization can still
//! fail, and only then writes the caller's output view.

mod construct;
mod decomp;
mod product;
mod props;

pub use decomp::SvdMode;

use crate::config::Config;

/// Call-scoped entry point for every operation.
///
/// Holds only a [`Config`]; it owns no buffers and keeps no state between
/// calls, so a single value can be shared freely across threads.
///
/// ```
/// use densecore::{Linalg, MatrixView, MatrixViewMut};
///
/// let la = Linalg::default();
/// let a = [1.0, 3.0, 2.0, 4.0]; // [[1, 2], [3, 4]], column-major
/// let a = MatrixView::col_major(2, 2, &a).unwrap();
///
/// assert!((la.determinant(&a).unwrap() + 2.0).abs() < 1e-12);
///
/// let mut buf = [0.0; 4];
/// let mut a2 = MatrixViewMut::col_major(2, 2, &mut buf).unwrap();
/// la.matmul(&a, &a, &mut a2).unwrap();
/// assert_eq!(a2[(0, 0)], 7.0);
/// assert_eq!(a2[(1, 1)], 22.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Linalg {
    config: Config,
}

impl Linalg {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }
}
