//! Per-façade configuration.

use crate::view::StorageOrder;

/// What to do when an operation meets a singular or rank-deficient matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SingularPolicy {
    /// Return normally; the output carries the non-finite values the
    /// factorization produces (`inf`/`NaN`).
    #[default]
    Propagate,
    /// Report [`LinalgError::Singular`](crate::LinalgError::Singular)
    /// before anything is written.
    Strict,
}

/// Settings shared by every operation run through one [`Linalg`](crate::Linalg).
///
/// ```
/// use densecore::{Config, SingularPolicy, StorageOrder};
///
/// let cfg = Config::new()
///     .with_order(StorageOrder::RowMajor)
///     .with_singular_policy(SingularPolicy::Strict);
/// assert_eq!(cfg.order(), StorageOrder::RowMajor);
/// assert_eq!(cfg.max_iter_factor(), 30);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    order: StorageOrder,
    singular: SingularPolicy,
    max_iter_factor: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            order: StorageOrder::ColMajor,
            singular: SingularPolicy::Propagate,
            max_iter_factor: 30,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layout assumed for raw buffers handed to [`Linalg::invoke`](crate::Linalg::invoke).
    pub fn with_order(mut self, order: StorageOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_singular_policy(mut self, singular: SingularPolicy) -> Self {
        self.singular = singular;
        self
    }

    /// Iteration budget of the SVD and eigenvalue solvers is
    /// `factor * max(rows, cols)` sweeps. Clamped to at least 1.
    pub fn with_max_iter_factor(mut self, factor: usize) -> Self {
        self.max_iter_factor = factor.max(1);
        self
    }

    #[inline]
    pub fn order(&self) -> StorageOrder {
        self.order
    }

    #[inline]
    pub fn singular_policy(&self) -> SingularPolicy {
        self.singular
    }

    #[inline]
    pub fn max_iter_factor(&self) -> usize {
        self.max_iter_factor
    }

    pub(crate) fn max_iter(&self, rows: usize, cols: usize) -> usize {
        self.max_iter_factor.saturating_mul(rows.max(cols).max(1))
    }

    pub(crate) fn is_strict(&self) -> bool {
        self.singular == SingularPolicy::Strict
    }
}
