//! Error taxonomy for the EDM core.
//!
//! Parameter errors are raised at a driver boundary before any work begins.
//! Per-row numerical issues (a singular S-Map system, a prediction row whose
//! Tp-shifted target falls outside the data) degrade to `NaN` and a
//! `tracing::warn!` instead of a fatal error, so partial results survive.

use thiserror::Error;

/// Result alias used throughout `edm-core`.
pub type EdmResult<T> = Result<T, EdmError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EdmError {
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("library too small: need {need} neighbors but only {have} usable rows")]
    LibraryTooSmall { need: usize, have: usize },

    #[error("S-Map system is singular: no singular value exceeds the significance threshold")]
    SingularSystem,

    #[error("insufficient data: need at least 2 finite pairs but found {have}")]
    InsufficientData { have: usize },

    #[error("bad Jacobian pair ({i}, {j}): indices must be in 1..=E")]
    BadJacobianPair { i: usize, j: usize },
}
