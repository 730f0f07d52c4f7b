//! Error types for packed data decoding.

use thiserror::Error;

/// Errors produced by the strict decoding entry points.
///
/// The default entry points are total and never return these; see
/// [`unpack_rotation_checked`](crate::unpack_rotation_checked).
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum DecodeError {
    /// The stored components of a packed rotation already exceed unit
    /// length by more than [`NORM_TOLERANCE`](crate::NORM_TOLERANCE),
    /// so the encoding cannot come from a real rotation.
    #[error("packed rotation is not unit length: stored components have squared norm {sum_squares}")]
    MalformedRotation {
        /// Squared norm of the three stored components.
        sum_squares: f64,
    },
}

/// Result alias for decoding operations.
pub type DecodeResult<T> = Result<T, DecodeError>;
