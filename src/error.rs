//! Provides error definitions.
use smallvec::SmallVec;
use thiserror::Error;

/// Enumerates failures raised by conversions between storage strategies.
///
/// Elementwise operations never return errors: a mismatch between two
/// compile-time shapes fails to compile, and a mismatch involving a
/// runtime shape is a precondition panic.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// A runtime shape does not match the requested compile-time shape.
    #[error("shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        expected: SmallVec<[usize; 4]>,
        found: SmallVec<[usize; 4]>,
    },

    /// A supplied buffer's length disagrees with the product of the shape.
    #[error("buffer size mismatch: shape needs {expected} elements, buffer holds {found}")]
    BufferSizeMismatch { expected: usize, found: usize },
}
