//! Error types for variant construction and access.

use thiserror::Error;

/// Errors raised by [`Variant`](super::Variant) and payload decoding.
///
/// `OutOfRange` and `TypeMismatch` are only produced while
/// [`BOUNDS_CHECK`](crate::policy::BOUNDS_CHECK) is on. They indicate that
/// binding code disagrees with the variant's declared cases.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VariantError {
    #[error("Invalid case {tag} for variant with {cases} cases")]
    OutOfRange { tag: usize, cases: usize },

    #[error("Type mismatch for case {tag}: expected {expected}, got {got}")]
    TypeMismatch {
        tag: usize,
        expected: &'static str,
        got: &'static str,
    },

    #[error("Buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },

    #[error("Buffer length {got} does not match variant size {expected}")]
    SizeMismatch { expected: usize, got: usize },

    #[error("Invalid bool value: {0}")]
    InvalidBool(u8),

    #[error("Invalid char value: {0}")]
    InvalidChar(u32),
}

impl VariantError {
    /// Returns `true` for errors that mean the caller used the wrong tag or
    /// type, as opposed to malformed buffer contents.
    pub fn is_misuse(&self) -> bool {
        matches!(self, Self::OutOfRange { .. } | Self::TypeMismatch { .. })
    }
}
