//! Error types for layout computation.

use thiserror::Error;

/// Errors reported when the inputs to the layout calculator are malformed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("Invalid discriminant width {0}: must be a non-zero power of two")]
    InvalidDiscriminant(usize),

    #[error("Case count mismatch: {sizes} sizes but {alignments} alignments")]
    CaseCountMismatch { sizes: usize, alignments: usize },

    #[error("Invalid alignment {align} for case {case}: must be a non-zero power of two")]
    InvalidAlignment { case: usize, align: usize },

    #[error("Layout size overflows usize")]
    Overflow,
}
