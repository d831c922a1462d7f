//! Unified error type for the wit-layout library.
//!
//! This module provides a single [`Error`] type covering layout computation,
//! variant access and WIT loading, so application code can use one error
//! type with `?` throughout.

use thiserror::Error;

use crate::layout::LayoutError;
use crate::variant::VariantError;

/// Unified error type for all wit-layout operations.
///
/// # Example
///
/// ```ignore
/// use wit_layout::{Result, Target};
///
/// fn payload_offset(wit: &str) -> Result<usize> {
///     let (_, descriptor) = wit_layout::wit::load_descriptor(wit, Some("shape"))?;
///     let layout = descriptor
///         .variant_layout(Target::Wasm32)?
///         .ok_or_else(|| wit_layout::Error::unsupported("shape is not a variant"))?;
///     Ok(layout.data_offset)
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed input to the layout calculator, or a layout too large for
    /// `usize`.
    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// Variant construction or access failed.
    #[error(transparent)]
    Variant(#[from] VariantError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// WIT parsing error.
    #[error("WIT parsing error: {0}")]
    WitParse(#[from] anyhow::Error),

    /// No type with the requested name exists.
    #[error("Type '{0}' not found")]
    TypeNotFound(String),

    /// The type has no fixed Canonical ABI layout here.
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),
}

/// A [`Result`] type alias using the unified [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedType(msg.into())
    }

    /// Returns `true` if this is a layout calculator error.
    pub fn is_layout(&self) -> bool {
        matches!(self, Self::Layout(_))
    }

    /// Returns `true` if this is a variant access error.
    pub fn is_variant(&self) -> bool {
        matches!(self, Self::Variant(_))
    }

    /// Returns `true` if a type lookup failed.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::TypeNotFound(_))
    }

    /// Returns `true` if this is an I/O error.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
