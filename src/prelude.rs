//! Convenient re-exports for common usage patterns.
//!
//! # Example
//!
//! ```ignore
//! use wit_layout::prelude::*;
//!
//! type Value = variant!(u8; u64, StringHandle, ());
//! let value = Value::new(1, StringHandle::new(0x100, 5))?;
//! assert!(value.is_case(1));
//! ```

// Unified error handling
pub use crate::error::{Error, Result};

// Layout calculation
pub use crate::layout::{
    Layout, LayoutCache, LayoutError, VariantLayout, align_to, checked_align_to, compute_layout,
    record_layout,
};

// Descriptors
pub use crate::descriptor::{DiscriminantWidth, Target, TypeDescriptor};

// Variant values
pub use crate::policy::BOUNDS_CHECK;
pub use crate::variant::{
    AbiOption, AbiResult, Cases, Discriminant, ListHandle, Payload, StringHandle, Variant,
    VariantError,
};
pub use crate::{abi_option, abi_result, variant};

// WIT loading (requires "wit" feature)
#[cfg(feature = "wit")]
pub use crate::report::{TypeReport, describe};
#[cfg(feature = "wit")]
pub use crate::wit::{descriptor as wit_descriptor, load_descriptor};
