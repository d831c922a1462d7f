//! Canonical ABI variant layout and inline variant values.
//!
//! This library computes where a tagged union's payload lives and how large
//! it is under the WebAssembly Component Model's Canonical ABI, and provides
//! [`Variant`], a fixed-size inline value whose bytes follow that layout.
//!
//! # Quick Start
//!
//! ```ignore
//! use wit_layout::prelude::*;
//!
//! // Layout from raw case sizes and alignments
//! let layout = compute_layout(1, &[9, 8], &[1, 8])?;
//! assert_eq!((layout.size, layout.alignment, layout.data_offset), (24, 8, 8));
//!
//! // A value whose Rust type has exactly that layout
//! type Shape = variant!(u8; [u8; 9], u64);
//! let shape = Shape::new(1, 42u64)?;
//! assert_eq!(shape.case::<u64>(1)?, Some(42));
//! assert_eq!(std::mem::size_of::<Shape>(), 24);
//! ```
//!
//! # Modules
//!
//! - [`layout`] - Variant and record layout calculator, layout cache
//! - [`variant`] - Inline variant values, options and results
//! - [`descriptor`] - Shape descriptors and per-target size/alignment
//! - [`policy`] - The build-time bounds-check policy
//! - [`wit`] - Descriptors from WIT definitions (requires `wit` feature)
//! - [`report`] - Layout reports for named WIT types (requires `wit` feature)
//!
//! # Feature Flags
//!
//! - `wit` - Enable WIT loading and reports (enabled by default)
//! - `serde` - Serialize layouts and reports
//! - `logging` - Enable library-level tracing (consumers provide their own subscriber)
//! - `unchecked` - Skip tag and type validation on variant access
//! - `cli` - Enable the command-line interface binary
//! - `full` - Enable all features except `unchecked`

mod logging;

pub mod descriptor;
mod error;
pub mod layout;
pub mod policy;
pub mod prelude;
pub mod variant;

#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "wit")]
pub mod report;
#[cfg(feature = "wit")]
pub mod wit;

// Re-export the unified error type
pub use error::{Error, Result};

pub use descriptor::{DiscriminantWidth, ParseTargetError, Target, TypeDescriptor};
pub use layout::{
    Layout, LayoutCache, LayoutError, VariantLayout, align_to, checked_align_to, compute_layout,
    field_offsets, record_layout,
};
pub use policy::BOUNDS_CHECK;
pub use variant::{
    AbiOption, AbiResult, Cases, Discriminant, ListHandle, Payload, StringHandle, Variant,
    VariantError,
};

#[cfg(feature = "wit")]
pub use report::TypeReport;
#[cfg(feature = "wit")]
pub use wit_parser::{Resolve, Type, TypeId};
