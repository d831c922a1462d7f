//! Bounds-check policy for variant access.
//!
//! [`BOUNDS_CHECK`] is fixed when the crate is built and cannot change while
//! a program runs, so every [`Variant`](crate::Variant) in a process is
//! validated the same way.
//!
//! With the policy on (the default), [`Variant::new`](crate::Variant::new),
//! [`Variant::set`](crate::Variant::set), [`Variant::case`](crate::Variant::case)
//! and [`Variant::from_bytes`](crate::Variant::from_bytes) check that the tag
//! names a declared case and that the requested Rust type is the one
//! registered for that case. A failed check returns
//! [`VariantError::OutOfRange`](crate::VariantError::OutOfRange) or
//! [`VariantError::TypeMismatch`](crate::VariantError::TypeMismatch). These
//! are programming errors in binding code and should be treated as fatal.
//!
//! Building with the `unchecked` feature turns the policy off for targets
//! where the extra code or the error paths are unaffordable. The same calls
//! then trust the caller: a wrong tag or type is not reported, and the value
//! read back is unspecified. It is never memory-unsafe, because payloads are
//! always copied through bounds-checked byte slices. A payload type too
//! large for the buffer still fails with
//! [`VariantError::BufferTooSmall`](crate::VariantError::BufferTooSmall).
//!
//! Cargo features are unified across a build, so enabling `unchecked` in any
//! crate disables validation for every user of this crate in that build.

/// Whether variant construction and extraction validate tags and types.
pub const BOUNDS_CHECK: bool = !cfg!(feature = "unchecked");
