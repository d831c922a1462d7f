//! In-memory variant values with Canonical ABI layout.
//!
//! A [`Variant`] owns an inline byte buffer exactly as large as its computed
//! [`VariantLayout`]: the discriminant sits in the first bytes, the active
//! case's payload starts at the data offset, and the rest is slack whose
//! contents are unspecified. The Rust type itself has the same size and
//! alignment as that layout, so a `Variant` can be placed wherever the native
//! tagged union would go.
//!
//! Case types are given as a tuple, and the buffer length is derived from
//! them by the [`variant!`](crate::variant!) macro:
//!
//! ```ignore
//! use wit_layout::{variant, StringHandle};
//!
//! type Value = variant!(u8; u64, StringHandle, ());
//!
//! let v = Value::new(0, 42u64)?;
//! assert_eq!(v.tag(), 0);
//! assert_eq!(v.case::<u64>(0)?, Some(42));
//! assert_eq!(v.case::<StringHandle>(1)?, None);
//! ```
//!
//! # Module Organization
//!
//! - [`error`]: Error types for construction and access
//! - [`buffer`]: Bounds-checked byte slice helpers
//! - [`payload`]: The [`Payload`] codec and handle types
//! - [`option`]: `option<T>` as a two-case variant
//! - [`result`]: `result<O, E>` as a two-case variant

mod buffer;
mod error;
mod option;
mod payload;
mod result;

pub use error::VariantError;
pub use option::AbiOption;
pub use payload::{ListHandle, Payload, StringHandle};
pub use result::AbiResult;

use std::any::{TypeId, type_name};
use std::fmt;
use std::marker::PhantomData;
use std::mem::{ManuallyDrop, size_of};

use buffer::{read_array, read_slice, slice_mut, write_slice};

use crate::descriptor::{DiscriminantWidth, TypeDescriptor};
use crate::layout::{Layout, VariantLayout};
use crate::logging::debug;
use crate::policy::BOUNDS_CHECK;

/// An unsigned integer type used as a variant's tag.
pub trait Discriminant: Payload + Copy + Eq + fmt::Debug {
    const WIDTH: DiscriminantWidth;

    fn index(self) -> usize;

    fn from_index(index: usize) -> Option<Self>;

    /// Decode from the leading bytes of `src`, treating missing bytes as zero.
    fn from_le_prefix(src: &[u8]) -> Self;
}

macro_rules! discriminants {
    ($($ty:ty => $width:ident,)*) => {$(
        impl Discriminant for $ty {
            const WIDTH: DiscriminantWidth = DiscriminantWidth::$width;

            #[inline]
            fn index(self) -> usize {
                self as usize
            }

            #[inline]
            fn from_index(index: usize) -> Option<Self> {
                <$ty>::try_from(index).ok()
            }

            #[inline]
            fn from_le_prefix(src: &[u8]) -> Self {
                let mut raw = [0u8; size_of::<$ty>()];
                for (dst, byte) in raw.iter_mut().zip(src) {
                    *dst = *byte;
                }
                <$ty>::from_le_bytes(raw)
            }
        }
    )*};
}

discriminants! {
    u8 => U8,
    u16 => U16,
    u32 => U32,
}

/// An ordered set of case payload types, written as a tuple.
///
/// Implemented for tuples of one to eight [`Payload`] types. Use `()` for a
/// case without payload.
pub trait Cases: 'static {
    /// Zero-sized in use; only its alignment matters. It is the union of the
    /// case types, so it carries the largest case alignment.
    #[doc(hidden)]
    type Storage;

    /// Native layout of each case, in tag order.
    const LAYOUTS: &'static [Layout];

    const COUNT: usize = Self::LAYOUTS.len();

    /// Identity of the type registered for `tag`.
    fn type_id(tag: usize) -> Option<TypeId>;

    /// Name of the type registered for `tag`, for error messages.
    fn type_name(tag: usize) -> Option<&'static str>;

    fn descriptors() -> Vec<TypeDescriptor>;
}

macro_rules! impl_cases {
    ($storage:ident { $($field:ident: $ty:ident),+ }) => {
        #[doc(hidden)]
        #[repr(C)]
        #[allow(dead_code)]
        pub union $storage<$($ty),+> {
            $($field: ManuallyDrop<$ty>,)+
        }

        impl<$($ty: Payload),+> Cases for ($($ty,)+) {
            type Storage = $storage<$($ty),+>;

            const LAYOUTS: &'static [Layout] = &[$(Layout::of::<$ty>()),+];

            fn type_id(tag: usize) -> Option<TypeId> {
                [$(TypeId::of::<$ty>()),+].get(tag).copied()
            }

            fn type_name(tag: usize) -> Option<&'static str> {
                [$(type_name::<$ty>()),+].get(tag).copied()
            }

            fn descriptors() -> Vec<TypeDescriptor> {
                vec![$(<$ty as Payload>::descriptor()),+]
            }
        }
    };
}

impl_cases!(Storage1 { c0: A });
impl_cases!(Storage2 { c0: A, c1: B });
impl_cases!(Storage3 { c0: A, c1: B, c2: C });
impl_cases!(Storage4 { c0: A, c1: B, c2: C, c3: D });
impl_cases!(Storage5 { c0: A, c1: B, c2: C, c3: D, c4: E });
impl_cases!(Storage6 { c0: A, c1: B, c2: C, c3: D, c4: E, c5: F });
impl_cases!(Storage7 { c0: A, c1: B, c2: C, c3: D, c4: E, c5: F, c6: G });
impl_cases!(Storage8 { c0: A, c1: B, c2: C, c3: D, c4: E, c5: F, c6: G, c7: H });

/// A tagged union of the cases `C`, discriminated by `D`, stored in `N`
/// inline bytes.
///
/// `N` must equal `VariantLayout::of::<D, C>().size`; this is checked at
/// compile time. Spell the type with [`variant!`](crate::variant!) rather
/// than by hand.
#[repr(C)]
pub struct Variant<D: Discriminant, C: Cases, const N: usize> {
    _align: [C::Storage; 0],
    _tag: [D; 0],
    _cases: PhantomData<fn() -> C>,
    bytes: [u8; N],
}

impl<D: Discriminant, C: Cases, const N: usize> Variant<D, C, N> {
    pub const LAYOUT: VariantLayout = VariantLayout::of::<D, C>();

    /// A value with every byte zero: tag 0 with an all-zero payload.
    pub(crate) fn zeroed() -> Self {
        const {
            assert!(
                N == Self::LAYOUT.size,
                "variant buffer length must equal its layout size"
            )
        };
        Self {
            _align: [],
            _tag: [],
            _cases: PhantomData,
            bytes: [0; N],
        }
    }

    /// Construct a value holding `value` in case `tag`.
    ///
    /// Fails with [`VariantError::OutOfRange`] or [`VariantError::TypeMismatch`]
    /// when the bounds-check policy is on and `T` is not the type registered
    /// for `tag`.
    pub fn new<T: Payload>(tag: D, value: T) -> Result<Self, VariantError> {
        let mut variant = Self::zeroed();
        variant.set(tag, value)?;
        Ok(variant)
    }

    /// Make `tag` the active case, holding `value`.
    ///
    /// Bytes outside the new payload are left as they were.
    pub fn set<T: Payload>(&mut self, tag: D, value: T) -> Result<(), VariantError> {
        Self::check::<T>(tag.index())?;
        self.write_case(tag, value)
    }

    pub(crate) fn write_case<T: Payload>(&mut self, tag: D, value: T) -> Result<(), VariantError> {
        let offset = Self::LAYOUT.data_offset;
        value.store(slice_mut(&mut self.bytes, offset, size_of::<T>())?)?;
        tag.store(&mut self.bytes)
    }

    /// The active case.
    pub fn tag(&self) -> D {
        D::from_le_prefix(&self.bytes)
    }

    pub fn is_case(&self, tag: D) -> bool {
        self.tag() == tag
    }

    /// The payload of case `tag`, or `None` if another case is active.
    ///
    /// Fails with [`VariantError::OutOfRange`] or [`VariantError::TypeMismatch`]
    /// when the bounds-check policy is on and `T` is not the type registered
    /// for `tag`.
    pub fn case<T: Payload>(&self, tag: D) -> Result<Option<T>, VariantError> {
        Self::check::<T>(tag.index())?;
        if self.tag() != tag {
            return Ok(None);
        }
        let offset = Self::LAYOUT.data_offset;
        T::load(read_slice(&self.bytes, offset, size_of::<T>())?).map(Some)
    }

    /// Adopt a buffer written elsewhere, such as by the other side of a
    /// component boundary.
    pub fn from_bytes(bytes: [u8; N]) -> Result<Self, VariantError> {
        let mut variant = Self::zeroed();
        variant.bytes = bytes;
        if BOUNDS_CHECK {
            let tag = variant.tag().index();
            if tag >= C::COUNT {
                debug!(tag, cases = C::COUNT, "foreign variant buffer has invalid tag");
                return Err(VariantError::OutOfRange {
                    tag,
                    cases: C::COUNT,
                });
            }
        }
        Ok(variant)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, VariantError> {
        let bytes = <[u8; N]>::try_from(bytes).map_err(|_| VariantError::SizeMismatch {
            expected: N,
            got: bytes.len(),
        })?;
        Self::from_bytes(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; N] {
        &self.bytes
    }

    pub fn into_bytes(self) -> [u8; N] {
        self.bytes
    }

    pub const fn case_count() -> usize {
        C::COUNT
    }

    /// Bytes of the active payload; slack is excluded.
    fn payload_bytes(&self) -> &[u8] {
        let len = C::LAYOUTS
            .get(self.tag().index())
            .map_or(0, |layout| layout.size);
        read_slice(&self.bytes, Self::LAYOUT.data_offset, len).unwrap_or_default()
    }

    fn check<T: Payload>(tag: usize) -> Result<(), VariantError> {
        if !BOUNDS_CHECK {
            return Ok(());
        }
        let Some(expected) = C::type_id(tag) else {
            debug!(tag, cases = C::COUNT, "variant case out of range");
            return Err(VariantError::OutOfRange {
                tag,
                cases: C::COUNT,
            });
        };
        if expected != TypeId::of::<T>() {
            let expected = C::type_name(tag).unwrap_or("<unknown>");
            let got = type_name::<T>();
            debug!(tag, expected, got, "variant case type mismatch");
            return Err(VariantError::TypeMismatch { tag, expected, got });
        }
        Ok(())
    }
}

impl<D: Discriminant, C: Cases, const N: usize> Clone for Variant<D, C, N> {
    fn clone(&self) -> Self {
        let mut variant = Self::zeroed();
        variant.bytes = self.bytes;
        variant
    }
}

/// Two values are equal when the same case is active with the same payload
/// bytes; slack is ignored.
impl<D: Discriminant, C: Cases, const N: usize> PartialEq for Variant<D, C, N> {
    fn eq(&self, other: &Self) -> bool {
        self.tag() == other.tag() && self.payload_bytes() == other.payload_bytes()
    }
}

impl<D: Discriminant, C: Cases, const N: usize> Eq for Variant<D, C, N> {}

impl<D: Discriminant, C: Cases, const N: usize> fmt::Debug for Variant<D, C, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variant")
            .field("tag", &self.tag())
            .field("payload", &self.payload_bytes())
            .finish()
    }
}

impl<D: Discriminant, C: Cases, const N: usize> Payload for Variant<D, C, N> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Variant {
            tag: D::WIDTH,
            cases: C::descriptors(),
        }
    }

    fn store(&self, dst: &mut [u8]) -> Result<(), VariantError> {
        write_slice(dst, 0, &self.bytes)
    }

    fn load(src: &[u8]) -> Result<Self, VariantError> {
        Self::from_bytes(read_array(src, 0)?)
    }
}

/// The type of a variant with discriminant `$tag` and the listed cases.
///
/// ```ignore
/// type Shape = wit_layout::variant!(u8; [u8; 9], u64);
/// assert_eq!(std::mem::size_of::<Shape>(), 24);
/// ```
#[macro_export]
macro_rules! variant {
    ($tag:ty; $($case:ty),+ $(,)?) => {
        $crate::Variant<
            $tag,
            ($($case,)+),
            { $crate::VariantLayout::of::<$tag, ($($case,)+)>().size },
        >
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Target;
    use std::mem::align_of;

    type Wide = crate::variant!(u8; u64, u32);
    type Narrow = crate::variant!(u8; u32, u8);
    type Oversized = crate::variant!(u8; [u8; 9], u64);
    type Strings = crate::variant!(u8; StringHandle, ());

    #[test]
    fn test_native_size_matches_layout() {
        assert_eq!(size_of::<Wide>(), 16);
        assert_eq!(align_of::<Wide>(), 8);
        assert_eq!(size_of::<Narrow>(), 8);
        assert_eq!(align_of::<Narrow>(), 4);
        assert_eq!(size_of::<Oversized>(), 24);
        assert_eq!(align_of::<Oversized>(), 8);
        assert_eq!(Strings::LAYOUT.data_offset, size_of::<usize>());
        assert_eq!(size_of::<Strings>(), Strings::LAYOUT.size);
    }

    #[test]
    fn test_roundtrip_each_case() -> Result<(), VariantError> {
        let v = Wide::new(0, u64::MAX - 1)?;
        assert_eq!(v.case::<u64>(0)?, Some(u64::MAX - 1));

        let v = Wide::new(1, 7u32)?;
        assert_eq!(v.case::<u32>(1)?, Some(7));
        assert_eq!(v.case::<u64>(0)?, None);

        let v = Oversized::new(0, [9u8; 9])?;
        assert_eq!(v.case::<[u8; 9]>(0)?, Some([9u8; 9]));
        Ok(())
    }

    #[test]
    fn test_byte_image() -> Result<(), VariantError> {
        let v = Narrow::new(1, 0xabu8)?;
        let bytes = v.as_bytes();
        assert_eq!(bytes.first(), Some(&1));
        assert_eq!(bytes.get(4), Some(&0xab));

        type WideTag = crate::variant!(u16; u8, u8);
        let v = WideTag::new(1, 3u8)?;
        assert_eq!(v.as_bytes(), &[1, 0, 3, 0]);
        Ok(())
    }

    #[test]
    fn test_tag_is_stable() -> Result<(), VariantError> {
        let v = Wide::new(1, 5u32)?;
        assert_eq!(v.tag(), 1);
        assert_eq!(v.tag(), 1);
        assert!(v.is_case(1));
        Ok(())
    }

    #[test]
    fn test_set_switches_case() -> Result<(), VariantError> {
        let mut v = Wide::new(0, u64::MAX)?;
        v.set(1, 3u32)?;
        assert_eq!(v.tag(), 1);
        assert_eq!(v.case::<u32>(1)?, Some(3));
        assert_eq!(v, Wide::new(1, 3u32)?);
        Ok(())
    }

    #[test]
    fn test_out_of_range() {
        if !BOUNDS_CHECK {
            return;
        }
        assert_eq!(
            Wide::new(2, 1u32),
            Err(VariantError::OutOfRange { tag: 2, cases: 2 })
        );
        let v = Wide::zeroed();
        assert!(matches!(
            v.case::<u32>(9),
            Err(VariantError::OutOfRange { tag: 9, cases: 2 })
        ));
    }

    #[test]
    fn test_type_mismatch() {
        if !BOUNDS_CHECK {
            return;
        }
        assert!(matches!(
            Narrow::new(0, 1u8),
            Err(VariantError::TypeMismatch { tag: 0, .. })
        ));
        let v = Narrow::zeroed();
        match v.case::<StringHandle>(0) {
            Err(VariantError::TypeMismatch { expected, got, .. }) => {
                assert_eq!(expected, "u32");
                assert!(got.ends_with("StringHandle"));
            }
            other => panic!("expected a type mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_from_bytes() -> Result<(), VariantError> {
        let v = Narrow::from_bytes([0, 0, 0, 0, 0x44, 0x33, 0x22, 0x11])?;
        assert_eq!(v.case::<u32>(0)?, Some(0x1122_3344));

        assert_eq!(
            Narrow::from_slice(&[0; 3]),
            Err(VariantError::SizeMismatch { expected: 8, got: 3 })
        );
        if BOUNDS_CHECK {
            assert_eq!(
                Narrow::from_bytes([5, 0, 0, 0, 0, 0, 0, 0]),
                Err(VariantError::OutOfRange { tag: 5, cases: 2 })
            );
        }
        Ok(())
    }

    #[test]
    fn test_equality_ignores_slack() -> Result<(), VariantError> {
        let mut a = Wide::new(0, u64::MAX)?;
        a.set(1, 1u32)?;
        let b = Wide::new(1, 1u32)?;
        assert_eq!(a, b);
        assert_ne!(a, Wide::new(1, 2u32)?);
        Ok(())
    }

    #[test]
    fn test_nested_variant() -> Result<(), VariantError> {
        type Outer = crate::variant!(u8; Narrow, u8);
        let inner = Narrow::new(0, 99u32)?;
        let outer = Outer::new(0, inner.clone())?;
        assert_eq!(outer.case::<Narrow>(0)?, Some(inner));
        assert_eq!(size_of::<Outer>(), Outer::LAYOUT.size);
        assert_eq!(Outer::LAYOUT.data_offset, 4);
        Ok(())
    }

    #[test]
    fn test_descriptor_layout_matches_type() {
        let descriptor = Oversized::descriptor();
        assert_eq!(descriptor.variant_layout(Target::Native), Ok(Some(Oversized::LAYOUT)));
        assert_eq!(descriptor.to_string(), "variant { list<u8, 9>; u64 }");
        assert_eq!(Wide::case_count(), 2);
    }
}
