//! `option<T>` as the two-case variant `{ none, some(T) }`.

use std::fmt;

use super::{Payload, Variant, VariantError};
use crate::descriptor::TypeDescriptor;

const NONE: u8 = 0;
const SOME: u8 = 1;

/// An optional value with the Canonical ABI layout of `option<T>`.
///
/// Spell the type with [`abi_option!`](crate::abi_option!).
pub struct AbiOption<T: Payload, const N: usize>(Variant<u8, ((), T), N>);

impl<T: Payload, const N: usize> AbiOption<T, N> {
    pub fn none() -> Self {
        Self(Variant::zeroed())
    }

    pub fn some(value: T) -> Result<Self, VariantError> {
        let mut inner = Variant::zeroed();
        inner.write_case(SOME, value)?;
        Ok(Self(inner))
    }

    pub fn is_some(&self) -> bool {
        self.0.is_case(SOME)
    }

    pub fn is_none(&self) -> bool {
        self.0.is_case(NONE)
    }

    /// The contained value, or `None`.
    pub fn get(&self) -> Result<Option<T>, VariantError> {
        self.0.case::<T>(SOME)
    }

    /// The underlying two-case variant.
    pub fn as_variant(&self) -> &Variant<u8, ((), T), N> {
        &self.0
    }

    pub fn from_bytes(bytes: [u8; N]) -> Result<Self, VariantError> {
        Variant::from_bytes(bytes).map(Self)
    }

    pub fn as_bytes(&self) -> &[u8; N] {
        self.0.as_bytes()
    }
}

impl<T: Payload, const N: usize> Default for AbiOption<T, N> {
    fn default() -> Self {
        Self::none()
    }
}

impl<T: Payload, const N: usize> TryFrom<Option<T>> for AbiOption<T, N> {
    type Error = VariantError;

    fn try_from(value: Option<T>) -> Result<Self, Self::Error> {
        match value {
            Some(value) => Self::some(value),
            None => Ok(Self::none()),
        }
    }
}

impl<T: Payload, const N: usize> Clone for AbiOption<T, N> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: Payload, const N: usize> PartialEq for AbiOption<T, N> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T: Payload, const N: usize> Eq for AbiOption<T, N> {}

impl<T: Payload + fmt::Debug, const N: usize> fmt::Debug for AbiOption<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Ok(Some(value)) => f.debug_tuple("Some").field(&value).finish(),
            Ok(None) => f.write_str("None"),
            Err(err) => write!(f, "AbiOption(<{err}>)"),
        }
    }
}

impl<T: Payload, const N: usize> Payload for AbiOption<T, N> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Option(Box::new(T::descriptor()))
    }

    fn store(&self, dst: &mut [u8]) -> Result<(), VariantError> {
        self.0.store(dst)
    }

    fn load(src: &[u8]) -> Result<Self, VariantError> {
        Variant::load(src).map(Self)
    }
}

/// The type of an [`AbiOption`] holding `$t`.
#[macro_export]
macro_rules! abi_option {
    ($t:ty) => {
        $crate::AbiOption<$t, { $crate::VariantLayout::of::<u8, ((), $t)>().size }>
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Target;
    use crate::variant::StringHandle;
    use std::mem::size_of;

    type OptU32 = crate::abi_option!(u32);
    type OptString = crate::abi_option!(StringHandle);

    #[test]
    fn test_option_layout() {
        assert_eq!(size_of::<OptU32>(), 8);
        assert_eq!(
            OptU32::descriptor().layout(Target::Native),
            Ok(crate::layout::Layout::new(8, 4))
        );
        assert_eq!(size_of::<OptString>(), 3 * size_of::<usize>());
    }

    #[test]
    fn test_some_and_none() -> Result<(), VariantError> {
        let some = OptU32::some(17)?;
        assert!(some.is_some());
        assert_eq!(some.get()?, Some(17));
        assert_eq!(some.as_bytes(), &[1, 0, 0, 0, 17, 0, 0, 0]);

        let none = OptU32::none();
        assert!(none.is_none());
        assert_eq!(none.get()?, None);
        assert_eq!(none, OptU32::default());
        Ok(())
    }

    #[test]
    fn test_from_std_option() -> Result<(), VariantError> {
        let handle = StringHandle::new(0x40, 5);
        let opt = OptString::try_from(Some(handle))?;
        assert_eq!(opt.get()?, Some(handle));
        assert!(OptString::try_from(None)?.is_none());
        Ok(())
    }

    #[test]
    fn test_none_ignores_stale_payload() -> Result<(), VariantError> {
        let opt = OptU32::from_bytes([0, 0, 0, 0, 9, 9, 9, 9])?;
        assert_eq!(opt, OptU32::none());
        assert_eq!(format!("{opt:?}"), "None");
        assert_eq!(format!("{:?}", OptU32::some(3)?), "Some(3)");
        Ok(())
    }
}
