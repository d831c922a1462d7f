//! `result<O, E>` as the two-case variant `{ ok(O), err(E) }`.

use std::fmt;

use super::{Payload, Variant, VariantError};
use crate::descriptor::TypeDescriptor;

const OK: u8 = 0;
const ERR: u8 = 1;

/// A success-or-failure value with the Canonical ABI layout of
/// `result<O, E>`. Use `()` for a side without payload.
///
/// Spell the type with [`abi_result!`](crate::abi_result!).
pub struct AbiResult<O: Payload, E: Payload, const N: usize>(Variant<u8, (O, E), N>);

impl<O: Payload, E: Payload, const N: usize> AbiResult<O, E, N> {
    pub fn ok(value: O) -> Result<Self, VariantError> {
        let mut inner = Variant::zeroed();
        inner.write_case(OK, value)?;
        Ok(Self(inner))
    }

    pub fn err(error: E) -> Result<Self, VariantError> {
        let mut inner = Variant::zeroed();
        inner.write_case(ERR, error)?;
        Ok(Self(inner))
    }

    pub fn is_ok(&self) -> bool {
        self.0.is_case(OK)
    }

    pub fn is_err(&self) -> bool {
        self.0.is_case(ERR)
    }

    /// Decode into a standard `Result`.
    ///
    /// The outer error reports a malformed buffer; the inner `Result` is the
    /// stored value.
    pub fn into_result(&self) -> Result<Result<O, E>, VariantError> {
        if let Some(value) = self.0.case::<O>(OK)? {
            return Ok(Ok(value));
        }
        match self.0.case::<E>(ERR)? {
            Some(error) => Ok(Err(error)),
            None => Err(VariantError::OutOfRange {
                tag: self.0.tag().into(),
                cases: 2,
            }),
        }
    }

    pub fn as_variant(&self) -> &Variant<u8, (O, E), N> {
        &self.0
    }

    pub fn from_bytes(bytes: [u8; N]) -> Result<Self, VariantError> {
        Variant::from_bytes(bytes).map(Self)
    }

    pub fn as_bytes(&self) -> &[u8; N] {
        self.0.as_bytes()
    }
}

impl<O: Payload, E: Payload, const N: usize> TryFrom<Result<O, E>> for AbiResult<O, E, N> {
    type Error = VariantError;

    fn try_from(value: Result<O, E>) -> Result<Self, Self::Error> {
        match value {
            Ok(value) => Self::ok(value),
            Err(error) => Self::err(error),
        }
    }
}

impl<O: Payload, E: Payload, const N: usize> Clone for AbiResult<O, E, N> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<O: Payload, E: Payload, const N: usize> PartialEq for AbiResult<O, E, N> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<O: Payload, E: Payload, const N: usize> Eq for AbiResult<O, E, N> {}

impl<O, E, const N: usize> fmt::Debug for AbiResult<O, E, N>
where
    O: Payload + fmt::Debug,
    E: Payload + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.into_result() {
            Ok(Ok(value)) => f.debug_tuple("Ok").field(&value).finish(),
            Ok(Err(error)) => f.debug_tuple("Err").field(&error).finish(),
            Err(err) => write!(f, "AbiResult(<{err}>)"),
        }
    }
}

impl<O: Payload, E: Payload, const N: usize> Payload for AbiResult<O, E, N> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::result(O::descriptor(), E::descriptor())
    }

    fn store(&self, dst: &mut [u8]) -> Result<(), VariantError> {
        self.0.store(dst)
    }

    fn load(src: &[u8]) -> Result<Self, VariantError> {
        Variant::load(src).map(Self)
    }
}

/// The type of an [`AbiResult`] with success type `$ok` and error type `$err`.
#[macro_export]
macro_rules! abi_result {
    ($ok:ty, $err:ty) => {
        $crate::AbiResult<$ok, $err, { $crate::VariantLayout::of::<u8, ($ok, $err)>().size }>
    };
}
