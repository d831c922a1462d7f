//! Payload types that can occupy a variant case.

use std::fmt;
use std::marker::PhantomData;
use std::mem::size_of;

use super::VariantError;
use super::buffer::{read_array, read_slice, slice_mut, write_slice};
use crate::descriptor::TypeDescriptor;

/// A value that can be stored in a variant case.
///
/// `store` writes the value into the first `size_of::<Self>()` bytes of
/// `dst` exactly as the value is laid out in memory on a little-endian host,
/// and `load` reads it back. Keeping the byte image identical to the native
/// layout is what makes a [`Variant`](super::Variant) bit-compatible with a
/// native tagged union and with the Canonical ABI.
///
/// Implement this for `#[repr(C)]` records used as payloads:
///
/// ```ignore
/// #[repr(C)]
/// #[derive(Clone, Copy, Debug, Default, PartialEq)]
/// struct Point { x: u32, y: u32 }
///
/// impl Payload for Point {
///     fn descriptor() -> TypeDescriptor {
///         TypeDescriptor::Record(vec![TypeDescriptor::U32, TypeDescriptor::U32])
///     }
///     fn store(&self, dst: &mut [u8]) -> Result<(), VariantError> {
///         self.x.store(dst)?;
///         self.y.store(dst.get_mut(4..).unwrap_or_default())
///     }
///     fn load(src: &[u8]) -> Result<Self, VariantError> {
///         Ok(Point { x: u32::load(src)?, y: u32::load(src.get(4..).unwrap_or_default())? })
///     }
/// }
/// ```
pub trait Payload: Sized + 'static {
    /// The shape of this type, for layout introspection.
    fn descriptor() -> TypeDescriptor;

    fn store(&self, dst: &mut [u8]) -> Result<(), VariantError>;

    fn load(src: &[u8]) -> Result<Self, VariantError>;
}

macro_rules! le_payloads {
    ($($ty:ty => $desc:ident,)*) => {$(
        impl Payload for $ty {
            fn descriptor() -> TypeDescriptor {
                TypeDescriptor::$desc
            }

            #[inline]
            fn store(&self, dst: &mut [u8]) -> Result<(), VariantError> {
                write_slice(dst, 0, &self.to_le_bytes())
            }

            #[inline]
            fn load(src: &[u8]) -> Result<Self, VariantError> {
                Ok(<$ty>::from_le_bytes(read_array(src, 0)?))
            }
        }
    )*};
}

le_payloads! {
    u8 => U8,
    i8 => S8,
    u16 => U16,
    i16 => S16,
    u32 => U32,
    i32 => S32,
    u64 => U64,
    i64 => S64,
    u128 => U128,
    i128 => S128,
    f32 => F32,
    f64 => F64,
}

impl Payload for () {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Unit
    }

    fn store(&self, _dst: &mut [u8]) -> Result<(), VariantError> {
        Ok(())
    }

    fn load(_src: &[u8]) -> Result<Self, VariantError> {
        Ok(())
    }
}

impl Payload for bool {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Bool
    }

    fn store(&self, dst: &mut [u8]) -> Result<(), VariantError> {
        write_slice(dst, 0, &[u8::from(*self)])
    }

    fn load(src: &[u8]) -> Result<Self, VariantError> {
        match u8::load(src)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(VariantError::InvalidBool(other)),
        }
    }
}

impl Payload for char {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Char
    }

    fn store(&self, dst: &mut [u8]) -> Result<(), VariantError> {
        u32::from(*self).store(dst)
    }

    fn load(src: &[u8]) -> Result<Self, VariantError> {
        let code = u32::load(src)?;
        char::from_u32(code).ok_or(VariantError::InvalidChar(code))
    }
}

impl<T: Payload + Default, const N: usize> Payload for [T; N] {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::array(T::descriptor(), N)
    }

    fn store(&self, dst: &mut [u8]) -> Result<(), VariantError> {
        let stride = size_of::<T>();
        for (i, item) in self.iter().enumerate() {
            item.store(slice_mut(dst, i * stride, stride)?)?;
        }
        Ok(())
    }

    fn load(src: &[u8]) -> Result<Self, VariantError> {
        let stride = size_of::<T>();
        let mut items: [T; N] = std::array::from_fn(|_| T::default());
        for (i, slot) in items.iter_mut().enumerate() {
            *slot = T::load(read_slice(src, i * stride, stride)?)?;
        }
        Ok(items)
    }
}

/// Write a pointer-sized `(ptr, len)` pair.
fn store_pair(ptr: usize, len: usize, dst: &mut [u8]) -> Result<(), VariantError> {
    write_slice(dst, 0, &ptr.to_le_bytes())?;
    write_slice(dst, size_of::<usize>(), &len.to_le_bytes())
}

fn load_pair(src: &[u8]) -> Result<(usize, usize), VariantError> {
    let ptr = usize::from_le_bytes(read_array(src, 0)?);
    let len = usize::from_le_bytes(read_array(src, size_of::<usize>())?);
    Ok((ptr, len))
}

/// A string in linear memory: the address of its UTF-8 bytes and their count.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct StringHandle {
    pub ptr: usize,
    pub len: usize,
}

impl StringHandle {
    pub const fn new(ptr: usize, len: usize) -> Self {
        Self { ptr, len }
    }
}

impl Payload for StringHandle {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::String
    }

    fn store(&self, dst: &mut [u8]) -> Result<(), VariantError> {
        store_pair(self.ptr, self.len, dst)
    }

    fn load(src: &[u8]) -> Result<Self, VariantError> {
        let (ptr, len) = load_pair(src)?;
        Ok(Self { ptr, len })
    }
}

/// A list in linear memory: the address of its first element and the number
/// of elements.
#[repr(C)]
pub struct ListHandle<T> {
    pub ptr: usize,
    pub len: usize,
    _element: PhantomData<fn() -> T>,
}

impl<T> ListHandle<T> {
    pub const fn new(ptr: usize, len: usize) -> Self {
        Self {
            ptr,
            len,
            _element: PhantomData,
        }
    }
}

impl<T> Clone for ListHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ListHandle<T> {}

impl<T> Default for ListHandle<T> {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl<T> PartialEq for ListHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr == other.ptr && self.len == other.len
    }
}

impl<T> Eq for ListHandle<T> {}

impl<T> fmt::Debug for ListHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListHandle")
            .field("ptr", &self.ptr)
            .field("len", &self.len)
            .finish()
    }
}

impl<T: Payload> Payload for ListHandle<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::List(Box::new(T::descriptor()))
    }

    fn store(&self, dst: &mut [u8]) -> Result<(), VariantError> {
        store_pair(self.ptr, self.len, dst)
    }

    fn load(src: &[u8]) -> Result<Self, VariantError> {
        let (ptr, len) = load_pair(src)?;
        Ok(Self::new(ptr, len))
    }
}
