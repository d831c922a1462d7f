//! Buffer read/write helpers for payload encoding.

use super::VariantError;

/// Safe buffer slice read helper.
#[inline]
pub fn read_slice(buffer: &[u8], start: usize, len: usize) -> Result<&[u8], VariantError> {
    buffer
        .get(start..start + len)
        .ok_or(VariantError::BufferTooSmall {
            needed: start + len,
            available: buffer.len(),
        })
}

/// Read exactly `N` bytes starting at `start`.
#[inline]
pub fn read_array<const N: usize>(buffer: &[u8], start: usize) -> Result<[u8; N], VariantError> {
    let bytes = read_slice(buffer, start, N)?;
    <[u8; N]>::try_from(bytes).map_err(|_| VariantError::BufferTooSmall {
        needed: start + N,
        available: buffer.len(),
    })
}

/// Safe buffer slice write helper.
#[inline]
pub fn write_slice(buffer: &mut [u8], start: usize, data: &[u8]) -> Result<(), VariantError> {
    let end = start + data.len();
    let len = buffer.len();
    buffer
        .get_mut(start..end)
        .ok_or(VariantError::BufferTooSmall {
            needed: end,
            available: len,
        })?
        .copy_from_slice(data);
    Ok(())
}

/// Mutable view of `len` bytes starting at `start`.
#[inline]
pub fn slice_mut(buffer: &mut [u8], start: usize, len: usize) -> Result<&mut [u8], VariantError> {
    let available = buffer.len();
    buffer
        .get_mut(start..start + len)
        .ok_or(VariantError::BufferTooSmall {
            needed: start + len,
            available,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_past_end() {
        let buf = [1u8, 2, 3];
        assert_eq!(read_slice(&buf, 1, 2), Ok(&[2u8, 3][..]));
        assert_eq!(
            read_slice(&buf, 2, 2),
            Err(VariantError::BufferTooSmall { needed: 4, available: 3 })
        );
        assert_eq!(read_array::<2>(&buf, 0), Ok([1, 2]));
    }

    #[test]
    fn test_write_past_end() {
        let mut buf = [0u8; 4];
        assert_eq!(write_slice(&mut buf, 2, &[7, 8]), Ok(()));
        assert_eq!(buf, [0, 0, 7, 8]);
        assert_eq!(
            write_slice(&mut buf, 3, &[1, 2]),
            Err(VariantError::BufferTooSmall { needed: 5, available: 4 })
        );
    }
}
