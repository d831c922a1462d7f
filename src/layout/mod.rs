//! Canonical ABI layout of tagged unions.
//!
//! A variant is laid out the way a systems compiler lays out a native tagged
//! union: the discriminant comes first, padding brings the payload up to the
//! union's alignment, and the whole value is padded to a multiple of that
//! alignment so arrays of it stay aligned.
//!
//! ```text
//! variant { u8, u64 }   with a u8 discriminant
//!
//! 0        1                8                        16
//! +--------+----------------+------------------------+
//! |  tag   |    padding     |  payload (max 8 bytes)  |
//! +--------+----------------+------------------------+
//! ```
//!
//! # Module Organization
//!
//! - [`error`]: Error types for malformed calculator inputs
//! - [`cache`]: Memoised layouts for descriptor-driven callers

mod cache;
mod error;

pub use cache::LayoutCache;
pub use error::LayoutError;

use crate::variant::{Cases, Discriminant};

/// Align a value up to the nearest multiple of alignment.
///
/// `align` must be a non-zero power of two, and the rounded value must fit in
/// `usize`; see [`checked_align_to`] for untrusted inputs.
#[inline]
pub const fn align_to(val: usize, align: usize) -> usize {
    (val + align - 1) & !(align - 1)
}

/// [`align_to`] that returns `None` when the rounded value does not fit in
/// `usize`.
///
/// `align` must be a non-zero power of two.
#[inline]
pub const fn checked_align_to(val: usize, align: usize) -> Option<usize> {
    match val.checked_add(align - 1) {
        Some(bumped) => Some(bumped & !(align - 1)),
        None => None,
    }
}

/// Size and alignment of a single type, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Layout {
    pub size: usize,
    pub align: usize,
}

impl Layout {
    /// The layout of a payload-less case.
    pub const EMPTY: Layout = Layout { size: 0, align: 1 };

    pub const fn new(size: usize, align: usize) -> Self {
        Self { size, align }
    }

    /// The native layout of `T`.
    pub const fn of<T>() -> Self {
        Self {
            size: std::mem::size_of::<T>(),
            align: std::mem::align_of::<T>(),
        }
    }
}

/// Geometry of a tagged union: where the payload starts, how large the whole
/// value is, and how it must be aligned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct VariantLayout {
    pub alignment: usize,
    pub data_offset: usize,
    pub size: usize,
}

impl VariantLayout {
    /// Compute the layout of a variant from its discriminant width and the
    /// layouts of its cases.
    ///
    /// This is the infallible form of [`compute_layout`]; it trusts that the
    /// discriminant width and every case alignment are powers of two and that
    /// the result fits in `usize`, which holds for anything derived from real
    /// Rust types.
    pub const fn compute(discriminant_width: usize, cases: &[Layout]) -> Self {
        let (alignment, max_size) = widest(discriminant_width, cases);
        let data_offset = align_to(discriminant_width, alignment);
        Self {
            alignment,
            data_offset,
            size: align_to(data_offset + max_size, alignment),
        }
    }

    /// [`VariantLayout::compute`] that returns `None` instead of overflowing.
    pub const fn checked_compute(discriminant_width: usize, cases: &[Layout]) -> Option<Self> {
        let (alignment, max_size) = widest(discriminant_width, cases);
        let Some(data_offset) = checked_align_to(discriminant_width, alignment) else {
            return None;
        };
        let Some(end) = data_offset.checked_add(max_size) else {
            return None;
        };
        let Some(size) = checked_align_to(end, alignment) else {
            return None;
        };
        Some(Self {
            alignment,
            data_offset,
            size,
        })
    }

    /// The layout of a statically typed variant with discriminant `D` and
    /// case set `C`.
    pub const fn of<D: Discriminant, C: Cases>() -> Self {
        Self::compute(D::WIDTH.bytes(), C::LAYOUTS)
    }

    /// The layout as a plain size/alignment pair, for use as a field or case
    /// of an enclosing type.
    pub const fn as_layout(&self) -> Layout {
        Layout {
            size: self.size,
            align: self.alignment,
        }
    }
}

/// Largest alignment and largest size across the discriminant and the cases.
const fn widest(discriminant_width: usize, cases: &[Layout]) -> (usize, usize) {
    let mut alignment = discriminant_width;
    let mut max_size = 0;
    let mut rest = cases;
    while let [case, tail @ ..] = rest {
        if case.align > alignment {
            alignment = case.align;
        }
        if case.size > max_size {
            max_size = case.size;
        }
        rest = tail;
    }
    (alignment, max_size)
}

/// Compute a variant layout from parallel sequences of case sizes and
/// alignments.
///
/// The discriminant width must be a non-zero power of two (1, 2, 4, ...), not
/// just any positive width; a width such as 3 is rejected with
/// [`LayoutError::InvalidDiscriminant`]. Every case alignment must be a
/// non-zero power of two as well. Inputs whose layout does not fit in `usize`
/// fail with [`LayoutError::Overflow`].
///
/// An empty case list describes a variant whose every case carries no
/// payload; its size is the discriminant rounded up to its own alignment.
pub fn compute_layout(
    discriminant_width: usize,
    case_sizes: &[usize],
    case_alignments: &[usize],
) -> Result<VariantLayout, LayoutError> {
    if !discriminant_width.is_power_of_two() {
        return Err(LayoutError::InvalidDiscriminant(discriminant_width));
    }
    if case_sizes.len() != case_alignments.len() {
        return Err(LayoutError::CaseCountMismatch {
            sizes: case_sizes.len(),
            alignments: case_alignments.len(),
        });
    }
    let cases = case_sizes
        .iter()
        .zip(case_alignments)
        .enumerate()
        .map(|(case, (&size, &align))| {
            if align.is_power_of_two() {
                Ok(Layout { size, align })
            } else {
                Err(LayoutError::InvalidAlignment { case, align })
            }
        })
        .collect::<Result<Vec<_>, _>>()?;
    VariantLayout::checked_compute(discriminant_width, &cases).ok_or(LayoutError::Overflow)
}

/// Layout of a record (or tuple): fields in declaration order, each at the
/// next offset aligned for it, with the total padded to the largest field
/// alignment.
///
/// Field alignments must be non-zero powers of two.
pub fn record_layout(fields: &[Layout]) -> Result<Layout, LayoutError> {
    let mut size = 0;
    let mut align = 1;
    for field in fields {
        size = checked_align_to(size, field.align)
            .and_then(|offset| offset.checked_add(field.size))
            .ok_or(LayoutError::Overflow)?;
        align = align.max(field.align);
    }
    Ok(Layout {
        size: checked_align_to(size, align).ok_or(LayoutError::Overflow)?,
        align,
    })
}

/// Offsets of each field of a record laid out by [`record_layout`].
pub fn field_offsets(fields: &[Layout]) -> Result<Vec<usize>, LayoutError> {
    let mut cur = 0;
    fields
        .iter()
        .map(|field| {
            let offset = checked_align_to(cur, field.align).ok_or(LayoutError::Overflow)?;
            cur = offset.checked_add(field.size).ok_or(LayoutError::Overflow)?;
            Ok(offset)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const U8: Layout = Layout::new(1, 1);
    const U32: Layout = Layout::new(4, 4);
    const U64: Layout = Layout::new(8, 8);

    #[test]
    fn test_align_to() {
        assert_eq!(align_to(0, 8), 0);
        assert_eq!(align_to(1, 8), 8);
        assert_eq!(align_to(8, 8), 8);
        assert_eq!(align_to(17, 8), 24);
        assert_eq!(align_to(3, 1), 3);
    }

    #[test]
    fn test_equal_cases_collapse_to_shared_size() {
        let layout = VariantLayout::compute(1, &[U64, U64]);
        assert_eq!(layout.size, 16);
        assert_eq!(layout.data_offset, 8);
        assert_eq!(layout.alignment, 8);
    }

    #[test]
    fn test_mixed_sizes_take_the_larger() {
        for cases in [[U64, U32], [U32, U64], [U8, U64], [U64, U8]] {
            let layout = VariantLayout::compute(1, &cases);
            assert_eq!(layout.size, 16);
            assert_eq!(layout.data_offset, 8);
        }
        for cases in [[U32, U8], [U8, U32]] {
            let layout = VariantLayout::compute(1, &cases);
            assert_eq!(layout.size, 8);
            assert_eq!(layout.alignment, 4);
            assert_eq!(layout.data_offset, 4);
        }
    }

    #[test]
    fn test_oversized_array_uses_max_not_sum() {
        let layout = VariantLayout::compute(1, &[Layout::new(9, 1), U64]);
        assert_eq!(layout.size, 24);
        assert_eq!(layout.alignment, 8);
        assert_eq!(layout.data_offset, 8);
    }

    #[test]
    fn test_payloadless_cases() {
        let layout = VariantLayout::compute(1, &[Layout::EMPTY, Layout::EMPTY]);
        assert_eq!(layout, VariantLayout { alignment: 1, data_offset: 1, size: 1 });

        let layout = VariantLayout::compute(4, &[]);
        assert_eq!(layout, VariantLayout { alignment: 4, data_offset: 4, size: 4 });
    }

    #[test]
    fn test_wide_discriminant_with_small_payload() {
        let layout = VariantLayout::compute(2, &[U8]);
        assert_eq!(layout, VariantLayout { alignment: 2, data_offset: 2, size: 4 });
    }

    #[test]
    fn test_compute_layout_matches_const_form() -> Result<(), LayoutError> {
        let layout = compute_layout(1, &[9, 8], &[1, 8])?;
        assert_eq!(layout, VariantLayout::compute(1, &[Layout::new(9, 1), U64]));
        Ok(())
    }

    #[test]
    fn test_compute_layout_rejects_bad_input() {
        assert_eq!(
            compute_layout(0, &[], &[]),
            Err(LayoutError::InvalidDiscriminant(0))
        );
        assert_eq!(
            compute_layout(3, &[], &[]),
            Err(LayoutError::InvalidDiscriminant(3))
        );
        assert_eq!(
            compute_layout(1, &[4, 8], &[4]),
            Err(LayoutError::CaseCountMismatch { sizes: 2, alignments: 1 })
        );
        assert_eq!(
            compute_layout(1, &[4, 6], &[4, 6]),
            Err(LayoutError::InvalidAlignment { case: 1, align: 6 })
        );
    }

    #[test]
    fn test_checked_align_to() {
        assert_eq!(checked_align_to(17, 8), Some(24));
        assert_eq!(checked_align_to(usize::MAX, 1), Some(usize::MAX));
        assert_eq!(checked_align_to(usize::MAX - 2, 4), None);

        let top = 1usize << (usize::BITS - 1);
        assert_eq!(checked_align_to(1, top), Some(top));
        assert_eq!(checked_align_to(top + 1, top), None);
    }

    #[test]
    fn test_compute_layout_reports_overflow() {
        let huge_align = 1usize << (usize::BITS - 1);
        assert_eq!(
            compute_layout(1, &[1], &[huge_align]),
            Err(LayoutError::Overflow)
        );
        assert_eq!(
            compute_layout(1, &[usize::MAX], &[1]),
            Err(LayoutError::Overflow)
        );
        assert_eq!(
            compute_layout(4, &[usize::MAX - 5], &[4]),
            Err(LayoutError::Overflow)
        );
        assert_eq!(
            VariantLayout::checked_compute(1, &[Layout::new(usize::MAX - 2, 4)]),
            None
        );
    }

    #[test]
    fn test_checked_compute_agrees_with_compute() {
        let cases = [Layout::new(9, 1), U64, U32, Layout::EMPTY];
        for width in [1, 2, 4] {
            assert_eq!(
                VariantLayout::checked_compute(width, &cases),
                Some(VariantLayout::compute(width, &cases))
            );
        }
    }

    #[test]
    fn test_record_layout() -> Result<(), LayoutError> {
        assert_eq!(record_layout(&[])?, Layout::new(0, 1));
        assert_eq!(record_layout(&[U8, U32])?, Layout::new(8, 4));
        assert_eq!(record_layout(&[U32, U8])?, Layout::new(8, 4));
        assert_eq!(record_layout(&[U8, U64, U8])?, Layout::new(24, 8));
        assert_eq!(field_offsets(&[U8, U64, U8])?, vec![0, 8, 16]);
        Ok(())
    }

    #[test]
    fn test_record_layout_reports_overflow() {
        let huge = Layout::new(usize::MAX - 3, 1);
        assert_eq!(record_layout(&[huge, U64]), Err(LayoutError::Overflow));
        assert_eq!(
            record_layout(&[U8, Layout::new(usize::MAX, 1)]),
            Err(LayoutError::Overflow)
        );
        assert_eq!(field_offsets(&[huge, U64]), Err(LayoutError::Overflow));
    }
}
