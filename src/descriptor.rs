//! Size and alignment introspection for WIT value shapes.
//!
//! A [`TypeDescriptor`] is a static description of a value's shape. It has no
//! identity of its own; it only exists to drive layout computation. The same
//! descriptor yields different layouts on different [`Target`]s because
//! string and list handles are a pointer plus a length.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::layout::{Layout, LayoutError, VariantLayout, record_layout};

/// Memory model used to size pointer-carrying values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Target {
    /// The Canonical ABI over 32-bit linear memory.
    #[default]
    Wasm32,
    /// The Canonical ABI over 64-bit linear memory.
    Wasm64,
    /// The host the crate is compiled for.
    Native,
}

impl Target {
    pub const fn pointer_width(self) -> usize {
        match self {
            Target::Wasm32 => 4,
            Target::Wasm64 => 8,
            Target::Native => std::mem::size_of::<usize>(),
        }
    }

    /// Layout of a `(ptr, len)` pair such as a string or list handle.
    pub const fn handle_pair(self) -> Layout {
        let width = self.pointer_width();
        Layout::new(2 * width, width)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Target::Wasm32 => "wasm32",
            Target::Wasm64 => "wasm64",
            Target::Native => "native",
        })
    }
}

/// Error returned when parsing an unknown target name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown target '{0}': expected wasm32, wasm64 or native")]
pub struct ParseTargetError(String);

impl FromStr for Target {
    type Err = ParseTargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wasm32" => Ok(Target::Wasm32),
            "wasm64" => Ok(Target::Wasm64),
            "native" => Ok(Target::Native),
            other => Err(ParseTargetError(other.to_string())),
        }
    }
}

/// Width of a variant's discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum DiscriminantWidth {
    U8,
    U16,
    U32,
}

impl DiscriminantWidth {
    /// The smallest width able to index `cases` cases.
    pub const fn for_cases(cases: usize) -> Self {
        if cases <= 1 << 8 {
            DiscriminantWidth::U8
        } else if cases <= 1 << 16 {
            DiscriminantWidth::U16
        } else {
            DiscriminantWidth::U32
        }
    }

    pub const fn bytes(self) -> usize {
        match self {
            DiscriminantWidth::U8 => 1,
            DiscriminantWidth::U16 => 2,
            DiscriminantWidth::U32 => 4,
        }
    }
}

/// The shape of a value, as far as layout is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    /// A case without payload.
    Unit,
    Bool,
    U8,
    S8,
    U16,
    S16,
    U32,
    S32,
    U64,
    S64,
    U128,
    S128,
    F32,
    F64,
    Char,
    /// `(ptr, len)` of UTF-8 bytes.
    String,
    /// `(ptr, len)` of elements.
    List(Box<TypeDescriptor>),
    /// A fixed number of elements stored inline.
    Array {
        element: Box<TypeDescriptor>,
        len: usize,
    },
    /// Fields stored inline in declaration order. Also used for tuples.
    Record(Vec<TypeDescriptor>),
    /// A bit set with the given number of flags.
    Flags(usize),
    /// A variant with the given number of cases, none carrying a payload.
    Enum(usize),
    Variant {
        tag: DiscriminantWidth,
        cases: Vec<TypeDescriptor>,
    },
    Option(Box<TypeDescriptor>),
    Result {
        ok: Box<TypeDescriptor>,
        err: Box<TypeDescriptor>,
    },
    /// A resource, future or stream handle (an i32 index).
    Handle,
}

impl TypeDescriptor {
    /// A variant whose discriminant width is derived from its case count.
    pub fn variant(cases: Vec<TypeDescriptor>) -> Self {
        TypeDescriptor::Variant {
            tag: DiscriminantWidth::for_cases(cases.len()),
            cases,
        }
    }

    pub fn array(element: TypeDescriptor, len: usize) -> Self {
        TypeDescriptor::Array {
            element: Box::new(element),
            len,
        }
    }

    pub fn result(ok: TypeDescriptor, err: TypeDescriptor) -> Self {
        TypeDescriptor::Result {
            ok: Box::new(ok),
            err: Box::new(err),
        }
    }

    /// Size and alignment of this shape on `target`.
    ///
    /// Fails with [`LayoutError::Overflow`] when the shape is too large to
    /// address on `target`, such as nested fixed-size lists whose total length
    /// exceeds `usize`.
    pub fn layout(&self, target: Target) -> Result<Layout, LayoutError> {
        let native = matches!(target, Target::Native);
        let layout = match self {
            TypeDescriptor::Unit => Layout::EMPTY,
            TypeDescriptor::Bool | TypeDescriptor::U8 | TypeDescriptor::S8 => Layout::new(1, 1),
            TypeDescriptor::U16 | TypeDescriptor::S16 => Layout::new(2, 2),
            TypeDescriptor::U32
            | TypeDescriptor::S32
            | TypeDescriptor::F32
            | TypeDescriptor::Char
            | TypeDescriptor::Handle => Layout::new(4, 4),
            TypeDescriptor::U64 | TypeDescriptor::S64 | TypeDescriptor::F64 if native => {
                Layout::of::<u64>()
            }
            TypeDescriptor::U64 | TypeDescriptor::S64 | TypeDescriptor::F64 => Layout::new(8, 8),
            TypeDescriptor::U128 | TypeDescriptor::S128 if native => Layout::of::<u128>(),
            TypeDescriptor::U128 | TypeDescriptor::S128 => Layout::new(16, 16),
            TypeDescriptor::String | TypeDescriptor::List(_) => target.handle_pair(),
            TypeDescriptor::Array { element, len } => {
                let element = element.layout(target)?;
                let size = element.size.checked_mul(*len).ok_or(LayoutError::Overflow)?;
                Layout::new(size, element.align)
            }
            TypeDescriptor::Record(fields) => {
                let fields = fields
                    .iter()
                    .map(|f| f.layout(target))
                    .collect::<Result<Vec<_>, _>>()?;
                record_layout(&fields)?
            }
            TypeDescriptor::Flags(count) => flags_layout(*count),
            TypeDescriptor::Enum(_)
            | TypeDescriptor::Variant { .. }
            | TypeDescriptor::Option(_)
            | TypeDescriptor::Result { .. } => self
                .variant_layout(target)?
                .map_or(Layout::EMPTY, |v| v.as_layout()),
        };
        Ok(layout)
    }

    pub fn size(&self, target: Target) -> Result<usize, LayoutError> {
        self.layout(target).map(|l| l.size)
    }

    pub fn align(&self, target: Target) -> Result<usize, LayoutError> {
        self.layout(target).map(|l| l.align)
    }

    /// Discriminant width of a variant-like shape, `None` otherwise.
    pub fn discriminant_width(&self) -> Option<DiscriminantWidth> {
        match self {
            TypeDescriptor::Enum(count) => Some(DiscriminantWidth::for_cases(*count)),
            TypeDescriptor::Variant { tag, .. } => Some(*tag),
            TypeDescriptor::Option(_) | TypeDescriptor::Result { .. } => {
                Some(DiscriminantWidth::U8)
            }
            _ => None,
        }
    }

    /// Discriminant width and case layouts of a variant-like shape, `None`
    /// for any other shape.
    ///
    /// Options are `variant { none, some(T) }` and results are
    /// `variant { ok(O), err(E) }`; enums have only payload-less cases.
    pub fn variant_cases(
        &self,
        target: Target,
    ) -> Result<Option<(usize, Vec<Layout>)>, LayoutError> {
        let Some(width) = self.discriminant_width() else {
            return Ok(None);
        };
        let cases = match self {
            TypeDescriptor::Enum(_) => Vec::new(),
            TypeDescriptor::Variant { cases, .. } => cases
                .iter()
                .map(|c| c.layout(target))
                .collect::<Result<Vec<_>, _>>()?,
            TypeDescriptor::Option(some) => vec![Layout::EMPTY, some.layout(target)?],
            TypeDescriptor::Result { ok, err } => vec![ok.layout(target)?, err.layout(target)?],
            _ => return Ok(None),
        };
        Ok(Some((width.bytes(), cases)))
    }

    /// Full variant geometry of a variant-like shape, `None` otherwise.
    pub fn variant_layout(&self, target: Target) -> Result<Option<VariantLayout>, LayoutError> {
        self.variant_cases(target)?
            .map(|(width, cases)| {
                VariantLayout::checked_compute(width, &cases).ok_or(LayoutError::Overflow)
            })
            .transpose()
    }
}

/// Flags are packed into the smallest integer that holds them, or into
/// consecutive 32-bit words past 32 flags.
fn flags_layout(count: usize) -> Layout {
    match count {
        0 => Layout::EMPTY,
        1..=8 => Layout::new(1, 1),
        9..=16 => Layout::new(2, 2),
        n => Layout::new(4 * n.div_ceil(32), 4),
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Unit => f.write_str("_"),
            TypeDescriptor::Bool => f.write_str("bool"),
            TypeDescriptor::U8 => f.write_str("u8"),
            TypeDescriptor::S8 => f.write_str("s8"),
            TypeDescriptor::U16 => f.write_str("u16"),
            TypeDescriptor::S16 => f.write_str("s16"),
            TypeDescriptor::U32 => f.write_str("u32"),
            TypeDescriptor::S32 => f.write_str("s32"),
            TypeDescriptor::U64 => f.write_str("u64"),
            TypeDescriptor::S64 => f.write_str("s64"),
            TypeDescriptor::U128 => f.write_str("u128"),
            TypeDescriptor::S128 => f.write_str("s128"),
            TypeDescriptor::F32 => f.write_str("f32"),
            TypeDescriptor::F64 => f.write_str("f64"),
            TypeDescriptor::Char => f.write_str("char"),
            TypeDescriptor::String => f.write_str("string"),
            TypeDescriptor::List(element) => write!(f, "list<{element}>"),
            TypeDescriptor::Array { element, len } => write!(f, "list<{element}, {len}>"),
            TypeDescriptor::Record(fields) => {
                f.write_str("tuple<")?;
                write_joined(f, fields, ", ")?;
                f.write_str(">")
            }
            TypeDescriptor::Flags(count) => write!(f, "flags<{count}>"),
            TypeDescriptor::Enum(count) => write!(f, "enum<{count}>"),
            TypeDescriptor::Variant { cases, .. } => {
                f.write_str("variant { ")?;
                write_joined(f, cases, "; ")?;
                f.write_str(" }")
            }
            TypeDescriptor::Option(some) => write!(f, "option<{some}>"),
            TypeDescriptor::Result { ok, err } => write!(f, "result<{ok}, {err}>"),
            TypeDescriptor::Handle => f.write_str("handle"),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[TypeDescriptor], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}
