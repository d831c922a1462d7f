//! Build [`TypeDescriptor`]s from parsed WIT definitions.
//!
//! Maps are laid out as `list<tuple<k, v>>`. Handles, futures, streams and
//! error contexts are `i32` indices. Resources have no value layout of their
//! own and are rejected.

use wit_parser::{Resolve, Type, TypeDefKind, TypeId};

use crate::descriptor::{DiscriminantWidth, TypeDescriptor};
use crate::error::{Error, Result};
use crate::logging::{debug, warn};

/// Find a type by name in a WIT Resolve.
pub fn find_type_by_name(resolve: &Resolve, name: &str) -> Option<TypeId> {
    resolve
        .types
        .iter()
        .find(|(_, ty)| ty.name.as_deref() == Some(name))
        .map(|(id, _)| id)
}

/// Find the first named type in a WIT Resolve.
pub fn find_first_named_type(resolve: &Resolve) -> Option<TypeId> {
    resolve
        .types
        .iter()
        .find(|(_, ty)| ty.name.is_some())
        .map(|(id, _)| id)
}

/// Describe the shape of a WIT type.
pub fn descriptor(resolve: &Resolve, ty: &Type) -> Result<TypeDescriptor> {
    Ok(match ty {
        Type::Bool => TypeDescriptor::Bool,
        Type::U8 => TypeDescriptor::U8,
        Type::S8 => TypeDescriptor::S8,
        Type::U16 => TypeDescriptor::U16,
        Type::S16 => TypeDescriptor::S16,
        Type::U32 => TypeDescriptor::U32,
        Type::S32 => TypeDescriptor::S32,
        Type::U64 => TypeDescriptor::U64,
        Type::S64 => TypeDescriptor::S64,
        Type::F32 => TypeDescriptor::F32,
        Type::F64 => TypeDescriptor::F64,
        Type::Char => TypeDescriptor::Char,
        Type::String => TypeDescriptor::String,
        Type::ErrorContext => TypeDescriptor::Handle,
        Type::Id(id) => type_id_descriptor(resolve, *id)?,
    })
}

fn optional(resolve: &Resolve, ty: Option<&Type>) -> Result<TypeDescriptor> {
    ty.map_or(Ok(TypeDescriptor::Unit), |ty| descriptor(resolve, ty))
}

fn type_id_descriptor(resolve: &Resolve, id: TypeId) -> Result<TypeDescriptor> {
    let ty_def = resolve
        .types
        .get(id)
        .ok_or_else(|| Error::TypeNotFound(format!("{id:?}")))?;
    Ok(match &ty_def.kind {
        TypeDefKind::Type(t) => descriptor(resolve, t)?,
        TypeDefKind::Record(r) => TypeDescriptor::Record(
            r.fields
                .iter()
                .map(|f| descriptor(resolve, &f.ty))
                .collect::<Result<_>>()?,
        ),
        TypeDefKind::Tuple(t) => TypeDescriptor::Record(
            t.types
                .iter()
                .map(|ty| descriptor(resolve, ty))
                .collect::<Result<_>>()?,
        ),
        TypeDefKind::Flags(f) => TypeDescriptor::Flags(f.flags.len()),
        TypeDefKind::Enum(e) => TypeDescriptor::Enum(e.cases.len()),
        TypeDefKind::Variant(v) => TypeDescriptor::Variant {
            tag: DiscriminantWidth::for_cases(v.cases.len()),
            cases: v
                .cases
                .iter()
                .map(|c| optional(resolve, c.ty.as_ref()))
                .collect::<Result<_>>()?,
        },
        TypeDefKind::Option(inner) => TypeDescriptor::Option(Box::new(descriptor(resolve, inner)?)),
        TypeDefKind::Result(r) => TypeDescriptor::result(
            optional(resolve, r.ok.as_ref())?,
            optional(resolve, r.err.as_ref())?,
        ),
        TypeDefKind::List(elem) => TypeDescriptor::List(Box::new(descriptor(resolve, elem)?)),
        TypeDefKind::FixedSizeList(elem, len) => {
            TypeDescriptor::array(descriptor(resolve, elem)?, *len as usize)
        }
        TypeDefKind::Map(key, value) => TypeDescriptor::List(Box::new(TypeDescriptor::Record(
            vec![descriptor(resolve, key)?, descriptor(resolve, value)?],
        ))),
        TypeDefKind::Handle(_) | TypeDefKind::Future(_) | TypeDefKind::Stream(_) => {
            TypeDescriptor::Handle
        }
        TypeDefKind::Resource => {
            return Err(Error::unsupported(format!(
                "resource '{}'",
                ty_def.name.as_deref().unwrap_or("<anonymous>")
            )));
        }
        TypeDefKind::Unknown => return Err(Error::unsupported("unknown type")),
    })
}

/// Descriptors of every named type in `resolve`, in definition order.
///
/// Types without a value layout, such as resources, are skipped.
pub fn named_descriptors(resolve: &Resolve) -> Vec<(String, TypeDescriptor)> {
    resolve
        .types
        .iter()
        .filter_map(|(id, ty)| {
            let name = ty.name.as_ref()?;
            match type_id_descriptor(resolve, id) {
                Ok(descriptor) => Some((name.clone(), descriptor)),
                Err(err) => {
                    warn!(name = %name, error = %err, "skipping type without value layout");
                    None
                }
            }
        })
        .collect()
}

/// Parse a WIT source and describe one of its types.
///
/// If `type_name` is `None`, the first named type in the definition is used.
///
/// # Example
///
/// ```ignore
/// use wit_layout::{Target, wit::load_descriptor};
///
/// let wit = r#"
///     package test:types;
///     interface types {
///         variant shape { pair(tuple<u64, u8>), big(u64) }
///     }
/// "#;
///
/// let (_, descriptor) = load_descriptor(wit, Some("shape"))?;
/// assert_eq!(descriptor.size(Target::Wasm32)?, 24);
/// ```
pub fn load_descriptor(
    wit_source: &str,
    type_name: Option<&str>,
) -> Result<(Resolve, TypeDescriptor)> {
    let mut resolve = Resolve::new();
    resolve.push_str("input.wit", wit_source)?;

    let type_id = match type_name {
        Some(name) => find_type_by_name(&resolve, name)
            .ok_or_else(|| Error::TypeNotFound(name.to_string())),
        None => find_first_named_type(&resolve)
            .ok_or_else(|| Error::TypeNotFound("<first named type>".to_string())),
    }?;
    debug!(?type_id, "resolved WIT type");

    let descriptor = type_id_descriptor(&resolve, type_id)?;
    Ok((resolve, descriptor))
}
