//! Layout reports for named WIT types.

use wit_parser::{Resolve, Type, TypeDefKind};

use crate::descriptor::{Target, TypeDescriptor};
use crate::error::{Error, Result};
use crate::layout::{LayoutCache, VariantLayout};
use crate::wit::{descriptor, find_type_by_name};

/// Size, alignment and (for variant-like types) payload geometry of a type.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TypeReport {
    pub name: String,
    pub shape: String,
    pub target: Target,
    pub size: usize,
    pub align: usize,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub variant: Option<VariantReport>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct VariantReport {
    pub discriminant_width: usize,
    pub data_offset: usize,
    pub cases: Vec<CaseReport>,
}

/// One case of a variant. `slack` is the number of payload bytes the case
/// leaves unused.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CaseReport {
    pub name: Option<String>,
    pub size: usize,
    pub align: usize,
    pub slack: usize,
}

impl TypeReport {
    pub fn new(
        name: impl Into<String>,
        descriptor: &TypeDescriptor,
        target: Target,
        cache: &LayoutCache,
    ) -> Result<Self> {
        let layout = descriptor.layout(target)?;
        let variant = match descriptor.variant_cases(target)? {
            Some((width, cases)) => {
                let geometry: VariantLayout = cache.variant(width, &cases)?;
                Some(VariantReport {
                    discriminant_width: width,
                    data_offset: geometry.data_offset,
                    cases: cases
                        .iter()
                        .map(|case| CaseReport {
                            name: None,
                            size: case.size,
                            align: case.align,
                            slack: geometry.size - geometry.data_offset - case.size,
                        })
                        .collect(),
                })
            }
            None => None,
        };
        Ok(Self {
            name: name.into(),
            shape: descriptor.to_string(),
            target,
            size: layout.size,
            align: layout.align,
            variant,
        })
    }

    /// Attach case names in tag order.
    pub fn with_case_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some(variant) = self.variant.as_mut() {
            for (case, name) in variant.cases.iter_mut().zip(names) {
                case.name = Some(name.into());
            }
        }
        self
    }
}

/// Case names of a variant-like WIT type, following type aliases.
fn case_names(resolve: &Resolve, ty: &Type) -> Vec<String> {
    let Type::Id(id) = ty else {
        return Vec::new();
    };
    let Some(ty_def) = resolve.types.get(*id) else {
        return Vec::new();
    };
    match &ty_def.kind {
        TypeDefKind::Type(inner) => case_names(resolve, inner),
        TypeDefKind::Variant(v) => v.cases.iter().map(|c| c.name.clone()).collect(),
        TypeDefKind::Enum(e) => e.cases.iter().map(|c| c.name.clone()).collect(),
        TypeDefKind::Option(_) => vec!["none".to_string(), "some".to_string()],
        TypeDefKind::Result(_) => vec!["ok".to_string(), "err".to_string()],
        _ => Vec::new(),
    }
}

/// Report on the named type in `resolve`.
pub fn describe(resolve: &Resolve, type_name: &str, target: Target) -> Result<TypeReport> {
    let id = find_type_by_name(resolve, type_name)
        .ok_or_else(|| Error::TypeNotFound(type_name.to_string()))?;
    let ty = Type::Id(id);
    let descriptor = descriptor(resolve, &ty)?;
    let report = TypeReport::new(type_name, &descriptor, target, &LayoutCache::new())?;
    Ok(report.with_case_names(case_names(resolve, &ty)))
}

/// Reports on every named type in `resolve` that has a value layout.
pub fn describe_all(resolve: &Resolve, target: Target) -> Result<Vec<TypeReport>> {
    let cache = LayoutCache::new();
    crate::wit::named_descriptors(resolve)
        .into_iter()
        .map(|(name, descriptor)| {
            let names = find_type_by_name(resolve, &name)
                .map(|id| case_names(resolve, &Type::Id(id)))
                .unwrap_or_default();
            Ok(TypeReport::new(name, &descriptor, target, &cache)?.with_case_names(names))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DiscriminantWidth;
    use crate::layout::LayoutError;

    const TYPES: &str = r#"
        package test:report;

        interface types {
            variant value { small(u8), large(u64), text(string), empty }
            record pair { a: u8, b: u32 }
            type value-alias = value;
        }
    "#;

    fn resolve() -> Resolve {
        let mut resolve = Resolve::new();
        resolve.push_str("report.wit", TYPES).unwrap();
        resolve
    }

    #[test]
    fn test_describe_variant() {
        let report = describe(&resolve(), "value", Target::Wasm32).unwrap();
        assert_eq!(report.size, 16);
        assert_eq!(report.align, 8);

        let variant = report.variant.unwrap();
        assert_eq!(variant.discriminant_width, 1);
        assert_eq!(variant.data_offset, 8);
        let slack: Vec<_> = variant.cases.iter().map(|c| c.slack).collect();
        assert_eq!(slack, vec![7, 0, 0, 8]);
        let names: Vec<_> = variant.cases.iter().filter_map(|c| c.name.as_deref()).collect();
        assert_eq!(names, vec!["small", "large", "text", "empty"]);
    }

    #[test]
    fn test_alias_keeps_case_names() {
        let report = describe(&resolve(), "value-alias", Target::Wasm64).unwrap();
        assert_eq!(report.size, 24);
        let variant = report.variant.unwrap();
        assert_eq!(variant.cases.first().and_then(|c| c.name.as_deref()), Some("small"));
    }

    #[test]
    fn test_describe_record_has_no_variant() {
        let report = describe(&resolve(), "pair", Target::Wasm32).unwrap();
        assert_eq!((report.size, report.align), (8, 4));
        assert!(report.variant.is_none());
        assert_eq!(report.shape, "tuple<u8, u32>");
    }

    #[test]
    fn test_report_shares_cache() {
        let cache = LayoutCache::new();
        let descriptor = TypeDescriptor::Variant {
            tag: DiscriminantWidth::U16,
            cases: vec![TypeDescriptor::U8],
        };
        let first = TypeReport::new("a", &descriptor, Target::Wasm32, &cache).unwrap();
        let second = TypeReport::new("b", &descriptor, Target::Wasm32, &cache).unwrap();
        assert_eq!(first.size, 4);
        assert_eq!(first.variant, second.variant);
        assert_eq!((cache.hits(), cache.misses()), (1, 1));
    }

    #[test]
    fn test_oversized_descriptor_is_an_error() {
        let nested = TypeDescriptor::array(
            TypeDescriptor::array(TypeDescriptor::U64, u32::MAX as usize),
            u32::MAX as usize,
        );
        let descriptor = TypeDescriptor::variant(vec![nested, TypeDescriptor::Unit]);
        let err = TypeReport::new("huge", &descriptor, Target::Wasm64, &LayoutCache::new())
            .unwrap_err();
        assert!(matches!(err, Error::Layout(LayoutError::Overflow)), "{err}");
    }

    #[test]
    fn test_describe_all_and_missing() {
        let reports = describe_all(&resolve(), Target::Wasm32).unwrap();
        assert_eq!(reports.len(), 3);
        assert!(describe(&resolve(), "missing", Target::Wasm32).unwrap_err().is_not_found());
    }
}
