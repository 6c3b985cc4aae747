//! Attribute categorization. Option/Vec wrappers are stripped first;
//! markers (`relation`, `embedded`, `enumerated`, `comparable`) take
//! their place in the precedence chain, concrete types are recognized
//! by name, and everything else lands on SIMPLE.

use crate::model::FieldCategory;
use quote::ToTokens;
use syn::{GenericArgument, PathArguments, Type};

///
/// AttributeFlags
///
/// Field-level `#[entity(...)]` markers relevant to categorization.
///

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct AttributeFlags {
    pub id: bool,
    pub relation: bool,
    pub embedded: bool,
    pub enumerated: bool,
    pub comparable: bool,
    pub transient: bool,
    pub ignore: bool,
}

///
/// Classified
///

#[derive(Debug)]
pub(crate) struct Classified {
    pub category: FieldCategory,
    pub value_ty: String,
    /// Element/target type name for collections, relations, and
    /// embeddables.
    pub target: Option<String>,
}

pub(crate) fn classify(ty: &Type, flags: AttributeFlags) -> Classified {
    // nullability is not a category; strip it
    let ty = strip_wrapper(ty, "Option").unwrap_or_else(|| ty.clone());

    // precedence: COLLECTION first
    if let Some(element) = strip_wrapper(&ty, "Vec") {
        return Classified {
            category: FieldCategory::Collection,
            value_ty: render(&element),
            target: type_name(&element),
        };
    }

    if flags.embedded {
        return Classified {
            category: FieldCategory::Embedded,
            value_ty: render(&ty),
            target: type_name(&ty),
        };
    }

    if flags.relation {
        return Classified {
            category: FieldCategory::Relation,
            value_ty: render(&ty),
            target: type_name(&ty),
        };
    }

    let category = match type_name(&ty).as_deref() {
        Some("String" | "str") => FieldCategory::String,
        Some(
            "i8" | "i16" | "i32" | "i64" | "u8" | "u16" | "u32" | "f32" | "f64",
        ) => FieldCategory::Number,
        Some("bool") => FieldCategory::Boolean,
        Some("NaiveDate" | "NaiveDateTime" | "DateTime") => FieldCategory::DateTime,
        _ if flags.enumerated => FieldCategory::Enum,
        _ if flags.comparable => FieldCategory::Comparable,
        _ => FieldCategory::Simple,
    };

    Classified {
        category,
        value_ty: render(&ty),
        target: None,
    }
}

fn strip_wrapper(ty: &Type, wrapper: &str) -> Option<Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    args.args.iter().find_map(|arg| match arg {
        GenericArgument::Type(inner) => Some(inner.clone()),
        _ => None,
    })
}

fn type_name(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(path) => path.path.segments.last().map(|s| s.ident.to_string()),
        _ => None,
    }
}

/// Render a type as compact Rust source.
pub(crate) fn render(ty: &Type) -> String {
    let text = ty.to_token_stream().to_string();
    text.replace(" :: ", "::")
        .replace(" < ", "<")
        .replace(" > ", ">")
        .replace(" >", ">")
        .replace("< ", "<")
        .replace(" ,", ",")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(source: &str) -> Type {
        syn::parse_str(source).unwrap()
    }

    #[test]
    fn concrete_types_by_name() {
        assert_eq!(
            classify(&ty("String"), AttributeFlags::default()).category,
            FieldCategory::String
        );
        assert_eq!(
            classify(&ty("i64"), AttributeFlags::default()).category,
            FieldCategory::Number
        );
        assert_eq!(
            classify(&ty("bool"), AttributeFlags::default()).category,
            FieldCategory::Boolean
        );
        assert_eq!(
            classify(&ty("chrono::DateTime<chrono::Utc>"), AttributeFlags::default()).category,
            FieldCategory::DateTime
        );
    }

    #[test]
    fn option_is_transparent() {
        let classified = classify(&ty("Option<i32>"), AttributeFlags::default());
        assert_eq!(classified.category, FieldCategory::Number);
        assert_eq!(classified.value_ty, "i32");
    }

    #[test]
    fn collection_takes_precedence_over_relation_marker() {
        let flags = AttributeFlags {
            relation: true,
            ..AttributeFlags::default()
        };
        let classified = classify(&ty("Vec<Order>"), flags);
        assert_eq!(classified.category, FieldCategory::Collection);
        assert_eq!(classified.target.as_deref(), Some("Order"));
    }

    #[test]
    fn embedded_outranks_relation() {
        let flags = AttributeFlags {
            relation: true,
            embedded: true,
            ..AttributeFlags::default()
        };
        assert_eq!(
            classify(&ty("Address"), flags).category,
            FieldCategory::Embedded
        );
    }

    #[test]
    fn markers_rank_below_concrete_types() {
        let flags = AttributeFlags {
            enumerated: true,
            ..AttributeFlags::default()
        };
        // a String stays STRING even when marked enumerated
        assert_eq!(
            classify(&ty("String"), flags).category,
            FieldCategory::String
        );
        assert_eq!(
            classify(&ty("OrderStatus"), flags).category,
            FieldCategory::Enum
        );
    }

    #[test]
    fn unknown_types_default_to_simple() {
        assert_eq!(
            classify(&ty("Uuid"), AttributeFlags::default()).category,
            FieldCategory::Simple
        );
    }

    #[test]
    fn render_is_compact() {
        assert_eq!(render(&ty("chrono::DateTime<chrono::Utc>")), "chrono::DateTime<chrono::Utc>");
        assert_eq!(render(&ty("Vec<String>")), "Vec<String>");
    }
}
