//! Shared attribute/field parsing for both derives.

use proc_macro2::TokenStream;
use syn::{Attribute, Data, DeriveInput, Error, Fields, GenericArgument, PathArguments, Type};

///
/// FieldKind
///
/// How a field's value converts into the dynamic value model.
///

#[derive(Clone, Copy, Eq, PartialEq)]
pub(crate) enum FieldKind {
    /// Converts through `FieldValue::to_value`.
    Scalar,
    /// A related entity or embeddable; converts through
    /// `FieldValues::to_record`.
    Record,
}

///
/// Cardinality
///

#[derive(Clone, Copy, Eq, PartialEq)]
pub(crate) enum Cardinality {
    One,
    Optional,
    Many,
}

///
/// FieldModel
///

pub(crate) struct FieldModel {
    pub ident: syn::Ident,
    pub name: String,
    pub kind: FieldKind,
    pub cardinality: Cardinality,
    /// Inner type with `Option`/`Vec` stripped.
    pub inner_ty: Type,
    pub is_id: bool,
    pub skipped: bool,
}

///
/// StructModel
///

pub(crate) struct StructModel {
    pub entity_name: String,
    pub custom_lifecycle: bool,
    pub fields: Vec<FieldModel>,
}

pub(crate) fn parse_struct(input: &DeriveInput) -> Result<StructModel, Error> {
    let Data::Struct(data) = &input.data else {
        return Err(Error::new_spanned(
            &input.ident,
            "this derive supports structs with named fields only",
        ));
    };
    let Fields::Named(named) = &data.fields else {
        return Err(Error::new_spanned(
            &data.fields,
            "this derive supports structs with named fields only",
        ));
    };

    let mut entity_name = input.ident.to_string();
    let mut custom_lifecycle = false;
    for attr in &input.attrs {
        if !attr.path().is_ident("entity") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let lit: syn::LitStr = meta.value()?.parse()?;
                entity_name = lit.value();
                Ok(())
            } else if meta.path.is_ident("custom_lifecycle") {
                custom_lifecycle = true;
                Ok(())
            } else {
                Err(meta.error("unknown entity option"))
            }
        })?;
    }

    let mut fields = Vec::new();
    for field in &named.named {
        let ident = field.ident.clone().ok_or_else(|| {
            Error::new_spanned(field, "named field expected")
        })?;
        let flags = FieldFlags::parse(&field.attrs)?;

        let (cardinality, inner_ty) = classify_shape(&field.ty);
        let kind = if flags.relation || flags.embedded {
            FieldKind::Record
        } else {
            FieldKind::Scalar
        };

        fields.push(FieldModel {
            name: ident.to_string(),
            ident,
            kind,
            cardinality,
            inner_ty,
            is_id: flags.id,
            skipped: flags.transient || flags.ignore,
        });
    }

    Ok(StructModel {
        entity_name,
        custom_lifecycle,
        fields,
    })
}

#[derive(Default)]
struct FieldFlags {
    id: bool,
    relation: bool,
    embedded: bool,
    transient: bool,
    ignore: bool,
}

impl FieldFlags {
    fn parse(attrs: &[Attribute]) -> Result<Self, Error> {
        let mut flags = Self::default();
        for attr in attrs {
            if !attr.path().is_ident("entity") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("id") {
                    flags.id = true;
                } else if meta.path.is_ident("relation") {
                    flags.relation = true;
                } else if meta.path.is_ident("embedded") {
                    flags.embedded = true;
                } else if meta.path.is_ident("transient") {
                    flags.transient = true;
                } else if meta.path.is_ident("ignore") {
                    flags.ignore = true;
                } else if meta.path.is_ident("enumerated") || meta.path.is_ident("comparable") {
                    // consumed by the helix-build generator
                } else {
                    return Err(meta.error("unknown entity field option"));
                }
                Ok(())
            })?;
        }
        Ok(flags)
    }
}

/// Strip one level of `Option`/`Vec` to find cardinality and the
/// element type.
fn classify_shape(ty: &Type) -> (Cardinality, Type) {
    if let Some(inner) = generic_arg_of(ty, "Option") {
        return (Cardinality::Optional, inner);
    }
    if let Some(inner) = generic_arg_of(ty, "Vec") {
        return (Cardinality::Many, inner);
    }
    (Cardinality::One, ty.clone())
}

pub(crate) fn generic_arg_of(ty: &Type, wrapper: &str) -> Option<Type> {
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

/// Expression converting `&self.<field>` into a `Value`.
pub(crate) fn value_expr(field: &FieldModel) -> TokenStream {
    use quote::quote;

    let ident = &field.ident;
    match (field.kind, field.cardinality) {
        (FieldKind::Scalar, _) => quote! {
            ::helix::FieldValue::to_value(&self.#ident)
        },
        (FieldKind::Record, Cardinality::One) => quote! {
            ::helix::FieldValues::to_record(&self.#ident)
        },
        (FieldKind::Record, Cardinality::Optional) => quote! {
            match self.#ident.as_ref() {
                Some(related) => ::helix::FieldValues::to_record(related),
                None => ::helix::Value::Null,
            }
        },
        (FieldKind::Record, Cardinality::Many) => quote! {
            ::helix::Value::List(
                self.#ident
                    .iter()
                    .map(::helix::FieldValues::to_record)
                    .collect(),
            )
        },
    }
}
