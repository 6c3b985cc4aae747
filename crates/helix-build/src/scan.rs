//! Source scanner: walks Rust files and collects every struct deriving
//! `Entity` or `Embeddable` into the entity graph model.

use crate::classify::{AttributeFlags, classify};
use crate::model::{AttributeDef, EntityDef, StructKind};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use syn::{Attribute, Fields, Item, ItemStruct};
use walkdir::WalkDir;

/// Scan a directory recursively for entity and embeddable structs.
pub fn scan_directory(path: &Path) -> Result<Vec<EntityDef>> {
    let mut defs = Vec::new();

    for entry in WalkDir::new(path)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| {
            entry.path().extension().is_some_and(|ext| ext == "rs")
                && !entry.path().to_string_lossy().contains("/generated/")
                && !entry.path().to_string_lossy().contains("/target/")
        })
    {
        defs.extend(scan_file(entry.path())?);
    }

    Ok(defs)
}

fn scan_file(path: &Path) -> Result<Vec<EntityDef>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let file =
        syn::parse_file(&content).with_context(|| format!("failed to parse {}", path.display()))?;

    let mut defs = Vec::new();
    for item in file.items {
        let Item::Struct(item) = item else {
            continue;
        };
        let Some(kind) = struct_kind(&item.attrs) else {
            continue;
        };
        defs.push(build_def(&item, kind));
    }
    Ok(defs)
}

fn struct_kind(attrs: &[Attribute]) -> Option<StructKind> {
    for attr in attrs {
        if !attr.path().is_ident("derive") {
            continue;
        }
        let Ok(paths) = attr.parse_args_with(
            syn::punctuated::Punctuated::<syn::Path, syn::Token![,]>::parse_terminated,
        ) else {
            continue;
        };
        for path in paths {
            if path.is_ident("Entity") {
                return Some(StructKind::Entity);
            }
            if path.is_ident("Embeddable") {
                return Some(StructKind::Embeddable);
            }
        }
    }
    None
}

fn build_def(item: &ItemStruct, kind: StructKind) -> EntityDef {
    let mut def = EntityDef::new(item.ident.to_string(), kind);

    let Fields::Named(named) = &item.fields else {
        return def;
    };
    for field in &named.named {
        let Some(ident) = &field.ident else {
            continue;
        };
        let flags = field_flags(&field.attrs);
        let classified = classify(&field.ty, flags);

        let mut attribute = AttributeDef::new(ident.to_string(), classified.category, classified.value_ty);
        attribute.target = classified.target;
        attribute.transient = flags.transient;
        attribute.ignored = flags.ignore;
        def.attributes.push(attribute);
    }

    def
}

fn field_flags(attrs: &[Attribute]) -> AttributeFlags {
    let mut flags = AttributeFlags::default();
    for attr in attrs {
        if !attr.path().is_ident("entity") {
            continue;
        }
        // tolerate unknown options; the derive reports them precisely
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("id") {
                flags.id = true;
            } else if meta.path.is_ident("relation") {
                flags.relation = true;
            } else if meta.path.is_ident("embedded") {
                flags.embedded = true;
            } else if meta.path.is_ident("enumerated") {
                flags.enumerated = true;
            } else if meta.path.is_ident("comparable") {
                flags.comparable = true;
            } else if meta.path.is_ident("transient") {
                flags.transient = true;
            } else if meta.path.is_ident("ignore") {
                flags.ignore = true;
            } else if meta.path.is_ident("name") || meta.path.is_ident("custom_lifecycle") {
                if meta.input.peek(syn::Token![=]) {
                    let _: syn::LitStr = meta.value()?.parse()?;
                }
            }
            Ok(())
        });
    }
    flags
}
