//! Descriptor-container emission. For every entity `E` the generator
//! produces `#[allow(non_snake_case)] pub struct EFields;` with one
//! UPPER_SNAKE const per attribute, flattened embeddable descriptors,
//! and one nested accessor container per relation (bounded by
//! `relation_depth`, cycles pruned by a visited-type set).

use crate::model::{EntityDef, EntityGraph, FieldCategory, StructKind};
use crate::options::GeneratorOptions;
use anyhow::{Result, bail};
use convert_case::{Case, Casing};
use std::collections::BTreeSet;
use std::fmt::Write as _;

const FIELDS_PATH: &str = "::helix::fields";

/// Emit containers for every entity in the graph, with the shared
/// file header.
pub fn emit_graph(graph: &EntityGraph, options: &GeneratorOptions) -> Result<String> {
    let mut out = String::new();
    out.push_str("// @generated by helix-build. Do not edit.\n");
    out.push_str("//\n// Descriptor containers for the entities of this module.\n\n");
    out.push_str("use super::*;\n");

    for entity in &graph.entities {
        if entity.kind == StructKind::Entity {
            out.push('\n');
            out.push_str(&emit_entity_fields(graph, entity, options)?);
        }
    }
    Ok(out)
}

/// Emit the container set (root container plus nested relation
/// containers) for one entity.
pub fn emit_entity_fields(
    graph: &EntityGraph,
    entity: &EntityDef,
    options: &GeneratorOptions,
) -> Result<String> {
    let mut containers = Vec::new();
    let mut visited = BTreeSet::new();
    visited.insert(entity.rust_name.clone());

    let members = members_for(
        graph,
        &entity.rust_name,
        entity,
        "",
        None,
        "",
        options.relation_depth,
        &visited,
        options,
        &mut containers,
    )?;

    let root = &entity.rust_name;
    let mut out = String::new();
    let _ = writeln!(out, "///\n/// {root}Fields\n///\n");
    let _ = writeln!(out, "pub struct {root}Fields;\n");
    let _ = writeln!(out, "impl {root}Fields {{");
    for member in &members {
        let _ = writeln!(
            out,
            "    pub const {}: {} = {};",
            member.const_name, member.ty, member.init
        );
    }
    out.push_str("}\n");

    for container in containers {
        out.push('\n');
        out.push_str(&container);
    }
    Ok(out)
}

///
/// Member
///
/// One emitted descriptor: const name, descriptor type, initializer.
///

struct Member {
    const_name: String,
    ty: String,
    init: String,
}

#[allow(clippy::too_many_arguments)]
fn members_for(
    graph: &EntityGraph,
    root: &str,
    def: &EntityDef,
    name_prefix: &str,
    relation_path: Option<&str>,
    const_prefix: &str,
    depth_left: u32,
    visited: &BTreeSet<String>,
    options: &GeneratorOptions,
    containers: &mut Vec<String>,
) -> Result<Vec<Member>> {
    let mut members = Vec::new();

    for attribute in &def.attributes {
        if attribute.ignored || (attribute.transient && !options.include_transient) {
            continue;
        }

        let name_full = join_path(name_prefix, &attribute.name);
        let const_name = join_const(const_prefix, &attribute.name);
        let value_ty = &attribute.value_ty;

        let descriptor = |kind: &str, generics: &str| -> Member {
            let ctor = match relation_path {
                Some(relation) => {
                    format!("{FIELDS_PATH}::{kind}::nested(\"{name_full}\", \"{relation}\")")
                }
                None => format!("{FIELDS_PATH}::{kind}::new(\"{name_full}\")"),
            };
            Member {
                const_name: const_name.clone(),
                ty: format!("{FIELDS_PATH}::{kind}<{root}{generics}>"),
                init: ctor,
            }
        };

        match attribute.category {
            FieldCategory::String => members.push(descriptor("StringField", "")),
            FieldCategory::Number => {
                members.push(descriptor("NumberField", &format!(", {value_ty}")));
            }
            FieldCategory::DateTime => {
                members.push(descriptor("DateTimeField", &format!(", {value_ty}")));
            }
            FieldCategory::Boolean | FieldCategory::Enum | FieldCategory::Simple => {
                members.push(descriptor("SimpleField", &format!(", {value_ty}")));
            }
            FieldCategory::Comparable => {
                members.push(descriptor("ComparableField", &format!(", {value_ty}")));
            }
            FieldCategory::Collection => {
                // collections inside relations are skipped
                if name_prefix.is_empty() {
                    members.push(descriptor("CollectionField", &format!(", {value_ty}")));
                }
            }
            FieldCategory::Embedded => {
                let Some(target) = &attribute.target else {
                    bail!("embedded attribute `{name_full}` has no target type");
                };
                let Some(target_def) = graph.lookup(target) else {
                    bail!("embeddable `{target}` for `{name_full}` was not scanned");
                };
                members.extend(members_for(
                    graph,
                    root,
                    target_def,
                    &name_full,
                    relation_path,
                    &const_name,
                    depth_left,
                    visited,
                    options,
                    containers,
                )?);
            }
            FieldCategory::Relation => {
                if !options.generate_relations || depth_left == 0 {
                    continue;
                }
                let Some(target) = &attribute.target else {
                    bail!("relation attribute `{name_full}` has no target type");
                };
                if visited.contains(target) {
                    continue;
                }
                let Some(target_def) = graph.lookup(target) else {
                    bail!("relation target `{target}` for `{name_full}` was not scanned");
                };

                let mut visited = visited.clone();
                visited.insert(target.clone());

                let container_name = container_name(root, &name_full);
                emit_container(
                    graph,
                    root,
                    &name_full,
                    target_def,
                    depth_left - 1,
                    &visited,
                    options,
                    containers,
                )?;
                members.push(Member {
                    const_name: const_name.clone(),
                    ty: container_name.clone(),
                    init: format!("{container_name}::NEW"),
                });
            }
        }
    }

    Ok(members)
}

#[allow(clippy::too_many_arguments)]
fn emit_container(
    graph: &EntityGraph,
    root: &str,
    rel_path: &str,
    target: &EntityDef,
    depth_left: u32,
    visited: &BTreeSet<String>,
    options: &GeneratorOptions,
    containers: &mut Vec<String>,
) -> Result<()> {
    let name = container_name(root, rel_path);
    let target_name = &target.rust_name;

    let self_init = match rel_path.rsplit_once('.') {
        Some((parent, _)) => {
            format!("{FIELDS_PATH}::RelationField::nested(\"{rel_path}\", \"{parent}\")")
        }
        None => format!("{FIELDS_PATH}::RelationField::new(\"{rel_path}\")"),
    };

    let members = members_for(
        graph,
        root,
        target,
        rel_path,
        Some(rel_path),
        "",
        depth_left,
        visited,
        options,
        containers,
    )?;

    let mut out = String::new();
    let _ = writeln!(out, "///\n/// {name}\n///\n");
    out.push_str("#[allow(non_snake_case)]\n");
    let _ = writeln!(out, "pub struct {name} {{");
    let _ = writeln!(
        out,
        "    pub SELF: {FIELDS_PATH}::RelationField<{root}, {target_name}>,"
    );
    for member in &members {
        let _ = writeln!(out, "    pub {}: {},", member.const_name, member.ty);
    }
    out.push_str("}\n\n");

    let _ = writeln!(out, "impl {name} {{");
    out.push_str("    pub const NEW: Self = Self {\n");
    let _ = writeln!(out, "        SELF: {self_init},");
    for member in &members {
        let _ = writeln!(out, "        {}: {},", member.const_name, member.init);
    }
    out.push_str("    };\n}\n\n");

    let _ = writeln!(out, "impl ::std::ops::Deref for {name} {{");
    let _ = writeln!(
        out,
        "    type Target = {FIELDS_PATH}::RelationField<{root}, {target_name}>;"
    );
    out.push('\n');
    out.push_str("    fn deref(&self) -> &Self::Target {\n        &self.SELF\n    }\n}\n");

    containers.push(out);
    Ok(())
}

fn container_name(root: &str, rel_path: &str) -> String {
    let mut name = root.to_string();
    for segment in rel_path.split('.') {
        name.push_str(&segment.to_case(Case::UpperCamel));
    }
    name.push_str("Fields");
    name
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn join_const(prefix: &str, name: &str) -> String {
    let upper = name.to_case(Case::UpperSnake);
    if prefix.is_empty() {
        upper
    } else {
        format!("{prefix}_{upper}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AttributeDef;

    fn graph() -> EntityGraph {
        let user = EntityDef::new("User", StructKind::Entity)
            .attribute(AttributeDef::new("id", FieldCategory::Number, "i64"))
            .attribute(AttributeDef::new("name", FieldCategory::String, "String"))
            .attribute(AttributeDef::new("active", FieldCategory::Boolean, "bool"))
            .attribute(AttributeDef::new(
                "joined_at",
                FieldCategory::DateTime,
                "DateTime<Utc>",
            ))
            .attribute(AttributeDef::new("status", FieldCategory::Enum, "UserStatus"))
            .attribute(
                AttributeDef::new("department", FieldCategory::Relation, "Department")
                    .with_target("Department"),
            )
            .attribute(
                AttributeDef::new("orders", FieldCategory::Collection, "Order")
                    .with_target("Order"),
            )
            .attribute(
                AttributeDef::new("address", FieldCategory::Embedded, "Address")
                    .with_target("Address"),
            )
            .attribute(AttributeDef::new("scratch", FieldCategory::String, "String").transient());

        let department = EntityDef::new("Department", StructKind::Entity)
            .attribute(AttributeDef::new("id", FieldCategory::Number, "i64"))
            .attribute(AttributeDef::new("name", FieldCategory::String, "String"))
            .attribute(
                AttributeDef::new("company", FieldCategory::Relation, "Company")
                    .with_target("Company"),
            )
            .attribute(
                AttributeDef::new("members", FieldCategory::Collection, "User")
                    .with_target("User"),
            );

        let company = EntityDef::new("Company", StructKind::Entity)
            .attribute(AttributeDef::new("id", FieldCategory::Number, "i64"))
            .attribute(AttributeDef::new("name", FieldCategory::String, "String"));

        let address = EntityDef::new("Address", StructKind::Embeddable)
            .attribute(AttributeDef::new("city", FieldCategory::String, "String"))
            .attribute(AttributeDef::new("street", FieldCategory::String, "String"));

        let mut graph = EntityGraph::new();
        graph.extend(vec![user, department, company, address]);
        graph
    }

    fn emit_user(options: &GeneratorOptions) -> String {
        let graph = graph();
        let user = graph.lookup("User").unwrap().clone();
        emit_entity_fields(&graph, &user, options).unwrap()
    }

    #[test]
    fn emits_categorized_descriptors() {
        let code = emit_user(&GeneratorOptions::default());
        assert!(code.contains(
            "pub const ID: ::helix::fields::NumberField<User, i64> = ::helix::fields::NumberField::new(\"id\");"
        ));
        assert!(code.contains(
            "pub const NAME: ::helix::fields::StringField<User> = ::helix::fields::StringField::new(\"name\");"
        ));
        assert!(code.contains("SimpleField<User, bool>"));
        assert!(code.contains("DateTimeField<User, DateTime<Utc>>"));
        assert!(code.contains("SimpleField<User, UserStatus>"));
        assert!(code.contains("CollectionField<User, Order>"));
    }

    #[test]
    fn transient_attributes_are_skipped_by_default() {
        let code = emit_user(&GeneratorOptions::default());
        assert!(!code.contains("SCRATCH"));

        let options = GeneratorOptions {
            include_transient: true,
            ..GeneratorOptions::default()
        };
        assert!(emit_user(&options).contains("SCRATCH"));
    }

    #[test]
    fn embedded_attributes_flatten_with_dotted_names() {
        let code = emit_user(&GeneratorOptions::default());
        assert!(code.contains(
            "pub const ADDRESS_CITY: ::helix::fields::StringField<User> = ::helix::fields::StringField::new(\"address.city\");"
        ));
        assert!(code.contains("ADDRESS_STREET"));
    }

    #[test]
    fn relations_get_nested_containers_with_self_accessor() {
        let code = emit_user(&GeneratorOptions::default());
        assert!(code.contains("pub const DEPARTMENT: UserDepartmentFields = UserDepartmentFields::NEW;"));
        assert!(code.contains("pub struct UserDepartmentFields {"));
        assert!(code.contains("pub SELF: ::helix::fields::RelationField<User, Department>,"));
        assert!(code.contains("::helix::fields::StringField::nested(\"department.name\", \"department\")"));
        // default depth 1: no relation-in-relation container
        assert!(!code.contains("UserDepartmentCompanyFields"));
        // collections inside relations are skipped
        assert!(!code.contains("department.members"));
    }

    #[test]
    fn relation_depth_two_recurses_once() {
        let options = GeneratorOptions {
            relation_depth: 2,
            ..GeneratorOptions::default()
        };
        let code = emit_user(&options);
        assert!(code.contains("pub struct UserDepartmentCompanyFields {"));
        assert!(code.contains(
            "::helix::fields::RelationField::nested(\"department.company\", \"department\")"
        ));
        assert!(code.contains("::helix::fields::StringField::nested(\"department.company.name\", \"department.company\")"));
    }

    #[test]
    fn cycles_are_pruned_by_visited_types() {
        // Department.members collections are skipped, but give Company a
        // relation back to User to force a cycle
        let mut graph = graph();
        let company = graph
            .entities
            .iter_mut()
            .find(|def| def.rust_name == "Company")
            .unwrap();
        company.attributes.push(
            AttributeDef::new("owner", FieldCategory::Relation, "User").with_target("User"),
        );

        let options = GeneratorOptions {
            relation_depth: 5,
            ..GeneratorOptions::default()
        };
        let user = graph.lookup("User").unwrap().clone();
        let code = emit_entity_fields(&graph, &user, &options).unwrap();
        // the chain stops before revisiting User
        assert!(code.contains("UserDepartmentCompanyFields"));
        assert!(!code.contains("UserDepartmentCompanyOwnerFields"));
    }

    #[test]
    fn relations_can_be_disabled() {
        let options = GeneratorOptions {
            generate_relations: false,
            ..GeneratorOptions::default()
        };
        let code = emit_user(&options);
        assert!(!code.contains("DEPARTMENT"));
        assert!(!code.contains("UserDepartmentFields"));
    }
}
