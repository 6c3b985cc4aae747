///
/// FieldCategory
///
/// Every attribute falls into exactly one category; precedence is
/// COLLECTION → EMBEDDED → RELATION → concrete type → ENUM →
/// COMPARABLE → SIMPLE.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldCategory {
    String,
    Number,
    DateTime,
    Boolean,
    Enum,
    Collection,
    Relation,
    Embedded,
    Comparable,
    Simple,
}

///
/// StructKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StructKind {
    Entity,
    Embeddable,
}

///
/// AttributeDef
///

#[derive(Clone, Debug)]
pub struct AttributeDef {
    /// Attribute name (the Rust field identifier).
    pub name: String,
    pub category: FieldCategory,
    /// Leaf (or collection-element) type, rendered as Rust source.
    pub value_ty: String,
    /// Target struct name for RELATION / EMBEDDED / entity COLLECTION.
    pub target: Option<String>,
    pub transient: bool,
    pub ignored: bool,
}

impl AttributeDef {
    #[must_use]
    pub fn new(name: impl Into<String>, category: FieldCategory, value_ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category,
            value_ty: value_ty.into(),
            target: None,
            transient: false,
            ignored: false,
        }
    }

    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    #[must_use]
    pub const fn transient(mut self) -> Self {
        self.transient = true;
        self
    }
}

///
/// EntityDef
///

#[derive(Clone, Debug)]
pub struct EntityDef {
    pub rust_name: String,
    pub kind: StructKind,
    pub attributes: Vec<AttributeDef>,
}

impl EntityDef {
    #[must_use]
    pub fn new(rust_name: impl Into<String>, kind: StructKind) -> Self {
        Self {
            rust_name: rust_name.into(),
            kind,
            attributes: Vec::new(),
        }
    }

    #[must_use]
    pub fn attribute(mut self, attribute: AttributeDef) -> Self {
        self.attributes.push(attribute);
        self
    }
}

///
/// EntityGraph
///
/// The whole-build view the generator needs: relation targets and
/// embeddables are resolved by struct name across all scanned files.
///

#[derive(Clone, Debug, Default)]
pub struct EntityGraph {
    pub entities: Vec<EntityDef>,
}

impl EntityGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, defs: Vec<EntityDef>) {
        self.entities.extend(defs);
    }

    #[must_use]
    pub fn lookup(&self, rust_name: &str) -> Option<&EntityDef> {
        self.entities.iter().find(|def| def.rust_name == rust_name)
    }
}
