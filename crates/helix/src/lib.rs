//! # helix
//!
//! Public facade for the helix query builder: a type-safe, fluent
//! query surface over relational object mappings. This is the crate
//! downstream projects depend on; the engine lives in `helix-core`,
//! the derive macros in `helix-derive`, and the build-time descriptor
//! generator in `helix-build`.
//!
//! ## Getting started
//!
//! Annotate entities, generate (or write) their descriptor
//! containers, open a factory over a session, and compose:
//!
//! ```ignore
//! let factory = QueryFactory::new(session);
//! let admins = factory
//!     .query::<User>()
//!     .where_equal(UserFields::DEPARTMENT.NAME, "Engineering")
//!     .order_by_asc(UserFields::NAME)
//!     .list()?;
//! ```
//!
//! ## Crate layout
//!
//! - `fields`: typed descriptors and capability traits
//! - `expr`: the immutable expression IR
//! - `filter`: the predicate accumulator
//! - `criteria` / `compile`: driver-facing model and compiler
//! - `query`: the fluent builder and page shapes
//! - `session` / `service`: runtime contract, factory, service base
//! - `mem`: the in-memory reference engine

// modules
pub use helix_core::{compile, criteria, entity, error, expr, fields, filter, mem, query, service,
    session, value};

// derive macros
pub use helix_derive::{Embeddable, Entity};

// flat re-exports (the names generated code and typical callers use)
pub use helix_core::entity::{
    Entity, FieldValues, FromRow, FromValue, IdValue, Lifecycle, RowError,
};
pub use helix_core::error::{ExpectationError, HelixError, RuntimeError};
pub use helix_core::expr::{
    CompareOp, Constructor, Expr, ExprOp, IntoExpr, NullHandling, Order, PathExpr, Predicate,
    SortDirection,
};
pub use helix_core::fields::{
    CollectionField, ComparableField, DateTimeField, HelixField, JoinSource, NumberField,
    OrderedField, RelationField, SimpleField, StringField,
};
pub use helix_core::filter::PredicateBuilder;
pub use helix_core::mem::{MemDb, MemSession};
pub use helix_core::query::{Page, PageRequest, Query, SortKey};
pub use helix_core::service::EntityService;
pub use helix_core::session::{QueryFactory, Session, SessionHandle};
pub use helix_core::value::{FieldValue, Float64, TypeTag, Value};

///
/// Prelude
/// `use helix::prelude::*;` in application code; `as _` imports bring
/// the capability traits into scope without name conflicts.
///

pub mod prelude {
    pub use crate::{
        Embeddable, Entity, EntityService as _, FieldValue as _, FieldValues as _,
        HelixField as _, IntoExpr as _, JoinSource as _, Lifecycle as _, Order, OrderedField as _,
        Page, PageRequest, Predicate, PredicateBuilder, QueryFactory, Session as _, SortKey,
        Value,
    };
}
