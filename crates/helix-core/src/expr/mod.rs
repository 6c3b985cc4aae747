//! Module: expr
//! Responsibility: immutable expression IR for filters, selections, and
//! order clauses. Does not own: path resolution, join materialization,
//! or driver lowering (those live in `compile`).

mod order;
mod predicate;
mod projection;

pub use order::{NullHandling, Order, SortDirection};
pub use predicate::{CompareOp, Predicate};
pub use projection::Constructor;

use crate::value::{FieldValue, TypeTag, Value};

///
/// PathExpr
///
/// Root-or-attribute reference. `path` is the dotted attribute chain
/// from the entity root (empty for the root itself); `relation_path`
/// is the dotted prefix whose traversal must be materialized as a join
/// before the leaf is referenced. Non-empty iff the path crosses a
/// relation boundary.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PathExpr {
    pub entity: &'static str,
    pub path: String,
    pub relation_path: Option<String>,
    pub tag: TypeTag,
}

impl PathExpr {
    #[must_use]
    pub fn new(entity: &'static str, path: impl Into<String>, tag: TypeTag) -> Self {
        Self {
            entity,
            path: path.into(),
            relation_path: None,
            tag,
        }
    }

    #[must_use]
    pub fn with_relation(mut self, relation_path: impl Into<String>) -> Self {
        self.relation_path = Some(relation_path.into());
        self
    }

    /// Reference to the entity root itself.
    #[must_use]
    pub fn root(entity: &'static str) -> Self {
        Self::new(entity, "", TypeTag::Entity)
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }
}

///
/// ExprOp
///
/// Closed scalar/aggregate operator tag set. Boolean composition and
/// comparison live on [`Predicate`].
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExprOp {
    // string
    Upper,
    Lower,
    Trim,
    Length,
    Concat,
    Substring,
    Locate,
    // numeric
    Add,
    Subtract,
    Multiply,
    Divide,
    Mod,
    Abs,
    Negate,
    Sqrt,
    // aggregate
    Count,
    CountDistinct,
    Sum,
    Avg,
    Min,
    Max,
    // temporal
    CurrentDate,
    CurrentTime,
    CurrentTimestamp,
    // conversion
    Coalesce,
    Nullif,
    Cast,
    // collection
    Size,
}

impl ExprOp {
    #[must_use]
    pub const fn is_aggregate(self) -> bool {
        matches!(
            self,
            Self::Count | Self::CountDistinct | Self::Sum | Self::Avg | Self::Min | Self::Max
        )
    }
}

///
/// Expr
///
/// Immutable scalar expression tree. Value-like; freely shared across
/// builders.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Path(PathExpr),
    Constant { value: Value, tag: TypeTag },
    Operation { op: ExprOp, args: Vec<Expr>, tag: TypeTag },
}

impl Expr {
    /// Typed constant; the declared tag survives even for `None` values.
    #[must_use]
    pub fn constant<T: FieldValue>(value: T) -> Self {
        Self::Constant {
            value: value.to_value(),
            tag: T::TAG,
        }
    }

    /// Typed null constant.
    #[must_use]
    pub const fn null(tag: TypeTag) -> Self {
        Self::Constant {
            value: Value::Null,
            tag,
        }
    }

    #[must_use]
    pub fn operation(op: ExprOp, args: Vec<Self>, tag: TypeTag) -> Self {
        Self::Operation { op, args, tag }
    }

    /// Declared result type.
    #[must_use]
    pub fn tag(&self) -> TypeTag {
        match self {
            Self::Path(path) => path.tag,
            Self::Constant { tag, .. } | Self::Operation { tag, .. } => *tag,
        }
    }

    // ------------------------------------------------------------------
    // Comparison sugar (used by having clauses over aggregates)
    // ------------------------------------------------------------------

    #[must_use]
    pub fn equals(self, rhs: impl IntoExpr) -> Predicate {
        Predicate::compare(CompareOp::Eq, self, rhs.into_expr())
    }

    #[must_use]
    pub fn not_equals(self, rhs: impl IntoExpr) -> Predicate {
        Predicate::compare(CompareOp::Ne, self, rhs.into_expr())
    }

    #[must_use]
    pub fn gt(self, rhs: impl IntoExpr) -> Predicate {
        Predicate::compare(CompareOp::Gt, self, rhs.into_expr())
    }

    #[must_use]
    pub fn ge(self, rhs: impl IntoExpr) -> Predicate {
        Predicate::compare(CompareOp::Ge, self, rhs.into_expr())
    }

    #[must_use]
    pub fn lt(self, rhs: impl IntoExpr) -> Predicate {
        Predicate::compare(CompareOp::Lt, self, rhs.into_expr())
    }

    #[must_use]
    pub fn le(self, rhs: impl IntoExpr) -> Predicate {
        Predicate::compare(CompareOp::Le, self, rhs.into_expr())
    }
}

impl From<PathExpr> for Expr {
    fn from(path: PathExpr) -> Self {
        Self::Path(path)
    }
}

///
/// IntoExpr
///
/// Anything that can stand in expression position: an expression, or a
/// plain value (lifted to a typed constant).
///

pub trait IntoExpr {
    fn into_expr(self) -> Expr;
}

impl IntoExpr for Expr {
    fn into_expr(self) -> Expr {
        self
    }
}

impl IntoExpr for PathExpr {
    fn into_expr(self) -> Expr {
        Expr::Path(self)
    }
}

impl<T: FieldValue> IntoExpr for T {
    fn into_expr(self) -> Expr {
        Expr::Constant {
            value: self.to_value(),
            tag: T::TAG,
        }
    }
}
