//! Module: fields
//! Responsibility: typed field descriptors and the capability traits
//! that constrain which operators an entity attribute participates in.
//! Descriptors are `const`-constructible, process-lifetime values
//! emitted by the metadata generator; their factory methods return
//! expression nodes and never execute anything.

mod collection;
mod comparable;
mod datetime;
mod number;
mod relation;
mod simple;
mod string;

pub use collection::CollectionField;
pub use comparable::ComparableField;
pub use datetime::DateTimeField;
pub use number::NumberField;
pub use relation::RelationField;
pub use simple::SimpleField;
pub use string::StringField;

use crate::entity::Entity;
use crate::expr::{CompareOp, Expr, Order, PathExpr, Predicate};
use crate::value::FieldValue;

/// Escape character used by the wildcard-safe string helpers.
pub const LIKE_ESCAPE: char = '\\';

/// Escape `%`, `_`, and the escape character itself so the input
/// matches literally inside a LIKE pattern.
#[must_use]
pub fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if c == '%' || c == '_' || c == LIKE_ESCAPE {
            out.push(LIKE_ESCAPE);
        }
        out.push(c);
    }
    out
}

///
/// HelixField
///
/// Unified capability satisfied by every descriptor variant: a dotted
/// attribute path, an optional relation prefix, and at minimum
/// equality, null checks, membership, and ordering factories.
///
/// Predicate factories with a `*_opt` form treat `None` as "omit this
/// clause" and return `None`; `in_list` returns `None` for an empty
/// collection (an empty `IN` must not silently match all rows;
/// callers that need "no match" use [`Predicate::always_false`]).
///

pub trait HelixField<E: Entity>: Copy {
    type Value: FieldValue;

    fn name(&self) -> &'static str;

    fn relation_path(&self) -> Option<&'static str>;

    fn path(&self) -> PathExpr {
        let path = PathExpr::new(
            E::ENTITY_NAME,
            self.name(),
            <Self::Value as FieldValue>::TAG,
        );
        match self.relation_path() {
            Some(relation) => path.with_relation(relation),
            None => path,
        }
    }

    fn expr(&self) -> Expr {
        Expr::Path(self.path())
    }

    // ------------------------------------------------------------------
    // Predicate factories
    // ------------------------------------------------------------------

    fn eq<V: Into<Self::Value>>(self, value: V) -> Predicate {
        Predicate::compare(CompareOp::Eq, self.expr(), Expr::constant(value.into()))
    }

    fn eq_opt<V: Into<Self::Value>>(self, value: Option<V>) -> Option<Predicate> {
        value.map(|v| self.eq(v))
    }

    fn ne<V: Into<Self::Value>>(self, value: V) -> Predicate {
        Predicate::compare(CompareOp::Ne, self.expr(), Expr::constant(value.into()))
    }

    fn ne_opt<V: Into<Self::Value>>(self, value: Option<V>) -> Option<Predicate> {
        value.map(|v| self.ne(v))
    }

    /// Null check; never forces a join for root-level attributes.
    fn is_null(self) -> Predicate {
        Predicate::IsNull(self.expr())
    }

    fn is_not_null(self) -> Predicate {
        Predicate::IsNotNull(self.expr())
    }

    fn in_list<I, V>(self, values: I) -> Option<Predicate>
    where
        I: IntoIterator<Item = V>,
        V: Into<Self::Value>,
    {
        let values: Vec<Expr> = values
            .into_iter()
            .map(|v| Expr::constant(v.into()))
            .collect();
        if values.is_empty() {
            None
        } else {
            Some(Predicate::In {
                target: self.expr(),
                values,
                negated: false,
            })
        }
    }

    fn not_in<I, V>(self, values: I) -> Option<Predicate>
    where
        I: IntoIterator<Item = V>,
        V: Into<Self::Value>,
    {
        match self.in_list(values) {
            Some(Predicate::In { target, values, .. }) => Some(Predicate::In {
                target,
                values,
                negated: true,
            }),
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // Order factories
    // ------------------------------------------------------------------

    fn asc(self) -> Order {
        Order::asc(self.expr())
    }

    fn desc(self) -> Order {
        Order::desc(self.expr())
    }
}

///
/// OrderedField
///
/// Capability extension for attributes with a total order.
///

pub trait OrderedField<E: Entity>: HelixField<E> {
    fn gt<V: Into<Self::Value>>(self, value: V) -> Predicate {
        Predicate::compare(CompareOp::Gt, self.expr(), Expr::constant(value.into()))
    }

    fn gt_opt<V: Into<Self::Value>>(self, value: Option<V>) -> Option<Predicate> {
        value.map(|v| self.gt(v))
    }

    fn ge<V: Into<Self::Value>>(self, value: V) -> Predicate {
        Predicate::compare(CompareOp::Ge, self.expr(), Expr::constant(value.into()))
    }

    fn ge_opt<V: Into<Self::Value>>(self, value: Option<V>) -> Option<Predicate> {
        value.map(|v| self.ge(v))
    }

    fn lt<V: Into<Self::Value>>(self, value: V) -> Predicate {
        Predicate::compare(CompareOp::Lt, self.expr(), Expr::constant(value.into()))
    }

    fn lt_opt<V: Into<Self::Value>>(self, value: Option<V>) -> Option<Predicate> {
        value.map(|v| self.lt(v))
    }

    fn le<V: Into<Self::Value>>(self, value: V) -> Predicate {
        Predicate::compare(CompareOp::Le, self.expr(), Expr::constant(value.into()))
    }

    fn le_opt<V: Into<Self::Value>>(self, value: Option<V>) -> Option<Predicate> {
        value.map(|v| self.le(v))
    }

    fn between<V: Into<Self::Value>>(self, low: V, high: V) -> Predicate {
        Predicate::Between {
            target: self.expr(),
            low: Expr::constant(low.into()),
            high: Expr::constant(high.into()),
        }
    }
}

///
/// JoinSource
///
/// Descriptors that can anchor a join or fetch join: relations and
/// entity collections.
///

pub trait JoinSource<E: Entity>: Copy {
    fn join_path(&self) -> &'static str;

    fn is_collection(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn escape_like_escapes_wildcards_and_escape_char() {
        assert_eq!(escape_like("100%_done"), "100\\%\\_done");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
        assert_eq!(escape_like("plain"), "plain");
    }

    proptest! {
        #[test]
        fn escaped_input_contains_no_bare_wildcards(input in ".*") {
            let escaped = escape_like(&input);
            let mut chars = escaped.chars();
            while let Some(c) = chars.next() {
                if c == LIKE_ESCAPE {
                    // the escape always precedes a character it protects
                    let next = chars.next();
                    prop_assert!(matches!(next, Some('%' | '_' | LIKE_ESCAPE)));
                } else {
                    prop_assert!(c != '%' && c != '_');
                }
            }
        }
    }
}
