use super::{HelixField, OrderedField};
use crate::entity::Entity;
use crate::expr::{CompareOp, Expr, ExprOp, Predicate};
use crate::value::{FieldValue, TypeTag};
use std::marker::PhantomData;

///
/// DateTimeField
///
/// Descriptor for temporal attributes: total order spelled in temporal
/// vocabulary, plus now-relative comparisons evaluated by the driver
/// at execution time (CURRENT_TIMESTAMP).
///

pub struct DateTimeField<E, V> {
    name: &'static str,
    relation_path: Option<&'static str>,
    _marker: PhantomData<fn() -> (E, V)>,
}

impl<E, V> DateTimeField<E, V> {
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            relation_path: None,
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub const fn nested(name: &'static str, relation_path: &'static str) -> Self {
        Self {
            name,
            relation_path: Some(relation_path),
            _marker: PhantomData,
        }
    }
}

impl<E, V> Clone for DateTimeField<E, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E, V> Copy for DateTimeField<E, V> {}

impl<E: Entity, V: FieldValue> HelixField<E> for DateTimeField<E, V> {
    type Value = V;

    fn name(&self) -> &'static str {
        self.name
    }

    fn relation_path(&self) -> Option<&'static str> {
        self.relation_path
    }
}

impl<E: Entity, V: FieldValue> OrderedField<E> for DateTimeField<E, V> {}

impl<E: Entity, V: FieldValue> DateTimeField<E, V> {
    #[must_use]
    pub fn before(self, value: impl Into<V>) -> Predicate {
        self.lt(value)
    }

    #[must_use]
    pub fn before_opt(self, value: Option<impl Into<V>>) -> Option<Predicate> {
        value.map(|v| self.before(v))
    }

    #[must_use]
    pub fn after(self, value: impl Into<V>) -> Predicate {
        self.gt(value)
    }

    #[must_use]
    pub fn after_opt(self, value: Option<impl Into<V>>) -> Option<Predicate> {
        value.map(|v| self.after(v))
    }

    #[must_use]
    pub fn on_or_before(self, value: impl Into<V>) -> Predicate {
        self.le(value)
    }

    #[must_use]
    pub fn on_or_after(self, value: impl Into<V>) -> Predicate {
        self.ge(value)
    }

    #[must_use]
    pub fn before_now(self) -> Predicate {
        Predicate::compare(CompareOp::Lt, self.expr(), Self::now())
    }

    #[must_use]
    pub fn after_now(self) -> Predicate {
        Predicate::compare(CompareOp::Gt, self.expr(), Self::now())
    }

    fn now() -> Expr {
        Expr::operation(ExprOp::CurrentTimestamp, vec![], TypeTag::Timestamp)
    }
}
