use super::{HelixField, OrderedField};
use crate::entity::Entity;
use crate::expr::{Expr, ExprOp};
use crate::value::{FieldValue, TypeTag};
use std::marker::PhantomData;

///
/// NumberField
///
/// Descriptor for numeric attributes: total order plus arithmetic and
/// aggregate factories. Arithmetic results are typed as the operand
/// type; `count`/`count_distinct` return `Int`, `avg` returns `Float`,
/// `sum`/`min`/`max` return the operand type.
///

pub struct NumberField<E, V> {
    name: &'static str,
    relation_path: Option<&'static str>,
    _marker: PhantomData<fn() -> (E, V)>,
}

impl<E, V> NumberField<E, V> {
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

impl<E, V> Clone for NumberField<E, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E, V> Copy for NumberField<E, V> {}

impl<E: Entity, V: FieldValue> HelixField<E> for NumberField<E, V> {
    type Value = V;

    fn name(&self) -> &'static str {
        self.name
    }

    fn relation_path(&self) -> Option<&'static str> {
        self.relation_path
    }
}

impl<E: Entity, V: FieldValue> OrderedField<E> for NumberField<E, V> {}

impl<E: Entity, V: FieldValue> NumberField<E, V> {
    // ------------------------------------------------------------------
    // Arithmetic
    // ------------------------------------------------------------------

    #[must_use]
    pub fn add(self, value: impl Into<V>) -> Expr {
        self.arith(ExprOp::Add, value)
    }

    #[must_use]
    pub fn subtract(self, value: impl Into<V>) -> Expr {
        self.arith(ExprOp::Subtract, value)
    }

    #[must_use]
    pub fn multiply(self, value: impl Into<V>) -> Expr {
        self.arith(ExprOp::Multiply, value)
    }

    #[must_use]
    pub fn divide(self, value: impl Into<V>) -> Expr {
        self.arith(ExprOp::Divide, value)
    }

    #[must_use]
    pub fn modulo(self, value: impl Into<V>) -> Expr {
        self.arith(ExprOp::Mod, value)
    }

    #[must_use]
    pub fn abs(self) -> Expr {
        Expr::operation(ExprOp::Abs, vec![self.expr()], V::TAG)
    }

    #[must_use]
    pub fn negate(self) -> Expr {
        Expr::operation(ExprOp::Negate, vec![self.expr()], V::TAG)
    }

    #[must_use]
    pub fn sqrt(self) -> Expr {
        Expr::operation(ExprOp::Sqrt, vec![self.expr()], TypeTag::Float)
    }

    fn arith(self, op: ExprOp, value: impl Into<V>) -> Expr {
        Expr::operation(
            op,
            vec![self.expr(), Expr::constant(value.into())],
            V::TAG,
        )
    }

    // ------------------------------------------------------------------
    // Aggregates
    // ------------------------------------------------------------------

    #[must_use]
    pub fn sum(self) -> Expr {
        Expr::operation(ExprOp::Sum, vec![self.expr()], V::TAG)
    }

    #[must_use]
    pub fn avg(self) -> Expr {
        Expr::operation(ExprOp::Avg, vec![self.expr()], TypeTag::Float)
    }

    #[must_use]
    pub fn min(self) -> Expr {
        Expr::operation(ExprOp::Min, vec![self.expr()], V::TAG)
    }

    #[must_use]
    pub fn max(self) -> Expr {
        Expr::operation(ExprOp::Max, vec![self.expr()], V::TAG)
    }

    #[must_use]
    pub fn count(self) -> Expr {
        Expr::operation(ExprOp::Count, vec![self.expr()], TypeTag::Int)
    }

    #[must_use]
    pub fn count_distinct(self) -> Expr {
        Expr::operation(ExprOp::CountDistinct, vec![self.expr()], TypeTag::Int)
    }
}
