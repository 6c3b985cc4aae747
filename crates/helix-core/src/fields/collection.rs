use super::{HelixField, JoinSource};
use crate::entity::Entity;
use crate::expr::{CompareOp, Expr, ExprOp, PathExpr, Predicate};
use crate::value::{FieldValue, TypeTag};
use std::marker::PhantomData;

///
/// CollectionField
///
/// Descriptor for collection attributes: size, membership, emptiness,
/// and participation in (fetch) joins. `V` is the element type: an
/// entity for relation collections, a scalar for element collections.
///

pub struct CollectionField<E, V> {
    name: &'static str,
    relation_path: Option<&'static str>,
    _marker: PhantomData<fn() -> (E, V)>,
}

impl<E, V> CollectionField<E, V> {
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

impl<E, V> Clone for CollectionField<E, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E, V> Copy for CollectionField<E, V> {}

impl<E: Entity, V> CollectionField<E, V> {
    fn collection_path(&self) -> PathExpr {
        let path = PathExpr::new(E::ENTITY_NAME, self.name, TypeTag::List);
        match self.relation_path {
            Some(relation) => path.with_relation(relation),
            None => path,
        }
    }

    /// Number of elements (SIZE).
    #[must_use]
    pub fn size(&self) -> Expr {
        Expr::operation(
            ExprOp::Size,
            vec![Expr::Path(self.collection_path())],
            TypeTag::Int,
        )
    }

    #[must_use]
    pub fn is_empty(&self) -> Predicate {
        Predicate::IsEmpty(self.collection_path())
    }

    #[must_use]
    pub fn is_not_empty(&self) -> Predicate {
        Predicate::IsNotEmpty(self.collection_path())
    }
}

impl<E: Entity, V: FieldValue> CollectionField<E, V> {
    /// Membership of a scalar element (MEMBER OF).
    #[must_use]
    pub fn contains_value(&self, element: impl Into<V>) -> Predicate {
        Predicate::MemberOf {
            element: Expr::constant(element.into()),
            target: self.collection_path(),
        }
    }
}

impl<E: Entity, R: Entity> CollectionField<E, R> {
    /// Membership of a related entity, lowered explicitly to an
    /// identifier comparison through the collection join.
    #[must_use]
    pub fn contains(&self, related: &R) -> Predicate {
        let Some(id) = related.id() else {
            return Predicate::always_false();
        };
        let id_path = PathExpr::new(
            E::ENTITY_NAME,
            format!("{}.{}", self.name, R::PRIMARY_KEY),
            <R::Id as FieldValue>::TAG,
        )
        .with_relation(self.name);
        Predicate::compare(CompareOp::Eq, Expr::Path(id_path), Expr::constant(id))
    }
}

impl<E: Entity, V> JoinSource<E> for CollectionField<E, V> {
    fn join_path(&self) -> &'static str {
        self.name
    }

    fn is_collection(&self) -> bool {
        true
    }
}
