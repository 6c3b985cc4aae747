use super::{HelixField, JoinSource};
use crate::entity::Entity;
use crate::expr::{CompareOp, Expr, PathExpr, Predicate};
use crate::value::{FieldValue, TypeTag};
use std::marker::PhantomData;

///
/// RelationField
///
/// Descriptor for a to-one relation attribute. Equality and membership
/// over related entities are lowered **explicitly to identifier
/// comparison** (`<relation>.<primary key>`), which forces the
/// auto-join; null checks reference the relation attribute itself and
/// never add a join for root-level relations.
///
/// Serves as the `SELF` member of generated nested accessor
/// containers, which also deref to it.
///

pub struct RelationField<E, R> {
    name: &'static str,
    parent_path: Option<&'static str>,
    _marker: PhantomData<fn() -> (E, R)>,
}

impl<E, R> RelationField<E, R> {
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            parent_path: None,
            _marker: PhantomData,
        }
    }

    /// Relation reached through another relation (`parent_path` is the
    /// dotted prefix above it).
    #[must_use]
    pub const fn nested(name: &'static str, parent_path: &'static str) -> Self {
        Self {
            name,
            parent_path: Some(parent_path),
            _marker: PhantomData,
        }
    }
}

impl<E, R> Clone for RelationField<E, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E, R> Copy for RelationField<E, R> {}

impl<E: Entity, R: Entity> RelationField<E, R> {
    /// Foreign-key position of the relation itself (no join).
    fn attribute_path(&self) -> PathExpr {
        let path = PathExpr::new(E::ENTITY_NAME, self.name, TypeTag::Entity);
        match self.parent_path {
            Some(parent) => path.with_relation(parent),
            None => path,
        }
    }

    fn id_path(&self) -> PathExpr {
        PathExpr::new(
            E::ENTITY_NAME,
            format!("{}.{}", self.name, R::PRIMARY_KEY),
            <R::Id as FieldValue>::TAG,
        )
        .with_relation(self.name)
    }

    /// Equality on the related entity (identifier comparison).
    #[must_use]
    pub fn eq_entity(&self, related: &R) -> Predicate {
        let Some(id) = related.id() else {
            return Predicate::always_false();
        };
        Predicate::compare(CompareOp::Eq, Expr::Path(self.id_path()), Expr::constant(id))
    }

    #[must_use]
    pub fn eq_entity_opt(&self, related: Option<&R>) -> Option<Predicate> {
        related.map(|r| self.eq_entity(r))
    }

    #[must_use]
    pub fn ne_entity(&self, related: &R) -> Predicate {
        let Some(id) = related.id() else {
            return Predicate::always_false();
        };
        Predicate::compare(CompareOp::Ne, Expr::Path(self.id_path()), Expr::constant(id))
    }

    /// Membership over whole entities; `None` for an empty collection.
    #[must_use]
    pub fn in_entities<'a, I>(&self, entities: I) -> Option<Predicate>
    where
        I: IntoIterator<Item = &'a R>,
    {
        let ids: Vec<Expr> = entities
            .into_iter()
            .filter_map(|related| related.id())
            .map(Expr::constant)
            .collect();
        if ids.is_empty() {
            None
        } else {
            Some(Predicate::In {
                target: Expr::Path(self.id_path()),
                values: ids,
                negated: false,
            })
        }
    }
}

impl<E: Entity, R: Entity> HelixField<E> for RelationField<E, R> {
    type Value = R::Id;

    fn name(&self) -> &'static str {
        self.name
    }

    fn relation_path(&self) -> Option<&'static str> {
        Some(self.name)
    }

    /// Identifier position of the related entity; any reference forces
    /// the auto-join.
    fn path(&self) -> PathExpr {
        self.id_path()
    }

    fn is_null(self) -> Predicate {
        Predicate::IsNull(Expr::Path(self.attribute_path()))
    }

    fn is_not_null(self) -> Predicate {
        Predicate::IsNotNull(Expr::Path(self.attribute_path()))
    }
}

impl<E: Entity, R: Entity> JoinSource<E> for RelationField<E, R> {
    fn join_path(&self) -> &'static str {
        self.name
    }

    fn is_collection(&self) -> bool {
        false
    }
}
