use super::{HelixField, OrderedField};
use crate::entity::Entity;
use crate::value::FieldValue;
use std::marker::PhantomData;

///
/// ComparableField
///
/// Descriptor for attributes with a total order but no arithmetic
/// (dates as plain comparables, versions, ordered newtypes).
///

pub struct ComparableField<E, V> {
    name: &'static str,
    relation_path: Option<&'static str>,
    _marker: PhantomData<fn() -> (E, V)>,
}

impl<E, V> ComparableField<E, V> {
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

impl<E, V> Clone for ComparableField<E, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E, V> Copy for ComparableField<E, V> {}

impl<E: Entity, V: FieldValue> HelixField<E> for ComparableField<E, V> {
    type Value = V;

    fn name(&self) -> &'static str {
        self.name
    }

    fn relation_path(&self) -> Option<&'static str> {
        self.relation_path
    }
}

impl<E: Entity, V: FieldValue> OrderedField<E> for ComparableField<E, V> {}
