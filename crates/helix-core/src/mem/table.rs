use crate::entity::{Entity, FieldValues};
use crate::value::Value;
use std::any::Any;
use std::collections::BTreeMap;

///
/// TableOps
///
/// Type-erased view of one entity table: record snapshots for the
/// evaluation pipeline and predicate-driven bulk removal. Typed access
/// goes through `Any` downcasts.
///

pub(crate) trait TableOps {
    fn records(&self) -> Vec<Value>;

    fn delete_by(&mut self, matches: &mut dyn FnMut(&Value) -> bool) -> u64;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

///
/// Table
///

pub(crate) struct Table<E: Entity> {
    pub rows: BTreeMap<E::Id, E>,
}

impl<E: Entity> Table<E> {
    pub(crate) const fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
        }
    }
}

impl<E: Entity> TableOps for Table<E> {
    fn records(&self) -> Vec<Value> {
        self.rows.values().map(FieldValues::to_record).collect()
    }

    fn delete_by(&mut self, matches: &mut dyn FnMut(&Value) -> bool) -> u64 {
        let doomed: Vec<E::Id> = self
            .rows
            .iter()
            .filter(|(_, entity)| matches(&entity.to_record()))
            .map(|(id, _)| id.clone())
            .collect();
        for id in &doomed {
            self.rows.remove(id);
        }
        doomed.len() as u64
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
