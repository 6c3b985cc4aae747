//! Module: mem
//! Responsibility: the bundled single-threaded reference engine, an
//! in-process driver implementing the [`Session`] contract over typed
//! in-memory tables. Query evaluation is SQL-faithful (join expansion
//! multiplies rows, LEFT joins null-extend, DISTINCT collapses), which
//! is what makes the pagination and deletion semantics of the
//! execution engine observable in tests.

mod eval;
mod pipeline;
mod table;

use crate::criteria::{CriteriaDelete, CriteriaQuery, Selection};
use crate::entity::{Entity, FieldValues, IdValue, Lifecycle};
use crate::error::RuntimeError;
use crate::session::Session;
use crate::value::{FieldValue, Value};
use pipeline::Output;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;
use table::{Table, TableOps};

///
/// MemDb
///
/// Shared storage: one typed table per entity name plus identifier
/// sequences. Shared across sessions through `Rc`.
///

#[derive(Default)]
pub struct MemDb {
    tables: RefCell<BTreeMap<&'static str, Box<dyn TableOps>>>,
    sequences: RefCell<BTreeMap<&'static str, u64>>,
}

impl MemDb {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn shared() -> Rc<Self> {
        Rc::new(Self::new())
    }

    /// Rows currently stored for an entity name.
    #[must_use]
    pub fn row_count(&self, entity: &str) -> usize {
        self.tables
            .borrow()
            .get(entity)
            .map_or(0, |table| table.records().len())
    }

    fn with_table<E: Entity, R>(
        &self,
        f: impl FnOnce(&Table<E>) -> R,
    ) -> Result<R, RuntimeError> {
        let mut tables = self.tables.borrow_mut();
        let table = tables
            .entry(E::ENTITY_NAME)
            .or_insert_with(|| Box::new(Table::<E>::new()));
        table
            .as_any()
            .downcast_ref::<Table<E>>()
            .map(f)
            .ok_or_else(|| table_mismatch::<E>())
    }

    fn with_table_mut<E: Entity, R>(
        &self,
        f: impl FnOnce(&mut Table<E>) -> R,
    ) -> Result<R, RuntimeError> {
        let mut tables = self.tables.borrow_mut();
        let table = tables
            .entry(E::ENTITY_NAME)
            .or_insert_with(|| Box::new(Table::<E>::new()));
        table
            .as_any_mut()
            .downcast_mut::<Table<E>>()
            .map(f)
            .ok_or_else(|| table_mismatch::<E>())
    }

    fn records(&self, entity: &str) -> Vec<Value> {
        self.tables
            .borrow()
            .get(entity)
            .map(|table| table.records())
            .unwrap_or_default()
    }

    fn delete_by(
        &self,
        entity: &str,
        matches: &mut dyn FnMut(&Value) -> bool,
    ) -> u64 {
        self.tables
            .borrow_mut()
            .get_mut(entity)
            .map_or(0, |table| table.delete_by(matches))
    }

    fn next_sequence(&self, entity: &'static str) -> u64 {
        let mut sequences = self.sequences.borrow_mut();
        let counter = sequences.entry(entity).or_insert(0);
        *counter += 1;
        *counter
    }
}

fn table_mismatch<E: Entity>() -> RuntimeError {
    RuntimeError::Internal(format!(
        "table `{}` is registered under a different entity type",
        E::ENTITY_NAME
    ))
}

///
/// MemSession
///
/// One persistence context over a shared [`MemDb`]: immediate writes,
/// a managed-instance set (first-level context), lifecycle callback
/// dispatch, and a write-transaction flag. Single-threaded by
/// construction.
///

pub struct MemSession {
    db: Rc<MemDb>,
    read_only: bool,
    managed: RefCell<BTreeSet<(&'static str, Value)>>,
    flushes: Cell<u64>,
}

impl MemSession {
    #[must_use]
    pub fn new(db: Rc<MemDb>) -> Self {
        Self {
            db,
            read_only: false,
            managed: RefCell::new(BTreeSet::new()),
            flushes: Cell::new(0),
        }
    }

    /// Session without an active write transaction; mutations fail
    /// with [`RuntimeError::TransactionRequired`].
    #[must_use]
    pub fn read_only(db: Rc<MemDb>) -> Self {
        Self {
            read_only: true,
            ..Self::new(db)
        }
    }

    #[must_use]
    pub fn flush_count(&self) -> u64 {
        self.flushes.get()
    }

    #[must_use]
    pub fn managed_count(&self) -> usize {
        self.managed.borrow().len()
    }

    const fn writable(&self) -> Result<(), RuntimeError> {
        if self.read_only {
            Err(RuntimeError::TransactionRequired)
        } else {
            Ok(())
        }
    }

    fn manage<E: Entity>(&self, entity: &E) {
        if let Some(id) = entity.id() {
            self.managed
                .borrow_mut()
                .insert((E::ENTITY_NAME, id.to_value()));
        }
    }

    fn unmanage<E: Entity>(&self, entity: &E) {
        if let Some(id) = entity.id() {
            self.managed
                .borrow_mut()
                .remove(&(E::ENTITY_NAME, id.to_value()));
        }
    }

    fn generate_id<E: Entity>(&self, entity: &mut E) -> Result<(), RuntimeError> {
        if entity.id().is_none() {
            let sequence = self.db.next_sequence(E::ENTITY_NAME);
            match E::Id::from_sequence(sequence) {
                Some(id) => entity.assign_id(id),
                None => {
                    return Err(RuntimeError::Unsupported(format!(
                        "{} requires an explicit identifier",
                        E::ENTITY_NAME
                    )));
                }
            }
        }
        Ok(())
    }

    fn store<E: Entity>(&self, entity: &E) -> Result<(), RuntimeError> {
        let Some(id) = entity.id() else {
            return Err(RuntimeError::Internal(
                "storing an instance without an identifier".to_string(),
            ));
        };
        let stored = entity.clone();
        self.db.with_table_mut::<E, _>(move |table| {
            table.rows.insert(id, stored);
        })
    }
}

impl Session for MemSession {
    fn persist<E: Entity>(&self, entity: &mut E) -> Result<(), RuntimeError> {
        self.writable()?;
        entity.before_persist();
        self.generate_id(entity)?;
        self.store(entity)?;
        self.manage(entity);
        Ok(())
    }

    fn merge<E: Entity>(&self, entity: &E) -> Result<E, RuntimeError> {
        self.writable()?;
        let mut managed = entity.clone();
        self.generate_id(&mut managed)?;
        self.store(&managed)?;
        self.manage(&managed);
        Ok(managed)
    }

    fn remove<E: Entity>(&self, entity: &E) -> Result<(), RuntimeError> {
        self.writable()?;
        let Some(id) = entity.id() else {
            return Err(RuntimeError::Unsupported(format!(
                "cannot remove a transient {} instance",
                E::ENTITY_NAME
            )));
        };
        entity.before_remove();
        self.db.with_table_mut::<E, _>(|table| {
            table.rows.remove(&id);
        })?;
        self.unmanage(entity);
        Ok(())
    }

    fn refresh<E: Entity>(&self, entity: &mut E) -> Result<(), RuntimeError> {
        let Some(id) = entity.id() else {
            return Err(RuntimeError::Unsupported(format!(
                "cannot refresh a transient {} instance",
                E::ENTITY_NAME
            )));
        };
        let stored = self
            .db
            .with_table::<E, _>(|table| table.rows.get(&id).cloned())?;
        match stored {
            Some(stored) => {
                *entity = stored;
                entity.after_load();
                self.manage(entity);
                Ok(())
            }
            None => Err(RuntimeError::NotFound(format!(
                "{} row no longer exists",
                E::ENTITY_NAME
            ))),
        }
    }

    fn detach<E: Entity>(&self, entity: &E) {
        self.unmanage(entity);
    }

    fn contains<E: Entity>(&self, entity: &E) -> bool {
        entity.id().is_some_and(|id| {
            self.managed
                .borrow()
                .contains(&(E::ENTITY_NAME, id.to_value()))
        })
    }

    fn flush(&self) -> Result<(), RuntimeError> {
        self.writable()?;
        self.flushes.set(self.flushes.get() + 1);
        Ok(())
    }

    fn find_by_id<E: Entity>(&self, id: &E::Id) -> Result<Option<E>, RuntimeError> {
        let stored = self
            .db
            .with_table::<E, _>(|table| table.rows.get(id).cloned())?;
        Ok(stored.map(|mut entity| {
            entity.after_load();
            self.manage(&entity);
            entity
        }))
    }

    fn execute_entities<E: Entity>(&self, query: &CriteriaQuery) -> Result<Vec<E>, RuntimeError> {
        if !matches!(query.selection, Selection::Root) {
            return Err(RuntimeError::Internal(
                "entity execution requires a root selection".to_string(),
            ));
        }
        let (entities, records) = self.db.with_table::<E, _>(|table| {
            let entities: Vec<E> = table.rows.values().cloned().collect();
            let records: Vec<Value> = entities.iter().map(FieldValues::to_record).collect();
            (entities, records)
        })?;

        match pipeline::run(query, &records)? {
            Output::Roots(indices) => {
                let mut results = Vec::with_capacity(indices.len());
                for index in indices {
                    let mut entity = entities
                        .get(index)
                        .cloned()
                        .ok_or_else(|| {
                            RuntimeError::Internal("root index out of range".to_string())
                        })?;
                    entity.after_load();
                    self.manage(&entity);
                    results.push(entity);
                }
                Ok(results)
            }
            Output::Rows(_) => Err(RuntimeError::Internal(
                "root selection produced scalar rows".to_string(),
            )),
        }
    }

    fn execute_rows(&self, query: &CriteriaQuery) -> Result<Vec<Vec<Value>>, RuntimeError> {
        if matches!(query.selection, Selection::Root) {
            return Err(RuntimeError::Internal(
                "scalar execution over a root selection".to_string(),
            ));
        }
        let records = self.db.records(query.entity);
        match pipeline::run(query, &records)? {
            Output::Rows(rows) => Ok(rows),
            Output::Roots(_) => Err(RuntimeError::Internal(
                "scalar selection produced root rows".to_string(),
            )),
        }
    }

    fn execute_update(&self, delete: &CriteriaDelete) -> Result<u64, RuntimeError> {
        self.writable()?;
        let mut failure: Option<RuntimeError> = None;
        let removed = self.db.delete_by(delete.entity, &mut |record| {
            match pipeline::delete_matches(delete.filter.as_ref(), record) {
                Ok(matched) => matched,
                Err(err) => {
                    failure.get_or_insert(err);
                    false
                }
            }
        });
        match failure {
            Some(err) => Err(err),
            None => Ok(removed),
        }
    }
}
