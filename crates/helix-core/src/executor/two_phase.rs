//! Two-phase pagination.
//!
//! Fetching collections together with LIMIT/OFFSET multiplies rows,
//! so the window would apply to the cartesian product (and drivers
//! that page such results in memory may exhaust it). When a collection
//! fetch meets pagination, the engine splits execution:
//!
//! - phase 1: fetches lowered as plain joins, selection is the entity
//!   identifier plus the order columns, DISTINCT, window applied;
//! - phase 2: fetches re-applied, `WHERE id IN (phase-1 ids)`,
//!   DISTINCT to collapse cartesian duplicates, then an in-memory
//!   reorder back to phase-1 id order (IN preserves nothing).

use super::{FetchMode, SelectionSpec, id_path, lower_state};
use crate::entity::Entity;
use crate::error::{HelixError, RuntimeError};
use crate::expr::{Expr, Predicate};
use crate::query::QueryState;
use crate::session::{QueryFactory, Session};
use crate::value::{FieldValue, Value};
use std::collections::{BTreeMap, BTreeSet};

pub(crate) fn required<E: Entity>(state: &QueryState<E>) -> bool {
    state.has_collection_fetch() && state.is_paginated()
}

pub(crate) fn list<S: Session, E: Entity>(
    factory: &QueryFactory<S>,
    state: QueryState<E>,
) -> Result<Vec<E>, HelixError> {
    // Phase 1: bounded id query.
    let id_query = lower_state(&state, FetchMode::Downgrade, SelectionSpec::IdWithOrder)?;
    let rows = factory.session().execute_rows(&id_query)?;

    // Retain identifiers in result order; the order columns are
    // projection ballast and may differ per id, so dedup by id.
    let mut seen = BTreeSet::new();
    let mut ids = Vec::new();
    for row in rows {
        let id = row.into_iter().next().ok_or_else(|| {
            HelixError::from(RuntimeError::Internal(
                "phase-1 id query returned an empty row".to_string(),
            ))
        })?;
        if seen.insert(id.clone()) {
            ids.push(id);
        }
    }
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    // Phase 2: re-fetch full rows for the id window.
    let mut fetch_state = state;
    fetch_state.offset = None;
    fetch_state.limit = None;
    fetch_state.distinct = true;
    fetch_state.predicate = Some(id_window_predicate::<E>(&ids));

    let fetch_query = lower_state(&fetch_state, FetchMode::Materialize, SelectionSpec::Root)?;
    let mut entities: Vec<E> = factory.session().execute_entities(&fetch_query)?;

    // IN does not preserve input order; restore the phase-1 order.
    let position: BTreeMap<Value, usize> = ids
        .into_iter()
        .enumerate()
        .map(|(index, id)| (id, index))
        .collect();
    entities.sort_by_key(|entity| {
        position
            .get(&entity.id_value())
            .copied()
            .unwrap_or(usize::MAX)
    });

    Ok(entities)
}

fn id_window_predicate<E: Entity>(ids: &[Value]) -> Predicate {
    Predicate::In {
        target: Expr::Path(id_path::<E>()),
        values: ids
            .iter()
            .map(|id| Expr::Constant {
                value: id.clone(),
                tag: <E::Id as FieldValue>::TAG,
            })
            .collect(),
        negated: false,
    }
}
