//! Module: executor
//! Responsibility: terminal operations. Lowers builder state onto the
//! criteria model, then executes through the session.
//! Owns the two-phase pagination rewrite and the deletion families.

mod delete;
mod load;
mod project;
mod two_phase;

use crate::compile::CriteriaContext;
use crate::criteria::{CriteriaQuery, Selection};
use crate::entity::Entity;
use crate::error::HelixError;
use crate::expr::{Expr, PathExpr};
use crate::query::{Query, QueryState};
use crate::session::Session;
use crate::value::FieldValue;

///
/// FetchMode
///
/// How fetch-join requests are materialized. Aggregate and scalar
/// selections downgrade fetches to plain joins (fetching is invalid
/// when the select list is not the root).
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum FetchMode {
    Materialize,
    Downgrade,
}

///
/// SelectionSpec
///
/// Requested selection shape, resolved against the criteria context
/// during lowering.
///

pub(crate) enum SelectionSpec<'a> {
    /// The root entity.
    Root,
    /// `COUNT(root)`, promoted to `COUNT(DISTINCT root)` when the
    /// distinct flag is set or any collection fetch is registered.
    Count,
    /// Scalar selections (projections, tuples, grouped counts).
    Scalars(&'a [Expr]),
    /// Phase-1 of two-phase pagination: the entity identifier plus the
    /// order columns (some drivers reject `SELECT DISTINCT … ORDER BY`
    /// when the order column is missing from the select list).
    IdWithOrder,
}

/// Identifier path of the root entity.
pub(crate) fn id_path<E: Entity>() -> PathExpr {
    PathExpr::new(E::ENTITY_NAME, E::PRIMARY_KEY, <E::Id as FieldValue>::TAG)
}

/// Shared lowering: joins, filter, grouping, having, ordering,
/// selection, distinct, and the offset/limit window, in that order.
pub(crate) fn lower_state<E: Entity>(
    state: &QueryState<E>,
    mode: FetchMode,
    selection: SelectionSpec<'_>,
) -> Result<CriteriaQuery, HelixError> {
    let collection_fetches = state
        .joins
        .iter()
        .filter(|join| join.fetch && join.collection)
        .count();
    if mode == FetchMode::Materialize && collection_fetches >= 2 {
        tracing::warn!(
            entity = E::ENTITY_NAME,
            fetches = collection_fetches,
            "query registers multiple collection fetch joins; result rows multiply"
        );
    }

    let mut ctx = CriteriaContext::new();

    for join in &state.joins {
        if join.fetch && mode == FetchMode::Materialize {
            ctx.get_or_create_fetch(join.path, join.join_type);
        } else {
            ctx.get_or_create_join(join.path, join.join_type);
        }
    }

    let filter = match &state.predicate {
        Some(predicate) => Some(ctx.lower_predicate(predicate)?),
        None => None,
    };

    let mut group_by = Vec::with_capacity(state.group_by.len());
    for expr in &state.group_by {
        group_by.push(ctx.lower_expr(expr)?);
    }

    let having = match &state.having {
        Some(predicate) => Some(ctx.lower_predicate(predicate)?),
        None => None,
    };

    let count_terminal = matches!(selection, SelectionSpec::Count);

    let mut order_by = Vec::new();
    if !count_terminal {
        order_by.reserve(state.orders.len());
        for order in &state.orders {
            order_by.push(ctx.lower_order(order)?);
        }
    }

    let (selection, distinct) = match selection {
        SelectionSpec::Root => (Selection::Root, state.distinct),
        SelectionSpec::Count => (
            Selection::Count {
                distinct: state.distinct || state.has_collection_fetch(),
            },
            false,
        ),
        SelectionSpec::Scalars(exprs) => {
            let mut scalars = Vec::with_capacity(exprs.len());
            for expr in exprs {
                scalars.push(ctx.lower_expr(expr)?);
            }
            (Selection::Scalars(scalars), state.distinct)
        }
        SelectionSpec::IdWithOrder => {
            let mut scalars = vec![ctx.resolve_path(&id_path::<E>())];
            scalars.extend(order_by.iter().map(|order| order.expr.clone()));
            (Selection::Scalars(scalars), true)
        }
    };

    let (first_result, max_results) = if count_terminal {
        (None, None)
    } else {
        (state.offset, state.limit)
    };

    Ok(CriteriaQuery {
        entity: E::ENTITY_NAME,
        primary_key: E::PRIMARY_KEY,
        joins: ctx.into_joins(),
        selection,
        distinct,
        filter,
        group_by,
        having,
        order_by,
        first_result,
        max_results,
    })
}

impl<S: Session, E: Entity> Query<'_, S, E> {
    /// Compile this query to its driver-facing criteria form without
    /// executing it. Diagnostic surface; `Display` on the result
    /// renders a compact sketch.
    pub fn compile(&self) -> Result<CriteriaQuery, HelixError> {
        lower_state(&self.state, FetchMode::Materialize, SelectionSpec::Root)
    }
}
