//! SQL-faithful evaluation pipeline: root scan → join expansion →
//! filter → grouping → selection → distinct → order → window.
//! Collection joins multiply rows; LEFT joins preserve unmatched rows
//! with nulls, which is exactly the behavior the two-phase rewrite
//! exists to tame.

use super::eval::{EvalCtx, Scope, WorkRow, truth_of, value_of};
use crate::criteria::{CriteriaExpr, CriteriaOrder, CriteriaQuery, FromId, JoinType, Selection};
use crate::error::RuntimeError;
use crate::expr::{NullHandling, SortDirection};
use crate::value::{Value, compare_values};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

///
/// Output
///

pub(crate) enum Output {
    /// Root-entity results, as indices into the scanned records (one
    /// per result row; duplicates possible without DISTINCT).
    Roots(Vec<usize>),
    Rows(Vec<Vec<Value>>),
}

pub(crate) fn run(query: &CriteriaQuery, records: &[Value]) -> Result<Output, RuntimeError> {
    let ctx = EvalCtx { records };

    let mut rows = expand_joins(&ctx, query)?;

    if let Some(filter) = &query.filter {
        let mut kept = Vec::with_capacity(rows.len());
        for row in rows {
            if truth_of(&ctx, Scope::Row(&row), filter)? {
                kept.push(row);
            }
        }
        rows = kept;
    }

    if !query.group_by.is_empty() {
        return grouped(&ctx, query, rows);
    }

    match &query.selection {
        Selection::Count { distinct } => {
            let count = if *distinct {
                let mut pks = BTreeSet::new();
                for row in &rows {
                    pks.insert(root_pk(&ctx, query, row));
                }
                pks.len()
            } else {
                rows.len()
            };
            Ok(Output::Rows(vec![vec![Value::Int(count as i64)]]))
        }
        Selection::Scalars(exprs) if exprs.iter().any(contains_aggregate) => {
            // global aggregation: one row over all matched rows
            let scope = Scope::Group(&rows);
            let mut row = Vec::with_capacity(exprs.len());
            for expr in exprs {
                row.push(value_of(&ctx, scope, expr)?);
            }
            Ok(Output::Rows(vec![row]))
        }
        Selection::Scalars(exprs) => {
            let mut items = Vec::with_capacity(rows.len());
            for row in &rows {
                let mut projected = Vec::with_capacity(exprs.len());
                for expr in exprs {
                    projected.push(value_of(&ctx, Scope::Row(row), expr)?);
                }
                let keys = sort_keys(&ctx, Scope::Row(row), &query.order_by)?;
                items.push((projected, keys));
            }
            if query.distinct {
                let mut seen = BTreeSet::new();
                items.retain(|(projected, _)| seen.insert(projected.clone()));
            }
            sort_items(&mut items, &query.order_by);
            Ok(Output::Rows(
                window(items, query)
                    .into_iter()
                    .map(|(projected, _)| projected)
                    .collect(),
            ))
        }
        Selection::Root => {
            let mut items = Vec::with_capacity(rows.len());
            for row in &rows {
                let keys = sort_keys(&ctx, Scope::Row(row), &query.order_by)?;
                items.push(((row.root, root_pk(&ctx, query, row)), keys));
            }
            if query.distinct {
                let mut seen = BTreeSet::new();
                items.retain(|((_, pk), _)| seen.insert(pk.clone()));
            }
            sort_items(&mut items, &query.order_by);
            Ok(Output::Roots(
                window(items, query)
                    .into_iter()
                    .map(|((root, _), _)| root)
                    .collect(),
            ))
        }
    }
}

/// Evaluate a delete filter against a bare record (delete criteria
/// carry no joins).
pub(crate) fn delete_matches(
    filter: Option<&CriteriaExpr>,
    record: &Value,
) -> Result<bool, RuntimeError> {
    let Some(filter) = filter else {
        return Ok(true);
    };
    let records = std::slice::from_ref(record);
    let ctx = EvalCtx { records };
    let row = WorkRow {
        root: 0,
        slots: Vec::new(),
    };
    truth_of(&ctx, Scope::Row(&row), filter)
}

// ----------------------------------------------------------------------
// Join expansion
// ----------------------------------------------------------------------

fn expand_joins(ctx: &EvalCtx<'_>, query: &CriteriaQuery) -> Result<Vec<WorkRow>, RuntimeError> {
    let slot_count = query.joins.len();
    let mut rows: Vec<WorkRow> = (0..ctx.records.len())
        .map(|root| WorkRow {
            root,
            slots: vec![Value::Null; slot_count],
        })
        .collect();

    for (index, join) in query.joins.iter().enumerate() {
        let mut expanded = Vec::with_capacity(rows.len());
        for row in rows {
            let parent = match join.parent {
                FromId::Root => ctx.records[row.root].clone(),
                FromId::Join(p) => row.slots[p].clone(),
            };
            let attribute = match &parent {
                Value::Record(_) => parent
                    .record_get(&join.attribute)
                    .cloned()
                    .unwrap_or(Value::Null),
                Value::Null => Value::Null,
                other => {
                    return Err(RuntimeError::Unsupported(format!(
                        "cannot join through non-record value {other}"
                    )));
                }
            };
            match attribute {
                Value::List(items) => {
                    if items.is_empty() {
                        if join.join_type == JoinType::Left {
                            expanded.push(row);
                        }
                    } else {
                        for item in items {
                            let mut branched = row.clone();
                            branched.slots[index] = item;
                            expanded.push(branched);
                        }
                    }
                }
                Value::Null => {
                    if join.join_type == JoinType::Left {
                        expanded.push(row);
                    }
                }
                bound => {
                    let mut row = row;
                    row.slots[index] = bound;
                    expanded.push(row);
                }
            }
        }
        rows = expanded;
    }

    Ok(rows)
}

// ----------------------------------------------------------------------
// Grouping
// ----------------------------------------------------------------------

fn grouped(
    ctx: &EvalCtx<'_>,
    query: &CriteriaQuery,
    rows: Vec<WorkRow>,
) -> Result<Output, RuntimeError> {
    let Selection::Scalars(exprs) = &query.selection else {
        return Err(RuntimeError::Unsupported(
            "grouped queries require a scalar selection".to_string(),
        ));
    };

    // BTreeMap keys give deterministic, key-ordered groups.
    let mut groups: BTreeMap<Vec<Value>, Vec<WorkRow>> = BTreeMap::new();
    for row in rows {
        let mut key = Vec::with_capacity(query.group_by.len());
        for expr in &query.group_by {
            key.push(value_of(ctx, Scope::Row(&row), expr)?);
        }
        groups.entry(key).or_default().push(row);
    }

    let mut items = Vec::with_capacity(groups.len());
    for rows in groups.into_values() {
        let scope = Scope::Group(&rows);
        if let Some(having) = &query.having
            && !truth_of(ctx, scope, having)?
        {
            continue;
        }
        let mut projected = Vec::with_capacity(exprs.len());
        for expr in exprs {
            projected.push(value_of(ctx, scope, expr)?);
        }
        let keys = sort_keys(ctx, scope, &query.order_by)?;
        items.push((projected, keys));
    }

    sort_items(&mut items, &query.order_by);
    Ok(Output::Rows(
        window(items, query)
            .into_iter()
            .map(|(projected, _)| projected)
            .collect(),
    ))
}

// ----------------------------------------------------------------------
// Ordering and the window
// ----------------------------------------------------------------------

fn sort_keys(
    ctx: &EvalCtx<'_>,
    scope: Scope<'_>,
    orders: &[CriteriaOrder],
) -> Result<Vec<Value>, RuntimeError> {
    let mut keys = Vec::with_capacity(orders.len());
    for order in orders {
        keys.push(value_of(ctx, scope, &order.expr)?);
    }
    Ok(keys)
}

fn sort_items<T>(items: &mut [(T, Vec<Value>)], orders: &[CriteriaOrder]) {
    if orders.is_empty() {
        return;
    }
    items.sort_by(|(_, a), (_, b)| order_cmp(orders, a, b));
}

fn order_cmp(orders: &[CriteriaOrder], lhs: &[Value], rhs: &[Value]) -> Ordering {
    for (order, (a, b)) in orders.iter().zip(lhs.iter().zip(rhs.iter())) {
        let nulls_first = match order.nulls {
            NullHandling::First => true,
            NullHandling::Last => false,
            NullHandling::Default => order.direction == SortDirection::Desc,
        };
        let ordering = match (a.is_null(), b.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => {
                if nulls_first {
                    Ordering::Less
                } else {
                    Ordering::Greater
                }
            }
            (false, true) => {
                if nulls_first {
                    Ordering::Greater
                } else {
                    Ordering::Less
                }
            }
            (false, false) => {
                let natural = compare_values(a, b).unwrap_or_else(|| a.cmp(b));
                match order.direction {
                    SortDirection::Asc => natural,
                    SortDirection::Desc => natural.reverse(),
                }
            }
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn window<T>(items: Vec<T>, query: &CriteriaQuery) -> Vec<T> {
    let skip = usize::try_from(query.first_result.unwrap_or(0)).unwrap_or(usize::MAX);
    let take = query
        .max_results
        .map_or(usize::MAX, |limit| usize::try_from(limit).unwrap_or(usize::MAX));
    items.into_iter().skip(skip).take(take).collect()
}

fn root_pk(ctx: &EvalCtx<'_>, query: &CriteriaQuery, row: &WorkRow) -> Value {
    ctx.records[row.root]
        .record_get(query.primary_key)
        .cloned()
        .unwrap_or(Value::Null)
}

fn contains_aggregate(expr: &CriteriaExpr) -> bool {
    match expr {
        CriteriaExpr::Aggregate { .. } => true,
        CriteriaExpr::Call { args, .. } | CriteriaExpr::And(args) | CriteriaExpr::Or(args) => {
            args.iter().any(contains_aggregate)
        }
        CriteriaExpr::Not(inner)
        | CriteriaExpr::IsNull(inner)
        | CriteriaExpr::IsNotNull(inner)
        | CriteriaExpr::IsEmpty(inner)
        | CriteriaExpr::IsNotEmpty(inner) => contains_aggregate(inner),
        CriteriaExpr::Compare { lhs, rhs, .. } => {
            contains_aggregate(lhs) || contains_aggregate(rhs)
        }
        CriteriaExpr::Between { target, low, high } => {
            contains_aggregate(target) || contains_aggregate(low) || contains_aggregate(high)
        }
        CriteriaExpr::In { target, values, .. } => {
            contains_aggregate(target) || values.iter().any(contains_aggregate)
        }
        CriteriaExpr::Like {
            target, pattern, ..
        } => contains_aggregate(target) || contains_aggregate(pattern),
        CriteriaExpr::MemberOf { element, target } => {
            contains_aggregate(element) || contains_aggregate(target)
        }
        _ => false,
    }
}
