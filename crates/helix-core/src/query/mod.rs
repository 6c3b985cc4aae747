//! Module: query
//! Responsibility: the fluent, session-bound query builder. Purely
//! declarative: clauses accumulate state; compilation and execution
//! live in `executor`.

mod page;

pub use page::{Page, PageRequest, SortKey};

use crate::criteria::JoinType;
use crate::entity::Entity;
use crate::expr::{Expr, Order, PathExpr, Predicate, SortDirection};
use crate::fields::{
    CollectionField, DateTimeField, HelixField, JoinSource, OrderedField, StringField,
};
use crate::filter::PredicateBuilder;
use crate::session::{QueryFactory, Session};
use crate::value::FieldValue;
use std::marker::PhantomData;

///
/// JoinSpec
///
/// One requested join: dotted attribute path, join type, fetch flag,
/// and whether the source attribute is a collection (drives two-phase
/// pagination detection).
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct JoinSpec {
    pub path: &'static str,
    pub join_type: JoinType,
    pub fetch: bool,
    pub collection: bool,
}

///
/// QueryState
///
/// Accumulated builder state. The root path is implied by `E`; joins,
/// orders, and predicates accumulate additively.
///

#[derive(Clone, Debug)]
pub(crate) struct QueryState<E: Entity> {
    pub predicate: Option<Predicate>,
    pub orders: Vec<Order>,
    pub joins: Vec<JoinSpec>,
    pub group_by: Vec<Expr>,
    pub having: Option<Predicate>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
    pub distinct: bool,
    _marker: PhantomData<fn() -> E>,
}

impl<E: Entity> QueryState<E> {
    pub(crate) const fn new() -> Self {
        Self {
            predicate: None,
            orders: Vec::new(),
            joins: Vec::new(),
            group_by: Vec::new(),
            having: None,
            offset: None,
            limit: None,
            distinct: false,
            _marker: PhantomData,
        }
    }

    pub(crate) fn has_collection_fetch(&self) -> bool {
        self.joins.iter().any(|join| join.fetch && join.collection)
    }

    pub(crate) fn is_paginated(&self) -> bool {
        self.offset.is_some() || self.limit.is_some()
    }
}

///
/// Query
///
/// Fluent query builder over entity `E`, bound to the factory that
/// opened it. Every clause method returns the builder; `None`-valued
/// filter arguments are silently no-ops (the optional-parameter
/// idiom). Terminal operations live in the `executor` module.
///
/// A builder is a short-lived, single-owner value; executing it does
/// not consume it beyond the terminal call, but it is not meant for
/// concurrent reuse.
///

pub struct Query<'a, S: Session, E: Entity> {
    pub(crate) factory: &'a QueryFactory<S>,
    pub(crate) state: QueryState<E>,
}

impl<'a, S: Session, E: Entity> Query<'a, S, E> {
    #[must_use]
    pub(crate) const fn new(factory: &'a QueryFactory<S>) -> Self {
        Self {
            factory,
            state: QueryState::new(),
        }
    }

    // ------------------------------------------------------------------
    // Where clauses
    // ------------------------------------------------------------------

    /// Conjoin a predicate; `None` is a no-op.
    #[must_use]
    pub fn filter(mut self, predicate: impl Into<Option<Predicate>>) -> Self {
        if let Some(predicate) = predicate.into() {
            self.state.predicate = Some(match self.state.predicate.take() {
                Some(existing) => existing.and(predicate),
                None => predicate,
            });
        }
        self
    }

    /// Explicit AND combinator; alias of [`Self::filter`].
    #[must_use]
    pub fn and(self, predicate: impl Into<Option<Predicate>>) -> Self {
        self.filter(predicate)
    }

    /// Disjoin a predicate; `None` is a no-op.
    #[must_use]
    pub fn or(mut self, predicate: impl Into<Option<Predicate>>) -> Self {
        if let Some(predicate) = predicate.into() {
            self.state.predicate = Some(match self.state.predicate.take() {
                Some(existing) => existing.or(predicate),
                None => predicate,
            });
        }
        self
    }

    #[must_use]
    pub fn where_equal<F, V>(self, field: F, value: impl Into<Option<V>>) -> Self
    where
        F: HelixField<E>,
        V: Into<F::Value>,
    {
        self.filter(field.eq_opt(value.into()))
    }

    #[must_use]
    pub fn or_equal<F, V>(self, field: F, value: impl Into<Option<V>>) -> Self
    where
        F: HelixField<E>,
        V: Into<F::Value>,
    {
        self.or(field.eq_opt(value.into()))
    }

    #[must_use]
    pub fn where_greater_than<F, V>(self, field: F, value: impl Into<Option<V>>) -> Self
    where
        F: OrderedField<E>,
        V: Into<F::Value>,
    {
        self.filter(field.gt_opt(value.into()))
    }

    #[must_use]
    pub fn or_greater_than<F, V>(self, field: F, value: impl Into<Option<V>>) -> Self
    where
        F: OrderedField<E>,
        V: Into<F::Value>,
    {
        self.or(field.gt_opt(value.into()))
    }

    #[must_use]
    pub fn where_greater_than_or_equal<F, V>(self, field: F, value: impl Into<Option<V>>) -> Self
    where
        F: OrderedField<E>,
        V: Into<F::Value>,
    {
        self.filter(field.ge_opt(value.into()))
    }

    #[must_use]
    pub fn where_less_than<F, V>(self, field: F, value: impl Into<Option<V>>) -> Self
    where
        F: OrderedField<E>,
        V: Into<F::Value>,
    {
        self.filter(field.lt_opt(value.into()))
    }

    #[must_use]
    pub fn or_less_than<F, V>(self, field: F, value: impl Into<Option<V>>) -> Self
    where
        F: OrderedField<E>,
        V: Into<F::Value>,
    {
        self.or(field.lt_opt(value.into()))
    }

    #[must_use]
    pub fn where_less_than_or_equal<F, V>(self, field: F, value: impl Into<Option<V>>) -> Self
    where
        F: OrderedField<E>,
        V: Into<F::Value>,
    {
        self.filter(field.le_opt(value.into()))
    }

    /// Membership; an empty collection is a no-op (callers that need
    /// "no match" use [`Predicate::always_false`] explicitly).
    #[must_use]
    pub fn where_in<F, I, V>(self, field: F, values: I) -> Self
    where
        F: HelixField<E>,
        I: IntoIterator<Item = V>,
        V: Into<F::Value>,
    {
        self.filter(field.in_list(values))
    }

    #[must_use]
    pub fn or_in<F, I, V>(self, field: F, values: I) -> Self
    where
        F: HelixField<E>,
        I: IntoIterator<Item = V>,
        V: Into<F::Value>,
    {
        self.or(field.in_list(values))
    }

    #[must_use]
    pub fn where_like<V>(self, field: StringField<E>, pattern: impl Into<Option<V>>) -> Self
    where
        V: Into<String>,
    {
        self.filter(field.like_opt(pattern.into()))
    }

    #[must_use]
    pub fn or_like<V>(self, field: StringField<E>, pattern: impl Into<Option<V>>) -> Self
    where
        V: Into<String>,
    {
        self.or(field.like_opt(pattern.into()))
    }

    /// Wildcard-safe substring match.
    #[must_use]
    pub fn where_contains<V>(self, field: StringField<E>, value: impl Into<Option<V>>) -> Self
    where
        V: AsRef<str>,
    {
        self.filter(field.contains_opt(value.into()))
    }

    #[must_use]
    pub fn or_contains<V>(self, field: StringField<E>, value: impl Into<Option<V>>) -> Self
    where
        V: AsRef<str>,
    {
        self.or(field.contains_opt(value.into()))
    }

    #[must_use]
    pub fn where_is_null<F: HelixField<E>>(self, field: F) -> Self {
        self.filter(field.is_null())
    }

    #[must_use]
    pub fn or_is_null<F: HelixField<E>>(self, field: F) -> Self {
        self.or(field.is_null())
    }

    #[must_use]
    pub fn where_is_not_null<F: HelixField<E>>(self, field: F) -> Self {
        self.filter(field.is_not_null())
    }

    #[must_use]
    pub fn or_is_not_null<F: HelixField<E>>(self, field: F) -> Self {
        self.or(field.is_not_null())
    }

    #[must_use]
    pub fn where_is_empty<V>(self, field: CollectionField<E, V>) -> Self {
        self.filter(field.is_empty())
    }

    #[must_use]
    pub fn where_is_not_empty<V>(self, field: CollectionField<E, V>) -> Self {
        self.filter(field.is_not_empty())
    }

    #[must_use]
    pub fn where_before_now<V: FieldValue>(self, field: DateTimeField<E, V>) -> Self {
        self.filter(field.before_now())
    }

    #[must_use]
    pub fn where_after_now<V: FieldValue>(self, field: DateTimeField<E, V>) -> Self {
        self.filter(field.after_now())
    }

    /// Fold with AND, ignoring `None` entries.
    #[must_use]
    pub fn where_all_of<I>(self, predicates: I) -> Self
    where
        I: IntoIterator<Item = Option<Predicate>>,
    {
        self.filter(Predicate::all_of(predicates))
    }

    /// Fold with OR, ignoring `None` entries.
    #[must_use]
    pub fn where_any_of<I>(self, predicates: I) -> Self
    where
        I: IntoIterator<Item = Option<Predicate>>,
    {
        self.filter(Predicate::any_of(predicates))
    }

    /// Build a nested sub-predicate and conjoin it; empty groups are
    /// discarded.
    #[must_use]
    pub fn where_group(self, group: impl FnOnce(&mut PredicateBuilder)) -> Self {
        let mut builder = PredicateBuilder::new();
        group(&mut builder);
        self.filter(builder.build())
    }

    /// Build a nested sub-predicate and disjoin it.
    #[must_use]
    pub fn or_group(self, group: impl FnOnce(&mut PredicateBuilder)) -> Self {
        let mut builder = PredicateBuilder::new();
        group(&mut builder);
        self.or(builder.build())
    }

    // ------------------------------------------------------------------
    // Order clauses
    // ------------------------------------------------------------------

    #[must_use]
    pub fn order_by<I>(mut self, orders: I) -> Self
    where
        I: IntoIterator<Item = Order>,
    {
        self.state.orders.extend(orders);
        self
    }

    #[must_use]
    pub fn order_by_asc<F: HelixField<E>>(mut self, field: F) -> Self {
        self.state.orders.push(field.asc());
        self
    }

    #[must_use]
    pub fn order_by_desc<F: HelixField<E>>(mut self, field: F) -> Self {
        self.state.orders.push(field.desc());
        self
    }

    // ------------------------------------------------------------------
    // Pagination
    // ------------------------------------------------------------------

    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.state.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: u64) -> Self {
        self.state.offset = Some(offset);
        self
    }

    /// Apply an external page request: offset/limit plus its sort
    /// keys, resolved property-by-property through `resolver`.
    /// Unresolvable properties are skipped.
    #[must_use]
    pub fn pageable<R>(mut self, request: &PageRequest, resolver: R) -> Self
    where
        R: Fn(&str) -> Option<PathExpr>,
    {
        for key in &request.sort {
            if let Some(path) = resolver(&key.property) {
                let order = if key.descending {
                    Order::desc(path)
                } else {
                    Order::asc(path)
                };
                self.state.orders.push(order);
            }
        }
        self.apply_window(request)
    }

    /// Apply an external page request with one explicit sort field.
    #[must_use]
    pub fn pageable_order_by<F: HelixField<E>>(self, request: &PageRequest, field: F) -> Self {
        self.pageable_sorted(request, field, SortDirection::Asc)
    }

    #[must_use]
    pub fn pageable_order_by_desc<F: HelixField<E>>(
        self,
        request: &PageRequest,
        field: F,
    ) -> Self {
        self.pageable_sorted(request, field, SortDirection::Desc)
    }

    fn pageable_sorted<F: HelixField<E>>(
        mut self,
        request: &PageRequest,
        field: F,
        direction: SortDirection,
    ) -> Self {
        let order = match direction {
            SortDirection::Asc => field.asc(),
            SortDirection::Desc => field.desc(),
        };
        self.state.orders.push(order);
        self.apply_window(request)
    }

    fn apply_window(mut self, request: &PageRequest) -> Self {
        self.state.offset = Some(request.offset());
        self.state.limit = Some(request.size);
        self
    }

    // ------------------------------------------------------------------
    // Joins
    // ------------------------------------------------------------------

    #[must_use]
    pub fn join(self, relation: impl JoinSource<E>) -> Self {
        self.push_join(relation, JoinType::Inner, false)
    }

    #[must_use]
    pub fn left_join(self, relation: impl JoinSource<E>) -> Self {
        self.push_join(relation, JoinType::Left, false)
    }

    #[must_use]
    pub fn fetch_join(self, relation: impl JoinSource<E>) -> Self {
        self.push_join(relation, JoinType::Inner, true)
    }

    #[must_use]
    pub fn left_fetch_join(self, relation: impl JoinSource<E>) -> Self {
        self.push_join(relation, JoinType::Left, true)
    }

    /// Left fetch join that also sets the distinct flag, collapsing
    /// the row multiplication a collection fetch produces.
    #[must_use]
    pub fn left_fetch_join_distinct(self, relation: impl JoinSource<E>) -> Self {
        self.push_join(relation, JoinType::Left, true).distinct()
    }

    fn push_join(mut self, relation: impl JoinSource<E>, join_type: JoinType, fetch: bool) -> Self {
        self.state.joins.push(JoinSpec {
            path: relation.join_path(),
            join_type,
            fetch,
            collection: relation.is_collection(),
        });
        self
    }

    // ------------------------------------------------------------------
    // Grouping
    // ------------------------------------------------------------------

    #[must_use]
    pub fn group_by<I>(mut self, exprs: I) -> Self
    where
        I: IntoIterator<Item = Expr>,
    {
        self.state.group_by.extend(exprs);
        self
    }

    #[must_use]
    pub fn having(mut self, predicate: Predicate) -> Self {
        self.state.having = Some(match self.state.having.take() {
            Some(existing) => existing.and(predicate),
            None => predicate,
        });
        self
    }

    // ------------------------------------------------------------------
    // Modifiers
    // ------------------------------------------------------------------

    #[must_use]
    pub fn distinct(mut self) -> Self {
        self.state.distinct = true;
        self
    }

    /// Apply `configure` only when `condition` holds.
    #[must_use]
    pub fn when(self, condition: bool, configure: impl FnOnce(Self) -> Self) -> Self {
        if condition { configure(self) } else { self }
    }
}
