//! Module: compile
//! Responsibility: lowering the expression IR onto the criteria model.
//! Owns path resolution and the per-execution join/fetch memoization
//! tables. Does not own: builder state or terminal execution.


use crate::criteria::{AggregateOp, CriteriaExpr, CriteriaOrder, FromId, JoinNode, JoinType};
use crate::error::HelixError;
use crate::expr::{Expr, ExprOp, Order, PathExpr, Predicate};
use std::collections::BTreeMap;

///
/// CriteriaContext
///
/// Per-execution compilation state. Created once per terminal
/// operation, lives only for compilation. The two memo tables map
/// dotted paths onto join-arena nodes; fetches and plain joins are
/// tracked separately so a fetch can be upgraded to also serve as a
/// join (which keeps DISTINCT + ORDER BY sound when a collection fetch
/// and an order clause reference the same relation).
///

pub struct CriteriaContext {
    joins: Vec<JoinNode>,
    join_index: BTreeMap<String, usize>,
    fetch_index: BTreeMap<String, usize>,
    /// Disabled for DELETE criteria: paths stay root-relative and no
    /// joins are materialized.
    auto_join: bool,
}

impl CriteriaContext {
    #[must_use]
    pub fn new() -> Self {
        Self {
            joins: Vec::new(),
            join_index: BTreeMap::new(),
            fetch_index: BTreeMap::new(),
            auto_join: true,
        }
    }

    /// Context for DELETE statements; the criteria form carries no
    /// joins, so paths resolve root-relative.
    #[must_use]
    pub fn for_delete() -> Self {
        Self {
            auto_join: false,
            ..Self::new()
        }
    }

    #[must_use]
    pub fn into_joins(self) -> Vec<JoinNode> {
        self.joins
    }

    #[must_use]
    pub fn join_count(&self) -> usize {
        self.joins.len()
    }

    // ------------------------------------------------------------------
    // Join materialization
    // ------------------------------------------------------------------

    /// Walk `path` segment-by-segment from the root, reusing or
    /// creating one join per prefix. A prefix already materialized as
    /// a fetch is registered as a join instead of creating a second
    /// node.
    pub fn get_or_create_join(&mut self, path: &str, join_type: JoinType) -> usize {
        let mut parent = FromId::Root;
        let mut prefix = String::new();
        let mut node = 0;

        for segment in path.split('.') {
            if !prefix.is_empty() {
                prefix.push('.');
            }
            prefix.push_str(segment);

            node = if let Some(&existing) = self.join_index.get(&prefix) {
                existing
            } else if let Some(&fetched) = self.fetch_index.get(&prefix) {
                self.join_index.insert(prefix.clone(), fetched);
                fetched
            } else {
                self.push_node(parent, segment, join_type, false, &prefix)
            };
            parent = FromId::Join(node);
        }

        node
    }

    /// Fetch materialization; proceeds identically against the fetch
    /// table.
    pub fn get_or_create_fetch(&mut self, path: &str, join_type: JoinType) -> usize {
        let mut parent = FromId::Root;
        let mut prefix = String::new();
        let mut node = 0;

        for segment in path.split('.') {
            if !prefix.is_empty() {
                prefix.push('.');
            }
            prefix.push_str(segment);

            node = if let Some(&existing) = self.fetch_index.get(&prefix) {
                existing
            } else {
                let index = self.joins.len();
                self.joins.push(JoinNode {
                    parent,
                    attribute: segment.to_string(),
                    join_type,
                    fetch: true,
                });
                self.fetch_index.insert(prefix.clone(), index);
                index
            };
            parent = FromId::Join(node);
        }

        node
    }

    fn push_node(
        &mut self,
        parent: FromId,
        attribute: &str,
        join_type: JoinType,
        fetch: bool,
        prefix: &str,
    ) -> usize {
        let index = self.joins.len();
        self.joins.push(JoinNode {
            parent,
            attribute: attribute.to_string(),
            join_type,
            fetch,
        });
        self.join_index.insert(prefix.to_string(), index);
        index
    }

    // ------------------------------------------------------------------
    // Path resolution
    // ------------------------------------------------------------------

    /// Resolve a path reference, materializing the auto-join for its
    /// relation prefix when necessary, then pivoting onto the longest
    /// registered join prefix.
    pub fn resolve_path(&mut self, path: &PathExpr) -> CriteriaExpr {
        if path.is_root() {
            return CriteriaExpr::Path {
                from: FromId::Root,
                segments: Vec::new(),
            };
        }

        if self.auto_join
            && let Some(relation) = &path.relation_path
            && !self.join_index.contains_key(relation)
        {
            if let Some(&fetched) = self.fetch_index.get(relation) {
                self.join_index.insert(relation.clone(), fetched);
            } else {
                self.get_or_create_join(relation, JoinType::Left);
            }
        }

        let segments: Vec<&str> = path.path.split('.').collect();
        if self.auto_join {
            for end in (1..=segments.len()).rev() {
                let prefix = segments[..end].join(".");
                if let Some(&join) = self.join_index.get(&prefix) {
                    return CriteriaExpr::Path {
                        from: FromId::Join(join),
                        segments: segments[end..].iter().map(ToString::to_string).collect(),
                    };
                }
            }
        }

        CriteriaExpr::Path {
            from: FromId::Root,
            segments: segments.iter().map(ToString::to_string).collect(),
        }
    }

    // ------------------------------------------------------------------
    // Lowering (structural recursion over the IR)
    // ------------------------------------------------------------------

    pub fn lower_predicate(&mut self, predicate: &Predicate) -> Result<CriteriaExpr, HelixError> {
        let lowered = match predicate {
            Predicate::True => CriteriaExpr::True,
            Predicate::False => CriteriaExpr::False,
            Predicate::And(children) => CriteriaExpr::And(self.lower_predicates(children)?),
            Predicate::Or(children) => CriteriaExpr::Or(self.lower_predicates(children)?),
            Predicate::Not(inner) => CriteriaExpr::Not(Box::new(self.lower_predicate(inner)?)),
            Predicate::Compare { op, lhs, rhs } => CriteriaExpr::Compare {
                op: *op,
                lhs: Box::new(self.lower_expr(lhs)?),
                rhs: Box::new(self.lower_expr(rhs)?),
            },
            Predicate::Between { target, low, high } => CriteriaExpr::Between {
                target: Box::new(self.lower_expr(target)?),
                low: Box::new(self.lower_expr(low)?),
                high: Box::new(self.lower_expr(high)?),
            },
            Predicate::IsNull(expr) => CriteriaExpr::IsNull(Box::new(self.lower_expr(expr)?)),
            Predicate::IsNotNull(expr) => {
                CriteriaExpr::IsNotNull(Box::new(self.lower_expr(expr)?))
            }
            Predicate::In {
                target,
                values,
                negated,
            } => {
                // element-wise value additions on the driver's IN clause
                let mut lowered_values = Vec::with_capacity(values.len());
                for value in values {
                    lowered_values.push(self.lower_expr(value)?);
                }
                CriteriaExpr::In {
                    target: Box::new(self.lower_expr(target)?),
                    values: lowered_values,
                    negated: *negated,
                }
            }
            Predicate::Like {
                target,
                pattern,
                escape,
            } => CriteriaExpr::Like {
                target: Box::new(self.lower_expr(target)?),
                pattern: Box::new(self.lower_expr(pattern)?),
                escape: *escape,
            },
            Predicate::IsEmpty(path) => CriteriaExpr::IsEmpty(Box::new(self.resolve_path(path))),
            Predicate::IsNotEmpty(path) => {
                CriteriaExpr::IsNotEmpty(Box::new(self.resolve_path(path)))
            }
            Predicate::MemberOf { element, target } => CriteriaExpr::MemberOf {
                element: Box::new(self.lower_expr(element)?),
                target: Box::new(self.resolve_path(target)),
            },
        };
        Ok(lowered)
    }

    fn lower_predicates(
        &mut self,
        predicates: &[Predicate],
    ) -> Result<Vec<CriteriaExpr>, HelixError> {
        let mut lowered = Vec::with_capacity(predicates.len());
        for predicate in predicates {
            lowered.push(self.lower_predicate(predicate)?);
        }
        Ok(lowered)
    }

    pub fn lower_expr(&mut self, expr: &Expr) -> Result<CriteriaExpr, HelixError> {
        let lowered = match expr {
            Expr::Path(path) => self.resolve_path(path),
            Expr::Constant { value, tag } => {
                if value.is_null() {
                    CriteriaExpr::NullLiteral(*tag)
                } else {
                    CriteriaExpr::Literal(value.clone())
                }
            }
            Expr::Operation { op, args, tag } => {
                check_arity(*op, args.len())?;
                if let Some((aggregate, distinct)) = aggregate_of(*op) {
                    let arg = match args.first() {
                        Some(arg) => Some(Box::new(self.lower_expr(arg)?)),
                        None => None,
                    };
                    CriteriaExpr::Aggregate {
                        op: aggregate,
                        arg,
                        distinct,
                    }
                } else {
                    let mut lowered_args = Vec::with_capacity(args.len());
                    for arg in args {
                        lowered_args.push(self.lower_expr(arg)?);
                    }
                    CriteriaExpr::Call {
                        op: *op,
                        args: lowered_args,
                        tag: *tag,
                    }
                }
            }
        };
        Ok(lowered)
    }

    pub fn lower_order(&mut self, order: &Order) -> Result<CriteriaOrder, HelixError> {
        Ok(CriteriaOrder {
            expr: self.lower_expr(&order.expr)?,
            direction: order.direction,
            nulls: order.nulls,
        })
    }
}

impl Default for CriteriaContext {
    fn default() -> Self {
        Self::new()
    }
}

const fn aggregate_of(op: ExprOp) -> Option<(AggregateOp, bool)> {
    match op {
        ExprOp::Count => Some((AggregateOp::Count, false)),
        ExprOp::CountDistinct => Some((AggregateOp::Count, true)),
        ExprOp::Sum => Some((AggregateOp::Sum, false)),
        ExprOp::Avg => Some((AggregateOp::Avg, false)),
        ExprOp::Min => Some((AggregateOp::Min, false)),
        ExprOp::Max => Some((AggregateOp::Max, false)),
        _ => None,
    }
}

fn check_arity(op: ExprOp, actual: usize) -> Result<(), HelixError> {
    let expected: std::ops::RangeInclusive<usize> = match op {
        ExprOp::CurrentDate | ExprOp::CurrentTime | ExprOp::CurrentTimestamp => 0..=0,
        // COUNT(*) is the zero-argument form
        ExprOp::Count => 0..=1,
        ExprOp::Upper
        | ExprOp::Lower
        | ExprOp::Trim
        | ExprOp::Length
        | ExprOp::Abs
        | ExprOp::Negate
        | ExprOp::Sqrt
        | ExprOp::Size
        | ExprOp::Cast
        | ExprOp::CountDistinct
        | ExprOp::Sum
        | ExprOp::Avg
        | ExprOp::Min
        | ExprOp::Max => 1..=1,
        ExprOp::Add
        | ExprOp::Subtract
        | ExprOp::Multiply
        | ExprOp::Divide
        | ExprOp::Mod
        | ExprOp::Nullif => 2..=2,
        ExprOp::Locate => 2..=3,
        ExprOp::Substring => 2..=3,
        ExprOp::Concat | ExprOp::Coalesce => 2..=usize::MAX,
    };
    if expected.contains(&actual) {
        Ok(())
    } else {
        Err(HelixError::Translation(format!(
            "operator {op:?} does not accept {actual} argument(s)"
        )))
    }
}
