//! Module: criteria
//! Responsibility: the driver-facing relational criteria model, the
//! narrow form every backend consumes. Does not own: IR lowering
//! (`compile`) or evaluation (`mem`, or an external driver).

mod display;

use crate::expr::{CompareOp, ExprOp, NullHandling, SortDirection};
use crate::value::{TypeTag, Value};

///
/// JoinType
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JoinType {
    Inner,
    Left,
}

///
/// FromId
///
/// Source of a path: the query root or a join node (arena index into
/// `CriteriaQuery::joins`; parents always precede children).
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FromId {
    Root,
    Join(usize),
}

///
/// JoinNode
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct JoinNode {
    pub parent: FromId,
    pub attribute: String,
    pub join_type: JoinType,
    /// Materialize associated rows into the result graph.
    pub fetch: bool,
}

///
/// AggregateOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AggregateOp {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

///
/// CriteriaExpr
///
/// Structural mirror of the IR operator set with all paths resolved
/// against the join arena and collection constants unfolded
/// element-wise.
///

#[derive(Clone, Debug, PartialEq)]
pub enum CriteriaExpr {
    Path {
        from: FromId,
        segments: Vec<String>,
    },
    Literal(Value),
    NullLiteral(TypeTag),
    True,
    False,
    And(Vec<Self>),
    Or(Vec<Self>),
    Not(Box<Self>),
    Compare {
        op: CompareOp,
        lhs: Box<Self>,
        rhs: Box<Self>,
    },
    Between {
        target: Box<Self>,
        low: Box<Self>,
        high: Box<Self>,
    },
    IsNull(Box<Self>),
    IsNotNull(Box<Self>),
    In {
        target: Box<Self>,
        values: Vec<Self>,
        negated: bool,
    },
    Like {
        target: Box<Self>,
        pattern: Box<Self>,
        escape: Option<char>,
    },
    IsEmpty(Box<Self>),
    IsNotEmpty(Box<Self>),
    MemberOf {
        element: Box<Self>,
        target: Box<Self>,
    },
    Call {
        op: ExprOp,
        args: Vec<Self>,
        tag: TypeTag,
    },
    Aggregate {
        op: AggregateOp,
        arg: Option<Box<Self>>,
        distinct: bool,
    },
}

///
/// CriteriaOrder
///

#[derive(Clone, Debug, PartialEq)]
pub struct CriteriaOrder {
    pub expr: CriteriaExpr,
    pub direction: SortDirection,
    pub nulls: NullHandling,
}

///
/// Selection
///

#[derive(Clone, Debug, PartialEq)]
pub enum Selection {
    /// The root entity.
    Root,
    /// `COUNT(root)` / `COUNT(DISTINCT root)`.
    Count { distinct: bool },
    /// Scalar selections (single, tuple, and constructor shapes).
    Scalars(Vec<CriteriaExpr>),
}

///
/// CriteriaQuery
///
/// One compiled query, ready for the driver. Offset/limit map onto the
/// driver's first-result/max-results controls.
///

#[derive(Clone, Debug, PartialEq)]
pub struct CriteriaQuery {
    pub entity: &'static str,
    pub primary_key: &'static str,
    pub joins: Vec<JoinNode>,
    pub selection: Selection,
    pub distinct: bool,
    pub filter: Option<CriteriaExpr>,
    pub group_by: Vec<CriteriaExpr>,
    pub having: Option<CriteriaExpr>,
    pub order_by: Vec<CriteriaOrder>,
    pub first_result: Option<u64>,
    pub max_results: Option<u64>,
}

impl CriteriaQuery {
    #[must_use]
    pub fn left_join_count(&self) -> usize {
        self.joins
            .iter()
            .filter(|join| join.join_type == JoinType::Left)
            .count()
    }

    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.joins.iter().filter(|join| join.fetch).count()
    }
}

///
/// CriteriaDelete
///
/// Bulk DELETE statement form. Carries no joins; paths are resolved
/// root-relative.
///

#[derive(Clone, Debug, PartialEq)]
pub struct CriteriaDelete {
    pub entity: &'static str,
    pub primary_key: &'static str,
    pub filter: Option<CriteriaExpr>,
}
