//! Compact SQL-ish rendering of compiled queries for diagnostics and
//! trace logging. Not a dialect; never executed.

use super::{
    AggregateOp, CriteriaDelete, CriteriaExpr, CriteriaOrder, CriteriaQuery, FromId, JoinType,
    Selection,
};
use crate::expr::{CompareOp, NullHandling, SortDirection};
use std::fmt;

impl fmt::Display for CriteriaQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT ")?;
        if self.distinct {
            write!(f, "DISTINCT ")?;
        }
        match &self.selection {
            Selection::Root => write!(f, "{}", self.entity)?,
            Selection::Count { distinct: true } => write!(f, "COUNT(DISTINCT {})", self.entity)?,
            Selection::Count { distinct: false } => write!(f, "COUNT({})", self.entity)?,
            Selection::Scalars(exprs) => write_list(f, exprs)?,
        }
        write!(f, " FROM {}", self.entity)?;
        for (index, join) in self.joins.iter().enumerate() {
            let kind = match (join.join_type, join.fetch) {
                (JoinType::Inner, false) => "JOIN",
                (JoinType::Inner, true) => "JOIN FETCH",
                (JoinType::Left, false) => "LEFT JOIN",
                (JoinType::Left, true) => "LEFT JOIN FETCH",
            };
            write!(f, " {kind} ")?;
            match join.parent {
                FromId::Root => write!(f, "{}", join.attribute)?,
                FromId::Join(parent) => write!(f, "j{parent}.{}", join.attribute)?,
            }
            write!(f, " AS j{index}")?;
        }
        if let Some(filter) = &self.filter {
            write!(f, " WHERE {filter}")?;
        }
        if !self.group_by.is_empty() {
            write!(f, " GROUP BY ")?;
            write_list(f, &self.group_by)?;
        }
        if let Some(having) = &self.having {
            write!(f, " HAVING {having}")?;
        }
        if !self.order_by.is_empty() {
            write!(f, " ORDER BY ")?;
            for (i, order) in self.order_by.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{order}")?;
            }
        }
        if let Some(offset) = self.first_result {
            write!(f, " OFFSET {offset}")?;
        }
        if let Some(limit) = self.max_results {
            write!(f, " LIMIT {limit}")?;
        }
        Ok(())
    }
}

impl fmt::Display for CriteriaDelete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DELETE FROM {}", self.entity)?;
        if let Some(filter) = &self.filter {
            write!(f, " WHERE {filter}")?;
        }
        Ok(())
    }
}

impl fmt::Display for CriteriaOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)?;
        match self.direction {
            SortDirection::Asc => write!(f, " ASC")?,
            SortDirection::Desc => write!(f, " DESC")?,
        }
        match self.nulls {
            NullHandling::Default => Ok(()),
            NullHandling::First => write!(f, " NULLS FIRST"),
            NullHandling::Last => write!(f, " NULLS LAST"),
        }
    }
}

impl fmt::Display for CriteriaExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path { from, segments } => {
                match from {
                    FromId::Root => write!(f, "root")?,
                    FromId::Join(index) => write!(f, "j{index}")?,
                }
                for segment in segments {
                    write!(f, ".{segment}")?;
                }
                Ok(())
            }
            Self::Literal(value) => write!(f, "{value}"),
            Self::NullLiteral(_) => write!(f, "null"),
            Self::True => write!(f, "1=1"),
            Self::False => write!(f, "1=0"),
            Self::And(children) => write_joined(f, children, " AND "),
            Self::Or(children) => write_joined(f, children, " OR "),
            Self::Not(inner) => write!(f, "NOT ({inner})"),
            Self::Compare { op, lhs, rhs } => {
                let op = match op {
                    CompareOp::Eq => "=",
                    CompareOp::Ne => "<>",
                    CompareOp::Gt => ">",
                    CompareOp::Ge => ">=",
                    CompareOp::Lt => "<",
                    CompareOp::Le => "<=",
                };
                write!(f, "{lhs} {op} {rhs}")
            }
            Self::Between { target, low, high } => {
                write!(f, "{target} BETWEEN {low} AND {high}")
            }
            Self::IsNull(inner) => write!(f, "{inner} IS NULL"),
            Self::IsNotNull(inner) => write!(f, "{inner} IS NOT NULL"),
            Self::In {
                target,
                values,
                negated,
            } => {
                let keyword = if *negated { "NOT IN" } else { "IN" };
                write!(f, "{target} {keyword} (")?;
                write_joined(f, values, ", ")?;
                write!(f, ")")
            }
            Self::Like {
                target,
                pattern,
                escape,
            } => {
                write!(f, "{target} LIKE {pattern}")?;
                match escape {
                    Some(c) => write!(f, " ESCAPE '{c}'"),
                    None => Ok(()),
                }
            }
            Self::IsEmpty(inner) => write!(f, "{inner} IS EMPTY"),
            Self::IsNotEmpty(inner) => write!(f, "{inner} IS NOT EMPTY"),
            Self::MemberOf { element, target } => write!(f, "{element} MEMBER OF {target}"),
            Self::Call { op, args, .. } => {
                write!(f, "{op:?}(")?;
                write_joined(f, args, ", ")?;
                write!(f, ")")
            }
            Self::Aggregate { op, arg, distinct } => {
                let name = match op {
                    AggregateOp::Count => "COUNT",
                    AggregateOp::Sum => "SUM",
                    AggregateOp::Avg => "AVG",
                    AggregateOp::Min => "MIN",
                    AggregateOp::Max => "MAX",
                };
                write!(f, "{name}(")?;
                if *distinct {
                    write!(f, "DISTINCT ")?;
                }
                match arg {
                    Some(arg) => write!(f, "{arg}")?,
                    None => write!(f, "*")?,
                }
                write!(f, ")")
            }
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[CriteriaExpr]) -> fmt::Result {
    write_joined(f, items, ", ")
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[CriteriaExpr], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, "{sep}")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}
