//! Row-level evaluation of compiled criteria expressions against
//! record values. Null semantics follow SQL where it matters for the
//! public contract: comparisons over null are not satisfied, `IS NULL`
//! is, and aggregates skip null inputs.

use crate::criteria::{AggregateOp, CriteriaExpr, FromId};
use crate::error::RuntimeError;
use crate::expr::{CompareOp, ExprOp};
use crate::value::{TypeTag, Value, compare_values};
use chrono::Utc;
use std::cmp::Ordering;
use std::collections::BTreeSet;

///
/// WorkRow
///
/// One expanded row: the root record index plus one bound value per
/// join node (`Null` where a LEFT join found nothing).
///

#[derive(Clone, Debug)]
pub(crate) struct WorkRow {
    pub root: usize,
    pub slots: Vec<Value>,
}

///
/// EvalCtx
///

pub(crate) struct EvalCtx<'a> {
    pub records: &'a [Value],
}

///
/// Scope
///
/// Evaluation scope: a single expanded row, or a group of rows (for
/// aggregate positions in grouped selections and HAVING).
///

#[derive(Clone, Copy)]
pub(crate) enum Scope<'r> {
    Row(&'r WorkRow),
    Group(&'r [WorkRow]),
}

impl<'r> Scope<'r> {
    fn representative(self) -> Option<&'r WorkRow> {
        match self {
            Self::Row(row) => Some(row),
            Self::Group(rows) => rows.first(),
        }
    }
}

pub(crate) fn value_of(
    ctx: &EvalCtx<'_>,
    scope: Scope<'_>,
    expr: &CriteriaExpr,
) -> Result<Value, RuntimeError> {
    match expr {
        CriteriaExpr::Path { from, segments } => {
            let Some(row) = scope.representative() else {
                return Ok(Value::Null);
            };
            resolve(ctx, row, *from, segments)
        }
        CriteriaExpr::Literal(value) => Ok(value.clone()),
        CriteriaExpr::NullLiteral(_) => Ok(Value::Null),
        CriteriaExpr::Call { op, args, tag } => eval_call(ctx, scope, *op, args, *tag),
        CriteriaExpr::Aggregate { op, arg, distinct } => match scope {
            Scope::Group(rows) => eval_aggregate(ctx, rows, *op, arg.as_deref(), *distinct),
            Scope::Row(_) => Err(RuntimeError::Unsupported(
                "aggregate evaluated outside a grouped scope".to_string(),
            )),
        },
        // boolean forms in value position
        other => Ok(Value::Bool(truth_of(ctx, scope, other)?)),
    }
}

pub(crate) fn truth_of(
    ctx: &EvalCtx<'_>,
    scope: Scope<'_>,
    expr: &CriteriaExpr,
) -> Result<bool, RuntimeError> {
    match expr {
        CriteriaExpr::True => Ok(true),
        CriteriaExpr::False => Ok(false),
        CriteriaExpr::And(children) => {
            for child in children {
                if !truth_of(ctx, scope, child)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        CriteriaExpr::Or(children) => {
            for child in children {
                if truth_of(ctx, scope, child)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        CriteriaExpr::Not(inner) => Ok(!truth_of(ctx, scope, inner)?),
        CriteriaExpr::Compare { op, lhs, rhs } => {
            let lhs = value_of(ctx, scope, lhs)?;
            let rhs = value_of(ctx, scope, rhs)?;
            Ok(match compare_values(&lhs, &rhs) {
                Some(ordering) => match op {
                    CompareOp::Eq => ordering == Ordering::Equal,
                    CompareOp::Ne => ordering != Ordering::Equal,
                    CompareOp::Gt => ordering == Ordering::Greater,
                    CompareOp::Ge => ordering != Ordering::Less,
                    CompareOp::Lt => ordering == Ordering::Less,
                    CompareOp::Le => ordering != Ordering::Greater,
                },
                None => false,
            })
        }
        CriteriaExpr::Between { target, low, high } => {
            let target = value_of(ctx, scope, target)?;
            let low = value_of(ctx, scope, low)?;
            let high = value_of(ctx, scope, high)?;
            Ok(
                compare_values(&target, &low).is_some_and(|o| o != Ordering::Less)
                    && compare_values(&target, &high).is_some_and(|o| o != Ordering::Greater),
            )
        }
        CriteriaExpr::IsNull(inner) => Ok(value_of(ctx, scope, inner)?.is_null()),
        CriteriaExpr::IsNotNull(inner) => Ok(!value_of(ctx, scope, inner)?.is_null()),
        CriteriaExpr::In {
            target,
            values,
            negated,
        } => {
            let target = value_of(ctx, scope, target)?;
            if target.is_null() {
                return Ok(false);
            }
            let mut found = false;
            for value in values {
                let value = value_of(ctx, scope, value)?;
                if compare_values(&target, &value) == Some(Ordering::Equal) {
                    found = true;
                    break;
                }
            }
            Ok(found != *negated)
        }
        CriteriaExpr::Like {
            target,
            pattern,
            escape,
        } => {
            let target = value_of(ctx, scope, target)?;
            let pattern = value_of(ctx, scope, pattern)?;
            match (target, pattern) {
                (Value::Text(text), Value::Text(pattern)) => {
                    Ok(like_match(&text, &pattern, *escape))
                }
                _ => Ok(false),
            }
        }
        CriteriaExpr::IsEmpty(inner) => match value_of(ctx, scope, inner)? {
            Value::List(items) => Ok(items.is_empty()),
            Value::Null => Ok(true),
            _ => Ok(false),
        },
        CriteriaExpr::IsNotEmpty(inner) => match value_of(ctx, scope, inner)? {
            Value::List(items) => Ok(!items.is_empty()),
            _ => Ok(false),
        },
        CriteriaExpr::MemberOf { element, target } => {
            let element = value_of(ctx, scope, element)?;
            match value_of(ctx, scope, target)? {
                Value::List(items) => Ok(items
                    .iter()
                    .any(|item| compare_values(&element, item) == Some(Ordering::Equal))),
                _ => Ok(false),
            }
        }
        other => match value_of(ctx, scope, other)? {
            Value::Bool(b) => Ok(b),
            Value::Null => Ok(false),
            v => Err(RuntimeError::Unsupported(format!(
                "non-boolean value in predicate position: {v}"
            ))),
        },
    }
}

fn resolve(
    ctx: &EvalCtx<'_>,
    row: &WorkRow,
    from: FromId,
    segments: &[String],
) -> Result<Value, RuntimeError> {
    let base = match from {
        FromId::Root => ctx.records[row.root].clone(),
        FromId::Join(index) => row.slots.get(index).cloned().unwrap_or(Value::Null),
    };
    base.walk(segments.iter().map(String::as_str))
        .ok_or_else(|| {
            RuntimeError::Unsupported(format!(
                "path walks through a non-record attribute: {}",
                segments.join(".")
            ))
        })
}

// ----------------------------------------------------------------------
// Scalar calls
// ----------------------------------------------------------------------

fn eval_call(
    ctx: &EvalCtx<'_>,
    scope: Scope<'_>,
    op: ExprOp,
    args: &[CriteriaExpr],
    tag: TypeTag,
) -> Result<Value, RuntimeError> {
    let mut values = Vec::with_capacity(args.len());
    for arg in args {
        values.push(value_of(ctx, scope, arg)?);
    }

    let result = match op {
        ExprOp::Upper => map_text(&values[0], |s| s.to_uppercase()),
        ExprOp::Lower => map_text(&values[0], |s| s.to_lowercase()),
        ExprOp::Trim => map_text(&values[0], |s| s.trim().to_string()),
        ExprOp::Length => match &values[0] {
            Value::Text(s) => Value::Int(s.chars().count() as i64),
            _ => Value::Null,
        },
        ExprOp::Concat => {
            let mut out = String::new();
            for value in &values {
                match value {
                    Value::Text(s) => out.push_str(s),
                    Value::Null => return Ok(Value::Null),
                    other => out.push_str(&other.to_string()),
                }
            }
            Value::Text(out)
        }
        ExprOp::Substring => match (&values[0], &values[1]) {
            (Value::Text(s), Value::Int(start)) => {
                let start = usize::try_from((*start - 1).max(0)).unwrap_or(0);
                let chars: Vec<char> = s.chars().collect();
                let end = match values.get(2) {
                    Some(Value::Int(len)) => {
                        (start + usize::try_from(*len).unwrap_or(0)).min(chars.len())
                    }
                    _ => chars.len(),
                };
                if start >= chars.len() {
                    Value::Text(String::new())
                } else {
                    Value::Text(chars[start..end].iter().collect())
                }
            }
            _ => Value::Null,
        },
        ExprOp::Locate => match (&values[0], &values[1]) {
            // LOCATE(haystack, needle): 1-based position, 0 when absent
            (Value::Text(haystack), Value::Text(needle)) => haystack
                .find(needle.as_str())
                .map_or(Value::Int(0), |at| Value::Int(at as i64 + 1)),
            _ => Value::Null,
        },
        ExprOp::Add | ExprOp::Subtract | ExprOp::Multiply | ExprOp::Divide | ExprOp::Mod => {
            binary_numeric(op, &values[0], &values[1])?
        }
        ExprOp::Abs => match &values[0] {
            Value::Int(v) => Value::Int(v.abs()),
            Value::Float(v) => Value::Float(v.get().abs().into()),
            _ => Value::Null,
        },
        ExprOp::Negate => match &values[0] {
            Value::Int(v) => Value::Int(-v),
            Value::Float(v) => Value::Float((-v.get()).into()),
            _ => Value::Null,
        },
        ExprOp::Sqrt => match numeric_as_f64(&values[0]) {
            Some(v) => Value::Float(v.sqrt().into()),
            None => Value::Null,
        },
        ExprOp::CurrentDate => Value::Date(Utc::now().date_naive()),
        ExprOp::CurrentTime | ExprOp::CurrentTimestamp => Value::Timestamp(Utc::now()),
        ExprOp::Coalesce => values
            .iter()
            .find(|value| !value.is_null())
            .cloned()
            .unwrap_or(Value::Null),
        ExprOp::Nullif => {
            if compare_values(&values[0], &values[1]) == Some(Ordering::Equal) {
                Value::Null
            } else {
                values[0].clone()
            }
        }
        ExprOp::Cast => cast(&values[0], tag)?,
        ExprOp::Size => match &values[0] {
            Value::List(items) => Value::Int(items.len() as i64),
            Value::Null => Value::Int(0),
            _ => Value::Null,
        },
        ExprOp::Count
        | ExprOp::CountDistinct
        | ExprOp::Sum
        | ExprOp::Avg
        | ExprOp::Min
        | ExprOp::Max => {
            return Err(RuntimeError::Internal(
                "aggregate operator reached scalar evaluation".to_string(),
            ));
        }
    };
    Ok(result)
}

fn map_text(value: &Value, f: impl FnOnce(&str) -> String) -> Value {
    match value {
        Value::Text(s) => Value::Text(f(s)),
        _ => Value::Null,
    }
}

fn numeric_as_f64(value: &Value) -> Option<f64> {
    match value {
        #[allow(clippy::cast_precision_loss)]
        Value::Int(v) => Some(*v as f64),
        Value::Float(v) => Some(v.get()),
        _ => None,
    }
}

fn binary_numeric(op: ExprOp, lhs: &Value, rhs: &Value) -> Result<Value, RuntimeError> {
    if lhs.is_null() || rhs.is_null() {
        return Ok(Value::Null);
    }
    if let (Value::Int(a), Value::Int(b)) = (lhs, rhs) {
        let result = match op {
            ExprOp::Add => a.checked_add(*b),
            ExprOp::Subtract => a.checked_sub(*b),
            ExprOp::Multiply => a.checked_mul(*b),
            ExprOp::Divide => a.checked_div(*b),
            ExprOp::Mod => a.checked_rem(*b),
            _ => None,
        };
        return result.map(Value::Int).ok_or_else(|| {
            RuntimeError::Internal(format!("integer arithmetic failed: {a} {op:?} {b}"))
        });
    }
    match (numeric_as_f64(lhs), numeric_as_f64(rhs)) {
        (Some(a), Some(b)) => {
            let result = match op {
                ExprOp::Add => a + b,
                ExprOp::Subtract => a - b,
                ExprOp::Multiply => a * b,
                ExprOp::Divide => a / b,
                ExprOp::Mod => a % b,
                _ => return Err(RuntimeError::Internal("non-arithmetic operator".to_string())),
            };
            Ok(Value::Float(result.into()))
        }
        _ => Ok(Value::Null),
    }
}

fn cast(value: &Value, tag: TypeTag) -> Result<Value, RuntimeError> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    let result = match (value, tag) {
        (v, t) if v.type_tag() == t => v.clone(),
        #[allow(clippy::cast_precision_loss)]
        (Value::Int(v), TypeTag::Float) => Value::Float((*v as f64).into()),
        #[allow(clippy::cast_possible_truncation)]
        (Value::Float(v), TypeTag::Int) => Value::Int(v.get() as i64),
        (v, TypeTag::Text) => Value::Text(v.to_string()),
        (v, t) => {
            return Err(RuntimeError::Unsupported(format!(
                "cast from {:?} to {t:?} is not supported",
                v.type_tag()
            )));
        }
    };
    Ok(result)
}

// ----------------------------------------------------------------------
// Aggregates
// ----------------------------------------------------------------------

fn eval_aggregate(
    ctx: &EvalCtx<'_>,
    rows: &[WorkRow],
    op: AggregateOp,
    arg: Option<&CriteriaExpr>,
    distinct: bool,
) -> Result<Value, RuntimeError> {
    let values = match arg {
        Some(expr) => {
            let mut values = Vec::with_capacity(rows.len());
            for row in rows {
                let value = value_of(ctx, Scope::Row(row), expr)?;
                if !value.is_null() {
                    values.push(value);
                }
            }
            if distinct {
                let mut seen = BTreeSet::new();
                values.retain(|value| seen.insert(value.clone()));
            }
            values
        }
        None => Vec::new(),
    };

    let result = match op {
        AggregateOp::Count => match arg {
            Some(_) => Value::Int(values.len() as i64),
            None => Value::Int(rows.len() as i64),
        },
        AggregateOp::Sum => values
            .into_iter()
            .try_fold(None::<Value>, |acc, value| match acc {
                None => Ok(Some(value)),
                Some(acc) => binary_numeric(ExprOp::Add, &acc, &value).map(Some),
            })?
            .unwrap_or(Value::Null),
        AggregateOp::Avg => {
            let count = values.len();
            if count == 0 {
                Value::Null
            } else {
                let mut sum = 0.0;
                for value in &values {
                    sum += numeric_as_f64(value).unwrap_or(0.0);
                }
                #[allow(clippy::cast_precision_loss)]
                Value::Float((sum / count as f64).into())
            }
        }
        AggregateOp::Min => fold_extreme(values, Ordering::Less),
        AggregateOp::Max => fold_extreme(values, Ordering::Greater),
    };
    Ok(result)
}

fn fold_extreme(values: Vec<Value>, keep: Ordering) -> Value {
    let mut best: Option<Value> = None;
    for value in values {
        best = Some(match best {
            None => value,
            Some(current) => {
                if compare_values(&value, &current) == Some(keep) {
                    value
                } else {
                    current
                }
            }
        });
    }
    best.unwrap_or(Value::Null)
}

// ----------------------------------------------------------------------
// LIKE
// ----------------------------------------------------------------------

#[derive(Clone, Copy, Eq, PartialEq)]
enum LikeToken {
    Any,
    Single,
    Lit(char),
}

/// SQL LIKE with optional escape character, via the usual dynamic
/// program over (text prefix, pattern prefix).
pub(crate) fn like_match(text: &str, pattern: &str, escape: Option<char>) -> bool {
    let mut tokens = Vec::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if Some(c) == escape {
            match chars.next() {
                Some(next) => tokens.push(LikeToken::Lit(next)),
                None => tokens.push(LikeToken::Lit(c)),
            }
        } else if c == '%' {
            tokens.push(LikeToken::Any);
        } else if c == '_' {
            tokens.push(LikeToken::Single);
        } else {
            tokens.push(LikeToken::Lit(c));
        }
    }

    let text: Vec<char> = text.chars().collect();
    let mut matches = vec![vec![false; tokens.len() + 1]; text.len() + 1];
    matches[0][0] = true;
    for (j, token) in tokens.iter().enumerate() {
        if *token == LikeToken::Any {
            matches[0][j + 1] = matches[0][j];
        }
    }
    for i in 1..=text.len() {
        for (j, token) in tokens.iter().enumerate() {
            matches[i][j + 1] = match token {
                LikeToken::Any => matches[i][j] || matches[i - 1][j + 1],
                LikeToken::Single => matches[i - 1][j],
                LikeToken::Lit(c) => matches[i - 1][j] && text[i - 1] == *c,
            };
        }
    }
    matches[text.len()][tokens.len()]
}

#[cfg(test)]
mod tests {
    use super::like_match;

    #[test]
    fn like_wildcards() {
        assert!(like_match("hello", "h%o", None));
        assert!(like_match("hello", "_ello", None));
        assert!(!like_match("hello", "h_o", None));
        assert!(like_match("", "%", None));
        assert!(!like_match("", "_", None));
    }

    #[test]
    fn like_escape_makes_wildcards_literal() {
        assert!(like_match("100%", "100\\%", Some('\\')));
        assert!(!like_match("100x", "100\\%", Some('\\')));
        assert!(like_match("a_b", "a\\_b", Some('\\')));
        assert!(!like_match("axb", "a\\_b", Some('\\')));
        assert!(like_match("a\\b", "a\\\\b", Some('\\')));
    }

    #[test]
    fn like_contains_shape() {
        assert!(like_match("100%_User", "%100\\%%", Some('\\')));
        assert!(!like_match("percent user", "%\\%%", Some('\\')));
    }
}
