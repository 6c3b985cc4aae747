use super::Value;
use num_traits::ToPrimitive;
use std::cmp::Ordering;

/// Semantic comparison between two values.
///
/// Returns `None` when either side is `Null` or when the variants are
/// not comparable (predicate evaluation treats both as "unknown", i.e.
/// the comparison does not hold). `Int` widens against `Float`; `Enum`
/// compares against `Text` by name.
#[must_use]
pub fn compare_values(lhs: &Value, rhs: &Value) -> Option<Ordering> {
    use Value::{Bool, Date, Enum, Float, Int, List, Text, Timestamp, Uuid};

    match (lhs, rhs) {
        (Value::Null, _) | (_, Value::Null) => None,
        (Bool(a), Bool(b)) => Some(a.cmp(b)),
        (Int(a), Int(b)) => Some(a.cmp(b)),
        (Float(a), Float(b)) => Some(a.cmp(b)),
        (Int(a), Float(b)) => a.to_f64().map(|a| super::Float64(a).cmp(b)),
        (Float(a), Int(b)) => b.to_f64().map(|b| a.cmp(&super::Float64(b))),
        (Text(a), Text(b)) | (Enum(a), Enum(b)) | (Text(a), Enum(b)) | (Enum(a), Text(b)) => {
            Some(a.cmp(b))
        }
        (Date(a), Date(b)) => Some(a.cmp(b)),
        (Timestamp(a), Timestamp(b)) => Some(a.cmp(b)),
        (Uuid(a), Uuid(b)) => Some(a.cmp(b)),
        (List(a), List(b)) => compare_lists(a, b),
        _ => None,
    }
}

/// Semantic equality; `Null` never equals anything, including `Null`.
#[must_use]
pub(crate) fn values_equal(lhs: &Value, rhs: &Value) -> bool {
    compare_values(lhs, rhs) == Some(Ordering::Equal)
}

fn compare_lists(a: &[Value], b: &[Value]) -> Option<Ordering> {
    for (x, y) in a.iter().zip(b.iter()) {
        match compare_values(x, y)? {
            Ordering::Equal => {}
            other => return Some(other),
        }
    }
    Some(a.len().cmp(&b.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_widens_against_float() {
        assert_eq!(
            compare_values(&Value::Int(5), &Value::Float(5.0.into())),
            Some(Ordering::Equal)
        );
        assert_eq!(
            compare_values(&Value::Int(5), &Value::Float(5.5.into())),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn null_is_incomparable() {
        assert_eq!(compare_values(&Value::Null, &Value::Null), None);
        assert_eq!(compare_values(&Value::Int(1), &Value::Null), None);
        assert!(!values_equal(&Value::Null, &Value::Null));
    }

    #[test]
    fn enum_compares_by_name_against_text() {
        assert!(values_equal(
            &Value::Enum("Open".into()),
            &Value::Text("Open".into())
        ));
    }

    #[test]
    fn mismatched_variants_are_incomparable() {
        assert_eq!(
            compare_values(&Value::Bool(true), &Value::Int(1)),
            None
        );
    }
}
