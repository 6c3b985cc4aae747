mod compare;
mod convert;
mod float;

#[cfg(test)]
mod tests;

pub use compare::compare_values;
pub use convert::FieldValue;
pub use float::Float64;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

///
/// TypeTag
///
/// Declared result type of an expression. Carried on constants,
/// operations, and typed nulls so that the driver can bind parameters
/// without inspecting values.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum TypeTag {
    Bool,
    Int,
    Float,
    Text,
    Date,
    Timestamp,
    Uuid,
    Enum,
    Entity,
    List,
    Unknown,
}

///
/// Value
///
/// Dynamic value algebra used by constants, driver rows, and the
/// reference engine.
///
/// `Null`   → the attribute's value is absent (SQL NULL).
/// `Record` → an entity (or embeddable) materialized as data; relation
///            traversal in the reference engine walks records.
///
/// The derived `Ord` is a deterministic total order used for set/map
/// keys; semantic comparison with numeric widening lives in
/// [`compare_values`].
///

#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(Float64),
    Text(String),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    Uuid(Uuid),
    Enum(String),
    /// Ordered list of values; order is preserved.
    List(Vec<Self>),
    /// Entity attributes in declaration order.
    Record(Vec<(String, Self)>),
}

impl Value {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Tag of the concrete variant; `Unknown` is never produced here.
    #[must_use]
    pub const fn type_tag(&self) -> TypeTag {
        match self {
            Self::Null => TypeTag::Unknown,
            Self::Bool(_) => TypeTag::Bool,
            Self::Int(_) => TypeTag::Int,
            Self::Float(_) => TypeTag::Float,
            Self::Text(_) => TypeTag::Text,
            Self::Date(_) => TypeTag::Date,
            Self::Timestamp(_) => TypeTag::Timestamp,
            Self::Uuid(_) => TypeTag::Uuid,
            Self::Enum(_) => TypeTag::Enum,
            Self::List(_) => TypeTag::List,
            Self::Record(_) => TypeTag::Entity,
        }
    }

    /// Look up a field of a `Record` value by attribute name.
    #[must_use]
    pub fn record_get(&self, field: &str) -> Option<&Self> {
        match self {
            Self::Record(entries) => entries
                .iter()
                .find(|(name, _)| name == field)
                .map(|(_, value)| value),
            _ => None,
        }
    }

    /// Walk a chain of attribute segments from this value.
    ///
    /// A `Null` encountered mid-path propagates as `Null` (outer-join
    /// traversal semantics). A scalar encountered mid-path is a shape
    /// mismatch and yields `None`.
    #[must_use]
    pub fn walk<'a, I>(&self, segments: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut current = self.clone();
        for segment in segments {
            current = match current {
                Self::Null => return Some(Self::Null),
                Self::Record(_) => current.record_get(segment)?.clone(),
                _ => return None,
            };
        }
        Some(current)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "'{v}'"),
            Self::Date(v) => write!(f, "{v}"),
            Self::Timestamp(v) => write!(f, "{}", v.to_rfc3339()),
            Self::Uuid(v) => write!(f, "{v}"),
            Self::Enum(v) => write!(f, "{v}"),
            Self::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
            Self::Record(_) => write!(f, "<record>"),
        }
    }
}
