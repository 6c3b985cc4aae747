use crate::value::{FieldValue, Value};
use std::fmt::Debug;
use thiserror::Error as ThisError;

///
/// FieldValues
///
/// Attribute-value access for an entity or embeddable instance.
/// `get_value` answers single attributes by name; `to_record`
/// materializes the whole instance (relations included, recursively)
/// as a [`Value::Record`]. Generated by `#[derive(Entity)]` /
/// `#[derive(Embeddable)]`.
///

pub trait FieldValues {
    fn get_value(&self, field: &str) -> Option<Value>;

    fn to_record(&self) -> Value;
}

///
/// Lifecycle
///
/// Entity lifecycle callbacks. Invoked only on the managed paths
/// (persist, managed deletion, load/refresh); bulk deletion bypasses
/// them. The derive emits an empty impl unless the entity opts into
/// `#[entity(custom_lifecycle)]`.
///

pub trait Lifecycle {
    fn before_persist(&mut self) {}

    fn before_remove(&self) {}

    fn after_load(&mut self) {}
}

///
/// IdValue
///
/// Identifier value contract. `from_sequence` supports drivers that
/// assign identifiers on persist; types without a sequence mapping
/// return `None` and require the caller to supply an identifier.
///

pub trait IdValue: FieldValue + Clone + Eq + Ord + Debug + 'static {
    #[must_use]
    fn from_sequence(_seq: u64) -> Option<Self>
    where
        Self: Sized,
    {
        None
    }
}

impl IdValue for i32 {
    fn from_sequence(seq: u64) -> Option<Self> {
        Self::try_from(seq).ok()
    }
}

impl IdValue for i64 {
    fn from_sequence(seq: u64) -> Option<Self> {
        Self::try_from(seq).ok()
    }
}

impl IdValue for String {}

impl IdValue for uuid::Uuid {
    fn from_sequence(seq: u64) -> Option<Self> {
        Some(Self::from_u128(u128::from(seq)))
    }
}

///
/// Entity
///
/// The root entity contract: a single-attribute identifier, a stable
/// entity name, attribute-value access, and lifecycle callbacks.
/// `id()` returning `None` marks the instance as transient, which is
/// what drives the `save()` persist-or-merge policy.
///

pub trait Entity: FieldValues + Lifecycle + Clone + Debug + 'static {
    type Id: IdValue;

    const ENTITY_NAME: &'static str;
    const PRIMARY_KEY: &'static str;

    fn id(&self) -> Option<Self::Id>;

    fn assign_id(&mut self, id: Self::Id);

    /// Identifier as a dynamic value, `Null` while transient.
    fn id_value(&self) -> Value {
        self.id().as_ref().map_or(Value::Null, FieldValue::to_value)
    }
}

///
/// RowError
///

#[derive(Debug, ThisError)]
pub enum RowError {
    #[error("constructor expected {expected} columns, row has {actual}")]
    Arity { expected: usize, actual: usize },

    #[error("column {index} has unexpected shape: {value}")]
    Shape { index: usize, value: Value },
}

///
/// FromRow
///
/// Constructor-projection target: builds `Self` from one row of
/// selected values, in selection order.
///

pub trait FromRow: Sized {
    fn from_row(row: &[Value]) -> Result<Self, RowError>;
}

///
/// FromValue
///
/// Scalar-projection target for single-selection queries.
///

pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(v) => Some(v.get()),
            #[allow(clippy::cast_precision_loss)]
            Value::Int(v) => Some(*v as Self),
            _ => None,
        }
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Text(v) | Value::Enum(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl FromValue for uuid::Uuid {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Uuid(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for chrono::NaiveDate {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Date(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for chrono::DateTime<chrono::Utc> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Timestamp(v) => Some(*v),
            _ => None,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Option<Self> {
        if value.is_null() {
            Some(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}
