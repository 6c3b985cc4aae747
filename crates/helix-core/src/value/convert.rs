use super::{TypeTag, Value};
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

///
/// FieldValue
///
/// Conversion from a concrete attribute type into the dynamic [`Value`]
/// algebra, together with the declared [`TypeTag`] used for typed
/// constants and nulls. Implemented for the primitive types entities
/// are built from; domain enums implement it with `TAG = TypeTag::Enum`.
///

pub trait FieldValue {
    const TAG: TypeTag;

    fn to_value(&self) -> Value;
}

impl<T: FieldValue + ?Sized> FieldValue for &T {
    const TAG: TypeTag = T::TAG;

    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    const TAG: TypeTag = T::TAG;

    fn to_value(&self) -> Value {
        match self {
            Some(inner) => inner.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: FieldValue> FieldValue for Vec<T> {
    const TAG: TypeTag = TypeTag::List;

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(FieldValue::to_value).collect())
    }
}

impl FieldValue for bool {
    const TAG: TypeTag = TypeTag::Bool;

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

macro_rules! impl_field_value_int {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FieldValue for $ty {
                const TAG: TypeTag = TypeTag::Int;

                fn to_value(&self) -> Value {
                    Value::Int(i64::from(*self))
                }
            }
        )*
    };
}

impl_field_value_int!(i8, i16, i32, i64, u8, u16, u32);

impl FieldValue for f32 {
    const TAG: TypeTag = TypeTag::Float;

    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self).into())
    }
}

impl FieldValue for f64 {
    const TAG: TypeTag = TypeTag::Float;

    fn to_value(&self) -> Value {
        Value::Float((*self).into())
    }
}

impl FieldValue for str {
    const TAG: TypeTag = TypeTag::Text;

    fn to_value(&self) -> Value {
        Value::Text(self.to_string())
    }
}

impl FieldValue for String {
    const TAG: TypeTag = TypeTag::Text;

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl FieldValue for NaiveDate {
    const TAG: TypeTag = TypeTag::Date;

    fn to_value(&self) -> Value {
        Value::Date(*self)
    }
}

impl FieldValue for DateTime<Utc> {
    const TAG: TypeTag = TypeTag::Timestamp;

    fn to_value(&self) -> Value {
        Value::Timestamp(*self)
    }
}

impl FieldValue for Uuid {
    const TAG: TypeTag = TypeTag::Uuid;

    fn to_value(&self) -> Value {
        Value::Uuid(*self)
    }
}
