//! Hand-written fixture entities for unit tests. These implement the
//! entity contracts manually (integration suites use the derive).

use crate::entity::{Entity, FieldValues, Lifecycle};
use crate::value::{FieldValue, Value};

///
/// TestDepartment
///

#[derive(Clone, Debug, PartialEq)]
pub struct TestDepartment {
    pub id: Option<i64>,
    pub name: String,
}

impl FieldValues for TestDepartment {
    fn get_value(&self, field: &str) -> Option<Value> {
        match field {
            "id" => Some(self.id.to_value()),
            "name" => Some(self.name.to_value()),
            _ => None,
        }
    }

    fn to_record(&self) -> Value {
        Value::Record(vec![
            ("id".to_string(), self.id.to_value()),
            ("name".to_string(), self.name.to_value()),
        ])
    }
}

impl Lifecycle for TestDepartment {}

impl Entity for TestDepartment {
    type Id = i64;

    const ENTITY_NAME: &'static str = "TestDepartment";
    const PRIMARY_KEY: &'static str = "id";

    fn id(&self) -> Option<Self::Id> {
        self.id
    }

    fn assign_id(&mut self, id: Self::Id) {
        self.id = Some(id);
    }
}

///
/// TestOrder
///

#[derive(Clone, Debug, PartialEq)]
pub struct TestOrder {
    pub id: Option<i64>,
    pub total: f64,
}

impl FieldValues for TestOrder {
    fn get_value(&self, field: &str) -> Option<Value> {
        match field {
            "id" => Some(self.id.to_value()),
            "total" => Some(self.total.to_value()),
            _ => None,
        }
    }

    fn to_record(&self) -> Value {
        Value::Record(vec![
            ("id".to_string(), self.id.to_value()),
            ("total".to_string(), self.total.to_value()),
        ])
    }
}

impl Lifecycle for TestOrder {}

impl Entity for TestOrder {
    type Id = i64;

    const ENTITY_NAME: &'static str = "TestOrder";
    const PRIMARY_KEY: &'static str = "id";

    fn id(&self) -> Option<Self::Id> {
        self.id
    }

    fn assign_id(&mut self, id: Self::Id) {
        self.id = Some(id);
    }
}

///
/// TestUser
///

#[derive(Clone, Debug, PartialEq)]
pub struct TestUser {
    pub id: Option<i64>,
    pub name: String,
    pub age: i32,
    pub department: Option<TestDepartment>,
    pub orders: Vec<TestOrder>,
}

impl TestUser {
    pub fn new(id: i64, name: &str, age: i32) -> Self {
        Self {
            id: Some(id),
            name: name.to_string(),
            age,
            department: None,
            orders: Vec::new(),
        }
    }
}

impl FieldValues for TestUser {
    fn get_value(&self, field: &str) -> Option<Value> {
        match field {
            "id" => Some(self.id.to_value()),
            "name" => Some(self.name.to_value()),
            "age" => Some(self.age.to_value()),
            "department" => Some(
                self.department
                    .as_ref()
                    .map_or(Value::Null, FieldValues::to_record),
            ),
            "orders" => Some(Value::List(
                self.orders.iter().map(FieldValues::to_record).collect(),
            )),
            _ => None,
        }
    }

    fn to_record(&self) -> Value {
        Value::Record(vec![
            ("id".to_string(), self.id.to_value()),
            ("name".to_string(), self.name.to_value()),
            ("age".to_string(), self.age.to_value()),
            (
                "department".to_string(),
                self.department
                    .as_ref()
                    .map_or(Value::Null, FieldValues::to_record),
            ),
            (
                "orders".to_string(),
                Value::List(self.orders.iter().map(FieldValues::to_record).collect()),
            ),
        ])
    }
}

impl Lifecycle for TestUser {}

impl Entity for TestUser {
    type Id = i64;

    const ENTITY_NAME: &'static str = "TestUser";
    const PRIMARY_KEY: &'static str = "id";

    fn id(&self) -> Option<Self::Id> {
        self.id
    }

    fn assign_id(&mut self, id: Self::Id) {
        self.id = Some(id);
    }
}

///
/// Descriptors, in the emitted form
///

pub mod test_user_fields {
    use super::{TestDepartment, TestOrder, TestUser};
    use crate::fields::{
        CollectionField, NumberField, RelationField, StringField,
    };

    pub const ID: NumberField<TestUser, i64> = NumberField::new("id");
    pub const NAME: StringField<TestUser> = StringField::new("name");
    pub const AGE: NumberField<TestUser, i32> = NumberField::new("age");
    pub const ORDERS: CollectionField<TestUser, TestOrder> = CollectionField::new("orders");
    pub const DEPARTMENT: RelationField<TestUser, TestDepartment> =
        RelationField::new("department");
    pub const DEPARTMENT_NAME: StringField<TestUser> =
        StringField::nested("department.name", "department");
}
