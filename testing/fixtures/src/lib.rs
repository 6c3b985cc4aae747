//! Shared test entities for the integration suites: a small
//! users/departments/orders domain with an embeddable, an enum, a
//! to-one relation, a collection relation, and a lifecycle hook
//! counter on `User`.

mod fields;

pub use fields::*;

use chrono::{DateTime, Utc};
use helix::{Embeddable, Entity, FieldValue, Lifecycle, TypeTag, Value};
use std::sync::Mutex;

/// Names of users removed through the managed path, in removal order.
/// Tests use per-test name prefixes so parallel suites never observe
/// each other's removals.
static USER_REMOVE_HOOKS: Mutex<Vec<String>> = Mutex::new(Vec::new());

/// Managed removals whose user name starts with `prefix`.
#[must_use]
pub fn user_removals_matching(prefix: &str) -> usize {
    USER_REMOVE_HOOKS
        .lock()
        .expect("hook log poisoned")
        .iter()
        .filter(|name| name.starts_with(prefix))
        .count()
}

///
/// Address
///

#[derive(Clone, Debug, Embeddable)]
pub struct Address {
    pub city: String,
    pub street: String,
}

impl Default for Address {
    fn default() -> Self {
        Self {
            city: "Springfield".to_string(),
            street: "Main St 1".to_string(),
        }
    }
}

///
/// Department
///

#[derive(Clone, Debug, Entity)]
pub struct Department {
    #[entity(id)]
    pub id: Option<i64>,
    pub name: String,
    pub region: Option<String>,
}

impl Department {
    #[must_use]
    pub fn seed(id: i64, name: &str) -> Self {
        Self {
            id: Some(id),
            name: name.to_string(),
            region: None,
        }
    }
}

///
/// OrderStatus
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OrderStatus {
    Open,
    Shipped,
    Cancelled,
}

impl OrderStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Shipped => "Shipped",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl FieldValue for OrderStatus {
    const TAG: TypeTag = TypeTag::Enum;

    fn to_value(&self) -> Value {
        Value::Enum(self.as_str().to_string())
    }
}

///
/// Order
///

#[derive(Clone, Debug, Entity)]
pub struct Order {
    #[entity(id)]
    pub id: Option<i64>,
    pub total: f64,
    pub placed_at: DateTime<Utc>,
    #[entity(enumerated)]
    pub status: OrderStatus,
}

impl Order {
    #[must_use]
    pub fn seed(id: i64, total: f64, status: OrderStatus) -> Self {
        Self {
            id: Some(id),
            total,
            placed_at: DateTime::from_timestamp(1_700_000_000 + id, 0)
                .expect("fixture timestamp"),
            status,
        }
    }
}

///
/// User
///

#[derive(Clone, Debug, Entity)]
#[entity(custom_lifecycle)]
pub struct User {
    #[entity(id)]
    pub id: Option<i64>,
    pub name: String,
    pub age: i32,
    pub email: Option<String>,
    pub active: bool,
    pub joined_at: Option<DateTime<Utc>>,
    #[entity(embedded)]
    pub address: Address,
    #[entity(relation)]
    pub department: Option<Department>,
    #[entity(relation)]
    pub orders: Vec<Order>,
    pub tags: Vec<String>,
}

impl Lifecycle for User {
    fn before_remove(&self) {
        USER_REMOVE_HOOKS
            .lock()
            .expect("hook log poisoned")
            .push(self.name.clone());
    }
}

impl User {
    #[must_use]
    pub fn seed(id: i64, name: &str, age: i32) -> Self {
        Self {
            id: Some(id),
            name: name.to_string(),
            age,
            email: None,
            active: true,
            joined_at: None,
            address: Address::default(),
            department: None,
            orders: Vec::new(),
            tags: Vec::new(),
        }
    }

    #[must_use]
    pub fn transient(name: &str, age: i32) -> Self {
        Self {
            id: None,
            ..Self::seed(0, name, age)
        }
    }

    #[must_use]
    pub fn with_department(mut self, department: Department) -> Self {
        self.department = Some(department);
        self
    }

    #[must_use]
    pub fn with_orders(mut self, orders: Vec<Order>) -> Self {
        self.orders = orders;
        self
    }

    #[must_use]
    pub fn with_email(mut self, email: &str) -> Self {
        self.email = Some(email.to_string());
        self
    }

    #[must_use]
    pub fn with_joined_at(mut self, joined_at: DateTime<Utc>) -> Self {
        self.joined_at = Some(joined_at);
        self
    }

    #[must_use]
    pub fn with_city(mut self, city: &str) -> Self {
        self.address.city = city.to_string();
        self
    }
}
