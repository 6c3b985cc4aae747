// @generated by helix-build. Do not edit.
//
// Descriptor containers for the entities of this module.

use super::*;

///
/// DepartmentFields
///

pub struct DepartmentFields;

impl DepartmentFields {
    pub const ID: ::helix::fields::NumberField<Department, i64> =
        ::helix::fields::NumberField::new("id");
    pub const NAME: ::helix::fields::StringField<Department> =
        ::helix::fields::StringField::new("name");
    pub const REGION: ::helix::fields::StringField<Department> =
        ::helix::fields::StringField::new("region");
}

///
/// OrderFields
///

pub struct OrderFields;

impl OrderFields {
    pub const ID: ::helix::fields::NumberField<Order, i64> =
        ::helix::fields::NumberField::new("id");
    pub const TOTAL: ::helix::fields::NumberField<Order, f64> =
        ::helix::fields::NumberField::new("total");
    pub const PLACED_AT: ::helix::fields::DateTimeField<Order, DateTime<Utc>> =
        ::helix::fields::DateTimeField::new("placed_at");
    pub const STATUS: ::helix::fields::SimpleField<Order, OrderStatus> =
        ::helix::fields::SimpleField::new("status");
}

///
/// UserFields
///

pub struct UserFields;

impl UserFields {
    pub const ID: ::helix::fields::NumberField<User, i64> =
        ::helix::fields::NumberField::new("id");
    pub const NAME: ::helix::fields::StringField<User> =
        ::helix::fields::StringField::new("name");
    pub const AGE: ::helix::fields::NumberField<User, i32> =
        ::helix::fields::NumberField::new("age");
    pub const EMAIL: ::helix::fields::StringField<User> =
        ::helix::fields::StringField::new("email");
    pub const ACTIVE: ::helix::fields::SimpleField<User, bool> =
        ::helix::fields::SimpleField::new("active");
    pub const JOINED_AT: ::helix::fields::DateTimeField<User, DateTime<Utc>> =
        ::helix::fields::DateTimeField::new("joined_at");
    pub const ADDRESS_CITY: ::helix::fields::StringField<User> =
        ::helix::fields::StringField::new("address.city");
    pub const ADDRESS_STREET: ::helix::fields::StringField<User> =
        ::helix::fields::StringField::new("address.street");
    pub const DEPARTMENT: UserDepartmentFields = UserDepartmentFields::NEW;
    pub const ORDERS: ::helix::fields::CollectionField<User, Order> =
        ::helix::fields::CollectionField::new("orders");
    pub const TAGS: ::helix::fields::CollectionField<User, String> =
        ::helix::fields::CollectionField::new("tags");
}

///
/// UserDepartmentFields
///

#[allow(non_snake_case)]
pub struct UserDepartmentFields {
    pub SELF: ::helix::fields::RelationField<User, Department>,
    pub ID: ::helix::fields::NumberField<User, i64>,
    pub NAME: ::helix::fields::StringField<User>,
    pub REGION: ::helix::fields::StringField<User>,
}

impl UserDepartmentFields {
    pub const NEW: Self = Self {
        SELF: ::helix::fields::RelationField::new("department"),
        ID: ::helix::fields::NumberField::nested("department.id", "department"),
        NAME: ::helix::fields::StringField::nested("department.name", "department"),
        REGION: ::helix::fields::StringField::nested("department.region", "department"),
    };
}

impl ::std::ops::Deref for UserDepartmentFields {
    type Target = ::helix::fields::RelationField<User, Department>;

    fn deref(&self) -> &Self::Target {
        &self.SELF
    }
}
