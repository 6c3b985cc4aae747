mod common;

use common::{harness, seed_users};
use helix::prelude::*;
use helix::{Constructor, Expr, ExprOp, FromRow, FromValue, RowError, TypeTag};
use helix_testing_fixtures::{User, UserFields};

///
/// NameAge
///

#[derive(Debug, PartialEq)]
struct NameAge {
    name: String,
    age: i64,
}

impl FromRow for NameAge {
    fn from_row(row: &[Value]) -> Result<Self, RowError> {
        if row.len() != 2 {
            return Err(RowError::Arity {
                expected: 2,
                actual: row.len(),
            });
        }
        let name = String::from_value(&row[0]).ok_or_else(|| RowError::Shape {
            index: 0,
            value: row[0].clone(),
        })?;
        let age = i64::from_value(&row[1]).ok_or_else(|| RowError::Shape {
            index: 1,
            value: row[1].clone(),
        })?;
        Ok(Self { name, age })
    }
}

#[test]
fn constructor_projection_maps_rows() {
    let h = harness();
    seed_users(&h);

    let result: Vec<NameAge> = h
        .factory
        .query::<User>()
        .where_greater_than(UserFields::AGE, 28)
        .order_by_asc(UserFields::AGE)
        .query_as(Constructor::new(vec![
            UserFields::NAME.expr(),
            UserFields::AGE.expr(),
        ]))
        .unwrap();

    assert_eq!(
        result,
        [
            NameAge {
                name: "Alice".to_string(),
                age: 30
            },
            NameAge {
                name: "Charlie".to_string(),
                age: 35
            },
        ]
    );
}

#[test]
fn scalar_selection_and_aggregates() {
    let h = harness();
    seed_users(&h);

    let sum = h
        .factory
        .query::<User>()
        .select(UserFields::AGE.sum())
        .unwrap();
    assert_eq!(sum, [Value::Int(118)]);

    let avg: Vec<Option<f64>> = h
        .factory
        .query::<User>()
        .select_as(UserFields::AGE.avg())
        .unwrap();
    assert_eq!(avg, [Some(29.5)]);

    let max = h
        .factory
        .query::<User>()
        .select(UserFields::AGE.max())
        .unwrap();
    assert_eq!(max, [Value::Int(35)]);
}

#[test]
fn scalar_selection_per_row() {
    let h = harness();
    seed_users(&h);

    let names = h
        .factory
        .query::<User>()
        .order_by_asc(UserFields::NAME)
        .select(UserFields::NAME.upper())
        .unwrap();

    assert_eq!(
        names,
        [
            Value::Text("ALICE".to_string()),
            Value::Text("BOB".to_string()),
            Value::Text("CHARLIE".to_string()),
            Value::Text("DIANA".to_string()),
        ]
    );
}

#[test]
fn tuple_projection() {
    let h = harness();
    seed_users(&h);

    let rows = h
        .factory
        .query::<User>()
        .where_equal(UserFields::NAME, "Bob")
        .tuples(vec![UserFields::NAME.expr(), UserFields::AGE.expr()])
        .unwrap();

    assert_eq!(
        rows,
        [vec![Value::Text("Bob".to_string()), Value::Int(25)]]
    );
}

#[test]
fn arithmetic_expressions_project() {
    let h = harness();
    seed_users(&h);

    let doubled = h
        .factory
        .query::<User>()
        .where_equal(UserFields::NAME, "Bob")
        .select(UserFields::AGE.multiply(2))
        .unwrap();

    assert_eq!(doubled, [Value::Int(50)]);
}

#[test]
fn grouped_count_returns_ordered_pairs() {
    let h = harness();
    seed_users(&h);

    let pairs = h
        .factory
        .query::<User>()
        .group_by_count(UserFields::DEPARTMENT.NAME)
        .unwrap();

    // key-ordered: the null group (Diana) first, then by name
    assert_eq!(
        pairs,
        [
            (Value::Null, 1),
            (Value::Text("Engineering".to_string()), 2),
            (Value::Text("Sales".to_string()), 1),
        ]
    );
}

#[test]
fn group_by_with_having_filters_groups() {
    let h = harness();
    seed_users(&h);

    let rows = h
        .factory
        .query::<User>()
        .group_by([UserFields::DEPARTMENT.NAME.expr()])
        .having(Expr::operation(ExprOp::Count, vec![], TypeTag::Int).gt(1i64))
        .tuples(vec![
            UserFields::DEPARTMENT.NAME.expr(),
            Expr::operation(ExprOp::Count, vec![], TypeTag::Int),
        ])
        .unwrap();

    assert_eq!(
        rows,
        [vec![Value::Text("Engineering".to_string()), Value::Int(2)]]
    );
}

#[test]
fn client_side_grouping_by_key_function() {
    let h = harness();
    seed_users(&h);

    let groups = h
        .factory
        .query::<User>()
        .list_grouped_by(|user| user.age / 10)
        .unwrap();

    assert_eq!(groups[&2].len(), 2); // Bob 25, Diana 28
    assert_eq!(groups[&3].len(), 2); // Alice 30, Charlie 35
}

#[test]
fn client_side_grouping_by_field_reads_attributes() {
    let h = harness();
    seed_users(&h);

    let groups = h
        .factory
        .query::<User>()
        .list_grouped_by_field(UserFields::DEPARTMENT.NAME)
        .unwrap();

    assert_eq!(groups[&Value::Text("Engineering".to_string())].len(), 2);
    assert_eq!(groups[&Value::Text("Sales".to_string())].len(), 1);
    assert_eq!(groups[&Value::Null].len(), 1);
}
