mod common;

use common::{harness, names, seed_users};
use helix::criteria::JoinType;
use helix::prelude::*;
use helix_testing_fixtures::{Department, User, UserFields};

#[test]
fn nested_descriptor_auto_joins_left_exactly_once() {
    let h = harness();
    seed_users(&h);

    let query = h
        .factory
        .query::<User>()
        .where_equal(UserFields::DEPARTMENT.NAME, "Engineering")
        .order_by_asc(UserFields::NAME);

    let compiled = query.compile().unwrap();
    assert_eq!(compiled.joins.len(), 1);
    assert_eq!(compiled.joins[0].attribute, "department");
    assert_eq!(compiled.joins[0].join_type, JoinType::Left);

    let result = query.list().unwrap();
    assert_eq!(names(&result), ["Alice", "Bob"]);
}

#[test]
fn fetch_and_order_share_one_join() {
    let h = harness();
    seed_users(&h);

    let query = h
        .factory
        .query::<User>()
        .left_fetch_join(UserFields::DEPARTMENT.SELF)
        .order_by_asc(UserFields::DEPARTMENT.NAME)
        .order_by_asc(UserFields::NAME);

    let compiled = query.compile().unwrap();
    // the fetch is upgraded to serve as the join; no second node
    assert_eq!(compiled.joins.len(), 1);
    assert!(compiled.joins[0].fetch);

    let result = query.list().unwrap();
    // Default null handling: unassigned Diana sorts after named departments
    assert_eq!(names(&result), ["Alice", "Bob", "Charlie", "Diana"]);
}

#[test]
fn relation_equality_compares_identifiers() {
    let h = harness();
    seed_users(&h);
    let engineering = Department::seed(1, "Engineering");

    let result = h
        .factory
        .query::<User>()
        .filter(UserFields::DEPARTMENT.eq_entity(&engineering))
        .order_by_asc(UserFields::NAME)
        .list()
        .unwrap();

    assert_eq!(names(&result), ["Alice", "Bob"]);
}

#[test]
fn relation_membership_over_entities() {
    let h = harness();
    seed_users(&h);
    let engineering = Department::seed(1, "Engineering");
    let sales = Department::seed(2, "Sales");

    let result = h
        .factory
        .query::<User>()
        .filter(
            UserFields::DEPARTMENT
                .in_entities([&engineering, &sales])
                .unwrap(),
        )
        .order_by_asc(UserFields::NAME)
        .list()
        .unwrap();
    assert_eq!(names(&result), ["Alice", "Bob", "Charlie"]);

    // empty entity collections yield no predicate at all
    let no_departments: [&Department; 0] = [];
    assert!(UserFields::DEPARTMENT.in_entities(no_departments).is_none());
}

#[test]
fn relation_null_checks_do_not_join() {
    let h = harness();
    seed_users(&h);

    let query = h
        .factory
        .query::<User>()
        .where_is_null(UserFields::DEPARTMENT.SELF);

    let compiled = query.compile().unwrap();
    assert!(compiled.joins.is_empty());

    let result = query.list().unwrap();
    assert_eq!(names(&result), ["Diana"]);

    let assigned = h
        .factory
        .query::<User>()
        .where_is_not_null(UserFields::DEPARTMENT.SELF)
        .count()
        .unwrap();
    assert_eq!(assigned, 3);
}

#[test]
fn inner_join_drops_unmatched_roots() {
    let h = harness();
    seed_users(&h);

    let result = h
        .factory
        .query::<User>()
        .join(UserFields::DEPARTMENT.SELF)
        .order_by_asc(UserFields::NAME)
        .list()
        .unwrap();

    // Diana has no department; INNER drops her
    assert_eq!(names(&result), ["Alice", "Bob", "Charlie"]);
}

#[test]
fn collection_emptiness_and_size() {
    let h = harness();
    seed_users(&h);
    let mut tagged = User::seed(5, "Eve", 27);
    tagged.tags = vec!["admin".to_string(), "ops".to_string()];
    h.session.persist(&mut tagged).unwrap();

    let with_tags = h
        .factory
        .query::<User>()
        .where_is_not_empty(UserFields::TAGS)
        .list()
        .unwrap();
    assert_eq!(names(&with_tags), ["Eve"]);

    let by_size = h
        .factory
        .query::<User>()
        .filter(UserFields::TAGS.size().equals(2i64))
        .list()
        .unwrap();
    assert_eq!(names(&by_size), ["Eve"]);

    let without = h
        .factory
        .query::<User>()
        .where_is_empty(UserFields::TAGS)
        .count()
        .unwrap();
    assert_eq!(without, 4);
}

#[test]
fn collection_membership_of_values() {
    let h = harness();
    seed_users(&h);
    let mut tagged = User::seed(5, "Eve", 27);
    tagged.tags = vec!["admin".to_string()];
    h.session.persist(&mut tagged).unwrap();

    let admins = h
        .factory
        .query::<User>()
        .filter(UserFields::TAGS.contains_value("admin"))
        .list()
        .unwrap();

    assert_eq!(names(&admins), ["Eve"]);
}
